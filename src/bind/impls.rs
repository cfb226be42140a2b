use std::any::Any;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::bind::{Bindable, IndexedContainer, ListLike, MapLike, Node, View};
use crate::constants::MAX_POSITION_GAP;
use crate::convert::{ConvertContext, IndexKey};
use crate::error::{BoxError, ValueError};
use crate::key::Index;
use crate::num::number::{format_f32, format_f64};

const NAIVE_DATE_TIME: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A value that converts to and from a single piece of text.
///
/// Pair with [`scalar!`](crate::scalar) to make the type bindable and
/// usable as a map key.
pub trait Scalar: Sized + Send + 'static {
    fn parse_text(raw: &str) -> Result<Self, BoxError>;

    fn render_text(&self) -> Cow<'_, str>;
}

macro_rules! integer_scalar {
    ($($ty:ty),+) => {$(
        impl Scalar for $ty {
            fn parse_text(raw: &str) -> Result<Self, BoxError> {
                Ok(raw.trim().parse::<$ty>()?)
            }

            fn render_text(&self) -> Cow<'_, str> {
                let mut buffer = itoa::Buffer::new();
                Cow::Owned(buffer.format(*self).to_string())
            }
        }

        crate::scalar!($ty);
    )+};
}

integer_scalar!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl Scalar for f64 {
    fn parse_text(raw: &str) -> Result<Self, BoxError> {
        Ok(raw.trim().parse::<f64>()?)
    }

    fn render_text(&self) -> Cow<'_, str> {
        Cow::Owned(format_f64(*self))
    }
}

impl Scalar for f32 {
    fn parse_text(raw: &str) -> Result<Self, BoxError> {
        Ok(raw.trim().parse::<f32>()?)
    }

    fn render_text(&self) -> Cow<'_, str> {
        Cow::Owned(format_f32(*self))
    }
}

impl Scalar for bool {
    fn parse_text(raw: &str) -> Result<Self, BoxError> {
        let text = raw.trim();
        if text.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if text.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(ValueError::InvalidBool(raw.to_string()).into())
        }
    }

    fn render_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(if *self { "true" } else { "false" })
    }
}

impl Scalar for char {
    fn parse_text(raw: &str) -> Result<Self, BoxError> {
        let single = |text: &str| {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => Some(ch),
                _ => None,
            }
        };
        single(raw)
            .or_else(|| single(raw.trim()))
            .ok_or_else(|| ValueError::InvalidChar(raw.to_string()).into())
    }

    fn render_text(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }
}

impl Scalar for String {
    fn parse_text(raw: &str) -> Result<Self, BoxError> {
        Ok(raw.to_string())
    }

    fn render_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl Scalar for SmolStr {
    fn parse_text(raw: &str) -> Result<Self, BoxError> {
        Ok(SmolStr::new(raw))
    }

    fn render_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl Scalar for PathBuf {
    fn parse_text(raw: &str) -> Result<Self, BoxError> {
        Ok(PathBuf::from(raw))
    }

    fn render_text(&self) -> Cow<'_, str> {
        self.to_string_lossy()
    }
}

impl Scalar for NaiveDate {
    fn parse_text(raw: &str) -> Result<Self, BoxError> {
        Ok(raw.trim().parse::<NaiveDate>()?)
    }

    fn render_text(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }
}

impl Scalar for NaiveTime {
    fn parse_text(raw: &str) -> Result<Self, BoxError> {
        Ok(raw.trim().parse::<NaiveTime>()?)
    }

    fn render_text(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }
}

impl Scalar for NaiveDateTime {
    fn parse_text(raw: &str) -> Result<Self, BoxError> {
        Ok(NaiveDateTime::parse_from_str(raw.trim(), NAIVE_DATE_TIME)?)
    }

    fn render_text(&self) -> Cow<'_, str> {
        Cow::Owned(self.format(NAIVE_DATE_TIME).to_string())
    }
}

impl Scalar for DateTime<FixedOffset> {
    fn parse_text(raw: &str) -> Result<Self, BoxError> {
        Ok(DateTime::parse_from_rfc3339(raw.trim())?)
    }

    fn render_text(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_rfc3339())
    }
}

impl Scalar for DateTime<Utc> {
    fn parse_text(raw: &str) -> Result<Self, BoxError> {
        Ok(DateTime::parse_from_rfc3339(raw.trim())?.with_timezone(&Utc))
    }

    fn render_text(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_rfc3339())
    }
}

crate::scalar!(
    f32,
    f64,
    bool,
    char,
    String,
    SmolStr,
    PathBuf,
    NaiveDate,
    NaiveTime,
    NaiveDateTime,
    DateTime<FixedOffset>,
    DateTime<Utc>,
);

impl<T: Bindable + Default> Bindable for Option<T> {
    /// An absent value resets the slot to `None`.
    fn assign(&mut self, raw: Option<&str>, cx: &ConvertContext<'_>) -> Result<(), BoxError> {
        if raw.is_none() {
            *self = None;
            return Ok(());
        }
        let existed = self.is_some();
        let result = self.get_or_insert_with(T::default).assign(raw, cx);
        if result.is_err() && !existed {
            *self = None;
        }
        result
    }

    fn node(&mut self) -> Node<'_> {
        self.get_or_insert_with(T::default).node()
    }

    fn view(&self) -> View<'_> {
        match self {
            Some(value) => value.view(),
            None => View::Absent,
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<T: Bindable> Bindable for Box<T> {
    fn assign(&mut self, raw: Option<&str>, cx: &ConvertContext<'_>) -> Result<(), BoxError> {
        (**self).assign(raw, cx)
    }

    fn node(&mut self) -> Node<'_> {
        (**self).node()
    }

    fn view(&self) -> View<'_> {
        (**self).view()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        (**self).as_any_mut()
    }
}

impl<T: Bindable + Default> Bindable for Vec<T> {
    /// Splits `raw` on the configured separator and converts each trimmed
    /// element; blank text yields an empty list.
    fn assign(&mut self, raw: Option<&str>, cx: &ConvertContext<'_>) -> Result<(), BoxError> {
        let Some(raw) = raw else {
            return Ok(());
        };
        if raw.trim().is_empty() {
            self.clear();
            return Ok(());
        }
        let mut items = Vec::new();
        for piece in raw.split(cx.separator()) {
            let mut item = T::default();
            item.assign(Some(piece.trim()), cx)?;
            items.push(item);
        }
        *self = items;
        Ok(())
    }

    fn node(&mut self) -> Node<'_> {
        Node::Container(IndexedContainer::List(self))
    }

    fn view(&self) -> View<'_> {
        View::List(self.iter().map(|item| item as &dyn Bindable).collect())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<T: Bindable + Default> ListLike for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn slot(&mut self, position: usize) -> Result<&mut dyn Bindable, BoxError> {
        let len = Vec::len(self);
        if position >= len {
            let end = position
                .checked_add(1)
                .filter(|end| end - len <= MAX_POSITION_GAP)
                .ok_or(ValueError::PositionOutOfRange { position, len })?;
            self.resize_with(end, T::default);
        }
        Ok(&mut self[position])
    }
}

fn map_leaf<M>(raw: Option<&str>) -> Result<(), BoxError> {
    match raw {
        Some(_) => Err(ValueError::NotAssignable(std::any::type_name::<M>()).into()),
        None => Ok(()),
    }
}

impl<K, V> Bindable for HashMap<K, V>
where
    K: IndexKey + Eq + Hash + Send + 'static,
    V: Bindable + Default,
{
    fn assign(&mut self, raw: Option<&str>, _cx: &ConvertContext<'_>) -> Result<(), BoxError> {
        map_leaf::<Self>(raw)
    }

    fn node(&mut self) -> Node<'_> {
        Node::Container(IndexedContainer::Map(self))
    }

    /// Entries sorted by rendered key so output is stable.
    fn view(&self) -> View<'_> {
        let mut entries: Vec<(String, &dyn Bindable)> = self
            .iter()
            .map(|(key, value)| (key.render_index(), value as &dyn Bindable))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        View::Map(entries)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<K, V> MapLike for HashMap<K, V>
where
    K: IndexKey + Eq + Hash + Send + 'static,
    V: Bindable + Default,
{
    fn slot(&mut self, index: &Index, cx: &ConvertContext<'_>) -> Result<&mut dyn Bindable, BoxError> {
        let key = K::from_index(index, cx)?;
        Ok(self.entry(key).or_default())
    }
}

impl<K, V> Bindable for BTreeMap<K, V>
where
    K: IndexKey + Ord + Send + 'static,
    V: Bindable + Default,
{
    fn assign(&mut self, raw: Option<&str>, _cx: &ConvertContext<'_>) -> Result<(), BoxError> {
        map_leaf::<Self>(raw)
    }

    fn node(&mut self) -> Node<'_> {
        Node::Container(IndexedContainer::Map(self))
    }

    fn view(&self) -> View<'_> {
        View::Map(
            self.iter()
                .map(|(key, value)| (key.render_index(), value as &dyn Bindable))
                .collect(),
        )
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<K, V> MapLike for BTreeMap<K, V>
where
    K: IndexKey + Ord + Send + 'static,
    V: Bindable + Default,
{
    fn slot(&mut self, index: &Index, cx: &ConvertContext<'_>) -> Result<&mut dyn Bindable, BoxError> {
        let key = K::from_index(index, cx)?;
        Ok(self.entry(key).or_default())
    }
}

impl<K, V> Bindable for IndexMap<K, V>
where
    K: IndexKey + Eq + Hash + Send + 'static,
    V: Bindable + Default,
{
    fn assign(&mut self, raw: Option<&str>, _cx: &ConvertContext<'_>) -> Result<(), BoxError> {
        map_leaf::<Self>(raw)
    }

    fn node(&mut self) -> Node<'_> {
        Node::Container(IndexedContainer::Map(self))
    }

    fn view(&self) -> View<'_> {
        View::Map(
            self.iter()
                .map(|(key, value)| (key.render_index(), value as &dyn Bindable))
                .collect(),
        )
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<K, V> MapLike for IndexMap<K, V>
where
    K: IndexKey + Eq + Hash + Send + 'static,
    V: Bindable + Default,
{
    fn slot(&mut self, index: &Index, cx: &ConvertContext<'_>) -> Result<&mut dyn Bindable, BoxError> {
        let key = K::from_index(index, cx)?;
        Ok(self.entry(key).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyPath;
    use crate::options::BindOptions;

    fn assign<T: Bindable + ?Sized>(target: &mut T, raw: Option<&str>) -> Result<(), BoxError> {
        assign_with(target, raw, &BindOptions::default())
    }

    fn assign_with<T: Bindable + ?Sized>(
        target: &mut T,
        raw: Option<&str>,
        options: &BindOptions,
    ) -> Result<(), BoxError> {
        let key = KeyPath::parse("value");
        let cx = ConvertContext::detached(options, &key);
        target.assign(raw, &cx)
    }

    fn text(value: &dyn Bindable) -> String {
        match value.view() {
            View::Text(text) => text.into_owned(),
            _ => panic!("expected text"),
        }
    }

    #[rstest::rstest]
    #[case(" 42 ", 42)]
    #[case("-7", -7)]
    fn test_integers_ignore_whitespace(#[case] raw: &str, #[case] expected: i64) {
        let mut value = 0_i64;
        assign(&mut value, Some(raw)).unwrap();
        assert_eq!(value, expected);
    }

    #[rstest::rstest]
    #[case("TRUE", true)]
    #[case(" false ", false)]
    #[case("True", true)]
    fn test_bool_is_case_insensitive(#[case] raw: &str, #[case] expected: bool) {
        let mut value = !expected;
        assign(&mut value, Some(raw)).unwrap();
        assert_eq!(value, expected);
    }

    #[rstest::rstest]
    fn test_invalid_input_is_an_error() {
        let mut flag = false;
        assert!(assign(&mut flag, Some("yes")).is_err());
        let mut number = 5_u8;
        assert!(assign(&mut number, Some("300")).is_err());
        assert_eq!(number, 5);
    }

    #[rstest::rstest]
    fn test_strings_are_verbatim() {
        let mut value = String::new();
        assign(&mut value, Some("  padded  ")).unwrap();
        assert_eq!(value, "  padded  ");
    }

    #[rstest::rstest]
    #[case("x", 'x')]
    #[case(" y ", 'y')]
    #[case(" ", ' ')]
    fn test_char(#[case] raw: &str, #[case] expected: char) {
        let mut value = '\0';
        assign(&mut value, Some(raw)).unwrap();
        assert_eq!(value, expected);
    }

    #[rstest::rstest]
    fn test_absent_leaves_plain_values_alone() {
        let mut number = 9_i32;
        assign(&mut number, None).unwrap();
        assert_eq!(number, 9);
        let mut optional = Some(3_i32);
        assign(&mut optional, None).unwrap();
        assert_eq!(optional, None);
    }

    #[rstest::rstest]
    fn test_option_stays_none_on_failure() {
        let mut optional: Option<i32> = None;
        assert!(assign(&mut optional, Some("nope")).is_err());
        assert_eq!(optional, None);
    }

    #[rstest::rstest]
    fn test_list_splits_on_separator() {
        let mut list: Vec<i32> = vec![9];
        assign(&mut list, Some("1, 2 ,3")).unwrap();
        assert_eq!(list, vec![1, 2, 3]);
        assign(&mut list, Some("  ")).unwrap();
        assert!(list.is_empty());
    }

    #[rstest::rstest]
    fn test_list_custom_separator() {
        let options = BindOptions::default().with_separator(';');
        let mut list: Vec<String> = Vec::new();
        assign_with(&mut list, Some("a,b; c"), &options).unwrap();
        assert_eq!(list, vec!["a,b".to_string(), "c".to_string()]);
    }

    #[rstest::rstest]
    fn test_list_slot_pads_with_defaults() {
        let mut list: Vec<f64> = Vec::new();
        assign(ListLike::slot(&mut list, 2).unwrap(), Some("3.45")).unwrap();
        assign(ListLike::slot(&mut list, 0).unwrap(), Some("1.23")).unwrap();
        assert_eq!(list, vec![1.23, 0.0, 3.45]);
    }

    #[rstest::rstest]
    #[case(MAX_POSITION_GAP + 2)]
    #[case(usize::MAX)]
    fn test_list_slot_rejects_far_positions(#[case] position: usize) {
        let mut list: Vec<u8> = vec![1];
        let err = ListLike::slot(&mut list, position).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<ValueError>(),
            Some(ValueError::PositionOutOfRange { len: 1, .. })
        ));
        assert_eq!(list, vec![1]);
    }

    #[rstest::rstest]
    fn test_map_slot_converts_the_index() {
        let options = BindOptions::default();
        let key = KeyPath::parse("m[7]");
        let cx = ConvertContext::detached(&options, &key);
        let mut map: HashMap<u16, String> = HashMap::new();
        MapLike::slot(&mut map, &Index::parse(" 7 "), &cx)
            .unwrap()
            .assign(Some("seven"), &cx)
            .unwrap();
        assert_eq!(map.get(&7).map(String::as_str), Some("seven"));
        assert!(MapLike::slot(&mut map, &Index::parse("x"), &cx).is_err());
    }

    #[rstest::rstest]
    fn test_map_rejects_leaf_text() {
        let mut map: BTreeMap<String, i32> = BTreeMap::new();
        assert!(assign(&mut map, Some("1")).is_err());
        assert!(assign(&mut map, None).is_ok());
    }

    #[rstest::rstest]
    fn test_dates() {
        let mut date = NaiveDate::default();
        assign(&mut date, Some("2024-02-29")).unwrap();
        assert_eq!(text(&date), "2024-02-29");

        let mut stamp = NaiveDateTime::default();
        assign(&mut stamp, Some("2024-02-29T10:30:00")).unwrap();
        assert_eq!(NaiveDateTime::parse_text(&text(&stamp)).unwrap(), stamp);

        let mut utc: DateTime<Utc> = DateTime::default();
        assign(&mut utc, Some("2024-01-01T12:00:00+02:00")).unwrap();
        assert_eq!(text(&utc), "2024-01-01T10:00:00+00:00");
    }

    #[rstest::rstest]
    fn test_float_text() {
        assert_eq!(text(&0.5_f64), "0.5");
        assert_eq!(text(&12_u64), "12");
        assert_eq!(text(&true), "true");
    }
}
