use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::bind::{cache, Bindable, Configurable, IndexedContainer, Member, Node};
use crate::constants::ITEM_MEMBER;
use crate::convert::ConvertContext;
use crate::error::{BoxError, ValueError};
use crate::key::{strip_parts, Index, KeyPart, KeyPath};
use crate::options::BindOptions;
use crate::types::Pair;
use crate::Result;

const ITEM: Member = Member::new(ITEM_MEMBER);

/// Decides whether two group keys name the same group.
pub trait KeyComparer {
    fn same(&self, left: &str, right: &str) -> bool;
}

/// Exact, case-sensitive comparison of index text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ordinal;

impl KeyComparer for Ordinal {
    fn same(&self, left: &str, right: &str) -> bool {
        left == right
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreCase;

impl KeyComparer for IgnoreCase {
    fn same(&self, left: &str, right: &str) -> bool {
        left.eq_ignore_ascii_case(right) || left.to_lowercase() == right.to_lowercase()
    }
}

impl<F> KeyComparer for F
where
    F: Fn(&str, &str) -> bool,
{
    fn same(&self, left: &str, right: &str) -> bool {
        self(left, right)
    }
}

/// One pair routed to a group: the indices left on the grouping part and
/// the parts after it.
struct Entry<'k> {
    pair: &'k Pair,
    indices: &'k [Index],
    tail: &'k [KeyPart],
}

type Group<'k> = (Option<&'k str>, Vec<Entry<'k>>);

/// Writes parsed pairs into target objects.
///
/// Keys that resolve to nothing are skipped so several partial sources can
/// be layered; conversion failures stop population and surface as
/// [`Error::Conversion`](crate::Error::Conversion).
#[derive(Debug, Clone)]
pub struct Populator<'p> {
    pairs: &'p [Pair],
    options: BindOptions,
}

impl<'p> Populator<'p> {
    pub fn new(pairs: &'p [Pair]) -> Self {
        Self {
            pairs,
            options: BindOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BindOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &BindOptions {
        &self.options
    }

    /// Binds every pair under `prefix` into `target`, in source order.
    ///
    /// An empty prefix binds every pair.
    pub fn populate(&self, target: &mut dyn Configurable, prefix: &str) -> Result<()> {
        let prefix = KeyPath::parse(prefix);
        let mut bound = 0_usize;
        for pair in self.pairs {
            let Some(tail) = pair.key().strip_prefix(&prefix) else {
                continue;
            };
            self.bind_parts(target, tail, pair)?;
            bound += 1;
        }
        debug!(prefix = %prefix, pairs = bound, target = target.type_name(), "populated target");
        Ok(())
    }

    pub fn configure<T: Configurable>(&self, mut target: T, prefix: &str) -> Result<T> {
        self.populate(&mut target, prefix)?;
        Ok(target)
    }

    /// Builds one target per group of pairs sharing the grouping part's
    /// first index. Groups are compared ordinally.
    pub fn populate_many<T, F>(&self, mut factory: F, prefix: &str) -> Result<Vec<T>>
    where
        T: Configurable,
        F: FnMut() -> T,
    {
        self.collect_groups(|_| factory(), prefix, None)
            .map(|groups| groups.into_iter().map(|(_, target)| target).collect())
    }

    pub fn populate_many_by<T, F>(
        &self,
        mut factory: F,
        prefix: &str,
        comparer: &dyn KeyComparer,
    ) -> Result<Vec<T>>
    where
        T: Configurable,
        F: FnMut() -> T,
    {
        self.collect_groups(|_| factory(), prefix, Some(comparer))
            .map(|groups| groups.into_iter().map(|(_, target)| target).collect())
    }

    /// Like [`populate_many`](Self::populate_many), handing each group's key
    /// to the factory and returning it next to the target.
    ///
    /// `kid[].x` is keyed by `Some("")` while `kid.x` is keyed by `None`.
    pub fn populate_keyed<T, F>(&self, factory: F, prefix: &str) -> Result<Vec<(Option<String>, T)>>
    where
        T: Configurable,
        F: FnMut(Option<&str>) -> T,
    {
        self.collect_groups(factory, prefix, None)
    }

    pub fn populate_keyed_by<T, F>(
        &self,
        factory: F,
        prefix: &str,
        comparer: &dyn KeyComparer,
    ) -> Result<Vec<(Option<String>, T)>>
    where
        T: Configurable,
        F: FnMut(Option<&str>) -> T,
    {
        self.collect_groups(factory, prefix, Some(comparer))
    }

    fn collect_groups<T, F>(
        &self,
        mut factory: F,
        prefix: &str,
        comparer: Option<&dyn KeyComparer>,
    ) -> Result<Vec<(Option<String>, T)>>
    where
        T: Configurable,
        F: FnMut(Option<&str>) -> T,
    {
        let prefix = KeyPath::parse(prefix);
        let groups = self.group(&prefix, comparer);
        debug!(prefix = %prefix, groups = groups.len(), "grouped pairs");
        let mut out = Vec::with_capacity(groups.len());
        for (key, entries) in groups {
            let mut target = factory(key);
            for entry in entries {
                self.bind_entry(&mut target, &entry)?;
            }
            out.push((key.map(str::to_string), target));
        }
        Ok(out)
    }

    fn group(&self, prefix: &KeyPath, comparer: Option<&dyn KeyComparer>) -> Vec<Group<'p>> {
        let (scope, last) = match prefix.parts().split_last() {
            Some((last, scope)) => (scope, Some(last)),
            None => (&[][..], None),
        };
        let mut ordinal: IndexMap<Option<&'p str>, Vec<Entry<'p>>> = IndexMap::new();
        let mut linear: Vec<Group<'p>> = Vec::new();
        for pair in self.pairs {
            let Some(rest) = strip_parts(pair.key().parts(), scope) else {
                continue;
            };
            let Some((part, tail)) = rest.split_first() else {
                continue;
            };
            if last.is_some_and(|last| !part.matches_name(last.name())) {
                continue;
            }
            let key = part.first_index().map(Index::text);
            let entry = Entry {
                pair,
                indices: part.indices().get(1..).unwrap_or_default(),
                tail,
            };
            match comparer {
                None => ordinal.entry(key).or_default().push(entry),
                Some(comparer) => {
                    let found = linear.iter_mut().find(|(existing, _)| match (existing, key) {
                        (Some(existing), Some(key)) => comparer.same(existing, key),
                        (None, None) => true,
                        _ => false,
                    });
                    match found {
                        Some((_, entries)) => entries.push(entry),
                        None => linear.push((key, vec![entry])),
                    }
                }
            }
        }
        match comparer {
            None => ordinal.into_iter().collect(),
            Some(_) => linear,
        }
    }

    fn bind_entry(&self, target: &mut dyn Configurable, entry: &Entry<'_>) -> Result<()> {
        let Some((index, rest)) = entry.indices.split_first() else {
            return self.bind_parts(target, entry.tail, entry.pair);
        };
        let cx = ConvertContext::new(&self.options, entry.pair.key(), &ITEM, target.type_name());
        match self.object_item(target, index, entry.pair, &cx)? {
            Some(item) => self.bind_slot(item, rest, entry.tail, entry.pair, &cx),
            None => Ok(()),
        }
    }

    fn bind_parts(&self, target: &mut dyn Configurable, parts: &[KeyPart], pair: &Pair) -> Result<()> {
        let Some((part, tail)) = parts.split_first() else {
            trace!(key = %pair.key(), "key addresses the target itself");
            return Ok(());
        };
        let Some(member) = cache::resolve(target, part) else {
            trace!(key = %pair.key(), name = part.name(), "no such member");
            return Ok(());
        };
        if member.policy.ignore_set {
            trace!(key = %pair.key(), member = member.name, "member ignored");
            return Ok(());
        }
        let owner = target.type_name();
        let Some(slot) = target.member_mut(member.field) else {
            trace!(key = %pair.key(), member = member.name, "member not writable");
            return Ok(());
        };
        let cx = ConvertContext::new(&self.options, pair.key(), member, owner);
        self.bind_slot(slot, part.indices(), tail, pair, &cx)
    }

    fn bind_slot(
        &self,
        slot: &mut dyn Bindable,
        indices: &[Index],
        tail: &[KeyPart],
        pair: &Pair,
        cx: &ConvertContext<'_>,
    ) -> Result<()> {
        if let Some((index, rest)) = indices.split_first() {
            return match self.index_into(slot, index, pair, cx)? {
                Some(item) => self.bind_slot(item, rest, tail, pair, cx),
                None => {
                    trace!(key = %pair.key(), index = index.text(), "index addresses nothing");
                    Ok(())
                }
            };
        }
        if tail.is_empty() {
            return self.assign_leaf(slot, pair, cx);
        }
        match slot.node() {
            Node::Object(object) => self.bind_parts(object, tail, pair),
            _ => {
                trace!(key = %pair.key(), member = cx.member.name, "member has no nested members");
                Ok(())
            }
        }
    }

    fn index_into<'s>(
        &self,
        slot: &'s mut dyn Bindable,
        index: &Index,
        pair: &Pair,
        cx: &ConvertContext<'_>,
    ) -> Result<Option<&'s mut dyn Bindable>> {
        let fail = |source: BoxError| cx.error(pair.value(), source);
        match slot.node() {
            Node::Leaf => Ok(None),
            Node::Container(IndexedContainer::List(list)) => {
                let position = index
                    .text()
                    .parse::<usize>()
                    .map_err(|_| fail(ValueError::InvalidPosition(index.text().to_string()).into()))?;
                list.slot(position).map(Some).map_err(|err| fail(err).into())
            }
            Node::Container(IndexedContainer::Map(map)) => {
                map.slot(index, cx).map(Some).map_err(|err| fail(err).into())
            }
            Node::Container(IndexedContainer::Indexer(indexer)) => {
                indexer.item(index, cx).map_err(|err| fail(err).into())
            }
            Node::Object(object) => self.object_item(object, index, pair, cx),
        }
    }

    /// Indexed write on a plain object: its indexer if it has one, otherwise
    /// a member named `Item`.
    fn object_item<'s>(
        &self,
        object: &'s mut dyn Configurable,
        index: &Index,
        pair: &Pair,
        cx: &ConvertContext<'_>,
    ) -> Result<Option<&'s mut dyn Bindable>> {
        if object.indexer().is_some() {
            return match object.indexer() {
                Some(indexer) => indexer
                    .item(index, cx)
                    .map_err(|err| cx.error(pair.value(), err).into()),
                None => Ok(None),
            };
        }
        let Some(member) = cache::resolve_name(object, ITEM_MEMBER) else {
            return Ok(None);
        };
        if member.policy.ignore_set {
            return Ok(None);
        }
        match object.member_mut(member.field) {
            Some(item) => self.index_into(item, index, pair, cx),
            None => Ok(None),
        }
    }

    fn assign_leaf(&self, slot: &mut dyn Bindable, pair: &Pair, cx: &ConvertContext<'_>) -> Result<()> {
        let value = pair.value();
        let result = match (cx.member.converter, value.as_str()) {
            (Some(name), Some(raw)) => self
                .options
                .converters
                .resolve(name)
                .map_err(BoxError::from)
                .and_then(|converter| converter.convert(raw, cx, slot.as_any_mut())),
            _ => slot.assign(value.as_str(), cx),
        };
        result.map_err(|source| cx.error(value, source).into())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::bind::Indexer;
    use crate::decode::parse_str;
    use crate::Error;

    #[derive(Debug, Default, PartialEq)]
    struct Inner {
        value: f64,
    }

    crate::configurable! { Inner { value } }

    #[derive(Debug, Default)]
    struct Env {
        name: String,
        vars: IndexMap<String, String>,
    }

    impl Indexer for Env {
        fn item(
            &mut self,
            index: &Index,
            _cx: &ConvertContext<'_>,
        ) -> std::result::Result<Option<&mut dyn Bindable>, BoxError> {
            Ok(Some(self.vars.entry(index.text().to_string()).or_default()))
        }
    }

    crate::configurable! { Env: indexer { name } }

    #[derive(Debug, Default)]
    struct Bag {
        item: HashMap<String, i32>,
    }

    crate::configurable! { Bag { item } }

    #[derive(Debug, Default)]
    struct Holder {
        name: String,
        best_friend: String,
        secret: String,
        nums: Vec<f64>,
        grid: Vec<Vec<i32>>,
        inners: HashMap<String, Inner>,
        inner: Option<Inner>,
        env: Env,
        bag: Bag,
    }

    crate::configurable! {
        Holder {
            name,
            best_friend: { aliases("Best friend", "bff") },
            secret: { ignore_set },
            nums,
            grid,
            inners,
            inner,
            env,
            bag,
        }
    }

    #[derive(Debug, Default)]
    struct Kid {
        w: i32,
        h: i32,
    }

    crate::configurable! { Kid { w, h } }

    fn bind(text: &str) -> Holder {
        let content = parse_str(text);
        Populator::new(content.pairs())
            .configure(Holder::default(), "")
            .unwrap()
    }

    #[rstest::rstest]
    fn test_sparse_list_positions() {
        let holder = bind("nums[0] = 1.23\nnums[2] = 3.45");
        assert_eq!(holder.nums, vec![1.23, 0.0, 3.45]);
    }

    #[rstest::rstest]
    fn test_last_write_to_a_position_wins() {
        let holder = bind("nums[1] = 1\nnums[1] = 2");
        assert_eq!(holder.nums, vec![0.0, 2.0]);
    }

    #[rstest::rstest]
    fn test_successive_indices() {
        let holder = bind("grid[1][2] = 5");
        assert_eq!(holder.grid, vec![vec![], vec![0, 0, 5]]);
    }

    #[rstest::rstest]
    #[case("best_friend = Penny")]
    #[case("Best friend = Penny")]
    #[case("BFF = Penny")]
    fn test_member_names_and_aliases(#[case] text: &str) {
        assert_eq!(bind(text).best_friend, "Penny");
    }

    #[rstest::rstest]
    fn test_ignored_and_missing_members_are_skipped() {
        let holder = bind("secret = s3cret\nnickname = Bob\nname = Ann");
        assert_eq!(holder.secret, "");
        assert_eq!(holder.name, "Ann");
    }

    #[rstest::rstest]
    fn test_map_entries_keep_index_case() {
        let holder = bind("inners[a B].value = 3.4\ninners[a b].value = 5.6");
        assert_eq!(holder.inners.len(), 2);
        assert_eq!(holder.inners["a B"], Inner { value: 3.4 });
        assert_eq!(holder.inners["a b"], Inner { value: 5.6 });
    }

    #[rstest::rstest]
    fn test_nested_option_is_created_on_demand() {
        let holder = bind("inner.value = 2.5");
        assert_eq!(holder.inner, Some(Inner { value: 2.5 }));
    }

    #[rstest::rstest]
    fn test_empty_block_leaves_default() {
        let holder = bind("name = {\n   \n}\n");
        assert_eq!(holder.name, "");
    }

    #[rstest::rstest]
    fn test_indexer_on_nested_object() {
        let holder = bind("env.name = prod\nenv[HOME] = /root\nenv[Path] = /bin");
        assert_eq!(holder.env.name, "prod");
        assert_eq!(holder.env.vars.get("HOME").map(String::as_str), Some("/root"));
        assert_eq!(holder.env.vars.len(), 2);
    }

    #[rstest::rstest]
    fn test_item_member_receives_indexed_writes() {
        let holder = bind("bag[apples] = 3");
        assert_eq!(holder.bag.item.get("apples"), Some(&3));
    }

    #[rstest::rstest]
    fn test_prefix_selects_pairs() {
        let content = parse_str("app.name = kept\nother.name = dropped\nAPP.nums = 1,2");
        let holder = Populator::new(content.pairs())
            .configure(Holder::default(), "app")
            .unwrap();
        assert_eq!(holder.name, "kept");
        assert_eq!(holder.nums, vec![1.0, 2.0]);
    }

    #[rstest::rstest]
    fn test_conversion_error_names_the_pair() {
        let content = parse_str("nums[0] = abc");
        let err = Populator::new(content.pairs())
            .configure(Holder::default(), "")
            .unwrap_err();
        let Error::Conversion(err) = err else {
            panic!("expected a conversion error, got {err:?}");
        };
        assert_eq!(err.key, "nums[0]");
        assert_eq!(err.raw.as_deref(), Some("abc"));
        assert_eq!(err.member, "nums");
    }

    #[rstest::rstest]
    fn test_list_index_must_be_a_position() {
        let content = parse_str("nums[first] = 1");
        let result = Populator::new(content.pairs()).configure(Holder::default(), "");
        assert!(matches!(result, Err(Error::Conversion(_))));
    }

    #[rstest::rstest]
    fn test_groups_split_empty_index_from_missing_index() {
        let content = parse_str("kid[].w = 1\nkid.w = 2");
        let kids = Populator::new(content.pairs())
            .populate_keyed(|_| Kid::default(), "kid")
            .unwrap();
        assert_eq!(kids.len(), 2);
        assert_eq!(kids[0].0.as_deref(), Some(""));
        assert_eq!(kids[0].1.w, 1);
        assert_eq!(kids[1].0, None);
        assert_eq!(kids[1].1.w, 2);
    }

    #[rstest::rstest]
    fn test_groups_in_first_encounter_order() {
        let content = parse_str("kid[1].w = 1\nkid[0].w = 2\nkid[1].h = 3\nother[0].w = 9");
        let kids = Populator::new(content.pairs())
            .populate_many(Kid::default, "kid")
            .unwrap();
        assert_eq!(kids.len(), 2);
        assert_eq!((kids[0].w, kids[0].h), (1, 3));
        assert_eq!((kids[1].w, kids[1].h), (2, 0));
    }

    #[rstest::rstest]
    fn test_group_keys_respect_comparer() {
        let content = parse_str("kid[A].w = 1\nkid[a].h = 2");
        let populator = Populator::new(content.pairs());
        let ordinal = populator.populate_many(Kid::default, "kid").unwrap();
        assert_eq!(ordinal.len(), 2);
        let folded = populator
            .populate_keyed_by(|_| Kid::default(), "kid", &IgnoreCase)
            .unwrap();
        assert_eq!(folded.len(), 1);
        assert_eq!(folded[0].0.as_deref(), Some("A"));
        assert_eq!((folded[0].1.w, folded[0].1.h), (1, 2));
    }

    #[rstest::rstest]
    fn test_group_factory_receives_key() {
        let content = parse_str("kid[3].h = 1");
        let kids = Populator::new(content.pairs())
            .populate_keyed(
                |key| Kid {
                    w: key.and_then(|key| key.parse().ok()).unwrap_or(-1),
                    h: 0,
                },
                "",
            )
            .unwrap();
        assert_eq!((kids[0].1.w, kids[0].1.h), (3, 1));
    }
}
