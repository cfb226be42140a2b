use std::fmt;

use ::serde::de::{
    self, DeserializeSeed, Deserializer, EnumAccess, IntoDeserializer, MapAccess, SeqAccess,
    VariantAccess, Visitor,
};
use thiserror::Error;

use crate::bind::Scalar;
use crate::key::fold_name;
use crate::serde::Tree;

#[derive(Debug, Error)]
#[error("{msg}")]
pub(crate) struct DeError {
    msg: String,
}

impl de::Error for DeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        DeError {
            msg: msg.to_string(),
        }
    }
}

#[derive(Clone, Copy)]
enum Source<'de> {
    Tree(&'de Tree),
    /// One piece of a split list, or a map key.
    Text(&'de str),
}

/// A position in the tree, or a bare piece of text, to deserialize from.
#[derive(Clone, Copy)]
pub(crate) struct Input<'de> {
    source: Source<'de>,
    separator: char,
}

impl<'de> Input<'de> {
    pub(crate) fn tree(tree: &'de Tree, separator: char) -> Self {
        Self {
            source: Source::Tree(tree),
            separator,
        }
    }

    fn text(text: &'de str, separator: char) -> Self {
        Self {
            source: Source::Text(text),
            separator,
        }
    }

    fn child(&self, tree: &'de Tree) -> Self {
        Self::tree(tree, self.separator)
    }

    fn leaf_text(&self) -> Result<&'de str, DeError> {
        match self.source {
            Source::Text(text) => Ok(text),
            Source::Tree(tree) => match tree.text() {
                Some(text) => Ok(text),
                None if tree.value.is_some() => Err(de::Error::custom("value is absent")),
                None => Err(de::Error::custom("expected a value, found nested keys")),
            },
        }
    }

    fn parse<T: Scalar>(&self) -> Result<T, DeError> {
        let text = self.leaf_text()?;
        T::parse_text(text).map_err(|err| de::Error::custom(format!("`{text}`: {err}")))
    }

    fn is_absent(&self) -> bool {
        match self.source {
            Source::Text(_) => false,
            Source::Tree(tree) => tree.is_absent(),
        }
    }

    /// Indexed children ordered by position; every position up to the
    /// largest must be present.
    fn positions(&self, tree: &'de Tree) -> Result<Vec<Input<'de>>, DeError> {
        let mut slots: Vec<Option<&'de Tree>> = vec![None; tree.items.len()];
        for (index, child) in &tree.items {
            let position: usize = index
                .parse()
                .map_err(|_| de::Error::custom(format!("`{index}` is not a list position")))?;
            // With one child per position, anything past the child count leaves a gap.
            let Some(slot) = slots.get_mut(position) else {
                return Err(de::Error::custom(format!(
                    "list position {position} is past the end of {} item(s)",
                    tree.items.len()
                )));
            };
            *slot = Some(child);
        }
        slots
            .into_iter()
            .enumerate()
            .map(|(position, slot)| {
                slot.map(|tree| self.child(tree)).ok_or_else(|| {
                    de::Error::custom(format!("list position {position} is missing"))
                })
            })
            .collect()
    }

    fn split(&self) -> Result<Vec<Input<'de>>, DeError> {
        if self.is_absent() {
            return Ok(Vec::new());
        }
        let text = self.leaf_text()?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(text
            .split(self.separator)
            .map(|piece| Input::text(piece.trim(), self.separator))
            .collect())
    }

    fn entries(&self, tree: &'de Tree) -> Vec<(&'de str, Input<'de>)> {
        let items = tree
            .items
            .iter()
            .map(|(index, child)| (index.as_str(), self.child(child)));
        let members = tree
            .members
            .values()
            .map(|child| (child.name.as_str(), self.child(&child.tree)));
        items.chain(members).collect()
    }
}

macro_rules! deserialize_scalar {
    ($($method:ident => $visit:ident($ty:ty)),+ $(,)?) => {$(
        fn $method<V>(self, visitor: V) -> Result<V::Value, Self::Error>
        where
            V: Visitor<'de>,
        {
            visitor.$visit(self.parse::<$ty>()?)
        }
    )+};
}

impl<'de> Deserializer<'de> for Input<'de> {
    type Error = DeError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let tree = match self.source {
            Source::Text(text) => return visitor.visit_borrowed_str(text),
            Source::Tree(tree) => tree,
        };
        if !tree.members.is_empty() {
            return visitor.visit_map(MapDeserializer::new(self.entries(tree)));
        }
        if !tree.items.is_empty() {
            return match self.positions(tree) {
                Ok(items) => visitor.visit_seq(SeqDeserializer::new(items)),
                Err(_) => visitor.visit_map(MapDeserializer::new(self.entries(tree))),
            };
        }
        match tree.text() {
            Some(text) => visitor.visit_borrowed_str(text),
            None => visitor.visit_unit(),
        }
    }

    deserialize_scalar! {
        deserialize_bool => visit_bool(bool),
        deserialize_i8 => visit_i8(i8),
        deserialize_i16 => visit_i16(i16),
        deserialize_i32 => visit_i32(i32),
        deserialize_i64 => visit_i64(i64),
        deserialize_i128 => visit_i128(i128),
        deserialize_u8 => visit_u8(u8),
        deserialize_u16 => visit_u16(u16),
        deserialize_u32 => visit_u32(u32),
        deserialize_u64 => visit_u64(u64),
        deserialize_u128 => visit_u128(u128),
        deserialize_f32 => visit_f32(f32),
        deserialize_f64 => visit_f64(f64),
        deserialize_char => visit_char(char),
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.leaf_text()?)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_borrowed_bytes(self.leaf_text()?.as_bytes())
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if self.is_absent() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    /// Indexed children when there are any, otherwise the leaf split on the
    /// list separator.
    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let items = match self.source {
            Source::Tree(tree) if !tree.items.is_empty() => self.positions(tree)?,
            Source::Tree(tree) if !tree.members.is_empty() => {
                return Err(de::Error::custom("expected a list, found nested members"));
            }
            _ => self.split()?,
        };
        visitor.visit_seq(SeqDeserializer::new(items))
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.source {
            Source::Tree(tree)
                if tree.text().is_none() || !tree.members.is_empty() || !tree.items.is_empty() =>
            {
                visitor.visit_map(MapDeserializer::new(self.entries(tree)))
            }
            _ => Err(de::Error::custom("expected nested keys, found a value")),
        }
    }

    /// Member names match declared fields case-insensitively.
    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let Source::Tree(tree) = self.source else {
            return Err(de::Error::custom("expected nested keys, found a value"));
        };
        let entries = tree
            .members
            .iter()
            .map(|(folded, child)| {
                let name = fields
                    .iter()
                    .copied()
                    .find(|field| fold_name(field) == folded.as_str())
                    .unwrap_or(child.name.as_str());
                (name, self.child(&child.tree))
            })
            .collect();
        visitor.visit_map(MapDeserializer::new(entries))
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if let Source::Tree(tree) = self.source {
            if !tree.members.is_empty() {
                if tree.members.len() != 1 {
                    return Err(de::Error::custom("expected a single variant key"));
                }
                let Some(child) = tree.members.values().next() else {
                    return Err(de::Error::custom("expected a single variant key"));
                };
                return visitor.visit_enum(EnumDeserializer {
                    variant: variant_name(&child.name, variants),
                    value: Some(self.child(&child.tree)),
                });
            }
        }
        let text = self.leaf_text()?.trim();
        visitor.visit_enum(EnumDeserializer {
            variant: variant_name(text, variants),
            value: None,
        })
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

fn variant_name<'de>(text: &'de str, variants: &'static [&'static str]) -> &'de str {
    variants
        .iter()
        .copied()
        .find(|variant| variant.eq_ignore_ascii_case(text))
        .unwrap_or(text)
}

struct SeqDeserializer<'de> {
    iter: std::vec::IntoIter<Input<'de>>,
}

impl<'de> SeqDeserializer<'de> {
    fn new(items: Vec<Input<'de>>) -> Self {
        SeqDeserializer {
            iter: items.into_iter(),
        }
    }
}

impl<'de> SeqAccess<'de> for SeqDeserializer<'de> {
    type Error = DeError;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(item) => seed.deserialize(item).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapDeserializer<'de> {
    iter: std::vec::IntoIter<(&'de str, Input<'de>)>,
    value: Option<Input<'de>>,
}

impl<'de> MapDeserializer<'de> {
    fn new(entries: Vec<(&'de str, Input<'de>)>) -> Self {
        MapDeserializer {
            iter: entries.into_iter(),
            value: None,
        }
    }
}

impl<'de> MapAccess<'de> for MapDeserializer<'de> {
    type Error = DeError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                let separator = value.separator;
                self.value = Some(value);
                seed.deserialize(Input::text(key, separator)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(value),
            None => Err(de::Error::custom("value is missing for key")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct EnumDeserializer<'de> {
    variant: &'de str,
    value: Option<Input<'de>>,
}

impl<'de> EnumAccess<'de> for EnumDeserializer<'de> {
    type Error = DeError;
    type Variant = VariantDeserializer<'de>;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant), Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        let name: de::value::StrDeserializer<'_, DeError> = self.variant.into_deserializer();
        let variant = seed.deserialize(name)?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer<'de> {
    value: Option<Input<'de>>,
}

impl<'de> VariantAccess<'de> for VariantDeserializer<'de> {
    type Error = DeError;

    fn unit_variant(self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value, Self::Error>
    where
        T: DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(value),
            None => Err(de::Error::custom("expected newtype variant")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Some(value) => value.deserialize_seq(visitor),
            None => Err(de::Error::custom("expected tuple variant")),
        }
    }

    fn struct_variant<V>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Some(value) => value.deserialize_struct("", fields, visitor),
            None => Err(de::Error::custom("expected struct variant")),
        }
    }
}
