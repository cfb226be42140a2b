//! Serde bridge: configuration text to and from any `Deserialize`/`Serialize` type.
//!
//! Decoding folds the parsed pairs into a [`Tree`] keyed the same way the
//! populator resolves keys (member names case-insensitive, index text
//! verbatim) and deserializes from it, parsing leaf text on demand.
//! Encoding goes through `serde_json::Value` and flattens it into
//! `key = value` lines.

mod de;
mod ser;

use std::io::Read;

use ::serde::de::DeserializeOwned;
use ::serde::Serialize;
use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::decode::{self, INLINE_SOURCE};
use crate::options::{BindOptions, EncodeOptions};
use crate::types::{Pair, Value};
use crate::{Error, Result};

pub(crate) use de::{DeError, Input};

/// Pairs folded into a nested structure; later writes replace earlier ones.
#[derive(Debug, Default)]
pub(crate) struct Tree {
    value: Option<Value>,
    members: IndexMap<SmolStr, Child>,
    items: IndexMap<String, Tree>,
}

/// A named member, spelled as first written.
#[derive(Debug)]
struct Child {
    name: SmolStr,
    tree: Tree,
}

impl Tree {
    pub(crate) fn from_pairs(pairs: &[Pair]) -> Self {
        let mut root = Tree::default();
        for pair in pairs {
            let mut node = &mut root;
            for part in pair.key().parts() {
                node = &mut node
                    .members
                    .entry(SmolStr::new(part.folded_name()))
                    .or_insert_with(|| Child {
                        name: SmolStr::new(part.name().trim()),
                        tree: Tree::default(),
                    })
                    .tree;
                for index in part.indices() {
                    node = node.items.entry(index.text().to_string()).or_default();
                }
            }
            node.value = Some(pair.value().clone());
        }
        root
    }

    fn text(&self) -> Option<&str> {
        self.value.as_ref().and_then(Value::as_str)
    }

    fn is_absent(&self) -> bool {
        self.text().is_none() && self.members.is_empty() && self.items.is_empty()
    }
}

pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T> {
    from_str_with_options(input, &BindOptions::default())
}

/// Uses the options' list separator for sequences written on one line.
pub fn from_str_with_options<T: DeserializeOwned>(input: &str, options: &BindOptions) -> Result<T> {
    from_pairs(decode::parse_str(input).pairs(), options)
}

pub fn from_reader<T: DeserializeOwned, R: Read>(reader: R) -> Result<T> {
    let content = decode::from_reader(reader, INLINE_SOURCE)?;
    from_pairs(content.pairs(), &BindOptions::default())
}

pub fn from_pairs<T: DeserializeOwned>(pairs: &[Pair], options: &BindOptions) -> Result<T> {
    let tree = Tree::from_pairs(pairs);
    T::deserialize(Input::tree(&tree, options.separator))
        .map_err(|err: DeError| Error::deserialize(err.to_string()))
}

pub fn to_string<T: Serialize>(value: &T) -> Result<String> {
    to_string_with_options(value, &EncodeOptions::default())
}

pub fn to_string_with_options<T: Serialize>(value: &T, options: &EncodeOptions) -> Result<String> {
    ser::to_string(value, options)
}
