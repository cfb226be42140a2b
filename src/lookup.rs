use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::key::KeyPath;
use crate::types::{Pair, Value};

type Bucket = SmallVec<[Value; 1]>;

/// Read-only multimap from key path to every value written under it.
///
/// Keys are grouped with [`KeyPath`] equality, so `Man.Best friend` and
/// `man.best FRIEND` land in the same bucket while `m[a B]` and `m[a b]`
/// do not. Buckets keep source order; [`Lookup::value`] reports the last
/// entry.
#[derive(Debug, Clone, Default)]
pub struct Lookup {
    entries: IndexMap<KeyPath, Bucket>,
}

impl Lookup {
    pub fn new(pairs: &[Pair]) -> Self {
        let mut entries: IndexMap<KeyPath, Bucket> = IndexMap::new();
        for pair in pairs {
            entries
                .entry(pair.key().clone())
                .or_default()
                .push(pair.value().clone());
        }
        Self { entries }
    }

    /// Number of distinct keys.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&KeyPath::parse(key))
    }

    /// Last value written under `key`; `None` when the key is missing or
    /// its last value is absent.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(&KeyPath::parse(key))
            .and_then(|values| values.last())
            .and_then(Value::as_str)
    }

    /// Every value written under `key`, in source order.
    pub fn all<'s>(&'s self, key: &str) -> impl Iterator<Item = &'s Value> + 's {
        self.get(&KeyPath::parse(key))
            .unwrap_or_default()
            .iter()
    }

    pub fn get(&self, key: &KeyPath) -> Option<&[Value]> {
        self.entries.get(key).map(|bucket| bucket.as_slice())
    }

    /// Distinct keys in first-encounter order, spelled as first encountered.
    pub fn keys(&self) -> impl Iterator<Item = &KeyPath> {
        self.entries.keys()
    }
}

impl From<&[Pair]> for Lookup {
    fn from(pairs: &[Pair]) -> Self {
        Lookup::new(pairs)
    }
}
