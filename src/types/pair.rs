use std::fmt;

use once_cell::sync::OnceCell;

use crate::decode::scanner::RawPair;
use crate::key::KeyPath;
use crate::types::Value;

/// A parsed key path together with its value.
#[derive(Clone, Debug)]
pub struct Pair {
    key: KeyPath,
    value: Value,
    text: OnceCell<String>,
}

impl Pair {
    pub fn new(key: KeyPath, value: Value) -> Self {
        Self {
            key,
            value,
            text: OnceCell::new(),
        }
    }

    pub fn parse(key: &str, value: impl Into<Value>) -> Self {
        Self::new(KeyPath::parse(key), value.into())
    }

    pub fn key(&self) -> &KeyPath {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// `key=value` rendering, computed on first use.
    pub fn text(&self) -> &str {
        self.text
            .get_or_init(|| format!("{}={}", self.key, self.value))
    }
}

impl From<RawPair<'_>> for Pair {
    fn from(raw: RawPair<'_>) -> Self {
        Pair::new(KeyPath::parse(raw.key), Value::from(raw.value))
    }
}

impl PartialEq for Pair {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value == other.value
    }
}

impl Eq for Pair {}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
