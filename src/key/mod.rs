//! Key paths: dotted member names with optional bracketed indices.
//!
//! `kid[0].mom.jobs[1, a]` parses into three [`KeyPart`]s. Part names compare
//! case-insensitively after trimming; index content compares case-sensitively
//! after trimming only its outer whitespace.

mod parser;

use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use smallvec::SmallVec;
use smol_str::SmolStr;

pub(crate) type Tokens = SmallVec<[IndexToken; 2]>;
pub(crate) type Indices = SmallVec<[Index; 1]>;
pub(crate) type Parts = SmallVec<[KeyPart; 4]>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexToken {
    text: SmolStr,
}

impl IndexToken {
    pub fn new(text: &str) -> Self {
        Self {
            text: SmolStr::new(text.trim()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// The content of one `[...]` suffix.
#[derive(Debug, Clone)]
pub struct Index {
    text: SmolStr,
    tokens: Tokens,
}

impl Index {
    pub fn parse(content: &str) -> Self {
        parser::parse_index(content)
    }

    pub(crate) fn from_parts(text: &str, tokens: Tokens) -> Self {
        Self {
            text: SmolStr::new(text),
            tokens,
        }
    }

    /// Trimmed literal between the brackets, commas included.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[IndexToken] {
        &self.tokens
    }

    pub fn is_composite(&self) -> bool {
        self.tokens.len() > 1
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl PartialEq for Index {
    fn eq(&self, other: &Self) -> bool {
        self.tokens == other.tokens
    }
}

impl Eq for Index {}

impl Hash for Index {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tokens.hash(state);
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.text)
    }
}

#[derive(Debug, Clone)]
pub struct KeyPart {
    name: SmolStr,
    folded: SmolStr,
    indices: Indices,
}

impl KeyPart {
    pub(crate) fn from_parts(name: &str, indices: Indices) -> Self {
        Self {
            name: SmolStr::new(name),
            folded: fold_name(name),
            indices,
        }
    }

    /// Name as written, before trimming or case folding.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn indices(&self) -> &[Index] {
        &self.indices
    }

    pub fn has_index(&self) -> bool {
        !self.indices.is_empty()
    }

    pub fn first_index(&self) -> Option<&Index> {
        self.indices.first()
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.folded == fold_name(name)
    }

    pub(crate) fn folded_name(&self) -> &str {
        &self.folded
    }
}

impl PartialEq for KeyPart {
    fn eq(&self, other: &Self) -> bool {
        self.folded == other.folded && self.indices == other.indices
    }
}

impl Eq for KeyPart {}

impl Hash for KeyPart {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.folded.hash(state);
        self.indices.hash(state);
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.trim())?;
        for index in &self.indices {
            write!(f, "{index}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath {
    parts: Parts,
}

impl KeyPath {
    pub fn parse(text: &str) -> Self {
        Self {
            parts: parser::parse_parts(text),
        }
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn first(&self) -> Option<&KeyPart> {
        self.parts.first()
    }

    /// Case-insensitive comparison of the first part's name.
    pub fn starts_with(&self, name: &str) -> bool {
        self.first().is_some_and(|part| part.matches_name(name))
    }

    /// The same path without its first part.
    pub fn skip(&self) -> KeyPath {
        Self {
            parts: self.parts.iter().skip(1).cloned().collect(),
        }
    }

    /// Remaining parts when every part of `prefix` equals the leading parts of `self`.
    pub fn strip_prefix(&self, prefix: &KeyPath) -> Option<&[KeyPart]> {
        strip_parts(&self.parts, prefix.parts())
    }
}

pub(crate) fn strip_parts<'k>(parts: &'k [KeyPart], prefix: &[KeyPart]) -> Option<&'k [KeyPart]> {
    if prefix.len() > parts.len() {
        return None;
    }
    let (head, tail) = parts.split_at(prefix.len());
    if head == prefix {
        Some(tail)
    } else {
        None
    }
}

impl FromStr for KeyPath {
    type Err = Infallible;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Ok(KeyPath::parse(text))
    }
}

impl From<&str> for KeyPath {
    fn from(text: &str) -> Self {
        KeyPath::parse(text)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, part) in self.parts.iter().enumerate() {
            if idx > 0 {
                f.write_str(".")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

pub(crate) fn fold_name(name: &str) -> SmolStr {
    let trimmed = name.trim();
    if trimmed.is_ascii() {
        if trimmed.bytes().any(|byte| byte.is_ascii_uppercase()) {
            SmolStr::new(trimmed.to_ascii_lowercase())
        } else {
            SmolStr::new(trimmed)
        }
    } else {
        SmolStr::new(trimmed.to_lowercase())
    }
}
