use std::fmt;

/// Value text of one pair.
///
/// Absent (`None`) comes from a block holding only whitespace and is distinct
/// from an empty single-line value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Value(Option<String>);

impl Value {
    pub fn new(content: impl Into<String>) -> Self {
        Value(Some(content.into()))
    }

    pub fn absent() -> Self {
        Value(None)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }

    pub fn into_inner(self) -> Option<String> {
        self.0
    }
}

impl From<Option<&str>> for Value {
    fn from(content: Option<&str>) -> Self {
        Value(content.map(str::to_string))
    }
}

impl From<&str> for Value {
    fn from(content: &str) -> Self {
        Value::new(content)
    }
}

impl From<String> for Value {
    fn from(content: String) -> Self {
        Value(Some(content))
    }
}

impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or_default())
    }
}
