use std::io;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Conversion,
    Source,
    Encode,
    Serialize,
    Deserialize,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error("failed to read source `{source_id}`: {source}")]
    Source {
        source_id: String,
        #[source]
        source: io::Error,
    },
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("serialize failed: {0}")]
    Serialize(String),
    #[error("deserialize failed: {0}")]
    Deserialize(String),
}

impl Error {
    pub fn encode(message: impl Into<String>) -> Self {
        Error::Encode(message.into())
    }

    pub fn serialize(message: impl Into<String>) -> Self {
        Error::Serialize(message.into())
    }

    pub fn deserialize(message: impl Into<String>) -> Self {
        Error::Deserialize(message.into())
    }

    pub fn read_failed(source_id: impl Into<String>, source: io::Error) -> Self {
        Error::Source {
            source_id: source_id.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Conversion(_) => ErrorKind::Conversion,
            Error::Source { .. } => ErrorKind::Source,
            Error::Encode(_) => ErrorKind::Encode,
            Error::Serialize(_) => ErrorKind::Serialize,
            Error::Deserialize(_) => ErrorKind::Deserialize,
        }
    }
}

/// A leaf value that could not be converted into its target member.
///
/// One of these is produced per failing pair; it names the key as written in
/// the source, the raw text (`None` for an absent block value), the member it
/// was headed for and the underlying cause.
#[derive(Debug, Error)]
#[error("cannot convert {} for `{key}` into `{member}` of {type_name}: {source}", display_raw(.raw))]
pub struct ConversionError {
    pub key: String,
    pub raw: Option<String>,
    pub member: String,
    pub type_name: &'static str,
    #[source]
    pub source: BoxError,
}

fn display_raw(raw: &Option<String>) -> String {
    match raw {
        Some(raw) => format!("{raw:?}"),
        None => "<absent>".to_string(),
    }
}

/// Causes raised by the built-in conversions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("`{value}` is not a variant of {type_name}")]
    UnknownVariant {
        value: String,
        type_name: &'static str,
    },
    #[error("no type registered under `{0}`")]
    UnknownType(String),
    #[error("type `{name}` does not produce {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
    },
    #[error("no converter registered under `{0}`")]
    UnknownConverter(String),
    #[error("converter `{converter}` cannot write into {type_name}")]
    UnsupportedTarget {
        converter: String,
        type_name: &'static str,
    },
    #[error("`{0}` is not a list position")]
    InvalidPosition(String),
    #[error("list position {position} is too far past the end of {len} item(s)")]
    PositionOutOfRange { position: usize, len: usize },
    #[error("index expects {expected} component(s), found {found}")]
    IndexArity { expected: usize, found: usize },
    #[error("`{0}` is not a boolean")]
    InvalidBool(String),
    #[error("`{0}` is not a single character")]
    InvalidChar(String),
    #[error("{0} cannot be assigned from text, index it instead")]
    NotAssignable(&'static str),
}
