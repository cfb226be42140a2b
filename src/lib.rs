pub mod bind;
pub mod configuration;
pub mod constants;
pub mod convert;
pub mod decode;
pub mod encode;
pub mod error;
pub mod key;
pub mod lookup;
pub mod num {
    pub mod number;
}
pub mod options;
pub mod serde;
pub mod types;

use std::io::Read;

use ::serde::de::DeserializeOwned;
use ::serde::Serialize;

pub use crate::bind::{
    Bindable, Configurable, FieldPolicy, IgnoreCase, KeyComparer, Member, Ordinal, Populator,
    Scalar,
};
pub use crate::configuration::{Configuration, ContentSource, FileSource, TextSource};
pub use crate::convert::{
    ConfigEnum, ConvertContext, Converter, ConverterRegistry, Dynamic, IndexKey, TypeRef,
    TypeRegistry,
};
pub use crate::decode::{parse_sources, parse_str, ParsedContent};
pub use crate::encode::{to_config_string, to_config_string_default};
pub use crate::error::{BoxError, ConversionError, Error, ErrorKind, ValueError};
pub use crate::key::{Index, IndexToken, KeyPart, KeyPath};
pub use crate::lookup::Lookup;
pub use crate::options::{BindOptions, EncodeOptions, LineEnding};
pub use crate::types::{Pair, Value};

pub type Result<T> = std::result::Result<T, Error>;

/// Parses `input` and binds every pair under `prefix` into `target`.
pub fn configure_str<T: Configurable>(input: &str, target: T, prefix: &str) -> Result<T> {
    configure_str_with_options(input, target, prefix, &BindOptions::default())
}

pub fn configure_str_with_options<T: Configurable>(
    input: &str,
    target: T,
    prefix: &str,
    options: &BindOptions,
) -> Result<T> {
    let content = parse_str(input);
    Populator::new(content.pairs())
        .with_options(options.clone())
        .configure(target, prefix)
}

pub fn to_string<T: Serialize>(value: &T) -> Result<String> {
    crate::serde::to_string(value)
}

pub fn to_string_with_options<T: Serialize>(value: &T, options: &EncodeOptions) -> Result<String> {
    crate::serde::to_string_with_options(value, options)
}

pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T> {
    crate::serde::from_str(input)
}

pub fn from_str_with_options<T: DeserializeOwned>(input: &str, options: &BindOptions) -> Result<T> {
    crate::serde::from_str_with_options(input, options)
}

pub fn from_reader<T: DeserializeOwned, R: Read>(reader: R) -> Result<T> {
    crate::serde::from_reader(reader)
}
