use std::sync::Arc;

use crate::constants::DEFAULT_LIST_SEPARATOR;
use crate::convert::{ConverterRegistry, TypeRegistry};

#[derive(Debug, Clone)]
pub struct BindOptions {
    pub separator: char,
    pub types: Arc<TypeRegistry>,
    pub converters: Arc<ConverterRegistry>,
}

impl BindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_types(mut self, types: impl Into<Arc<TypeRegistry>>) -> Self {
        self.types = types.into();
        self
    }

    pub fn with_converters(mut self, converters: impl Into<Arc<ConverterRegistry>>) -> Self {
        self.converters = converters.into();
        self
    }
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            separator: DEFAULT_LIST_SEPARATOR,
            types: Arc::new(TypeRegistry::new()),
            converters: Arc::new(ConverterRegistry::new()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    /// Write `key=value` instead of `key = value`.
    pub compact: bool,
    pub line_ending: LineEnding,
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }
}
