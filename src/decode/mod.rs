pub mod scan;
pub mod scanner;

use std::io::Read;

use smol_str::SmolStr;
use tracing::debug;

use crate::lookup::Lookup;
use crate::types::Pair;
use crate::{Error, Result};

pub use scanner::{RawPair, Scanner};

pub const INLINE_SOURCE: &str = "<inline>";

pub fn raw_pairs(input: &str) -> Scanner<'_> {
    Scanner::new(input)
}

pub fn parse_pairs(input: &str) -> impl Iterator<Item = Pair> + '_ {
    Scanner::new(input).map(Pair::from)
}

pub fn parse_str(input: &str) -> ParsedContent {
    let mut content = ParsedContent::new();
    content.add_source(INLINE_SOURCE, input);
    content
}

/// Parses `(source_id, text)` sources in order into one content set.
pub fn parse_sources<'a, I>(sources: I) -> ParsedContent
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut content = ParsedContent::new();
    for (source_id, text) in sources {
        content.add_source(source_id, text);
    }
    content
}

pub fn from_reader<R: Read>(mut reader: R, source_id: &str) -> Result<ParsedContent> {
    let mut buf = String::new();
    reader
        .read_to_string(&mut buf)
        .map_err(|err| Error::read_failed(source_id, err))?;
    let mut content = ParsedContent::new();
    content.add_source(source_id, &buf);
    Ok(content)
}

/// Every pair parsed from one or more sources, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedContent {
    pairs: Vec<Pair>,
    sources: Vec<SmolStr>,
}

impl ParsedContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the pairs of `text` after those already held.
    pub fn add_source(&mut self, source_id: &str, text: &str) -> usize {
        let before = self.pairs.len();
        self.pairs.extend(parse_pairs(text));
        self.sources.push(SmolStr::new(source_id));
        let added = self.pairs.len() - before;
        debug!(source = source_id, pairs = added, "parsed configuration source");
        added
    }

    pub fn push(&mut self, pair: Pair) {
        self.pairs.push(pair);
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(SmolStr::as_str)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn lookup(&self) -> Lookup {
        Lookup::new(&self.pairs)
    }

    pub fn into_pairs(self) -> Vec<Pair> {
        self.pairs
    }
}

impl FromIterator<Pair> for ParsedContent {
    fn from_iter<I: IntoIterator<Item = Pair>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
            sources: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn test_parsing_is_idempotent() {
        let text = "a = 1\nb.c[x] = {\n  two\n}\n";
        assert_eq!(parse_str(text), parse_str(text));
    }

    #[rstest::rstest]
    fn test_sources_accumulate_in_order() {
        let mut content = ParsedContent::new();
        assert_eq!(content.add_source("base.cfg", "a = 1\nb = 2"), 2);
        assert_eq!(content.add_source("local.cfg", "a = 3"), 1);
        let sources: Vec<&str> = content.sources().collect();
        assert_eq!(sources, vec!["base.cfg", "local.cfg"]);
        let texts: Vec<&str> = content.pairs().iter().map(|pair| pair.text()).collect();
        assert_eq!(texts, vec!["a=1", "b=2", "a=3"]);
    }

    #[rstest::rstest]
    fn test_parse_sources_later_wins() {
        let content = parse_sources([("a.cfg", "x = 1"), ("b.cfg", "x = 2")]);
        assert_eq!(content.lookup().value("x"), Some("2"));
        assert_eq!(content.lookup().all("x").count(), 2);
    }

    #[rstest::rstest]
    fn test_from_reader() {
        let content = from_reader("x = 1".as_bytes(), "reader").unwrap();
        assert_eq!(content.len(), 1);
        assert_eq!(content.sources().next(), Some("reader"));
    }
}
