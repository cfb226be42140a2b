use crate::constants::{is_block_close, is_structural_char, ASSIGN, BLOCK_CLOSE, BLOCK_OPEN};
use crate::options::EncodeOptions;
use crate::{Error, Result};

pub(crate) struct Writer {
    buffer: String,
    pub(crate) options: EncodeOptions,
    lines: usize,
}

impl Writer {
    pub fn new(options: EncodeOptions) -> Self {
        Self {
            buffer: String::new(),
            options,
            lines: 0,
        }
    }

    pub fn finish(self) -> String {
        self.buffer
    }

    /// Number of `key = value` entries written so far.
    pub fn len(&self) -> usize {
        self.lines
    }

    pub fn write_pair(&mut self, key: &str, value: &str) -> Result<()> {
        if needs_block(value) {
            check_block(key, value)?;
            self.write_assignment(key, BLOCK_OPEN);
            self.buffer.push_str(value);
            self.write_newline();
            self.buffer.push_str(BLOCK_CLOSE);
        } else {
            self.write_assignment(key, value);
        }
        self.write_newline();
        self.lines += 1;
        Ok(())
    }

    fn write_assignment(&mut self, key: &str, value: &str) {
        self.buffer.push_str(key);
        if self.options.compact {
            self.buffer.push(ASSIGN);
        } else {
            self.buffer.push(' ');
            self.buffer.push(ASSIGN);
            if !value.is_empty() {
                self.buffer.push(' ');
            }
        }
        self.buffer.push_str(value);
        if value == BLOCK_OPEN {
            self.write_newline();
        }
    }

    fn write_newline(&mut self) {
        self.buffer.push_str(self.options.line_ending.as_str());
    }
}

/// Inline values are trimmed by the scanner and a lone `{` opens a block,
/// so anything that would not survive that goes into a block.
pub(crate) fn needs_block(value: &str) -> bool {
    value.contains(['\n', '\r']) || value.trim() != value || value == BLOCK_OPEN
}

fn check_block(key: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::encode(format!(
            "`{key}`: whitespace-only text reads back as an absent value"
        )));
    }
    if value.split('\n').any(is_block_close) {
        return Err(Error::encode(format!(
            "`{key}`: a line consisting of `}}` would close the block early"
        )));
    }
    Ok(())
}

/// Member names and index text must parse back as the same key part.
pub(crate) fn check_name(name: &str) -> Result<()> {
    if name.is_empty() || name.trim() != name {
        return Err(Error::encode(format!(
            "member name `{name}` is empty or has outer whitespace"
        )));
    }
    if name.chars().any(|ch| is_structural_char(ch) || ch.is_control()) {
        return Err(Error::encode(format!(
            "member name `{name}` contains a key delimiter"
        )));
    }
    Ok(())
}

pub(crate) fn check_index(index: &str) -> Result<()> {
    if index.trim() != index || index.contains(['[', ']', '\n', '\r']) {
        return Err(Error::encode(format!("index `{index}` cannot be written as a key")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::raw_pairs;
    use crate::options::LineEnding;

    fn written(value: &str, options: EncodeOptions) -> String {
        let mut writer = Writer::new(options);
        writer.write_pair("x", value).unwrap();
        writer.finish()
    }

    #[rstest::rstest]
    #[case("plain", "x = plain\n")]
    #[case("", "x =\n")]
    #[case("{a}", "x = {a}\n")]
    #[case("{", "x = {\n{\n}\n")]
    #[case(" padded", "x = {\n padded\n}\n")]
    #[case("a\nb", "x = {\na\nb\n}\n")]
    fn test_inline_or_block(#[case] value: &str, #[case] expected: &str) {
        assert_eq!(written(value, EncodeOptions::default()), expected);
    }

    #[rstest::rstest]
    #[case("\n    line1\n    line2\n    ")]
    #[case("  both sides  ")]
    #[case("{")]
    #[case("")]
    #[case("trailing\n")]
    fn test_written_values_scan_back(#[case] value: &str) {
        for ending in [LineEnding::Lf, LineEnding::CrLf] {
            let text = written(value, EncodeOptions::default().with_line_ending(ending));
            let pairs: Vec<_> = raw_pairs(&text).collect();
            assert_eq!(pairs.len(), 1);
            assert_eq!(pairs[0].value, Some(value));
        }
    }

    #[rstest::rstest]
    fn test_compact() {
        assert_eq!(written("1", EncodeOptions::default().with_compact(true)), "x=1\n");
    }

    #[rstest::rstest]
    #[case("   ")]
    #[case("a\n  }\nb")]
    fn test_unrepresentable_values(#[case] value: &str) {
        let mut writer = Writer::new(EncodeOptions::default());
        assert!(writer.write_pair("x", value).is_err());
    }

    #[rstest::rstest]
    #[case("ok name", true)]
    #[case("a.b", false)]
    #[case("a[0]", false)]
    #[case("a=b", false)]
    #[case(" a", false)]
    #[case("", false)]
    fn test_check_name(#[case] name: &str, #[case] valid: bool) {
        assert_eq!(check_name(name).is_ok(), valid);
    }
}
