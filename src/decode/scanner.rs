use crate::constants::{is_block_close, is_block_open, ASSIGN, INDEX_CLOSE, INDEX_OPEN};
use crate::decode::scan::{Lines, ScanLine};

/// Key and value text exactly as they were cut out of the source.
///
/// `value` is `None` when a block value held nothing but whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPair<'a> {
    pub key: &'a str,
    pub value: Option<&'a str>,
    pub line: usize,
}

/// Single pass over a text blob producing [`RawPair`]s.
///
/// Lines that are blank or lack a top-level `=` are skipped. A value whose
/// remainder is exactly `{` opens a block that runs up to the next line
/// trimming to `}`; if no such line follows, the `{` is kept as a literal.
pub struct Scanner<'a> {
    input: &'a str,
    lines: Lines<'a>,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            lines: Lines::new(input),
        }
    }

    fn line_text(&self, line: &ScanLine) -> &'a str {
        &self.input[line.start..line.end]
    }

    fn capture_block(&self, open: &ScanLine) -> Option<(Option<&'a str>, Lines<'a>)> {
        if !open.is_terminated() {
            return None;
        }
        let mut lookahead = self.lines.clone();
        #[allow(clippy::while_let_on_iterator)]
        while let Some(line) = lookahead.next() {
            if !is_block_close(self.line_text(&line)) {
                continue;
            }
            let start = open.next;
            let end = strip_terminator(self.input.as_bytes(), start, line.start);
            let content = &self.input[start..end];
            let value = if content.trim().is_empty() {
                None
            } else {
                Some(content)
            };
            return Some((value, lookahead));
        }
        None
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = RawPair<'a>;

    fn next(&mut self) -> Option<RawPair<'a>> {
        while let Some(line) = self.lines.next() {
            let Some((key, rest)) = split_assignment(self.line_text(&line)) else {
                continue;
            };
            if is_block_open(rest) {
                if let Some((value, resume)) = self.capture_block(&line) {
                    self.lines = resume;
                    return Some(RawPair {
                        key,
                        value,
                        line: line.number,
                    });
                }
            }
            return Some(RawPair {
                key,
                value: Some(rest.trim()),
                line: line.number,
            });
        }
        None
    }
}

/// Splits `key = rest` at the first `=` outside brackets.
pub fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (idx, ch) in line.char_indices() {
        match ch {
            INDEX_OPEN => depth += 1,
            INDEX_CLOSE => depth = depth.saturating_sub(1),
            ASSIGN if depth == 0 => {
                let key = line[..idx].trim();
                if key.is_empty() {
                    return None;
                }
                return Some((key, &line[idx + ASSIGN.len_utf8()..]));
            }
            _ => {}
        }
    }
    None
}

// The closing line starts right after a terminator unless the block is empty.
fn strip_terminator(bytes: &[u8], start: usize, close_start: usize) -> usize {
    let mut end = close_start;
    if end > start && bytes[end - 1] == b'\n' {
        end -= 1;
        if end > start && bytes[end - 1] == b'\r' {
            end -= 1;
        }
    }
    end
}
