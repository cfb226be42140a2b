use memchr::memchr;

/// One physical line of the source.
///
/// `start..end` is the line content without its terminator; `next` is the
/// offset of the following line (equal to `end` on the final line).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanLine {
    pub number: usize,
    pub start: usize,
    pub end: usize,
    pub next: usize,
}

impl ScanLine {
    pub fn is_terminated(&self) -> bool {
        self.next > self.end
    }
}

#[derive(Clone, Debug)]
pub struct Lines<'a> {
    bytes: &'a [u8],
    position: usize,
    number: usize,
    done: bool,
}

impl<'a> Lines<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            bytes: input.as_bytes(),
            position: 0,
            number: 0,
            done: false,
        }
    }
}

impl Iterator for Lines<'_> {
    type Item = ScanLine;

    fn next(&mut self) -> Option<ScanLine> {
        if self.done {
            return None;
        }
        let start = self.position;
        self.number += 1;
        match memchr(b'\n', &self.bytes[start..]) {
            Some(offset) => {
                let newline = start + offset;
                let mut end = newline;
                if end > start && self.bytes[end - 1] == b'\r' {
                    end -= 1;
                }
                self.position = newline + 1;
                Some(ScanLine {
                    number: self.number,
                    start,
                    end,
                    next: self.position,
                })
            }
            None => {
                self.done = true;
                let end = self.bytes.len();
                self.position = end;
                Some(ScanLine {
                    number: self.number,
                    start,
                    end,
                    next: end,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(input: &str) -> Vec<&str> {
        Lines::new(input).map(|line| &input[line.start..line.end]).collect()
    }

    #[rstest::rstest]
    fn test_splits_lf_and_crlf() {
        assert_eq!(spans("a=1\r\nb=2\nc=3"), vec!["a=1", "b=2", "c=3"]);
    }

    #[rstest::rstest]
    fn test_trailing_newline_yields_empty_tail() {
        assert_eq!(spans("a\n"), vec!["a", ""]);
        assert_eq!(spans(""), vec![""]);
    }

    #[rstest::rstest]
    fn test_line_numbers_and_offsets() {
        let lines: Vec<ScanLine> = Lines::new("x\r\ny").collect();
        assert_eq!(lines[0].number, 1);
        assert_eq!(lines[0].next, 3);
        assert!(lines[0].is_terminated());
        assert_eq!(lines[1].number, 2);
        assert!(!lines[1].is_terminated());
    }
}
