pub const ASSIGN: char = '=';

pub const PART_SEPARATOR: char = '.';

pub const INDEX_OPEN: char = '[';

pub const INDEX_CLOSE: char = ']';

pub const INDEX_TOKEN_SEPARATOR: char = ',';

pub const BLOCK_OPEN: &str = "{";

pub const BLOCK_CLOSE: &str = "}";

pub const DEFAULT_LIST_SEPARATOR: char = ',';

pub const FLAGS_SEPARATOR: char = '|';

/// Member consulted when an indexed key part lands on an object without an indexer.
pub const ITEM_MEMBER: &str = "Item";

/// How far past its current end a list may be extended by one indexed write.
pub const MAX_POSITION_GAP: usize = 1 << 16;

#[inline]
pub fn is_structural_char(ch: char) -> bool {
    matches!(ch, '.' | '[' | ']' | '=')
}

#[inline]
pub fn is_block_open(rest: &str) -> bool {
    rest.trim() == BLOCK_OPEN
}

#[inline]
pub fn is_block_close(line: &str) -> bool {
    line.trim() == BLOCK_CLOSE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn test_is_structural_char() {
        assert!(is_structural_char('.'));
        assert!(is_structural_char('['));
        assert!(is_structural_char(']'));
        assert!(is_structural_char('='));
        assert!(!is_structural_char('a'));
        assert!(!is_structural_char(' '));
        assert!(!is_structural_char(','));
    }

    #[rstest::rstest]
    fn test_block_markers() {
        assert!(is_block_open("{"));
        assert!(is_block_open("  {\t"));
        assert!(!is_block_open("{}"));
        assert!(!is_block_open("{ x"));
        assert!(is_block_close("   }"));
        assert!(!is_block_close("} x"));
    }
}
