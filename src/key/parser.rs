use smallvec::SmallVec;

use crate::constants::{INDEX_CLOSE, INDEX_OPEN, INDEX_TOKEN_SEPARATOR, PART_SEPARATOR};
use crate::key::{Index, IndexToken, KeyPart, Parts, Tokens};

pub(crate) fn parse_parts(text: &str) -> Parts {
    let mut parts = Parts::new();
    if text.trim().is_empty() {
        return parts;
    }
    for segment in split_top_level(text, PART_SEPARATOR) {
        parts.push(parse_part(segment));
    }
    parts
}

pub(crate) fn parse_part(segment: &str) -> KeyPart {
    let Some(open) = segment.find(INDEX_OPEN) else {
        return KeyPart::from_parts(segment, SmallVec::new());
    };
    let name = &segment[..open];
    let mut indices = SmallVec::new();
    let mut rest = &segment[open..];
    while let Some(start) = rest.find(INDEX_OPEN) {
        let body = &rest[start + INDEX_OPEN.len_utf8()..];
        match matching_close(body) {
            Some(close) => {
                indices.push(parse_index(&body[..close]));
                rest = &body[close + INDEX_CLOSE.len_utf8()..];
            }
            None => {
                indices.push(parse_index(body));
                break;
            }
        }
    }
    KeyPart::from_parts(name, indices)
}

pub(crate) fn parse_index(content: &str) -> Index {
    let tokens: Tokens = split_top_level(content, INDEX_TOKEN_SEPARATOR)
        .into_iter()
        .map(IndexToken::new)
        .collect();
    Index::from_parts(content.trim(), tokens)
}

fn matching_close(body: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, ch) in body.char_indices() {
        match ch {
            INDEX_OPEN => depth += 1,
            INDEX_CLOSE if depth == 0 => return Some(idx),
            INDEX_CLOSE => depth -= 1,
            _ => {}
        }
    }
    None
}

fn split_top_level(text: &str, separator: char) -> SmallVec<[&str; 4]> {
    let mut pieces = SmallVec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, ch) in text.char_indices() {
        match ch {
            INDEX_OPEN => depth += 1,
            INDEX_CLOSE => depth = depth.saturating_sub(1),
            _ if ch == separator && depth == 0 => {
                pieces.push(&text[start..idx]);
                start = idx + separator.len_utf8();
            }
            _ => {}
        }
    }
    pieces.push(&text[start..]);
    pieces
}
