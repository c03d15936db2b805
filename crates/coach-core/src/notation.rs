//! Scanner that splits chat text into plain spans and move-notation tokens.

use serde::{Deserialize, Serialize};

/// One span of a scanned message. Concatenating the `text` of every segment
/// reproduces the input exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    /// Plain text between tokens.
    Text { text: String },
    /// A move-notation token with its byte offsets in the source message.
    Token {
        text: String,
        start: usize,
        end: usize,
    },
}

impl Segment {
    /// The segment's slice of the original message.
    pub fn text(&self) -> &str {
        match self {
            Segment::Text { text } => text,
            Segment::Token { text, .. } => text,
        }
    }
}

/// Scan `text` for SAN-shaped tokens, greedily and left to right.
///
/// A candidate only becomes a token when it sits on word boundaries: a match
/// embedded in a longer alphanumeric run ("abce4", "e44") stays plain text.
/// Tokens never overlap, and scanning is purely textual; whether a token is
/// actually playable is decided later, against a position.
pub fn scan_message(text: &str) -> Vec<Segment> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match match_token_at(bytes, i) {
            Some(end) if boundary_ok(bytes, i, end) => {
                if i > plain_start {
                    segments.push(Segment::Text {
                        text: text[plain_start..i].to_string(),
                    });
                }
                segments.push(Segment::Token {
                    text: text[i..end].to_string(),
                    start: i,
                    end,
                });
                plain_start = end;
                i = end;
            }
            _ => i += 1,
        }
    }

    if plain_start < bytes.len() || segments.is_empty() {
        segments.push(Segment::Text {
            text: text[plain_start..].to_string(),
        });
    }

    segments
}

/// Longest token starting at `start`: castling or a piece/pawn move, each
/// optionally followed by a single check or mate marker.
fn match_token_at(bytes: &[u8], start: usize) -> Option<usize> {
    let mut end = match_castle(bytes, start).or_else(|| match_piece_move(bytes, start))?;
    if let Some(&c) = bytes.get(end) {
        if c == b'+' || c == b'#' {
            end += 1;
        }
    }
    Some(end)
}

fn match_castle(bytes: &[u8], start: usize) -> Option<usize> {
    // Long castling first so "O-O-O" is not cut short.
    if bytes[start..].starts_with(b"O-O-O") {
        Some(start + 5)
    } else if bytes[start..].starts_with(b"O-O") {
        Some(start + 3)
    } else {
        None
    }
}

/// `[KQRBN]? [a-h]? [1-8]? x? [a-h][1-8] (=[QRBN])?` with greedy
/// backtracking over the optional disambiguation and capture marks.
fn match_piece_move(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start;
    if bytes.get(i).copied().is_some_and(is_piece_letter) {
        i += 1;
    }
    const PREFIXES: [(bool, bool, bool); 8] = [
        (true, true, true),
        (true, true, false),
        (true, false, true),
        (true, false, false),
        (false, true, true),
        (false, true, false),
        (false, false, true),
        (false, false, false),
    ];
    PREFIXES
        .iter()
        .find_map(|&(file, rank, capture)| match_body(bytes, i, file, rank, capture))
}

fn match_body(bytes: &[u8], mut i: usize, file: bool, rank: bool, capture: bool) -> Option<usize> {
    if file {
        if !bytes.get(i).copied().is_some_and(is_file) {
            return None;
        }
        i += 1;
    }
    if rank {
        if !bytes.get(i).copied().is_some_and(is_rank) {
            return None;
        }
        i += 1;
    }
    if capture {
        if bytes.get(i) != Some(&b'x') {
            return None;
        }
        i += 1;
    }
    if !bytes.get(i).copied().is_some_and(is_file) {
        return None;
    }
    i += 1;
    if !bytes.get(i).copied().is_some_and(is_rank) {
        return None;
    }
    i += 1;
    if bytes.get(i) == Some(&b'=') && bytes.get(i + 1).copied().is_some_and(is_promotion_piece) {
        i += 2;
    }
    Some(i)
}

/// A token may not extend an alphanumeric run on either side. A token always
/// starts with a letter, so the left side only checks the preceding byte; on
/// the right, a trailing `+` or `#` already closes the run.
fn boundary_ok(bytes: &[u8], start: usize, end: usize) -> bool {
    if start > 0 && bytes[start - 1].is_ascii_alphanumeric() {
        return false;
    }
    if end < bytes.len()
        && bytes[end].is_ascii_alphanumeric()
        && bytes[end - 1].is_ascii_alphanumeric()
    {
        return false;
    }
    true
}

fn is_piece_letter(b: u8) -> bool {
    matches!(b, b'K' | b'Q' | b'R' | b'B' | b'N')
}

// A king is a piece letter but never a promotion target.
fn is_promotion_piece(b: u8) -> bool {
    matches!(b, b'Q' | b'R' | b'B' | b'N')
}

fn is_file(b: u8) -> bool {
    (b'a'..=b'h').contains(&b)
}

fn is_rank(b: u8) -> bool {
    (b'1'..=b'8').contains(&b)
}
