//! Generic interpreter over the precompiled UTF-8 transition tables.
//!
//! Two entry points: [`scan`] walks a byte buffer and reports how far it
//! is structurally valid and interchange-clean; [`replace`] performs the
//! same walk while rewriting accepted characters through a remap table
//! (used for full-Unicode lowercasing), emitting an [`OffsetMap`] for the
//! rewrite. Both resynchronize to a character boundary when backing out
//! of a rejected or truncated sequence, so the reported consumption never
//! ends inside a multi-byte character.
//!
//! The walk is index arithmetic over a bounds-checked slice; the 8-byte
//! fast path over a table-configured safe byte range is a performance
//! shortcut, not a correctness requirement.

use crate::offset_map::OffsetMap;
use crate::tables::{
    NUM_BYTE_CLASSES, UTF8_ACCEPT, UTF8_BYTE_CLASS, UTF8_REJECT, UTF8_TRANSITIONS,
    is_interchange_valid_char,
};

/// Why a scan or replace pass stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Input exhausted; all consumed bytes were accepted.
    Eof,
    /// A byte (or completed character) the table rejects.
    Reject,
    /// Output buffer would overflow; caller must retry with a larger
    /// budget or accept partial output.
    DestFull,
}

/// A per-purpose scan table: byte equivalence classes, the transition
/// matrix, and the byte range the 8-byte fast path may skip over.
pub struct ScanTable {
    pub byte_class: &'static [u8; 256],
    pub transitions: &'static [u8],
    pub fast_lo: u8,
    pub fast_hi: u8,
}

/// Structural UTF-8 validity plus interchange screening. Printable ASCII
/// is safe for the fast path.
pub static INTERCHANGE_SCAN: ScanTable = ScanTable {
    byte_class: &UTF8_BYTE_CLASS,
    transitions: &UTF8_TRANSITIONS,
    fast_lo: 0x20,
    fast_hi: 0x7E,
};

/// Walk `input`, returning how many bytes were consumed and why the walk
/// stopped. The consumed count always lands on a character boundary.
pub fn scan(table: &ScanTable, input: &[u8]) -> (usize, ExitReason) {
    let mut pos = 0usize;
    let mut boundary = 0usize;

    while pos < input.len() {
        // Fast path: whole 8-byte chunks inside the safe range need no
        // state walk. Only valid at a character boundary, which `pos`
        // always is here.
        if pos + 8 <= input.len() {
            let chunk = &input[pos..pos + 8];
            if chunk.iter().all(|&b| b >= table.fast_lo && b <= table.fast_hi) {
                pos += 8;
                boundary = pos;
                continue;
            }
        }

        let (cp, next) = match decode_one(table, input, pos) {
            Decoded::Char { cp, next } => (cp, next),
            Decoded::Truncated => return (boundary, ExitReason::Eof),
            Decoded::Rejected => return (boundary, ExitReason::Reject),
        };
        if !is_interchange_valid_char(cp) {
            return (boundary, ExitReason::Reject);
        }
        pos = next;
        boundary = pos;
    }
    (boundary, ExitReason::Eof)
}

/// Longest prefix of `input` that is interchange-valid UTF-8.
#[inline]
pub fn interchange_valid_prefix(input: &[u8]) -> usize {
    scan(&INTERCHANGE_SCAN, input).0
}

enum Decoded {
    Char { cp: u32, next: usize },
    Truncated,
    Rejected,
}

/// Decode the character starting at `pos`, if structurally valid and
/// interchange-clean. Returns the character and the offset just past it.
pub(crate) fn next_char(input: &[u8], pos: usize) -> Option<(char, usize)> {
    match decode_one(&INTERCHANGE_SCAN, input, pos) {
        Decoded::Char { cp, next } if is_interchange_valid_char(cp) => {
            char::from_u32(cp).map(|c| (c, next))
        }
        _ => None,
    }
}

/// Decode one character starting at `pos` via the transition table.
#[inline]
fn decode_one(table: &ScanTable, input: &[u8], pos: usize) -> Decoded {
    let mut state = UTF8_ACCEPT;
    let mut cp = 0u32;
    let mut i = pos;
    loop {
        let Some(&b) = input.get(i) else {
            return Decoded::Truncated;
        };
        let class = table.byte_class[b as usize];
        cp = if state == UTF8_ACCEPT {
            (0xFFu32 >> class) & b as u32
        } else {
            (cp << 6) | (b as u32 & 0x3F)
        };
        state = table.transitions[state as usize * NUM_BYTE_CLASSES + class as usize];
        if state == UTF8_REJECT {
            return Decoded::Rejected;
        }
        i += 1;
        if state == UTF8_ACCEPT {
            return Decoded::Char { cp, next: i };
        }
    }
}

/// Character remap consulted by [`replace`]. Writes up to three
/// replacement characters into `out` and returns how many were written;
/// zero means "keep the character unchanged".
pub type RemapFn = fn(char, &mut [char; 3]) -> usize;

pub struct ReplaceTable {
    pub scan: &'static ScanTable,
    pub remap: RemapFn,
    pub fast_lo: u8,
    pub fast_hi: u8,
}

/// Full-Unicode lowercasing. The fast path covers bytes that are already
/// lowercase ASCII letters.
pub static LOWERCASE_REPLACE: ReplaceTable = ReplaceTable {
    scan: &INTERCHANGE_SCAN,
    remap: lowercase_remap,
    fast_lo: 0x61,
    fast_hi: 0x7A,
};

fn lowercase_remap(c: char, out: &mut [char; 3]) -> usize {
    let mut n = 0;
    for lc in c.to_lowercase() {
        out[n] = lc;
        n += 1;
    }
    if n == 1 && out[0] == c { 0 } else { n }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceResult {
    pub consumed: usize,
    pub written: usize,
    pub chars_changed: usize,
    pub exit: ExitReason,
}

/// Walk `input`, copying accepted characters into `out` and substituting
/// through the remap table, recording every edit in `map` (output
/// coordinates map back to `input` coordinates). Never writes past `cap`
/// bytes of output: a replacement that would overflow stops the pass with
/// [`ExitReason::DestFull`] at the preceding character boundary.
///
/// With `is_plain_text` false, `<` and `&` stop the walk (the caller is
/// expected to strip markup first); with it true they are ordinary text.
pub fn replace(
    table: &ReplaceTable,
    input: &[u8],
    out: &mut String,
    cap: usize,
    map: &mut OffsetMap,
    is_plain_text: bool,
) -> ReplaceResult {
    let start_len = out.len();
    let mut pos = 0usize;
    let mut chars_changed = 0usize;

    let finish = |pos: usize, out: &String, chars_changed, exit| ReplaceResult {
        consumed: pos,
        written: out.len() - start_len,
        chars_changed,
        exit,
    };

    while pos < input.len() {
        if pos + 8 <= input.len() && out.len() + 8 <= cap {
            let chunk = &input[pos..pos + 8];
            if chunk.iter().all(|&b| b >= table.fast_lo && b <= table.fast_hi) {
                for &b in chunk {
                    out.push(b as char);
                }
                map.copy(8);
                pos += 8;
                continue;
            }
        }

        let b = input[pos];
        if !is_plain_text && (b == b'<' || b == b'&') {
            return finish(pos, out, chars_changed, ExitReason::Reject);
        }

        let (cp, next) = match decode_one(table.scan, input, pos) {
            Decoded::Char { cp, next } => (cp, next),
            Decoded::Truncated => return finish(pos, out, chars_changed, ExitReason::Eof),
            Decoded::Rejected => return finish(pos, out, chars_changed, ExitReason::Reject),
        };
        if !is_interchange_valid_char(cp) {
            return finish(pos, out, chars_changed, ExitReason::Reject);
        }
        // The automaton only accepts scalar values, so the conversion
        // cannot fail; the fallback keeps the arm total.
        let c = char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER);
        let src_len = next - pos;

        let mut repl = ['\0'; 3];
        let n = (table.remap)(c, &mut repl);
        if n == 0 {
            if out.len() + src_len > cap {
                return finish(pos, out, chars_changed, ExitReason::DestFull);
            }
            out.push(c);
            map.copy(src_len);
        } else {
            let dst_len: usize = repl[..n].iter().map(|r| r.len_utf8()).sum();
            if out.len() + dst_len > cap {
                return finish(pos, out, chars_changed, ExitReason::DestFull);
            }
            for &r in &repl[..n] {
                out.push(r);
            }
            if dst_len == src_len && n == 1 {
                map.copy(src_len);
            } else {
                map.delete(src_len);
                map.insert(dst_len);
            }
            chars_changed += 1;
        }
        pos = next;
    }
    finish(pos, out, chars_changed, ExitReason::Eof)
}
