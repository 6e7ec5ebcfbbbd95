//! Relevant-script histogram feature.
//!
//! Counts every alphabetic-ish character into one of a small closed set
//! of scripts that matter for disambiguation, or a generic
//! by-byte-length bucket, and emits the non-empty buckets weighted by
//! their share of the counted characters.

use crate::script::{Script, classify};

use super::{FeatureValue, FeatureVector};

/// Bucket ids; the interesting scripts first, then the four
/// other-by-byte-length buckets.
pub const GREEK: usize = 0;
pub const CYRILLIC: usize = 1;
pub const HEBREW: usize = 2;
pub const ARABIC: usize = 3;
pub const HANGUL: usize = 4;
pub const HIRAGANA: usize = 5;
pub const KATAKANA: usize = 6;
pub const OTHER_ONE_BYTE: usize = 7;
pub const OTHER_TWO_BYTE: usize = 8;
pub const OTHER_THREE_BYTE: usize = 9;
pub const OTHER_FOUR_BYTE: usize = 10;

pub const NUM_BUCKETS: usize = 11;

/// Bucket for one character; `None` for skipped characters
/// (non-alphabetic single-byte: space, digits, punctuation, symbols).
#[inline]
fn bucket(c: char) -> Option<usize> {
    if (c as u32) < 0x80 {
        return c.is_ascii_alphabetic().then_some(OTHER_ONE_BYTE);
    }
    Some(match classify(c) {
        Script::Greek => GREEK,
        Script::Cyrillic => CYRILLIC,
        Script::Hebrew => HEBREW,
        Script::Arabic => ARABIC,
        Script::Hangul => HANGUL,
        Script::Hiragana => HIRAGANA,
        Script::Katakana => KATAKANA,
        _ => match c.len_utf8() {
            2 => OTHER_TWO_BYTE,
            3 => OTHER_THREE_BYTE,
            _ => OTHER_FOUR_BYTE,
        },
    })
}

pub fn extract(text: &str) -> FeatureVector {
    let mut counts = [0u32; NUM_BUCKETS];
    let mut total = 0u32;
    for c in text.chars() {
        if let Some(b) = bucket(c) {
            counts[b] += 1;
            total += 1;
        }
    }
    let mut out = FeatureVector::new();
    if total == 0 {
        return out;
    }
    for (id, &count) in counts.iter().enumerate() {
        if count > 0 {
            out.push(FeatureValue {
                id: id as u32,
                weight: count as f32 / total as f32,
            });
        }
    }
    out
}
