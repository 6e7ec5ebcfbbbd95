//! Dominant-script feature: the script id of the first span.

use smallvec::smallvec;

use crate::script::{Script, is_hangul};
use crate::span::{ScriptSpanScanner, SpanBuffers};

use super::{FeatureValue, FeatureVector};

/// Run the span scanner over the whole text (performing its usual
/// cleanup) and take the first span's script. Text landing in the
/// generic three-byte CJK bucket is further split by counting
/// codepoints in the Hangul ranges against everything else; a Hangul
/// majority reports the Hangul id instead.
pub fn extract(text: &str) -> FeatureVector {
    let mut bufs = SpanBuffers::new();
    let mut scanner = ScriptSpanScanner::new(&mut bufs, text.as_bytes(), false);
    let script = match scanner.next_span() {
        Some(span) => {
            if span.script == Script::OtherThreeByte && hangul_majority(span.content()) {
                Script::Hangul
            } else {
                span.script
            }
        }
        None => Script::Common,
    };
    smallvec![FeatureValue {
        id: script as u32,
        weight: 1.0,
    }]
}

fn hangul_majority(content: &str) -> bool {
    let mut hangul = 0usize;
    let mut other = 0usize;
    for c in content.chars() {
        if (c as u32) < 0x80 || c.is_whitespace() {
            continue;
        }
        if is_hangul(c as u32) {
            hangul += 1;
        } else {
            other += 1;
        }
    }
    hangul > other
}
