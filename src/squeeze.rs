//! Repetition collapsing ahead of feature extraction.
//!
//! Highly repetitive input ("aaaaaa…", "ha ha ha ha …") wastes the
//! classification byte budget and biases the n-gram counts toward the
//! repeated material. This pass bounds both: whitespace runs collapse to
//! a single space and same-character runs are capped, before the text is
//! sampled and featurized.

use std::borrow::Cow;

/// Longest run of one character that survives the squeeze.
const MAX_CHAR_RUN: usize = 3;

#[inline]
fn needs_squeeze(text: &str) -> bool {
    let mut prev = '\0';
    let mut run = 1usize;
    for c in text.chars() {
        if c == prev {
            run += 1;
            if run > MAX_CHAR_RUN || (c.is_whitespace() && run > 1) {
                return true;
            }
        } else {
            if c.is_whitespace() && prev.is_whitespace() {
                return true;
            }
            run = 1;
        }
        prev = c;
    }
    false
}

/// Collapse whitespace runs to one space and same-character runs to at
/// most [`MAX_CHAR_RUN`]. Borrows the input unchanged when nothing
/// needs collapsing.
pub fn squeeze(text: &str) -> Cow<'_, str> {
    if !needs_squeeze(text) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut prev = '\0';
    let mut run = 0usize;
    for c in text.chars() {
        if c.is_whitespace() {
            if !prev.is_whitespace() {
                out.push(' ');
            }
            prev = ' ';
            run = 1;
            continue;
        }
        if c == prev {
            run += 1;
            if run > MAX_CHAR_RUN {
                continue;
            }
        } else {
            run = 1;
        }
        out.push(c);
        prev = c;
    }
    Cow::Owned(out)
}
