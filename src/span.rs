//! Script-span scanning: strip markup and entities, classify scripts,
//! and yield consecutive same-script runs of cleaned text.
//!
//! The scanner is single-pass and stateful: each [`next_span`] call
//! advances an internal cursor over the original buffer and rewrites the
//! next span into reusable scratch buffers, recording an [`OffsetMap`]
//! from cleaned positions back to the source (a second map layers on top
//! when the lowercase post-pass runs). Spans carry one leading space and
//! three trailing padding spaces, so concatenated spans need no extra
//! delimiter.
//!
//! [`next_span`]: ScriptSpanScanner::next_span

use memchr::{memchr, memmem};

use crate::offset_map::OffsetMap;
use crate::script::{Script, classify};
use crate::utf8::{self, LOWERCASE_REPLACE};

/// Total per-span output budget, padding included.
pub const MAX_SPAN_BYTES: usize = 20_480;

/// When this close to the budget, the span prefers to end at the next
/// word boundary instead of running to the hard cap.
const TRUNCATE_MARGIN: usize = 64;

/// Entity names longer than this are never valid; bounds the name walk.
const MAX_ENTITY_NAME: usize = 31;

/// One cleaned same-script run. Borrows the scanner's scratch buffer;
/// consume it before asking for the next span.
#[derive(Debug)]
pub struct LangSpan<'b> {
    /// `" content   "`: leading space, cleaned text, three pad spaces.
    pub text: &'b str,
    /// Offset in the original buffer of the first cleaned character.
    pub original_offset: usize,
    pub script: Script,
    pub truncated: bool,
}

impl LangSpan<'_> {
    /// Cleaned text without the leading/trailing padding.
    #[inline]
    pub fn content(&self) -> &str {
        &self.text[1..self.text.len() - 3]
    }
}

/// Reusable scratch: span buffer, lowercase buffer, and both offset
/// maps. Owned by the identifier instance and reset between calls.
#[derive(Debug, Default)]
pub struct SpanBuffers {
    cleaned: String,
    lowered: String,
    strip_map: OffsetMap,
    lower_map: OffsetMap,
}

impl SpanBuffers {
    pub fn new() -> Self {
        Self::default()
    }
}

pub struct ScriptSpanScanner<'b, 'a> {
    bufs: &'b mut SpanBuffers,
    input: &'a [u8],
    pos: usize,
    /// Source position where the current span's offset map begins.
    span_base: usize,
    lowercase: bool,
    lowered_active: bool,
}

impl<'b, 'a> ScriptSpanScanner<'b, 'a> {
    pub fn new(bufs: &'b mut SpanBuffers, input: &'a [u8], lowercase: bool) -> Self {
        bufs.cleaned.clear();
        bufs.lowered.clear();
        bufs.strip_map.reset();
        bufs.lower_map.reset();
        Self {
            bufs,
            input,
            pos: 0,
            span_base: 0,
            lowercase,
            lowered_active: false,
        }
    }

    /// Resolve a position in the last span's text back to an offset in
    /// the original buffer. Walks the lowercase map first when the
    /// lowercase post-pass ran, then the strip map.
    pub fn span_to_original(&mut self, span_pos: usize) -> usize {
        let cleaned_pos = if self.lowered_active {
            self.bufs.lower_map.map_back(span_pos)
        } else {
            span_pos
        };
        self.span_base + self.bufs.strip_map.map_back(cleaned_pos)
    }

    /// Produce the next same-script span, or `None` when the input is
    /// exhausted.
    pub fn next_span(&mut self) -> Option<LangSpan<'_>> {
        let bufs = &mut *self.bufs;
        bufs.cleaned.clear();
        bufs.strip_map.reset();
        bufs.cleaned.push(' ');
        bufs.strip_map.insert(1);
        self.span_base = self.pos;
        self.lowered_active = false;

        let mut span_script: Option<Script> = None;
        let mut first_offset: Option<usize> = None;
        let mut pending_space = false;
        let mut truncated = false;

        while self.pos < self.input.len() {
            let b = self.input[self.pos];

            if b == b'<' {
                let end = skip_markup(self.input, self.pos);
                bufs.strip_map.delete(end - self.pos);
                self.pos = end;
                pending_space = true;
                continue;
            }
            if b == b'>' {
                // Stray close bracket: a single skipped byte.
                bufs.strip_map.delete(1);
                self.pos += 1;
                pending_space = true;
                continue;
            }

            let (c, src_len, is_entity) = if b == b'&' {
                match parse_entity(self.input, self.pos) {
                    Some((c, consumed)) => (c, consumed, true),
                    None => ('&', 1, false),
                }
            } else {
                match utf8::next_char(self.input, self.pos) {
                    Some((c, next)) => (c, next - self.pos, false),
                    None => {
                        // Invalid byte: absorbed, never an error.
                        bufs.strip_map.delete(1);
                        self.pos += 1;
                        continue;
                    }
                }
            };

            if c.is_whitespace() {
                bufs.strip_map.delete(src_len);
                self.pos += src_len;
                pending_space = true;
                continue;
            }

            let script = classify(c);
            if script != Script::Common {
                match span_script {
                    None => span_script = Some(script),
                    Some(dominant) if script != dominant => {
                        // One-character tolerance: a lone intruder stays
                        // in the span unless the next character is also
                        // non-common and off-script.
                        let after = peek_script(self.input, self.pos + src_len);
                        if after != Script::Common && after != dominant {
                            break;
                        }
                    }
                    Some(_) => {}
                }
            }

            // Truncation policy: prefer a word boundary once near the
            // budget; hard-stop mid-word only at the cap itself.
            let have_content = bufs.cleaned.len() > 1;
            if have_content && pending_space
                && bufs.cleaned.len() + TRUNCATE_MARGIN + 4 > MAX_SPAN_BYTES
            {
                truncated = true;
                break;
            }
            let sep = usize::from(have_content && pending_space);
            if bufs.cleaned.len() + sep + c.len_utf8() + 3 > MAX_SPAN_BYTES {
                truncated = true;
                break;
            }

            if sep == 1 {
                bufs.cleaned.push(' ');
                bufs.strip_map.insert(1);
            }
            pending_space = false;
            bufs.cleaned.push(c);
            if is_entity || src_len != c.len_utf8() {
                bufs.strip_map.delete(src_len);
                bufs.strip_map.insert(c.len_utf8());
            } else {
                bufs.strip_map.copy(src_len);
            }
            if first_offset.is_none() {
                first_offset = Some(self.pos);
            }
            self.pos += src_len;
        }

        if bufs.cleaned.len() <= 1 {
            return None;
        }
        bufs.cleaned.push_str("   ");
        bufs.strip_map.insert(3);

        let script = span_script.unwrap_or(Script::Latin);
        let text: &str = if self.lowercase && script.wants_lowercase() {
            bufs.lowered.clear();
            bufs.lower_map.reset();
            utf8::replace(
                &LOWERCASE_REPLACE,
                bufs.cleaned.as_bytes(),
                &mut bufs.lowered,
                // Lowercasing can expand a few characters; headroom keeps
                // the pass from failing closed on a full span.
                MAX_SPAN_BYTES + MAX_SPAN_BYTES / 2,
                &mut bufs.lower_map,
                true,
            );
            self.lowered_active = true;
            &bufs.lowered
        } else {
            &bufs.cleaned
        };

        Some(LangSpan {
            text,
            original_offset: first_offset.unwrap_or(0),
            script,
            truncated,
        })
    }
}

/// Script of the character at `from`, for the one-character lookahead.
/// Markup, entities that fail to parse, whitespace, and the end of the
/// buffer all read as `Common`.
fn peek_script(input: &[u8], from: usize) -> Script {
    if from >= input.len() {
        return Script::Common;
    }
    let b = input[from];
    if b == b'<' || b == b'>' {
        return Script::Common;
    }
    let c = if b == b'&' {
        match parse_entity(input, from) {
            Some((c, _)) => c,
            None => return Script::Common,
        }
    } else {
        match utf8::next_char(input, from) {
            Some((c, _)) => c,
            None => return Script::Common,
        }
    };
    if c.is_whitespace() {
        Script::Common
    } else {
        classify(c)
    }
}

/// Skip a markup region starting at `pos` (which holds `<`). Comments
/// and `<script>`/`<style>` bodies are skipped as one region regardless
/// of nested brackets; an unmatched `<` runs to end-of-buffer.
fn skip_markup(input: &[u8], pos: usize) -> usize {
    let rest = &input[pos..];
    if rest.starts_with(b"<!--") {
        return match memmem::find(&rest[4..], b"-->") {
            Some(i) => pos + 4 + i + 3,
            None => input.len(),
        };
    }
    for name in [&b"script"[..], &b"style"[..]] {
        if tag_name_matches(rest, name) {
            return skip_element(input, pos, name);
        }
    }
    match memchr(b'>', rest) {
        Some(i) => pos + i + 1,
        None => input.len(),
    }
}

/// Case-insensitive `<name` with a non-letter after the name.
fn tag_name_matches(rest: &[u8], name: &[u8]) -> bool {
    if rest.len() < 1 + name.len() || !rest[1..1 + name.len()].eq_ignore_ascii_case(name) {
        return false;
    }
    match rest.get(1 + name.len()) {
        None => true,
        Some(b) => !b.is_ascii_alphanumeric(),
    }
}

/// Skip from an opening `<script`/`<style` through its matching close
/// tag, ignoring any brackets in between.
fn skip_element(input: &[u8], pos: usize, name: &[u8]) -> usize {
    let mut i = pos + 1 + name.len();
    while i < input.len() {
        let Some(off) = memchr(b'<', &input[i..]) else {
            return input.len();
        };
        let at = i + off;
        let rest = &input[at..];
        if rest.len() > 1 && rest[1] == b'/' && rest.len() >= 2 + name.len()
            && rest[2..2 + name.len()].eq_ignore_ascii_case(name)
        {
            return match memchr(b'>', rest) {
                Some(j) => at + j + 1,
                None => input.len(),
            };
        }
        i = at + 1;
    }
    input.len()
}

/// Parse a character entity at `pos` (which holds `&`). Returns the
/// decoded character and the number of source bytes consumed, or `None`
/// when the text is not an entity and the `&` is literal.
fn parse_entity(input: &[u8], pos: usize) -> Option<(char, usize)> {
    let rest = &input[pos + 1..];
    if rest.first() == Some(&b'#') {
        return parse_numeric_entity(rest).map(|(c, n)| (c, n + 1));
    }

    let mut len = 0;
    while len < rest.len() && len < MAX_ENTITY_NAME && rest[len].is_ascii_alphanumeric() {
        len += 1;
    }
    if len == 0 {
        return None;
    }
    let name = std::str::from_utf8(&rest[..len]).ok()?;
    let cp = crate::tables::entity_codepoint(name)?;
    let has_semi = rest.get(len) == Some(&b';');
    if cp >= 256 && !has_semi {
        // "&lang" as a query key is literal text; "&lang;" is U+27E8.
        return None;
    }
    let consumed = 1 + len + usize::from(has_semi);
    char::from_u32(cp).map(|c| (c, consumed))
}

/// `#NN;` or `#xNN;` after the `&`. Values beyond U+10FFFF (or in the
/// surrogate gap) decode to U+FFFD.
fn parse_numeric_entity(rest: &[u8]) -> Option<(char, usize)> {
    debug_assert_eq!(rest.first(), Some(&b'#'));
    let (digits, radix, prefix) = match rest.get(1) {
        Some(&b'x') | Some(&b'X') => (&rest[2..], 16u32, 2usize),
        _ => (&rest[1..], 10u32, 1usize),
    };
    let mut value = 0u64;
    let mut n = 0;
    while n < digits.len() {
        let Some(d) = (digits[n] as char).to_digit(radix) else {
            break;
        };
        value = (value * radix as u64 + d as u64).min(u32::MAX as u64);
        n += 1;
    }
    if n == 0 || digits.get(n) != Some(&b';') {
        return None;
    }
    let consumed = prefix + n + 1;
    let cp = value as u32;
    let c = if cp > 0x10FFFF || (0xD800..=0xDFFF).contains(&cp) {
        char::REPLACEMENT_CHARACTER
    } else {
        char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER)
    };
    Some((c, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans_of(input: &str, lowercase: bool) -> Vec<(String, Script, usize, bool)> {
        let mut bufs = SpanBuffers::new();
        let mut scanner = ScriptSpanScanner::new(&mut bufs, input.as_bytes(), lowercase);
        let mut out = Vec::new();
        while let Some(span) = scanner.next_span() {
            out.push((
                span.text.to_string(),
                span.script,
                span.original_offset,
                span.truncated,
            ));
        }
        out
    }

    #[test]
    fn plain_text_single_span() {
        let spans = spans_of("Hello world", false);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].0, " Hello world   ");
        assert_eq!(spans[0].1, Script::Latin);
        assert_eq!(spans[0].2, 0);
    }

    #[test]
    fn strips_tags_and_comments() {
        let spans = spans_of("<p>Hello <!-- secret --> <b>world</b></p>", false);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].0, " Hello world   ");
    }

    #[test]
    fn script_and_style_bodies_are_skipped_whole() {
        let spans = spans_of(
            "before<script>if (a < b) { x(\"<div>\"); }</script>after\
             <style>p > a { color: red }</style>end",
            false,
        );
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].0, " before after end   ");
    }

    #[test]
    fn unmatched_open_bracket_runs_to_eof() {
        let spans = spans_of("text <div class=\"x", false);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].0, " text   ");
    }

    #[test]
    fn stray_close_bracket_is_one_skipped_byte() {
        let spans = spans_of("a > b", false);
        assert_eq!(spans[0].0, " a b   ");
    }

    #[test]
    fn decodes_entities() {
        let spans = spans_of("caf&eacute; &amp; tea &#x2014; now", false);
        assert_eq!(spans[0].0, " café & tea — now   ");
    }

    #[test]
    fn entity_semicolon_rule() {
        // "&lang" without ';' is a literal query key; with ';' it is a
        // bracket (Common script, so it stays in the span)
        let spans = spans_of("a&lang=en b&lang; c", false);
        assert_eq!(spans[0].0, " a&lang=en b\u{27E8} c   ");
    }

    #[test]
    fn numeric_overflow_becomes_replacement_char() {
        let spans = spans_of("x &#1114112; y &#xFFFFFFFFFF; z", false);
        assert_eq!(spans[0].0, " x \u{FFFD} y \u{FFFD} z   ");
    }

    #[test]
    fn whitespace_collapses_and_trims() {
        let spans = spans_of("  a \t\n  b  ", false);
        assert_eq!(spans[0].0, " a b   ");
    }

    #[test]
    fn cleaning_is_idempotent() {
        let dirty = "<div>Hello &amp; <b>world</b>,\n\n this&nbsp;is   fine</div>";
        let first: String = spans_of(dirty, false).into_iter().map(|s| s.0).collect();
        let second: String = spans_of(&first, false).into_iter().map(|s| s.0).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn splits_at_genuine_script_change() {
        let spans = spans_of("hello world Привет мир", false);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].0, " hello world   ");
        assert_eq!(spans[0].1, Script::Latin);
        assert_eq!(spans[1].0, " Привет мир   ");
        assert_eq!(spans[1].1, Script::Cyrillic);
        assert_eq!(spans[1].2, "hello world ".len());
    }

    #[test]
    fn common_separator_does_not_own_the_boundary() {
        // split happens at the genuine script change, not at the space
        let spans = spans_of("ABCД DEF", false);
        // Д is a lone intruder followed by a space (common): tolerated
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].1, Script::Latin);
    }

    #[test]
    fn lone_intruder_is_tolerated_two_break() {
        // one foreign char followed by dominant-script text: no break
        let one = spans_of("abcЖdef", false);
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].0, " abcЖdef   ");

        // two consecutive foreign chars: genuine change, break before them
        let two = spans_of("abcЖЗdef", false);
        assert_eq!(two.len(), 3);
        assert_eq!(two[0].0, " abc   ");
        assert_eq!(two[1].0, " ЖЗ   ");
        assert_eq!(two[1].1, Script::Cyrillic);
        assert_eq!(two[2].0, " def   ");
    }

    #[test]
    fn digits_and_punct_stay_transparent() {
        let spans = spans_of("abc 123, def 456!", false);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].0, " abc 123, def 456!   ");
    }

    #[test]
    fn lowercase_pass_runs_for_bicameral_spans() {
        let spans = spans_of("HELLO World", true);
        assert_eq!(spans[0].0, " hello world   ");
        // Hebrew span is untouched by the pass
        let he = spans_of("שלום עולם", true);
        assert_eq!(he[0].0, " שלום עולם   ");
        assert_eq!(he[0].1, Script::Hebrew);
    }

    #[test]
    fn cased_three_byte_scripts_are_lowercased() {
        // Georgian Asomtavruli (U+10A0..) lowers to Nuskhuri (U+2D00..)
        let spans = spans_of("ႠႡႢ ႣႤ", true);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].0, " ⴀⴁⴂ ⴃⴄ   ");
        assert_eq!(spans[0].1, Script::OtherThreeByte);
        // Coptic capital Alfa
        let coptic = spans_of("Ⲁⲃⲅ ⲇⲉ", true);
        assert_eq!(coptic[0].0, " ⲁⲃⲅ ⲇⲉ   ");
    }

    #[test]
    fn offsets_map_back_through_both_maps() {
        let input = "<b>HELLO</b> WORLD";
        let mut bufs = SpanBuffers::new();
        let mut scanner = ScriptSpanScanner::new(&mut bufs, input.as_bytes(), true);
        let (text, offset) = {
            let span = scanner.next_span().expect("one span");
            (span.text.to_string(), span.original_offset)
        };
        assert_eq!(text, " hello world   ");
        assert_eq!(offset, 3);
        // 'h' at span pos 1 -> input pos 3; 'w' at span pos 7 -> 13
        assert_eq!(scanner.span_to_original(1), 3);
        assert_eq!(scanner.span_to_original(7), 13);
    }

    #[test]
    fn second_span_offsets_are_absolute() {
        let input = "abc Привет";
        let mut bufs = SpanBuffers::new();
        let mut scanner = ScriptSpanScanner::new(&mut bufs, input.as_bytes(), false);
        let first = scanner.next_span().expect("latin span").text.to_string();
        assert_eq!(first, " abc   ");
        let second = scanner.next_span().expect("cyrillic span").text.to_string();
        assert_eq!(second, " Привет   ");
        // 'П' at span pos 1 sits at input byte 4
        assert_eq!(scanner.span_to_original(1), 4);
    }

    #[test]
    fn long_input_truncates_on_word_boundary() {
        let word = "abcdefghij ";
        let big = word.repeat(4000); // 44k bytes of cleaned text
        let spans = spans_of(&big, false);
        assert!(spans.len() >= 2);
        assert!(spans[0].3, "first span should be marked truncated");
        assert!(spans[0].0.len() <= MAX_SPAN_BYTES);
        // ended at a word boundary: content ends with a full word
        let content = spans[0].0.trim_matches(' ');
        assert!(content.ends_with("abcdefghij"));
    }

    #[test]
    fn empty_and_markup_only_inputs_yield_no_spans() {
        assert!(spans_of("", false).is_empty());
        assert!(spans_of("<p><!-- nothing --></p>", false).is_empty());
        assert!(spans_of("   \t\n ", false).is_empty());
    }
}
