// Static data assets consumed by the table engine and the span scanner.
// These tables are mechanically derived (UTF-8 DFA after Höhrmann's
// compact automaton, entity names from the HTML named-character list)
// and are data, not algorithm: the interpreters in `utf8.rs` and
// `span.rs` never special-case individual entries.

/// Byte-class table for the UTF-8 automaton. Every byte maps to one of
/// twelve equivalence classes; the transition table below is indexed by
/// `state * NUM_BYTE_CLASSES + class`.
pub const NUM_BYTE_CLASSES: usize = 12;

pub static UTF8_BYTE_CLASS: [u8; 256] = {
    let mut t = [0u8; 256];
    let mut b = 0usize;
    while b < 256 {
        t[b] = match b {
            0x00..=0x7F => 0,
            0x80..=0x8F => 1,
            0x90..=0x9F => 9,
            0xA0..=0xBF => 7,
            0xC0..=0xC1 => 8,
            0xC2..=0xDF => 2,
            0xE0 => 10,
            0xE1..=0xEC => 3,
            0xED => 4,
            0xEE..=0xEF => 3,
            0xF0 => 11,
            0xF1..=0xF3 => 6,
            0xF4 => 5,
            _ => 8, // 0xF5..=0xFF: never valid
        };
        b += 1;
    }
    t
};

/// Automaton states. State 0 accepts (character boundary), state 1
/// rejects; states 2..=8 are mid-character.
pub const UTF8_ACCEPT: u8 = 0;
pub const UTF8_REJECT: u8 = 1;
pub const UTF8_NUM_STATES: usize = 9;

#[rustfmt::skip]
pub static UTF8_TRANSITIONS: [u8; UTF8_NUM_STATES * NUM_BYTE_CLASSES] = [
    // class:  0  1  2  3  4  5  6  7  8  9 10 11
    /* s0 */   0, 1, 2, 3, 5, 8, 7, 1, 1, 1, 4, 6,
    /* s1 */   1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    /* s2 */   1, 0, 1, 1, 1, 1, 1, 0, 1, 0, 1, 1,
    /* s3 */   1, 2, 1, 1, 1, 1, 1, 2, 1, 2, 1, 1,
    /* s4 */   1, 1, 1, 1, 1, 1, 1, 2, 1, 1, 1, 1,
    /* s5 */   1, 2, 1, 1, 1, 1, 1, 1, 1, 2, 1, 1,
    /* s6 */   1, 1, 1, 1, 1, 1, 1, 3, 1, 3, 1, 1,
    /* s7 */   1, 3, 1, 1, 1, 1, 1, 3, 1, 3, 1, 1,
    /* s8 */   1, 3, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
];

/// Codepoints permitted in character interchange. Structural validity
/// (surrogates, overlongs, out-of-range) is already enforced by the
/// automaton; this screens the remaining per-character exclusions.
#[inline]
pub fn is_interchange_valid_char(cp: u32) -> bool {
    match cp {
        0x09 | 0x0A | 0x0D => true,
        0x00..=0x1F => false,
        0x7F..=0x9F => false,
        0xFDD0..=0xFDEF => false,
        cp if cp & 0xFFFE == 0xFFFE => false,
        _ => true,
    }
}

/// Named character references, sorted by name for binary search.
/// Names are case-sensitive. Values >= 256 require a terminating `;`
/// in the source text (`&lang=en` must not decode as U+27E8).
pub static ENTITIES: &[(&str, u32)] = &[
    ("AElig", 0xC6),
    ("Aacute", 0xC1),
    ("Agrave", 0xC0),
    ("Alpha", 0x391),
    ("Aring", 0xC5),
    ("Auml", 0xC4),
    ("Ccedil", 0xC7),
    ("Delta", 0x394),
    ("Eacute", 0xC9),
    ("Gamma", 0x393),
    ("Lambda", 0x39B),
    ("Ntilde", 0xD1),
    ("OElig", 0x152),
    ("Omega", 0x3A9),
    ("Ouml", 0xD6),
    ("Phi", 0x3A6),
    ("Pi", 0x3A0),
    ("Psi", 0x3A8),
    ("Sigma", 0x3A3),
    ("Theta", 0x398),
    ("Uuml", 0xDC),
    ("aacute", 0xE1),
    ("acirc", 0xE2),
    ("aelig", 0xE6),
    ("agrave", 0xE0),
    ("alpha", 0x3B1),
    ("amp", 0x26),
    ("apos", 0x27),
    ("aring", 0xE5),
    ("atilde", 0xE3),
    ("auml", 0xE4),
    ("beta", 0x3B2),
    ("bull", 0x2022),
    ("ccedil", 0xE7),
    ("cent", 0xA2),
    ("copy", 0xA9),
    ("dagger", 0x2020),
    ("darr", 0x2193),
    ("deg", 0xB0),
    ("delta", 0x3B4),
    ("eacute", 0xE9),
    ("ecirc", 0xEA),
    ("egrave", 0xE8),
    ("epsilon", 0x3B5),
    ("eta", 0x3B7),
    ("eth", 0xF0),
    ("euml", 0xEB),
    ("euro", 0x20AC),
    ("frac12", 0xBD),
    ("frac14", 0xBC),
    ("gamma", 0x3B3),
    ("gt", 0x3E),
    ("harr", 0x2194),
    ("hellip", 0x2026),
    ("iacute", 0xED),
    ("icirc", 0xEE),
    ("iexcl", 0xA1),
    ("igrave", 0xEC),
    ("iota", 0x3B9),
    ("iquest", 0xBF),
    ("iuml", 0xEF),
    ("kappa", 0x3BA),
    ("lambda", 0x3BB),
    ("lang", 0x27E8),
    ("laquo", 0xAB),
    ("larr", 0x2190),
    ("ldquo", 0x201C),
    ("lsquo", 0x2018),
    ("lt", 0x3C),
    ("mdash", 0x2014),
    ("micro", 0xB5),
    ("middot", 0xB7),
    ("mu", 0x3BC),
    ("nbsp", 0xA0),
    ("ndash", 0x2013),
    ("ntilde", 0xF1),
    ("nu", 0x3BD),
    ("oacute", 0xF3),
    ("ocirc", 0xF4),
    ("oelig", 0x153),
    ("ograve", 0xF2),
    ("omega", 0x3C9),
    ("oslash", 0xF8),
    ("otilde", 0xF5),
    ("ouml", 0xF6),
    ("para", 0xB6),
    ("permil", 0x2030),
    ("phi", 0x3C6),
    ("pi", 0x3C0),
    ("plusmn", 0xB1),
    ("pound", 0xA3),
    ("psi", 0x3C8),
    ("quot", 0x22),
    ("rang", 0x27E9),
    ("raquo", 0xBB),
    ("rarr", 0x2192),
    ("rdquo", 0x201D),
    ("reg", 0xAE),
    ("rho", 0x3C1),
    ("rsquo", 0x2019),
    ("sbquo", 0x201A),
    ("scaron", 0x161),
    ("sect", 0xA7),
    ("shy", 0xAD),
    ("sigma", 0x3C3),
    ("szlig", 0xDF),
    ("tau", 0x3C4),
    ("theta", 0x3B8),
    ("thorn", 0xFE),
    ("tilde", 0x2DC),
    ("times", 0xD7),
    ("trade", 0x2122),
    ("uacute", 0xFA),
    ("ucirc", 0xFB),
    ("ugrave", 0xF9),
    ("uml", 0xA8),
    ("upsilon", 0x3C5),
    ("uuml", 0xFC),
    ("xi", 0x3BE),
    ("yacute", 0xFD),
    ("yen", 0xA5),
    ("yuml", 0xFF),
    ("zeta", 0x3B6),
];

/// Look up a named entity. Returns the codepoint if the name is known.
#[inline]
pub fn entity_codepoint(name: &str) -> Option<u32> {
    ENTITIES
        .binary_search_by(|&(n, _)| n.cmp(name))
        .ok()
        .map(|i| ENTITIES[i].1)
}
