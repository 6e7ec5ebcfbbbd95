//! Compact per-character script classification.
//!
//! The span scanner needs just enough script resolution to segment text:
//! a handful of specifically recognized scripts plus generic
//! "other, by encoded byte length" buckets, with common/inherited
//! characters (spaces, digits, punctuation, combining marks) kept
//! transparent so they never break a span.

/// Script id attached to every span and fed to the dominant-script
/// feature. `Common` never starts or breaks a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Script {
    Common = 0,
    Latin,
    Greek,
    Cyrillic,
    Hebrew,
    Arabic,
    Hangul,
    Hiragana,
    Katakana,
    OtherTwoByte,
    OtherThreeByte,
    OtherFourByte,
}

pub const NUM_SCRIPTS: usize = 12;

/// The six Hangul blocks used to split the generic CJK bucket into
/// Hangul-majority vs Han-majority text.
pub const HANGUL_RANGES: [(u32, u32); 6] = [
    (0x1100, 0x11FF),  // Jamo
    (0x3130, 0x318F),  // Compatibility Jamo
    (0xA960, 0xA97F),  // Jamo Extended-A
    (0xAC00, 0xD7A3),  // Syllables
    (0xD7B0, 0xD7FF),  // Jamo Extended-B
    (0xFFA0, 0xFFDC),  // Halfwidth Jamo
];

#[inline]
pub fn is_hangul(cp: u32) -> bool {
    HANGUL_RANGES.iter().any(|&(lo, hi)| (lo..=hi).contains(&cp))
}

impl Script {
    /// Scripts whose spans run through the lowercase post-pass: the
    /// bicameral family (Latin, Cyrillic, Greek) plus every generic
    /// bucket, which is where the remaining cased scripts land (Armenian
    /// in two-byte, Georgian/Coptic/Glagolitic in three-byte, Deseret in
    /// four-byte). Lowercasing is the identity for the named unicameral
    /// scripts, so those skip the pass.
    #[inline]
    pub fn wants_lowercase(self) -> bool {
        !matches!(
            self,
            Script::Common
                | Script::Hebrew
                | Script::Arabic
                | Script::Hangul
                | Script::Hiragana
                | Script::Katakana
        )
    }
}

/// Classify one character. One-byte characters land in the Latin-like
/// bucket by convention; two/three/four-byte characters are resolved by
/// codepoint range, falling back to the generic per-length bucket.
pub fn classify(c: char) -> Script {
    let cp = c as u32;

    if cp < 0x80 {
        return if c.is_ascii_alphabetic() {
            Script::Latin
        } else {
            Script::Common
        };
    }

    match cp {
        // Latin-1 / Extended Latin letters stay in the Latin bucket;
        // the Latin-1 punctuation and symbol block is common.
        0xA0..=0xBF | 0xD7 | 0xF7 => Script::Common,
        0xC0..=0x024F | 0x1E00..=0x1EFF => Script::Latin,
        // Combining marks are inherited.
        0x0300..=0x036F => Script::Common,
        0x0370..=0x03FF | 0x1F00..=0x1FFF => Script::Greek,
        0x0400..=0x052F | 0x2DE0..=0x2DFF | 0xA640..=0xA69F => Script::Cyrillic,
        0x0590..=0x05FF | 0xFB1D..=0xFB4F => Script::Hebrew,
        0x0600..=0x06FF | 0x0750..=0x077F | 0x08A0..=0x08FF | 0xFB50..=0xFDFF
        | 0xFE70..=0xFEFF => Script::Arabic,
        0x1100..=0x11FF | 0x3130..=0x318F | 0xA960..=0xA97F | 0xAC00..=0xD7FF => Script::Hangul,
        0x3040..=0x309F => Script::Hiragana,
        0x30A0..=0x30FF | 0x31F0..=0x31FF => Script::Katakana,
        // General punctuation, symbols, CJK symbols/punctuation,
        // fullwidth punctuation, variation selectors: transparent.
        // (Cyrillic Extended-A at 2DE0 is claimed by its arm above.)
        0x2000..=0x2BFF | 0x2E00..=0x2E7F | 0x3000..=0x303F | 0xFE00..=0xFE0F
        | 0xFF01..=0xFF20 | 0xFF3B..=0xFF40 | 0xFF5B..=0xFF65 => Script::Common,
        _ => match c.len_utf8() {
            2 => Script::OtherTwoByte,
            3 => Script::OtherThreeByte,
            _ => Script::OtherFourByte,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_letters_are_latin_rest_common() {
        assert_eq!(classify('a'), Script::Latin);
        assert_eq!(classify('Z'), Script::Latin);
        assert_eq!(classify('5'), Script::Common);
        assert_eq!(classify(' '), Script::Common);
        assert_eq!(classify('!'), Script::Common);
    }

    #[test]
    fn accented_latin_stays_latin() {
        assert_eq!(classify('é'), Script::Latin);
        assert_eq!(classify('Ā'), Script::Latin);
        assert_eq!(classify('ẞ'), Script::Latin);
    }

    #[test]
    fn specific_scripts_resolve() {
        assert_eq!(classify('α'), Script::Greek);
        assert_eq!(classify('Д'), Script::Cyrillic);
        assert_eq!(classify('א'), Script::Hebrew);
        assert_eq!(classify('م'), Script::Arabic);
        assert_eq!(classify('한'), Script::Hangul);
        assert_eq!(classify('ひ'), Script::Hiragana);
        assert_eq!(classify('カ'), Script::Katakana);
    }

    #[test]
    fn generic_buckets_by_byte_length() {
        assert_eq!(classify('ա'), Script::OtherTwoByte); // Armenian
        assert_eq!(classify('世'), Script::OtherThreeByte); // Han
        assert_eq!(classify('ท'), Script::OtherThreeByte); // Thai
        assert_eq!(classify('𐐷'), Script::OtherFourByte); // Deseret
    }

    #[test]
    fn common_and_inherited_are_transparent() {
        assert_eq!(classify('\u{0301}'), Script::Common); // combining acute
        assert_eq!(classify('\u{2014}'), Script::Common); // em dash
        assert_eq!(classify('、'), Script::Common); // ideographic comma
        assert_eq!(classify('\u{00A0}'), Script::Common); // nbsp
    }

    #[test]
    fn hangul_ranges_cover_syllables_and_jamo() {
        assert!(is_hangul('한' as u32));
        assert!(is_hangul(0x1100));
        assert!(is_hangul(0xFFA1));
        assert!(!is_hangul('世' as u32));
    }

    #[test]
    fn lowercase_gating() {
        assert!(Script::Latin.wants_lowercase());
        assert!(Script::Greek.wants_lowercase());
        assert!(Script::Cyrillic.wants_lowercase());
        // Georgian, Coptic, and Glagolitic are cased and land here.
        assert!(Script::OtherThreeByte.wants_lowercase());
        assert!(!Script::Hebrew.wants_lowercase());
        assert!(!Script::Hangul.wants_lowercase());
        assert!(!Script::Common.wants_lowercase());
    }
}
