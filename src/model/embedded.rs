//! Compiled-in model.
//!
//! A small script-driven model covering eleven languages whose scripts
//! (or script mixtures) separate them cleanly. The trigram space is
//! present with zeroed quantized rows so the full dequantization path
//! runs on every call; the discriminative signal comes from the script
//! histogram and dominant-script spaces. Weights are hand-assigned, not
//! trained, which keeps the classifier fully deterministic.

use crate::feature::FeatureKind;
use crate::network::{EmbeddingMatrix, MatrixView};

use super::NetworkParams;

/// Softmax row order; must stay sorted so lookups can binary search.
pub const LANGUAGES: &[&str] = &[
    "ar", "bg", "bs", "el", "en", "he", "hr", "ja", "ko", "ru", "zh",
];

const NUM_CLASSES: usize = LANGUAGES.len();

// Concat layout: trigram block 0..4, histogram block 4..15,
// dominant-script block 15..27.
const TRIGRAM_DIM: usize = 4;
const TRIGRAM_VOCAB: usize = 64;
const HIST_DIM: usize = crate::feature::script_hist::NUM_BUCKETS;
const DOM_DIM: usize = crate::script::NUM_SCRIPTS;
const CONCAT_DIM: usize = TRIGRAM_DIM + HIST_DIM + DOM_DIM;

const FEATURES: [FeatureKind; 3] = [
    FeatureKind::CharNgrams {
        n: 3,
        id_dim: TRIGRAM_VOCAB,
        include_terminators: true,
        include_spaces: false,
        equal_weight: false,
    },
    FeatureKind::ScriptHistogram,
    FeatureKind::DominantScript,
];

// All-zero rows: 128 is the quantization zero point.
static TRIGRAM_DATA: [u8; TRIGRAM_VOCAB * TRIGRAM_DIM] = [128; TRIGRAM_VOCAB * TRIGRAM_DIM];
// 0x3C00 is 1.0 in binary16.
static TRIGRAM_SCALES: [u16; TRIGRAM_VOCAB] = [0x3C00; TRIGRAM_VOCAB];

const fn identity_11() -> [f32; HIST_DIM * HIST_DIM] {
    let mut m = [0.0f32; HIST_DIM * HIST_DIM];
    let mut i = 0;
    while i < HIST_DIM {
        m[i * HIST_DIM + i] = 1.0;
        i += 1;
    }
    m
}

const fn identity_12() -> [f32; DOM_DIM * DOM_DIM] {
    let mut m = [0.0f32; DOM_DIM * DOM_DIM];
    let mut i = 0;
    while i < DOM_DIM {
        m[i * DOM_DIM + i] = 1.0;
        i += 1;
    }
    m
}

const fn identity_27() -> [f32; CONCAT_DIM * CONCAT_DIM] {
    let mut m = [0.0f32; CONCAT_DIM * CONCAT_DIM];
    let mut i = 0;
    while i < CONCAT_DIM {
        m[i * CONCAT_DIM + i] = 1.0;
        i += 1;
    }
    m
}

static HIST_EMBEDDING: [f32; HIST_DIM * HIST_DIM] = identity_11();
static DOM_EMBEDDING: [f32; DOM_DIM * DOM_DIM] = identity_12();
static HIDDEN_WEIGHTS: [f32; CONCAT_DIM * CONCAT_DIM] = identity_27();
static HIDDEN_BIAS: [f32; CONCAT_DIM] = [0.0; CONCAT_DIM];
static SOFTMAX_BIAS: [f32; NUM_CLASSES] = [0.0; NUM_CLASSES];

// Row indices, matching LANGUAGES.
const AR: usize = 0;
const BG: usize = 1;
const BS: usize = 2;
const EL: usize = 3;
const EN: usize = 4;
const HE: usize = 5;
const HR: usize = 6;
const JA: usize = 7;
const KO: usize = 8;
const RU: usize = 9;
const ZH: usize = 10;

// Column bases for the histogram and dominant-script blocks.
const HIST: usize = TRIGRAM_DIM;
const DOM: usize = TRIGRAM_DIM + HIST_DIM;

/// `(row, column, weight)` triples; everything unlisted is zero.
/// Histogram columns are `HIST +` the bucket index; dominant columns
/// are `DOM +` the script id.
const SOFTMAX_ENTRIES: &[(usize, usize, f32)] = &[
    (AR, HIST + 3, 12.0),  // arabic share
    (AR, DOM + 5, 2.0),    // dominant Arabic
    (BG, HIST + 1, 8.0),   // cyrillic share, undercut by ru
    (BS, HIST + 7, 5.5),   // latin share, undercut by en and hr
    (EL, HIST + 0, 12.0),  // greek share
    (EL, DOM + 2, 2.0),    // dominant Greek
    (EN, HIST + 7, 12.0),  // latin share
    (EN, DOM + 1, 2.0),    // dominant Latin
    (HE, HIST + 2, 12.0),  // hebrew share
    (HE, DOM + 4, 2.0),    // dominant Hebrew
    (HR, HIST + 7, 6.0),   // latin share, between bs and en
    (JA, HIST + 5, 10.0),  // hiragana share
    (JA, HIST + 6, 10.0),  // katakana share
    (JA, HIST + 9, 6.0),   // kanji share of the three-byte bucket
    (JA, DOM + 7, 2.0),    // dominant Hiragana
    (JA, DOM + 8, 2.0),    // dominant Katakana
    (KO, HIST + 4, 12.0),  // hangul share
    (KO, DOM + 6, 2.0),    // dominant Hangul
    (RU, HIST + 1, 12.0),  // cyrillic share
    (RU, DOM + 3, 2.0),    // dominant Cyrillic
    (ZH, HIST + 9, 11.0),  // han share of the three-byte bucket
    (ZH, DOM + 10, 2.0),   // dominant three-byte CJK
];

const fn softmax_weights() -> [f32; NUM_CLASSES * CONCAT_DIM] {
    let mut w = [0.0f32; NUM_CLASSES * CONCAT_DIM];
    let mut i = 0;
    while i < SOFTMAX_ENTRIES.len() {
        let (row, col, val) = SOFTMAX_ENTRIES[i];
        w[row * CONCAT_DIM + col] = val;
        i += 1;
    }
    w
}

static SOFTMAX_WEIGHTS: [f32; NUM_CLASSES * CONCAT_DIM] = softmax_weights();

/// The built-in model. Zero-sized; all weights live in statics.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedModel;

impl NetworkParams for EmbeddedModel {
    fn embedding_spaces(&self) -> usize {
        FEATURES.len()
    }

    fn embedding(&self, space: usize) -> EmbeddingMatrix<'_> {
        match space {
            0 => EmbeddingMatrix::Quantized {
                rows: TRIGRAM_VOCAB,
                cols: TRIGRAM_DIM,
                data: &TRIGRAM_DATA,
                scales: &TRIGRAM_SCALES,
            },
            1 => EmbeddingMatrix::Plain(MatrixView {
                rows: HIST_DIM,
                cols: HIST_DIM,
                data: &HIST_EMBEDDING,
            }),
            2 => EmbeddingMatrix::Plain(MatrixView {
                rows: DOM_DIM,
                cols: DOM_DIM,
                data: &DOM_EMBEDDING,
            }),
            _ => unreachable!("embedding space {space} out of range"),
        }
    }

    fn embedding_dim(&self, space: usize) -> usize {
        [TRIGRAM_DIM, HIST_DIM, DOM_DIM][space]
    }

    fn embedding_num_features(&self, _space: usize) -> usize {
        1
    }

    fn concat_offset(&self, space: usize) -> usize {
        [0, HIST, DOM][space]
    }

    fn feature_kinds(&self) -> &[FeatureKind] {
        &FEATURES
    }

    fn hidden_layers(&self) -> usize {
        1
    }

    fn hidden_weights(&self, _layer: usize) -> MatrixView<'_> {
        MatrixView {
            rows: CONCAT_DIM,
            cols: CONCAT_DIM,
            data: &HIDDEN_WEIGHTS,
        }
    }

    fn hidden_bias(&self, _layer: usize) -> &[f32] {
        &HIDDEN_BIAS
    }

    fn softmax_weights(&self) -> MatrixView<'_> {
        MatrixView {
            rows: NUM_CLASSES,
            cols: CONCAT_DIM,
            data: &SOFTMAX_WEIGHTS,
        }
    }

    fn softmax_bias(&self) -> &[f32] {
        &SOFTMAX_BIAS
    }

    fn languages(&self) -> &[&'static str] {
        LANGUAGES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn languages_are_sorted_and_unique() {
        for pair in LANGUAGES.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn one_feature_kind_per_space() {
        let m = EmbeddedModel;
        assert_eq!(m.feature_kinds().len(), m.embedding_spaces());
    }

    #[test]
    fn concat_offsets_tile_the_input() {
        let m = EmbeddedModel;
        let mut expected = 0;
        for es in 0..m.embedding_spaces() {
            assert_eq!(m.concat_offset(es), expected);
            assert_eq!(m.embedding(es).cols(), m.embedding_dim(es));
            expected += m.embedding_dim(es) * m.embedding_num_features(es);
        }
        assert_eq!(expected, CONCAT_DIM);
    }

    #[test]
    fn softmax_entries_stay_in_bounds() {
        for &(row, col, val) in SOFTMAX_ENTRIES {
            assert!(row < NUM_CLASSES);
            assert!(col < CONCAT_DIM);
            assert!(val > 0.0);
        }
    }

    #[test]
    fn trigram_rows_dequantize_to_zero() {
        for &b in TRIGRAM_DATA.iter() {
            assert_eq!(b, 128);
        }
    }
}
