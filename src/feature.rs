//! Sparse feature extraction over cleaned text.
//!
//! Each extractor turns a span (or the whole cleaned text) into a
//! [`FeatureVector`]: `(discrete id, weight)` pairs destined for one
//! embedding space of the scoring network. The set of extractors is a
//! closed enum with static dispatch; the model declares which kinds it
//! was trained with and the orchestrator runs exactly those.

pub mod dominant;
pub mod ngram;
pub mod script_hist;

use smallvec::SmallVec;

/// One sparse feature: a discrete value within its embedding space and
/// the weight its embedding row is scaled by.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureValue {
    pub id: u32,
    pub weight: f32,
}

/// All features of one embedding space. Built fresh per input chunk;
/// small inputs stay off the heap.
pub type FeatureVector = SmallVec<[FeatureValue; 16]>;

/// The feature functions the network can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// Bag of character n-grams, hashed into `id_dim` buckets.
    CharNgrams {
        n: usize,
        id_dim: usize,
        /// Insert `^`/`$` markers at space-delimited token edges.
        include_terminators: bool,
        /// Allow windows that cross a space boundary.
        include_spaces: bool,
        /// Weight each distinct n-gram `1/distinct` instead of
        /// `count/total`.
        equal_weight: bool,
    },
    /// Per-script histogram over the "interesting" scripts plus the
    /// by-byte-length buckets.
    ScriptHistogram,
    /// Script id of the first span of the text.
    DominantScript,
}

impl FeatureKind {
    /// Canonical trigram configuration.
    pub const TRIGRAMS: FeatureKind = FeatureKind::CharNgrams {
        n: 3,
        id_dim: 10_000,
        include_terminators: true,
        include_spaces: false,
        equal_weight: false,
    };

    /// Number of distinct ids the extractor can emit. The embedding
    /// table of the paired space needs at least this many rows.
    pub fn id_range(&self) -> usize {
        match *self {
            FeatureKind::CharNgrams { id_dim, .. } => id_dim,
            FeatureKind::ScriptHistogram => script_hist::NUM_BUCKETS,
            FeatureKind::DominantScript => crate::script::NUM_SCRIPTS,
        }
    }

    pub fn extract(&self, text: &str) -> FeatureVector {
        match *self {
            FeatureKind::CharNgrams {
                n,
                id_dim,
                include_terminators,
                include_spaces,
                equal_weight,
            } => ngram::extract(text, n, id_dim, include_terminators, include_spaces, equal_weight),
            FeatureKind::ScriptHistogram => script_hist::extract(text),
            FeatureKind::DominantScript => dominant::extract(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_reaches_every_kind() {
        let text = "plain latin text here";
        assert!(!FeatureKind::TRIGRAMS.extract(text).is_empty());
        assert!(!FeatureKind::ScriptHistogram.extract(text).is_empty());
        assert_eq!(FeatureKind::DominantScript.extract(text).len(), 1);
    }
}
