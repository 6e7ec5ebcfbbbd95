//! Model parameter abstraction.
//!
//! [`NetworkParams`] is the seam between the scorer and wherever the
//! weights actually live. The crate ships one implementation, the
//! compiled-in [`embedded::EmbeddedModel`]; alternative weight sources
//! implement the same trait and plug into the identifier unchanged.

pub mod embedded;

use thiserror::Error;

use crate::feature::FeatureKind;
use crate::network::{EmbeddingMatrix, MatrixView};

/// Shape violations found while wiring a model into the network.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("embedding space {space}: concat offset {declared} does not match running total {expected}")]
    ConcatOffset {
        space: usize,
        declared: usize,
        expected: usize,
    },
    #[error("embedding space {space}: matrix has {cols} columns but declares dim {dim}")]
    EmbeddingShape { space: usize, cols: usize, dim: usize },
    #[error("embedding space {space}: {rows} quantized rows but {scales} scales")]
    ScaleCount {
        space: usize,
        rows: usize,
        scales: usize,
    },
    #[error("layer {layer}: weight matrix with {rows} rows but bias of length {bias}")]
    LayerShape {
        layer: usize,
        rows: usize,
        bias: usize,
    },
    #[error("layer {layer}: expects {cols} inputs but receives {inputs}")]
    LayerInput {
        layer: usize,
        cols: usize,
        inputs: usize,
    },
    #[error("softmax has {rows} rows but {langs} languages are declared")]
    LanguageCount { rows: usize, langs: usize },
    #[error("{kinds} feature kinds declared for {spaces} embedding spaces")]
    FeatureCount { kinds: usize, spaces: usize },
    #[error("embedding space {space}: feature ids cover {ids} values but the table has {rows} rows")]
    FeatureRange {
        space: usize,
        ids: usize,
        rows: usize,
    },
}

/// Everything the network needs to know about one trained model.
///
/// Embedding spaces are indexed `0..embedding_spaces()` and pair up
/// positionally with `feature_kinds()`. The softmax rows pair up
/// positionally with `languages()`.
pub trait NetworkParams {
    fn embedding_spaces(&self) -> usize;
    fn embedding(&self, space: usize) -> EmbeddingMatrix<'_>;
    /// Output width of one embedding row.
    fn embedding_dim(&self, space: usize) -> usize;
    /// How many feature slots of this space the concatenation reserves.
    fn embedding_num_features(&self, space: usize) -> usize;
    /// Start of this space's block in the concatenated input vector.
    fn concat_offset(&self, space: usize) -> usize;

    /// The feature function each embedding space was trained against.
    fn feature_kinds(&self) -> &[FeatureKind];

    fn hidden_layers(&self) -> usize;
    fn hidden_weights(&self, layer: usize) -> MatrixView<'_>;
    fn hidden_bias(&self, layer: usize) -> &[f32];

    fn softmax_weights(&self) -> MatrixView<'_>;
    fn softmax_bias(&self) -> &[f32];

    /// BCP-47 codes in softmax row order.
    fn languages(&self) -> &[&'static str];

    /// Cross-check every declared shape. The network runs this before
    /// borrowing any view.
    fn validate(&self) -> Result<(), ModelError> {
        let kinds = self.feature_kinds();
        if kinds.len() != self.embedding_spaces() {
            return Err(ModelError::FeatureCount {
                kinds: kinds.len(),
                spaces: self.embedding_spaces(),
            });
        }

        let mut concat_dim = 0usize;
        for es in 0..self.embedding_spaces() {
            let dim = self.embedding_dim(es);
            let matrix = self.embedding(es);
            match matrix {
                EmbeddingMatrix::Plain(m) => {
                    if m.cols != dim {
                        return Err(ModelError::EmbeddingShape {
                            space: es,
                            cols: m.cols,
                            dim,
                        });
                    }
                }
                EmbeddingMatrix::Quantized {
                    rows, cols, scales, ..
                } => {
                    if cols != dim {
                        return Err(ModelError::EmbeddingShape {
                            space: es,
                            cols,
                            dim,
                        });
                    }
                    if scales.len() != rows {
                        return Err(ModelError::ScaleCount {
                            space: es,
                            rows,
                            scales: scales.len(),
                        });
                    }
                }
            }
            // Every id the paired feature can emit must have a row, or
            // scoring would slice past the table.
            let ids = kinds[es].id_range();
            if matrix.rows() < ids {
                return Err(ModelError::FeatureRange {
                    space: es,
                    ids,
                    rows: matrix.rows(),
                });
            }
            concat_dim += dim * self.embedding_num_features(es);
        }

        let mut inputs = concat_dim;
        for layer in 0..self.hidden_layers() {
            let w = self.hidden_weights(layer);
            if w.cols != inputs {
                return Err(ModelError::LayerInput {
                    layer,
                    cols: w.cols,
                    inputs,
                });
            }
            let bias = self.hidden_bias(layer).len();
            if bias != w.rows {
                return Err(ModelError::LayerShape {
                    layer,
                    rows: w.rows,
                    bias,
                });
            }
            inputs = w.rows;
        }

        let sm = self.softmax_weights();
        let layer = self.hidden_layers();
        if sm.cols != inputs {
            return Err(ModelError::LayerInput {
                layer,
                cols: sm.cols,
                inputs,
            });
        }
        if self.softmax_bias().len() != sm.rows {
            return Err(ModelError::LayerShape {
                layer,
                rows: sm.rows,
                bias: self.softmax_bias().len(),
            });
        }
        if self.languages().len() != sm.rows {
            return Err(ModelError::LanguageCount {
                rows: sm.rows,
                langs: self.languages().len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Lopsided;

    impl NetworkParams for Lopsided {
        fn embedding_spaces(&self) -> usize {
            1
        }
        fn embedding(&self, _space: usize) -> EmbeddingMatrix<'_> {
            static DATA: [f32; 6] = [0.0; 6];
            EmbeddingMatrix::Plain(MatrixView {
                rows: 2,
                cols: 3,
                data: &DATA,
            })
        }
        fn embedding_dim(&self, _space: usize) -> usize {
            4 // does not match the 3-column matrix
        }
        fn embedding_num_features(&self, _space: usize) -> usize {
            1
        }
        fn concat_offset(&self, _space: usize) -> usize {
            0
        }
        fn feature_kinds(&self) -> &[FeatureKind] {
            &[FeatureKind::ScriptHistogram]
        }
        fn hidden_layers(&self) -> usize {
            0
        }
        fn hidden_weights(&self, _layer: usize) -> MatrixView<'_> {
            unreachable!("no hidden layers")
        }
        fn hidden_bias(&self, _layer: usize) -> &[f32] {
            unreachable!("no hidden layers")
        }
        fn softmax_weights(&self) -> MatrixView<'_> {
            static DATA: [f32; 8] = [0.0; 8];
            MatrixView {
                rows: 2,
                cols: 4,
                data: &DATA,
            }
        }
        fn softmax_bias(&self) -> &[f32] {
            &[0.0, 0.0]
        }
        fn languages(&self) -> &[&'static str] {
            &["aa", "bb"]
        }
    }

    // Well-shaped layers, but the histogram feature emits ids 0..11 and
    // the embedding table only has 4 rows.
    struct ShortTable;

    impl NetworkParams for ShortTable {
        fn embedding_spaces(&self) -> usize {
            1
        }
        fn embedding(&self, _space: usize) -> EmbeddingMatrix<'_> {
            static DATA: [f32; 8] = [0.0; 8];
            EmbeddingMatrix::Plain(MatrixView {
                rows: 4,
                cols: 2,
                data: &DATA,
            })
        }
        fn embedding_dim(&self, _space: usize) -> usize {
            2
        }
        fn embedding_num_features(&self, _space: usize) -> usize {
            1
        }
        fn concat_offset(&self, _space: usize) -> usize {
            0
        }
        fn feature_kinds(&self) -> &[FeatureKind] {
            &[FeatureKind::ScriptHistogram]
        }
        fn hidden_layers(&self) -> usize {
            0
        }
        fn hidden_weights(&self, _layer: usize) -> MatrixView<'_> {
            unreachable!("no hidden layers")
        }
        fn hidden_bias(&self, _layer: usize) -> &[f32] {
            unreachable!("no hidden layers")
        }
        fn softmax_weights(&self) -> MatrixView<'_> {
            static DATA: [f32; 4] = [0.0; 4];
            MatrixView {
                rows: 2,
                cols: 2,
                data: &DATA,
            }
        }
        fn softmax_bias(&self) -> &[f32] {
            &[0.0, 0.0]
        }
        fn languages(&self) -> &[&'static str] {
            &["aa", "bb"]
        }
    }

    #[test]
    fn validate_rejects_undersized_embedding_table() {
        assert_eq!(
            ShortTable.validate(),
            Err(ModelError::FeatureRange {
                space: 0,
                ids: crate::feature::script_hist::NUM_BUCKETS,
                rows: 4,
            })
        );
    }

    #[test]
    fn validate_rejects_shape_mismatch() {
        assert_eq!(
            Lopsided.validate(),
            Err(ModelError::EmbeddingShape {
                space: 0,
                cols: 3,
                dim: 4,
            })
        );
    }

    #[test]
    fn embedded_model_validates() {
        assert_eq!(embedded::EmbeddedModel.validate(), Ok(()));
    }
}
