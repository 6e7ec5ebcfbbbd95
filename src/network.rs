//! Quantization-aware feed-forward scorer.
//!
//! The network is a fixed pipeline: embedding lookup and additive
//! concatenation, one or two hidden layers, then an unnormalized softmax
//! layer. All weights are non-owning views over the model parameter
//! object; the network borrows, never copies. Shape violations are
//! programmer/build errors and abort construction; scoring itself is
//! infallible and deterministic.

use crate::feature::FeatureVector;
use crate::model::{ModelError, NetworkParams};

/// Non-owning row-major matrix view: `rows` output coordinates by
/// `cols` input coordinates.
#[derive(Debug, Clone, Copy)]
pub struct MatrixView<'a> {
    pub rows: usize,
    pub cols: usize,
    pub data: &'a [f32],
}

impl<'a> MatrixView<'a> {
    #[inline]
    pub fn row(&self, r: usize) -> &'a [f32] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }
}

/// Embedding table, either raw float rows or uint8 rows biased by 128
/// with one half-precision scale per row.
#[derive(Debug, Clone, Copy)]
pub enum EmbeddingMatrix<'a> {
    Plain(MatrixView<'a>),
    Quantized {
        rows: usize,
        cols: usize,
        data: &'a [u8],
        /// IEEE 754 binary16 bit patterns, one per row.
        scales: &'a [u16],
    },
}

impl EmbeddingMatrix<'_> {
    pub fn rows(&self) -> usize {
        match *self {
            EmbeddingMatrix::Plain(m) => m.rows,
            EmbeddingMatrix::Quantized { rows, .. } => rows,
        }
    }

    pub fn cols(&self) -> usize {
        match *self {
            EmbeddingMatrix::Plain(m) => m.cols,
            EmbeddingMatrix::Quantized { cols, .. } => cols,
        }
    }
}

/// Decode an IEEE 754 half-precision bit pattern.
pub fn f16_to_f32(bits: u16) -> f32 {
    let sign = ((bits >> 15) & 1) as u32;
    let exp = ((bits >> 10) & 0x1F) as u32;
    let frac = (bits & 0x3FF) as u32;
    let out = match exp {
        0 => {
            // subnormal: frac * 2^-24
            return if sign == 1 { -1.0 } else { 1.0 } * frac as f32 * 2.0_f32.powi(-24);
        }
        0x1F => (sign << 31) | 0xFF << 23 | frac << 13,
        _ => (sign << 31) | (exp + 127 - 15) << 23 | frac << 13,
    };
    f32::from_bits(out)
}

struct Space<'a> {
    matrix: EmbeddingMatrix<'a>,
    dim: usize,
    concat_offset: usize,
}

/// The scorer. Borrows every weight from the parameter object, so the
/// model must outlive the network (and any identifier built on it).
pub struct EmbeddingNetwork<'a> {
    spaces: Vec<Space<'a>>,
    hidden: Vec<(MatrixView<'a>, &'a [f32])>,
    softmax: (MatrixView<'a>, &'a [f32]),
    concat_dim: usize,
}

impl<'a> EmbeddingNetwork<'a> {
    /// Validate the model shape and wire up the views. Malformed models
    /// are construction-time fatal; use [`NetworkParams::validate`]
    /// first when the parameters come from an untrusted source.
    pub fn new(params: &'a dyn NetworkParams) -> Self {
        Self::try_new(params).expect("network parameters failed validation – this is a bug")
    }

    pub fn try_new(params: &'a dyn NetworkParams) -> Result<Self, ModelError> {
        params.validate()?;

        let mut spaces = Vec::with_capacity(params.embedding_spaces());
        let mut expected_offset = 0usize;
        for es in 0..params.embedding_spaces() {
            let matrix = params.embedding(es);
            let dim = params.embedding_dim(es);
            let offset = params.concat_offset(es);
            if offset != expected_offset {
                return Err(ModelError::ConcatOffset {
                    space: es,
                    declared: offset,
                    expected: expected_offset,
                });
            }
            expected_offset += dim * params.embedding_num_features(es);
            spaces.push(Space {
                matrix,
                dim,
                concat_offset: offset,
            });
        }
        let concat_dim = expected_offset;

        let mut hidden = Vec::new();
        for i in 0..params.hidden_layers() {
            hidden.push((params.hidden_weights(i), params.hidden_bias(i)));
        }
        Ok(Self {
            spaces,
            hidden,
            softmax: (params.softmax_weights(), params.softmax_bias()),
            concat_dim,
        })
    }

    pub fn num_classes(&self) -> usize {
        self.softmax.0.rows
    }

    /// Raw class scores for one set of per-space feature vectors.
    /// Unnormalized: apply softmax for a probability distribution.
    pub fn compute_scores(&self, features: &[FeatureVector]) -> Vec<f32> {
        let mut concat = vec![0.0f32; self.concat_dim];
        for (space, feats) in self.spaces.iter().zip(features) {
            let out = &mut concat[space.concat_offset..space.concat_offset + space.dim];
            for f in feats {
                accumulate_row(&space.matrix, f.id as usize, f.weight, out);
            }
        }

        let mut x = concat;
        for (i, (w, b)) in self.hidden.iter().enumerate() {
            // The concatenated vector feeds the first layer unscreened;
            // later layers gate on positive inputs.
            x = affine(*w, b, &x, i > 0);
        }
        let (w, b) = self.softmax;
        affine(w, b, &x, true)
    }
}

/// `y = W·f(x) + b` where `f` is relu when `gate` is set. The gated
/// form skips non-positive inputs entirely rather than multiplying by
/// zero; same result, fewer fused multiplies.
fn affine(w: MatrixView<'_>, bias: &[f32], x: &[f32], gate: bool) -> Vec<f32> {
    let mut y = bias.to_vec();
    for (i, &xi) in x.iter().enumerate() {
        if gate && xi <= 0.0 {
            continue;
        }
        for (r, yr) in y.iter_mut().enumerate() {
            *yr += w.data[r * w.cols + i] * xi;
        }
    }
    y
}

/// Add `weight *` row `r` of the embedding matrix into `out`,
/// dequantizing on the fly for uint8 rows.
fn accumulate_row(matrix: &EmbeddingMatrix<'_>, r: usize, weight: f32, out: &mut [f32]) {
    match *matrix {
        EmbeddingMatrix::Plain(m) => {
            for (o, &v) in out.iter_mut().zip(m.row(r)) {
                *o += weight * v;
            }
        }
        EmbeddingMatrix::Quantized {
            cols, data, scales, ..
        } => {
            let scale = f16_to_f32(scales[r]);
            let row = &data[r * cols..(r + 1) * cols];
            for (o, &q) in out.iter_mut().zip(row) {
                *o += weight * (q as i32 - 128) as f32 * scale;
            }
        }
    }
}

/// Quantize one value against a row scale; exercised by tests to pin
/// the round-trip error bound.
#[cfg(test)]
fn quantize(v: f32, scale: f32) -> u8 {
    ((v / scale).round() as i32 + 128).clamp(0, 255) as u8
}
