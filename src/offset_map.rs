//! Sparse edit-script between a rewritten text buffer and its source.
//!
//! A scan pass that strips or substitutes bytes records its edits here as
//! run-length {Copy, Insert, Delete} opcodes; `map_back` and
//! `map_forward` then resolve positions across the rewrite. Queries slide
//! a `[lo, hi)` window one opcode at a time, so monotone query sequences
//! (the scanning common case) are O(1) amortized and random access is
//! O(#edits) worst case. Out-of-range queries clamp to the nearest
//! boundary; the opcode stream is consistent by construction and there is
//! no recoverable error.

use smallvec::SmallVec;

const OP_SHIFT: u32 = 6;
const LEN_MASK: u8 = 0x3F;
const MAX_GROUP: usize = 64;

const OP_COPY: u8 = 0;
const OP_INSERT: u8 = 1;
const OP_DELETE: u8 = 2;

/// Edit script with a sliding query window. One instance per scan pass,
/// reset between passes, never shared across threads.
#[derive(Debug, Default)]
pub struct OffsetMap {
    /// Encoded opcodes: two op bits, six length bits (length - 1, so one
    /// byte covers 1..=64 units; longer runs split into 64-unit groups).
    ops: SmallVec<[u8; 64]>,
    pending_op: u8,
    pending_len: usize,
    // Sliding window: opcode index plus the window origin in both
    // coordinate spaces. `op_idx == ops.len()` is the implicit trailing
    // Copy-to-infinity.
    op_idx: usize,
    win_out: usize,
    win_src: usize,
}

impl OffsetMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.ops.clear();
        self.pending_op = OP_COPY;
        self.pending_len = 0;
        self.rewind();
    }

    /// n units present in both source and output.
    #[inline]
    pub fn copy(&mut self, n: usize) {
        self.append(OP_COPY, n);
    }

    /// n units present only in the output.
    #[inline]
    pub fn insert(&mut self, n: usize) {
        self.append(OP_INSERT, n);
    }

    /// n units present only in the source.
    #[inline]
    pub fn delete(&mut self, n: usize) {
        self.append(OP_DELETE, n);
    }

    fn append(&mut self, op: u8, n: usize) {
        if n == 0 {
            return;
        }
        if self.pending_len > 0 && self.pending_op == op {
            self.pending_len += n;
            return;
        }
        self.flush_pending();
        self.pending_op = op;
        self.pending_len = n;
    }

    fn flush_pending(&mut self) {
        let mut n = self.pending_len;
        while n > 0 {
            let group = n.min(MAX_GROUP);
            self.ops
                .push((self.pending_op << OP_SHIFT) | ((group - 1) as u8 & LEN_MASK));
            n -= group;
        }
        self.pending_len = 0;
    }

    /// Map a position in the rewritten text back to its source offset.
    pub fn map_back(&mut self, out_pos: usize) -> usize {
        self.flush_pending();
        self.seek_out(out_pos);
        match self.current_op() {
            None | Some((OP_COPY, _)) => self.win_src + (out_pos - self.win_out),
            Some((OP_INSERT, _)) => self.win_src,
            Some((_, _)) => self.win_src, // delete spans no output; window boundary
        }
    }

    /// Map a source position forward to its offset in the rewritten text.
    pub fn map_forward(&mut self, src_pos: usize) -> usize {
        self.flush_pending();
        self.seek_src(src_pos);
        match self.current_op() {
            None | Some((OP_COPY, _)) => self.win_out + (src_pos - self.win_src),
            Some((OP_DELETE, _)) => self.win_out,
            Some((_, _)) => self.win_out,
        }
    }

    #[inline]
    fn current_op(&self) -> Option<(u8, usize)> {
        self.ops.get(self.op_idx).map(|&b| {
            (b >> OP_SHIFT, (b & LEN_MASK) as usize + 1)
        })
    }

    #[inline]
    fn op_extents(op: u8, len: usize) -> (usize, usize) {
        match op {
            OP_COPY => (len, len),
            OP_INSERT => (len, 0),
            _ => (0, len),
        }
    }

    fn rewind(&mut self) {
        self.op_idx = 0;
        self.win_out = 0;
        self.win_src = 0;
    }

    /// Slide the window until it contains `pos` in output coordinates.
    fn seek_out(&mut self, pos: usize) {
        if pos < self.win_out {
            self.rewind();
        }
        while let Some((op, len)) = self.current_op() {
            let (out_len, src_len) = Self::op_extents(op, len);
            // Zero-width ops (deletes) are stepped over; an op containing
            // `pos` stops the walk.
            if out_len > 0 && pos < self.win_out + out_len {
                return;
            }
            self.win_out += out_len;
            self.win_src += src_len;
            self.op_idx += 1;
        }
    }

    /// Slide the window until it contains `pos` in source coordinates.
    fn seek_src(&mut self, pos: usize) {
        if pos < self.win_src {
            self.rewind();
        }
        while let Some((op, len)) = self.current_op() {
            let (out_len, src_len) = Self::op_extents(op, len);
            if src_len > 0 && pos < self.win_src + src_len {
                return;
            }
            self.win_out += out_len;
            self.win_src += src_len;
            self.op_idx += 1;
        }
    }
}
