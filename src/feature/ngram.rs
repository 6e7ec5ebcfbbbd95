//! Bag-of-character-n-grams feature.

use std::collections::BTreeMap;

use super::{FeatureValue, FeatureVector};

/// 64-bit FNV-1a over the n-gram's UTF-8 bytes. Small, deterministic,
/// and stable across platforms; the discrete id is the hash reduced
/// modulo the embedding vocabulary.
fn fnv1a(chars: &[char]) -> u64 {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut h = OFFSET;
    let mut buf = [0u8; 4];
    for &c in chars {
        for &b in c.encode_utf8(&mut buf).as_bytes() {
            h ^= b as u64;
            h = h.wrapping_mul(PRIME);
        }
    }
    h
}

pub fn extract(
    text: &str,
    n: usize,
    id_dim: usize,
    include_terminators: bool,
    include_spaces: bool,
    equal_weight: bool,
) -> FeatureVector {
    let mut out = FeatureVector::new();
    if n == 0 || id_dim == 0 {
        return out;
    }

    // Character sequence, optionally with ^token$ boundary markers.
    let mut chars: Vec<char> = Vec::with_capacity(text.len());
    if include_terminators {
        for token in text.split_whitespace() {
            if !chars.is_empty() {
                chars.push(' ');
            }
            chars.push('^');
            chars.extend(token.chars());
            chars.push('$');
        }
    } else {
        chars.extend(text.chars());
    }
    if chars.len() < n {
        return out;
    }

    // Count occurrences per distinct n-gram. BTreeMap keeps emission
    // order deterministic, which keeps downstream float accumulation
    // bit-identical between runs.
    let mut counts: BTreeMap<u64, u32> = BTreeMap::new();
    let mut total = 0u32;
    for window in chars.windows(n) {
        if !include_spaces && window.contains(&' ') {
            continue;
        }
        *counts.entry(fnv1a(window)).or_insert(0) += 1;
        total += 1;
    }
    if total == 0 {
        return out;
    }

    let distinct = counts.len() as f32;
    for (hash, count) in counts {
        let weight = if equal_weight {
            1.0 / distinct
        } else {
            count as f32 / total as f32
        };
        out.push(FeatureValue {
            id: (hash % id_dim as u64) as u32,
            weight,
        });
    }
    out
}
