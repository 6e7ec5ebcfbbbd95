//! The identifier: ties scanning, feature extraction and scoring into
//! the two public operations.

use std::collections::BTreeMap;

use crate::feature::FeatureKind;
use crate::lang::{self, UNKNOWN};
use crate::model::NetworkParams;
use crate::model::embedded::EmbeddedModel;
use crate::network::EmbeddingNetwork;
use crate::span::{ScriptSpanScanner, SpanBuffers};
use crate::squeeze::squeeze;
use crate::utf8;

/// Hard cap on how many input bytes a single call ever examines.
pub const MAX_INPUT_BYTES: usize = 10_000;

/// Below this many cleaned bytes the identifier refuses to guess.
pub const DEFAULT_MIN_TEXT_BYTES: usize = 140;

/// Above this many squeezed bytes the text is snippet-sampled.
pub const DEFAULT_MAX_TEXT_BYTES: usize = 700;

/// How many evenly spaced snippets an over-budget text is reduced to.
const NUM_SNIPPETS: usize = 10;

static EMBEDDED: EmbeddedModel = EmbeddedModel;

/// One classification outcome. `proportion` is only meaningful for
/// [`LanguageIdentifier::find_top_n_languages`], where it is the share
/// of processed bytes attributed to the language.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Identification {
    pub language: &'static str,
    pub probability: f32,
    pub is_reliable: bool,
    pub proportion: f32,
}

impl Identification {
    /// The sentinel returned whenever nothing can be determined.
    pub const fn unknown() -> Self {
        Self {
            language: UNKNOWN,
            probability: 0.0,
            is_reliable: false,
            proportion: 0.0,
        }
    }
}

/// Configures a [`LanguageIdentifier`].
pub struct Builder<'m> {
    params: &'m dyn NetworkParams,
    min_text_bytes: usize,
    max_text_bytes: usize,
}

impl<'m> Builder<'m> {
    /// Swap in a different model source. The parameter object must
    /// outlive the identifier.
    pub fn model<'p>(self, params: &'p dyn NetworkParams) -> Builder<'p> {
        Builder {
            params,
            min_text_bytes: self.min_text_bytes,
            max_text_bytes: self.max_text_bytes,
        }
    }

    pub fn min_text_bytes(mut self, bytes: usize) -> Self {
        self.min_text_bytes = bytes;
        self
    }

    pub fn max_text_bytes(mut self, bytes: usize) -> Self {
        self.max_text_bytes = bytes;
        self
    }

    pub fn build(self) -> LanguageIdentifier<'m> {
        LanguageIdentifier {
            network: EmbeddingNetwork::new(self.params),
            kinds: self.params.feature_kinds(),
            languages: self.params.languages(),
            min_text_bytes: self.min_text_bytes,
            max_text_bytes: self.max_text_bytes,
            bufs: SpanBuffers::new(),
        }
    }
}

/// Synchronous, no I/O, and infallible: every call returns a value,
/// degrading to the `"und"` sentinel rather than erroring. Owns its
/// scratch buffers, so one instance is not shareable across threads;
/// the model weights behind it are.
pub struct LanguageIdentifier<'m> {
    network: EmbeddingNetwork<'m>,
    kinds: &'m [FeatureKind],
    languages: &'m [&'static str],
    min_text_bytes: usize,
    max_text_bytes: usize,
    bufs: SpanBuffers,
}

impl LanguageIdentifier<'static> {
    /// Identifier over the compiled-in model with default thresholds.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> Builder<'static> {
        Builder {
            params: &EMBEDDED,
            min_text_bytes: DEFAULT_MIN_TEXT_BYTES,
            max_text_bytes: DEFAULT_MAX_TEXT_BYTES,
        }
    }
}

impl Default for LanguageIdentifier<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'m> LanguageIdentifier<'m> {
    /// The single most likely language of `text`.
    pub fn find_language(&mut self, text: &[u8]) -> Identification {
        let input = clamp(text);
        let mut scanner = ScriptSpanScanner::new(&mut self.bufs, input, true);
        let mut all = String::new();
        while let Some(span) = scanner.next_span() {
            // Spans carry their own padding spaces; plain concatenation
            // keeps token boundaries intact.
            all.push_str(span.text);
        }
        if all.len() < self.min_text_bytes {
            return Identification::unknown();
        }

        let squeezed = squeeze(&all);
        let chunk = self.bounded(&squeezed);
        let (best, probability) = self.classify(&chunk);
        let language = self.languages[best];
        Identification {
            language,
            probability,
            is_reliable: probability >= lang::reliability_threshold(language),
            proportion: 1.0,
        }
    }

    /// The `n` most frequent languages by byte share, padded with
    /// unknown entries to exactly `n` results.
    pub fn find_top_n_languages(&mut self, text: &[u8], n: usize) -> Vec<Identification> {
        struct Stats {
            prob_sum: f32,
            byte_sum: usize,
            chunk_count: usize,
        }

        let input = clamp(text);
        let mut stats: BTreeMap<usize, Stats> = BTreeMap::new();
        let mut total_bytes = 0usize;

        let mut scanner = ScriptSpanScanner::new(&mut self.bufs, input, true);
        loop {
            let (span_text, content_end) = match scanner.next_span() {
                Some(span) => (span.text.to_owned(), span.text.len() - 3),
                None => break,
            };
            // Byte length of the span in the original buffer.
            let start = scanner.span_to_original(1);
            let end = scanner.span_to_original(content_end);
            let original_bytes = end.saturating_sub(start).max(1);

            let squeezed = squeeze(&span_text);
            if squeezed.len() < self.min_text_bytes {
                continue;
            }
            let chunk = bounded_text(&squeezed, self.max_text_bytes);
            let scores = score(&self.network, self.kinds, &chunk);
            let (best, probability) = top_probability(&scores);

            let entry = stats.entry(best).or_insert(Stats {
                prob_sum: 0.0,
                byte_sum: 0,
                chunk_count: 0,
            });
            entry.prob_sum += probability;
            entry.byte_sum += original_bytes;
            entry.chunk_count += 1;
            total_bytes += original_bytes;
        }
        drop(scanner);

        let mut ranked: Vec<(usize, Stats)> = stats.into_iter().collect();
        ranked.sort_by(|(la, a), (lb, b)| {
            b.byte_sum
                .cmp(&a.byte_sum)
                .then_with(|| self.languages[*la].cmp(self.languages[*lb]))
        });

        let mut out = Vec::with_capacity(n);
        for (lang_idx, s) in ranked.into_iter().take(n) {
            let language = self.languages[lang_idx];
            // Mean probability over the language's chunks; ranking and
            // proportion stay byte-mass based.
            let probability = s.prob_sum / s.chunk_count as f32;
            out.push(Identification {
                language,
                probability,
                is_reliable: probability >= lang::reliability_threshold(language),
                proportion: s.byte_sum as f32 / total_bytes as f32,
            });
        }
        while out.len() < n {
            out.push(Identification::unknown());
        }
        out
    }

    fn bounded<'t>(&self, text: &'t str) -> std::borrow::Cow<'t, str> {
        bounded_text(text, self.max_text_bytes)
    }

    fn classify(&self, text: &str) -> (usize, f32) {
        top_probability(&score(&self.network, self.kinds, text))
    }
}

/// Clamp to the input budget, then to the interchange-valid prefix.
/// Everything past the first invalid byte is never examined.
fn clamp(text: &[u8]) -> &[u8] {
    let text = &text[..text.len().min(MAX_INPUT_BYTES)];
    &text[..utf8::interchange_valid_prefix(text)]
}

/// Reduce over-budget text to `NUM_SNIPPETS` evenly spaced,
/// char-aligned windows joined by single spaces.
fn bounded_text(text: &str, max_bytes: usize) -> std::borrow::Cow<'_, str> {
    if text.len() <= max_bytes {
        return std::borrow::Cow::Borrowed(text);
    }
    let chunk = (max_bytes / NUM_SNIPPETS).max(1);
    let stride = text.len() / NUM_SNIPPETS;
    let mut out = String::with_capacity(max_bytes + NUM_SNIPPETS);
    for i in 0..NUM_SNIPPETS {
        let mut start = i * stride;
        while start < text.len() && !text.is_char_boundary(start) {
            start += 1;
        }
        let mut end = (start + chunk).min(text.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        if end <= start {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&text[start..end]);
    }
    std::borrow::Cow::Owned(out)
}

fn score(network: &EmbeddingNetwork<'_>, kinds: &[FeatureKind], text: &str) -> Vec<f32> {
    let features: Vec<_> = kinds.iter().map(|k| k.extract(text)).collect();
    network.compute_scores(&features)
}

/// Arg-max class and its softmax probability, computed with the
/// log-sum-exp trick so large scores cannot overflow.
fn top_probability(scores: &[f32]) -> (usize, f32) {
    let mut best = 0;
    for (i, &s) in scores.iter().enumerate() {
        if s > scores[best] {
            best = i;
        }
    }
    let max = scores[best];
    let sum: f32 = scores.iter().map(|&s| (s - max).exp()).sum();
    (best, (-sum.ln()).exp())
}
