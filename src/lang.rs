//! Language codes and reliability thresholds.

/// Returned whenever no language can be determined.
pub const UNKNOWN: &str = "und";

/// Minimum probability for a prediction to count as reliable, unless
/// the language carries its own threshold below.
pub const RELIABILITY_THRESHOLD: f32 = 0.70;

/// Croatian and Bosnian are close enough that the model splits their
/// mass; either is accepted at a lower bar.
pub const RELIABILITY_HR_BS_THRESHOLD: f32 = 0.50;

/// Reliability bar for one language code.
pub fn reliability_threshold(code: &str) -> f32 {
    match code {
        "hr" | "bs" => RELIABILITY_HR_BS_THRESHOLD,
        _ => RELIABILITY_THRESHOLD,
    }
}
