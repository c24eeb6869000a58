//! Banding math for MinHash LSH.
//!
//! With `h` hash functions split into `b` bands of `r = floor(h / b)` rows, a
//! pair with Jaccard similarity `t` shares at least one band bucket with
//! probability `1 - (1 - t^r)^b`.
//!
//! `b > h` leaves `r = 0`, so `t^0 = 1` and the probability is exactly 1 for
//! any `t`. That boundary is reported as-is.

/// Rows per band, `floor(h / b)`. Zero bands give zero rows.
#[inline]
#[must_use]
pub fn rows_per_band(num_hash_functions: u32, num_bands: u32) -> u32 {
    num_hash_functions.checked_div(num_bands).unwrap_or(0)
}

/// Probability in `[0, 1]` that a pair at similarity `t` becomes a candidate.
///
/// Zero bands can never produce a candidate, so the result is `0.0`.
#[must_use]
pub fn candidate_probability(similarity: f64, num_hash_functions: u32, num_bands: u32) -> f64 {
    if num_bands == 0 {
        return 0.0;
    }
    let rows = rows_per_band(num_hash_functions, num_bands);
    let band_match = similarity.powi(saturating_i32(rows));
    1.0 - (1.0 - band_match).powi(saturating_i32(num_bands))
}

/// [`candidate_probability`] as a percentage rounded to one decimal place.
#[must_use]
pub fn candidate_probability_percent(
    similarity: f64,
    num_hash_functions: u32,
    num_bands: u32,
) -> f64 {
    round_one_decimal(candidate_probability(similarity, num_hash_functions, num_bands) * 100.0)
}

#[inline]
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[inline]
fn saturating_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Signature layout of a MinHash LSH index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LshParams {
    /// Signature length.
    pub num_hash_functions: u32,
    /// Number of bands.
    pub num_bands: u32,
}

impl LshParams {
    /// Create parameters.
    #[must_use]
    pub fn new(num_hash_functions: u32, num_bands: u32) -> Self {
        Self {
            num_hash_functions,
            num_bands,
        }
    }

    /// Rows per band.
    #[must_use]
    pub fn rows_per_band(&self) -> u32 {
        rows_per_band(self.num_hash_functions, self.num_bands)
    }

    /// Hash functions that do not fit a whole band and are ignored.
    #[must_use]
    pub fn unused_hash_functions(&self) -> u32 {
        self.num_hash_functions - self.rows_per_band() * self.num_bands.min(self.num_hash_functions)
    }

    /// See [`candidate_probability`].
    #[must_use]
    pub fn candidate_probability(&self, similarity: f64) -> f64 {
        candidate_probability(similarity, self.num_hash_functions, self.num_bands)
    }

    /// See [`candidate_probability_percent`].
    #[must_use]
    pub fn candidate_probability_percent(&self, similarity: f64) -> f64 {
        candidate_probability_percent(similarity, self.num_hash_functions, self.num_bands)
    }

    /// Similarity where the candidate curve is steepest, `(1/b)^(1/r)`.
    ///
    /// `None` when there are no bands or no rows.
    #[must_use]
    pub fn threshold_estimate(&self) -> Option<f64> {
        let rows = self.rows_per_band();
        if self.num_bands == 0 || rows == 0 {
            return None;
        }
        Some((1.0 / f64::from(self.num_bands)).powf(1.0 / f64::from(rows)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_per_band_floors() {
        assert_eq!(rows_per_band(256, 32), 8);
        assert_eq!(rows_per_band(100, 30), 3);
        assert_eq!(rows_per_band(10, 20), 0);
        assert_eq!(rows_per_band(10, 0), 0);
    }

    #[test]
    fn matches_banding_formula() {
        let expected = ((1.0 - (1.0 - 0.5_f64.powi(8)).powi(32)) * 100.0 * 10.0).round() / 10.0;
        assert_eq!(candidate_probability_percent(0.5, 256, 32), expected);
        assert_eq!(expected, 11.8);
    }

    #[test]
    fn more_bands_than_hashes_is_certain() {
        assert_eq!(candidate_probability_percent(0.5, 16, 32), 100.0);
        assert_eq!(candidate_probability_percent(0.0, 1, 2), 100.0);
    }

    #[test]
    fn zero_bands_is_never_a_candidate() {
        assert_eq!(candidate_probability(0.9, 128, 0), 0.0);
    }

    #[test]
    fn extremes_of_similarity() {
        assert_eq!(candidate_probability(1.0, 128, 16), 1.0);
        assert_eq!(candidate_probability(0.0, 128, 16), 0.0);
    }

    #[test]
    fn probability_rises_with_similarity() {
        let params = LshParams::new(128, 16);
        let low = params.candidate_probability(0.3);
        let high = params.candidate_probability(0.9);
        assert!(low < high);
    }

    #[test]
    fn threshold_estimate_near_curve_midpoint() {
        let params = LshParams::new(128, 16);
        let t = params.threshold_estimate().expect("threshold");
        assert!((t - (1.0_f64 / 16.0).powf(1.0 / 8.0)).abs() < 1e-12);
        assert!(LshParams::new(4, 8).threshold_estimate().is_none());
        assert!(LshParams::new(4, 0).threshold_estimate().is_none());
    }

    #[test]
    fn unused_hash_functions_counts_remainder() {
        assert_eq!(LshParams::new(100, 30).unused_hash_functions(), 10);
        assert_eq!(LshParams::new(128, 16).unused_hash_functions(), 0);
        assert_eq!(LshParams::new(4, 8).unused_hash_functions(), 4);
    }
}
