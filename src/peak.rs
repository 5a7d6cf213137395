//! Dominant bin search
//!
//! The tuner has no low-pass filter. Instead, a peak found in the upper half of
//! the spectrum is treated as an artifact and the search is repeated over the
//! lower half only.

/// Index of the largest value in `magnitude[..range]`.
///
/// Ties go to the lowest index. `range` must be at least 1 and is clamped to
/// the length of `magnitude`.
pub fn find_max(magnitude: &[f32], range: usize) -> usize {
    debug_assert!(range >= 1, "find_max needs a non-empty range");

    let range = range.min(magnitude.len());
    let mut max_index = 0;
    let mut max_so_far = match magnitude.first() {
        Some(&first) => first,
        None => return 0,
    };

    for (i, &value) in magnitude.iter().enumerate().take(range).skip(1) {
        if value > max_so_far {
            max_so_far = value;
            max_index = i;
        }
    }

    max_index
}

/// Two-pass search used by the pipeline.
///
/// Scans the whole spectrum first; if the winner lies above N/2 the lower half
/// is scanned again and that result wins instead.
pub fn dominant_bin(magnitude: &[f32]) -> usize {
    let fft_size = magnitude.len();
    let bin = find_max(magnitude, fft_size);

    if bin > fft_size / 2 {
        let lower = find_max(magnitude, fft_size / 2);
        log::debug!(
            "peak at bin {} is above the fold, using bin {} from the lower half",
            bin,
            lower
        );
        lower
    } else {
        bin
    }
}
