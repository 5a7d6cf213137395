//! Stereo/mono conversion between the host's interleaved `i16` blocks and the
//! `f32` signal the analysis runs on. Samples keep the `i16` scale.

/// Averages each left/right pair of `stereo` into `mono`.
///
/// Converts `min(stereo.len() / 2, mono.len())` frames and returns that count.
pub fn stereo_to_mono(stereo: &[i16], mono: &mut [f32]) -> usize {
    let mut frames = 0;
    for (frame, out) in stereo.chunks_exact(2).zip(mono.iter_mut()) {
        *out = (frame[0] as f32 + frame[1] as f32) * 0.5;
        frames += 1;
    }
    frames
}

/// Writes each mono sample to both channels of `stereo`, rounded and saturated to `i16`.
pub fn mono_to_stereo(mono: &[f32], stereo: &mut [i16]) -> usize {
    let mut frames = 0;
    for (frame, &sample) in stereo.chunks_exact_mut(2).zip(mono.iter()) {
        // `as` saturates out-of-range floats and maps NaN to zero.
        let value = sample.round() as i16;
        frame[0] = value;
        frame[1] = value;
        frames += 1;
    }
    frames
}
