//! Configuration errors
//!
//! Out-of-range frequencies are not errors; they are reported as
//! `Detection::NoSignal`. Everything here means the pipeline must not run.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid sample rate: {rate} Hz")]
    InvalidSampleRate { rate: u32 },

    #[error("FFT size must be a power of two of at least 2, got {size}")]
    InvalidFftSize { size: usize },

    #[error("stereo block size must be even and non-zero, got {size}")]
    InvalidBlockSize { size: usize },

    #[error("block of {frames} mono frames does not fit a {fft_size}-point FFT")]
    BlockLargerThanFft { frames: usize, fft_size: usize },

    #[error("expected {expected} interleaved samples, got {input} in and {output} out")]
    BlockSizeMismatch {
        expected: usize,
        input: usize,
        output: usize,
    },
}
