//! Fixed configuration for the pitch detection pipeline
//!
//! All values are compile-time constants. `PipelineConfig` gathers the ones the
//! pipeline needs so a host can substitute the sample rate its device actually
//! runs at.

use crate::error::ConfigError;

/// Sampling rate the tuner is calibrated for, in Hz.
pub const SAMPLING_RATE_HZ: u32 = 16_000;

/// Number of points in the transform. Must be a power of two.
pub const FFT_SIZE: usize = 4096;

/// Total size of the host's double buffer, in interleaved samples.
/// A block is handed over each time half of it fills.
pub const DOUBLE_AUDIO_BUFFER_SIZE: usize = 8192;

/// Interleaved stereo samples per processed block.
pub const STEREO_BUFFER_SIZE: usize = DOUBLE_AUDIO_BUFFER_SIZE / 2;

/// Mono frames per processed block.
pub const MONO_BUFFER_SIZE: usize = STEREO_BUFFER_SIZE / 2;

/// A4, the pitch every semitone offset is measured from.
pub const REFERENCE_FREQUENCY: f32 = 440.0;

/// Lowest fundamental reported. Just under E2 (82.4 Hz), the lowest guitar string.
pub const MIN_FREQUENCY: f32 = 80.0;

/// Highest fundamental reported, around B7.
pub const MAX_FREQUENCY: f32 = 4000.0;

/// Calibration offset for octave numbering: `ceil((semitones + 46) / 12)`
/// puts A4 in octave 4 and starts each octave at C.
pub const OCTAVE_OFFSET: i32 = 46;

/// Text shown when no note is in range.
pub const NO_SIGNAL_MESSAGE: &str = "No signal is detected";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub sample_rate: u32,
    pub fft_size: usize,
    /// Interleaved stereo samples per block (left and right counted separately).
    pub stereo_block_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLING_RATE_HZ,
            fft_size: FFT_SIZE,
            stereo_block_size: STEREO_BUFFER_SIZE,
        }
    }
}

impl PipelineConfig {
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn mono_block_size(&self) -> usize {
        self.stereo_block_size / 2
    }

    /// Width of one transform bin in Hz.
    pub fn bin_width(&self) -> f32 {
        self.sample_rate as f32 / self.fft_size as f32
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::InvalidSampleRate {
                rate: self.sample_rate,
            });
        }

        if self.fft_size < 2 || !self.fft_size.is_power_of_two() {
            return Err(ConfigError::InvalidFftSize {
                size: self.fft_size,
            });
        }

        if self.stereo_block_size == 0 || self.stereo_block_size % 2 != 0 {
            return Err(ConfigError::InvalidBlockSize {
                size: self.stereo_block_size,
            });
        }

        if self.mono_block_size() > self.fft_size {
            return Err(ConfigError::BlockLargerThanFft {
                frames: self.mono_block_size(),
                fft_size: self.fft_size,
            });
        }

        Ok(())
    }
}
