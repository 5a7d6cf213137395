//! Spectral analysis of a mono block
//!
//! A plain complex FFT over the raw samples, no window, reduced to magnitudes.
//! All buffers are allocated once so analysing a block never allocates.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use crate::error::ConfigError;

/// Frequency in Hz of every transform bin, computed once.
#[derive(Debug, Clone)]
pub struct FrequencyAxis {
    frequencies: Vec<f32>,
}

impl FrequencyAxis {
    pub fn new(fft_size: usize, sample_rate: u32) -> Self {
        let bin_width = sample_rate as f32 / fft_size as f32;
        let frequencies = (0..fft_size).map(|i| i as f32 * bin_width).collect();

        Self { frequencies }
    }

    /// Panics if `bin` is outside the transform.
    pub fn frequency(&self, bin: usize) -> f32 {
        self.frequencies[bin]
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    magnitude: Vec<f32>,
}

impl SpectrumAnalyzer {
    pub fn new(fft_size: usize) -> Result<Self, ConfigError> {
        if fft_size < 2 || !fft_size.is_power_of_two() {
            return Err(ConfigError::InvalidFftSize { size: fft_size });
        }

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(fft_size);
        let scratch = vec![Complex::default(); fft.get_inplace_scratch_len()];

        Ok(Self {
            fft,
            fft_size,
            buffer: vec![Complex::default(); fft_size],
            scratch,
            magnitude: vec![0.0; fft_size],
        })
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Transforms `mono` and returns the magnitude of every bin.
    ///
    /// Samples past the end of `mono` are taken as zero; extra samples are ignored.
    /// The returned slice is overwritten by the next call.
    pub fn analyze(&mut self, mono: &[f32]) -> &[f32] {
        for (i, bin) in self.buffer.iter_mut().enumerate() {
            *bin = Complex {
                re: mono.get(i).copied().unwrap_or(0.0),
                im: 0.0,
            };
        }

        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        for (magnitude, bin) in self.magnitude.iter_mut().zip(self.buffer.iter()) {
            *magnitude = bin.norm();
        }

        &self.magnitude
    }
}
