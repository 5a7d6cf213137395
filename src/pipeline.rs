//! Per-block pitch detection
//!
//! Ties the stages together: downmix, spectrum, dominant bin, note name,
//! display, pass-through. One instance owns every buffer it touches and is
//! driven from a single audio callback.

use crate::config::PipelineConfig;
use crate::convert;
use crate::error::ConfigError;
use crate::peak;
use crate::pitch::{frequency_to_note, Detection};
use crate::spectrum::{FrequencyAxis, SpectrumAnalyzer};

/// Receives the text for each processed block.
pub trait NoteDisplay {
    fn display_text(&mut self, text: &str);
}

impl<F: FnMut(&str)> NoteDisplay for F {
    fn display_text(&mut self, text: &str) {
        self(text)
    }
}

/// What one block produced. Nothing is kept between blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub bin: usize,
    pub frequency: f32,
    pub detection: Detection,
}

pub struct PitchDetectionPipeline {
    config: PipelineConfig,
    axis: FrequencyAxis,
    analyzer: SpectrumAnalyzer,
    mono: Vec<f32>,
}

impl PitchDetectionPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let analyzer = SpectrumAnalyzer::new(config.fft_size)?;
        let axis = FrequencyAxis::new(config.fft_size, config.sample_rate);

        log::info!(
            "Pitch detection: {} Hz, {}-point FFT ({:.2} Hz per bin), {} frames per block",
            config.sample_rate,
            config.fft_size,
            config.bin_width(),
            config.mono_block_size()
        );

        Ok(Self {
            config,
            axis,
            analyzer,
            mono: vec![0.0; config.mono_block_size()],
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Names the dominant note of a mono signal.
    ///
    /// Signals shorter than the FFT are zero-padded, longer ones truncated.
    pub fn detect(&mut self, mono: &[f32]) -> Reading {
        let magnitude = self.analyzer.analyze(mono);
        read_spectrum(&self.axis, magnitude)
    }

    /// Runs one full cycle on an interleaved stereo block.
    ///
    /// `stereo_out` receives the downmixed signal on both channels regardless of
    /// what was detected. Blocks of the wrong size are rejected untouched.
    pub fn process<D: NoteDisplay + ?Sized>(
        &mut self,
        stereo_in: &[i16],
        stereo_out: &mut [i16],
        display: &mut D,
    ) -> Result<Reading, ConfigError> {
        let expected = self.config.stereo_block_size;
        if stereo_in.len() != expected || stereo_out.len() != expected {
            return Err(ConfigError::BlockSizeMismatch {
                expected,
                input: stereo_in.len(),
                output: stereo_out.len(),
            });
        }

        convert::stereo_to_mono(stereo_in, &mut self.mono);

        let magnitude = self.analyzer.analyze(&self.mono);
        let reading = read_spectrum(&self.axis, magnitude);
        log::trace!(
            "bin {} -> {:.2} Hz -> {}",
            reading.bin,
            reading.frequency,
            reading.detection
        );

        display.display_text(reading.detection.text());
        convert::mono_to_stereo(&self.mono, stereo_out);

        Ok(reading)
    }
}

fn read_spectrum(axis: &FrequencyAxis, magnitude: &[f32]) -> Reading {
    let bin = peak::dominant_bin(magnitude);
    let frequency = axis.frequency(bin);

    Reading {
        bin,
        frequency,
        detection: frequency_to_note(frequency),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FFT_SIZE, SAMPLING_RATE_HZ, STEREO_BUFFER_SIZE};

    #[derive(Default)]
    struct RecordingDisplay {
        shown: Vec<String>,
    }

    impl NoteDisplay for RecordingDisplay {
        fn display_text(&mut self, text: &str) {
            self.shown.push(text.to_string());
        }
    }

    fn sine(frequency: f32, amplitude: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|n| {
                let t = n as f32 / SAMPLING_RATE_HZ as f32;
                amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
            })
            .collect()
    }

    fn stereo_sine(frequency: f32, amplitude: f32) -> Vec<i16> {
        sine(frequency, amplitude, STEREO_BUFFER_SIZE / 2)
            .into_iter()
            .flat_map(|s| {
                let s = s.round() as i16;
                [s, s]
            })
            .collect()
    }

    #[test]
    fn test_sine_220_is_a3() {
        let mut pipeline = PitchDetectionPipeline::new(PipelineConfig::default()).unwrap();
        let stereo_in = stereo_sine(220.0, 8000.0);
        let mut stereo_out = vec![0i16; STEREO_BUFFER_SIZE];
        let mut display = RecordingDisplay::default();

        let reading = pipeline
            .process(&stereo_in, &mut stereo_out, &mut display)
            .unwrap();

        // 220 Hz sits between bins 56 (218.75 Hz) and 57; the lower one is closer.
        assert_eq!(reading.bin, 56);
        assert_eq!(reading.detection.text(), "A3");
        assert_eq!(display.shown, vec!["A3".to_string()]);
    }

    #[test]
    fn test_detect_on_full_length_signals() {
        let mut pipeline = PitchDetectionPipeline::new(PipelineConfig::default()).unwrap();

        let cases = [(82.41, "E2"), (110.0, "A2"), (196.0, "G3"), (440.0, "A4"), (659.26, "E5")];
        for (frequency, expected) in cases {
            let reading = pipeline.detect(&sine(frequency, 1.0, FFT_SIZE));
            assert_eq!(reading.detection.text(), expected, "{} Hz", frequency);
            assert!(reading.bin <= FFT_SIZE / 2);
        }
    }

    #[test]
    fn test_silence_reports_no_signal() {
        let mut pipeline = PitchDetectionPipeline::new(PipelineConfig::default()).unwrap();
        let stereo_in = vec![0i16; STEREO_BUFFER_SIZE];
        let mut stereo_out = vec![1i16; STEREO_BUFFER_SIZE];
        let mut shown = Vec::new();
        let mut display = |text: &str| shown.push(text.to_string());

        let reading = pipeline
            .process(&stereo_in, &mut stereo_out, &mut display)
            .unwrap();

        assert_eq!(reading.bin, 0);
        assert_eq!(reading.detection, Detection::NoSignal);
        assert_eq!(shown, vec!["No signal is detected".to_string()]);
        assert!(stereo_out.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_out_of_range_tone_reports_no_signal() {
        let mut pipeline = PitchDetectionPipeline::new(PipelineConfig::default()).unwrap();
        let reading = pipeline.detect(&sine(5000.0, 1.0, FFT_SIZE));
        assert!(reading.frequency > 4000.0);
        assert_eq!(reading.detection, Detection::NoSignal);
    }

    #[test]
    fn test_output_is_mono_pass_through() {
        let mut pipeline = PitchDetectionPipeline::new(PipelineConfig::default()).unwrap();
        let stereo_in: Vec<i16> = (0..STEREO_BUFFER_SIZE / 2)
            .flat_map(|i| {
                let left = (i % 200) as i16 * 10;
                [left, left + 20]
            })
            .collect();
        let mut stereo_out = vec![0i16; STEREO_BUFFER_SIZE];
        let mut display = RecordingDisplay::default();

        pipeline
            .process(&stereo_in, &mut stereo_out, &mut display)
            .unwrap();

        for (inp, out) in stereo_in.chunks_exact(2).zip(stereo_out.chunks_exact(2)) {
            assert_eq!(out[0], inp[0] + 10);
            assert_eq!(out[1], inp[0] + 10);
        }
    }

    #[test]
    fn test_rejects_wrong_block_size() {
        let mut pipeline = PitchDetectionPipeline::new(PipelineConfig::default()).unwrap();
        let stereo_in = vec![0i16; STEREO_BUFFER_SIZE - 2];
        let mut stereo_out = vec![7i16; STEREO_BUFFER_SIZE];
        let mut display = RecordingDisplay::default();

        let result = pipeline.process(&stereo_in, &mut stereo_out, &mut display);

        assert_eq!(
            result,
            Err(ConfigError::BlockSizeMismatch {
                expected: STEREO_BUFFER_SIZE,
                input: STEREO_BUFFER_SIZE - 2,
                output: STEREO_BUFFER_SIZE,
            })
        );
        assert!(display.shown.is_empty());
        assert!(stereo_out.iter().all(|&s| s == 7));
    }

    #[test]
    fn test_invalid_config_refuses_to_start() {
        let config = PipelineConfig {
            fft_size: 3000,
            ..Default::default()
        };
        assert!(matches!(
            PipelineConfig::validate(&config),
            Err(ConfigError::InvalidFftSize { size: 3000 })
        ));
        assert!(PitchDetectionPipeline::new(config).is_err());
    }

    // Known approximation: a dominant bin above N/2 is treated as an artifact
    // and replaced by the strongest bin below N/2.
    #[test]
    fn test_fallback_selects_lower_half_frequency() {
        let axis = FrequencyAxis::new(FFT_SIZE, SAMPLING_RATE_HZ);
        let mut magnitude = vec![0.0; FFT_SIZE];
        magnitude[3000] = 50.0;
        magnitude[113] = 10.0;
        magnitude[56] = 5.0;

        let reading = read_spectrum(&axis, &magnitude);

        assert_eq!(reading.bin, 113);
        assert_eq!(reading.frequency, axis.frequency(113));
        assert_eq!(reading.detection.text(), "A4");
    }

    #[test]
    fn test_blocks_do_not_influence_each_other() {
        let mut pipeline = PitchDetectionPipeline::new(PipelineConfig::default()).unwrap();
        let mut stereo_out = vec![0i16; STEREO_BUFFER_SIZE];
        let mut display = RecordingDisplay::default();

        let a = stereo_sine(220.0, 8000.0);
        let e = stereo_sine(329.63, 8000.0);
        let first = pipeline.process(&a, &mut stereo_out, &mut display).unwrap();
        pipeline.process(&e, &mut stereo_out, &mut display).unwrap();
        let again = pipeline.process(&a, &mut stereo_out, &mut display).unwrap();

        assert_eq!(first, again);
        assert_eq!(display.shown, vec!["A3", "E4", "A3"]);
    }
}
