//! Note Tuner core
//!
//! Names the dominant note of each block of interleaved stereo audio using a
//! fixed-size FFT, a peak search that ignores the upper half of the spectrum,
//! and a 440 Hz equal-tempered note mapping. The `audio` and `tuner` modules
//! are the capture host and the display built on top of it.

pub mod audio;
pub mod config;
pub mod convert;
pub mod error;
pub mod peak;
pub mod pipeline;
pub mod pitch;
pub mod spectrum;
pub mod tuner;

pub use config::PipelineConfig;
pub use error::ConfigError;
pub use pipeline::{NoteDisplay, PitchDetectionPipeline, Reading};
pub use pitch::{frequency_to_note, Detection, NoteLabel};
