//! Audio input capture and device management
//!
//! Opens an input stream, converts whatever the device delivers into
//! interleaved stereo `i16` blocks, and runs the pitch detection pipeline on
//! each full block inside the stream callback.

use anyhow::Result;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Sample, SampleFormat, Stream, StreamConfig, SupportedStreamConfig};
use std::sync::{Arc, Mutex};

use crate::config::{PipelineConfig, NO_SIGNAL_MESSAGE, SAMPLING_RATE_HZ};
use crate::pipeline::{NoteDisplay, PitchDetectionPipeline};

/// Latest note text, written by the audio callback and read by the GUI.
#[derive(Clone)]
pub struct SharedDisplay {
    text: Arc<Mutex<String>>,
}

impl SharedDisplay {
    pub fn new() -> Self {
        Self {
            text: Arc::new(Mutex::new(NO_SIGNAL_MESSAGE.to_string())),
        }
    }

    pub fn current_text(&self) -> Option<String> {
        self.text.lock().ok().map(|text| text.clone())
    }
}

impl Default for SharedDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteDisplay for SharedDisplay {
    fn display_text(&mut self, text: &str) {
        // Never block the audio thread; a missed update is replaced next block.
        if let Ok(mut current) = self.text.try_lock() {
            current.clear();
            current.push_str(text);
        }
    }
}

/// Collects callback data into fixed-size stereo blocks for the pipeline.
struct BlockAssembler<D> {
    pipeline: PitchDetectionPipeline,
    block: Vec<i16>,
    output: Vec<i16>,
    display: D,
}

impl<D: NoteDisplay> BlockAssembler<D> {
    fn new(pipeline: PitchDetectionPipeline, display: D) -> Self {
        let block_size = pipeline.config().stereo_block_size;
        Self {
            pipeline,
            block: Vec::with_capacity(block_size),
            output: vec![0; block_size],
            display,
        }
    }

    /// Mono input is duplicated to both channels; channels past the second are dropped.
    fn push_interleaved<T>(&mut self, data: &[T], channels: usize)
    where
        T: Sample,
        i16: cpal::FromSample<T>,
    {
        for frame in data.chunks_exact(channels.max(1)) {
            let left = i16::from_sample(frame[0]);
            let right = frame.get(1).map_or(left, |&sample| i16::from_sample(sample));
            self.push_frame(left, right);
        }
    }

    fn push_frame(&mut self, left: i16, right: i16) {
        self.block.push(left);
        self.block.push(right);

        if self.block.len() >= self.pipeline.config().stereo_block_size {
            if let Err(err) = self
                .pipeline
                .process(&self.block, &mut self.output, &mut self.display)
            {
                log::error!("Dropping audio block: {}", err);
            }
            self.block.clear();
        }
    }
}

pub struct AudioCapture {
    _stream: Stream,
    config: PipelineConfig,
}

impl AudioCapture {
    pub fn new(display: SharedDisplay) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| anyhow::anyhow!("No input device available"))?;

        Self::new_with_device(display, device)
    }

    pub fn new_with_device(display: SharedDisplay, device: Device) -> Result<Self> {
        let supported = preferred_input_config(&device)?;
        let sample_rate = supported.sample_rate().0;

        log::info!("Input device: {}", device.name()?);
        log::info!("Input config: {:?}", supported);
        if sample_rate != SAMPLING_RATE_HZ {
            log::warn!(
                "Device cannot capture at {} Hz, analysing at {} Hz instead",
                SAMPLING_RATE_HZ,
                sample_rate
            );
        }

        let config = PipelineConfig::default().with_sample_rate(sample_rate);
        let assembler = BlockAssembler::new(PitchDetectionPipeline::new(config)?, display);
        let stream_config: StreamConfig = supported.config();

        let stream = match supported.sample_format() {
            SampleFormat::I8 => Self::create_stream::<i8>(&device, &stream_config, assembler)?,
            SampleFormat::I16 => Self::create_stream::<i16>(&device, &stream_config, assembler)?,
            SampleFormat::I32 => Self::create_stream::<i32>(&device, &stream_config, assembler)?,
            SampleFormat::I64 => Self::create_stream::<i64>(&device, &stream_config, assembler)?,
            SampleFormat::U8 => Self::create_stream::<u8>(&device, &stream_config, assembler)?,
            SampleFormat::U16 => Self::create_stream::<u16>(&device, &stream_config, assembler)?,
            SampleFormat::U32 => Self::create_stream::<u32>(&device, &stream_config, assembler)?,
            SampleFormat::U64 => Self::create_stream::<u64>(&device, &stream_config, assembler)?,
            SampleFormat::F32 => Self::create_stream::<f32>(&device, &stream_config, assembler)?,
            SampleFormat::F64 => Self::create_stream::<f64>(&device, &stream_config, assembler)?,
            format => return Err(anyhow::anyhow!("Unsupported sample format {:?}", format)),
        };

        stream.play()?;

        Ok(Self {
            _stream: stream,
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn create_stream<T>(
        device: &Device,
        config: &StreamConfig,
        mut assembler: BlockAssembler<SharedDisplay>,
    ) -> Result<Stream>
    where
        T: Sample + cpal::SizedSample + Send + 'static,
        i16: cpal::FromSample<T>,
    {
        let channels = config.channels as usize;
        let stream = device.build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                // The pass-through block is produced but not played back.
                assembler.push_interleaved(data, channels);
            },
            |err| log::error!("Audio stream error: {}", err),
            None,
        )?;

        Ok(stream)
    }
}

/// Picks a config that runs at the calibrated rate, preferring stereo.
/// Falls back to the device default when no range covers that rate.
fn preferred_input_config(device: &Device) -> Result<SupportedStreamConfig> {
    let target = cpal::SampleRate(SAMPLING_RATE_HZ);
    let matching = device
        .supported_input_configs()?
        .filter(|c| c.min_sample_rate() <= target && target <= c.max_sample_rate())
        .max_by_key(|c| c.channels().min(2));

    match matching {
        Some(range) => Ok(range.with_sample_rate(target)),
        None => Ok(device.default_input_config()?),
    }
}

pub fn get_input_devices() -> Result<Vec<(String, cpal::Device)>> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    for device in host.input_devices()? {
        if let Ok(name) = device.name() {
            devices.push((name, device));
        }
    }

    Ok(devices)
}

pub fn get_default_input_device_name() -> Result<String> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow::anyhow!("No default input device"))?;
    Ok(device.name()?)
}
