//! Tuner window
//!
//! Shows the note named by the pipeline for the latest audio block, the
//! analysis resolution, and an input device selector.

use eframe::egui;
use std::time::{Duration, Instant};

use crate::audio::{get_default_input_device_name, get_input_devices, AudioCapture, SharedDisplay};
use crate::config::{PipelineConfig, NO_SIGNAL_MESSAGE};

pub struct TunerApp {
    display: SharedDisplay,
    current_text: String,
    audio_capture: Option<AudioCapture>,
    available_devices: Vec<(String, cpal::Device)>,
    current_device_name: String,
    last_device_refresh: Instant,
    device_refresh_interval: Duration,
}

impl TunerApp {
    pub fn new(display: SharedDisplay) -> Self {
        let available_devices = get_input_devices().unwrap_or_default();
        let current_device_name =
            get_default_input_device_name().unwrap_or_else(|_| "Default".to_string());

        Self {
            display,
            current_text: NO_SIGNAL_MESSAGE.to_string(),
            audio_capture: None,
            available_devices,
            current_device_name,
            last_device_refresh: Instant::now(),
            device_refresh_interval: Duration::from_secs(2),
        }
    }

    pub fn set_audio_capture(&mut self, audio_capture: AudioCapture) {
        self.audio_capture = Some(audio_capture);
    }

    pub fn switch_device(&mut self, device_name: String, device: cpal::Device) {
        // Drop the old stream first so only one callback writes the display.
        self.audio_capture = None;
        self.current_device_name = device_name;

        match AudioCapture::new_with_device(self.display.clone(), device) {
            Ok(capture) => self.audio_capture = Some(capture),
            Err(err) => log::error!("Could not open {}: {:#}", self.current_device_name, err),
        }
    }

    fn refresh_audio_devices(&mut self) {
        if self.last_device_refresh.elapsed() < self.device_refresh_interval {
            return;
        }
        self.last_device_refresh = Instant::now();

        let Ok(devices) = get_input_devices() else {
            return;
        };

        let unchanged = devices.len() == self.available_devices.len()
            && devices.iter().all(|(name, _)| {
                self.available_devices
                    .iter()
                    .any(|(existing, _)| existing == name)
            });
        if unchanged {
            return;
        }

        log::info!("Audio device list changed, {} inputs available", devices.len());
        self.available_devices = devices;

        if !self
            .available_devices
            .iter()
            .any(|(name, _)| name == &self.current_device_name)
        {
            if let Ok(default_name) = get_default_input_device_name() {
                log::warn!(
                    "{} is gone, default input is now {}",
                    self.current_device_name,
                    default_name
                );
                self.current_device_name = default_name;
            }
        }
    }

    fn analysis_config(&self) -> Option<&PipelineConfig> {
        self.audio_capture.as_ref().map(|capture| capture.config())
    }

    fn draw_note(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            if self.current_text == NO_SIGNAL_MESSAGE {
                ui.label(
                    egui::RichText::new(&self.current_text)
                        .size(18.0)
                        .color(egui::Color32::from_rgb(142, 142, 147)),
                );
            } else {
                ui.label(
                    egui::RichText::new(&self.current_text)
                        .size(48.0)
                        .color(egui::Color32::WHITE)
                        .strong(),
                );
            }

            let detail = match self.analysis_config() {
                Some(config) => format!(
                    "{} Hz · {} pt FFT · {:.2} Hz/bin",
                    config.sample_rate,
                    config.fft_size,
                    config.bin_width()
                ),
                None => "No input stream".to_string(),
            };
            ui.label(
                egui::RichText::new(detail)
                    .size(11.0)
                    .color(egui::Color32::from_rgb(142, 142, 147)),
            );
        });
    }

    fn draw_device_selector(&mut self, ui: &mut egui::Ui) {
        let mut selected = None;

        egui::ComboBox::from_id_salt("device_selector")
            .selected_text(&self.current_device_name)
            .width(200.0)
            .show_ui(ui, |ui| {
                for (device_name, device) in &self.available_devices {
                    let is_current = *device_name == self.current_device_name;
                    if ui.selectable_label(is_current, device_name).clicked() && !is_current {
                        selected = Some((device_name.clone(), device.clone()));
                    }
                }
            });

        if let Some((device_name, device)) = selected {
            self.switch_device(device_name, device);
        }
    }
}

impl eframe::App for TunerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.refresh_audio_devices();
        if let Some(text) = self.display.current_text() {
            self.current_text = text;
        }

        ctx.request_repaint_after(Duration::from_millis(50));

        egui::CentralPanel::default()
            .frame(egui::Frame {
                fill: egui::Color32::from_rgb(31, 31, 31),
                inner_margin: egui::Margin::symmetric(0, 16),
                ..Default::default()
            })
            .show(ctx, |ui| {
                ui.with_layout(egui::Layout::top_down(egui::Align::Center), |ui| {
                    ui.add_space(16.0);
                    self.draw_note(ui);
                    ui.add_space(24.0);
                    self.draw_device_selector(ui);
                });
            });
    }
}
