//! Application entry point for Note Tuner
//!
//! Sets up logging and the eframe window, starts audio capture on the default
//! input device, and hands both to the TunerApp.

use eframe::egui;

use note_tuner::audio::{AudioCapture, SharedDisplay};
use note_tuner::tuner::TunerApp;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([320.0, 180.0])
            .with_resizable(false)
            .with_always_on_top()
            .with_title("Note Tuner"),
        ..Default::default()
    };

    let display = SharedDisplay::new();
    let audio_capture = AudioCapture::new(display.clone())?;

    eframe::run_native(
        "Note Tuner",
        options,
        Box::new(|_cc| {
            let mut app = TunerApp::new(display);
            app.set_audio_capture(audio_capture);
            Ok(Box::new(app))
        }),
    )
    .map_err(|err| anyhow::anyhow!("GUI error: {}", err))?;

    Ok(())
}
