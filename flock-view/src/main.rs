//! Application entry point for the flock viewer.
//!
//! This binary sets up logging and eframe/egui, then hands all
//! interactive logic and rendering to [`Viewer`] from the `viewer` module.

mod viewer;

use flock_core::{Config, SimSettings};
use tracing::info;
use viewer::Viewer;

/// Starts the native eframe application.
///
/// Builds the default flock (20 agents on a 15 x 10 arena, seed 0) and
/// opens a window titled `"Flock"`. Log output is controlled by `RUST_LOG`.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if the default flock is rejected or eframe fails to create the
///   native window or event loop.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let viewer = Viewer::new(SimSettings::default(), Config::default())?;
    info!("starting flock viewer");

    eframe::run_native(
        "Flock",
        eframe::NativeOptions::default(),
        Box::new(|_cc| Ok(Box::new(viewer))),
    )?;
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
