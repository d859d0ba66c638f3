//! # Hero Viewer
//!
//! The 3D morphing point cloud in a window. Press `1`–`7` to pick a shape,
//! `P` to cycle palettes, drag to orbit.
//!
//! Run with: `cargo run --example hero --features viewer`

use morphe::prelude::*;

fn main() -> Result<(), EngineError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let signals = DeviceSignals::from_user_agent("desktop", None, 1280);
    run(EngineConfig::hero(&signals))
}
