//! # Skills Viewer
//!
//! The flow-field canvas in a window. Click for bursts, hover near entities
//! to link them to the pointer, press `Space` for a skill wave.
//!
//! An optional JSON config path replaces the preset:
//!
//! Run with: `cargo run --example skills --features viewer -- [config.json]`

use morphe::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => EngineConfig::skills(&Profile::high()),
    };
    run(config)?;
    Ok(())
}
