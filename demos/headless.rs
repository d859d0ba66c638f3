//! # Headless Demo
//!
//! Runs every section preset for a few simulated seconds over the in-memory
//! backend and logs what each frame produced. Useful for checking presets
//! and tuning on machines without a GPU.
//!
//! - **hero**: morphs through every shape in turn
//! - **skills**: clicks and a skill wave over the flow field
//! - **about**: throttled wandering inside the ellipse
//! - **ambient**: floating meshes only
//!
//! Run with: `RUST_LOG=info cargo run --example headless`

use morphe::prelude::*;
use morphe::transition::TransitionStep;

const FRAME: f32 = 1.0 / 60.0;

fn main() -> Result<(), EngineError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let desktop = DeviceSignals::from_user_agent("Mozilla/5.0 (X11; Linux x86_64)", Some(4_294_705_152), 1440);
    let profile = classify_device(&desktop);
    log::info!("classified as {:?}", profile.level);

    run_hero(EngineConfig::hero(&desktop))?;
    run_skills(EngineConfig::skills(&profile))?;
    run_plain(EngineConfig::about(), 120)?;
    run_plain(EngineConfig::ambient(), 120)?;
    Ok(())
}

fn run_hero(config: EngineConfig) -> Result<(), EngineError> {
    let mut engine = Engine::new(config, RecordingBackend::new(1280, 720))?;
    engine.on_visibility(true);

    let mut queue = ShapeId::ALL.iter().copied();
    for _ in 0..60 * 30 {
        if let FrameOutcome::Rendered(stats) = engine.tick(FRAME) {
            if let TransitionStep::Completed(shape) = stats.transition {
                log::info!("hero: settled on {} at frame {}", shape, stats.frame);
                match queue.next() {
                    Some(next) => engine.request_shape(next)?,
                    None => break,
                }
            }
        }
    }
    Ok(())
}

fn run_skills(config: EngineConfig) -> Result<(), EngineError> {
    let mut engine = Engine::new(config, RecordingBackend::new(1280, 720))?;
    engine.on_visibility(true);

    for frame in 0..600u32 {
        match frame {
            30 => engine.on_pointer(PointerEvent::Down { position: Vec2::new(320.0, 240.0), kind: PointerKind::Mouse }),
            31 => engine.on_pointer(PointerEvent::Up),
            90 => {
                let count = engine.default_wave_count();
                let report = engine.skill_wave(Vec2::new(640.0, 360.0), count);
                log::info!("skills: wave spawned {}", report.spawned);
            }
            200 => {
                if let Some(report) = engine.skill_hover(85.0) {
                    log::info!("skills: hover spawned {}", report.spawned);
                }
            }
            _ => {}
        }
        if let FrameOutcome::Rendered(stats) = engine.tick(FRAME) {
            if stats.frame % 120 == 0 {
                log::info!(
                    "skills: frame {} entities {} transients {} links {} pointer links {}",
                    stats.frame,
                    stats.entities,
                    stats.transients,
                    stats.links,
                    stats.pointer_links
                );
            }
        }
    }
    Ok(())
}

fn run_plain(config: EngineConfig, ticks: u32) -> Result<(), EngineError> {
    let name = config.name.clone();
    let mut engine = Engine::new(config, RecordingBackend::new(800, 600))?;
    engine.on_visibility(true);

    let mut rendered = 0;
    for _ in 0..ticks {
        if matches!(engine.tick(FRAME), FrameOutcome::Rendered(_)) {
            rendered += 1;
        }
    }
    log::info!(
        "{}: rendered {} of {} refreshes, {} points, {} meshes",
        name,
        rendered,
        ticks,
        engine.backend().points().len(),
        engine.backend().meshes().len()
    );
    Ok(())
}
