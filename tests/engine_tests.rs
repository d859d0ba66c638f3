//! Integration tests for the render driver.
//!
//! Every test drives a full [`Engine`] over a [`RecordingBackend`] and checks
//! what reaches the backend or the entity set after a number of ticks.

use std::f32::consts::TAU;

use morphe::easing::Easing;
use morphe::forces::{Boundary, EllipseBounds};
use morphe::prelude::*;
use morphe::transition::TransitionStep;

const FRAME: f32 = 1.0 / 60.0;

// ============================================================================
// Helpers
// ============================================================================

/// Hero config with no initial shape and an uncapped frame rate.
fn hero_config() -> EngineConfig {
    let desktop = DeviceSignals { is_mobile: false, heap_size_limit: None, viewport_width: 1440 };
    EngineConfig {
        initial_shape: None,
        profile: Profile { enable_mouse_glow: false, enable_particle_glow: false, ..Profile::high() },
        ..EngineConfig::hero(&desktop)
    }
}

fn running(config: EngineConfig) -> Engine<RecordingBackend> {
    let mut engine = Engine::new(config, RecordingBackend::new(1280, 720)).unwrap();
    engine.on_visibility(true);
    engine
}

fn rendered(outcome: FrameOutcome) -> FrameStats {
    match outcome {
        FrameOutcome::Rendered(stats) => stats,
        other => panic!("expected a rendered frame, got {:?}", other),
    }
}

/// Tick until the running transition completes. Returns the completing frame's stats.
fn finish_transition(engine: &mut Engine<RecordingBackend>) -> FrameStats {
    for _ in 0..100 {
        let stats = rendered(engine.tick(0.1));
        if matches!(stats.transition, TransitionStep::Completed(_)) {
            return stats;
        }
    }
    panic!("transition never completed");
}

// ============================================================================
// Transitions
// ============================================================================

#[test]
fn test_transition_lands_on_helix() {
    let mut engine = running(hero_config());
    engine.request_shape(ShapeId::Helix).unwrap();
    assert!(engine.is_transforming());

    let stats = finish_transition(&mut engine);
    assert_eq!(stats.transition, TransitionStep::Completed(ShapeId::Helix));
    assert_eq!(engine.current_shape(), Some(ShapeId::Helix));
    assert!(!engine.is_transforming());

    let params = &engine.config().shape;
    let n = engine.persistent_count();
    for (i, e) in engine.entities().iter().enumerate() {
        let t = i as f32 / n as f32;
        let angle = t * TAU * params.helix_turns;
        let radius = params.helix_radius * params.scale;
        let y = (t * params.helix_height - params.helix_height * 0.5) * params.scale + params.y_offset;
        let expected = Vec3::new(radius * angle.cos(), y, radius * angle.sin());
        assert!(
            (e.position - expected).length() < 1e-3,
            "entity {} at {:?}, expected {:?}",
            i,
            e.position,
            expected
        );
    }
}

#[test]
fn test_overlapping_request_is_rejected() {
    let mut engine = running(hero_config());
    engine.request_shape(ShapeId::Sphere).unwrap();
    rendered(engine.tick(0.1));

    let err = engine.request_shape(ShapeId::Cube).unwrap_err();
    assert!(matches!(err, EngineError::TransitionInProgress { target: ShapeId::Sphere }));
    assert_eq!(engine.transition().target_shape(), Some(ShapeId::Sphere));

    finish_transition(&mut engine);
    assert_eq!(engine.current_shape(), Some(ShapeId::Sphere));
    engine.request_shape(ShapeId::Cube).unwrap();
}

#[test]
fn test_configured_easing_drives_progress() {
    let config = EngineConfig { transition_easing: Easing::Cubic, ..hero_config() };
    let mut engine = running(config);
    assert_eq!(engine.transition().easing(), Easing::Cubic);

    engine.request_shape(ShapeId::Cube).unwrap();
    let stats = rendered(engine.tick(0.1));
    let t = 0.1 / engine.config().transition_duration;
    match stats.transition {
        TransitionStep::Progress(p) => assert!((p - Easing::Cubic.apply(t)).abs() < 1e-6),
        other => panic!("expected progress, got {:?}", other),
    }
}

#[test]
fn test_unknown_shape_leaves_engine_unchanged() {
    let mut engine = running(hero_config());
    let before: Vec<Vec3> = engine.entities().iter().map(|e| e.position).collect();

    let err = engine.request_shape_named("torus").unwrap_err();
    assert!(matches!(err, EngineError::UnknownShape(ref name) if name == "torus"));
    assert!(!engine.is_transforming());
    assert_eq!(engine.current_shape(), None);
    let after: Vec<Vec3> = engine.entities().iter().map(|e| e.position).collect();
    assert_eq!(before, after);

    engine.request_shape_named("Helix").unwrap();
    assert_eq!(engine.transition().target_shape(), Some(ShapeId::Helix));
}

#[test]
fn test_zero_delta_freezes_transition() {
    let mut engine = running(hero_config());
    engine.request_shape(ShapeId::Cube).unwrap();
    let start: Vec<Vec3> = engine.entities().iter().map(|e| e.position).collect();

    for _ in 0..10 {
        let stats = rendered(engine.tick(0.0));
        assert_eq!(stats.transition, TransitionStep::Progress(0.0));
    }
    let now: Vec<Vec3> = engine.entities().iter().map(|e| e.position).collect();
    assert_eq!(start, now);
    assert!(engine.is_transforming());
}

#[test]
fn test_initial_shape_starts_on_first_visibility() {
    let desktop = DeviceSignals { is_mobile: false, heap_size_limit: None, viewport_width: 1440 };
    let mut engine = Engine::new(EngineConfig::hero(&desktop), RecordingBackend::new(1280, 720)).unwrap();
    assert!(!engine.is_transforming());

    engine.on_visibility(true);
    assert_eq!(engine.transition().target_shape(), Some(ShapeId::Ribbon));

    // a second visibility signal must not restart anything
    engine.on_visibility(true);
    assert!(engine.is_running());
}

// ============================================================================
// Transients
// ============================================================================

#[test]
fn test_burst_expires_after_lifespan() {
    let mut engine = running(EngineConfig::skills(&Profile::high()));
    engine.on_pointer(PointerEvent::Down { position: Vec2::new(300.0, 200.0), kind: PointerKind::Mouse });
    engine.on_pointer(PointerEvent::Up);

    // decay 0.01 per tick: 100 ticks of life, counting the spawn tick
    for _ in 0..99 {
        rendered(engine.tick(FRAME));
    }
    assert_eq!(engine.transient_count(), 15);

    let stats = rendered(engine.tick(FRAME));
    assert_eq!(stats.pruned, 15);
    assert_eq!(engine.transient_count(), 0);
    assert_eq!(engine.entities().len(), engine.persistent_count());
}

#[test]
fn test_transient_cap_evicts_oldest() {
    let mut engine = running(EngineConfig::skills(&Profile::high()));
    let origin = Vec2::new(400.0, 300.0);

    let first = engine.skill_wave(origin, 150);
    assert_eq!(first.spawned, 150);
    assert_eq!(first.evicted, 0);

    let second = engine.skill_wave(origin, 150);
    assert_eq!(second.spawned, 150);
    assert_eq!(second.evicted, 100);
    assert_eq!(engine.transient_count(), 200);
    assert_eq!(engine.entities().len(), engine.persistent_count() + 200);
}

#[test]
fn test_skill_hover_cooldown() {
    let mut engine = running(EngineConfig::skills(&Profile::high()));

    let report = engine.skill_hover(80.0).unwrap();
    assert_eq!(report.spawned, 4);
    assert!(engine.skill_hover(80.0).is_none());

    rendered(engine.tick(0.3));
    assert!(engine.skill_hover(80.0).is_none());

    rendered(engine.tick(0.3));
    assert!(engine.skill_hover(80.0).is_some());
}

#[test]
fn test_presses_ignored_without_pointer_bursts() {
    let mut engine = running(EngineConfig::about());
    engine.on_pointer(PointerEvent::Down { position: Vec2::new(100.0, 100.0), kind: PointerKind::Touch });
    let stats = rendered(engine.tick(0.05));
    assert_eq!(stats.spawned, 0);
    assert_eq!(engine.transient_count(), 0);
}

#[test]
fn test_presses_while_dormant_are_dropped() {
    let mut engine = Engine::new(EngineConfig::skills(&Profile::high()), RecordingBackend::new(1280, 720)).unwrap();
    for _ in 0..3 {
        engine.on_pointer(PointerEvent::Down { position: Vec2::new(300.0, 200.0), kind: PointerKind::Mouse });
        engine.on_pointer(PointerEvent::Up);
    }
    assert_eq!(engine.tick(FRAME), FrameOutcome::Dormant);

    engine.on_visibility(true);
    let stats = rendered(engine.tick(FRAME));
    assert_eq!(stats.spawned, 0);
    assert_eq!(engine.transient_count(), 0);

    engine.on_pointer(PointerEvent::Down { position: Vec2::new(300.0, 200.0), kind: PointerKind::Mouse });
    let stats = rendered(engine.tick(FRAME));
    assert_eq!(stats.spawned, 15);
}

// ============================================================================
// Frame loop
// ============================================================================

#[test]
fn test_draw_failure_keeps_ticking() {
    let mut engine = running(EngineConfig::skills(&Profile::high()));
    engine.backend_mut().set_failing(true);

    let stats = rendered(engine.tick(FRAME));
    assert!(!stats.drawn);
    let stats = rendered(engine.tick(FRAME));
    assert!(!stats.drawn);
    assert_eq!(stats.frame, 2);
    assert_eq!(engine.backend().draws(), 0);

    engine.backend_mut().set_failing(false);
    let stats = rendered(engine.tick(FRAME));
    assert!(stats.drawn);
    assert_eq!(engine.backend().draws(), 1);
}

#[test]
fn test_about_preset_throttles_to_interval() {
    let mut engine = running(EngineConfig::about());
    assert_eq!(engine.tick(0.016), FrameOutcome::Throttled);
    assert_eq!(engine.tick(0.016), FrameOutcome::Throttled);

    let stats = rendered(engine.tick(0.016));
    assert!((stats.dt - 0.048).abs() < 1e-4);
    assert_eq!(stats.frame, 1);
    assert_eq!(engine.backend().draws(), 1);
}

#[test]
fn test_dormant_engine_never_draws() {
    let mut engine = Engine::new(EngineConfig::about(), RecordingBackend::new(800, 600)).unwrap();
    for _ in 0..5 {
        assert_eq!(engine.tick(0.1), FrameOutcome::Dormant);
    }
    assert_eq!(engine.backend().draws(), 0);
    assert!(engine.backend().points().is_empty());
}

#[test]
fn test_resize_updates_camera_uniform() {
    let mut engine = running(EngineConfig::skills(&Profile::high()));
    engine.on_resize(1024, 768);
    assert_eq!(engine.viewport(), Viewport::new(1024, 768));

    engine.on_resize(0, 0);
    assert_eq!(engine.viewport(), Viewport::new(1024, 768));

    rendered(engine.tick(FRAME));
    let uniform = engine.backend().last_uniform().unwrap();
    assert_eq!(uniform.viewport, [1024.0, 768.0]);
}

#[test]
fn test_points_uploaded_per_entity() {
    let mut engine = running(hero_config());
    rendered(engine.tick(FRAME));
    assert_eq!(engine.backend().points().len(), engine.entities().len());
    assert!(engine.backend().links().is_empty());
    assert!(engine.backend().meshes().is_empty());
}

#[test]
fn test_ambient_meshes_reach_backend() {
    let mut engine = running(EngineConfig::ambient());
    // conservative profile caps at one frame per 20 ms
    rendered(engine.tick(0.05));

    let count = engine.ambient().unwrap().instances().len();
    assert_eq!(count, 25);
    assert_eq!(engine.backend().meshes().len(), count);
    assert!(engine.backend().points().is_empty());
}

#[test]
fn test_config_from_json_drives_engine() {
    let config = EngineConfig::from_json(r#"{ "name": "tiny", "particle_count": 10 }"#).unwrap();
    let engine = Engine::new(config, RecordingBackend::new(640, 480)).unwrap();
    assert_eq!(engine.persistent_count(), 10);
    assert_eq!(engine.config().name, "tiny");
}

// ============================================================================
// Glow
// ============================================================================

/// Entities above the halo threshold, counted on the state just drawn.
fn halo_count(engine: &Engine<RecordingBackend>) -> usize {
    engine.entities().iter().filter(|e| e.size > 2.0).count()
}

#[test]
fn test_glows_add_halos_and_pointer_sprite() {
    let mut engine = running(EngineConfig::skills(&Profile::high()));
    assert!(engine.profile().enable_particle_glow && engine.profile().enable_mouse_glow);

    // no pointer yet: halos only
    rendered(engine.tick(FRAME));
    let halos = halo_count(&engine);
    assert!(halos > 0);
    assert_eq!(engine.backend().points().len(), engine.entities().len() + halos);
    for (point, e) in engine.backend().points().iter().zip(engine.entities().iter().filter(|e| e.size > 2.0)) {
        assert_eq!(point.size, e.size * 2.0);
        assert_eq!(point.color[3], 0.2);
    }

    engine.on_pointer(PointerEvent::Move { position: Vec2::new(200.0, 150.0) });
    rendered(engine.tick(FRAME));
    let points = engine.backend().points();
    assert_eq!(points.len(), engine.entities().len() + halo_count(&engine) + 1);
    let glow = points.last().unwrap();
    assert!((Vec3::from_array(glow.position) - Vec3::new(200.0, 150.0, 0.0)).length() < 1e-3);
    assert_eq!(glow.size, 20.0);
    assert_eq!(glow.color, [1.0, 1.0, 1.0, 0.4]);

    engine.on_pointer(PointerEvent::Down { position: Vec2::new(200.0, 150.0), kind: PointerKind::Mouse });
    rendered(engine.tick(FRAME));
    assert_eq!(engine.backend().points().last().unwrap().size, 30.0);
}

#[test]
fn test_glows_disabled_upload_bare_points() {
    let profile = Profile { enable_mouse_glow: false, enable_particle_glow: false, ..Profile::high() };
    let mut engine = running(EngineConfig::skills(&profile));
    engine.on_pointer(PointerEvent::Move { position: Vec2::new(200.0, 150.0) });
    rendered(engine.tick(FRAME));
    assert!(halo_count(&engine) > 0);
    assert_eq!(engine.backend().points().len(), engine.entities().len());
}

// ============================================================================
// Resize
// ============================================================================

#[test]
fn test_resize_refits_wrap_and_flow() {
    let mut engine = running(EngineConfig::skills(&Profile::high()));
    assert!(matches!(*engine.boundary(), Boundary::Wrap { max, .. } if max == Vec2::new(1280.0, 720.0)));
    assert_eq!(engine.flow().unwrap().dimensions(), (32, 18));

    engine.on_resize(1600, 900);
    assert!(matches!(*engine.boundary(), Boundary::Wrap { min, max, buffer }
        if min == Vec2::ZERO && max == Vec2::new(1600.0, 900.0) && buffer == 10.0));
    assert_eq!(engine.flow().unwrap().dimensions(), (40, 23));

    for _ in 0..30 {
        rendered(engine.tick(FRAME));
    }
    for e in engine.entities() {
        assert!(e.position.x >= -10.0 && e.position.x <= 1610.0, "x out of wrap: {}", e.position.x);
        assert!(e.position.y >= -10.0 && e.position.y <= 910.0, "y out of wrap: {}", e.position.y);
    }
}

#[test]
fn test_resize_refits_ellipse() {
    let mut engine = running(EngineConfig::about());
    engine.on_resize(1000, 500);
    let Boundary::Ellipse(bounds) = *engine.boundary() else {
        panic!("about preset should bound with an ellipse");
    };
    assert_eq!(bounds.center, Vec2::new(500.0, 250.0));
    assert!((bounds.radii - Vec2::new(450.0, 240.0)).length() < 1e-3);
    assert_eq!(bounds.pulse_speed, EllipseBounds::default().pulse_speed);
}
