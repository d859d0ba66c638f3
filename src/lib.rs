//! # morphe
//!
//! A morphing particle engine for decorative page animations: a fixed budget
//! of point entities flows between procedurally generated shapes, drifts
//! through flow fields, reacts to the pointer, bursts on click and draws
//! proximity links, all driven by one tick per display refresh.
//!
//! The engine is backend-agnostic. It packs GPU-ready records and hands them
//! to a [`RenderBackend`]; the `viewer` feature adds a wgpu/winit window that
//! implements one.
//!
//! ## Quick Start
//!
//! ```ignore
//! use morphe::prelude::*;
//!
//! let signals = DeviceSignals::from_user_agent(user_agent, heap_limit, 1440);
//! let mut engine = Engine::new(EngineConfig::hero(&signals), backend)?;
//! engine.on_visibility(true);
//!
//! engine.request_shape(ShapeId::Helix)?;
//! engine.request_shape_named("sphere").unwrap_err(); // still morphing
//!
//! let mut wall = WallClock::new();
//! loop {
//!     engine.tick(wall.lap());
//! }
//! ```
//!
//! ## Components
//!
//! | Module | Role |
//! |--------|------|
//! | [`shapes`] | target positions and sizes for every shape |
//! | [`transition`] | eased interpolation between shapes |
//! | [`profile`] | device signals to performance limits |
//! | [`forces`] | idle motion, pointer force, damping, boundaries |
//! | [`flow`] | coarse angle grid for flow-field drift |
//! | [`burst`] | transient entities with life decay and a cap |
//! | [`spatial`], [`connections`] | grid-accelerated proximity links |
//! | [`ambient`] | floating mesh instances |
//! | [`engine`] | the render driver and command surface |
//!
//! ## Tick order
//!
//! Within a rendered tick, input is consumed first, then either the
//! transition or the idle forces move the entities, then expired transients
//! are pruned, then the proximity graph runs, then the frame is drawn. The
//! order never changes.

pub mod ambient;
pub mod backend;
pub mod burst;
pub mod camera;
pub mod config;
pub mod connections;
pub mod easing;
pub mod engine;
pub mod entity;
pub mod error;
pub mod flow;
pub mod forces;
pub mod palette;
pub mod pointer;
pub mod profile;
pub mod shaders;
pub mod shapes;
pub mod spatial;
pub mod time;
pub mod transition;

#[cfg(feature = "viewer")]
pub mod gpu;
#[cfg(feature = "viewer")]
pub mod window;

pub use backend::{RecordingBackend, RenderBackend, Viewport};
pub use config::EngineConfig;
pub use engine::{Engine, FrameOutcome, FrameStats};
pub use error::{BackendError, EngineError};
pub use glam::{Vec2, Vec3};
pub use shapes::ShapeId;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use morphe::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backend::{RecordingBackend, RenderBackend, Viewport};
    pub use crate::config::EngineConfig;
    pub use crate::engine::{Engine, FrameOutcome, FrameStats};
    pub use crate::error::{BackendError, EngineError};
    pub use crate::pointer::{PointerEvent, PointerKind};
    pub use crate::profile::{classify_device, DeviceSignals, PerformanceLevel, Profile};
    pub use crate::shapes::{ShapeId, ShapeParams};
    pub use crate::time::WallClock;
    pub use crate::{Vec2, Vec3};
    #[cfg(feature = "viewer")]
    pub use crate::window::run;
}
