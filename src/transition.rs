//! Timed interpolation between shapes.
//!
//! [`TransitionController`] is a two-state machine. While idle it does
//! nothing; [`request`](TransitionController::request) snapshots the current
//! positions, generates the new targets and enters the transforming state.
//! Each [`step`](TransitionController::step) then eases every entity from its
//! start to its target. Start and target buffers live inside the transforming
//! state, so nothing can read them once the transition has finished.
//!
//! ```ignore
//! let mut ctl = TransitionController::new(2.0);
//! ctl.request(ShapeId::Helix, &mut entities, &params, &mut rng)?;
//! while ctl.is_transforming() {
//!     ctl.step(1.0 / 60.0, &mut entities);
//! }
//! ```

use glam::Vec3;
use rand::Rng;

use crate::easing::Easing;
use crate::entity::Entity;
use crate::error::EngineError;
use crate::shapes::{self, ShapeId, ShapeParams};

/// Default transition length in seconds.
pub const DEFAULT_DURATION: f32 = 2.0;

#[derive(Debug)]
struct Transition {
    shape: ShapeId,
    start: Vec<Vec3>,
    target: Vec<Vec3>,
    elapsed: f32,
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Idle,
    Transforming(Transition),
}

/// Result of advancing the controller by one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionStep {
    /// No transition is running; the force updater owns the entities.
    Idle,
    /// Interpolation weight applied this tick.
    Progress(f32),
    /// The transition reached its target this tick and the controller is idle again.
    Completed(ShapeId),
}

/// Drives entities from one shape to the next.
#[derive(Debug)]
pub struct TransitionController {
    duration: f32,
    easing: Easing,
    state: State,
}

impl TransitionController {
    pub fn new(duration: f32) -> Self {
        Self {
            duration: duration.max(f32::EPSILON),
            easing: Easing::Quint,
            state: State::Idle,
        }
    }

    /// Use a different easing curve. Non-quint curves may overshoot.
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    #[inline]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[inline]
    pub fn easing(&self) -> Easing {
        self.easing
    }

    #[inline]
    pub fn is_transforming(&self) -> bool {
        matches!(self.state, State::Transforming(_))
    }

    /// Shape the running transition is heading to.
    pub fn target_shape(&self) -> Option<ShapeId> {
        match &self.state {
            State::Transforming(t) => Some(t.shape),
            State::Idle => None,
        }
    }

    /// Seconds spent in the running transition.
    pub fn elapsed(&self) -> Option<f32> {
        match &self.state {
            State::Transforming(t) => Some(t.elapsed),
            State::Idle => None,
        }
    }

    /// Positions captured when the running transition began.
    pub fn start_positions(&self) -> Option<&[Vec3]> {
        match &self.state {
            State::Transforming(t) => Some(&t.start),
            State::Idle => None,
        }
    }

    /// Generated targets of the running transition.
    pub fn target_positions(&self) -> Option<&[Vec3]> {
        match &self.state {
            State::Transforming(t) => Some(&t.target),
            State::Idle => None,
        }
    }

    /// Begin a transition to `shape`.
    ///
    /// Fails with [`EngineError::TransitionInProgress`] if one is already
    /// running; the running transition is left exactly as it was. Sizes and
    /// part tags switch to the new shape's immediately.
    pub fn request<R: Rng + ?Sized>(
        &mut self,
        shape: ShapeId,
        entities: &mut [Entity],
        params: &ShapeParams,
        rng: &mut R,
    ) -> Result<(), EngineError> {
        if let State::Transforming(running) = &self.state {
            return Err(EngineError::TransitionInProgress { target: running.shape });
        }

        let total = entities.len();
        let mut start = Vec::with_capacity(total);
        let mut target = Vec::with_capacity(total);
        for (i, entity) in entities.iter_mut().enumerate() {
            let sample = shapes::generate(shape, i, total, params, rng);
            start.push(entity.position);
            target.push(sample.position);
            entity.size = sample.size;
            entity.base_size = sample.size;
            entity.part = sample.part;
            entity.velocity = Vec3::ZERO;
        }

        self.state = State::Transforming(Transition { shape, start, target, elapsed: 0.0 });
        Ok(())
    }

    /// Advance the running transition by `dt` seconds.
    pub fn step(&mut self, dt: f32, entities: &mut [Entity]) -> TransitionStep {
        let State::Transforming(transition) = &mut self.state else {
            return TransitionStep::Idle;
        };

        transition.elapsed += dt.max(0.0);
        if transition.elapsed >= self.duration {
            transition.elapsed = self.duration;
            let shape = transition.shape;
            for (entity, &target) in entities.iter_mut().zip(&transition.target) {
                entity.position = target;
                entity.home = Some(target);
            }
            self.state = State::Idle;
            return TransitionStep::Completed(shape);
        }

        let t = (transition.elapsed / self.duration).clamp(0.0, 1.0);
        let progress = self.easing.apply(t);
        for ((entity, start), target) in entities
            .iter_mut()
            .zip(&transition.start)
            .zip(&transition.target)
        {
            entity.position = start.lerp(*target, progress);
        }
        TransitionStep::Progress(progress)
    }
}

impl Default for TransitionController {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION)
    }
}
