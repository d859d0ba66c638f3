//! Pointer and touch input.
//!
//! The engine only needs a container-relative position, a pressed flag and
//! the press edges. Mouse and single-touch input map onto the same
//! [`PointerEvent`]s; event handlers only write this small state and the next
//! tick consumes it.
//!
//! ```ignore
//! engine.on_pointer(PointerEvent::Move { position: Vec2::new(120.0, 80.0) });
//! engine.on_pointer(PointerEvent::Down { position: Vec2::new(120.0, 80.0), kind: PointerKind::Mouse });
//! ```

use glam::Vec2;

/// Device behind a press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// Container-relative pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Move { position: Vec2 },
    Down { position: Vec2, kind: PointerKind },
    Up,
    /// Pointer left the container; also releases any press.
    Leave,
}

/// Pointer state between ticks.
#[derive(Debug, Clone, Default)]
pub struct Pointer {
    position: Option<Vec2>,
    pressed: bool,
    /// Press edges since the last frame, oldest first.
    presses: Vec<(Vec2, PointerKind)>,
    /// Movement accumulated while pressed since the last frame.
    drag: Vec2,
    active_touch: Option<u64>,
}

impl Pointer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Move { position } => {
                if self.pressed {
                    if let Some(last) = self.position {
                        self.drag += position - last;
                    }
                }
                self.position = Some(position);
            }
            PointerEvent::Down { position, kind } => {
                self.position = Some(position);
                self.pressed = true;
                self.presses.push((position, kind));
            }
            PointerEvent::Up => {
                self.pressed = false;
                self.active_touch = None;
            }
            PointerEvent::Leave => {
                self.position = None;
                self.pressed = false;
                self.active_touch = None;
            }
        }
    }

    // ========== Queries ==========

    /// Position in container pixels, `None` when the pointer is outside.
    #[inline]
    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Press edges since the last call.
    pub fn take_presses(&mut self) -> Vec<(Vec2, PointerKind)> {
        std::mem::take(&mut self.presses)
    }

    /// Drag movement since the last call.
    pub fn take_drag(&mut self) -> Vec2 {
        std::mem::take(&mut self.drag)
    }

    /// Forget press edges and drag that no frame has consumed yet.
    pub fn discard_pending(&mut self) {
        self.presses.clear();
        self.drag = Vec2::ZERO;
    }
}

#[cfg(feature = "viewer")]
mod winit_events {
    use super::*;
    use winit::event::{ElementState, MouseButton, TouchPhase, WindowEvent};

    impl Pointer {
        /// Translate a winit window event. Returns `true` if it was a pointer event.
        pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
            match event {
                WindowEvent::CursorMoved { position, .. } => {
                    let position = Vec2::new(position.x as f32, position.y as f32);
                    self.handle(PointerEvent::Move { position });
                }
                WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => match state {
                    ElementState::Pressed => {
                        let position = self.position.unwrap_or(Vec2::ZERO);
                        self.handle(PointerEvent::Down { position, kind: PointerKind::Mouse });
                    }
                    ElementState::Released => self.handle(PointerEvent::Up),
                },
                WindowEvent::CursorLeft { .. } => self.handle(PointerEvent::Leave),
                WindowEvent::Touch(touch) => {
                    // single touch only: the first finger down owns the pointer
                    if self.active_touch.is_some_and(|id| id != touch.id) {
                        return true;
                    }
                    let position = Vec2::new(touch.location.x as f32, touch.location.y as f32);
                    match touch.phase {
                        TouchPhase::Started => {
                            self.active_touch = Some(touch.id);
                            self.handle(PointerEvent::Down { position, kind: PointerKind::Touch });
                        }
                        TouchPhase::Moved => self.handle(PointerEvent::Move { position }),
                        TouchPhase::Ended | TouchPhase::Cancelled => self.handle(PointerEvent::Up),
                    }
                }
                _ => return false,
            }
            true
        }
    }
}
