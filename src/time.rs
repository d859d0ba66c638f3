//! Frame timing.
//!
//! The engine never reads a global clock. Hosts measure the time between
//! display refreshes (with [`WallClock`] or their own timer) and feed it to
//! [`FrameClock::advance`], which applies the frame-rate cap and clamps the
//! simulation delta.
//!
//! # Example
//!
//! ```ignore
//! use morphe::time::{FrameClock, WallClock};
//!
//! let mut wall = WallClock::new();
//! let mut clock = FrameClock::new(16);
//!
//! // once per display refresh:
//! if let Some(dt) = clock.advance(wall.lap()) {
//!     println!("render, dt = {dt:.4}s, sim time {:.2}s", clock.elapsed());
//! }
//! ```

use std::time::Instant;

/// Largest simulation step a single frame may take, in seconds.
pub const MAX_DELTA: f32 = 0.1;

/// Simulation clock with a frame-rate cap.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Simulation seconds since start.
    elapsed: f32,
    /// Real milliseconds since start, including throttled refreshes.
    wall_ms: f64,
    /// Real seconds accumulated since the last rendered frame.
    pending: f32,
    min_frame_interval_ms: u32,
    frame_count: u64,
    fps: f32,
    fps_frames: u64,
    fps_window: f32,
}

impl FrameClock {
    /// A clock rendering at most once per `min_frame_interval_ms` (0 = every refresh).
    pub fn new(min_frame_interval_ms: u32) -> Self {
        Self {
            elapsed: 0.0,
            wall_ms: 0.0,
            pending: 0.0,
            min_frame_interval_ms,
            frame_count: 0,
            fps: 0.0,
            fps_frames: 0,
            fps_window: 0.0,
        }
    }

    /// Account for `real_dt` seconds of wall time.
    ///
    /// Returns `None` while the frame-rate cap holds the frame back, otherwise
    /// the simulation delta for this frame, clamped to the ceiling.
    pub fn advance(&mut self, real_dt: f32) -> Option<f32> {
        let real_dt = if real_dt.is_finite() { real_dt.max(0.0) } else { 0.0 };
        self.wall_ms += real_dt as f64 * 1000.0;
        self.pending += real_dt;

        if self.pending * 1000.0 < self.min_frame_interval_ms as f32 {
            return None;
        }

        let step = self.pending.min(MAX_DELTA);
        self.pending = 0.0;
        self.elapsed += step;
        self.frame_count += 1;

        self.fps_frames += 1;
        self.fps_window += step;
        if self.fps_window >= 0.5 {
            self.fps = self.fps_frames as f32 / self.fps_window;
            self.fps_frames = 0;
            self.fps_window = 0.0;
        }

        Some(step)
    }

    /// Simulation time in seconds.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Wall time in milliseconds, used by rate-limited passes.
    #[inline]
    pub fn wall_ms(&self) -> f64 {
        self.wall_ms
    }

    /// Rendered frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Rendered frames per second, refreshed twice a second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Lets a pass run at most once per interval of wall time.
#[derive(Debug, Clone)]
pub struct IntervalGate {
    interval_ms: f64,
    last: Option<f64>,
}

impl IntervalGate {
    pub fn new(interval_ms: u32) -> Self {
        Self { interval_ms: interval_ms as f64, last: None }
    }

    /// `true` the first time and whenever `interval_ms` has passed since the last `true`.
    pub fn ready(&mut self, now_ms: f64) -> bool {
        match self.last {
            Some(last) if now_ms - last < self.interval_ms => false,
            _ => {
                self.last = Some(now_ms);
                true
            }
        }
    }
}

/// Measures real time between calls.
#[derive(Debug)]
pub struct WallClock {
    last: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self { last: Instant::now() }
    }

    /// Seconds since the previous lap (or construction).
    pub fn lap(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        dt
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_clock_new() {
        let clock = FrameClock::new(0);
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn test_delta_clamped() {
        let mut clock = FrameClock::new(0);
        assert_eq!(clock.advance(3.0), Some(MAX_DELTA));
        assert_eq!(clock.advance(f32::NAN), Some(0.0));
        assert!((clock.elapsed() - MAX_DELTA).abs() < 1e-6);
    }

    #[test]
    fn test_frame_cap_accumulates() {
        let mut clock = FrameClock::new(33);
        assert_eq!(clock.advance(0.016), None);
        assert_eq!(clock.advance(0.010), None);
        let dt = clock.advance(0.010).unwrap();
        assert!((dt - 0.036).abs() < 1e-6);
        assert_eq!(clock.frame(), 1);
        assert!((clock.wall_ms() - 36.0).abs() < 1e-3);
    }

    #[test]
    fn test_fps_estimate() {
        let mut clock = FrameClock::new(0);
        for _ in 0..60 {
            clock.advance(1.0 / 60.0);
        }
        assert!((clock.fps() - 60.0).abs() < 1.0);
    }

    #[test]
    fn test_interval_gate() {
        let mut gate = IntervalGate::new(50);
        assert!(gate.ready(0.0));
        assert!(!gate.ready(49.0));
        assert!(gate.ready(50.0));
        assert!(!gate.ready(60.0));
        assert!(gate.ready(100.0));
    }

    #[test]
    fn test_wall_clock_lap() {
        let mut wall = WallClock::new();
        thread::sleep(Duration::from_millis(5));
        assert!(wall.lap() > 0.0);
    }
}
