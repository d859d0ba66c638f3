//! Device performance classification.
//!
//! [`classify_device`] is a pure, one-shot mapping from [`DeviceSignals`] to
//! a [`Profile`] of tunable limits. It runs once at start-up; there is no
//! feedback from measured frame times.
//!
//! | Signals | Level | Particles | Link radius |
//! |---------|-------|-----------|-------------|
//! | mobile, memory known | `Low` | 50 | 60 |
//! | mobile, memory unknown | `VeryLow` | 30 | 50 |
//! | desktop, heap > 2 GB | `High` | 100 | 100 |
//! | desktop, heap ≤ 2 GB | `Mid` | 75 | 80 |
//! | desktop, memory unknown | `Low` | 60 | 70 |

use std::fmt;

use serde::{Deserialize, Serialize};

/// Heap limit above which a desktop device is considered high-end.
pub const HIGH_HEAP_THRESHOLD: u64 = 2_000_000_000;

/// Typed device signals, gathered by the host once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceSignals {
    /// Phone or tablet form factor.
    pub is_mobile: bool,
    /// JS-heap-style memory limit in bytes, if the host can introspect it.
    pub heap_size_limit: Option<u64>,
    /// Viewport width in logical pixels.
    pub viewport_width: u32,
}

impl DeviceSignals {
    /// Build signals from a user-agent string, the way browsers are usually sniffed.
    pub fn from_user_agent(user_agent: &str, heap_size_limit: Option<u64>, viewport_width: u32) -> Self {
        const MOBILE_TOKENS: [&str; 7] =
            ["Android", "webOS", "iPhone", "iPad", "iPod", "BlackBerry", "Opera Mini"];
        let ua = user_agent.to_ascii_lowercase();
        let is_mobile = MOBILE_TOKENS
            .iter()
            .any(|token| ua.contains(&token.to_ascii_lowercase()))
            || ua.contains("iemobile");
        Self { is_mobile, heap_size_limit, viewport_width }
    }

    /// Narrow viewports use the mobile shape scale and offset.
    pub fn is_narrow(&self) -> bool {
        self.viewport_width < 768
    }
}

/// Coarse performance tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceLevel {
    VeryLow = 0,
    Low = 1,
    Mid = 2,
    High = 3,
}

impl fmt::Display for PerformanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PerformanceLevel::VeryLow => "very-low",
            PerformanceLevel::Low => "low",
            PerformanceLevel::Mid => "mid",
            PerformanceLevel::High => "high",
        };
        f.write_str(name)
    }
}

/// Bundle of limits tuned for one performance tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub level: PerformanceLevel,
    pub particle_count: usize,
    /// Upper bound of the random entity radius.
    pub max_radius: f32,
    pub connection_distance: f32,
    /// Maximum number of pointer-to-entity links per frame.
    pub mouse_connection_limit: usize,
    pub enable_mouse_glow: bool,
    pub enable_particle_glow: bool,
    /// Minimum time between proximity-graph rebuilds.
    pub connection_redraw_interval_ms: u32,
    /// Minimum time between rendered frames; 0 renders every refresh.
    pub min_frame_interval_ms: u32,
    /// Multiplier for interaction-spawned entity counts.
    pub particle_count_factor: f32,
}

impl Profile {
    pub fn high() -> Self {
        Self {
            level: PerformanceLevel::High,
            particle_count: 100,
            max_radius: 3.0,
            connection_distance: 100.0,
            mouse_connection_limit: 25,
            enable_mouse_glow: true,
            enable_particle_glow: true,
            connection_redraw_interval_ms: 30,
            min_frame_interval_ms: 0,
            particle_count_factor: 1.0,
        }
    }

    pub fn mid() -> Self {
        Self {
            level: PerformanceLevel::Mid,
            particle_count: 75,
            max_radius: 2.5,
            connection_distance: 80.0,
            mouse_connection_limit: 15,
            enable_mouse_glow: true,
            enable_particle_glow: false,
            connection_redraw_interval_ms: 50,
            min_frame_interval_ms: 16,
            particle_count_factor: 0.75,
        }
    }

    /// Mobile device that exposes memory information.
    pub fn mobile() -> Self {
        Self {
            level: PerformanceLevel::Low,
            particle_count: 50,
            max_radius: 2.0,
            connection_distance: 60.0,
            mouse_connection_limit: 5,
            enable_mouse_glow: false,
            enable_particle_glow: false,
            connection_redraw_interval_ms: 100,
            min_frame_interval_ms: 24,
            particle_count_factor: 0.5,
        }
    }

    /// Mobile device with no memory introspection.
    pub fn very_low() -> Self {
        Self {
            level: PerformanceLevel::VeryLow,
            particle_count: 30,
            max_radius: 2.0,
            connection_distance: 50.0,
            mouse_connection_limit: 3,
            enable_mouse_glow: false,
            enable_particle_glow: false,
            connection_redraw_interval_ms: 150,
            min_frame_interval_ms: 33,
            particle_count_factor: 0.3,
        }
    }

    /// Conservative desktop default when memory cannot be inspected.
    pub fn conservative() -> Self {
        Self {
            level: PerformanceLevel::Low,
            particle_count: 60,
            max_radius: 2.0,
            connection_distance: 70.0,
            mouse_connection_limit: 10,
            enable_mouse_glow: false,
            enable_particle_glow: false,
            connection_redraw_interval_ms: 80,
            min_frame_interval_ms: 20,
            particle_count_factor: 0.5,
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::conservative()
    }
}

/// Classify a device. Mobile wins over everything; memory introspection picks
/// between mid and high; otherwise the conservative default is used.
pub fn classify_device(signals: &DeviceSignals) -> Profile {
    match (signals.is_mobile, signals.heap_size_limit) {
        (true, Some(_)) => Profile::mobile(),
        (true, None) => Profile::very_low(),
        (false, Some(heap)) if heap > HIGH_HEAP_THRESHOLD => Profile::high(),
        (false, Some(_)) => Profile::mid(),
        (false, None) => Profile::conservative(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(is_mobile: bool, heap: Option<u64>) -> DeviceSignals {
        DeviceSignals { is_mobile, heap_size_limit: heap, viewport_width: 1280 }
    }

    #[test]
    fn test_mobile_overrides_memory() {
        let p = classify_device(&signals(true, Some(8_000_000_000)));
        assert_eq!(p.level, PerformanceLevel::Low);
        assert_eq!(p.particle_count, 50);
        assert_eq!(classify_device(&signals(true, None)).level, PerformanceLevel::VeryLow);
    }

    #[test]
    fn test_desktop_heap_tiers() {
        let high = classify_device(&signals(false, Some(4_000_000_000)));
        assert_eq!(high.level, PerformanceLevel::High);
        assert!(high.enable_particle_glow);
        assert_eq!(high.min_frame_interval_ms, 0);

        let mid = classify_device(&signals(false, Some(HIGH_HEAP_THRESHOLD)));
        assert_eq!(mid.level, PerformanceLevel::Mid);
        assert_eq!(mid.mouse_connection_limit, 15);
    }

    #[test]
    fn test_no_introspection_falls_back() {
        let p = classify_device(&signals(false, None));
        assert_eq!(p, Profile::conservative());
        assert_eq!(p, Profile::default());
    }

    #[test]
    fn test_user_agent_sniffing() {
        let phone = DeviceSignals::from_user_agent(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)",
            None,
            390,
        );
        assert!(phone.is_mobile);
        assert!(phone.is_narrow());

        let desk = DeviceSignals::from_user_agent("Mozilla/5.0 (X11; Linux x86_64)", Some(4_294_705_152), 1920);
        assert!(!desk.is_mobile);
        assert_eq!(classify_device(&desk).level, PerformanceLevel::High);
    }

    #[test]
    fn test_profile_json() {
        let json = serde_json::to_string(&Profile::mid()).unwrap();
        assert!(json.contains("\"level\":\"mid\""));
        let back: Profile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Profile::mid());
    }
}
