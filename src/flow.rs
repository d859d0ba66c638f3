//! Coarse flow field.
//!
//! A grid of per-cell angles `sin(x·k + t)·cos(y·k + t)·2π`, a cheap stand-in
//! for Perlin flow. Entities sample the angle of the cell they are in and add
//! `(cos a, sin a)·force` to their velocity.
//!
//! High-end profiles refresh every cell each tick; lower tiers refresh a
//! rotating diagonal subset so the whole grid is covered every `stride` ticks.

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::profile::PerformanceLevel;

/// Which cells are recomputed each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowRefresh {
    Full,
    /// Cells with `(x + y) % stride == tick % stride`.
    Partial { stride: u32 },
}

impl FlowRefresh {
    pub fn for_level(level: PerformanceLevel) -> Self {
        if level >= PerformanceLevel::High {
            FlowRefresh::Full
        } else {
            FlowRefresh::Partial { stride: 4 }
        }
    }
}

/// Flow field tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    pub cell_size: f32,
    /// Spatial frequency `k` of the angle function.
    pub frequency: f32,
    /// Field time advance per tick.
    pub time_step: f32,
    /// Velocity added per tick along the cell direction.
    pub force: f32,
    /// Force multiplier for skill-wave entities.
    pub wave_multiplier: f32,
    pub refresh: FlowRefresh,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            cell_size: 40.0,
            frequency: 0.1,
            time_step: 0.001,
            force: 0.01,
            wave_multiplier: 5.0,
            refresh: FlowRefresh::Partial { stride: 4 },
        }
    }
}

/// Angle grid covering a `width × height` area.
#[derive(Debug, Clone)]
pub struct FlowField {
    config: FlowConfig,
    cols: usize,
    rows: usize,
    angles: Vec<f32>,
    time: f32,
    tick: u32,
}

impl FlowField {
    pub fn new(width: f32, height: f32, config: FlowConfig) -> Self {
        let mut field = Self {
            config,
            cols: 0,
            rows: 0,
            angles: Vec::new(),
            time: 0.0,
            tick: 0,
        };
        field.resize(width, height);
        field
    }

    /// Re-grid for a new area. Every cell is recomputed.
    pub fn resize(&mut self, width: f32, height: f32) {
        let cell = self.config.cell_size.max(1.0);
        self.cols = ((width.max(0.0) / cell).ceil() as usize).max(1);
        self.rows = ((height.max(0.0) / cell).ceil() as usize).max(1);
        self.angles = vec![0.0; self.cols * self.rows];
        for y in 0..self.rows {
            for x in 0..self.cols {
                self.angles[y * self.cols + x] = self.angle_fn(x, y);
            }
        }
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    #[inline]
    fn angle_fn(&self, x: usize, y: usize) -> f32 {
        let k = self.config.frequency;
        (x as f32 * k + self.time).sin() * (y as f32 * k + self.time).cos() * TAU
    }

    /// Advance field time one tick and refresh the scheduled cells.
    /// Returns the number of cells recomputed.
    pub fn update(&mut self) -> usize {
        self.time += self.config.time_step;
        let mut refreshed = 0;
        for y in 0..self.rows {
            for x in 0..self.cols {
                let due = match self.config.refresh {
                    FlowRefresh::Full => true,
                    FlowRefresh::Partial { stride } => {
                        let stride = stride.max(1) as usize;
                        (x + y) % stride == self.tick as usize % stride
                    }
                };
                if due {
                    self.angles[y * self.cols + x] = self.angle_fn(x, y);
                    refreshed += 1;
                }
            }
        }
        self.tick = self.tick.wrapping_add(1);
        refreshed
    }

    /// Angle of the cell containing `pos`. Out-of-area positions use the nearest edge cell.
    pub fn angle_at(&self, pos: Vec2) -> f32 {
        let cell = self.config.cell_size.max(1.0);
        let x = ((pos.x / cell).floor().max(0.0) as usize).min(self.cols - 1);
        let y = ((pos.y / cell).floor().max(0.0) as usize).min(self.rows - 1);
        self.angles[y * self.cols + x]
    }

    /// Velocity delta for an entity at `pos`.
    pub fn force_at(&self, pos: Vec2, strength: f32) -> Vec2 {
        let angle = self.angle_at(pos);
        Vec2::new(angle.cos(), angle.sin()) * strength
    }
}
