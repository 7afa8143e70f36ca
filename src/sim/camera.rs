//! Scrolling camera
//!
//! The camera is an offset added to world coordinates to get screen
//! coordinates, so it is usually negative.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraMode {
    /// Jump straight to the target every tick
    Snap,
    /// Close 1/20 of the gap per tick, target sits in the lower third
    Lagged,
}

/// Fraction of the remaining gap the lagged camera closes each tick
const LAG: f32 = 1.0 / 20.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    pub offset: Vec2,
    pub mode: CameraMode,
    map_size: Vec2,
}

impl Camera {
    pub fn new(map_width: f32, map_height: f32, mode: CameraMode) -> Self {
        Self {
            offset: Vec2::ZERO,
            mode,
            map_size: Vec2::new(map_width, map_height),
        }
    }

    /// Follow the target's sprite rect using the current mode
    pub fn update(&mut self, target: Rect) {
        match self.mode {
            CameraMode::Snap => self.snap_to(target),
            CameraMode::Lagged => {
                let anchor = Vec2::new(SCREEN_WIDTH / 2.0, SCREEN_HEIGHT * 2.0 / 3.0);
                let goal = anchor - target.size() - Vec2::new(target.x, target.y);
                self.offset += (goal - self.offset) * LAG;
                self.clamp();
            }
        }
    }

    /// Put the target at the screen center immediately
    pub fn snap_to(&mut self, target: Rect) {
        let anchor = Vec2::new(SCREEN_WIDTH / 2.0, SCREEN_HEIGHT / 2.0);
        self.offset = anchor - target.size() - Vec2::new(target.x, target.y);
        self.clamp();
    }

    /// Keep the view inside the map: never past the top-left, never past the bottom-right
    fn clamp(&mut self) {
        self.offset = self.offset.min(Vec2::ZERO);
        self.offset.x = self.offset.x.max(-(self.map_size.x - SCREEN_WIDTH));
        self.offset.y = self.offset.y.max(-(self.map_size.y - SCREEN_HEIGHT));
    }

    /// World rect to screen rect
    pub fn apply(&self, rect: Rect) -> Rect {
        rect.translate(self.offset)
    }
}
