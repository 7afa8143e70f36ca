//! Kinematic bodies and axis-separated tile collision
//!
//! Every moving thing in a scene embeds a [`KinematicBody`]. Motion is
//! integrated one axis at a time and each axis is resolved against the solid
//! rectangles before the other moves, so a body can never slide into a wall
//! diagonally.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Axis, Rect};

/// Fixed offsets from `pos` to the collision box and the drawn sprite
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyShape {
    pub body_size: Vec2,
    pub visual_offset: Vec2,
    pub visual_size: Vec2,
}

impl BodyShape {
    /// Knight-shaped sprite: an 11x17 body inside a 53x29 frame
    pub fn humanoid(scale: f32) -> Self {
        Self {
            body_size: Vec2::new(11.0, 17.0) * scale,
            visual_offset: Vec2::new(-21.0, -12.0) * scale,
            visual_size: Vec2::new(53.0, 29.0) * scale,
        }
    }

    /// Body and sprite share one square
    pub fn square(side: f32) -> Self {
        Self {
            body_size: Vec2::splat(side),
            visual_offset: Vec2::ZERO,
            visual_size: Vec2::splat(side),
        }
    }
}

/// Where a resolution pass stopped a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub axis: Axis,
    /// Sign of the velocity that caused the hit (+1 right/down, -1 left/up)
    pub direction: f32,
    /// The surface coordinate the body was snapped against
    pub surface: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KinematicBody {
    /// Top-left corner of the body rect
    pub pos: Vec2,
    pub vel: Vec2,
    pub shape: BodyShape,
    /// Downward acceleration in pixels/second²
    pub gravity: f32,
    pub airborne: bool,
}

impl KinematicBody {
    pub fn new(pos: Vec2, shape: BodyShape, gravity: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            shape,
            gravity,
            airborne: false,
        }
    }

    /// Collision box, always derived from the current position
    pub fn body_rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.shape.body_size)
    }

    /// Sprite frame, always derived from the current position
    pub fn visual_rect(&self) -> Rect {
        Rect::from_pos_size(self.pos + self.shape.visual_offset, self.shape.visual_size)
    }

    /// Unconditional gravity; a body falling faster than two ticks' worth is airborne
    pub fn apply_gravity(&mut self, dt: f32) {
        self.vel.y += self.gravity * dt;
        if self.vel.y > 2.0 * self.gravity * dt {
            self.airborne = true;
        }
    }

    pub fn integrate_axis(&mut self, axis: Axis, dt: f32) {
        match axis {
            Axis::X => self.pos.x += self.vel.x * dt,
            Axis::Y => self.pos.y += self.vel.y * dt,
        }
    }

    /// Push the body out of every overlapping solid along one axis.
    ///
    /// The side is picked from the sign of the velocity on that axis. When
    /// several solids overlap, the most restrictive surface wins (the one that
    /// moves the body furthest back along its travel). A body with zero
    /// velocity on the axis is left alone. Velocity is not touched here; the
    /// owner reacts to the returned contact.
    pub fn resolve_axis(&mut self, axis: Axis, groups: &[&[Rect]]) -> Option<Contact> {
        let body = self.body_rect();
        let speed = match axis {
            Axis::X => self.vel.x,
            Axis::Y => self.vel.y,
        };
        if speed == 0.0 {
            return None;
        }
        let forward = speed > 0.0;

        let mut surface: Option<f32> = None;
        for hit in groups.iter().flat_map(|g| g.iter()).filter(|r| body.intersects(r)) {
            let candidate = match (axis, forward) {
                (Axis::X, true) => hit.left(),
                (Axis::X, false) => hit.right(),
                (Axis::Y, true) => hit.top(),
                (Axis::Y, false) => hit.bottom(),
            };
            surface = Some(match surface {
                None => candidate,
                Some(s) if forward => s.min(candidate),
                Some(s) => s.max(candidate),
            });
        }

        let surface = surface?;
        match (axis, forward) {
            (Axis::X, true) => self.pos.x = snap_before(surface, body.w),
            (Axis::X, false) => self.pos.x = surface,
            (Axis::Y, true) => {
                self.pos.y = snap_before(surface, body.h);
                self.airborne = false;
            }
            (Axis::Y, false) => self.pos.y = surface,
        }

        Some(Contact {
            axis,
            direction: speed.signum(),
            surface,
        })
    }
}

/// Leading coordinate that puts the far edge (`start + size`) at or before `surface`.
///
/// `surface - size` can round so that adding `size` back lands one step past
/// the surface; back off until the sum no longer crosses it.
fn snap_before(surface: f32, size: f32) -> f32 {
    let mut start = surface - size;
    let step = surface.abs().max(size).max(1.0) * f32::EPSILON;
    while start + size > surface {
        start -= step;
    }
    start
}

/// Anything that owns a body and reacts to wall contacts
pub trait Collide {
    fn body(&self) -> &KinematicBody;
    fn body_mut(&mut self) -> &mut KinematicBody;
    /// Velocity response after the body has been snapped to the surface
    fn on_contact(&mut self, contact: &Contact);
}

/// Move a body one tick: horizontal step and resolve, then vertical step and resolve
pub fn step_body<C: Collide + ?Sized>(entity: &mut C, groups: &[&[Rect]], dt: f32) {
    for axis in [Axis::X, Axis::Y] {
        let body = entity.body_mut();
        body.integrate_axis(axis, dt);
        if let Some(contact) = body.resolve_axis(axis, groups) {
            entity.on_contact(&contact);
        }
    }
    debug_assert!(
        !groups
            .iter()
            .flat_map(|g| g.iter())
            .any(|r| entity.body().body_rect().intersects(r)),
        "body left inside a solid after resolution"
    );
}
