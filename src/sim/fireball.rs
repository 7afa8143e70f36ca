//! Thrown fireballs: ballistic, bouncy, deadly to knights

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::anim::{AnimationSequencer, Clip, FIREBALL_FRAMES};
use super::body::{BodyShape, Collide, Contact, KinematicBody, step_body};
use super::geometry::{Axis, Rect};
use crate::ms_to_ticks;
use crate::tuning::Tuning;

/// Fireball sprite and body side, not scaled with the map
pub const FIREBALL_SIZE: f32 = 15.0;

/// Flame colors for the fireball's burst
pub const FIREBALL_PALETTE: [[u8; 3]; 3] = [[190, 74, 47], [247, 118, 34], [254, 231, 97]];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FireBall {
    pub id: u32,
    pub body: KinematicBody,
    pub exists: bool,
    launch_vel: Vec2,
    restitution: f32,
    anim: AnimationSequencer,
}

impl FireBall {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, tuning: &Tuning) -> Self {
        let mut body = KinematicBody::new(pos, BodyShape::square(FIREBALL_SIZE), tuning.gravity);
        body.vel = vel;
        Self {
            id,
            body,
            exists: true,
            launch_vel: vel,
            restitution: tuning.fireball_restitution,
            anim: AnimationSequencer::new(FIREBALL_FRAMES, Clip::Spin, ms_to_ticks(tuning.anim_frame_ms)),
        }
    }

    pub fn anim(&self) -> &AnimationSequencer {
        &self.anim
    }

    /// Both velocity components have decayed below a tenth of launch
    pub fn is_spent(&self) -> bool {
        self.body.vel.x.abs() < self.launch_vel.x.abs() / 10.0
            && self.body.vel.y.abs() < self.launch_vel.y.abs() / 10.0
    }

    pub fn update(&mut self, dt: f32, walls: &[Rect]) {
        if self.is_spent() {
            self.exists = false;
            return;
        }
        self.anim.advance();
        self.body.apply_gravity(dt);
        step_body(self, &[walls], dt);
    }
}

impl Collide for FireBall {
    fn body(&self) -> &KinematicBody {
        &self.body
    }

    fn body_mut(&mut self) -> &mut KinematicBody {
        &mut self.body
    }

    /// Reflect the hit axis and damp both
    fn on_contact(&mut self, contact: &Contact) {
        let r = self.restitution;
        match contact.axis {
            Axis::X => self.body.vel = Vec2::new(-self.body.vel.x * r, self.body.vel.y * r),
            Axis::Y => self.body.vel = Vec2::new(self.body.vel.x * r, -self.body.vel.y * r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    #[test]
    fn test_wall_bounce_reflects_and_damps() {
        let wall = [Rect::new(200.0, 0.0, 20.0, 400.0)];
        let tuning = Tuning::default();
        // Right edge 2 px from the wall, launched at full charge
        let mut ball = FireBall::new(1, Vec2::new(183.0, 200.0), Vec2::new(600.0, -600.0), &tuning);
        ball.update(SIM_DT, &wall);

        let vy_before = -600.0 + tuning.gravity * SIM_DT;
        assert!((ball.body.vel.x - (-480.0)).abs() < 1e-3);
        assert!((ball.body.vel.y - 0.8 * vy_before).abs() < 1e-3);
        assert_eq!(ball.body.body_rect().right(), 200.0);
        assert!(ball.exists);
    }

    #[test]
    fn test_spent_ball_removed_next_tick() {
        let floor = [Rect::new(0.0, 100.0, 400.0, 20.0)];
        let tuning = Tuning::default();
        let mut ball = FireBall::new(1, Vec2::new(50.0, 60.0), Vec2::new(300.0, -300.0), &tuning);
        ball.body.vel = Vec2::new(20.0, 10.0);
        assert!(ball.is_spent());
        ball.update(SIM_DT, &floor);
        assert!(!ball.exists);
        // The removal tick does not move it
        assert_eq!(ball.body.pos, Vec2::new(50.0, 60.0));
    }

    #[test]
    fn test_only_one_slow_axis_keeps_it_alive() {
        let tuning = Tuning::default();
        let mut ball = FireBall::new(1, Vec2::ZERO, Vec2::new(300.0, -300.0), &tuning);
        ball.body.vel = Vec2::new(10.0, -200.0);
        assert!(!ball.is_spent());
    }
}
