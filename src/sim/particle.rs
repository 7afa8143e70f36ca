//! Decorative square particles

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::body::{BodyShape, Collide, Contact, KinematicBody, step_body};
use super::geometry::{Axis, Rect};

/// Lifetime lost per tick
const DECAY_PER_TICK: f32 = 0.2;

/// Burst particles fall a little slower than bodies
pub const EXPLOSION_GRAVITY: f32 = 1200.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub body: KinematicBody,
    pub color: [u8; 3],
    pub timer: f32,
}

impl Particle {
    /// Random size and lifetime, velocity drawn from the given ranges
    pub fn spawn<R: Rng>(
        rng: &mut R,
        pos: Vec2,
        color: [u8; 3],
        vx: (f32, f32),
        vy: (f32, f32),
        gravity: f32,
    ) -> Self {
        let size = rng.random_range(3..=10) as f32;
        let mut body = KinematicBody::new(pos, BodyShape::square(size), gravity);
        body.vel = Vec2::new(rng.random_range(vx.0..=vx.1), rng.random_range(vy.0..=vy.1));
        Self {
            body,
            color,
            timer: rng.random_range(10..=20) as f32,
        }
    }

    /// Part of the burst where a fireball kills a knight
    pub fn explosion<R: Rng>(rng: &mut R, pos: Vec2, color: [u8; 3]) -> Self {
        Self::spawn(rng, pos, color, (-100.0, 100.0), (-600.0, 200.0), EXPLOSION_GRAVITY)
    }

    /// Dripped every tick by a dying knight
    pub fn corpse<R: Rng>(rng: &mut R, pos: Vec2, color: [u8; 3], gravity: f32) -> Self {
        Self::spawn(rng, pos, color, (-100.0, 100.0), (-300.0, 100.0), gravity)
    }

    pub fn size(&self) -> f32 {
        self.body.shape.body_size.x
    }

    pub fn is_alive(&self) -> bool {
        self.timer > 0.0
    }

    pub fn update(&mut self, dt: f32, walls: &[Rect]) {
        self.timer -= DECAY_PER_TICK;
        self.body.apply_gravity(dt);
        step_body(self, &[walls], dt);
    }
}

impl Collide for Particle {
    fn body(&self) -> &KinematicBody {
        &self.body
    }

    fn body_mut(&mut self) -> &mut KinematicBody {
        &mut self.body
    }

    fn on_contact(&mut self, contact: &Contact) {
        match contact.axis {
            Axis::X => self.body.vel.x = -self.body.vel.x,
            Axis::Y => self.body.vel.y = -self.body.vel.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_spawn_ranges() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..200 {
            let p = Particle::explosion(&mut rng, Vec2::ZERO, [1, 2, 3]);
            assert!((3.0..=10.0).contains(&p.size()));
            assert!((10.0..=20.0).contains(&p.timer));
            assert!((-100.0..=100.0).contains(&p.body.vel.x));
            assert!((-600.0..=200.0).contains(&p.body.vel.y));
        }
    }

    #[test]
    fn test_expires_after_timer() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut p = Particle::corpse(&mut rng, Vec2::ZERO, [0, 0, 0], 1800.0);
        p.timer = 1.0;
        for _ in 0..4 {
            p.update(SIM_DT, &[]);
            assert!(p.is_alive());
        }
        p.update(SIM_DT, &[]);
        p.update(SIM_DT, &[]);
        assert!(!p.is_alive());
    }

    #[test]
    fn test_floor_bounce_reflects_fully() {
        let floor = [Rect::new(-100.0, 20.0, 400.0, 10.0)];
        let mut rng = Pcg32::seed_from_u64(3);
        let mut p = Particle::corpse(&mut rng, Vec2::new(0.0, 0.0), [0, 0, 0], 1800.0);
        p.body.pos.y = 20.0 - p.size() - 1.0;
        p.body.vel = Vec2::new(50.0, 300.0);
        p.update(SIM_DT, &floor);
        let expected = -(300.0 + 1800.0 * SIM_DT);
        assert!((p.body.vel.y - expected).abs() < 1e-3);
        assert_eq!(p.body.vel.x, 50.0);
    }
}
