//! State shared by the sword-swinging actors (player and knights)

use serde::{Deserialize, Serialize};

use super::geometry::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

/// What an actor is doing; facing is tracked alongside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stance {
    Idle,
    Moving,
    /// Swinging toward `dir`, locked in when the swing began
    Attacking { dir: Facing },
    Slain,
}

/// Half of the sprite frame on the swing side
pub fn swing_hitbox(visual: Rect, dir: Facing) -> Rect {
    let half = visual.w / 2.0;
    match dir {
        Facing::Right => Rect::new(visual.x + half, visual.y, half, visual.h),
        Facing::Left => Rect::new(visual.x, visual.y, half, visual.h),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swing_hitbox_sides() {
        let visual = Rect::new(10.0, 20.0, 80.0, 40.0);
        assert_eq!(swing_hitbox(visual, Facing::Right), Rect::new(50.0, 20.0, 40.0, 40.0));
        assert_eq!(swing_hitbox(visual, Facing::Left), Rect::new(10.0, 20.0, 40.0, 40.0));
    }
}
