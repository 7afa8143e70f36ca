//! Frame-index sequencing for sprite animations
//!
//! The sequencer only counts ticks. It reports when a new frame is entered and
//! when a one-shot clip runs out, and the owning entity decides what those
//! moments mean (a live hitbox, removal after death, ...).

use serde::{Deserialize, Serialize};

/// Frame on which an attack swing can connect
pub const ATTACK_HIT_FRAME: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Clip {
    Idle,
    Run,
    Attack,
    Slain,
    Spin,
}

impl Clip {
    pub fn looping(self) -> bool {
        matches!(self, Clip::Idle | Clip::Run | Clip::Spin)
    }
}

/// Frames per clip for one sprite sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameTable {
    pub idle: usize,
    pub run: usize,
    pub attack: usize,
    pub slain: usize,
    pub spin: usize,
}

impl FrameTable {
    pub fn frames(&self, clip: Clip) -> usize {
        let n = match clip {
            Clip::Idle => self.idle,
            Clip::Run => self.run,
            Clip::Attack => self.attack,
            Clip::Slain => self.slain,
            Clip::Spin => self.spin,
        };
        n.max(1)
    }
}

pub const PLAYER_FRAMES: FrameTable = FrameTable {
    idle: 5,
    run: 6,
    attack: 6,
    slain: 1,
    spin: 1,
};

pub const KNIGHT_FRAMES: FrameTable = FrameTable {
    idle: 6,
    run: 6,
    attack: 6,
    slain: 6,
    spin: 1,
};

pub const FIREBALL_FRAMES: FrameTable = FrameTable {
    idle: 5,
    run: 5,
    attack: 1,
    slain: 1,
    spin: 5,
};

/// What happened on an `advance`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimCue {
    /// Moved onto this frame index
    Entered(usize),
    /// A one-shot clip played its last frame to the end
    Finished,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationSequencer {
    table: FrameTable,
    clip: Clip,
    frame: usize,
    ticks_in_frame: u64,
    frame_ticks: u64,
    finished: bool,
}

impl AnimationSequencer {
    pub fn new(table: FrameTable, clip: Clip, frame_ticks: u64) -> Self {
        Self {
            table,
            clip,
            frame: 0,
            ticks_in_frame: 0,
            frame_ticks: frame_ticks.max(1),
            finished: false,
        }
    }

    pub fn clip(&self) -> Clip {
        self.clip
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Switch clips; a no-op if the clip is already playing
    pub fn play(&mut self, clip: Clip) {
        if self.clip != clip {
            self.restart(clip);
        }
    }

    /// Start a clip from frame 0 even if it is already playing
    pub fn restart(&mut self, clip: Clip) {
        self.clip = clip;
        self.frame = 0;
        self.ticks_in_frame = 0;
        self.finished = false;
    }

    /// Count one tick
    pub fn advance(&mut self) -> Option<AnimCue> {
        if self.finished {
            return None;
        }
        self.ticks_in_frame += 1;
        if self.ticks_in_frame < self.frame_ticks {
            return None;
        }
        self.ticks_in_frame = 0;

        let count = self.table.frames(self.clip);
        if self.frame + 1 < count {
            self.frame += 1;
            Some(AnimCue::Entered(self.frame))
        } else if self.clip.looping() {
            self.frame = 0;
            Some(AnimCue::Entered(0))
        } else {
            self.finished = true;
            Some(AnimCue::Finished)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot_finishes_after_clip_length() {
        let mut anim = AnimationSequencer::new(KNIGHT_FRAMES, Clip::Run, 3);
        anim.restart(Clip::Slain);
        let total = KNIGHT_FRAMES.frames(Clip::Slain) as u64 * 3;
        assert_eq!(total, 18);

        for _ in 1..total {
            assert_ne!(anim.advance(), Some(AnimCue::Finished));
        }
        assert_eq!(anim.advance(), Some(AnimCue::Finished));
        assert!(anim.is_finished());
        assert_eq!(anim.advance(), None);
        assert_eq!(anim.frame(), 5);
    }

    #[test]
    fn test_loop_wraps_and_hit_frame_is_entered_once() {
        let mut anim = AnimationSequencer::new(PLAYER_FRAMES, Clip::Attack, 3);
        let cues: Vec<_> = (0..18).filter_map(|_| anim.advance()).collect();
        assert_eq!(
            cues.iter().filter(|c| **c == AnimCue::Entered(ATTACK_HIT_FRAME)).count(),
            1
        );
        assert_eq!(cues.last(), Some(&AnimCue::Finished));

        anim.restart(Clip::Idle);
        for _ in 0..15 {
            anim.advance();
        }
        assert_eq!(anim.frame(), 0);
        assert!(!anim.is_finished());
    }

    #[test]
    fn test_play_does_not_restart_current_clip() {
        let mut anim = AnimationSequencer::new(PLAYER_FRAMES, Clip::Run, 1);
        anim.advance();
        anim.play(Clip::Run);
        assert_eq!(anim.frame(), 1);
        anim.play(Clip::Idle);
        assert_eq!(anim.frame(), 0);
    }
}
