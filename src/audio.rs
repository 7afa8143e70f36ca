//! Sound cues derived from scene events
//!
//! The simulation never plays audio. Each tick the host turns the scene's
//! events into cues with a volume already mixed in, and hands them to whatever
//! actually makes noise.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::sim::state::{SceneEvent, SceneExit, SceneKind};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Sword swing reaching its hit frame (player or knight)
    Slash,
    /// Knight takes a hit
    BeHit,
    /// Fireball leaves the player's hand
    ThrowFireBall,
    /// Fireball kills a knight
    Explosion,
    /// Infinite-mode heal
    Heal,
    /// Menu confirm; also used for scene exits
    Confirm,
}

impl SoundEffect {
    /// Per-effect gain relative to the sound volume setting
    pub fn gain(self) -> f32 {
        match self {
            SoundEffect::Explosion => 8.0,
            SoundEffect::BeHit => 2.0,
            _ => 1.0,
        }
    }
}

/// Background music per scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MusicTrack {
    Cliff,
    StringStar,
    InfiniteMode,
}

impl MusicTrack {
    pub fn for_scene(kind: SceneKind) -> Self {
        match kind {
            SceneKind::Cliff => MusicTrack::Cliff,
            SceneKind::StringStar => MusicTrack::StringStar,
            SceneKind::InfiniteCliff => MusicTrack::InfiniteMode,
        }
    }
}

/// One sound to play, volume included
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundCue {
    pub effect: SoundEffect,
    pub volume: f32,
}

/// Effective volumes for a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioMixer {
    sound_volume: f32,
    bgm_volume: f32,
}

impl AudioMixer {
    pub fn new(settings: &Settings) -> Self {
        let mut mixer = Self {
            sound_volume: 0.0,
            bgm_volume: 0.0,
        };
        mixer.refresh(settings);
        mixer
    }

    /// Re-read volumes after the settings overlay closes
    pub fn refresh(&mut self, settings: &Settings) {
        self.sound_volume = settings.sound_volume.clamp(0.0, 1.0);
        self.bgm_volume = settings.bgm_volume.clamp(0.0, 1.0);
    }

    pub fn sound_volume(&self) -> f32 {
        self.sound_volume
    }

    pub fn bgm_volume(&self) -> f32 {
        self.bgm_volume
    }

    /// Volume for one effect, capped at full scale
    pub fn volume(&self, effect: SoundEffect) -> f32 {
        (self.sound_volume * effect.gain()).min(1.0)
    }

    pub fn effect_for(event: &SceneEvent) -> Option<SoundEffect> {
        match event {
            SceneEvent::Slash | SceneEvent::EnemySlash { .. } => Some(SoundEffect::Slash),
            SceneEvent::EnemyHit { .. } => Some(SoundEffect::BeHit),
            SceneEvent::FireBallThrown => Some(SoundEffect::ThrowFireBall),
            SceneEvent::Explosion { .. } => Some(SoundEffect::Explosion),
            SceneEvent::Healed { .. } => Some(SoundEffect::Heal),
            SceneEvent::SceneEnded(SceneExit::Completed { .. }) => Some(SoundEffect::Confirm),
            _ => None,
        }
    }

    /// Cues for one tick's events; silent cues are dropped
    pub fn cues(&self, events: &[SceneEvent]) -> Vec<SoundCue> {
        events
            .iter()
            .filter_map(Self::effect_for)
            .map(|effect| SoundCue {
                effect,
                volume: self.volume(effect),
            })
            .filter(|cue| cue.volume > 0.0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_gains_are_capped() {
        let settings = Settings {
            sound_volume: 0.1,
            ..Default::default()
        };
        let mixer = AudioMixer::new(&settings);
        assert!((mixer.volume(SoundEffect::Explosion) - 0.8).abs() < 1e-6);
        assert!((mixer.volume(SoundEffect::BeHit) - 0.2).abs() < 1e-6);
        assert!((mixer.volume(SoundEffect::Slash) - 0.1).abs() < 1e-6);

        let loud = AudioMixer::new(&Settings::default());
        assert_eq!(loud.volume(SoundEffect::Explosion), 1.0);
    }

    #[test]
    fn test_cues_from_events() {
        let mixer = AudioMixer::new(&Settings::default());
        let events = [
            SceneEvent::Slash,
            SceneEvent::Jump,
            SceneEvent::Explosion { pos: Vec2::ZERO },
            SceneEvent::RoundBanner { round: 2 },
        ];
        let cues = mixer.cues(&events);
        assert_eq!(
            cues.iter().map(|c| c.effect).collect::<Vec<_>>(),
            vec![SoundEffect::Slash, SoundEffect::Explosion]
        );

        let silent = AudioMixer::new(&Settings {
            sound_volume: 0.0,
            ..Default::default()
        });
        assert!(silent.cues(&events).is_empty());
    }

    #[test]
    fn test_refresh_picks_up_new_volumes() {
        let mut mixer = AudioMixer::new(&Settings::default());
        mixer.refresh(&Settings {
            sound_volume: 0.0,
            bgm_volume: 0.3,
            ..Default::default()
        });
        assert!(mixer.cues(&[SceneEvent::Slash]).is_empty());
        assert_eq!(mixer.bgm_volume(), 0.3);
        assert_eq!(MusicTrack::for_scene(SceneKind::InfiniteCliff), MusicTrack::InfiniteMode);
    }
}
