//! Infinite-mode round scheduler
//!
//! Rounds alternate between fighting and a short banner pause. When the last
//! knight of a round is gone the banner for the next round shows, then the new
//! round's knights trickle in one at a time.

use serde::{Deserialize, Serialize};

use super::knight::KnightKind;
use crate::ms_to_ticks;
use crate::tuning::Tuning;

/// Knights per round never exceed this
pub const MAX_ROUND_KNIGHTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Waiting for the player to walk into the start region
    NotStarted,
    /// Knights are out; waiting for them all to go
    RoundActive,
    /// Banner for the next round is showing
    RoundClearPause { since: u64 },
    /// Emitting this round's knights
    Spawning {
        emitted: u32,
        total: u32,
        last_spawn: Option<u64>,
    },
}

/// What the scheduler wants the scene to do this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnEvent {
    GameBegun,
    /// Show the "ROUND n" banner
    Banner { round: u32 },
    RoundStarted { round: u32 },
    /// Place one knight of this tier at a random spawn point
    Spawn(KnightKind),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnScheduler {
    pub phase: RoundPhase,
    pub round: u32,
    banner_ticks: u64,
    interval_ticks: u64,
    heal_every: u32,
    heal_amount: u32,
    healed_this_round: bool,
}

/// Knights in a round: three for the first rounds, then one per round number
pub fn round_size(round: u32) -> u32 {
    if round <= 3 {
        3
    } else {
        round.min(MAX_ROUND_KNIGHTS)
    }
}

pub fn round_tier(round: u32) -> KnightKind {
    match round {
        0..=2 => KnightKind::Azure,
        3..=6 => KnightKind::Crimson,
        _ => KnightKind::Obsidian,
    }
}

impl SpawnScheduler {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            phase: RoundPhase::NotStarted,
            round: 0,
            banner_ticks: ms_to_ticks(tuning.round_banner_ms),
            interval_ticks: ms_to_ticks(tuning.spawn_interval_ms),
            heal_every: tuning.heal_every_rounds.max(1),
            heal_amount: tuning.heal_amount,
            healed_this_round: false,
        }
    }

    pub fn has_begun(&self) -> bool {
        self.phase != RoundPhase::NotStarted
    }

    /// Round number to show on the banner, while it is up
    pub fn banner(&self) -> Option<u32> {
        match self.phase {
            RoundPhase::RoundClearPause { .. } => Some(self.round + 1),
            _ => None,
        }
    }

    /// Advance one tick. `live` counts knights still in the scene, corpses included.
    pub fn update(&mut self, now: u64, live: usize, in_start_region: bool) -> Vec<SpawnEvent> {
        let mut events = Vec::new();

        if self.phase == RoundPhase::NotStarted {
            if !in_start_region {
                return events;
            }
            self.phase = RoundPhase::RoundActive;
            log::info!("Infinite mode started");
            events.push(SpawnEvent::GameBegun);
        }

        if self.phase == RoundPhase::RoundActive && live == 0 {
            self.phase = RoundPhase::RoundClearPause { since: now };
            events.push(SpawnEvent::Banner {
                round: self.round + 1,
            });
        }

        if let RoundPhase::RoundClearPause { since } = self.phase {
            if now.saturating_sub(since) < self.banner_ticks {
                return events;
            }
            self.round += 1;
            self.healed_this_round = false;
            self.phase = RoundPhase::Spawning {
                emitted: 0,
                total: round_size(self.round),
                last_spawn: None,
            };
            log::info!("Round {} begins with {} knights", self.round, round_size(self.round));
            events.push(SpawnEvent::RoundStarted { round: self.round });
        }

        if let RoundPhase::Spawning {
            emitted,
            total,
            last_spawn,
        } = self.phase
        {
            let due = last_spawn.is_none_or(|last| now.saturating_sub(last) >= self.interval_ticks);
            if due {
                events.push(SpawnEvent::Spawn(round_tier(self.round)));
                let emitted = emitted + 1;
                self.phase = if emitted >= total {
                    RoundPhase::RoundActive
                } else {
                    RoundPhase::Spawning {
                        emitted,
                        total,
                        last_spawn: Some(now),
                    }
                };
            }
        }

        events
    }

    /// Heal owed on entering every Nth round, handed out once per round
    pub fn take_heal(&mut self) -> Option<u32> {
        if self.round > 0 && self.round % self.heal_every == 0 && !self.healed_this_round {
            self.healed_this_round = true;
            Some(self.heal_amount)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run a round from the banner until it is fully emitted; returns the spawned tiers
    fn play_round(s: &mut SpawnScheduler, now: &mut u64) -> Vec<KnightKind> {
        let mut spawned = Vec::new();
        loop {
            *now += 1;
            for ev in s.update(*now, 0, true) {
                if let SpawnEvent::Spawn(kind) = ev {
                    spawned.push(kind);
                }
            }
            if s.phase == RoundPhase::RoundActive && !spawned.is_empty() {
                return spawned;
            }
        }
    }

    #[test]
    fn test_round_sizes_and_tiers() {
        assert_eq!(round_size(1), 3);
        assert_eq!(round_size(3), 3);
        assert_eq!(round_size(4), 4);
        assert_eq!(round_size(5), 5);
        assert_eq!(round_size(12), 10);
        assert_eq!(round_tier(1), KnightKind::Azure);
        assert_eq!(round_tier(5), KnightKind::Crimson);
        assert_eq!(round_tier(12), KnightKind::Obsidian);
    }

    #[test]
    fn test_rounds_1_5_12_spawn_counts() {
        let mut s = SpawnScheduler::new(&Tuning::default());
        let mut now = 0;
        for round in 1..=12 {
            let spawned = play_round(&mut s, &mut now);
            assert_eq!(s.round, round);
            match round {
                1 => assert_eq!(spawned, vec![KnightKind::Azure; 3]),
                5 => assert_eq!(spawned, vec![KnightKind::Crimson; 5]),
                12 => assert_eq!(spawned, vec![KnightKind::Obsidian; 10]),
                _ => {}
            }
        }
    }

    #[test]
    fn test_waits_for_start_region_then_banner() {
        let mut s = SpawnScheduler::new(&Tuning::default());
        assert!(s.update(1, 0, false).is_empty());
        assert!(!s.has_begun());

        let events = s.update(2, 0, true);
        assert_eq!(
            events,
            vec![SpawnEvent::GameBegun, SpawnEvent::Banner { round: 1 }]
        );
        assert_eq!(s.banner(), Some(1));

        // 2 s banner is 120 ticks; the first knight arrives with the round start
        assert!(s.update(121, 0, false).is_empty());
        let events = s.update(122, 0, false);
        assert_eq!(
            events,
            vec![
                SpawnEvent::RoundStarted { round: 1 },
                SpawnEvent::Spawn(KnightKind::Azure)
            ]
        );
        // Then one every 500 ms
        assert!(s.update(151, 1, false).is_empty());
        assert_eq!(s.update(152, 2, false), vec![SpawnEvent::Spawn(KnightKind::Azure)]);
    }

    #[test]
    fn test_does_not_clear_while_knights_live() {
        let mut s = SpawnScheduler::new(&Tuning::default());
        s.phase = RoundPhase::RoundActive;
        s.round = 2;
        assert!(s.update(10, 1, false).is_empty());
        assert_eq!(s.phase, RoundPhase::RoundActive);
    }

    #[test]
    fn test_heal_once_per_fifth_round() {
        let mut s = SpawnScheduler::new(&Tuning::default());
        let mut now = 0;
        let mut heals = Vec::new();
        for _ in 1..=10 {
            play_round(&mut s, &mut now);
            // The scene asks every tick; only the first ask of a round pays out
            for _ in 0..5 {
                if let Some(amount) = s.take_heal() {
                    heals.push((s.round, amount));
                }
            }
        }
        assert_eq!(heals, vec![(5, 5), (10, 5)]);
    }
}
