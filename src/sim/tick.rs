//! Fixed timestep scene tick
//!
//! Order within a tick: pending exit, settings boundary, stall check, entity
//! updates, combat, reaping, triggers and waves, failure check, camera.

use glam::Vec2;
use rand::Rng;

use super::particle::Particle;
use super::spawn::SpawnEvent;
use super::state::{FADE_STEP, Scene, SceneEvent, SceneExit};
use crate::consts::STALL_DT;
use crate::map::Trigger;

/// Input state for a single tick (held keys, not edges)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub attack: bool,
    /// Throw key is down; the fireball leaves on release
    pub throw_held: bool,
    /// Use the exit
    pub interact: bool,
    /// Open the settings overlay
    pub open_settings: bool,
}

/// What a call to [`tick`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Simulated,
    /// Frame took too long; nothing moved, render anyway
    Stalled,
    /// Simulation paused for the settings overlay; call `Scene::apply_settings` when it closes
    SettingsRequested,
    Finished(SceneExit),
}

/// Advance the scene by one frame of `dt` seconds
pub fn tick(scene: &mut Scene, input: &TickInput, dt: f32) -> TickOutcome {
    if let Some(exit) = scene.finished {
        return TickOutcome::Finished(exit);
    }
    scene.events.clear();

    if let Some(exit) = scene.pending_exit.take() {
        scene.finished = Some(exit);
        scene.events.push(SceneEvent::SceneEnded(exit));
        log::info!("Scene {} ended: {:?}", scene.kind.name(), exit);
        return TickOutcome::Finished(exit);
    }

    if input.open_settings {
        return TickOutcome::SettingsRequested;
    }

    if dt > STALL_DT {
        log::warn!("Frame stalled ({:.0} ms), skipping simulation", dt * 1000.0);
        return TickOutcome::Stalled;
    }

    scene.time_ticks += 1;
    let now = scene.time_ticks;
    scene.fade_alpha = scene.fade_alpha.saturating_sub(FADE_STEP);

    update_entities(scene, input, now, dt);
    super::combat::resolve_combat(scene);
    reap(scene);
    update_triggers(scene, input, now);

    if scene.player.is_slain() && scene.pending_exit.is_none() {
        let exit = match scene.round() {
            Some(round) => SceneExit::RunOver { round },
            None => SceneExit::Failed,
        };
        scene.pending_exit = Some(exit);
    }

    scene.camera.update(scene.player.body.visual_rect());
    TickOutcome::Simulated
}

fn update_entities(scene: &mut Scene, input: &TickInput, now: u64, dt: f32) {
    let step = scene.player.update(input, now, dt, &scene.geometry.walls);
    if step.slashed {
        scene.events.push(SceneEvent::Slash);
    }
    if step.jumped {
        scene.events.push(SceneEvent::Jump);
    }
    if let Some(vel) = step.thrown {
        scene.spawn_fireball(vel);
        scene.events.push(SceneEvent::FireBallThrown);
    }

    let target = scene.player.body.visual_rect().center();
    let (walls, invisible) = (&scene.geometry.walls, &scene.geometry.invisible_walls);
    for knight in scene.knights.iter_mut() {
        if knight.update(target, dt, walls, invisible).slashed {
            scene.events.push(SceneEvent::EnemySlash { id: knight.id });
        }
    }

    for fireball in scene.fireballs.iter_mut() {
        fireball.update(dt, walls);
    }
    for particle in scene.particles.iter_mut() {
        particle.update(dt, walls);
    }
}

/// Deferred removal of everything marked gone this tick
fn reap(scene: &mut Scene) {
    let before = scene.knights.len();
    scene.knights.retain(|k| k.exists);
    let vanished = (before - scene.knights.len()) as u32;
    scene.enemies_slain += vanished;
    scene.round_slain += vanished;

    scene.fireballs.retain(|f| f.exists);
    scene.particles.retain(Particle::is_alive);
}

fn update_triggers(scene: &mut Scene, input: &TickInput, now: u64) {
    let sprite = scene.player.body.visual_rect();
    let inside = |which: Trigger| {
        scene
            .geometry
            .trigger(which)
            .is_some_and(|region| region.intersects(&sprite))
    };
    scene.show_tips = inside(Trigger::Tips);
    scene.show_exit_hint = inside(Trigger::Exit);
    let in_start_region = inside(Trigger::GameBegin);

    if scene.show_exit_hint && input.interact && !scene.player.is_slain() {
        scene.pending_exit = Some(SceneExit::Completed {
            slain: scene.enemies_slain,
            total: scene.total_enemies,
        });
    }

    let Some(spawner) = scene.spawner.as_mut() else {
        return;
    };
    let wave = spawner.update(now, scene.knights.len(), in_start_region);
    let heal = spawner.take_heal();

    for event in wave {
        match event {
            SpawnEvent::GameBegun => scene.events.push(SceneEvent::GameBegun),
            SpawnEvent::Banner { round } => scene.events.push(SceneEvent::RoundBanner { round }),
            SpawnEvent::RoundStarted { round } => {
                scene.round_slain = 0;
                scene.events.push(SceneEvent::RoundStarted { round });
            }
            SpawnEvent::Spawn(kind) => {
                let points = &scene.geometry.spawn_points;
                let pos = points[scene.rng.random_range(0..points.len())];
                let id = scene.spawn_knight(kind, pos);
                scene.events.push(SceneEvent::KnightSpawned { id, kind });
            }
        }
    }

    if let Some(amount) = heal {
        let restored = scene.player.heal(amount);
        log::info!("Healed player by {} at round {:?}", restored, scene.round());
        scene.events.push(SceneEvent::Healed { amount: restored });
    }
}

/// Scripted player for demos and soak runs: walk to the action, fight, leave
pub fn demo_input(scene: &Scene) -> TickInput {
    let mut input = TickInput::default();
    let player = &scene.player;
    let body = player.body.body_rect();
    let here = body.center();
    let now = scene.time_ticks;

    let nearest = scene
        .knights
        .iter()
        .filter(|k| !k.is_slain())
        .map(|k| k.body.body_rect().center())
        .min_by(|a, b| {
            a.distance(here)
                .partial_cmp(&b.distance(here))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let goal: Option<Vec2> = match nearest {
        Some(enemy) => Some(enemy),
        None => {
            let which = match &scene.spawner {
                Some(spawner) if !spawner.has_begun() => Some(Trigger::GameBegin),
                Some(_) => None,
                None => Some(Trigger::Exit),
            };
            which
                .and_then(|t| scene.geometry.trigger(t))
                .map(|r| r.center())
        }
    };

    if let Some(goal) = goal {
        let dx = goal.x - here.x;
        let close = dx.abs() < body.w * 2.0;
        if nearest.is_some() && close {
            // Face it and swing
            input.left = dx < 0.0 && player.facing.sign() > 0.0;
            input.right = dx > 0.0 && player.facing.sign() < 0.0;
            input.attack = true;
        } else {
            input.left = dx < -2.0;
            input.right = dx > 2.0;
        }

        // Far enemies get a fireball every few seconds, held for a mid charge
        if nearest.is_some() && dx.abs() > 200.0 && player.ammo > 0 {
            input.throw_held = now % 180 < 20;
        }

        // Hop when a wall stalls the walk
        let walking = input.left || input.right;
        input.jump = walking && player.body.vel.x.abs() < 1.0 && !player.body.airborne;
    }

    input.interact = scene.show_exit_hint && scene.knights.iter().all(|k| k.is_slain());
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::settings::Settings;
    use crate::sim::knight::KnightKind;
    use crate::sim::spawn::RoundPhase;
    use crate::sim::state::SceneKind;
    use crate::sim::state::fixtures::{arena, infinite_arena, parked_knight, scene};
    use crate::tuning::Tuning;

    fn idle() -> TickInput {
        TickInput::default()
    }

    #[test]
    fn test_stall_skips_simulation() {
        let mut scene = scene(SceneKind::Cliff, &arena());
        let pos = scene.player.body.pos;
        assert_eq!(tick(&mut scene, &idle(), 0.25), TickOutcome::Stalled);
        assert_eq!(scene.time_ticks, 0);
        assert_eq!(scene.player.body.pos, pos);
        assert_eq!(scene.fade_alpha, 255);

        assert_eq!(tick(&mut scene, &idle(), SIM_DT), TickOutcome::Simulated);
        assert_eq!(scene.time_ticks, 1);
        assert_eq!(scene.fade_alpha, 245);
    }

    #[test]
    fn test_player_settles_on_spawn_floor() {
        let mut scene = scene(SceneKind::Cliff, &arena());
        for _ in 0..30 {
            tick(&mut scene, &idle(), SIM_DT);
        }
        assert_eq!(scene.player.body.body_rect().bottom(), 325.5);
        assert!(!scene.player.body.airborne);
        assert_eq!(scene.fade_alpha, 0);
    }

    #[test]
    fn test_exit_requires_interact_inside_region() {
        let mut scene = scene(SceneKind::Cliff, &arena());
        let interact = TickInput {
            interact: true,
            ..Default::default()
        };
        tick(&mut scene, &interact, SIM_DT);
        assert!(scene.pending_exit.is_none());

        scene.player.body.pos.x = 1370.0;
        tick(&mut scene, &idle(), SIM_DT);
        assert!(scene.show_exit_hint);
        assert!(scene.pending_exit.is_none());

        tick(&mut scene, &interact, SIM_DT);
        let exit = SceneExit::Completed { slain: 0, total: 0 };
        assert_eq!(scene.pending_exit, Some(exit));
        // Takes effect at the top of the next tick
        assert_eq!(tick(&mut scene, &idle(), SIM_DT), TickOutcome::Finished(exit));
        assert!(scene.events.contains(&SceneEvent::SceneEnded(exit)));
        assert_eq!(tick(&mut scene, &idle(), SIM_DT), TickOutcome::Finished(exit));
    }

    #[test]
    fn test_tips_region_sets_hint() {
        let mut scene = scene(SceneKind::Cliff, &arena());
        scene.player.body.pos.x = 60.0;
        tick(&mut scene, &idle(), SIM_DT);
        assert!(scene.show_tips);
        assert!(scene.hud().show_tips);
    }

    #[test]
    fn test_player_death_fails_next_tick() {
        let mut scene = scene(SceneKind::Cliff, &arena());
        scene.player.health = 1;
        scene.player.take_hit(0);
        assert_eq!(tick(&mut scene, &idle(), SIM_DT), TickOutcome::Simulated);
        assert_eq!(scene.pending_exit, Some(SceneExit::Failed));
        assert_eq!(
            tick(&mut scene, &idle(), SIM_DT),
            TickOutcome::Finished(SceneExit::Failed)
        );
    }

    #[test]
    fn test_settings_boundary_pauses() {
        let mut scene = scene(SceneKind::Cliff, &arena());
        let open = TickInput {
            open_settings: true,
            ..Default::default()
        };
        assert_eq!(tick(&mut scene, &open, SIM_DT), TickOutcome::SettingsRequested);
        assert_eq!(scene.time_ticks, 0);

        let quiet = Settings {
            sound_volume: 0.0,
            ..Default::default()
        };
        scene.apply_settings(&quiet);
        assert_eq!(scene.audio.sound_volume(), 0.0);
        assert_eq!(tick(&mut scene, &idle(), SIM_DT), TickOutcome::Simulated);
    }

    #[test]
    fn test_slain_knight_reaped_after_animation() {
        let mut scene = scene(SceneKind::Cliff, &arena());
        let idx = parked_knight(&mut scene, KnightKind::Azure, 800.0);
        scene.total_enemies = 1;
        tick(&mut scene, &idle(), SIM_DT);
        scene.knights[idx].kill();

        // 6 frames of 3 ticks
        for _ in 0..17 {
            tick(&mut scene, &idle(), SIM_DT);
            assert_eq!(scene.knights.len(), 1);
        }
        tick(&mut scene, &idle(), SIM_DT);
        assert!(scene.knights.is_empty());
        assert_eq!(scene.enemies_slain, 1);
        assert_eq!(scene.hud().enemies_slain, 1);
        // Corpse dripped particles while dying
        assert!(!scene.particles.is_empty());
    }

    #[test]
    fn test_throw_spawns_fireball() {
        let mut scene = scene(SceneKind::Cliff, &arena());
        let hold = TickInput {
            throw_held: true,
            ..Default::default()
        };
        for _ in 0..20 {
            tick(&mut scene, &hold, SIM_DT);
        }
        tick(&mut scene, &idle(), SIM_DT);
        assert_eq!(scene.fireballs.len(), 1);
        assert_eq!(scene.player.ammo, 4);
        assert!(scene.events.contains(&SceneEvent::FireBallThrown));
    }

    #[test]
    fn test_infinite_mode_starts_in_region_and_spawns() {
        let mut scene = scene(SceneKind::InfiniteCliff, &infinite_arena());
        for _ in 0..10 {
            tick(&mut scene, &idle(), SIM_DT);
        }
        assert_eq!(scene.spawner.as_ref().unwrap().phase, RoundPhase::NotStarted);

        // Step into game_begin (x 300..360 scaled)
        scene.player.body.pos.x = 310.0;
        tick(&mut scene, &idle(), SIM_DT);
        assert!(scene.events.contains(&SceneEvent::GameBegun));
        assert!(scene.events.contains(&SceneEvent::RoundBanner { round: 1 }));
        assert_eq!(scene.hud().round_banner, Some(1));

        // Walk away so nothing touches the player, then wait out the banner and spawns
        scene.player.body.pos.x = 60.0;
        let mut spawned = 0;
        for _ in 0..(120 + 3 * 30) {
            tick(&mut scene, &idle(), SIM_DT);
            spawned += scene
                .events
                .iter()
                .filter(|e| matches!(e, SceneEvent::KnightSpawned { kind: KnightKind::Azure, .. }))
                .count();
        }
        assert_eq!(spawned, 3);
        assert_eq!(scene.round(), Some(1));
        assert_eq!(scene.hud().enemies_total, 3);
        for knight in &scene.knights {
            assert!((30.0..=40.0).contains(&knight.speed));
        }
    }

    #[test]
    fn test_infinite_death_reports_round() {
        let mut scene = scene(SceneKind::InfiniteCliff, &infinite_arena());
        scene.spawner.as_mut().unwrap().round = 4;
        scene.player.health = 1;
        scene.player.take_hit(0);
        tick(&mut scene, &idle(), SIM_DT);
        assert_eq!(
            tick(&mut scene, &idle(), SIM_DT),
            TickOutcome::Finished(SceneExit::RunOver { round: 4 })
        );
    }

    #[test]
    fn test_demo_input_clears_a_level() {
        let mut map = arena();
        map.objects.push(crate::map::MapObject {
            kind: "knight".into(),
            name: "knight01".into(),
            x: 400.0,
            y: 200.0,
            width: 0.0,
            height: 0.0,
        });
        let mut scene = Scene::new(SceneKind::Cliff, &map, &Settings::default(), &Tuning::default(), 9)
            .unwrap();
        let mut outcome = TickOutcome::Simulated;
        for _ in 0..(60 * 60) {
            let input = demo_input(&scene);
            outcome = tick(&mut scene, &input, crate::consts::SIM_DT);
            if matches!(outcome, TickOutcome::Finished(_)) {
                break;
            }
        }
        assert!(matches!(outcome, TickOutcome::Finished(_)));
    }
}
