//! Per-tick hit resolution between the player, knights and fireballs

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::actor::Stance;
use super::fireball::FIREBALL_PALETTE;
use super::particle::Particle;
use super::state::{Scene, SceneEvent};

fn pick_color<const N: usize>(rng: &mut Pcg32, palette: &[[u8; 3]; N]) -> [u8; 3] {
    palette[rng.random_range(0..N)]
}

/// Run every pairwise check once for every knight.
///
/// Per knight, in order: fireball hit, player slash, body contact, knight
/// slash. Slain knights take no part and drip a corpse particle instead.
pub fn resolve_combat(scene: &mut Scene) {
    let now = scene.time_ticks;
    let Scene {
        player,
        knights,
        fireballs,
        particles,
        events,
        settings,
        tuning,
        rng,
        ..
    } = scene;
    let particle_cap = settings.max_particles();

    for knight in knights.iter_mut() {
        if !knight.is_slain() {
            let body = knight.body.body_rect();

            // Fireballs kill outright
            if !knight.is_invincible(now) {
                if let Some(fb) = fireballs
                    .iter_mut()
                    .find(|fb| fb.exists && fb.body.body_rect().intersects(&body))
                {
                    fb.exists = false;
                    knight.kill();
                    let center = fb.body.body_rect().center();
                    events.push(SceneEvent::Explosion { pos: center });
                    events.push(SceneEvent::EnemySlain {
                        id: knight.id,
                        kind: knight.kind,
                    });
                    for _ in 0..tuning.explosion_particles {
                        if particles.len() >= particle_cap {
                            break;
                        }
                        let color = pick_color(rng, &FIREBALL_PALETTE);
                        particles.push(Particle::explosion(rng, center, color));
                    }
                }
            }

            // Player sword: one hit, pop the knight upward
            if let Some(hitbox) = player.attack_hitbox() {
                if hitbox.intersects(&body) && !knight.is_invincible(now) && !knight.is_slain() {
                    knight.body.vel.y = knight.jump_impulse() / 2.0;
                    knight.apply_hit(now);
                    events.push(SceneEvent::EnemyHit { id: knight.id });
                    if knight.health < 1 {
                        player.gain_ammo();
                        events.push(SceneEvent::EnemySlain {
                            id: knight.id,
                            kind: knight.kind,
                        });
                    }
                }
            }
        }

        if knight.is_slain() {
            if particles.len() < particle_cap {
                let color = pick_color(rng, &knight.kind.palette());
                let center = knight.body.body_rect().center();
                particles.push(Particle::corpse(rng, center, color, tuning.gravity));
            }
            continue;
        }

        if player.is_slain() {
            continue;
        }

        let body = knight.body.body_rect();
        let player_body = player.body.body_rect();
        let up = player.jump_impulse() / 2.0;

        // Walking into a knight hurts and shoves the player away from it
        if player_body.intersects(&body) && !player.is_invincible(now) {
            let away = player_body.center().x - body.center().x;
            if away != 0.0 {
                player.knock_back(Vec2::new(away.signum() * 2.0 * player.speed(), up));
            }
            if player.take_hit(now) {
                events.push(SceneEvent::PlayerHit {
                    health: player.health,
                });
            }
        }

        // Knight sword: shoved along the swing
        if let (Stance::Attacking { dir }, Some(hitbox)) = (knight.stance, knight.attack_hitbox()) {
            if hitbox.intersects(&player.body.body_rect()) && !player.is_invincible(now) {
                player.knock_back(Vec2::new(dir.sign() * 3.0 * player.speed(), up));
                if player.take_hit(now) {
                    events.push(SceneEvent::PlayerHit {
                        health: player.health,
                    });
                }
            }
        }
    }
}
