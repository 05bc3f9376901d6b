//! Per-frame simulation step
//!
//! Advances a playing session by exactly one animation frame. The step does
//! no I/O and cannot fail: every input is clamped into range and every
//! mutation is total.

use glam::Vec2;

use super::collision::{first_overlap, overlaps};
use super::entity::{Projectile, Rect};
use super::state::{GameEvent, GamePhase, Session};

/// Input flags sampled once at the start of a frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub move_up: bool,
    pub move_down: bool,
    /// Only honored by the lamp rule set
    pub move_left: bool,
    /// Only honored by the lamp rule set
    pub move_right: bool,
    pub fire: bool,
}

/// Advance a playing session by one frame at timestamp `now_ms`
///
/// Steps run in a fixed order: movement, firing, survival scoring, spawning,
/// advancement, projectile hits, player hits, terminal check, lamp goal.
/// Sessions outside `Playing` are left untouched.
pub fn tick(session: &mut Session, input: &TickInput, now_ms: f64) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if session.phase != GamePhase::Playing {
        return events;
    }

    let now = session.advance_clock(now_ms);
    session.frame += 1;

    move_player(session, input);
    fire(session, input, now, &mut events);
    score_survival(session, now);
    spawn(session, now, &mut events);
    advance(session);
    resolve_projectile_hits(session, &mut events);
    resolve_player_hits(session, &mut events);

    if session.lives == 0 {
        let final_score = session.score;
        session.final_score = Some(final_score);
        session.phase = GamePhase::GameOver;
        log::info!(
            "Game over after {} frames, final score {}",
            session.frame,
            final_score
        );
        events.push(GameEvent::GameOver { final_score });
        return events;
    }

    check_lamp(session, &mut events);
    events
}

fn move_player(session: &mut Session, input: &TickInput) {
    let speed = session.tuning.player.speed;
    let field = session.field();

    let mut dir = Vec2::ZERO;
    if input.move_up {
        dir.y -= 1.0;
    }
    if input.move_down {
        dir.y += 1.0;
    }
    if session.tuning.free_movement() {
        if input.move_left {
            dir.x -= 1.0;
        }
        if input.move_right {
            dir.x += 1.0;
        }
    }

    let player = &mut session.player;
    player.vel = dir * speed;
    let max = (field - player.rect.size).max(Vec2::ZERO);
    player.rect.pos = (player.rect.pos + player.vel).clamp(Vec2::ZERO, max);
}

fn fire(session: &mut Session, input: &TickInput, now: f64, events: &mut Vec<GameEvent>) {
    if !input.fire {
        return;
    }
    let cooldown = session.tuning.projectile.cooldown_ms;
    let ready = session
        .last_fire_at
        .is_none_or(|last| now - last >= cooldown);
    if !ready {
        return;
    }

    let tuning = &session.tuning.projectile;
    let muzzle = Vec2::new(session.player.rect.right(), session.player.rect.center().y);
    let rect = Rect::new(
        muzzle.x,
        muzzle.y - tuning.height / 2.0,
        tuning.width,
        tuning.height,
    );
    let speed_x = tuning.speed;
    let id = session.ids.next_id();
    session.projectiles.push(Projectile { id, rect, speed_x });
    session.last_fire_at = Some(now);
    events.push(GameEvent::ProjectileFired { id });
}

fn score_survival(session: &mut Session, now: f64) {
    let scoring = &session.tuning.scoring;
    if now - session.last_score_tick_at >= scoring.tick_ms {
        session.score += scoring.survival_bonus;
        session.last_score_tick_at = now;
    }
}

fn spawn(session: &mut Session, now: f64, events: &mut Vec<GameEvent>) {
    let difficulty = session.difficulty();
    let field = session.field();
    let spawned = session.spawner.poll(
        now,
        difficulty,
        &session.tuning.spawn,
        field,
        &mut session.ids,
    );
    if !spawned.is_empty() {
        events.push(GameEvent::ObstaclesSpawned {
            count: spawned.len(),
        });
        session.obstacles.extend(spawned);
    }
}

fn advance(session: &mut Session) {
    let field_width = session.tuning.field_width;

    for obstacle in &mut session.obstacles {
        obstacle.rect.pos.x += obstacle.speed_x;
    }
    session.obstacles.retain(|o| o.rect.right() > 0.0);

    for projectile in &mut session.projectiles {
        projectile.rect.pos.x += projectile.speed_x;
    }
    session.projectiles.retain(|p| p.rect.left() < field_width);
}

fn resolve_projectile_hits(session: &mut Session, events: &mut Vec<GameEvent>) {
    let mut destroyed: Vec<u32> = Vec::new();
    let obstacles = &session.obstacles;

    // Each projectile consumes at most one obstacle, each obstacle at most one projectile
    session.projectiles.retain(|projectile| {
        let hit = obstacles
            .iter()
            .find(|o| !destroyed.contains(&o.id) && overlaps(projectile, *o));
        match hit {
            Some(obstacle) => {
                destroyed.push(obstacle.id);
                events.push(GameEvent::ObstacleDestroyed {
                    obstacle: obstacle.id,
                    projectile: projectile.id,
                });
                false
            }
            None => true,
        }
    });

    if destroyed.is_empty() {
        return;
    }
    session.obstacles.retain(|o| !destroyed.contains(&o.id));
    session.score += session.tuning.scoring.kill_bonus * destroyed.len() as u64;
}

fn resolve_player_hits(session: &mut Session, events: &mut Vec<GameEvent>) {
    if session.invulnerable_frames > 0 {
        session.invulnerable_frames -= 1;
        return;
    }

    // First overlap only: at most one life per frame
    let Some(index) = first_overlap(&session.player, &session.obstacles) else {
        return;
    };
    let obstacle = session.obstacles[index].id;

    session.score = session
        .score
        .saturating_sub(session.tuning.scoring.hit_penalty);
    session.lives = session.lives.saturating_sub(1);
    session.invulnerable_frames = session.tuning.invulnerability_frames;

    log::debug!(
        "Player hit by obstacle {} ({} lives left, score {})",
        obstacle,
        session.lives,
        session.score
    );
    events.push(GameEvent::PlayerHit {
        obstacle,
        lives_left: session.lives,
    });
}

fn check_lamp(session: &mut Session, events: &mut Vec<GameEvent>) {
    let (Some(lamp), Some(tuning)) = (&session.lamp, &session.tuning.lamp) else {
        return;
    };
    if !overlaps(&session.player, lamp) {
        return;
    }

    let bonus = tuning.base_bonus
        + tuning.level_bonus * session.level as u64
        + tuning.life_bonus * session.lives as u64;
    session.score += bonus;
    session.level += 1;
    session.reset_player();
    session.obstacles.clear();

    log::info!("Lamp reached, +{} points, now level {}", bonus, session.level);
    events.push(GameEvent::LampReached {
        bonus,
        level: session.level,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{FRAME_MS, MAX_LIVES};
    use crate::sim::entity::ObstacleKind;
    use crate::tuning::Tuning;

    /// Tuning with spawning pushed far out so tests control every obstacle
    fn quiet_tuning() -> Tuning {
        let mut tuning = Tuning::default();
        tuning.spawn.base_interval_ms = 1.0e9;
        tuning.spawn.min_interval_ms = 1.0e9;
        tuning
    }

    fn playing(tuning: Tuning) -> Session {
        Session::new(tuning, 1, 0.0, GamePhase::Playing)
    }

    /// Stationary obstacle covering the player
    fn drop_on_player(session: &mut Session) -> u32 {
        let r = session.player.rect;
        session.place_obstacle(
            Rect::new(r.left() - 5.0, r.top() - 5.0, r.size.x + 10.0, r.size.y + 10.0),
            0.0,
            ObstacleKind::Web,
        )
    }

    fn frame_time(frame: u64) -> f64 {
        frame as f64 * FRAME_MS
    }

    #[test]
    fn test_menu_session_is_untouched() {
        let mut session = Session::new(quiet_tuning(), 1, 0.0, GamePhase::Menu);
        let events = tick(&mut session, &TickInput::default(), 10_000.0);
        assert!(events.is_empty());
        assert_eq!(session.frame, 0);
        assert_eq!(session.score, 0);
        assert_eq!(session.clock, 0.0);
    }

    #[test]
    fn test_player_moves_and_clamps() {
        let mut session = playing(quiet_tuning());
        let start_y = session.player.rect.top();
        let up = TickInput {
            move_up: true,
            ..Default::default()
        };
        tick(&mut session, &up, frame_time(1));
        assert_eq!(session.player.rect.top(), start_y - session.tuning.player.speed);

        for f in 2..500 {
            tick(&mut session, &up, frame_time(f));
        }
        assert_eq!(session.player.rect.top(), 0.0);

        let down = TickInput {
            move_down: true,
            ..Default::default()
        };
        for f in 500..1000 {
            tick(&mut session, &down, frame_time(f));
        }
        assert_eq!(
            session.player.rect.bottom(),
            session.tuning.field_height
        );
    }

    #[test]
    fn test_horizontal_input_ignored_in_survival() {
        let mut session = playing(quiet_tuning());
        let x = session.player.rect.left();
        let right = TickInput {
            move_right: true,
            ..Default::default()
        };
        tick(&mut session, &right, frame_time(1));
        assert_eq!(session.player.rect.left(), x);
    }

    #[test]
    fn test_fire_respects_cooldown() {
        let mut session = playing(quiet_tuning());
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        let events = tick(&mut session, &fire, 10.0);
        assert!(matches!(events[0], GameEvent::ProjectileFired { .. }));
        assert_eq!(session.projectiles.len(), 1);

        // Within the cooldown nothing new is fired
        tick(&mut session, &fire, 100.0);
        assert_eq!(session.projectiles.len(), 1);

        let ready_at = 10.0 + session.tuning.projectile.cooldown_ms;
        tick(&mut session, &fire, ready_at);
        assert_eq!(session.projectiles.len(), 2);
    }

    #[test]
    fn test_projectile_leaves_from_leading_edge() {
        let mut session = playing(quiet_tuning());
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        tick(&mut session, &fire, 10.0);
        let p = &session.projectiles[0];
        let player = session.player.rect;
        // Fired then advanced once in the same frame
        assert_eq!(p.rect.left(), player.right() + p.speed_x);
        assert_eq!(p.rect.center().y, player.center().y);
    }

    #[test]
    fn test_survival_scoring() {
        let mut session = playing(quiet_tuning());
        let idle = TickInput::default();
        tick(&mut session, &idle, 50.0);
        assert_eq!(session.score, 0);
        tick(&mut session, &idle, 100.0);
        assert_eq!(session.score, 1);
        tick(&mut session, &idle, 150.0);
        assert_eq!(session.score, 1);
        tick(&mut session, &idle, 1000.0);
        assert_eq!(session.score, 2);
    }

    #[test]
    fn test_backward_time_does_not_score_or_fire() {
        let mut session = playing(quiet_tuning());
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        tick(&mut session, &fire, 1000.0);
        let score = session.score;
        tick(&mut session, &fire, 200.0);
        tick(&mut session, &fire, f64::NAN);
        assert_eq!(session.score, score);
        assert_eq!(session.projectiles.len(), 1);
        assert_eq!(session.clock, 1000.0);
    }

    #[test]
    fn test_entities_despawn_off_field() {
        let mut session = playing(quiet_tuning());
        session.place_obstacle(Rect::new(1.0, 300.0, 10.0, 10.0), -5.0, ObstacleKind::Wind);
        let width = session.tuning.field_width;
        let id = session.ids.next_id();
        session.projectiles.push(Projectile {
            id,
            rect: Rect::new(width - 2.0, 100.0, 12.0, 4.0),
            speed_x: 9.0,
        });

        tick(&mut session, &TickInput::default(), 10.0);
        // Obstacle right edge at 6 still visible, projectile left edge past the field
        assert_eq!(session.obstacles.len(), 1);
        assert!(session.projectiles.is_empty());

        tick(&mut session, &TickInput::default(), 20.0);
        tick(&mut session, &TickInput::default(), 30.0);
        assert!(session.obstacles.is_empty());
    }

    #[test]
    fn test_projectile_destroys_one_obstacle() {
        let mut session = playing(quiet_tuning());
        // Two stacked obstacles in the line of fire, far from the player
        let first = session.place_obstacle(Rect::new(400.0, 240.0, 50.0, 40.0), 0.0, ObstacleKind::Web);
        let second = session.place_obstacle(Rect::new(400.0, 240.0, 50.0, 40.0), 0.0, ObstacleKind::Web);
        let id = session.ids.next_id();
        session.projectiles.push(Projectile {
            id,
            rect: Rect::new(390.0, 258.0, 12.0, 4.0),
            speed_x: 9.0,
        });

        let events = tick(&mut session, &TickInput::default(), 10.0);
        assert!(events.contains(&GameEvent::ObstacleDestroyed {
            obstacle: first,
            projectile: id
        }));
        assert!(session.projectiles.is_empty());
        assert_eq!(session.obstacles.len(), 1);
        assert_eq!(session.obstacles[0].id, second);
        assert_eq!(session.score, session.tuning.scoring.kill_bonus);
    }

    #[test]
    fn test_two_projectiles_do_not_share_an_obstacle() {
        let mut session = playing(quiet_tuning());
        session.place_obstacle(Rect::new(400.0, 240.0, 50.0, 40.0), 0.0, ObstacleKind::Web);
        for y in [250.0, 260.0] {
            let id = session.ids.next_id();
            session.projectiles.push(Projectile {
                id,
                rect: Rect::new(390.0, y, 12.0, 4.0),
                speed_x: 9.0,
            });
        }

        tick(&mut session, &TickInput::default(), 10.0);
        assert!(session.obstacles.is_empty());
        assert_eq!(session.projectiles.len(), 1);
        assert_eq!(session.score, session.tuning.scoring.kill_bonus);
    }

    #[test]
    fn test_at_most_one_life_per_frame() {
        let mut session = playing(quiet_tuning());
        drop_on_player(&mut session);
        drop_on_player(&mut session);
        drop_on_player(&mut session);

        let events = tick(&mut session, &TickInput::default(), 10.0);
        assert_eq!(session.lives, MAX_LIVES - 1);
        let hits = events
            .iter()
            .filter(|e| matches!(e, GameEvent::PlayerHit { .. }))
            .count();
        assert_eq!(hits, 1);
        assert_eq!(session.invulnerable_frames, session.tuning.invulnerability_frames);
    }

    #[test]
    fn test_invulnerability_window() {
        let mut session = playing(quiet_tuning());
        drop_on_player(&mut session);
        tick(&mut session, &TickInput::default(), frame_time(1));
        assert_eq!(session.lives, MAX_LIVES - 1);

        // Two more obstacles land on the player inside the window
        for f in 2..=61 {
            if f == 10 || f == 40 {
                drop_on_player(&mut session);
            }
            tick(&mut session, &TickInput::default(), frame_time(f));
        }
        assert_eq!(session.lives, MAX_LIVES - 1);
        assert_eq!(session.invulnerable_frames, session.tuning.invulnerability_frames - 60);
    }

    #[test]
    fn test_window_expires_then_hit_lands() {
        let mut session = playing(quiet_tuning());
        drop_on_player(&mut session);
        let window = session.tuning.invulnerability_frames as u64;

        tick(&mut session, &TickInput::default(), frame_time(1));
        for f in 2..=window + 1 {
            tick(&mut session, &TickInput::default(), frame_time(f));
        }
        assert_eq!(session.invulnerable_frames, 0);
        assert_eq!(session.lives, MAX_LIVES - 1);

        tick(&mut session, &TickInput::default(), frame_time(window + 2));
        assert_eq!(session.lives, MAX_LIVES - 2);
    }

    #[test]
    fn test_penalty_clamps_at_zero() {
        let mut tuning = quiet_tuning();
        tuning.invulnerability_frames = 0;
        let mut session = playing(tuning);
        session.score = 30;
        drop_on_player(&mut session);

        tick(&mut session, &TickInput::default(), 10.0);
        assert_eq!(session.score, 0);
        tick(&mut session, &TickInput::default(), 20.0);
        assert_eq!(session.score, 0);
        assert_eq!(session.lives, MAX_LIVES - 2);
    }

    #[test]
    fn test_game_over_freezes_final_score() {
        let mut tuning = quiet_tuning();
        tuning.invulnerability_frames = 0;
        let mut session = playing(tuning);
        session.score = 500;
        drop_on_player(&mut session);

        tick(&mut session, &TickInput::default(), 10.0);
        tick(&mut session, &TickInput::default(), 20.0);
        let events = tick(&mut session, &TickInput::default(), 30.0);

        assert_eq!(session.lives, 0);
        assert_eq!(session.phase, GamePhase::GameOver);
        assert_eq!(session.final_score, Some(350));
        assert_eq!(events.last(), Some(&GameEvent::GameOver { final_score: 350 }));

        // Further steps are inert
        let events = tick(&mut session, &TickInput::default(), 10_000.0);
        assert!(events.is_empty());
        assert_eq!(session.score, 350);
    }

    #[test]
    fn test_lamp_awards_bonus_and_resets() {
        let mut tuning = Tuning::lamp_run();
        tuning.spawn.base_interval_ms = 1.0e9;
        tuning.spawn.min_interval_ms = 1.0e9;
        let mut session = playing(tuning);
        session.place_obstacle(Rect::new(600.0, 0.0, 10.0, 10.0), 0.0, ObstacleKind::Web);

        // Park the player just left of the lamp
        let lamp = session.lamp.as_ref().map(|l| l.rect).unwrap();
        session.player.rect.pos = Vec2::new(lamp.left() - session.player.rect.size.x - 1.0, lamp.top());
        session.invulnerable_frames = 30;

        let right = TickInput {
            move_right: true,
            ..Default::default()
        };
        let events = tick(&mut session, &right, 10.0);

        // 100 + 50 * level 1 + 25 * 3 lives
        assert!(events.contains(&GameEvent::LampReached { bonus: 225, level: 2 }));
        assert_eq!(session.score, 225);
        assert_eq!(session.level, 2);
        assert!(session.obstacles.is_empty());
        assert_eq!(session.player.rect.left(), session.tuning.player.start_x);
        // Lamp does not touch the invulnerability window beyond its normal countdown
        assert_eq!(session.invulnerable_frames, 29);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn input() -> impl Strategy<Value = TickInput> {
            (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(move_up, move_down, fire)| {
                TickInput {
                    move_up,
                    move_down,
                    fire,
                    ..Default::default()
                }
            })
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn session_invariants_hold(
                seed in 0u64..500,
                inputs in proptest::collection::vec(input(), 200..600),
                jitter in proptest::collection::vec(-20.0f64..40.0, 600),
            ) {
                let mut tuning = Tuning::default();
                tuning.spawn.base_interval_ms = 300.0;
                tuning.spawn.min_interval_ms = 100.0;
                let mut session = Session::new(tuning, seed, 0.0, GamePhase::Playing);
                let mut now = 0.0;
                let mut game_overs = 0;

                for (i, input) in inputs.iter().enumerate() {
                    now += FRAME_MS + jitter[i];
                    let lives_before = session.lives;
                    let events = tick(&mut session, input, now);

                    prop_assert!(session.lives <= MAX_LIVES);
                    prop_assert!(session.lives <= lives_before);
                    prop_assert!(lives_before - session.lives <= 1);
                    let r = session.player.rect;
                    prop_assert!(r.top() >= 0.0 && r.bottom() <= session.tuning.field_height);
                    game_overs += events
                        .iter()
                        .filter(|e| matches!(e, GameEvent::GameOver { .. }))
                        .count();
                }

                prop_assert!(game_overs <= 1);
                if session.phase == GamePhase::GameOver {
                    prop_assert_eq!(session.lives, 0);
                    prop_assert_eq!(session.final_score, Some(session.score));
                    prop_assert_eq!(game_overs, 1);
                }
            }
        }
    }
}
