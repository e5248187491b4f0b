//! Fixed timestep simulation tick
//!
//! One call runs every per-tick handler in a fixed order:
//! scene setup, input, trigger dispatch, locomotion, spawning, projectile
//! motion, game-over fade.

use super::game::GameState;
use super::state::World;
use crate::error::CoreError;
use crate::input::TickInput;

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, input: &TickInput, dt: f32) -> Result<(), CoreError> {
    world.time_ticks += 1;
    let scaled_dt = dt * world.game.time_scale();

    // Setup for scene loads requested since the last tick
    world.apply_scene_changes();

    // Input: interaction fires in the same tick as the press
    if input.interact {
        world.interact();
    }
    world.player.drive(input, &world.settings.player);

    // Trigger zones against the player and live projectiles
    for contact in world.update_zone_overlaps() {
        world.dispatch_contact(contact);
    }

    world.player.update_locomotion();

    // Spawner re-checks the game state after each wait
    world.run_spawner(scaled_dt);

    let spawner = &world.settings.spawner;
    world
        .pool
        .advance(scaled_dt, spawner.projectile_speed, spawner.projectile_range);

    // Overlay fades in wall-clock time, even while simulation time is frozen
    world.level.update_fade(dt);
    if world.level.is_fade_complete() && world.game.is_playing() {
        world.game.transition(GameState::GameOver, &mut world.events)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventKind, GameEvent};
    use crate::host::PhysicsBody;
    use crate::input::{InputSource, ScriptedInput};
    use crate::settings::Settings;
    use crate::sim::game::TransitionOutcome;
    use crate::sim::interaction::InteractOutcome;
    use crate::sim::player::PlayerState;
    use glam::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn playing_world(settings: Settings) -> World {
        let mut world = World::in_memory(settings);
        world.boot().unwrap();
        world.start_level("Level1").unwrap();
        world
    }

    fn record(world: &mut World, kind: EventKind) -> Rc<RefCell<Vec<GameEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        world
            .events
            .subscribe(kind, move |e| sink.borrow_mut().push(e.clone()));
        seen
    }

    #[test]
    fn test_boot_and_start_level() {
        let world = playing_world(Settings::default());
        assert_eq!(world.game.current(), GameState::Playing);
        assert_eq!(world.level.scene(), Some("Level1"));
        assert_eq!(world.player.state(), PlayerState::Idle);
        assert!(world.player.control_enabled());
        assert_eq!(world.player.position(), Vec2::ZERO);
        assert!(!world.zones.is_empty());
        assert!(world.spawn_task.is_some());
    }

    #[test]
    fn test_scenario_pool_capacity_two_for_five_seconds() {
        let mut settings = Settings::default();
        settings.spawner.capacity = 2;
        settings.spawner.interval_secs = 1.0;
        let mut world = playing_world(settings);
        let spawn = world.pool.spawn_point();

        for _ in 0..20 {
            tick(&mut world, &TickInput::default(), 0.25).unwrap();
        }

        assert_eq!(world.pool.created_count(), 2);
        assert_eq!(world.pool.reuse_count(), 3);
        assert_eq!(world.pool.len(), 2);
        // Newest entry was reset to the spawn point on this tick and then advanced once
        let newest = world.pool.iter().last().unwrap();
        let step = world.settings.spawner.projectile_speed * 0.25;
        assert!((newest.pos - spawn).length() <= step + 1e-4);
    }

    #[test]
    fn test_load_level_without_pending_name() {
        let mut world = World::in_memory(Settings::default());
        world.boot().unwrap();
        let outcome = world.game.transition(GameState::LoadLevel, &mut world.events).unwrap();
        assert_eq!(outcome, TransitionOutcome::Skipped);
        assert_eq!(world.game.current(), GameState::MainMenu);
        assert_eq!(world.game.active_scene(), Some("MainMenu"));
    }

    #[test]
    fn test_deadzone_fires_once_then_game_over() {
        let mut world = playing_world(Settings::default());
        let died = record(&mut world, EventKind::PlayerDied);

        world.player.body_mut().set_position(Vec2::new(-20.0, -10.0));
        world.player.body_mut().set_velocity(Vec2::new(3.0, -8.0));
        tick(&mut world, &TickInput::moving(1.0), 0.25).unwrap();

        assert_eq!(world.player.state(), PlayerState::Dead);
        assert_eq!(world.player.body().velocity(), Vec2::ZERO);
        assert!(!world.player.control_enabled());
        assert!(world.level.game_over_visible());

        // Repeated overlap callbacks in the same frame do nothing
        let zone = world.zones.query(Vec2::new(-20.0, -10.0)).next().unwrap();
        for _ in 0..3 {
            world.dispatch_contact(crate::sim::ZoneContact {
                zone,
                kind: crate::sim::ZoneKind::Deadzone,
                phase: crate::sim::ContactPhase::Enter,
                entity: world.player.id(),
                tag: crate::sim::Tag::Player,
            });
        }
        assert_eq!(died.borrow().len(), 1);

        // Fade (1s) completes in wall-clock time, then the game freezes
        for _ in 0..4 {
            tick(&mut world, &TickInput::default(), 0.25).unwrap();
        }
        assert_eq!(world.game.current(), GameState::GameOver);
        assert_eq!(world.game.time_scale(), 0.0);
        assert_eq!(died.borrow().len(), 1);
    }

    #[test]
    fn test_restart_after_death() {
        let mut world = playing_world(Settings::default());
        world.player.body_mut().set_position(Vec2::new(-20.0, -10.0));
        for _ in 0..8 {
            tick(&mut world, &TickInput::default(), 0.25).unwrap();
        }
        assert_eq!(world.game.current(), GameState::GameOver);

        world.restart_level().unwrap();
        assert_eq!(world.game.current(), GameState::Playing);
        assert_eq!(world.game.time_scale(), 1.0);
        assert_eq!(world.player.state(), PlayerState::Idle);
        assert_eq!(world.player.position(), Vec2::ZERO);
        assert!(!world.level.game_over_visible());

        // Fresh latch in the reloaded scene
        world.player.body_mut().set_position(Vec2::new(-20.0, -10.0));
        tick(&mut world, &TickInput::default(), 0.25).unwrap();
        assert_eq!(world.player.state(), PlayerState::Dead);
    }

    #[test]
    fn test_spawn_task_finishes_when_leaving_playing() {
        let mut settings = Settings::default();
        settings.spawner.interval_secs = 0.5;
        let mut world = playing_world(settings);

        world.game.transition(GameState::Credits, &mut world.events).unwrap();
        // Scene change to credits not applied yet; the task sees Credits after its wait
        let task = world.spawn_task.as_mut().unwrap();
        assert_eq!(task.poll(0.5, world.game.current()), 0);
        assert!(task.is_finished());
    }

    #[test]
    fn test_key_then_door() {
        let mut world = playing_world(Settings::default());
        let activated = record(&mut world, EventKind::TargetActivated);
        let interact = TickInput {
            interact: true,
            ..Default::default()
        };

        // Door first: locked
        world.player.body_mut().set_position(Vec2::new(14.0, 0.0));
        tick(&mut world, &TickInput::default(), 0.1).unwrap();
        let door = world.gate.target().unwrap();
        assert_eq!(world.interact(), InteractOutcome::Locked(door));

        // Pick up the key, come back
        world.player.body_mut().set_position(Vec2::new(5.0, 0.0));
        tick(&mut world, &TickInput::default(), 0.1).unwrap();
        assert!(world.player.has_key());
        assert_eq!(world.gate.target(), None);

        world.player.body_mut().set_position(Vec2::new(14.0, 0.0));
        tick(&mut world, &TickInput::default(), 0.1).unwrap();
        tick(&mut world, &interact, 0.1).unwrap();
        assert_eq!(
            *activated.borrow(),
            vec![GameEvent::TargetActivated { target: door }]
        );
    }

    #[test]
    fn test_finish_zone_latch_and_level_progression() {
        let mut world = playing_world(Settings::default());
        let complete = record(&mut world, EventKind::LevelComplete);
        let ended = record(&mut world, EventKind::LevelEnded);

        for x in [30.0, 31.0, 40.0, 30.0] {
            world.player.body_mut().set_position(Vec2::new(x, 0.0));
            tick(&mut world, &TickInput::default(), 0.1).unwrap();
        }
        assert_eq!(complete.borrow().len(), 1);

        world.complete_level().unwrap();
        assert_eq!(world.level.scene(), Some("Level2"));
        assert_eq!(world.game.current(), GameState::Playing);
        assert_eq!(
            *ended.borrow(),
            vec![GameEvent::LevelEnded {
                scene: "Level1".into()
            }]
        );

        world.complete_level().unwrap();
        assert_eq!(world.game.current(), GameState::Credits);
        assert_eq!(world.game.active_scene(), Some("Credits"));
        assert!(world.spawn_task.is_none());
        assert!(!world.player.control_enabled());
    }

    #[test]
    fn test_restart_from_menu_is_skipped() {
        let mut world = World::in_memory(Settings::default());
        world.boot().unwrap();

        assert_eq!(world.restart_level().unwrap(), TransitionOutcome::Skipped);
        assert_eq!(world.game.current(), GameState::MainMenu);
        assert_eq!(world.game.active_scene(), Some("MainMenu"));
        assert_eq!(world.level.scene(), None);
        assert!(world.spawn_task.is_none());
        assert!(!world.player.control_enabled());
    }

    #[test]
    fn test_credits_without_scene_tears_down_level() {
        let mut settings = Settings::default();
        settings.credits_scene = None;
        let mut world = World::in_memory(settings);
        world.boot().unwrap();
        world.start_level("Level2").unwrap();
        let died = record(&mut world, EventKind::PlayerDied);

        world.complete_level().unwrap();
        assert_eq!(world.game.current(), GameState::Credits);
        assert_eq!(world.level.scene(), None);
        assert!(world.zones.is_empty());
        assert!(world.spawn_task.is_none());
        assert!(!world.player.control_enabled());

        // The old deadzone is gone
        world.player.body_mut().set_position(Vec2::new(-20.0, -10.0));
        tick(&mut world, &TickInput::default(), 0.25).unwrap();
        assert!(died.borrow().is_empty());
        assert_eq!(world.restart_level().unwrap(), TransitionOutcome::Skipped);
        assert_eq!(world.game.current(), GameState::Credits);
    }

    #[test]
    fn test_projectiles_do_not_trip_finish_zone() {
        let mut settings = Settings::default();
        settings.spawner.interval_secs = 0.1;
        settings.levels[0].projectile_spawn = Vec2::new(30.0, 0.0);
        let mut world = playing_world(settings);
        let complete = record(&mut world, EventKind::LevelComplete);

        tick(&mut world, &TickInput::default(), 0.25).unwrap();
        assert!(world.pool.active_count() >= 1);
        tick(&mut world, &TickInput::default(), 0.25).unwrap();
        assert!(complete.borrow().is_empty());

        world.player.body_mut().set_position(Vec2::new(30.0, 0.0));
        tick(&mut world, &TickInput::default(), 0.25).unwrap();
        assert_eq!(complete.borrow().len(), 1);
    }

    #[test]
    fn test_scripted_run_right() {
        let mut world = playing_world(Settings::default());
        let mut input = ScriptedInput::new(vec![TickInput::moving(1.0); 10]);
        world.player.body_mut().set_velocity(Vec2::ZERO);

        while !input.is_finished() {
            let frame = input.poll();
            tick(&mut world, &frame, 0.1).unwrap();
        }
        assert_eq!(world.player.body().velocity().x, world.settings.player.run_speed);
    }

    #[test]
    fn test_return_to_menu_and_quit() {
        let mut world = playing_world(Settings::default());
        world.return_to_menu().unwrap();
        assert_eq!(world.game.current(), GameState::MainMenu);
        assert_eq!(world.level.scene(), None);
        assert!(world.zones.is_empty());

        world.quit().unwrap();
        assert_eq!(world.game.current(), GameState::QuitGame);
    }
}
