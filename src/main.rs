//! Pocket Platformer demo runner
//!
//! Boots the world with in-memory host services and plays the configured
//! levels with a seeded autopilot, logging every game event.
//!
//! Usage: pocket-platformer [settings.json] [seed]

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use pocket_platformer::consts::SIM_DT;
use pocket_platformer::host::PhysicsBody;
use pocket_platformer::sim::{GameState, HostServices, World, tick};
use pocket_platformer::{CoreError, EventKind, InputSource, ScriptedInput, Settings, TickInput};

/// Downward acceleration of the demo body (units/s²)
const GRAVITY: f32 = 25.0;
/// Demo gives up after this many simulated seconds
const MAX_RUN_SECS: f32 = 60.0;

/// Demo host physics: flat ground at y = 0, no walls
#[derive(Debug, Default)]
struct FlatGroundBody {
    pos: Vec2,
    vel: Vec2,
    grounded: bool,
}

impl PhysicsBody for FlatGroundBody {
    fn position(&self) -> Vec2 {
        self.pos
    }

    fn set_position(&mut self, pos: Vec2) {
        self.pos = pos;
        self.grounded = pos.y <= 0.0;
    }

    fn velocity(&self) -> Vec2 {
        self.vel
    }

    fn set_velocity(&mut self, vel: Vec2) {
        self.vel = vel;
    }

    fn is_grounded(&self) -> bool {
        self.grounded
    }

    fn step(&mut self, dt: f32) {
        if !self.grounded || self.vel.y > 0.0 {
            self.vel.y -= GRAVITY * dt;
        }
        self.pos += self.vel * dt;
        if self.pos.y <= 0.0 {
            self.pos.y = 0.0;
            self.vel.y = self.vel.y.max(0.0);
            self.grounded = true;
        } else {
            self.grounded = false;
        }
    }
}

/// Mostly run right, with seeded pauses and hops
fn autopilot_script(rng: &mut Pcg32, secs: f32) -> ScriptedInput {
    let frames = (secs / SIM_DT) as usize;
    let mut script = Vec::with_capacity(frames);
    let mut pause_frames = 0u32;
    for _ in 0..frames {
        if pause_frames == 0 && rng.random_bool(0.01) {
            pause_frames = rng.random_range(10..40);
        }
        let axis = if pause_frames > 0 {
            pause_frames -= 1;
            0.0
        } else {
            1.0
        };
        script.push(TickInput {
            move_axis: axis,
            jump: rng.random_bool(0.02),
            interact: false,
        });
    }
    ScriptedInput::new(script)
}

fn run(settings: Settings, seed: u64) -> Result<(), CoreError> {
    let mut services = HostServices::in_memory(&settings);
    services.player_body = Box::new(FlatGroundBody::default());
    let mut world = World::new(settings, services);

    for kind in [
        EventKind::LevelEntered,
        EventKind::LevelComplete,
        EventKind::LevelEnded,
        EventKind::PlayerDied,
        EventKind::GameStateChanged,
        EventKind::TargetActivated,
    ] {
        world.events.subscribe(kind, |event| log::info!("event: {:?}", event));
    }
    let completed = Rc::new(Cell::new(false));
    let flag = Rc::clone(&completed);
    world
        .events
        .subscribe(EventKind::LevelComplete, move |_| flag.set(true));

    world.boot()?;
    let first = world
        .settings
        .levels
        .first()
        .map(|l| l.name.clone())
        .ok_or(CoreError::EmptyConfiguration("levels"))?;
    world.start_level(&first)?;

    let mut rng = Pcg32::seed_from_u64(seed);
    let mut input = autopilot_script(&mut rng, MAX_RUN_SECS);
    let mut restarts = 0;
    let mut last_target = None;

    while !input.is_finished() {
        let mut frame = input.poll();
        // Press interact once whenever a new target comes into range
        let target = world.gate.target();
        frame.interact = target.is_some() && target != last_target;
        last_target = target;

        world.player.body_mut().step(SIM_DT * world.game.time_scale());
        tick(&mut world, &frame, SIM_DT)?;

        if completed.replace(false) {
            world.complete_level()?;
        }
        match world.game.current() {
            GameState::Credits => break,
            GameState::GameOver if restarts < 3 => {
                restarts += 1;
                world.restart_level()?;
            }
            GameState::GameOver => break,
            _ => {}
        }
    }

    log::info!(
        "Run finished after {} ticks in state {} ({} projectiles spawned)",
        world.time_ticks,
        world.game.current(),
        world.pool.created_count() + world.pool.reuse_count()
    );
    world.quit()?;
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Pocket Platformer (native) starting...");

    let mut args = std::env::args().skip(1);
    let settings = args.next().map(Settings::load).unwrap_or_default();
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(12345);

    if let Err(e) = run(settings, seed) {
        log::error!("Fatal: {}", e);
        std::process::exit(1);
    }
}
