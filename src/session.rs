//! Run controller.
//!
//! A `Session` owns the grid for one run and drives the update engine at the
//! current speed. The shell feeds it control events and clock readings;
//! nothing in here sleeps or polls.

use crate::config::SimConfig;
use crate::error::Result;
use crate::grid::Grid;
use crate::rules::patterns::seed_with;
use crate::rules::{advance, ChangeSet};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::time::{Duration, Instant};

/// Generations per second at the start of a run.
pub const DEFAULT_SPEED: u32 = 10;
/// Slowest allowed speed.
pub const MIN_SPEED: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
    /// Terminal. The grid has been released.
    Stopped,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Running => "running",
            RunState::Paused => "paused",
            RunState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    Pause,
    Resume,
    Restart,
    Quit,
    SpeedUp,
    SpeedDown,
}

/// What a control event did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// The event does not apply in the current state.
    Ignored,
    StateChanged { from: RunState, to: RunState },
    SpeedChanged(u32),
    /// A fresh grid was seeded and the generation counter reset. The shell
    /// must redraw the whole world.
    Restarted,
}

pub struct Session {
    config: SimConfig,
    grid: Option<Grid>,
    generation: u64,
    speed: u32,
    state: RunState,
    last_advance: Option<Instant>,
    rng: StdRng,
}

impl Session {
    /// Seed the initial grid and start running.
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let grid = seed_with(&config.seed, &mut rng)?;
        log::info!(
            "Session started: {}x{}, wrap {}, speed {}",
            grid.width(),
            grid.height(),
            config.wrap,
            config.speed
        );

        Ok(Self {
            config,
            grid: Some(grid),
            generation: 0,
            speed: config.speed,
            state: RunState::Running,
            last_advance: None,
            rng,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The current generation, or `None` once stopped.
    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Minimum time between two generations at the current speed.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(1) / self.speed
    }

    /// When the next generation is due, or `None` if not running.
    pub fn next_deadline(&self, now: Instant) -> Option<Instant> {
        if self.state != RunState::Running {
            return None;
        }
        Some(self.last_advance.map_or(now, |last| last + self.interval()))
    }

    /// Advance one generation if running and the interval has elapsed.
    ///
    /// At most one generation is computed per call; missed intervals are
    /// not made up.
    pub fn tick(&mut self, now: Instant) -> Option<ChangeSet> {
        if self.state != RunState::Running {
            return None;
        }
        if let Some(last) = self.last_advance {
            if now.saturating_duration_since(last) < self.interval() {
                return None;
            }
        }

        let grid = self.grid.as_mut()?;
        let (next, changes) = advance(grid, self.config.wrap);
        *grid = next;
        self.generation += 1;
        self.last_advance = Some(now);
        log::debug!("Generation {}: {} cells changed", self.generation, changes.len());
        Some(changes)
    }

    /// Apply a control event.
    ///
    /// Events that make no sense in the current state are ignored rather
    /// than reported as errors. Only a restart can fail, and only if
    /// seeding fails.
    pub fn handle(&mut self, event: ControlEvent) -> Result<Response> {
        let response = match (self.state, event) {
            (RunState::Stopped, _) => Response::Ignored,

            (RunState::Running, ControlEvent::Pause) => self.transition(RunState::Paused),
            (RunState::Paused, ControlEvent::Resume) => self.transition(RunState::Running),
            (_, ControlEvent::Quit) => {
                self.grid = None;
                self.transition(RunState::Stopped)
            }
            (RunState::Paused, ControlEvent::Restart) => {
                self.restart()?;
                Response::Restarted
            }

            (_, ControlEvent::SpeedUp) => self.set_speed(self.speed.saturating_add(1)),
            (_, ControlEvent::SpeedDown) if self.speed > MIN_SPEED => {
                self.set_speed(self.speed - 1)
            }

            _ => Response::Ignored,
        };

        if response == Response::Ignored {
            log::debug!("Ignored {:?} while {}", event, self.state);
        }
        Ok(response)
    }

    fn transition(&mut self, to: RunState) -> Response {
        let from = self.state;
        self.state = to;
        log::info!("Session {} -> {} at generation {}", from, to, self.generation);
        Response::StateChanged { from, to }
    }

    fn set_speed(&mut self, speed: u32) -> Response {
        self.speed = speed;
        log::info!("Speed set to {} generations/s", speed);
        Response::SpeedChanged(speed)
    }

    fn restart(&mut self) -> Result<()> {
        let grid = seed_with(&self.config.seed, &mut self.rng)?;
        self.grid = Some(grid);
        self.generation = 0;
        self.speed = self.config.speed;
        self.last_advance = None;
        self.state = RunState::Running;
        log::info!("Session restarted with a fresh {} world", self.config.seed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeedMode;

    fn session() -> Session {
        let config = SimConfig::new(SeedMode::GliderGun { count: 1 }, false, 8).unwrap();
        Session::new(config).unwrap()
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn starts_running_at_generation_zero() {
        let session = session();
        assert_eq!(session.state(), RunState::Running);
        assert_eq!(session.generation(), 0);
        assert_eq!(session.speed(), DEFAULT_SPEED);
        assert!(session.grid().is_some());
    }

    #[test]
    fn ticks_follow_the_speed() {
        let mut session = session();
        let t0 = Instant::now();

        assert!(session.tick(t0).is_some(), "first tick fires immediately");
        assert_eq!(session.generation(), 1);
        assert!(session.tick(t0 + ms(50)).is_none());
        assert_eq!(session.next_deadline(t0 + ms(50)), Some(t0 + ms(100)));
        assert!(session.tick(t0 + ms(100)).is_some());
        assert_eq!(session.generation(), 2);

        // A long stall still yields a single generation.
        assert!(session.tick(t0 + ms(1000)).is_some());
        assert!(session.tick(t0 + ms(1001)).is_none());
        assert_eq!(session.generation(), 3);
    }

    #[test]
    fn pause_freezes_generation() {
        let mut session = session();
        let t0 = Instant::now();
        session.tick(t0);

        assert_eq!(
            session.handle(ControlEvent::Pause),
            Ok(Response::StateChanged { from: RunState::Running, to: RunState::Paused })
        );
        assert!(session.tick(t0 + ms(500)).is_none());
        assert_eq!(session.next_deadline(t0 + ms(500)), None);
        assert_eq!(session.generation(), 1);

        assert_eq!(session.handle(ControlEvent::Pause), Ok(Response::Ignored));
        session.handle(ControlEvent::Resume).unwrap();
        assert!(session.tick(t0 + ms(600)).is_some());
        assert_eq!(session.generation(), 2);
    }

    #[test]
    fn speed_has_a_floor_and_works_while_paused() {
        let mut session = session();
        for _ in 0..DEFAULT_SPEED - 1 {
            session.handle(ControlEvent::SpeedDown).unwrap();
        }
        assert_eq!(session.speed(), MIN_SPEED);
        assert_eq!(session.handle(ControlEvent::SpeedDown), Ok(Response::Ignored));
        assert_eq!(session.interval(), Duration::from_secs(1));

        session.handle(ControlEvent::Pause).unwrap();
        assert_eq!(session.handle(ControlEvent::SpeedUp), Ok(Response::SpeedChanged(2)));
        assert_eq!(session.state(), RunState::Paused);
    }

    #[test]
    fn restart_only_from_paused() {
        let mut session = session();
        let t0 = Instant::now();
        session.tick(t0);
        session.tick(t0 + ms(100));
        session.handle(ControlEvent::SpeedUp).unwrap();

        assert_eq!(session.handle(ControlEvent::Restart), Ok(Response::Ignored));
        assert_eq!(session.generation(), 2);

        session.handle(ControlEvent::Pause).unwrap();
        assert_eq!(session.handle(ControlEvent::Restart), Ok(Response::Restarted));
        assert_eq!(session.state(), RunState::Running);
        assert_eq!(session.generation(), 0);
        assert_eq!(session.speed(), DEFAULT_SPEED);
        let fresh = crate::rules::patterns::seed(&SeedMode::GliderGun { count: 1 }).unwrap();
        assert_eq!(session.grid(), Some(&fresh));
    }

    #[test]
    fn quit_is_terminal_and_releases_the_grid() {
        let mut session = session();
        session.handle(ControlEvent::Pause).unwrap();
        session.handle(ControlEvent::Resume).unwrap();
        assert_eq!(
            session.handle(ControlEvent::Quit),
            Ok(Response::StateChanged { from: RunState::Running, to: RunState::Stopped })
        );
        assert!(session.grid().is_none());

        for event in [
            ControlEvent::Pause,
            ControlEvent::Resume,
            ControlEvent::Restart,
            ControlEvent::Quit,
            ControlEvent::SpeedUp,
            ControlEvent::SpeedDown,
        ] {
            assert_eq!(session.handle(event), Ok(Response::Ignored));
            assert_eq!(session.state(), RunState::Stopped);
        }
        assert!(session.tick(Instant::now()).is_none());
    }

    #[test]
    fn fixed_rng_seed_reproduces_random_worlds() {
        let mode = SeedMode::Random { width: 50, height: 40, probability: 0.3 };
        let config = SimConfig::new(mode, true, 2).unwrap().with_rng_seed(Some(11));
        let a = Session::new(config).unwrap();
        let b = Session::new(config).unwrap();
        assert_eq!(a.grid(), b.grid());
    }
}
