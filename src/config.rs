//! Run configuration.
//!
//! A `SimConfig` is built once, either from command-line flags or from the
//! setup menu, and handed to the session. Nothing in the core reads global
//! state.

use crate::error::{LifeError, Result};
use crate::rules::patterns::{GLIDER_WORLD_HEIGHT, GLIDER_WORLD_WIDTH};
use crate::session::{DEFAULT_SPEED, MIN_SPEED};
use clap::Parser;
use std::fmt;

/// Square world sizes offered by the setup menu.
pub const WORLD_SIZES: [usize; 3] = [100, 250, 500];
/// Cell sizes in pixels offered by the setup menu.
pub const CELL_SIZES: [u32; 3] = [1, 2, 5];
/// Initial live probabilities offered by the setup menu.
pub const PROBABILITIES: [f64; 3] = [0.1, 0.25, 0.5];
/// Cell size used for glider-gun worlds.
pub const GLIDER_CELL_SIZE: u32 = 8;

/// How the initial grid is populated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeedMode {
    /// Each cell is independently alive with `probability`.
    Random {
        width: usize,
        height: usize,
        probability: f64,
    },
    /// One or two Gosper guns in the fixed 120x90 world.
    GliderGun { count: u8 },
}

impl SeedMode {
    /// `(width, height)` of the world this mode produces.
    pub fn world_size(&self) -> (usize, usize) {
        match *self {
            SeedMode::Random { width, height, .. } => (width, height),
            SeedMode::GliderGun { .. } => (GLIDER_WORLD_WIDTH, GLIDER_WORLD_HEIGHT),
        }
    }
}

impl fmt::Display for SeedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedMode::Random { probability, .. } => write!(f, "random, p = {probability}"),
            SeedMode::GliderGun { count: 1 } => write!(f, "1 glider gun"),
            SeedMode::GliderGun { count } => write!(f, "{count} glider guns"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    pub wrap: bool,
    /// Rendered size of one cell in pixels. Only the shell uses this.
    pub cell_size: u32,
    pub seed: SeedMode,
    /// Fixed RNG seed for reproducible random worlds.
    pub rng_seed: Option<u64>,
    /// Initial speed in generations per second.
    pub speed: u32,
}

impl SimConfig {
    pub fn new(seed: SeedMode, wrap: bool, cell_size: u32) -> Result<Self> {
        let config = Self {
            wrap,
            cell_size,
            seed,
            rng_seed: None,
            speed: DEFAULT_SPEED,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_rng_seed(mut self, rng_seed: Option<u64>) -> Self {
        self.rng_seed = rng_seed;
        self
    }

    pub fn with_speed(mut self, speed: u32) -> Result<Self> {
        self.speed = speed;
        self.validate()?;
        Ok(self)
    }

    pub fn world_size(&self) -> (usize, usize) {
        self.seed.world_size()
    }

    /// Check everything the seeder would otherwise reject later, plus the
    /// shell-only fields.
    pub fn validate(&self) -> Result<()> {
        if self.cell_size == 0 {
            return Err(LifeError::InvalidConfig("cell size must be at least 1".into()));
        }
        if self.speed < MIN_SPEED {
            return Err(LifeError::InvalidConfig(format!(
                "speed must be at least {MIN_SPEED}"
            )));
        }
        match self.seed {
            SeedMode::Random {
                width,
                height,
                probability,
            } => {
                if width == 0 || height == 0 {
                    return Err(LifeError::InvalidDimension { width, height });
                }
                if !(0.0..=1.0).contains(&probability) {
                    return Err(LifeError::InvalidProbability(probability));
                }
            }
            SeedMode::GliderGun { count } => {
                if !(1..=2).contains(&count) {
                    return Err(LifeError::InvalidGliderCount(count));
                }
            }
        }
        Ok(())
    }
}

/// Largest menu cell size that keeps a `world`-cell wide window on screen.
pub fn default_cell_size(world: usize) -> u32 {
    match world {
        0..=100 => 5,
        101..=250 => 2,
        _ => 1,
    }
}

/// Command-line flags. Any of `--size`, `--probability` or `--gliders`
/// skips the setup menu.
#[derive(Debug, Clone, Parser)]
#[command(name = "delta_life", version, about = "Conway's Game of Life")]
pub struct Args {
    /// Wrap the world edges into a torus
    #[arg(long)]
    pub wrap: bool,

    /// Side length of a square random world
    #[arg(long, conflicts_with = "gliders")]
    pub size: Option<usize>,

    /// Rendered cell size in pixels
    #[arg(long)]
    pub cell_size: Option<u32>,

    /// Probability that each cell starts alive
    #[arg(long, conflicts_with = "gliders")]
    pub probability: Option<f64>,

    /// Seed with 1 or 2 Gosper glider guns instead of random cells
    #[arg(long)]
    pub gliders: Option<u8>,

    /// RNG seed for a reproducible random world
    #[arg(long)]
    pub seed: Option<u64>,

    /// Initial speed in generations per second
    #[arg(long, default_value_t = DEFAULT_SPEED)]
    pub speed: u32,
}

impl Args {
    /// Build the run configuration, or `None` when the flags leave the
    /// choice to the setup menu.
    pub fn into_config(self) -> Result<Option<SimConfig>> {
        let (seed, default_cell) = match (self.gliders, self.size, self.probability) {
            (Some(count), _, _) => (SeedMode::GliderGun { count }, GLIDER_CELL_SIZE),
            (None, None, None) => return Ok(None),
            (None, size, probability) => {
                let size = size.unwrap_or(WORLD_SIZES[0]);
                let seed = SeedMode::Random {
                    width: size,
                    height: size,
                    probability: probability.unwrap_or(PROBABILITIES[1]),
                };
                (seed, default_cell_size(size))
            }
        };

        let config = SimConfig::new(seed, self.wrap, self.cell_size.unwrap_or(default_cell))?
            .with_rng_seed(self.seed)
            .with_speed(self.speed)?;
        Ok(Some(config))
    }
}
