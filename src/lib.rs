//! Conway's Game of Life core: grid state, the update engine with change
//! tracking, pattern seeding and the run controller.
//!
//! The windowed shell lives in the binary target and only talks to the core
//! through [`session::Session`].

pub mod config;
pub mod error;
pub mod grid;
pub mod rules;
pub mod session;

pub use config::{SeedMode, SimConfig};
pub use error::{LifeError, Result};
pub use grid::{Cell, Grid};
pub use rules::{advance, Change, ChangeSet};
pub use session::{ControlEvent, Response, RunState, Session};
