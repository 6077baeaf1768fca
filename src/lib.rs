//! Maze-chase game core.
//!
//! The player walks a fixed grid maze eating pellets while enemies wander it
//! as independent uniform random walks over the walkable cells. Rendering and
//! input devices live outside this crate: a front end feeds a [`Session`]
//! movement intents, lifecycle signals and elapsed time, and draws its
//! [`Frame`].

pub mod config;
pub mod error;
pub mod markov;
pub mod maze;
pub mod session;
pub mod timer;

pub use config::{Rules, Settings};
pub use error::{Error, MazeError, Result};
pub use markov::{Transition, TransitionTable};
pub use maze::{Cell, Dir, Maze, PelletGrid, Tile};
pub use session::{Frame, MoveOutcome, Phase, Session};
