//! RAMPART application layer.
//!
//! Runs the simulation engine on its own thread at a fixed tick rate and
//! exposes a thread-safe command surface to the outside world.

pub mod error;
pub mod game_loop;
pub mod handle;
pub mod state;

pub use error::AppError;
pub use game_loop::{GameLoop, TickListener};
pub use handle::GameHandle;
pub use state::StopToken;
