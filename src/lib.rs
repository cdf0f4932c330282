//! BLOCKFALL - a falling-block puzzle engine
//!
//! The engine owns the rules: grid, collision, locking, the multi-tick row
//! clear animation, garbage injection, scoring and the versus coordinator.
//! Rendering, audio and input devices live outside. A host calls
//! [`MatchCoordinator::tick`] once per frame, forwards key presses as
//! [`Action`]s, then reads [`MatchCoordinator::snapshot`] and drains
//! [`GameEvent`]s for its audio and visual hooks.
//!
//! ```
//! use std::time::Duration;
//! use blockfall::{Action, MatchCoordinator, PlayerId, Settings};
//!
//! let mut game = MatchCoordinator::single(&Settings::default(), 42);
//! game.key_down(PlayerId::One, Action::MoveLeft);
//! game.tick(Duration::from_millis(16));
//! assert_eq!(game.level(PlayerId::One), 1);
//! ```

pub mod board;
pub mod event;
pub mod game;
pub mod input;
pub mod logging;
pub mod piece;
pub mod score;
pub mod settings;
pub mod snapshot;
pub mod tetromino;
pub mod versus;

pub use board::{Board, Cell};
pub use event::GameEvent;
pub use game::{PlayerSession, SessionState};
pub use input::{Action, KeyRepeat};
pub use piece::Tetromino;
pub use score::Score;
pub use settings::{Settings, SettingsError};
pub use snapshot::{MatchSnapshot, PieceSnapshot, SessionSnapshot};
pub use tetromino::{Shape, ShapeCatalog};
pub use versus::{MatchCoordinator, MatchOutcome, PlayerId};
