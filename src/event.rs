//! Notifications for audio and visual hooks
//!
//! Events are buffered by the engine and drained by the presentation layer
//! once per frame. Nothing in the engine reads them back.

/// Something observable happened during a call into the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A collision check found the requested position blocked
    CollisionBlocked,
    /// A cell of a clearing row was marked as exploding
    CellExploded { row: usize, col: usize },
    /// A cleared row was removed and the stack settled
    RowCleared { row: usize },
    /// Garbage rows were queued for this board
    GarbageReceived { count: u32 },
    /// A queued garbage row was pushed in from the bottom
    GarbageRaised { hole: usize },
    /// The falling piece was merged into the grid
    PieceLocked,
    /// Full rows were found right after a lock
    LinesFound { count: u32 },
    /// Four rows found in a single lock
    Tetris,
    LevelUp { level: u32 },
    GameOver,
}
