//! Read-only state snapshots for presentation and recording layers

use serde::Serialize;

use crate::game::{PlayerSession, SessionState};
use crate::piece::Tetromino;
use crate::versus::{MatchCoordinator, MatchOutcome};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PieceSnapshot {
    pub shape: Vec<Vec<u8>>,
    pub x: usize,
    pub y: usize,
}

impl From<&Tetromino> for PieceSnapshot {
    fn from(piece: &Tetromino) -> Self {
        Self {
            shape: piece.shape().rows().to_vec(),
            x: piece.x(),
            y: piece.y(),
        }
    }
}

/// Everything a renderer reads for one player each frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    /// Cell tags, top row first
    pub grid: Vec<Vec<u8>>,
    pub current: Option<PieceSnapshot>,
    pub next: Vec<Vec<u8>>,
    pub score: u64,
    pub level: u32,
    pub lines: u32,
    pub rows_remaining: i32,
    pub incoming_garbage: u32,
    pub clearing: bool,
    pub paused: bool,
    pub game_over: bool,
}

impl From<&PlayerSession> for SessionSnapshot {
    fn from(session: &PlayerSession) -> Self {
        let score = session.score();
        Self {
            grid: session.board().tags(),
            current: session.current_piece().map(PieceSnapshot::from),
            next: session.next_shape().rows().to_vec(),
            score: score.points,
            level: score.level,
            lines: score.lines,
            rows_remaining: score.rows_remaining,
            incoming_garbage: session.incoming_garbage(),
            clearing: matches!(session.state(), SessionState::Clearing { .. }),
            paused: session.is_paused(),
            game_over: session.is_game_over(),
        }
    }
}

impl SessionSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Snapshot of every player in a match plus the result so far
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSnapshot {
    pub players: Vec<SessionSnapshot>,
    pub outcome: MatchOutcome,
}

impl From<&MatchCoordinator> for MatchSnapshot {
    fn from(coordinator: &MatchCoordinator) -> Self {
        Self {
            players: coordinator.sessions().iter().map(SessionSnapshot::from).collect(),
            outcome: coordinator.outcome(),
        }
    }
}

impl MatchSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
