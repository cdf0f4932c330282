//! Match coordination for single-player and two-player versus games
//!
//! In versus mode every lock that finds `n >= 2` full rows sends `n - 1`
//! garbage rows to the opponent. The first player to top out loses.

use std::sync::Arc;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::event::GameEvent;
use crate::game::PlayerSession;
use crate::input::Action;
use crate::settings::Settings;
use crate::snapshot::MatchSnapshot;
use crate::tetromino::ShapeCatalog;

/// Seat in a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    const SEATS: [PlayerId; 2] = [PlayerId::One, PlayerId::Two];

    fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }

    pub fn opponent(self) -> PlayerId {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }
}

/// Result of a match so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchOutcome {
    InProgress,
    Winner(PlayerId),
    /// Both players topped out on the same tick
    Draw,
}

/// Garbage rows sent for a lock that found `rows` full rows
pub fn garbage_for(rows: u32) -> u32 {
    rows.saturating_sub(1)
}

/// Owns the sessions of a match and routes garbage between them
#[derive(Debug, Clone)]
pub struct MatchCoordinator {
    sessions: Vec<PlayerSession>,
    outcome: MatchOutcome,
}

impl MatchCoordinator {
    /// One player, no garbage exchange
    pub fn single(settings: &Settings, seed: u64) -> Self {
        let catalog = Arc::new(ShapeCatalog::standard());
        Self::from_sessions(vec![PlayerSession::new(settings, catalog, seed)])
    }

    /// Two players sharing one shape catalog. Both session seeds derive from `seed`.
    pub fn versus(settings: &Settings, seed: u64) -> Self {
        let catalog = Arc::new(ShapeCatalog::standard());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let one = PlayerSession::new(settings, catalog.clone(), rng.r#gen());
        let two = PlayerSession::new(settings, catalog, rng.r#gen());
        Self::from_sessions(vec![one, two])
    }

    /// Wrap prepared sessions. Panics unless given one or two.
    pub fn from_sessions(sessions: Vec<PlayerSession>) -> Self {
        assert!(
            matches!(sessions.len(), 1 | 2),
            "a match has one or two sessions"
        );
        let mut coordinator = Self {
            sessions,
            outcome: MatchOutcome::InProgress,
        };
        coordinator.evaluate();
        coordinator
    }

    pub fn is_versus(&self) -> bool {
        self.sessions.len() == 2
    }

    pub fn sessions(&self) -> &[PlayerSession] {
        &self.sessions
    }

    /// Panics when asking for the second seat of a single-player match
    pub fn session(&self, player: PlayerId) -> &PlayerSession {
        &self.sessions[player.index()]
    }

    pub fn outcome(&self) -> MatchOutcome {
        self.outcome
    }

    pub fn score(&self, player: PlayerId) -> u64 {
        self.session(player).score().points
    }

    pub fn level(&self, player: PlayerId) -> u32 {
        self.session(player).score().level
    }

    pub fn is_game_over(&self, player: PlayerId) -> bool {
        self.session(player).is_game_over()
    }

    /// The match stops advancing once a result is known
    pub fn is_finished(&self) -> bool {
        self.outcome != MatchOutcome::InProgress
    }

    pub fn key_down(&mut self, player: PlayerId, action: Action) {
        if self.is_finished() {
            return;
        }
        self.sessions[player.index()].key_down(action);
        self.route_garbage(player);
        self.evaluate();
    }

    pub fn key_up(&mut self, player: PlayerId, action: Action) {
        self.sessions[player.index()].key_up(action);
    }

    pub fn toggle_pause(&mut self) {
        for session in &mut self.sessions {
            session.toggle_pause();
        }
    }

    /// Advance every session by one frame, in seat order
    pub fn tick(&mut self, dt: Duration) {
        if self.is_finished() {
            return;
        }
        for player in PlayerId::SEATS.into_iter().take(self.sessions.len()) {
            self.sessions[player.index()].tick(dt);
            self.route_garbage(player);
        }
        self.evaluate();
    }

    /// Forward rows found by `from`'s last lock to the other seat
    fn route_garbage(&mut self, from: PlayerId) {
        let Some(rows) = self.sessions[from.index()].take_cleared_rows() else {
            return;
        };
        if !self.is_versus() {
            return;
        }
        let garbage = garbage_for(rows);
        if garbage > 0 {
            debug!(?from, rows, garbage, "sending garbage");
            self.sessions[from.opponent().index()].enqueue_garbage(garbage);
        }
    }

    fn evaluate(&mut self) {
        if !self.is_versus() || self.is_finished() {
            return;
        }
        self.outcome = match (self.sessions[0].is_game_over(), self.sessions[1].is_game_over()) {
            (false, false) => return,
            (true, true) => MatchOutcome::Draw,
            (true, false) => MatchOutcome::Winner(PlayerId::Two),
            (false, true) => MatchOutcome::Winner(PlayerId::One),
        };
        info!(outcome = ?self.outcome, "match finished");
    }

    pub fn drain_events(&mut self, player: PlayerId) -> Vec<GameEvent> {
        self.sessions[player.index()].drain_events()
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot::from(self)
    }
}
