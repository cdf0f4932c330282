//! Player session: piece cycle, gravity, input repeat, scoring and game over
//!
//! A session moves through `Falling -> Clearing -> Falling` and ends in the
//! latched `GameOver` state when a freshly spawned piece has no room. Spawning
//! is instantaneous, so it does not appear as a state of its own.

use std::sync::Arc;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::board::Board;
use crate::event::GameEvent;
use crate::input::{Action, KeyRepeat};
use crate::piece::Tetromino;
use crate::score::Score;
use crate::settings::Settings;
use crate::snapshot::SessionSnapshot;
use crate::tetromino::{Shape, ShapeCatalog};

/// Events kept for a host that stops draining; older ones are dropped first
pub const MAX_BUFFERED_EVENTS: usize = 1024;

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// A piece is under player control
    Falling,
    /// Rows found at the last lock are being dismantled
    Clearing { rows: u32 },
    GameOver,
}

/// One player's game
#[derive(Debug, Clone)]
pub struct PlayerSession {
    board: Board,
    catalog: Arc<ShapeCatalog>,
    rng: ChaCha8Rng,
    current: Option<Tetromino>,
    next: Shape,
    state: SessionState,
    score: Score,
    keys: KeyRepeat,
    /// Ticks since the last gravity step
    drop_ticks: u32,
    paused: bool,
    /// Rows found at the last lock, not yet picked up by the coordinator
    unrouted_rows: Option<u32>,
    events: Vec<GameEvent>,
}

impl PlayerSession {
    /// Create a session on an empty board. The seed fixes the piece sequence
    /// and the garbage hole columns.
    pub fn new(settings: &Settings, catalog: Arc<ShapeCatalog>, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let board = Board::new(settings.board.rows, settings.board.columns, rng.r#gen())
            .with_garbage_period(settings.timing.garbage_period_ticks);
        Self::build(settings, catalog, board, rng)
    }

    /// Create a session on a prepared board
    pub fn with_board(settings: &Settings, catalog: Arc<ShapeCatalog>, board: Board, seed: u64) -> Self {
        Self::build(settings, catalog, board, ChaCha8Rng::seed_from_u64(seed))
    }

    fn build(settings: &Settings, catalog: Arc<ShapeCatalog>, board: Board, mut rng: ChaCha8Rng) -> Self {
        let next = catalog.random_shape(&mut rng);
        let mut session = Self {
            board,
            catalog,
            rng,
            current: None,
            next,
            state: SessionState::Falling,
            score: Score::new(settings.score_rules(), settings.timing.drop_interval_ticks),
            keys: settings.key_repeat(),
            drop_ticks: 0,
            paused: false,
            unrouted_rows: None,
            events: Vec::new(),
        };
        session.spawn();
        session
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn current_piece(&self) -> Option<&Tetromino> {
        self.current.as_ref()
    }

    pub fn next_shape(&self) -> &Shape {
        &self.next
    }

    pub fn incoming_garbage(&self) -> u32 {
        self.board.pending_garbage()
    }

    pub fn is_game_over(&self) -> bool {
        self.state == SessionState::GameOver
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause or resume. Held keys are released either way.
    pub fn toggle_pause(&mut self) {
        if self.is_game_over() {
            return;
        }
        self.paused = !self.paused;
        self.keys.clear();
        debug!(paused = self.paused, "pause toggled");
    }

    /// Promote the lookahead shape to the falling piece and draw a new lookahead
    fn spawn(&mut self) {
        let fresh = self.catalog.random_shape(&mut self.rng);
        let shape = std::mem::replace(&mut self.next, fresh);
        let piece = Tetromino::spawn(shape, self.board.columns());

        if self.board.check_collision(piece.shape(), piece.x(), piece.y()) {
            self.current = None;
            self.game_over();
            return;
        }

        self.current = Some(piece);
        self.state = SessionState::Falling;
        self.keys.reset_timers();
    }

    fn game_over(&mut self) {
        self.state = SessionState::GameOver;
        self.flush_board_events();
        self.events.push(GameEvent::GameOver);
        info!(score = self.score.points, level = self.score.level, "game over");
    }

    /// Handle a key press
    pub fn key_down(&mut self, action: Action) {
        if self.is_game_over() || self.paused {
            return;
        }
        if let Some(action) = self.keys.key_down(action) {
            self.perform(action);
        }
        self.flush_board_events();
    }

    /// Handle a key release
    pub fn key_up(&mut self, action: Action) {
        self.keys.key_up(action);
    }

    fn perform(&mut self, action: Action) {
        if self.state != SessionState::Falling {
            return;
        }
        match action {
            Action::MoveLeft => self.shift(-1),
            Action::MoveRight => self.shift(1),
            Action::Rotate => {
                if let Some(piece) = self.current.as_mut() {
                    piece.rotate(&mut self.board);
                }
            }
            Action::SoftDrop => self.gravity_step(),
        }
    }

    fn shift(&mut self, delta_x: i32) {
        if let Some(piece) = self.current.as_mut() {
            piece.move_by(delta_x, &mut self.board);
        }
    }

    /// Move the piece down one row, locking it if it cannot fall
    fn gravity_step(&mut self) {
        let Some(mut piece) = self.current.take() else {
            return;
        };
        if piece.move_down(&mut self.board) {
            self.current = Some(piece);
            return;
        }
        self.lock(piece);
    }

    fn lock(&mut self, piece: Tetromino) {
        self.board.lock(piece);
        let rows = self.board.scan_for_full_rows();
        if rows == 0 {
            self.spawn();
            return;
        }

        self.flush_board_events();
        self.events.push(GameEvent::LinesFound { count: rows });
        if rows == 4 {
            self.events.push(GameEvent::Tetris);
        }
        *self.unrouted_rows.get_or_insert(0) += rows;
        self.state = SessionState::Clearing { rows };
        debug!(rows, "rows found, clearing");
    }

    /// Apply score and level for a finished clear, then bring in the next piece
    fn finish_clear(&mut self, rows: u32) {
        let level_before = self.score.level;
        if self.score.add_clear(rows) {
            self.flush_board_events();
            for level in level_before + 1..=self.score.level {
                self.events.push(GameEvent::LevelUp { level });
            }
        }
        self.spawn();
    }

    /// Garbage lifted the stack; push the piece up out of it or top out
    fn lift_piece(&mut self) {
        let Some(piece) = self.current.as_mut() else {
            return;
        };
        if !self.board.collides(piece.shape(), piece.x(), piece.y()) {
            return;
        }
        if !piece.move_up(&self.board) {
            self.current = None;
            self.game_over();
        }
    }

    /// Advance the session by one frame
    pub fn tick(&mut self, dt: Duration) {
        if self.is_game_over() || self.paused {
            return;
        }

        if self.state == SessionState::Falling && self.keys.is_held(Action::SoftDrop) {
            self.score.add_soft_drop_tick();
        }
        for action in self.keys.update(dt) {
            self.perform(action);
        }

        if self.state == SessionState::Falling {
            self.drop_ticks += 1;
            if self.drop_ticks >= self.score.drop_interval {
                self.drop_ticks = 0;
                self.gravity_step();
            }
        }

        if let SessionState::Clearing { rows } = self.state {
            self.board.advance_clear_animation();
            if !self.board.has_pending_clear() {
                self.finish_clear(rows);
            }
        }

        if !self.is_game_over() && self.board.apply_garbage_step() {
            self.lift_piece();
        }

        self.flush_board_events();
    }

    /// Queue garbage rows on this session's board
    pub fn enqueue_garbage(&mut self, count: u32) {
        self.board.enqueue_garbage(count);
        self.flush_board_events();
    }

    /// Rows found by locks since the last call, for garbage routing
    pub fn take_cleared_rows(&mut self) -> Option<u32> {
        self.unrouted_rows.take()
    }

    fn flush_board_events(&mut self) {
        self.events.extend(self.board.drain_events());
        if self.events.len() > MAX_BUFFERED_EVENTS {
            let excess = self.events.len() - MAX_BUFFERED_EVENTS;
            self.events.drain(..excess);
        }
    }

    /// Take all buffered events. Hosts should drain once per frame: a resting
    /// piece reports [`GameEvent::CollisionBlocked`] on every gravity check,
    /// and only the newest [`MAX_BUFFERED_EVENTS`] are kept.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.flush_board_events();
        std::mem::take(&mut self.events)
    }

    /// Read-only view of everything a renderer needs
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::from(self)
    }
}
