//! Scoring and level progression

use tracing::info;

/// Points awarded for clearing 1, 2, 3 or 4 rows in a single lock
pub const DEFAULT_CLEAR_POINTS: [u64; 4] = [100, 150, 400, 1000];
/// Rows needed per level
pub const DEFAULT_ROWS_PER_LEVEL: u32 = 10;

/// Rules feeding [`Score`], taken from settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRules {
    pub clear_points: Vec<u64>,
    pub rows_per_level: u32,
    pub soft_drop_points: u64,
    pub min_drop_interval: u32,
}

impl Default for ScoreRules {
    fn default() -> Self {
        Self {
            clear_points: DEFAULT_CLEAR_POINTS.to_vec(),
            rows_per_level: DEFAULT_ROWS_PER_LEVEL,
            soft_drop_points: 1,
            min_drop_interval: 1,
        }
    }
}

/// Score, level and gravity speed of one session
#[derive(Debug, Clone)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Current level
    pub level: u32,
    /// Total lines cleared
    pub lines: u32,
    /// Rows still needed before the next level
    pub rows_remaining: i32,
    /// Ticks between gravity steps
    pub drop_interval: u32,
    rules: ScoreRules,
}

impl Score {
    /// Panics on an empty point table or a zero rows-per-level count
    pub fn new(rules: ScoreRules, drop_interval: u32) -> Self {
        assert!(!rules.clear_points.is_empty(), "point table must not be empty");
        assert!(rules.rows_per_level > 0, "rows per level must be positive");
        Self {
            points: 0,
            level: 1,
            lines: 0,
            rows_remaining: rules.rows_per_level as i32,
            drop_interval: drop_interval.max(rules.min_drop_interval).max(1),
            rules,
        }
    }

    /// Points for clearing `rows` rows at once. Counts past the table use its last entry.
    pub fn clear_points(&self, rows: u32) -> u64 {
        match rows {
            0 => 0,
            n => {
                let index = (n as usize - 1).min(self.rules.clear_points.len() - 1);
                self.rules.clear_points[index]
            }
        }
    }

    /// Add points and level progress for a completed clear.
    /// Returns true if the level went up.
    pub fn add_clear(&mut self, rows: u32) -> bool {
        if rows == 0 {
            return false;
        }
        self.points += self.clear_points(rows);
        self.lines += rows;
        self.rows_remaining -= rows as i32;

        let mut leveled = false;
        while self.rows_remaining <= 0 {
            self.level += 1;
            self.rows_remaining += self.rules.rows_per_level as i32;
            self.drop_interval = self
                .drop_interval
                .saturating_sub(1)
                .max(self.rules.min_drop_interval)
                .max(1);
            leveled = true;
            info!(level = self.level, drop_interval = self.drop_interval, "level up");
        }
        leveled
    }

    /// Add score for one tick of held soft drop
    pub fn add_soft_drop_tick(&mut self) {
        self.points += self.rules.soft_drop_points;
    }
}
