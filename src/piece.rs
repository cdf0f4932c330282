//! Active falling piece logic

use crate::board::Board;
use crate::tetromino::{Shape, ShapeCatalog};

/// A live piece: a shape and the grid offset of its bounding box's top-left corner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tetromino {
    shape: Shape,
    x: usize,
    y: usize,
}

impl Tetromino {
    /// Create a piece at the horizontal center of the top row
    pub fn spawn(shape: Shape, columns: usize) -> Self {
        assert!(shape.width() <= columns, "shape wider than the board");
        let x = (columns - shape.width()) / 2;
        Self { shape, x, y: 0 }
    }

    /// Create a piece at an explicit position
    pub fn at(shape: Shape, x: usize, y: usize) -> Self {
        Self { shape, x, y }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn x(&self) -> usize {
        self.x
    }

    pub fn y(&self) -> usize {
        self.y
    }

    /// Shift horizontally, clamped to the board. Returns true if the piece moved.
    pub fn move_by(&mut self, delta_x: i32, board: &mut Board) -> bool {
        let max_x = board.columns().saturating_sub(self.shape.width()) as i64;
        let new_x = (self.x as i64 + delta_x as i64).clamp(0, max_x) as usize;
        if new_x == self.x || board.check_collision(&self.shape, new_x, self.y) {
            return false;
        }
        self.x = new_x;
        true
    }

    /// Rotate a quarter turn, pulling the piece back from the right wall if needed.
    ///
    /// On rejection the shape and position stay unchanged.
    pub fn rotate(&mut self, board: &mut Board) -> bool {
        let new_shape = ShapeCatalog::rotate(&self.shape);
        let columns = board.columns();
        if new_shape.width() > columns {
            return false;
        }
        let mut new_x = self.x;
        if new_x + new_shape.width() >= columns {
            new_x = columns - new_shape.width();
        }
        if board.check_collision(&new_shape, new_x, self.y) {
            return false;
        }
        self.shape = new_shape;
        self.x = new_x;
        true
    }

    /// Try to move down one row, returns true if successful
    pub fn move_down(&mut self, board: &mut Board) -> bool {
        if board.check_collision(&self.shape, self.x, self.y + 1) {
            return false;
        }
        self.y += 1;
        true
    }

    /// Try to move up one row, used when garbage lifts the stack under the piece
    pub fn move_up(&mut self, board: &Board) -> bool {
        if self.y == 0 || board.collides(&self.shape, self.x, self.y - 1) {
            return false;
        }
        self.y -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t_shape() -> Shape {
        Shape::new(vec![vec![1, 1, 1], vec![0, 1, 0]])
    }

    fn i_shape() -> Shape {
        Shape::new(vec![vec![6, 6, 6, 6]])
    }

    #[test]
    fn test_spawn_position() {
        assert_eq!(Tetromino::spawn(t_shape(), 10).x(), 3);
        assert_eq!(Tetromino::spawn(i_shape(), 10).x(), 3);
        assert_eq!(Tetromino::spawn(Shape::new(vec![vec![7, 7], vec![7, 7]]), 10).x(), 4);
        assert_eq!(Tetromino::spawn(t_shape(), 10).y(), 0);
    }

    #[test]
    fn test_move_is_clamped_to_walls() {
        let mut board = Board::default();
        let mut piece = Tetromino::at(t_shape(), 1, 0);
        assert!(piece.move_by(-5, &mut board));
        assert_eq!(piece.x(), 0);
        assert!(!piece.move_by(-1, &mut board));
        assert!(piece.move_by(20, &mut board));
        assert_eq!(piece.x(), 7);
    }

    #[test]
    fn test_move_blocked_by_stack() {
        let mut tags = vec![vec![0; 10]; 25];
        tags[0][6] = 8;
        let mut board = Board::from_tags(tags, 0);
        let mut piece = Tetromino::at(t_shape(), 3, 0);
        assert!(!piece.move_by(1, &mut board));
        assert_eq!(piece.x(), 3);
    }

    #[test]
    fn test_rotate_pulls_back_from_right_wall() {
        let mut board = Board::default();
        // Vertical I at the right wall becomes horizontal
        let mut piece = Tetromino::at(i_shape().rotated(), 9, 5);
        assert!(piece.rotate(&mut board));
        assert_eq!(piece.shape().width(), 4);
        assert_eq!(piece.x(), 6);
    }

    #[test]
    fn test_rejected_rotation_keeps_state() {
        let mut tags = vec![vec![0; 10]; 25];
        tags[22][3] = 8;
        let mut board = Board::from_tags(tags, 0);
        let mut piece = Tetromino::at(i_shape(), 3, 21);
        let before = piece.clone();
        assert!(!piece.rotate(&mut board));
        assert_eq!(piece, before);
    }

    #[test]
    fn test_move_down_stops_at_floor() {
        let mut board = Board::default();
        let mut piece = Tetromino::at(t_shape(), 0, 22);
        assert!(piece.move_down(&mut board));
        assert!(!piece.move_down(&mut board));
        assert_eq!(piece.y(), 23);
    }

    #[test]
    fn test_move_up_respects_top() {
        let board = Board::default();
        let mut piece = Tetromino::at(t_shape(), 0, 1);
        assert!(piece.move_up(&board));
        assert!(!piece.move_up(&board));
    }
}
