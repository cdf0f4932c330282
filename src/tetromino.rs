//! Tetromino shape definitions and rotation
//!
//! Shapes are small rectangular matrices of cell tags: `0` is empty and
//! `1..=7` identifies the piece (and its color in the presentation layer).

use rand::Rng;

/// Largest tag a shape cell may carry
pub const MAX_SHAPE_TAG: u8 = 7;

/// An immutable rectangular matrix of cell tags
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    rows: Vec<Vec<u8>>,
}

impl Shape {
    /// Build a shape from its rows.
    ///
    /// Panics if the matrix is empty, ragged, or carries a tag above 7.
    pub fn new(rows: Vec<Vec<u8>>) -> Self {
        assert!(!rows.is_empty(), "shape must have at least one row");
        let width = rows[0].len();
        assert!(width > 0, "shape must have at least one column");
        for row in &rows {
            assert_eq!(row.len(), width, "shape rows must all have the same length");
            assert!(
                row.iter().all(|&tag| tag <= MAX_SHAPE_TAG),
                "shape tags must be in 0..=7"
            );
        }
        Self { rows }
    }

    pub fn width(&self) -> usize {
        self.rows[0].len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Tag at (row, col) inside the bounding box
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.rows[row][col]
    }

    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    /// Iterate over filled cells as (row, col, tag), relative to the top-left corner
    pub fn filled_cells(&self) -> impl Iterator<Item = (usize, usize, u8)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, tag)| **tag != 0)
                .map(move |(col, &tag)| (row, col, tag))
        })
    }

    /// Quarter turn counter-clockwise: the last column becomes the first row.
    pub fn rotated(&self) -> Shape {
        let (height, width) = (self.height(), self.width());
        let rows = (0..width)
            .map(|new_row| {
                let src_col = width - 1 - new_row;
                (0..height).map(|src_row| self.rows[src_row][src_col]).collect()
            })
            .collect();
        Shape { rows }
    }
}

/// The fixed set of shapes pieces are drawn from.
///
/// Built once and shared read-only between sessions.
#[derive(Debug, Clone)]
pub struct ShapeCatalog {
    shapes: Vec<Shape>,
}

impl Default for ShapeCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl ShapeCatalog {
    /// The seven standard tetrominoes, tagged 1..=7
    pub fn standard() -> Self {
        let shapes = vec![
            // T
            Shape::new(vec![vec![1, 1, 1], vec![0, 1, 0]]),
            // S
            Shape::new(vec![vec![0, 2, 2], vec![2, 2, 0]]),
            // Z
            Shape::new(vec![vec![3, 3, 0], vec![0, 3, 3]]),
            // J
            Shape::new(vec![vec![4, 0, 0], vec![4, 4, 4]]),
            // L
            Shape::new(vec![vec![0, 0, 5], vec![5, 5, 5]]),
            // I
            Shape::new(vec![vec![6, 6, 6, 6]]),
            // O
            Shape::new(vec![vec![7, 7], vec![7, 7]]),
        ];
        Self { shapes }
    }

    /// Build a catalog from a custom shape list (used for scripted puzzles)
    pub fn from_shapes(shapes: Vec<Shape>) -> Self {
        assert!(!shapes.is_empty(), "catalog needs at least one shape");
        Self { shapes }
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Uniform choice among the catalog shapes
    pub fn random_shape<R: Rng + ?Sized>(&self, rng: &mut R) -> Shape {
        let index = rng.gen_range(0..self.shapes.len());
        self.shapes[index].clone()
    }

    /// Rotate any shape a quarter turn
    pub fn rotate(shape: &Shape) -> Shape {
        shape.rotated()
    }
}
