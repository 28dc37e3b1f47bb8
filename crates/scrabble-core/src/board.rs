//! Game board representation: coordinates, tiles and bonus squares.
//!
//! This module contains:
//! - Board coordinates and placement directions
//! - Tiles with one-shot letter/word multipliers
//! - The 15x15 board and its standard bonus layout
//! - Neighbour and line queries used by validation and word resolution

use crate::letters::Letter;
use serde::{Deserialize, Serialize};

/// Width and height of the board
pub const BOARD_SIZE: usize = 15;

/// Largest valid coordinate on either axis
pub const BOARD_MAX: usize = BOARD_SIZE - 1;

/// Center square; the first word must cover it
pub const CENTER: Coord = Coord { x: 7, y: 7 };

/// A board position. `x` is the column, `y` is the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn in_bounds(&self) -> bool {
        self.x <= BOARD_MAX && self.y <= BOARD_MAX
    }

    /// Step forward along a direction, `None` past the board edge
    pub fn next(&self, direction: Direction) -> Option<Coord> {
        let (x, y) = match direction {
            Direction::Horizontal => (self.x + 1, self.y),
            Direction::Vertical => (self.x, self.y + 1),
        };
        let coord = Coord { x, y };
        coord.in_bounds().then_some(coord)
    }

    /// Step backward along a direction, `None` past the board edge
    pub fn prev(&self, direction: Direction) -> Option<Coord> {
        match direction {
            Direction::Horizontal => self.x.checked_sub(1).map(|x| Coord { x, y: self.y }),
            Direction::Vertical => self.y.checked_sub(1).map(|y| Coord { x: self.x, y }),
        }
    }

    /// The `offset`-th cell along a direction starting here
    pub fn offset(&self, direction: Direction, offset: usize) -> Coord {
        match direction {
            Direction::Horizontal => Coord {
                x: self.x + offset,
                y: self.y,
            },
            Direction::Vertical => Coord {
                x: self.x,
                y: self.y + offset,
            },
        }
    }

    /// Position of this coord along a direction's axis
    pub fn along(&self, direction: Direction) -> usize {
        match direction {
            Direction::Horizontal => self.x,
            Direction::Vertical => self.y,
        }
    }

    /// In-bounds orthogonal neighbours
    pub fn neighbours(&self) -> Vec<Coord> {
        let mut result = Vec::with_capacity(4);
        for direction in Direction::ALL {
            if let Some(c) = self.prev(direction) {
                result.push(c);
            }
            if let Some(c) = self.next(direction) {
                result.push(c);
            }
        }
        result
    }
}

/// Direction a word is laid out in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Horizontal,
    Vertical,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Horizontal, Direction::Vertical];

    pub fn perpendicular(&self) -> Direction {
        match self {
            Direction::Horizontal => Direction::Vertical,
            Direction::Vertical => Direction::Horizontal,
        }
    }
}

/// Which bonus layout a new board uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoardLayout {
    /// Classic double/triple letter and word squares
    #[default]
    Standard,
    /// Every square is 1x
    Plain,
}

/// A single square on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Letter placed here, if any
    pub letter: Option<Letter>,
    /// Letter multiplier (1, 2 or 3), reset to 1 once scored
    pub letter_multiplier: u32,
    /// Word multiplier (1, 2 or 3), reset to 1 once scored
    pub word_multiplier: u32,
}

impl Tile {
    pub fn plain() -> Self {
        Self::with_multipliers(1, 1)
    }

    pub fn with_multipliers(letter_multiplier: u32, word_multiplier: u32) -> Self {
        Self {
            letter: None,
            letter_multiplier,
            word_multiplier,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.letter.is_none()
    }

    /// Consume the bonus: both multipliers fire only once per game
    pub fn consume_bonus(&mut self) {
        self.letter_multiplier = 1;
        self.word_multiplier = 1;
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::plain()
    }
}

/// Multipliers of the standard layout at a coordinate, as (letter, word)
fn standard_multipliers(coord: Coord) -> (u32, u32) {
    let (mut x, mut y) = (coord.x, coord.y);
    if x % 7 == 0 && y % 7 == 0 {
        // Center is a double word; the other eight are triple words
        return if x == 7 && y == 7 { (1, 2) } else { (1, 3) };
    }

    // Fold into one octant: the layout is symmetric on both axes and the diagonal
    if x > 7 {
        x = BOARD_MAX - x;
    }
    if y > 7 {
        y = BOARD_MAX - y;
    }
    if y > x {
        std::mem::swap(&mut x, &mut y);
    }

    match (x, y) {
        (3, 0) | (6, 2) | (7, 3) | (6, 6) => (2, 1),
        (5, 1) | (5, 5) => (3, 1),
        (x, y) if x == y => (1, 2),
        _ => (1, 1),
    }
}

/// The 15x15 game board, indexed `grid[y][x]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    grid: Vec<Vec<Tile>>,
}

impl Board {
    /// Create a board with every multiplier at 1x
    pub fn new() -> Self {
        Self {
            grid: vec![vec![Tile::plain(); BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Create a board with the standard bonus squares
    pub fn standard() -> Self {
        let mut board = Self::new();
        for y in 0..BOARD_SIZE {
            for x in 0..BOARD_SIZE {
                let (lm, wm) = standard_multipliers(Coord { x, y });
                board.grid[y][x] = Tile::with_multipliers(lm, wm);
            }
        }
        board
    }

    pub fn with_layout(layout: BoardLayout) -> Self {
        match layout {
            BoardLayout::Standard => Self::standard(),
            BoardLayout::Plain => Self::new(),
        }
    }

    pub fn tile(&self, coord: Coord) -> Option<&Tile> {
        self.grid.get(coord.y)?.get(coord.x)
    }

    pub fn tile_mut(&mut self, coord: Coord) -> Option<&mut Tile> {
        self.grid.get_mut(coord.y)?.get_mut(coord.x)
    }

    /// Letter at a coordinate, `None` when empty or out of bounds
    pub fn letter_at(&self, coord: Coord) -> Option<Letter> {
        self.tile(coord).and_then(|t| t.letter)
    }

    pub fn is_occupied(&self, coord: Coord) -> bool {
        self.letter_at(coord).is_some()
    }

    /// Nothing has been played yet (the center is still free)
    pub fn is_empty(&self) -> bool {
        !self.is_occupied(CENTER)
    }

    /// Whether any orthogonal neighbour holds a letter
    pub fn has_neighbour(&self, coord: Coord) -> bool {
        coord.neighbours().into_iter().any(|c| self.is_occupied(c))
    }

    /// Write a letter to an empty square. Returns false if out of bounds or occupied.
    pub fn place(&mut self, coord: Coord, letter: Letter) -> bool {
        match self.tile_mut(coord) {
            Some(tile) if tile.is_empty() => {
                tile.letter = Some(letter);
                true
            }
            _ => false,
        }
    }

    /// Erase a letter, returning it. Only used to revert a placement.
    pub fn remove(&mut self, coord: Coord) -> Option<Letter> {
        self.tile_mut(coord).and_then(|t| t.letter.take())
    }

    /// All cells of a row (horizontal) or column (vertical)
    pub fn line(&self, direction: Direction, index: usize) -> Vec<Coord> {
        (0..BOARD_SIZE)
            .map(|i| match direction {
                Direction::Horizontal => Coord { x: i, y: index },
                Direction::Vertical => Coord { x: index, y: i },
            })
            .collect()
    }

    /// Number of letters on the board
    pub fn letter_count(&self) -> usize {
        self.grid
            .iter()
            .flatten()
            .filter(|t| t.letter.is_some())
            .count()
    }

    /// Render the board as text rows; `.` for empty squares
    pub fn to_rows(&self) -> Vec<String> {
        self.grid
            .iter()
            .map(|row| {
                row.iter()
                    .map(|t| t.letter.map(|l| l.ch).unwrap_or('.'))
                    .collect()
            })
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_plain_and_empty() {
        let board = Board::new();
        assert!(board.is_empty());
        assert_eq!(board.letter_count(), 0);
        for y in 0..BOARD_SIZE {
            for x in 0..BOARD_SIZE {
                let tile = board.tile(Coord::new(x, y)).unwrap();
                assert_eq!((tile.letter_multiplier, tile.word_multiplier), (1, 1));
            }
        }
    }

    #[test]
    fn test_standard_layout_bonus_counts() {
        let board = Board::standard();
        let mut counts = [[0; 4]; 4];
        for y in 0..BOARD_SIZE {
            for x in 0..BOARD_SIZE {
                let tile = board.tile(Coord::new(x, y)).unwrap();
                counts[tile.letter_multiplier as usize][tile.word_multiplier as usize] += 1;
            }
        }
        // 24 double letters, 12 triple letters, 17 double words (center included), 8 triple words
        assert_eq!(counts[2][1], 24);
        assert_eq!(counts[3][1], 12);
        assert_eq!(counts[1][2], 17);
        assert_eq!(counts[1][3], 8);
    }

    #[test]
    fn test_standard_layout_landmarks() {
        let board = Board::standard();
        let wm = |x, y| board.tile(Coord::new(x, y)).unwrap().word_multiplier;
        let lm = |x, y| board.tile(Coord::new(x, y)).unwrap().letter_multiplier;
        assert_eq!(wm(0, 0), 3);
        assert_eq!(wm(14, 7), 3);
        assert_eq!(wm(7, 7), 2);
        assert_eq!(wm(1, 1), 2);
        assert_eq!(lm(3, 0), 2);
        assert_eq!(lm(0, 3), 2);
        assert_eq!(lm(5, 1), 3);
        assert_eq!(lm(9, 9), 3);
    }

    #[test]
    fn test_coord_stepping_stops_at_edges() {
        let corner = Coord::new(0, 0);
        assert_eq!(corner.prev(Direction::Horizontal), None);
        assert_eq!(corner.prev(Direction::Vertical), None);
        assert_eq!(corner.neighbours().len(), 2);

        let edge = Coord::new(BOARD_MAX, 3);
        assert_eq!(edge.next(Direction::Horizontal), None);
        assert_eq!(edge.next(Direction::Vertical), Some(Coord::new(BOARD_MAX, 4)));
    }

    #[test]
    fn test_place_and_remove() {
        let mut board = Board::new();
        assert!(board.place(CENTER, Letter::new('a')));
        assert!(!board.place(CENTER, Letter::new('b')), "occupied square");
        assert!(!board.is_empty());
        assert!(board.has_neighbour(Coord::new(7, 8)));
        assert!(!board.has_neighbour(Coord::new(9, 9)));

        assert_eq!(board.remove(CENTER), Some(Letter::new('a')));
        assert!(board.is_empty());
    }

    #[test]
    fn test_consume_bonus_resets_multipliers() {
        let mut tile = Tile::with_multipliers(3, 2);
        tile.consume_bonus();
        assert_eq!((tile.letter_multiplier, tile.word_multiplier), (1, 1));
    }

    #[test]
    fn test_rows_show_placed_letters() {
        let mut board = Board::new();
        board.place(Coord::new(7, 7), Letter::new('m'));
        board.place(Coord::new(8, 7), Letter::new('a'));
        let rows = board.to_rows();
        assert_eq!(rows.len(), BOARD_SIZE);
        assert_eq!(rows[7], ".......MA......");
        assert_eq!(rows[0], "...............");
    }
}
