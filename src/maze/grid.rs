use std::cmp::Ordering;
use std::fmt;

/// Integer cell coordinates. Ordered lexicographically by `x`, then `y`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The cell halfway between `self` and `other`.
    pub fn midpoint(self, other: Coord) -> Coord {
        Coord::new((self.x + other.x) / 2, (self.y + other.y) / 2)
    }

    pub fn offset(self, dx: i32, dy: i32) -> Coord {
        Coord::new(self.x + dx, self.y + dy)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Coord::new(x, y)
    }
}

/// One square of the maze lattice.
///
/// Two cells compare equal when they sit at the same coordinates; the wall
/// flag takes no part in identity or ordering.
#[derive(Clone, Copy, Debug)]
pub struct Cell {
    pub coord: Coord,
    pub wall: bool,
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.coord == other.coord
    }
}

impl Eq for Cell {}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        self.coord.cmp(&other.coord)
    }
}

/// A `width * height` lattice of cells stored row-major (`x + y * width`).
///
/// A fresh grid is solid wall everywhere. Carving happens through
/// [`MazeGenerator`](super::MazeGenerator); afterwards the grid is only read.
#[derive(Clone, Debug)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a solid grid. Negative sizes are treated as zero.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let mut cells = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(Cell {
                    coord: Coord::new(x, y),
                    wall: true,
                });
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.x >= 0 && coord.x < self.width && coord.y >= 0 && coord.y < self.height
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        self.contains(coord)
            .then(|| (coord.x + coord.y * self.width) as usize)
    }

    pub fn cell(&self, coord: Coord) -> Option<&Cell> {
        self.index(coord).map(|i| &self.cells[i])
    }

    /// Turns the cell at `coord` into a passage. Out-of-range coordinates are ignored.
    pub fn carve(&mut self, coord: Coord) {
        if let Some(i) = self.index(coord) {
            self.cells[i].wall = false;
        }
    }

    /// Whether `(x, y)` blocks movement. Anything outside the grid is a wall.
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.cell(Coord::new(x, y)).is_none_or(|c| c.wall)
    }

    /// Continuous-space variant of [`is_wall`](Self::is_wall); the point is
    /// floored onto the cell that contains it.
    pub fn is_wall_at(&self, x: f32, y: f32) -> bool {
        self.is_wall(x.floor() as i32, y.floor() as i32)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn walls(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|c| c.wall)
    }

    pub fn passage_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.wall).count()
    }

    /// The lowest passage in column `x`, scanning upwards from `y = 0`.
    pub fn first_passage_in_column(&self, x: i32) -> Option<Coord> {
        (0..self.height)
            .map(|y| Coord::new(x, y))
            .find(|&c| !self.is_wall(c.x, c.y))
    }

    /// The opening on the left edge.
    pub fn entrance(&self) -> Coord {
        Coord::new(0, 1)
    }

    /// The opening on the right edge.
    pub fn exit(&self) -> Coord {
        Coord::new(self.width - 1, self.height - 2)
    }
}

/// Renders rows from `y = 0` downwards, `#` for walls and a space for passages.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                let symbol = if self.is_wall(x, y) { '#' } else { ' ' };
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
