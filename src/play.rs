//! The hero walking the maze in the top-down view.

use glam::Vec2;

use crate::maze::Grid;

/// Steering input for the hero. `None` stands still.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit step in grid space, `+y` being up.
    pub fn step(self) -> Vec2 {
        match self {
            Direction::None => Vec2::ZERO,
            Direction::Up => Vec2::Y,
            Direction::Down => Vec2::NEG_Y,
            Direction::Left => Vec2::NEG_X,
            Direction::Right => Vec2::X,
        }
    }
}

/// Keeps the hero's corners from touching the next cell when flush against a wall.
const CONTACT_EPSILON: f32 = 1e-4;

/// Longest single move, short enough that no cell can be skipped.
const MAX_SUBSTEP: f32 = 0.25;

/// A square body that slides through passages and stops at walls.
///
/// `position` is the lower-left corner; the body covers
/// `[position, position + size]` on both axes.
#[derive(Clone, Debug)]
pub struct Actor {
    position: Vec2,
    size: f32,
    /// Cells per second.
    speed: f32,
}

impl Actor {
    pub const DEFAULT_SIZE: f32 = 0.8;
    pub const DEFAULT_SPEED: f32 = 6.0;

    /// Places an actor centered in `cell`.
    pub fn new(cell_x: i32, cell_y: i32) -> Self {
        let size = Self::DEFAULT_SIZE;
        let inset = (1.0 - size) * 0.5;
        Self {
            position: Vec2::new(cell_x as f32 + inset, cell_y as f32 + inset),
            size,
            speed: Self::DEFAULT_SPEED,
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn center(&self) -> Vec2 {
        self.position + Vec2::splat(self.size * 0.5)
    }

    fn fits(&self, grid: &Grid, position: Vec2) -> bool {
        let far = self.size - CONTACT_EPSILON;
        [
            Vec2::ZERO,
            Vec2::new(far, 0.0),
            Vec2::new(0.0, far),
            Vec2::new(far, far),
        ]
        .into_iter()
        .all(|corner| {
            let p = position + corner;
            !grid.is_wall_at(p.x, p.y)
        })
    }

    /// Moves for `dt` seconds in `direction`. A blocked move stops flush
    /// against the wall instead of being dropped. Returns whether the actor
    /// moved at all.
    pub fn advance(&mut self, grid: &Grid, direction: Direction, dt: f32) -> bool {
        let distance = self.speed * dt;
        let heading = direction.step();
        if heading == Vec2::ZERO || distance <= 0.0 {
            return false;
        }

        let start = self.position;
        let substeps = (distance / MAX_SUBSTEP).ceil().max(1.0) as u32;
        let step = heading * (distance / substeps as f32);
        for _ in 0..substeps {
            if !self.nudge(grid, step) {
                break;
            }
        }
        self.position != start
    }

    /// One short move. On contact the leading edge is snapped to the
    /// boundary of the blocking cell and `false` is returned.
    fn nudge(&mut self, grid: &Grid, step: Vec2) -> bool {
        let target = self.position + step;
        if self.fits(grid, target) {
            self.position = target;
            return true;
        }

        let mut flush = target;
        if step.x > 0.0 {
            flush.x = (target.x + self.size).floor() - self.size;
        } else if step.x < 0.0 {
            flush.x = target.x.floor() + 1.0;
        }
        if step.y > 0.0 {
            flush.y = (target.y + self.size).floor() - self.size;
        } else if step.y < 0.0 {
            flush.y = target.y.floor() + 1.0;
        }

        if self.fits(grid, flush) {
            self.position = flush;
        }
        false
    }

    /// Whether the actor's center has reached the exit cell.
    pub fn reached_exit(&self, grid: &Grid) -> bool {
        let exit = grid.exit();
        let c = self.center();
        c.x.floor() as i32 >= exit.x && c.y.floor() as i32 == exit.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::{Coord, FixedOrder, MazeConfig};

    /// `#####` / `    #` / `### #` / `#    ` / `#####`, rows from y = 0.
    fn golden() -> Grid {
        MazeConfig::new()
            .size(5, 5)
            .strict()
            .generate_with(FixedOrder)
    }

    #[test]
    fn starts_centered_in_its_cell() {
        let actor = Actor::new(1, 1);
        assert!(actor.center().abs_diff_eq(Vec2::new(1.5, 1.5), 1e-6));
    }

    #[test]
    fn moves_through_passages() {
        let grid = golden();
        let start = Actor::new(1, 1).position();
        let mut actor = Actor::new(1, 1);
        assert!(actor.advance(&grid, Direction::Right, 0.1));
        assert!(actor.position().x > start.x);
        assert_eq!(actor.position().y, start.y);
    }

    #[test]
    fn stops_flush_against_walls() {
        let grid = golden();
        let mut actor = Actor::new(1, 1);
        // Straight up from (1, 1) is a wall.
        assert!(actor.advance(&grid, Direction::Up, 1.0));
        let top = actor.position().y + actor.size();
        assert!((top - 2.0).abs() < 1e-5);
        assert!(!actor.advance(&grid, Direction::Up, 0.1));
        assert!(!grid.is_wall_at(actor.center().x, actor.center().y));
    }

    #[test]
    fn never_enters_walls_while_wandering() {
        let grid = MazeConfig::new().size(15, 11).seed(5).generate().unwrap();
        let mut actor = Actor::new(1, 1);
        let dirs = [Direction::Right, Direction::Up, Direction::Left, Direction::Down];
        for i in 0..2000 {
            actor.advance(&grid, dirs[(i / 37) % 4], 1.0 / 60.0);
            let p = actor.position();
            let far = actor.size() - CONTACT_EPSILON;
            for (dx, dy) in [(0.0, 0.0), (far, 0.0), (0.0, far), (far, far)] {
                assert!(!grid.is_wall_at(p.x + dx, p.y + dy), "inside a wall at {p}");
            }
        }
    }

    #[test]
    fn standing_still_does_nothing() {
        let grid = golden();
        let mut actor = Actor::new(1, 1);
        assert!(!actor.advance(&grid, Direction::None, 1.0));
        assert_eq!(actor.position(), Actor::new(1, 1).position());
    }

    #[test]
    fn walking_the_golden_maze_reaches_the_exit() {
        let grid = golden();
        let mut actor = Actor::new(1, 1);
        let walk = |actor: &mut Actor, dir| {
            for _ in 0..60 {
                actor.advance(&grid, dir, 1.0 / 60.0);
            }
        };
        walk(&mut actor, Direction::Right);
        walk(&mut actor, Direction::Up);
        assert!(!actor.reached_exit(&grid));
        walk(&mut actor, Direction::Right);
        assert!(actor.reached_exit(&grid));
        assert_eq!(grid.exit(), Coord::new(4, 3));
    }
}
