//! Randomized depth-first carving at stride 2.
//!
//! Carved cells sit on odd coordinates; the even cell between two of them is
//! the wall that gets knocked out when the walk moves from one to the other.
//! The walk runs on an explicit stack so large grids cannot overflow the
//! call stack.

use std::collections::BTreeSet;
use std::num::NonZeroU32;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::grid::{Coord, Grid};

/// Steps to the four stride-2 neighbours, in enumeration order.
const STEPS: [(i32, i32); 4] = [(2, 0), (0, 2), (-2, 0), (0, -2)];

/// Decides the order in which a cell's neighbours are explored.
pub trait CandidateOrder {
    fn arrange(&mut self, candidates: &mut [Coord]);
}

/// Uniform shuffle driven by a seedable RNG.
#[derive(Debug, Clone)]
pub struct RandomOrder {
    rng: StdRng,
}

impl RandomOrder {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl CandidateOrder for RandomOrder {
    fn arrange(&mut self, candidates: &mut [Coord]) {
        candidates.shuffle(&mut self.rng);
    }
}

/// Keeps the enumeration order: `+x`, `+y`, `-x`, `-y`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedOrder;

impl CandidateOrder for FixedOrder {
    fn arrange(&mut self, _candidates: &mut [Coord]) {}
}

/// Whether the walk may step back into cells it has already carved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPolicy {
    /// Perfect maze: exactly one path between any two passages.
    Strict,
    /// A visited candidate is re-entered whenever the count of finished
    /// descents is a multiple of `modulus`, which opens extra connections.
    Braid { modulus: NonZeroU32 },
}

impl LoopPolicy {
    pub const DEFAULT_MODULUS: NonZeroU32 = match NonZeroU32::new(11) {
        Some(m) => m,
        None => unreachable!(),
    };

    pub fn braid(modulus: NonZeroU32) -> Self {
        Self::Braid { modulus }
    }

    fn admits_revisit(self, finished_descents: u64) -> bool {
        match self {
            Self::Strict => false,
            Self::Braid { modulus } => finished_descents % u64::from(modulus.get()) == 0,
        }
    }
}

impl Default for LoopPolicy {
    fn default() -> Self {
        Self::braid(Self::DEFAULT_MODULUS)
    }
}

struct Frame {
    cell: Coord,
    candidates: Vec<Coord>,
    next: usize,
}

/// Carves passages into a [`Grid`].
pub struct MazeGenerator<O = RandomOrder> {
    order: O,
    policy: LoopPolicy,
}

impl<O: CandidateOrder> MazeGenerator<O> {
    pub fn new(order: O, policy: LoopPolicy) -> Self {
        Self { order, policy }
    }

    pub fn policy(&self) -> LoopPolicy {
        self.policy
    }

    /// Carves `grid` in place starting from `start`.
    ///
    /// Candidates are filtered against the visited set when a cell is entered
    /// and re-checked when their turn comes, so a neighbour reached through
    /// another branch in the meantime is only re-entered if the loop policy
    /// allows it.
    pub fn generate(&mut self, grid: &mut Grid, start: Coord) {
        let mut visited = BTreeSet::new();
        let mut finished_descents: u64 = 0;
        let mut stack = vec![self.enter(grid, &mut visited, start)];

        while let Some(frame) = stack.last_mut() {
            let Some(&candidate) = frame.candidates.get(frame.next) else {
                stack.pop();
                if !stack.is_empty() {
                    finished_descents += 1;
                }
                continue;
            };
            frame.next += 1;
            let from = frame.cell;

            if visited.contains(&candidate) && !self.policy.admits_revisit(finished_descents) {
                continue;
            }

            grid.carve(from.midpoint(candidate));
            let child = self.enter(grid, &mut visited, candidate);
            stack.push(child);
        }

        log::debug!(
            "carved {}x{} grid: {} cells visited, {} descents",
            grid.width(),
            grid.height(),
            visited.len(),
            finished_descents
        );
    }

    fn enter(&mut self, grid: &mut Grid, visited: &mut BTreeSet<Coord>, cell: Coord) -> Frame {
        grid.carve(cell);
        visited.insert(cell);

        let mut candidates: Vec<Coord> = STEPS
            .iter()
            .map(|&(dx, dy)| cell.offset(dx, dy))
            .filter(|n| is_interior(grid, *n) && !visited.contains(n))
            .collect();
        self.order.arrange(&mut candidates);

        Frame {
            cell,
            candidates,
            next: 0,
        }
    }
}

fn is_interior(grid: &Grid, c: Coord) -> bool {
    c.x >= 1 && c.x <= grid.width() - 2 && c.y >= 1 && c.y <= grid.height() - 2
}

/// Forces the left-edge entrance and right-edge exit open.
///
/// Runs after carving and does not depend on whether the walk reached them.
pub fn open_entrance_and_exit(grid: &mut Grid) {
    let entrance = grid.entrance();
    let exit = grid.exit();
    grid.carve(entrance);
    grid.carve(exit);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(grid: &Grid) -> Vec<String> {
        grid.to_string().lines().map(str::to_owned).collect()
    }

    fn fixed(policy: LoopPolicy) -> Grid {
        let mut grid = Grid::new(5, 5);
        MazeGenerator::new(FixedOrder, policy).generate(&mut grid, Coord::new(1, 1));
        open_entrance_and_exit(&mut grid);
        grid
    }

    #[test]
    fn golden_five_by_five_strict() {
        let grid = fixed(LoopPolicy::Strict);
        assert_eq!(rows(&grid), ["#####", "    #", "### #", "#    ", "#####"]);
    }

    #[test]
    fn golden_five_by_five_braid_every_step() {
        let grid = fixed(LoopPolicy::braid(NonZeroU32::MIN));
        assert_eq!(rows(&grid), ["#####", "    #", "# # #", "#    ", "#####"]);
    }

    #[test]
    fn braid_with_large_modulus_matches_strict_on_small_grid() {
        // Only three descents finish before the revisit is considered.
        let modulus = NonZeroU32::new(2).unwrap();
        let braid = fixed(LoopPolicy::braid(modulus));
        let strict = fixed(LoopPolicy::Strict);
        assert_eq!(braid.to_string(), strict.to_string());
    }

    #[test]
    fn same_seed_same_maze() {
        let mut a = Grid::new(21, 15);
        let mut b = Grid::new(21, 15);
        MazeGenerator::new(RandomOrder::seeded(7), LoopPolicy::default())
            .generate(&mut a, Coord::new(1, 1));
        MazeGenerator::new(RandomOrder::seeded(7), LoopPolicy::default())
            .generate(&mut b, Coord::new(1, 1));
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn boundary_is_never_carved() {
        let mut grid = Grid::new(11, 9);
        MazeGenerator::new(RandomOrder::seeded(3), LoopPolicy::braid(NonZeroU32::MIN))
            .generate(&mut grid, Coord::new(1, 1));
        for x in 0..grid.width() {
            assert!(grid.is_wall(x, 0));
            assert!(grid.is_wall(x, grid.height() - 1));
        }
        for y in 0..grid.height() {
            assert!(grid.is_wall(0, y));
            assert!(grid.is_wall(grid.width() - 1, y));
        }
    }

    #[test]
    fn even_sizes_keep_last_row_and_column_solid() {
        let mut grid = Grid::new(8, 6);
        MazeGenerator::new(RandomOrder::seeded(11), LoopPolicy::Strict)
            .generate(&mut grid, Coord::new(1, 1));
        for y in 0..grid.height() {
            assert!(grid.is_wall(grid.width() - 2, y));
        }
        for x in 0..grid.width() {
            assert!(grid.is_wall(x, grid.height() - 2));
        }
    }

    #[test]
    fn grid_without_interior_only_carves_the_start() {
        let mut grid = Grid::new(3, 3);
        MazeGenerator::new(RandomOrder::seeded(1), LoopPolicy::Strict)
            .generate(&mut grid, Coord::new(1, 1));
        assert_eq!(grid.passage_count(), 1);
    }
}
