//! # aMAZEing
//!
//! **Random mazes, a tiny scene graph and a wgpu viewer to walk them.**
//!
//! A maze is carved on a grid of wall cells by a randomized depth-first walk
//! that may break into already-open cells now and then, leaving loops. The
//! grid becomes geometry, geometry hangs in a scene graph, and a camera
//! renders the graph through a shader program.
//!
//! ```no_run
//! use amazing::maze::MazeConfig;
//! use amazing::{ViewMode, ViewerConfig};
//!
//! fn main() -> amazing::Result<()> {
//!     let maze = MazeConfig::new().size(31, 21).seed(7);
//!     amazing::run(ViewerConfig::new().maze(maze).mode(ViewMode::Play2d))
//! }
//! ```
//!
//! The maze model and scene graph are usable on their own, without a window:
//!
//! ```
//! use std::rc::Rc;
//! use amazing::maze::MazeConfig;
//! use amazing::scene::{GeometryNode, Node};
//! use amazing::MazeGeometry2d;
//!
//! let grid = MazeConfig::new().size(9, 9).seed(1).generate()?;
//! let walls = MazeGeometry2d::build(&grid);
//! assert_eq!(walls.triangle_count(), 2 * grid.walls().count());
//! let root = Node::from(GeometryNode::new(Rc::new(walls)));
//! # let _ = root;
//! # Ok::<(), amazing::Error>(())
//! ```

mod app;
mod color;
mod error;
mod geometry;
mod gpu;
mod input;
pub mod maze;
mod mesh;
pub mod play;
mod program;
pub mod scene;
mod texture;

pub use app::{ViewMode, ViewerConfig, run};
pub use color::Color;
pub use error::{Error, Result};
pub use geometry::{Geometry, MazeGeometry2d, MazeGeometry3d, sprite_quad};
pub use gpu::GpuContext;
pub use input::Input;
pub use mesh::{GpuMesh, Vertex3d};
pub use program::{DrawUniforms, Program, ProgramKind, ShaderProgram};
pub use texture::Texture;

// Re-export glam math types for convenience
pub use glam::{Mat4, Vec2, Vec3};
