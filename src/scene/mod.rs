//! Scene graph: transform groups, geometry leaves, the rendering context
//! that carries matrix stacks between them and the cameras that drive a pass.
//!
//! A frame is one call per camera:
//!
//! ```ignore
//! camera.render(&root, &mut ctx, program.clone());
//! ```
//!
//! The camera seeds the context with its projection, pushes its view,
//! binds the program and walks the tree. Groups push and pop their local
//! transform around their children; leaves ask the bound program to draw.

mod camera;
mod context;
mod node;

pub use camera::{Camera, ClippingVolume, Projection};
pub use context::RenderingContext;
pub use node::{GeometryNode, Group, Node};
