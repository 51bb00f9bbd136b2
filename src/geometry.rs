//! CPU-side triangle data and the builders that derive it from a maze grid.
//!
//! Every builder emits axis-aligned quads, four vertices and two triangles
//! each. Cell `(x, y)` covers the unit square `[x, x+1] x [y, y+1]`; the 3-D
//! variant extrudes walls from `z = 0` to `z = 1`.

use std::cell::OnceCell;

use glam::Vec3;

use crate::gpu::GpuContext;
use crate::maze::Grid;
use crate::mesh::{GpuMesh, Vertex3d};

/// Immutable triangle soup with a lazily uploaded GPU copy.
///
/// Geometry is shared between scene nodes through `Rc`, so the upload
/// happens at most once no matter how many nodes reference it.
#[derive(Debug)]
pub struct Geometry {
    label: String,
    vertices: Vec<Vertex3d>,
    indices: Vec<u32>,
    gpu: OnceCell<GpuMesh>,
}

impl Geometry {
    pub fn new(label: impl Into<String>, vertices: Vec<Vertex3d>, indices: Vec<u32>) -> Self {
        Self {
            label: label.into(),
            vertices,
            indices,
            gpu: OnceCell::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn vertices(&self) -> &[Vertex3d] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Axis-aligned bounds as `(min, max)`; `None` when there are no vertices.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut points = self.vertices.iter().map(|v| Vec3::from(v.position));
        let first = points.next()?;
        Some(points.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }

    /// The uploaded buffers, created on first use.
    pub fn gpu_mesh(&self, gpu: &GpuContext) -> &GpuMesh {
        self.gpu
            .get_or_init(|| GpuMesh::new(gpu, &self.label, &self.vertices, &self.indices))
    }
}

#[derive(Default)]
struct QuadBuilder {
    vertices: Vec<Vertex3d>,
    indices: Vec<u32>,
}

impl QuadBuilder {
    /// Corners go counter-clockwise when seen from the side `normal` points to.
    fn quad(&mut self, corners: [[f32; 3]; 4], normal: [f32; 3], uvs: [[f32; 2]; 4]) {
        let base = self.vertices.len() as u32;
        for (position, uv) in corners.into_iter().zip(uvs) {
            self.vertices.push(Vertex3d::new(position, normal, uv));
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    fn finish(self, label: &str) -> Geometry {
        Geometry::new(label, self.vertices, self.indices)
    }
}

const FACE_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Flat top-down view: one quad per wall cell on the `z = 0` plane.
pub struct MazeGeometry2d;

impl MazeGeometry2d {
    pub fn build(grid: &Grid) -> Geometry {
        let mut quads = QuadBuilder::default();
        for cell in grid.walls() {
            let (x, y) = (cell.coord.x as f32, cell.coord.y as f32);
            quads.quad(
                [
                    [x, y, 0.0],
                    [x + 1.0, y, 0.0],
                    [x + 1.0, y + 1.0, 0.0],
                    [x, y + 1.0, 0.0],
                ],
                [0.0, 0.0, 1.0],
                FACE_UVS,
            );
        }
        quads.finish("Maze 2D")
    }
}

/// Extruded view: a unit box per wall cell with one normal per face.
pub struct MazeGeometry3d;

impl MazeGeometry3d {
    pub fn build(grid: &Grid) -> Geometry {
        let mut quads = QuadBuilder::default();
        for cell in grid.walls() {
            let (x0, y0) = (cell.coord.x as f32, cell.coord.y as f32);
            let (x1, y1) = (x0 + 1.0, y0 + 1.0);

            // top
            quads.quad(
                [[x0, y0, 1.0], [x1, y0, 1.0], [x1, y1, 1.0], [x0, y1, 1.0]],
                [0.0, 0.0, 1.0],
                FACE_UVS,
            );
            // bottom
            quads.quad(
                [[x0, y0, 0.0], [x0, y1, 0.0], [x1, y1, 0.0], [x1, y0, 0.0]],
                [0.0, 0.0, -1.0],
                FACE_UVS,
            );
            // right
            quads.quad(
                [[x1, y0, 1.0], [x1, y0, 0.0], [x1, y1, 0.0], [x1, y1, 1.0]],
                [1.0, 0.0, 0.0],
                FACE_UVS,
            );
            // left
            quads.quad(
                [[x0, y0, 1.0], [x0, y1, 1.0], [x0, y1, 0.0], [x0, y0, 0.0]],
                [-1.0, 0.0, 0.0],
                FACE_UVS,
            );
            // front
            quads.quad(
                [[x0, y0, 1.0], [x0, y0, 0.0], [x1, y0, 0.0], [x1, y0, 1.0]],
                [0.0, -1.0, 0.0],
                FACE_UVS,
            );
            // back
            quads.quad(
                [[x0, y1, 1.0], [x1, y1, 1.0], [x1, y1, 0.0], [x0, y1, 0.0]],
                [0.0, 1.0, 0.0],
                FACE_UVS,
            );
        }
        quads.finish("Maze 3D")
    }
}

/// Unit square `[0, 1]^2` at `z = 0` for the hero sprite.
///
/// Texture rows run top to bottom while `y` grows upwards, so `v` is flipped.
pub fn sprite_quad() -> Geometry {
    let mut quads = QuadBuilder::default();
    quads.quad(
        [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ],
        [0.0, 0.0, 1.0],
        [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]],
    );
    quads.finish("Sprite")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::{Coord, Grid};

    fn l_shaped() -> Grid {
        // Three passages out of a 3x3 block leaves six walls.
        let mut grid = Grid::new(3, 3);
        grid.carve(Coord::new(1, 1));
        grid.carve(Coord::new(0, 1));
        grid.carve(Coord::new(1, 2));
        grid
    }

    #[test]
    fn flat_maze_has_one_quad_per_wall() {
        let geometry = MazeGeometry2d::build(&l_shaped());
        assert_eq!(geometry.vertices().len(), 6 * 4);
        assert_eq!(geometry.indices().len(), 6 * 6);
        assert_eq!(geometry.triangle_count(), 12);
        assert!(geometry.vertices().iter().all(|v| v.normal == [0.0, 0.0, 1.0]));
        assert!(geometry.vertices().iter().all(|v| v.position[2] == 0.0));
    }

    #[test]
    fn flat_quads_cover_their_cell() {
        let mut grid = Grid::new(3, 3);
        for y in 0..3 {
            for x in 0..3 {
                if (x, y) != (2, 0) {
                    grid.carve(Coord::new(x, y));
                }
            }
        }
        let geometry = MazeGeometry2d::build(&grid);
        let (min, max) = geometry.bounds().unwrap();
        assert_eq!(min, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(max, Vec3::new(3.0, 1.0, 0.0));
    }

    #[test]
    fn boxes_have_six_faces_with_outward_normals() {
        let mut grid = Grid::new(1, 1);
        let geometry = MazeGeometry3d::build(&grid);
        assert_eq!(geometry.vertices().len(), 24);
        assert_eq!(geometry.indices().len(), 36);

        let center = Vec3::splat(0.5);
        for face in geometry.vertices().chunks(4) {
            let normal = Vec3::from(face[0].normal);
            assert!(face.iter().all(|v| v.normal == face[0].normal));
            let face_center = face.iter().map(|v| Vec3::from(v.position)).sum::<Vec3>() / 4.0;
            assert!((face_center - center).dot(normal) > 0.0);
        }

        grid.carve(Coord::new(0, 0));
        assert!(MazeGeometry3d::build(&grid).is_empty());
    }

    #[test]
    fn quads_wind_counter_clockwise_around_their_normal() {
        let geometry = MazeGeometry3d::build(&Grid::new(1, 1));
        for tri in geometry.indices().chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| {
                let v = geometry.vertices()[i as usize];
                (Vec3::from(v.position), Vec3::from(v.normal))
            });
            assert!((b.0 - a.0).cross(c.0 - a.0).dot(a.1) > 0.0);
        }
    }

    #[test]
    fn sprite_is_a_textured_unit_square() {
        let sprite = sprite_quad();
        assert_eq!(sprite.vertices().len(), 4);
        assert_eq!(sprite.indices(), &[0, 1, 2, 2, 3, 0]);
        assert_eq!(sprite.vertices()[0].uv, [0.0, 1.0]);
        assert_eq!(sprite.vertices()[2].uv, [1.0, 0.0]);
        assert_eq!(
            sprite.bounds(),
            Some((Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0)))
        );
    }
}
