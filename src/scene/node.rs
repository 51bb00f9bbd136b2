use std::rc::Rc;

use glam::Mat4;

use super::context::RenderingContext;
use crate::geometry::Geometry;

/// A scene-graph node. Subtrees are shared through `Rc` and never mutated
/// while rendering, so the same node may hang under several groups.
pub enum Node {
    Group(Group),
    Geometry(GeometryNode),
}

impl Node {
    /// Draws this subtree. Leaves the context stacks exactly as it found them.
    pub fn render(&self, ctx: &mut RenderingContext) {
        match self {
            Node::Group(group) => group.render(ctx),
            Node::Geometry(leaf) => leaf.render(ctx),
        }
    }
}

impl From<Group> for Node {
    fn from(group: Group) -> Self {
        Node::Group(group)
    }
}

impl From<GeometryNode> for Node {
    fn from(leaf: GeometryNode) -> Self {
        Node::Geometry(leaf)
    }
}

/// Ordered children under one local transform.
#[derive(Default)]
pub struct Group {
    children: Vec<Rc<Node>>,
    transform: Mat4,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transform(transform: Mat4) -> Self {
        Self {
            children: Vec::new(),
            transform,
        }
    }

    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    pub fn add(&mut self, child: impl Into<Rc<Node>>) -> &mut Self {
        self.children.push(child.into());
        self
    }

    pub fn children(&self) -> &[Rc<Node>] {
        &self.children
    }

    /// Pushes the local transform, renders children in insertion order, pops.
    pub fn render(&self, ctx: &mut RenderingContext) {
        ctx.push(self.transform);
        for child in &self.children {
            child.render(ctx);
        }
        ctx.pop();
    }
}

/// Leaf that hands its geometry to whatever program the context has bound.
pub struct GeometryNode {
    geometry: Rc<Geometry>,
}

impl GeometryNode {
    pub fn new(geometry: Rc<Geometry>) -> Self {
        Self { geometry }
    }

    pub fn geometry(&self) -> &Rc<Geometry> {
        &self.geometry
    }

    pub fn render(&self, ctx: &mut RenderingContext) {
        let Some(program) = ctx.program().cloned() else {
            log::warn!("no program bound, skipping '{}'", self.geometry.label());
            return;
        };
        program.render(&self.geometry, ctx);
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::geometry::sprite_quad;
    use crate::program::testing::RecordingProgram;

    fn leaf(geometry: &Rc<Geometry>) -> Rc<Node> {
        Rc::new(GeometryNode::new(Rc::clone(geometry)).into())
    }

    #[test]
    fn group_renders_children_in_order_with_accumulated_transform() {
        let sprite = Rc::new(sprite_quad());
        let outer_t = Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0));
        let inner_t = Mat4::from_scale(Vec3::splat(3.0));

        let mut inner = Group::with_transform(inner_t);
        inner.add(leaf(&sprite));
        let mut outer = Group::with_transform(outer_t);
        outer.add(leaf(&sprite)).add(Rc::new(Node::from(inner)));

        let recorder = Rc::new(RecordingProgram::default());
        let mut ctx = RenderingContext::new();
        ctx.bind_program(recorder.clone());
        outer.render(&mut ctx);

        let draws = recorder.draws();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].mvp, outer_t);
        assert_eq!(draws[1].mvp, outer_t * inner_t);
        assert_eq!(draws[1].mv, outer_t * inner_t);
        assert_eq!(ctx.depth(), 1);
    }

    #[test]
    fn rendering_twice_gives_identical_matrices() {
        let sprite = Rc::new(sprite_quad());
        let mut root = Group::with_transform(Mat4::from_rotation_z(0.3));
        let mut child = Group::with_transform(Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)));
        child.add(leaf(&sprite));
        root.add(Rc::new(Node::from(child)));

        let recorder = Rc::new(RecordingProgram::default());
        let mut ctx = RenderingContext::new();
        ctx.bind_program(recorder.clone());

        root.render(&mut ctx);
        let first = (ctx.depth(), ctx.mvp(), ctx.mv());
        ctx.reset();
        root.render(&mut ctx);
        let second = (ctx.depth(), ctx.mvp(), ctx.mv());

        assert_eq!(first, second);
        let draws = recorder.draws();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].mvp, draws[1].mvp);
        assert_eq!(draws[0].mv, draws[1].mv);
    }

    #[test]
    fn shared_subtree_is_drawn_once_per_parent() {
        let sprite = Rc::new(sprite_quad());
        let shared = leaf(&sprite);
        let mut left = Group::with_transform(Mat4::from_translation(Vec3::NEG_X));
        left.add(Rc::clone(&shared));
        let mut right = Group::with_transform(Mat4::from_translation(Vec3::X));
        right.add(Rc::clone(&shared));
        let mut root = Group::new();
        root.add(Rc::new(Node::from(left)))
            .add(Rc::new(Node::from(right)));

        let recorder = Rc::new(RecordingProgram::default());
        let mut ctx = RenderingContext::new();
        ctx.bind_program(recorder.clone());
        root.render(&mut ctx);

        let draws = recorder.draws();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].mvp.w_axis.x, -1.0);
        assert_eq!(draws[1].mvp.w_axis.x, 1.0);
        assert!(Rc::ptr_eq(&draws[0].geometry, &draws[1].geometry));
    }

    #[test]
    fn leaf_without_program_draws_nothing() {
        let node: Node = GeometryNode::new(Rc::new(sprite_quad())).into();
        let mut ctx = RenderingContext::new();
        node.render(&mut ctx);
        assert_eq!(ctx.depth(), 1);
    }
}
