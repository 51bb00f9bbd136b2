use std::rc::Rc;

use glam::{Mat4, Vec3};

use crate::color::Color;
use crate::program::Program;
use crate::texture::Texture;

/// Per-frame render state threaded through the scene graph.
///
/// Holds two matrix stacks that always have the same depth: `mvp`
/// accumulates projection, view and model transforms, `mv` the same
/// without the projection. Neither stack is ever empty; the base entry is
/// the identity.
pub struct RenderingContext {
    mvp_stack: Vec<Mat4>,
    mv_stack: Vec<Mat4>,
    /// Seconds since the viewer started.
    pub elapsed_time_seconds: f64,
    /// Duration of the previous frame in seconds.
    pub last_frame_time_seconds: f64,
    pub color: Color,
    /// Direction the light travels, in eye space.
    pub light_dir: Vec3,
    pub texture: Option<Rc<Texture>>,
    pub frame_count: u64,
    program: Option<Rc<dyn Program>>,
}

impl Default for RenderingContext {
    fn default() -> Self {
        Self {
            mvp_stack: vec![Mat4::IDENTITY],
            mv_stack: vec![Mat4::IDENTITY],
            elapsed_time_seconds: 0.0,
            last_frame_time_seconds: 0.0,
            color: Color::WHITE,
            light_dir: Vec3::new(-0.4, -0.5, -1.0).normalize(),
            texture: None,
            frame_count: 0,
            program: None,
        }
    }
}

impl RenderingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the mvp stack with `projection` as-is.
    ///
    /// The mv stack repeats its current top so both stacks stay the same
    /// depth and mv never sees the projection.
    pub fn projection(&mut self, projection: Mat4) {
        let mv = self.mv();
        self.mvp_stack.push(projection);
        self.mv_stack.push(mv);
    }

    /// Composes `transform` onto both stack tops.
    pub fn push(&mut self, transform: Mat4) {
        let mvp = self.mvp() * transform;
        let mv = self.mv() * transform;
        self.mvp_stack.push(mvp);
        self.mv_stack.push(mv);
    }

    /// Drops the top of both stacks. Popping the base entry is ignored.
    pub fn pop(&mut self) {
        if self.depth() == 1 {
            log::warn!("unbalanced pop on rendering context ignored");
            return;
        }
        self.mvp_stack.pop();
        self.mv_stack.pop();
    }

    /// Returns both stacks to the single-identity state.
    pub fn reset(&mut self) {
        self.mvp_stack.truncate(1);
        self.mv_stack.truncate(1);
        self.mvp_stack[0] = Mat4::IDENTITY;
        self.mv_stack[0] = Mat4::IDENTITY;
    }

    pub fn mvp(&self) -> Mat4 {
        self.mvp_stack.last().copied().unwrap_or(Mat4::IDENTITY)
    }

    pub fn mv(&self) -> Mat4 {
        self.mv_stack.last().copied().unwrap_or(Mat4::IDENTITY)
    }

    pub fn depth(&self) -> usize {
        self.mvp_stack.len()
    }

    pub fn bind_program(&mut self, program: Rc<dyn Program>) {
        self.program = Some(program);
    }

    pub fn program(&self) -> Option<&Rc<dyn Program>> {
        self.program.as_ref()
    }

    /// Advances the frame clock.
    pub fn tick(&mut self, elapsed_seconds: f64) {
        self.last_frame_time_seconds = (elapsed_seconds - self.elapsed_time_seconds).max(0.0);
        self.elapsed_time_seconds = elapsed_seconds;
        self.frame_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn starts_at_identity() {
        let ctx = RenderingContext::new();
        assert_eq!(ctx.depth(), 1);
        assert_eq!(ctx.mvp(), Mat4::IDENTITY);
        assert_eq!(ctx.mv(), Mat4::IDENTITY);
        assert!(ctx.program().is_none());
    }

    #[test]
    fn push_composes_on_the_right() {
        let mut ctx = RenderingContext::new();
        let a = Mat4::from_translation(Vec3::X);
        let b = Mat4::from_scale(Vec3::splat(2.0));
        ctx.push(a);
        ctx.push(b);
        assert_eq!(ctx.mvp(), a * b);
        assert_eq!(ctx.depth(), 3);
    }

    #[test]
    fn projection_is_kept_out_of_mv() {
        let mut ctx = RenderingContext::new();
        let proj = Mat4::orthographic_rh_gl(-1.0, 1.0, -1.0, 1.0, 0.1, 10.0);
        let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -3.0));
        ctx.projection(proj);
        ctx.push(view);
        assert_eq!(ctx.mvp(), proj * view);
        assert_eq!(ctx.mv(), view);
        assert_eq!(ctx.depth(), 3);
    }

    #[test]
    fn pop_at_base_is_ignored() {
        let mut ctx = RenderingContext::new();
        ctx.pop();
        assert_eq!(ctx.depth(), 1);
        assert_eq!(ctx.mvp(), Mat4::IDENTITY);
    }

    #[test]
    fn reset_restores_single_identity() {
        let mut ctx = RenderingContext::new();
        ctx.projection(Mat4::from_scale(Vec3::splat(3.0)));
        ctx.push(Mat4::from_translation(Vec3::Y));
        ctx.reset();
        assert_eq!(ctx.depth(), 1);
        assert_eq!(ctx.mvp(), Mat4::IDENTITY);
        assert_eq!(ctx.mv(), Mat4::IDENTITY);
    }

    #[test]
    fn tick_tracks_frame_delta() {
        let mut ctx = RenderingContext::new();
        ctx.tick(0.5);
        ctx.tick(0.75);
        assert_eq!(ctx.elapsed_time_seconds, 0.75);
        assert_eq!(ctx.last_frame_time_seconds, 0.25);
        assert_eq!(ctx.frame_count, 2);
    }

    fn transform() -> impl Strategy<Value = Mat4> {
        (
            prop::array::uniform3(-10.0f32..10.0),
            -3.0f32..3.0,
            0.1f32..4.0,
        )
            .prop_map(|(t, angle, scale)| {
                Mat4::from_translation(Vec3::from(t))
                    * Mat4::from_rotation_z(angle)
                    * Mat4::from_scale(Vec3::splat(scale))
            })
    }

    proptest! {
        #[test]
        fn balanced_push_pop_restores_state(
            prefix in prop::collection::vec(transform(), 0..4),
            balanced in prop::collection::vec(transform(), 0..16),
        ) {
            let mut ctx = RenderingContext::new();
            for m in &prefix {
                ctx.push(*m);
            }
            let (depth, mvp, mv) = (ctx.depth(), ctx.mvp(), ctx.mv());

            for m in &balanced {
                ctx.push(*m);
            }
            for _ in &balanced {
                ctx.pop();
            }

            prop_assert_eq!(ctx.depth(), depth);
            prop_assert_eq!(ctx.mvp(), mvp);
            prop_assert_eq!(ctx.mv(), mv);
        }
    }
}
