use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use glam::{Mat4, Vec3};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::KeyCode;
use winit::window::{Window, WindowAttributes, WindowId};

use crate::color::Color;
use crate::error::{Error, Result};
use crate::geometry::{Geometry, MazeGeometry2d, MazeGeometry3d, sprite_quad};
use crate::gpu::GpuContext;
use crate::input::Input;
use crate::maze::{Grid, MazeConfig, START};
use crate::play::Actor;
use crate::program::{ProgramKind, ShaderProgram};
use crate::scene::{Camera, ClippingVolume, GeometryNode, Group, Node, RenderingContext};
use crate::texture::Texture;

/// Viewport divisor for the top-down clipping volume; cells come out half
/// this many pixels wide.
const PIXELS_PER_UNIT: f32 = 20.0;

/// Smallest maze reachable with `PageDown`.
const MIN_INTERACTIVE_SIDE: i32 = 5;

/// Cells added or removed per `PageUp`/`PageDown`, keeping odd sizes odd.
const SIZE_STEP: i32 = 2;

/// Degrees per second the showcase turns.
const SHOWCASE_SPIN: f32 = 20.0;

/// Longest frame step fed to the hero, so a stalled frame cannot fling it.
const MAX_FRAME_DT: f32 = 0.25;

/// Which picture of the maze the viewer draws.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewMode {
    /// Top-down walls with a steerable hero.
    #[default]
    Play2d,
    /// Flat-shaded wall boxes turning under a perspective camera.
    Showcase3d,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Play2d => ViewMode::Showcase3d,
            ViewMode::Showcase3d => ViewMode::Play2d,
        }
    }
}

/// Configuration for the viewer window and the maze it shows.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub maze: MazeConfig,
    pub mode: ViewMode,
    pub wall_color: Color,
    pub showcase_color: Color,
    /// Image for the hero sprite; the built-in smiley when `None`.
    pub hero_texture: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "aMAZEing".to_string(),
            width: 800,
            height: 600,
            maze: MazeConfig::default(),
            mode: ViewMode::default(),
            wall_color: Color::WALL,
            showcase_color: Color::rgb(0.0, 1.0, 0.0),
            hero_texture: None,
        }
    }
}

impl ViewerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn maze(mut self, maze: MazeConfig) -> Self {
        self.maze = maze;
        self
    }

    pub fn mode(mut self, mode: ViewMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn wall_color(mut self, color: Color) -> Self {
        self.wall_color = color;
        self
    }

    pub fn hero_texture(mut self, path: impl Into<PathBuf>) -> Self {
        self.hero_texture = Some(path.into());
        self
    }
}

/// Opens a window and runs the viewer until it is closed or `Escape` is
/// pressed.
///
/// The maze configuration is checked before any window is created.
/// Failures while setting up the GPU or loading the hero texture end the
/// event loop and are returned here.
pub fn run(config: ViewerConfig) -> Result<()> {
    config.maze.validate()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = MazeApp {
        state: AppState::Pending(config),
        error: None,
    };
    event_loop.run_app(&mut app)?;

    match app.error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct MazeApp {
    state: AppState,
    error: Option<Error>,
}

enum AppState {
    Pending(ViewerConfig),
    Running(Box<Viewer>),
    Stopped,
}

impl MazeApp {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: Error) {
        log::error!("{err}");
        self.error = Some(err);
        self.state = AppState::Stopped;
        event_loop.exit();
    }
}

impl ApplicationHandler for MazeApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !matches!(self.state, AppState::Pending(_)) {
            return;
        }
        let AppState::Pending(config) = std::mem::replace(&mut self.state, AppState::Stopped)
        else {
            return;
        };

        match Viewer::new(event_loop, config) {
            Ok(viewer) => {
                viewer.window.request_redraw();
                self.state = AppState::Running(Box::new(viewer));
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let AppState::Running(viewer) = &mut self.state else {
            return;
        };

        viewer.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                viewer.gpu.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                let result = viewer.update().and_then(|running| {
                    if running {
                        viewer.render()?;
                    }
                    Ok(running)
                });
                viewer.input.end_frame();
                match result {
                    Ok(true) => viewer.window.request_redraw(),
                    Ok(false) => event_loop.exit(),
                    Err(err) => self.fail(event_loop, err),
                }
            }
            _ => {}
        }
    }
}

/// Everything alive while the window is open.
struct Viewer {
    window: Arc<Window>,
    gpu: GpuContext,
    input: Input,
    maze_config: MazeConfig,
    mode: ViewMode,
    wall_color: Color,
    showcase_color: Color,
    grid: Grid,
    hero: Actor,
    maze_2d: Rc<Node>,
    maze_3d: Rc<Geometry>,
    sprite: Rc<Geometry>,
    hero_texture: Rc<Texture>,
    monochrome: Rc<ShaderProgram>,
    textured: Rc<ShaderProgram>,
    flat: Rc<ShaderProgram>,
    ctx: RenderingContext,
    start_time: Instant,
    last_frame: Instant,
}

impl Viewer {
    fn new(event_loop: &ActiveEventLoop, config: ViewerConfig) -> Result<Self> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));
        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = GpuContext::new(Arc::clone(&window))?;

        let hero_texture = match &config.hero_texture {
            Some(path) => Texture::from_file(&gpu, path)?,
            None => Texture::smiley(&gpu),
        };

        let grid = config.maze.generate()?;
        let (maze_2d, maze_3d) = maze_scene(&grid);

        Ok(Self {
            monochrome: Rc::new(ShaderProgram::new(&gpu, ProgramKind::Monochrome)),
            textured: Rc::new(ShaderProgram::new(&gpu, ProgramKind::Textured)),
            flat: Rc::new(ShaderProgram::new(&gpu, ProgramKind::FlatShading)),
            window,
            gpu,
            input: Input::new(),
            maze_config: config.maze,
            mode: config.mode,
            wall_color: config.wall_color,
            showcase_color: config.showcase_color,
            hero: Actor::new(START.x, START.y),
            grid,
            maze_2d,
            maze_3d,
            sprite: Rc::new(sprite_quad()),
            hero_texture: Rc::new(hero_texture),
            ctx: RenderingContext::new(),
            start_time: Instant::now(),
            last_frame: Instant::now(),
        })
    }

    /// Applies this frame's input. Returns `false` once the viewer should close.
    fn update(&mut self) -> Result<bool> {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32().min(MAX_FRAME_DT);
        self.last_frame = now;
        self.ctx.tick(self.start_time.elapsed().as_secs_f64());

        if self.input.key_pressed(KeyCode::Escape) {
            log::info!("escape pressed, closing");
            return Ok(false);
        }
        if self.input.key_pressed(KeyCode::Tab) {
            self.mode = self.mode.toggled();
            log::info!("switched to {:?}", self.mode);
        }
        if self.input.key_pressed(KeyCode::KeyN) {
            self.regenerate()?;
        }
        if self.input.key_pressed(KeyCode::PageUp) {
            self.maze_config = stepped_size(&self.maze_config, SIZE_STEP);
            self.regenerate()?;
        }
        if self.input.key_pressed(KeyCode::PageDown) {
            self.maze_config = stepped_size(&self.maze_config, -SIZE_STEP);
            self.regenerate()?;
        }

        if self.mode == ViewMode::Play2d {
            self.hero.advance(&self.grid, self.input.held_direction(), dt);
            if self.hero.reached_exit(&self.grid) {
                log::info!("exit reached after {:.1}s", self.ctx.elapsed_time_seconds);
                self.regenerate()?;
            }
        }
        Ok(true)
    }

    /// Carves a fresh maze and puts the hero back at the start. A fixed seed
    /// advances by one so every new maze differs yet stays reproducible.
    fn regenerate(&mut self) -> Result<()> {
        if let Some(seed) = &mut self.maze_config.seed {
            *seed = seed.wrapping_add(1);
        }
        self.grid = self.maze_config.generate()?;
        (self.maze_2d, self.maze_3d) = maze_scene(&self.grid);
        self.hero = Actor::new(START.x, START.y);
        Ok(())
    }

    /// Traverses the scene for the current mode, queueing draws on the
    /// programs, then flushes them into one render pass.
    fn record_draws(&mut self) -> Result<()> {
        let (width, height) = (self.gpu.width(), self.gpu.height());
        match self.mode {
            ViewMode::Play2d => {
                let mut camera = Camera::parallel(ClippingVolume::from_viewport(
                    width,
                    height,
                    PIXELS_PER_UNIT,
                )?);
                let center = self.hero.center();
                camera.set_position(Vec3::new(center.x, center.y, 0.0));

                self.ctx.color = self.wall_color;
                self.ctx.texture = None;
                camera.render(&self.maze_2d, &mut self.ctx, self.monochrome.clone());

                self.ctx.color = Color::WHITE;
                self.ctx.texture = Some(Rc::clone(&self.hero_texture));
                let hero = hero_node(Rc::clone(&self.sprite), &self.hero);
                camera.render(&hero, &mut self.ctx, self.textured.clone());
                self.ctx.texture = None;
            }
            ViewMode::Showcase3d => {
                let volume = ClippingVolume::perspective(45.0, self.gpu.aspect(), 0.1, 500.0)?;
                let mut camera = Camera::perspective(volume);
                let extent = self.grid.width().max(self.grid.height()) as f32;
                camera.set_position(Vec3::new(0.0, 0.0, extent * 1.6));

                self.ctx.color = self.showcase_color;
                self.ctx.light_dir = Vec3::new(-1.0, -1.0, -1.0).normalize();
                let angle = self.ctx.elapsed_time_seconds as f32 * SHOWCASE_SPIN;
                let root = showcase_node(Rc::clone(&self.maze_3d), &self.grid, angle);
                camera.render(&root, &mut self.ctx, self.flat.clone());
            }
        }
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        self.record_draws()?;

        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost, reconfiguring");
                self.gpu.reconfigure();
                self.discard_pending();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("timed out acquiring the next frame");
                self.discard_pending();
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Maze Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Maze Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(Color::FLOOR.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.gpu.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // Walls before the hero so the sprite's alpha blends over them.
            self.monochrome.flush(&self.gpu, &mut pass);
            self.flat.flush(&self.gpu, &mut pass);
            self.textured.flush(&self.gpu, &mut pass);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Drops draws queued for a frame that will never be presented.
    fn discard_pending(&self) {
        for program in [&self.monochrome, &self.textured, &self.flat] {
            program.clear();
        }
    }
}

/// Scene pieces that depend on the maze layout.
fn maze_scene(grid: &Grid) -> (Rc<Node>, Rc<Geometry>) {
    let walls = GeometryNode::new(Rc::new(MazeGeometry2d::build(grid)));
    (
        Rc::new(Node::from(walls)),
        Rc::new(MazeGeometry3d::build(grid)),
    )
}

/// The hero sprite scaled to the actor and lifted just above the floor.
fn hero_node(sprite: Rc<Geometry>, hero: &Actor) -> Node {
    let position = hero.position();
    let transform = Mat4::from_translation(Vec3::new(position.x, position.y, 0.1))
        * Mat4::from_scale(Vec3::new(hero.size(), hero.size(), 1.0));
    let mut group = Group::with_transform(transform);
    group.add(Node::from(GeometryNode::new(sprite)));
    group.into()
}

/// The wall boxes centred on the origin, tilted towards the camera and
/// turned `angle` degrees about the maze's vertical axis.
fn showcase_node(boxes: Rc<Geometry>, grid: &Grid, angle: f32) -> Node {
    let center = Vec3::new(grid.width() as f32 * 0.5, grid.height() as f32 * 0.5, 0.5);
    let transform = Mat4::from_rotation_x((-55.0f32).to_radians())
        * Mat4::from_rotation_z(angle.to_radians())
        * Mat4::from_translation(-center);
    let mut group = Group::with_transform(transform);
    group.add(Node::from(GeometryNode::new(boxes)));
    group.into()
}

/// `config` with both sides grown by `delta`, never below the interactive minimum.
fn stepped_size(config: &MazeConfig, delta: i32) -> MazeConfig {
    let width = (config.width + delta).max(MIN_INTERACTIVE_SIDE);
    let height = (config.height + delta).max(MIN_INTERACTIVE_SIDE);
    log::info!("maze size now {width}x{height}");
    config.clone().size(width, height)
}
