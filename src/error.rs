use thiserror::Error;

/// Everything that can go wrong while configuring, generating or rendering a maze.
#[derive(Error, Debug)]
pub enum Error {
    #[error("maze of {width}x{height} cells is too small, both sides need at least {min} cells")]
    MazeTooSmall { width: i32, height: i32, min: i32 },

    #[error("clipping volume has zero extent along the {axis} axis")]
    DegenerateClippingVolume { axis: char },

    #[error("surface creation failed: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("GPU device creation failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("could not acquire the next frame: {0}")]
    SurfaceTexture(#[from] wgpu::SurfaceError),

    #[error("image loading failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_small_message_names_both_sides() {
        let err = Error::MazeTooSmall {
            width: 2,
            height: 9,
            min: 3,
        };
        assert_eq!(
            err.to_string(),
            "maze of 2x9 cells is too small, both sides need at least 3 cells"
        );
    }
}
