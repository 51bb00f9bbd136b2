use std::path::Path;

use crate::error::Result;
use crate::gpu::GpuContext;

/// A GPU texture that can be bound to the textured program.
#[derive(Debug)]
pub struct Texture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Create a texture from raw RGBA data, rows top to bottom.
    pub fn from_rgba(gpu: &GpuContext, data: &[u8], width: u32, height: u32, label: &str) -> Self {
        use wgpu::util::DeviceExt;

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Sprites are tiny; keep texels sharp when scaled up.
        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{label} Sampler")),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            width,
            height,
        }
    }

    /// Load a texture from an image file.
    pub fn from_file(gpu: &GpuContext, path: &Path) -> Result<Self> {
        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();
        log::info!("loaded texture {} ({width}x{height})", path.display());
        Ok(Self::from_rgba(gpu, &img, width, height, &path.display().to_string()))
    }

    /// A single opaque white texel, bound when a draw has no texture.
    pub fn white(gpu: &GpuContext) -> Self {
        Self::from_rgba(gpu, &[255, 255, 255, 255], 1, 1, "White Texture")
    }

    /// The built-in hero sprite.
    pub fn smiley(gpu: &GpuContext) -> Self {
        let (data, size) = smiley_pixels(SMILEY_SIZE);
        Self::from_rgba(gpu, &data, size, size, "Smiley Texture")
    }
}

const SMILEY_SIZE: u32 = 32;

/// RGBA pixels of a yellow face with eyes and a grin on a transparent
/// background, rows top to bottom.
pub(crate) fn smiley_pixels(size: u32) -> (Vec<u8>, u32) {
    const FACE: [u8; 4] = [250, 210, 40, 255];
    const INK: [u8; 4] = [40, 25, 10, 255];
    const CLEAR: [u8; 4] = [0, 0, 0, 0];

    let mut data = Vec::with_capacity((size * size * 4) as usize);
    let s = size as f32;
    for py in 0..size {
        for px in 0..size {
            // Centered coordinates in [-1, 1], y up.
            let x = (px as f32 + 0.5) / s * 2.0 - 1.0;
            let y = 1.0 - (py as f32 + 0.5) / s * 2.0;
            let r = (x * x + y * y).sqrt();

            let eye = ((x.abs() - 0.35).powi(2) + (y - 0.3).powi(2)).sqrt() < 0.13;
            let mouth = y < -0.1 && (r - 0.55).abs() < 0.08;
            let rim = (r - 0.92).abs() < 0.06;

            let texel = if r > 0.98 {
                CLEAR
            } else if eye || mouth || rim {
                INK
            } else {
                FACE
            };
            data.extend_from_slice(&texel);
        }
    }
    (data, size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smiley_is_opaque_in_the_middle_and_clear_in_the_corners() {
        let (data, size) = smiley_pixels(32);
        assert_eq!(data.len(), (size * size * 4) as usize);
        let texel = |x: u32, y: u32| {
            let i = ((y * size + x) * 4) as usize;
            [data[i], data[i + 1], data[i + 2], data[i + 3]]
        };
        assert_eq!(texel(0, 0)[3], 0);
        assert_eq!(texel(size - 1, size - 1)[3], 0);
        assert_eq!(texel(size / 2, size / 2 - 4), [250, 210, 40, 255]);
    }
}
