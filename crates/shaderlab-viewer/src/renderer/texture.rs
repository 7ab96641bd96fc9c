use std::path::Path;

use anyhow::{anyhow, Context, Result};
use glow::HasContext;
use image::RgbaImage;

/// Reads an image as RGBA8 with its first row at the bottom, the order
/// `glTexImage2D` expects.
pub fn load_rgba(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path).with_context(|| format!("Failed to decode {}", path.display()))?;
    Ok(image.flipv().into_rgba8())
}

/// A 2D texture sampled with linear filtering and repeat wrapping.
pub struct Texture {
    handle: glow::Texture,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    pub fn load(gl: &glow::Context, path: &Path) -> Result<Self> {
        let pixels = load_rgba(path)?;
        Self::upload(gl, &pixels)
    }

    pub fn upload(gl: &glow::Context, pixels: &RgbaImage) -> Result<Self> {
        let (width, height) = pixels.dimensions();
        unsafe {
            let handle = gl
                .create_texture()
                .map_err(|e| anyhow!("create_texture: {e}"))?;
            gl.bind_texture(glow::TEXTURE_2D, Some(handle));
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA8 as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                Some(pixels.as_raw().as_slice()),
            );
            gl.bind_texture(glow::TEXTURE_2D, None);

            Ok(Self {
                handle,
                width,
                height,
            })
        }
    }

    pub fn bind(&self, gl: &glow::Context, unit: u32) {
        unsafe {
            gl.active_texture(glow::TEXTURE0 + unit);
            gl.bind_texture(glow::TEXTURE_2D, Some(self.handle));
        }
    }

    pub fn destroy(&self, gl: &glow::Context) {
        unsafe { gl.delete_texture(self.handle) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_flipped_on_load() {
        let path = std::env::temp_dir().join(format!("shaderlab-texture-{}.png", std::process::id()));
        let mut source = RgbaImage::new(1, 2);
        source.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        source.put_pixel(0, 1, image::Rgba([0, 0, 255, 255]));
        source.save(&path).unwrap();

        let loaded = load_rgba(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded.dimensions(), (1, 2));
        assert_eq!(loaded.get_pixel(0, 0), &image::Rgba([0, 0, 255, 255]));
        assert_eq!(loaded.get_pixel(0, 1), &image::Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_rgba(Path::new("no/such/background.png")).unwrap_err();
        assert!(err.to_string().contains("background.png"));
    }
}
