//! Owns the GL context, the quad and the background texture, and draws one
//! frame with whatever program the harness has active.

pub mod context;
pub mod quad;
pub mod texture;

use self::{context::GfxContext, quad::Quad, texture::Texture};
use anyhow::Result;
use glow::HasContext;
use log::{info, trace, warn};
use shaderlab::{backend::gl::GlBackend, feed::BACKGROUND_UNIT, Attribute, Harness};
use std::{path::Path, time::Instant};

pub struct Renderer {
    pub quad: Quad,
    pub background: Option<Texture>,
    pub gfx: GfxContext,
}

impl Renderer {
    /// A background that fails to load is logged and left unbound.
    pub fn new(gfx: GfxContext, background: Option<&Path>) -> Result<Self> {
        let quad = Quad::new(&gfx.gl)?;

        let background = background.and_then(|path| match Texture::load(&gfx.gl, path) {
            Ok(texture) => {
                info!(
                    "Loaded background {} ({}x{})",
                    path.display(),
                    texture.width,
                    texture.height
                );
                Some(texture)
            }
            Err(err) => {
                warn!("Failed to load background texture: {err:#}");
                None
            }
        });

        Ok(Self {
            quad,
            background,
            gfx,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.gfx.resize(new_size);
    }

    pub fn render(&mut self, harness: &mut Harness<GlBackend>, now: Instant) -> Result<()> {
        let gl = self.gfx.gl.clone();
        unsafe {
            gl.clear_color(0.0, 0.0, 0.0, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT);
        }

        let frame = harness.render_frame(now)?;
        if let Some(bindings) = harness.bindings() {
            self.quad.bind_attributes(
                &gl,
                bindings.attribute_or_fallback(Attribute::Position),
                bindings.attribute_or_fallback(Attribute::TexCoord),
            );
        }
        if let Some(texture) = &self.background {
            texture.bind(&gl, BACKGROUND_UNIT as u32);
        }
        self.quad.draw(&gl);

        trace!(
            "Frame {}: {} uniforms written, {} absent",
            frame.frame,
            frame.written,
            frame.skipped
        );
        self.gfx.swap_buffers()
    }

    /// Releases GL objects while the context is still current.
    pub fn destroy(&mut self) {
        let gl = self.gfx.gl.clone();
        self.quad.destroy(&gl);
        if let Some(texture) = self.background.take() {
            texture.destroy(&gl);
        }
    }
}
