use crate::{
    config::Config,
    controls::Controls,
    presets::{self, Preset},
    renderer::{context::GfxContext, Renderer},
};
use anyhow::{Context, Result};
use log::{info, warn};
use shaderlab::{backend::gl::GlBackend, Dialect, Harness};
use std::time::Instant;
use winit::{
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::EventLoop,
    window::{Window, WindowId},
};

pub struct App {
    pub harness: Harness<GlBackend>,
    pub presets: Vec<Preset>,
    pub controls: Controls,
    // Dropped last: the harness deletes its program through this context.
    pub renderer: Renderer,
}

impl App {
    pub fn new(config: &Config, event_loop: &EventLoop<()>) -> Result<Self> {
        let dialect = config.dialect();
        let letters = dialect == Dialect::ShaderToy;

        let presets = presets::discover(&config.shader_dir, dialect);
        if presets.is_empty() {
            warn!("No shader presets found in '{}'", config.shader_dir.display());
        } else {
            info!("Shader key mappings:");
            for line in presets::describe(&presets, letters) {
                info!("  {line}");
            }
        }
        if letters {
            info!("  F5 -> reload, F6 -> toggle auto-reload, Esc -> quit");
        } else {
            info!("  R -> reload, A -> toggle auto-reload, Esc -> quit");
        }

        let sources = config.initial_sources(&presets)?;

        let gfx = GfxContext::new(
            event_loop,
            "shaderlab",
            PhysicalSize::new(config.width, config.height),
            config.vsync,
        )?;
        let mut settings = config.harness_settings(sources);
        settings.viewport = shaderlab::Viewport::new(gfx.size.width, gfx.size.height);

        let backend = GlBackend::new(gfx.gl.clone());
        let harness = Harness::new(backend, settings, Instant::now())
            .context("Failed to build the initial shader program")?;

        let renderer = Renderer::new(gfx, config.background.as_deref())?;

        Ok(Self {
            harness,
            presets,
            controls: Controls::new(letters),
            renderer,
        })
    }

    pub fn window(&self) -> &Window {
        &self.renderer.gfx.window
    }

    pub fn window_id(&self) -> WindowId {
        self.window().id()
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.renderer.resize(new_size);
            self.harness.on_resize(new_size.width, new_size.height);
            info!("Resized to {}x{}", new_size.width, new_size.height);
        }
    }

    /// Handles a window event. Returns `true` when the app should exit.
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        if let WindowEvent::Resized(physical_size) = event {
            self.resize(*physical_size);
        }
        self.controls
            .handle_event(event, &mut self.harness, &self.presets)
    }

    /// Runs a due auto-reload. Failures are logged by the program manager and
    /// the previous program keeps rendering.
    pub fn update(&mut self) {
        let _ = self.harness.tick(Instant::now());
    }

    pub fn render(&mut self) -> Result<()> {
        self.renderer.render(&mut self.harness, Instant::now())
    }

    pub fn shutdown(&mut self) {
        self.renderer.destroy();
    }
}
