use anyhow::{anyhow, Result};
use glow::HasContext;
use glutin::{
    config::{Config, ConfigTemplateBuilder, GlConfig},
    context::{ContextApi, ContextAttributesBuilder, PossiblyCurrentContext, Version},
    display::GetGlDisplay,
    prelude::*,
    surface::{Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface},
};
use glutin_winit::DisplayBuilder;
use log::{info, warn};
use raw_window_handle::HasRawWindowHandle;
use std::{ffi::CString, num::NonZeroU32, rc::Rc};
use winit::{
    dpi::PhysicalSize,
    event_loop::EventLoop,
    window::{Window, WindowBuilder},
};

/// Holds the window and the OpenGL 3.3 core context rendering into it.
pub struct GfxContext {
    // Dropped before the window they were created for.
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    pub gl: Rc<glow::Context>,
    pub size: PhysicalSize<u32>,
    pub window: Window,
}

impl GfxContext {
    /// Opens a window and makes a GL context current on it.
    pub fn new(
        event_loop: &EventLoop<()>,
        title: &str,
        size: PhysicalSize<u32>,
        vsync: bool,
    ) -> Result<Self> {
        let window_builder = WindowBuilder::new()
            .with_title(title)
            .with_inner_size(size);

        let template = ConfigTemplateBuilder::new().with_alpha_size(8).with_depth_size(0);
        let display_builder = DisplayBuilder::new().with_window_builder(Some(window_builder));

        let (window, gl_config) = display_builder
            .build(event_loop, template, pick_config)
            .map_err(|e| anyhow!("Failed to build GL display: {e}"))?;
        let window = window.ok_or_else(|| anyhow!("GL display did not create a window"))?;

        let raw_window_handle = window.raw_window_handle();
        let gl_display = gl_config.display();

        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .build(Some(raw_window_handle));
        let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
            .map_err(|e| anyhow!("Failed to create GL context: {e}"))?;

        let size = window.inner_size();
        let attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            raw_window_handle,
            non_zero(size.width),
            non_zero(size.height),
        );
        let surface = unsafe { gl_display.create_window_surface(&gl_config, &attrs) }
            .map_err(|e| anyhow!("Failed to create window surface: {e}"))?;

        let context = not_current
            .make_current(&surface)
            .map_err(|e| anyhow!("Failed to make GL context current: {e}"))?;

        let interval = if vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(e) = surface.set_swap_interval(&context, interval) {
            warn!("Could not set swap interval {interval:?}: {e}");
        }

        let gl = unsafe {
            glow::Context::from_loader_function(|symbol| match CString::new(symbol) {
                Ok(symbol) => gl_display.get_proc_address(&symbol),
                Err(_) => std::ptr::null(),
            })
        };
        info!(
            "OpenGL context ready: {} ({}x{}, vsync {})",
            unsafe { gl.get_parameter_string(glow::VERSION) },
            size.width,
            size.height,
            if vsync { "on" } else { "off" }
        );

        Ok(Self {
            surface,
            context,
            gl: Rc::new(gl),
            size,
            window,
        })
    }

    /// Resizes the surface and viewport when the window size changes.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.surface
                .resize(&self.context, non_zero(new_size.width), non_zero(new_size.height));
            unsafe {
                self.gl
                    .viewport(0, 0, new_size.width as i32, new_size.height as i32);
            }
        }
    }

    pub fn swap_buffers(&self) -> Result<()> {
        self.surface
            .swap_buffers(&self.context)
            .map_err(|e| anyhow!("Failed to swap buffers: {e}"))
    }
}

/// Prefers the config with the most samples.
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|a, b| if a.num_samples() > b.num_samples() { a } else { b })
        // glutin reports an error instead of offering an empty config list.
        .expect("GL display offered no configs")
}

fn non_zero(value: u32) -> NonZeroU32 {
    NonZeroU32::new(value).unwrap_or(NonZeroU32::MIN)
}
