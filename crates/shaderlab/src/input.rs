//! Viewport and pointer state fed into the frame uniforms.

use glam::{Vec2, Vec4};

/// Drawable size in pixels. Never zero in either dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    width: u32,
    height: u32,
}

impl Viewport {
    /// Clamps each dimension to at least one pixel (minimized windows report 0).
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

/// Cursor position in window pixels (origin top-left) and button state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    pub position: Vec2,
    pub down: bool,
}

impl PointerState {
    /// ShaderToy `iMouse`: y flipped to a bottom-left origin, and the click
    /// position in `zw` only while the button is held.
    pub fn shadertoy_mouse(&self, viewport: Viewport) -> Vec4 {
        let x = self.position.x;
        let y = viewport.height() as f32 - self.position.y;
        if self.down {
            Vec4::new(x, y, x, y)
        } else {
            Vec4::new(x, y, 0.0, 0.0)
        }
    }
}

/// The most recent pointer press.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClickState {
    /// In `[0, 1]`, origin bottom-left.
    pub position: Vec2,
    /// Seconds since the harness started.
    pub time: f32,
}

impl ClickState {
    pub fn at(x: f32, y: f32, time: f32, viewport: Viewport) -> Self {
        let size = viewport.size();
        Self {
            position: Vec2::new(x / size.x, 1.0 - y / size.y),
            time,
        }
    }
}
