//! Windowed host for the `shaderlab` core.
//!
//! Opens an OpenGL window, draws a full-screen quad with the active program
//! and maps keyboard and mouse input onto the harness: preset selection,
//! manual and automatic reloads, pointer and click uniforms.

pub mod app;
pub mod config;
pub mod controls;
pub mod presets;
pub mod renderer;
