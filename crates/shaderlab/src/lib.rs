//! Shader program lifecycle and uniform-binding core for a live GLSL harness.
//!
//! This library provides:
//! - Compiling and linking GLSL stages into programs, with scoped disposal of
//!   the intermediate shader objects.
//! - A program manager that hot-swaps the active program and never leaves the
//!   host without a working one.
//! - A binding registry that re-queries every uniform/attribute location after
//!   each successful reload.
//! - An auto-reload scheduler and the per-frame uniform feed.
//!
//! The graphics API is reached only through [`backend::GraphicsBackend`];
//! [`backend::gl::GlBackend`] drives a real OpenGL context via `glow`, and
//! [`backend::headless::HeadlessBackend`] is a software stand-in for tests.

pub mod backend;
pub mod bindings;
pub mod compiler;
pub mod error;
pub mod feed;
pub mod harness;
pub mod input;
pub mod linker;
pub mod program;
pub mod scheduler;
pub mod shapes;
pub mod source;

// Re-export commonly used types for convenience.
pub use self::backend::{GraphicsBackend, UniformValue};
pub use self::bindings::{Attribute, BindingSet, Uniform};
pub use self::error::{Result, ShaderError};
pub use self::harness::{Harness, HarnessSettings, RenderedFrame};
pub use self::input::{ClickState, PointerState, Viewport};
pub use self::source::{Dialect, ShaderOrigin, ShaderSource, ShaderStage, SourcePair};
