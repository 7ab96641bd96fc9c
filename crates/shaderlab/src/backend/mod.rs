//! The graphics primitives the core depends on.
//!
//! Handles are plain values owned by the caller; nothing here releases
//! anything implicitly. Scoped disposal lives one level up in
//! [`crate::compiler::CompiledUnit`] and [`crate::program::ProgramManager`].

pub mod gl;
pub mod headless;

use std::fmt;

use glam::{Vec2, Vec3, Vec4};

use crate::source::ShaderStage;

/// A host-side value written into a program uniform.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Vec3Array(Vec<Vec3>),
}

impl UniformValue {
    /// GLSL type name, used by the headless backend to type-check writes.
    pub fn glsl_type(&self) -> &'static str {
        match self {
            UniformValue::Float(_) => "float",
            UniformValue::Int(_) => "int",
            UniformValue::Vec2(_) => "vec2",
            UniformValue::Vec3(_) | UniformValue::Vec3Array(_) => "vec3",
            UniformValue::Vec4(_) => "vec4",
        }
    }
}

/// OpenGL-class shader/program API.
pub trait GraphicsBackend {
    type Shader: Copy + fmt::Debug;
    type Program: Copy + Eq + fmt::Debug;
    type UniformLocation: Clone + fmt::Debug;

    // --- Shader objects ---
    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    fn compile_shader(&self, shader: Self::Shader, source: &str);
    fn compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    // --- Program objects ---
    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);
    fn use_program(&self, program: Option<Self::Program>);

    // --- Interface queries and writes ---
    /// `None` when the program does not declare (or optimized away) `name`.
    fn uniform_location(&self, program: Self::Program, name: &str)
        -> Option<Self::UniformLocation>;
    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32>;
    /// Writes into the program currently bound with [`Self::use_program`].
    fn set_uniform(&self, location: &Self::UniformLocation, value: &UniformValue);
}
