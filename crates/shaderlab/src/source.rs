//! Shader source retrieval.
//!
//! Sources are never cached between reloads: every [`SourcePair::load`] goes
//! back to the file system, which is how live edits become visible.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use crate::error::{Result, ShaderError};

/// One half of a shader pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn label(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where the text of a stage comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderOrigin {
    File(PathBuf),
    Inline(String),
}

impl ShaderOrigin {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        ShaderOrigin::File(path.into())
    }

    pub fn inline(text: impl Into<String>) -> Self {
        ShaderOrigin::Inline(text.into())
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            ShaderOrigin::File(path) => Some(path),
            ShaderOrigin::Inline(_) => None,
        }
    }

    fn read(&self) -> Result<String> {
        match self {
            ShaderOrigin::File(path) => {
                fs::read_to_string(path).map_err(|source| ShaderError::SourceUnreadable {
                    path: path.clone(),
                    source,
                })
            }
            ShaderOrigin::Inline(text) => Ok(text.clone()),
        }
    }
}

impl fmt::Display for ShaderOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderOrigin::File(path) => write!(f, "{}", path.display()),
            ShaderOrigin::Inline(text) => write!(f, "<inline, {} bytes>", text.len()),
        }
    }
}

/// How the fragment text of a pair should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Complete GLSL translation units for both stages.
    #[default]
    Glsl,
    /// The fragment text is a ShaderToy `mainImage` snippet that gets wrapped
    /// into a complete fragment shader declaring the `i*` globals.
    ShaderToy,
}

/// A stage's text, read once from its origin.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    stage: ShaderStage,
    origin: ShaderOrigin,
    text: String,
}

impl ShaderSource {
    /// Reads `origin` right now.
    pub fn read(stage: ShaderStage, origin: &ShaderOrigin) -> Result<Self> {
        Ok(Self {
            stage,
            origin: origin.clone(),
            text: origin.read()?,
        })
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn origin(&self) -> &ShaderOrigin {
        &self.origin
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// The vertex and fragment origins a program is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePair {
    pub vertex: ShaderOrigin,
    pub fragment: ShaderOrigin,
    pub dialect: Dialect,
}

impl SourcePair {
    pub fn new(vertex: ShaderOrigin, fragment: ShaderOrigin) -> Self {
        Self {
            vertex,
            fragment,
            dialect: Dialect::Glsl,
        }
    }

    pub fn from_files(vertex: impl Into<PathBuf>, fragment: impl Into<PathBuf>) -> Self {
        Self::new(ShaderOrigin::file(vertex), ShaderOrigin::file(fragment))
    }

    /// A ShaderToy snippet paired with the built-in pass-through vertex stage.
    pub fn shadertoy(fragment: ShaderOrigin) -> Self {
        Self {
            vertex: ShaderOrigin::inline(SHADERTOY_VERTEX),
            fragment,
            dialect: Dialect::ShaderToy,
        }
    }

    /// Reads both stages from their origins, applying the dialect's wrapping.
    pub fn load(&self) -> Result<(ShaderSource, ShaderSource)> {
        let vertex = ShaderSource::read(ShaderStage::Vertex, &self.vertex)?;
        let mut fragment = ShaderSource::read(ShaderStage::Fragment, &self.fragment)?;

        if self.dialect == Dialect::ShaderToy {
            fragment.text = wrap_shadertoy(&fragment.text);
        }

        Ok((vertex, fragment))
    }
}

impl fmt::Display for SourcePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} and {}", self.vertex, self.fragment)
    }
}

/// Pass-through vertex stage used for ShaderToy snippets.
pub const SHADERTOY_VERTEX: &str = r#"#version 330 core
layout (location = 0) in vec3 aPosition;
layout (location = 1) in vec2 aTexCoord;

out vec2 fragCoord;

void main()
{
    gl_Position = vec4(aPosition, 1.0);
    fragCoord = aTexCoord;
}
"#;

const SHADERTOY_HEADER: &str = r#"#version 330 core
in vec2 fragCoord;
out vec4 fragColor;

uniform vec3 iResolution;
uniform float iTime;
uniform float iTimeDelta;
uniform int iFrame;
uniform vec4 iMouse;

"#;

const SHADERTOY_FOOTER: &str = r#"

void main()
{
    mainImage(fragColor, fragCoord * iResolution.xy);
}
"#;

/// Wraps a `mainImage(out vec4, in vec2)` snippet into a full fragment shader.
pub fn wrap_shadertoy(snippet: &str) -> String {
    let mut wrapped =
        String::with_capacity(SHADERTOY_HEADER.len() + snippet.len() + SHADERTOY_FOOTER.len());
    wrapped.push_str(SHADERTOY_HEADER);
    wrapped.push_str(snippet);
    wrapped.push_str(SHADERTOY_FOOTER);
    wrapped
}
