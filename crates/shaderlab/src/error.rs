use std::{io, path::PathBuf};

use thiserror::Error;

use crate::source::ShaderStage;

/// Everything that can go wrong while turning shader sources into a program.
///
/// All variants are recoverable during a reload: the previously active program
/// keeps rendering. Only a failure of the very first initialization leaves the
/// host without anything to draw with.
#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("failed to read shader source {}: {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{stage} shader failed to compile:\n{log}")]
    CompileFailed { stage: ShaderStage, log: String },

    #[error("program failed to link:\n{log}")]
    LinkFailed { log: String },

    /// The driver refused to create a shader or program object.
    #[error("graphics backend error: {0}")]
    Backend(String),

    #[error("no shader program has been initialized yet")]
    NotInitialized,
}

pub type Result<T, E = ShaderError> = std::result::Result<T, E>;
