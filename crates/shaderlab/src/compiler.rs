//! Single-stage compilation.

use log::debug;

use crate::{
    backend::GraphicsBackend,
    error::{Result, ShaderError},
    source::{ShaderSource, ShaderStage},
};

/// A successfully compiled shader object.
///
/// The shader object is deleted when the unit is dropped, so a unit never
/// outlives the linking step it was created for.
#[derive(Debug)]
pub struct CompiledUnit<'b, B: GraphicsBackend> {
    backend: &'b B,
    handle: B::Shader,
    stage: ShaderStage,
}

impl<'b, B: GraphicsBackend> CompiledUnit<'b, B> {
    pub fn handle(&self) -> B::Shader {
        self.handle
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl<B: GraphicsBackend> Drop for CompiledUnit<'_, B> {
    fn drop(&mut self) {
        self.backend.delete_shader(self.handle);
    }
}

/// Compiles `source` for its stage.
///
/// On failure the driver's info log is returned in
/// [`ShaderError::CompileFailed`] and the shader object is already gone.
pub fn compile<'b, B: GraphicsBackend>(
    backend: &'b B,
    source: &ShaderSource,
) -> Result<CompiledUnit<'b, B>> {
    let stage = source.stage();
    let handle = backend.create_shader(stage).map_err(ShaderError::Backend)?;

    // Owned from here on; dropping it deletes the object on every path.
    let unit = CompiledUnit {
        backend,
        handle,
        stage,
    };

    backend.compile_shader(handle, source.text());
    if !backend.compile_status(handle) {
        let log = backend.shader_info_log(handle);
        return Err(ShaderError::CompileFailed { stage, log });
    }

    debug!("Compiled {stage} shader from {}", source.origin());
    Ok(unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{backend::headless::HeadlessBackend, source::ShaderOrigin};

    fn source(stage: ShaderStage, text: &str) -> ShaderSource {
        ShaderSource::read(stage, &ShaderOrigin::inline(text)).unwrap()
    }

    #[test]
    fn compiled_unit_is_deleted_on_drop() {
        let backend = HeadlessBackend::new();
        let unit = compile(&backend, &source(ShaderStage::Vertex, "void main() {}")).unwrap();
        assert_eq!(unit.stage(), ShaderStage::Vertex);
        assert_eq!(backend.live_shaders(), 1);

        drop(unit);
        assert_eq!(backend.live_shaders(), 0);
        assert!(backend.errors().is_empty());
    }

    #[test]
    fn failed_compile_reports_stage_and_log_and_releases_object() {
        let backend = HeadlessBackend::new();
        let err = compile(&backend, &source(ShaderStage::Fragment, "void main() {"))
            .map(|_| ())
            .unwrap_err();

        match err {
            ShaderError::CompileFailed { stage, log } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(log.contains("error"));
            }
            other => panic!("expected CompileFailed, got {other:?}"),
        }
        assert_eq!(backend.live_shaders(), 0);
    }

    #[test]
    fn same_source_same_outcome() {
        let backend = HeadlessBackend::new();
        let bad = source(ShaderStage::Fragment, "#error nope\nvoid main() {}");
        let first = compile(&backend, &bad).map(|_| ()).unwrap_err().to_string();
        let second = compile(&backend, &bad).map(|_| ()).unwrap_err().to_string();
        assert_eq!(first, second);
    }
}
