//! Program assembly from two compiled stages.

use crate::{
    backend::GraphicsBackend,
    compiler::CompiledUnit,
    error::{Result, ShaderError},
};

/// Links `vertex` and `fragment` into a new program.
///
/// Both units are consumed: they are detached and deleted before this returns,
/// whatever the outcome. A program that fails to link is deleted too.
pub fn link<B: GraphicsBackend>(
    backend: &B,
    vertex: CompiledUnit<'_, B>,
    fragment: CompiledUnit<'_, B>,
) -> Result<B::Program> {
    let program = backend.create_program().map_err(ShaderError::Backend)?;

    backend.attach_shader(program, vertex.handle());
    backend.attach_shader(program, fragment.handle());
    backend.link_program(program);
    let linked = backend.link_status(program);
    let log = if linked {
        String::new()
    } else {
        backend.program_info_log(program)
    };

    backend.detach_shader(program, vertex.handle());
    backend.detach_shader(program, fragment.handle());
    drop(vertex);
    drop(fragment);

    if !linked {
        backend.delete_program(program);
        return Err(ShaderError::LinkFailed { log });
    }

    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::headless::HeadlessBackend,
        compiler::compile,
        source::{ShaderOrigin, ShaderSource, ShaderStage},
    };

    fn unit<'b>(
        backend: &'b HeadlessBackend,
        stage: ShaderStage,
        text: &str,
    ) -> CompiledUnit<'b, HeadlessBackend> {
        let source = ShaderSource::read(stage, &ShaderOrigin::inline(text)).unwrap();
        compile(backend, &source).unwrap()
    }

    #[test]
    fn successful_link_leaves_only_the_program() {
        let backend = HeadlessBackend::new();
        let vs = unit(&backend, ShaderStage::Vertex, "in vec3 aPosition; void main() {}");
        let fs = unit(&backend, ShaderStage::Fragment, "uniform float iTime; void main() {}");

        let program = link(&backend, vs, fs).unwrap();

        assert!(backend.link_status(program));
        assert_eq!(backend.live_shaders(), 0);
        assert_eq!(backend.live_programs(), 1);
        assert_eq!(backend.active_uniforms(program), vec!["iTime".to_owned()]);
    }

    #[test]
    fn failed_link_releases_everything() {
        let backend = HeadlessBackend::new();
        let vs = unit(&backend, ShaderStage::Vertex, "uniform vec2 p; void main() {}");
        let fs = unit(&backend, ShaderStage::Fragment, "uniform vec3 p; void main() {}");

        match link(&backend, vs, fs) {
            Err(ShaderError::LinkFailed { log }) => assert!(log.contains("`p`")),
            other => panic!("expected LinkFailed, got {other:?}"),
        }
        assert_eq!(backend.live_shaders(), 0);
        assert_eq!(backend.live_programs(), 0);
        assert!(backend.errors().is_empty());
    }
}
