//! Ownership of the active program and the reload state machine.

use log::{error, info};

use crate::{
    backend::GraphicsBackend,
    bindings::{BindingRegistry, BindingSet},
    compiler::compile,
    error::{Result, ShaderError},
    linker::link,
    source::SourcePair,
};

/// A linked program and the sources it was built from.
#[derive(Debug, Clone)]
pub struct ShaderProgram<P> {
    handle: P,
    sources: SourcePair,
}

impl<P: Copy> ShaderProgram<P> {
    pub fn handle(&self) -> P {
        self.handle
    }

    pub fn sources(&self) -> &SourcePair {
        &self.sources
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    Uninitialized,
    Ready,
}

/// Owns the one active program and its bindings.
///
/// After the first successful [`initialize`](Self::initialize) there is always
/// a usable program: a reload either installs a fully linked replacement or
/// changes nothing.
pub struct ProgramManager<B: GraphicsBackend> {
    backend: B,
    state: ManagerState,
    active: Option<ShaderProgram<B::Program>>,
    registry: BindingRegistry<B>,
}

impl<B: GraphicsBackend> ProgramManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: ManagerState::Uninitialized,
            active: None,
            registry: BindingRegistry::new(),
        }
    }

    /// Builds the first program. A failure here leaves the manager
    /// uninitialized, and the host has nothing to render with.
    pub fn initialize(&mut self, sources: &SourcePair) -> Result<()> {
        let handle = build(&self.backend, sources)?;
        info!("Loaded shaders {sources}");
        self.install(handle, sources.clone());
        Ok(())
    }

    /// Re-reads `sources` and swaps the result in.
    ///
    /// Any failure is returned after releasing whatever was partially built;
    /// the active program and its bindings are untouched.
    pub fn reload(&mut self, sources: &SourcePair) -> Result<()> {
        if self.state == ManagerState::Uninitialized {
            return Err(ShaderError::NotInitialized);
        }

        match build(&self.backend, sources) {
            Ok(handle) => {
                info!("Reloaded shaders {sources}");
                self.install(handle, sources.clone());
                Ok(())
            }
            Err(err) => {
                error!("Reloading {sources} failed, keeping the previous program: {err}");
                Err(err)
            }
        }
    }

    fn install(&mut self, handle: B::Program, sources: SourcePair) {
        self.registry.refresh(&self.backend, handle);
        let previous = self.active.replace(ShaderProgram { handle, sources });
        if let Some(previous) = previous {
            self.backend.delete_program(previous.handle);
        }
        self.state = ManagerState::Ready;
    }

    pub fn active(&self) -> Option<&ShaderProgram<B::Program>> {
        self.active.as_ref()
    }

    /// Handle of the active program.
    pub fn active_program(&self) -> Option<B::Program> {
        self.active.as_ref().map(|p| p.handle)
    }

    /// Bindings of the active program.
    pub fn bindings(&self) -> Option<&BindingSet<B>> {
        self.registry.current()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn state(&self) -> ManagerState {
        self.state
    }
}

impl<B: GraphicsBackend> Drop for ProgramManager<B> {
    fn drop(&mut self) {
        self.registry.clear();
        if let Some(active) = self.active.take() {
            self.backend.use_program(None);
            self.backend.delete_program(active.handle);
        }
    }
}

fn build<B: GraphicsBackend>(backend: &B, sources: &SourcePair) -> Result<B::Program> {
    let (vertex, fragment) = sources.load()?;
    let vertex = compile(backend, &vertex)?;
    let fragment = compile(backend, &fragment)?;
    link(backend, vertex, fragment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{backend::headless::HeadlessBackend, bindings::Uniform, source::ShaderOrigin};

    fn inline(vs: &str, fs: &str) -> SourcePair {
        SourcePair::new(ShaderOrigin::inline(vs), ShaderOrigin::inline(fs))
    }

    const VS: &str = "in vec3 aPosition; void main() {}";

    #[test]
    fn reload_before_initialize_is_rejected() {
        let mut manager = ProgramManager::new(HeadlessBackend::new());
        let err = manager.reload(&inline(VS, "void main() {}")).unwrap_err();

        assert!(matches!(err, ShaderError::NotInitialized));
        assert_eq!(manager.state(), ManagerState::Uninitialized);
    }

    #[test]
    fn failed_initialize_stays_uninitialized() {
        let mut manager = ProgramManager::new(HeadlessBackend::new());
        assert!(manager.initialize(&inline(VS, "void main() {")).is_err());

        assert_eq!(manager.state(), ManagerState::Uninitialized);
        assert!(manager.active_program().is_none());
        assert_eq!(manager.backend().live_programs(), 0);
    }

    #[test]
    fn successful_reload_replaces_and_releases_the_old_program() {
        let mut manager = ProgramManager::new(HeadlessBackend::new());
        manager
            .initialize(&inline(VS, "uniform float iTime; void main() {}"))
            .unwrap();
        let old = manager.active_program().unwrap();

        manager
            .reload(&inline(VS, "uniform vec4 iMouse; void main() {}"))
            .unwrap();
        let new = manager.active_program().unwrap();

        assert_ne!(old, new);
        assert!(!manager.backend().is_live(old));
        assert_eq!(manager.backend().live_programs(), 1);
        assert_eq!(manager.backend().live_shaders(), 0);

        let bindings = manager.bindings().unwrap();
        assert_eq!(bindings.program(), new);
        assert!(bindings.is_present(Uniform::Mouse));
        assert!(!bindings.is_present(Uniform::Time));
    }

    #[test]
    fn failed_reload_keeps_program_and_bindings() {
        let mut manager = ProgramManager::new(HeadlessBackend::new());
        let good = inline(VS, "uniform float iTime; void main() {}");
        manager.initialize(&good).unwrap();
        let before = manager.active_program().unwrap();

        let err = manager
            .reload(&inline(VS, "uniform float iTime; void main() { iTime; "))
            .unwrap_err();

        assert!(matches!(err, ShaderError::CompileFailed { .. }));
        assert_eq!(manager.active_program(), Some(before));
        assert_eq!(manager.active().unwrap().sources(), &good);
        assert_eq!(manager.bindings().unwrap().program(), before);
        assert_eq!(manager.state(), ManagerState::Ready);
        assert_eq!(manager.backend().live_programs(), 1);
        assert_eq!(manager.backend().live_shaders(), 0);
    }

    #[test]
    fn failed_link_on_reload_keeps_program_and_bindings() {
        let mut manager = ProgramManager::new(HeadlessBackend::new());
        let good = inline(VS, "uniform float iTime; void main() {}");
        manager.initialize(&good).unwrap();
        let before = manager.active_program().unwrap();

        let err = manager
            .reload(&inline(
                "uniform vec2 iTime; in vec3 aPosition; void main() {}",
                "uniform float iTime; void main() {}",
            ))
            .unwrap_err();

        assert!(matches!(err, ShaderError::LinkFailed { .. }), "{err:?}");
        assert_eq!(manager.active_program(), Some(before));
        assert_eq!(manager.active().unwrap().sources(), &good);
        assert_eq!(manager.bindings().unwrap().program(), before);
        assert!(manager.bindings().unwrap().is_present(Uniform::Time));
        assert_eq!(manager.state(), ManagerState::Ready);
        assert_eq!(manager.backend().live_programs(), 1);
        assert_eq!(manager.backend().live_shaders(), 0);
    }
}
