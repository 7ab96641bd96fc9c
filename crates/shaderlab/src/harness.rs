//! The surface a host loop drives: input events, reload triggers and frames.

use std::time::{Duration, Instant};

use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    backend::GraphicsBackend,
    bindings::BindingSet,
    error::{Result, ShaderError},
    feed::{self, FeedReport, FrameInputs},
    input::{ClickState, PointerState, Viewport},
    program::ProgramManager,
    scheduler::{AutoReloadScheduler, DEFAULT_RELOAD_INTERVAL},
    shapes::{self, ProceduralShape, DEFAULT_SHAPE_COUNT},
    source::SourcePair,
};

/// Explicit configuration of a [`Harness`].
#[derive(Debug, Clone)]
pub struct HarnessSettings {
    pub sources: SourcePair,
    pub auto_reload: bool,
    pub reload_interval: Duration,
    pub viewport: Viewport,
    pub shape_count: usize,
    /// Seeds shape placement and the per-frame `random` value. `None` seeds
    /// from the OS.
    pub seed: Option<u64>,
}

impl HarnessSettings {
    pub fn new(sources: SourcePair) -> Self {
        Self {
            sources,
            auto_reload: false,
            reload_interval: DEFAULT_RELOAD_INTERVAL,
            viewport: Viewport::default(),
            shape_count: DEFAULT_SHAPE_COUNT,
            seed: None,
        }
    }
}

/// What [`Harness::render_frame`] bound and wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderedFrame<P> {
    pub program: P,
    pub frame: u32,
    pub written: usize,
    pub skipped: usize,
}

pub struct Harness<B: GraphicsBackend> {
    manager: ProgramManager<B>,
    scheduler: AutoReloadScheduler,
    /// Target of `reload_current` and auto-reload. Follows every request,
    /// including failed ones, so fixing the file on disk is enough to recover.
    current: SourcePair,
    viewport: Viewport,
    pointer: PointerState,
    click: ClickState,
    shapes: Vec<ProceduralShape>,
    rng: StdRng,
    start: Instant,
    last_frame: Option<Instant>,
    frame: u32,
}

impl<B: GraphicsBackend> Harness<B> {
    /// Builds the initial program from `settings.sources`. An error here is
    /// fatal for the host.
    pub fn new(backend: B, settings: HarnessSettings, start: Instant) -> Result<Self> {
        let mut manager = ProgramManager::new(backend);
        manager.initialize(&settings.sources)?;

        let mut rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let shapes = shapes::scatter(settings.shape_count, settings.viewport, &mut rng);

        Ok(Self {
            manager,
            scheduler: AutoReloadScheduler::new(settings.auto_reload, settings.reload_interval),
            current: settings.sources,
            viewport: settings.viewport,
            pointer: PointerState::default(),
            click: ClickState::default(),
            shapes,
            rng,
            start,
            last_frame: None,
            frame: 0,
        })
    }

    // --- Reload triggers ---

    /// Switches to `sources`. On failure the previous program keeps
    /// rendering, but `sources` stays the reload target.
    pub fn request_reload(&mut self, sources: SourcePair) -> Result<()> {
        self.current = sources;
        self.manager.reload(&self.current)
    }

    /// Re-reads the current target from disk.
    pub fn reload_current(&mut self) -> Result<()> {
        self.manager.reload(&self.current)
    }

    pub fn toggle_auto_reload(&mut self) -> bool {
        let enabled = self.scheduler.toggle();
        info!("Auto reload {}", if enabled { "enabled" } else { "disabled" });
        enabled
    }

    /// Runs an auto-reload when one is due. `None` when nothing was attempted.
    pub fn tick(&mut self, now: Instant) -> Option<Result<()>> {
        let elapsed = now.saturating_duration_since(self.start);
        self.scheduler
            .tick(elapsed)
            .then(|| self.reload_current())
    }

    // --- Input ---

    pub fn on_pointer_down(&mut self, x: f32, y: f32, now: Instant) {
        let time = now.saturating_duration_since(self.start).as_secs_f32();
        self.pointer.position = glam::Vec2::new(x, y);
        self.pointer.down = true;
        self.click = ClickState::at(x, y, time, self.viewport);
    }

    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        self.pointer.position = glam::Vec2::new(x, y);
    }

    pub fn on_pointer_up(&mut self) {
        self.pointer.down = false;
    }

    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
    }

    // --- Rendering ---

    /// Binds the active program and writes this frame's uniforms. The host
    /// issues the draw call afterwards.
    pub fn render_frame(&mut self, now: Instant) -> Result<RenderedFrame<B::Program>> {
        let program = self
            .manager
            .active_program()
            .ok_or(ShaderError::NotInitialized)?;
        let bindings = self.manager.bindings().ok_or(ShaderError::NotInitialized)?;
        debug_assert_eq!(bindings.program(), program);

        let elapsed = now.saturating_duration_since(self.start);
        let delta = self
            .last_frame
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or_default();

        let uniforms = feed::compute(&FrameInputs {
            elapsed,
            delta,
            frame: self.frame,
            viewport: self.viewport,
            pointer: self.pointer,
            click: self.click,
            shapes: &self.shapes,
            random: self.rng.gen::<f32>(),
        });

        let backend = self.manager.backend();
        backend.use_program(Some(program));
        let FeedReport { written, skipped } = uniforms.push(backend, bindings);

        let rendered = RenderedFrame {
            program,
            frame: self.frame,
            written,
            skipped,
        };
        self.last_frame = Some(now);
        self.frame = self.frame.wrapping_add(1);
        Ok(rendered)
    }

    // --- Accessors ---

    pub fn active_program(&self) -> Option<B::Program> {
        self.manager.active_program()
    }

    pub fn bindings(&self) -> Option<&BindingSet<B>> {
        self.manager.bindings()
    }

    pub fn manager(&self) -> &ProgramManager<B> {
        &self.manager
    }

    pub fn backend(&self) -> &B {
        self.manager.backend()
    }

    pub fn current_sources(&self) -> &SourcePair {
        &self.current
    }

    pub fn auto_reload_enabled(&self) -> bool {
        self.scheduler.is_enabled()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn click(&self) -> ClickState {
        self.click
    }

    pub fn shapes(&self) -> &[ProceduralShape] {
        &self.shapes
    }
}
