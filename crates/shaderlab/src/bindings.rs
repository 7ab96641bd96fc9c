//! Uniform and attribute locations of the active program.
//!
//! Locations change identity whenever a program is relinked, so a
//! [`BindingSet`] is tied to the program it was queried from and the registry
//! replaces it wholesale after every successful reload.

use log::debug;

use crate::backend::GraphicsBackend;

/// Every uniform the harness knows how to feed, keyed by meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Uniform {
    /// Elapsed milliseconds.
    Millis,
    /// Elapsed seconds.
    Time,
    TimeDelta,
    Frame,
    Resolution,
    Mouse,
    /// Background sampler.
    Background,
    Palette,
    Shapes,
    Random,
    Aspect,
    FocalPoint,
    Phase,
    ClickPosition,
    ClickTime,
}

impl Uniform {
    pub const COUNT: usize = 15;

    pub const ALL: [Uniform; Self::COUNT] = [
        Uniform::Millis,
        Uniform::Time,
        Uniform::TimeDelta,
        Uniform::Frame,
        Uniform::Resolution,
        Uniform::Mouse,
        Uniform::Background,
        Uniform::Palette,
        Uniform::Shapes,
        Uniform::Random,
        Uniform::Aspect,
        Uniform::FocalPoint,
        Uniform::Phase,
        Uniform::ClickPosition,
        Uniform::ClickTime,
    ];

    /// The GLSL identifier shaders declare.
    pub fn name(self) -> &'static str {
        match self {
            Uniform::Millis => "millis",
            Uniform::Time => "iTime",
            Uniform::TimeDelta => "iTimeDelta",
            Uniform::Frame => "iFrame",
            Uniform::Resolution => "iResolution",
            Uniform::Mouse => "iMouse",
            Uniform::Background => "background",
            Uniform::Palette => "colors",
            Uniform::Shapes => "circles",
            Uniform::Random => "random",
            Uniform::Aspect => "aspect",
            Uniform::FocalPoint => "focalPoint",
            Uniform::Phase => "phase",
            Uniform::ClickPosition => "clickPos",
            Uniform::ClickTime => "clickTime",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Vertex inputs of the full-screen quad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Position,
    TexCoord,
}

impl Attribute {
    pub const COUNT: usize = 2;

    pub const ALL: [Attribute; Self::COUNT] = [Attribute::Position, Attribute::TexCoord];

    pub fn name(self) -> &'static str {
        match self {
            Attribute::Position => "aPosition",
            Attribute::TexCoord => "aTexCoord",
        }
    }

    /// Location used when the program does not report one, matching the
    /// `layout (location = N)` convention of the bundled shaders.
    pub fn fallback_location(self) -> u32 {
        match self {
            Attribute::Position => 0,
            Attribute::TexCoord => 1,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Locations queried from one program. Absent entries are `None`.
pub struct BindingSet<B: GraphicsBackend> {
    program: B::Program,
    uniforms: [Option<B::UniformLocation>; Uniform::COUNT],
    attributes: [Option<u32>; Attribute::COUNT],
}

impl<B: GraphicsBackend> BindingSet<B> {
    /// Queries every known name against `program`.
    pub fn query(backend: &B, program: B::Program) -> Self {
        Self {
            program,
            uniforms: std::array::from_fn(|i| {
                backend.uniform_location(program, Uniform::ALL[i].name())
            }),
            attributes: std::array::from_fn(|i| {
                backend.attrib_location(program, Attribute::ALL[i].name())
            }),
        }
    }

    /// The program these locations belong to.
    pub fn program(&self) -> B::Program {
        self.program
    }

    pub fn uniform(&self, uniform: Uniform) -> Option<&B::UniformLocation> {
        self.uniforms[uniform.index()].as_ref()
    }

    pub fn attribute(&self, attribute: Attribute) -> Option<u32> {
        self.attributes[attribute.index()]
    }

    /// The attribute location, or its conventional slot when absent.
    pub fn attribute_or_fallback(&self, attribute: Attribute) -> u32 {
        self.attribute(attribute)
            .unwrap_or_else(|| attribute.fallback_location())
    }

    pub fn is_present(&self, uniform: Uniform) -> bool {
        self.uniform(uniform).is_some()
    }

    pub fn present(&self) -> impl Iterator<Item = Uniform> + '_ {
        Uniform::ALL.into_iter().filter(|u| self.is_present(*u))
    }

    pub fn absent(&self) -> impl Iterator<Item = Uniform> + '_ {
        Uniform::ALL.into_iter().filter(|u| !self.is_present(*u))
    }
}

/// Holds the binding set of the active program.
pub struct BindingRegistry<B: GraphicsBackend> {
    current: Option<BindingSet<B>>,
}

impl<B: GraphicsBackend> Default for BindingRegistry<B> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<B: GraphicsBackend> BindingRegistry<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-queries everything against `program` and replaces the current set.
    pub fn refresh(&mut self, backend: &B, program: B::Program) {
        let set = BindingSet::query(backend, program);

        let absent: Vec<&str> = set.absent().map(Uniform::name).collect();
        if !absent.is_empty() {
            debug!("Program {program:?} does not use: {}", absent.join(", "));
        }
        for attribute in Attribute::ALL {
            if set.attribute(attribute).is_none() {
                debug!(
                    "Program {program:?} reports no location for {}, assuming {}",
                    attribute.name(),
                    attribute.fallback_location()
                );
            }
        }

        self.current = Some(set);
    }

    pub fn current(&self) -> Option<&BindingSet<B>> {
        self.current.as_ref()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
