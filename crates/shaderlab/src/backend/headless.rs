//! A software stand-in for an OpenGL driver.
//!
//! It does not compile GLSL. It checks a handful of structural rules (balanced
//! delimiters, a `main` entry point, `#error` directives), records the
//! `uniform`/`in`/`attribute` declarations of each stage, and hands out
//! locations on link. Every uniform write is recorded so callers can see
//! exactly what reached which program. The harness tests run against it, and
//! it can be used to dry-run shader sets on machines without a GPU.

use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
};

use super::{GraphicsBackend, UniformValue};
use crate::source::ShaderStage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeadlessShader(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeadlessProgram(u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessLocation {
    program: u32,
    index: u32,
    name: String,
}

impl HeadlessLocation {
    pub fn program(&self) -> HeadlessProgram {
        HeadlessProgram(self.program)
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A recorded `set_uniform` call.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformWrite {
    pub program: HeadlessProgram,
    pub name: String,
    pub value: UniformValue,
}

#[derive(Debug, Default)]
struct Interface {
    /// name -> GLSL type
    uniforms: BTreeMap<String, String>,
    /// name -> explicit `layout(location = N)`
    inputs: BTreeMap<String, Option<u32>>,
}

#[derive(Debug)]
struct ShaderObject {
    stage: ShaderStage,
    compiled: bool,
    log: String,
    interface: Interface,
}

#[derive(Debug, Default)]
struct ProgramObject {
    attached: Vec<u32>,
    linked: bool,
    log: String,
    /// name -> (type, location index)
    uniforms: HashMap<String, (String, u32)>,
    attributes: HashMap<String, u32>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u32,
    shaders: HashMap<u32, ShaderObject>,
    programs: HashMap<u32, ProgramObject>,
    current: Option<u32>,
    compiles: usize,
    writes: Vec<UniformWrite>,
    errors: Vec<String>,
}

impl State {
    fn alloc(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
pub struct HeadlessBackend {
    state: RefCell<State>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shader objects created and not yet deleted.
    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    /// Program objects created and not yet deleted.
    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn is_live(&self, program: HeadlessProgram) -> bool {
        self.state.borrow().programs.contains_key(&program.0)
    }

    /// Number of `compile_shader` calls so far.
    pub fn compile_count(&self) -> usize {
        self.state.borrow().compiles
    }

    pub fn current_program(&self) -> Option<HeadlessProgram> {
        self.state.borrow().current.map(HeadlessProgram)
    }

    /// Uniform names the linked `program` exposes, sorted.
    pub fn active_uniforms(&self, program: HeadlessProgram) -> Vec<String> {
        let state = self.state.borrow();
        let mut names: Vec<String> = state
            .programs
            .get(&program.0)
            .map(|p| p.uniforms.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Attribute names the linked `program` exposes, sorted.
    pub fn active_attributes(&self, program: HeadlessProgram) -> Vec<String> {
        let state = self.state.borrow();
        let mut names: Vec<String> = state
            .programs
            .get(&program.0)
            .map(|p| p.attributes.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    pub fn writes(&self) -> Vec<UniformWrite> {
        self.state.borrow().writes.clone()
    }

    pub fn take_writes(&self) -> Vec<UniformWrite> {
        std::mem::take(&mut self.state.borrow_mut().writes)
    }

    /// Misuse the driver would have flagged: writes to a program that is not
    /// bound, writes through a location of a deleted program, type mismatches.
    pub fn errors(&self) -> Vec<String> {
        self.state.borrow().errors.clone()
    }
}

impl GraphicsBackend for HeadlessBackend {
    type Shader = HeadlessShader;
    type Program = HeadlessProgram;
    type UniformLocation = HeadlessLocation;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        let mut state = self.state.borrow_mut();
        let id = state.alloc();
        state.shaders.insert(
            id,
            ShaderObject {
                stage,
                compiled: false,
                log: String::new(),
                interface: Interface::default(),
            },
        );
        Ok(HeadlessShader(id))
    }

    fn compile_shader(&self, shader: Self::Shader, source: &str) {
        let mut state = self.state.borrow_mut();
        state.compiles += 1;
        let Some(object) = state.shaders.get_mut(&shader.0) else {
            state.errors.push(format!("compile of deleted shader {}", shader.0));
            return;
        };

        let stripped = strip_comments(source);
        match check_structure(&stripped) {
            Ok(()) => {
                object.compiled = true;
                object.log.clear();
                object.interface = parse_interface(&stripped, object.stage);
            }
            Err(log) => {
                object.compiled = false;
                object.log = log;
                object.interface = Interface::default();
            }
        }
    }

    fn compile_status(&self, shader: Self::Shader) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader.0)
            .map(|s| s.compiled)
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader.0)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: Self::Shader) {
        let mut state = self.state.borrow_mut();
        if state.shaders.remove(&shader.0).is_none() {
            state.errors.push(format!("double delete of shader {}", shader.0));
        }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        let mut state = self.state.borrow_mut();
        let id = state.alloc();
        state.programs.insert(id, ProgramObject::default());
        Ok(HeadlessProgram(id))
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        let mut state = self.state.borrow_mut();
        match state.programs.get_mut(&program.0) {
            Some(p) => p.attached.push(shader.0),
            None => state.errors.push(format!("attach to deleted program {}", program.0)),
        }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program.0) {
            p.attached.retain(|id| *id != shader.0);
        }
    }

    fn link_program(&self, program: Self::Program) {
        let mut state = self.state.borrow_mut();
        let Some(attached) = state.programs.get(&program.0).map(|p| p.attached.clone()) else {
            state.errors.push(format!("link of deleted program {}", program.0));
            return;
        };

        let result = link_interfaces(&state, &attached);
        if let Some(p) = state.programs.get_mut(&program.0) {
            match result {
                Ok((uniforms, attributes)) => {
                    p.linked = true;
                    p.log.clear();
                    p.uniforms = uniforms;
                    p.attributes = attributes;
                }
                Err(log) => {
                    p.linked = false;
                    p.log = log;
                    p.uniforms.clear();
                    p.attributes.clear();
                }
            }
        }
    }

    fn link_status(&self, program: Self::Program) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program.0)
            .map(|p| p.linked)
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        self.state
            .borrow()
            .programs
            .get(&program.0)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&self, program: Self::Program) {
        let mut state = self.state.borrow_mut();
        if state.programs.remove(&program.0).is_none() {
            state.errors.push(format!("double delete of program {}", program.0));
        }
        if state.current == Some(program.0) {
            state.current = None;
        }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        let mut state = self.state.borrow_mut();
        match program {
            Some(p) if !state.programs.get(&p.0).is_some_and(|p| p.linked) => {
                state.errors.push(format!("use of unlinked program {}", p.0));
            }
            _ => state.current = program.map(|p| p.0),
        }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        let state = self.state.borrow();
        let p = state.programs.get(&program.0)?;
        let (_, index) = p.uniforms.get(name)?;
        Some(HeadlessLocation {
            program: program.0,
            index: *index,
            name: name.to_owned(),
        })
    }

    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32> {
        let state = self.state.borrow();
        state.programs.get(&program.0)?.attributes.get(name).copied()
    }

    fn set_uniform(&self, location: &Self::UniformLocation, value: &UniformValue) {
        let mut state = self.state.borrow_mut();

        if state.current != Some(location.program) {
            let message = format!(
                "write to `{}` of program {} while program {:?} is bound",
                location.name, location.program, state.current
            );
            state.errors.push(message);
            return;
        }

        let declared = state
            .programs
            .get(&location.program)
            .and_then(|p| p.uniforms.get(&location.name))
            .map(|(ty, _)| ty.clone());
        if let Some(ty) = declared {
            let ok = ty == value.glsl_type()
                || (ty.starts_with("sampler") && matches!(value, UniformValue::Int(_)))
                || (ty == "bool" && matches!(value, UniformValue::Int(_)));
            if !ok {
                let message = format!(
                    "`{}` is {ty} but received {}",
                    location.name,
                    value.glsl_type()
                );
                state.errors.push(message);
            }
        }

        state.writes.push(UniformWrite {
            program: HeadlessProgram(location.program),
            name: location.name.clone(),
            value: value.clone(),
        });
    }
}

// --- Source inspection ---

fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('/', Some('/')) => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

fn check_structure(source: &str) -> Result<(), String> {
    let mut stack: Vec<(char, usize)> = Vec::new();

    for (line_no, line) in source.lines().enumerate() {
        let line_no = line_no + 1;
        let trimmed = line.trim_start();
        if let Some(message) = trimmed.strip_prefix("#error") {
            return Err(format!("0:{line_no}: error: #error{message}"));
        }

        for c in line.chars() {
            match c {
                '{' | '(' | '[' => stack.push((c, line_no)),
                '}' | ')' | ']' => {
                    let expected = match c {
                        '}' => '{',
                        ')' => '(',
                        _ => '[',
                    };
                    match stack.pop() {
                        Some((open, _)) if open == expected => {}
                        _ => return Err(format!("0:{line_no}: error: unexpected '{c}'")),
                    }
                }
                _ => {}
            }
        }
    }

    if let Some((open, line_no)) = stack.pop() {
        return Err(format!("0:{line_no}: error: unmatched '{open}'"));
    }

    let has_main = source
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .windows(2)
        .any(|w| w == ["void", "main"]);
    if !has_main {
        return Err("0:0: error: missing entry point `void main()`".to_owned());
    }

    Ok(())
}

const QUALIFIERS: &[&str] = &[
    "highp", "mediump", "lowp", "flat", "smooth", "noperspective", "centroid", "const",
];

fn parse_interface(source: &str, stage: ShaderStage) -> Interface {
    let mut interface = Interface::default();

    // Only top-level statements declare interface variables.
    let mut depth = 0usize;
    let mut statement = String::new();
    for c in source.chars() {
        match c {
            '{' => {
                depth += 1;
                statement.clear();
            }
            '}' => {
                depth = depth.saturating_sub(1);
                statement.clear();
            }
            ';' if depth == 0 => {
                declare(&statement, stage, &mut interface);
                statement.clear();
            }
            _ if depth == 0 => statement.push(c),
            _ => {}
        }
    }

    interface
}

fn declare(statement: &str, stage: ShaderStage, interface: &mut Interface) {
    // Drop preprocessor lines that precede the declaration.
    let statement: String = statement
        .lines()
        .filter(|l| !l.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join(" ");

    let mut explicit_location = None;
    let mut rest = statement.trim();
    if let Some(after) = rest.strip_prefix("layout") {
        let (Some(open), Some(close)) = (after.find('('), after.find(')')) else {
            return;
        };
        explicit_location = after[open + 1..close]
            .split(',')
            .filter_map(|q| q.split_once('='))
            .find(|(k, _)| k.trim() == "location")
            .and_then(|(_, v)| v.trim().parse().ok());
        rest = after[close + 1..].trim();
    }

    let mut words = rest.split_whitespace().filter(|w| !QUALIFIERS.contains(w));
    let storage = match words.next() {
        Some(w) => w,
        None => return,
    };
    let is_input = match (storage, stage) {
        ("uniform", _) => false,
        ("in" | "attribute", ShaderStage::Vertex) => true,
        _ => return,
    };
    let Some(ty) = words.next() else { return };
    let declarators: String = words.collect::<Vec<_>>().join(" ");

    for declarator in declarators.split(',') {
        let name: String = declarator
            .trim()
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        if name.is_empty() {
            continue;
        }
        if is_input {
            interface.inputs.insert(name, explicit_location);
        } else {
            interface.uniforms.insert(name, ty.to_owned());
        }
    }
}

type LinkedInterface = (HashMap<String, (String, u32)>, HashMap<String, u32>);

fn link_interfaces(state: &State, attached: &[u32]) -> Result<LinkedInterface, String> {
    let mut vertex = None;
    let mut fragment = None;

    for id in attached {
        let shader = state
            .shaders
            .get(id)
            .ok_or_else(|| format!("error: attached shader {id} was deleted"))?;
        if !shader.compiled {
            return Err(format!("error: {} shader {id} is not compiled", shader.stage));
        }
        let slot = match shader.stage {
            ShaderStage::Vertex => &mut vertex,
            ShaderStage::Fragment => &mut fragment,
        };
        if slot.replace(shader).is_some() {
            return Err(format!("error: more than one {} shader attached", shader.stage));
        }
    }

    let vertex = vertex.ok_or("error: no vertex shader attached")?;
    let fragment = fragment.ok_or("error: no fragment shader attached")?;

    let mut merged: BTreeMap<&str, &str> = BTreeMap::new();
    for (name, ty) in vertex
        .interface
        .uniforms
        .iter()
        .chain(fragment.interface.uniforms.iter())
    {
        if let Some(previous) = merged.insert(name, ty) {
            if previous != ty {
                return Err(format!(
                    "error: uniform `{name}` declared as {previous} and {ty} in different stages"
                ));
            }
        }
    }

    let uniforms = merged
        .into_iter()
        .enumerate()
        .map(|(index, (name, ty))| (name.to_owned(), (ty.to_owned(), index as u32)))
        .collect();

    let mut attributes = HashMap::new();
    let mut taken: Vec<u32> = vertex.interface.inputs.values().flatten().copied().collect();
    for (name, explicit) in &vertex.interface.inputs {
        let location = match explicit {
            Some(location) => *location,
            None => {
                let free = (0..).find(|l| !taken.contains(l)).unwrap_or_default();
                taken.push(free);
                free
            }
        };
        attributes.insert(name.clone(), location);
    }

    Ok((uniforms, attributes))
}
