//! End-to-end reload behaviour against shader files on disk.

use std::{
    fs,
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
    time::{Duration, Instant},
};

use shaderlab::{
    backend::headless::HeadlessBackend, Attribute, GraphicsBackend, Harness, HarnessSettings,
    ShaderError, ShaderOrigin, ShaderStage, SourcePair, Uniform, UniformValue,
};

const VERTEX: &str = r#"#version 330 core
layout (location = 0) in vec3 aPosition;
layout (location = 1) in vec2 aTexCoord;
out vec2 uv;
void main()
{
    gl_Position = vec4(aPosition, 1.0);
    uv = aTexCoord;
}
"#;

const FRAGMENT: &str = r#"#version 330 core
in vec2 uv;
out vec4 color;
uniform float millis;
uniform sampler2D background;
uniform vec3 colors[6];
uniform vec3 circles[64];
void main()
{
    color = texture(background, uv) * vec4(colors[0], 1.0);
}
"#;

const BROKEN_FRAGMENT: &str = r#"#version 330 core
out vec4 color;
void main()
{
    color = vec4(1.0;
}
"#;

/// A fresh directory under the system temp dir, removed on drop.
struct ShaderDir(PathBuf);

impl ShaderDir {
    fn new() -> Self {
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        let dir = std::env::temp_dir().join(format!(
            "shaderlab-reload-{}-{}",
            std::process::id(),
            NEXT.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir_all(&dir).unwrap();
        Self(dir)
    }

    fn write(&self, name: &str, text: &str) -> PathBuf {
        let path = self.0.join(name);
        fs::write(&path, text).unwrap();
        path
    }

    fn pair(&self, fragment: &str) -> SourcePair {
        let vertex = self.write("vertex.glsl", VERTEX);
        let fragment = self.write("fragment.glsl", fragment);
        SourcePair::from_files(vertex, fragment)
    }
}

impl Drop for ShaderDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn settings(sources: SourcePair) -> HarnessSettings {
    let mut settings = HarnessSettings::new(sources);
    settings.seed = Some(42);
    settings
}

#[test]
fn syntax_error_on_reload_keeps_the_active_program() {
    let dir = ShaderDir::new();
    let start = Instant::now();
    let mut harness =
        Harness::new(HeadlessBackend::new(), settings(dir.pair(FRAGMENT)), start).unwrap();
    let before = harness.active_program();

    dir.write("fragment.glsl", BROKEN_FRAGMENT);
    let err = harness.reload_current().unwrap_err();

    match err {
        ShaderError::CompileFailed { stage, log } => {
            assert_eq!(stage, ShaderStage::Fragment);
            assert!(log.starts_with("0:6:"), "{log}");
        }
        other => panic!("expected CompileFailed, got {other:?}"),
    }
    assert_eq!(harness.active_program(), before);

    // The old program still renders with its own bindings.
    let frame = harness.render_frame(start + Duration::from_millis(16)).unwrap();
    assert_eq!(Some(frame.program), before);
    assert_eq!(frame.written, 4);
    assert!(harness.backend().errors().is_empty());

    // Fixing the file is enough; no new request is needed.
    dir.write("fragment.glsl", FRAGMENT);
    harness.reload_current().unwrap();
    assert_ne!(harness.active_program(), before);
}

#[test]
fn missing_file_is_reported_and_nothing_changes() {
    let dir = ShaderDir::new();
    let mut harness = Harness::new(
        HeadlessBackend::new(),
        settings(dir.pair(FRAGMENT)),
        Instant::now(),
    )
    .unwrap();
    let before = harness.active_program();
    let compiles = harness.backend().compile_count();

    let missing = SourcePair::from_files(dir.0.join("vertex.glsl"), dir.0.join("nope.glsl"));
    let err = harness.request_reload(missing).unwrap_err();

    assert!(matches!(err, ShaderError::SourceUnreadable { .. }));
    assert_eq!(harness.active_program(), before);
    assert_eq!(harness.backend().compile_count(), compiles);
}

#[test]
fn auto_reload_fires_twice_in_two_seconds() {
    let dir = ShaderDir::new();
    let start = Instant::now();
    let mut settings = settings(dir.pair(FRAGMENT));
    settings.auto_reload = true;
    settings.reload_interval = Duration::from_millis(1000);
    let mut harness = Harness::new(HeadlessBackend::new(), settings, start).unwrap();

    let reloads = (1..=20)
        .map(|i| start + Duration::from_millis(i * 100))
        .filter_map(|now| harness.tick(now))
        .map(|result| result.unwrap())
        .count();

    assert_eq!(reloads, 2);
    assert_eq!(harness.backend().live_programs(), 1);
    assert_eq!(harness.backend().live_shaders(), 0);
}

#[test]
fn auto_reload_attempts_count_even_when_they_fail() {
    let dir = ShaderDir::new();
    let start = Instant::now();
    let mut settings = settings(dir.pair(FRAGMENT));
    settings.auto_reload = true;
    let mut harness = Harness::new(HeadlessBackend::new(), settings, start).unwrap();
    dir.write("fragment.glsl", BROKEN_FRAGMENT);

    assert!(matches!(harness.tick(start + Duration::from_millis(1000)), Some(Err(_))));
    // No immediate retry of the same failing source.
    assert!(harness.tick(start + Duration::from_millis(1001)).is_none());

    assert!(!harness.toggle_auto_reload());
    assert!(harness.tick(start + Duration::from_secs(10)).is_none());
}

#[test]
fn absent_uniforms_are_skipped_silently() {
    let dir = ShaderDir::new();
    let start = Instant::now();
    let sources = dir.pair("uniform float iTime;\nout vec4 c;\nvoid main() { c = vec4(iTime); }\n");
    let mut harness = Harness::new(HeadlessBackend::new(), settings(sources), start).unwrap();

    let bindings = harness.bindings().unwrap();
    assert!(bindings.uniform(Uniform::Mouse).is_none());
    assert!(bindings.uniform(Uniform::Time).is_some());

    harness.on_pointer_down(5.0, 5.0, start);
    let frame = harness.render_frame(start + Duration::from_secs(2)).unwrap();

    let writes = harness.backend().writes();
    assert_eq!(frame.written, 1);
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].name, "iTime");
    assert_eq!(writes[0].value, UniformValue::Float(2.0));
    assert!(writes.iter().all(|w| w.name != "iMouse"));
    assert!(harness.backend().errors().is_empty());
}

#[test]
fn bindings_follow_the_new_program_after_reload() {
    let dir = ShaderDir::new();
    let start = Instant::now();
    let mut harness =
        Harness::new(HeadlessBackend::new(), settings(dir.pair(FRAGMENT)), start).unwrap();

    let shadertoy = SourcePair::shadertoy(ShaderOrigin::file(dir.write(
        "toy.glsl",
        "void mainImage(out vec4 c, in vec2 p) { c = vec4(p / iResolution.xy, iMouse.x, 1.0); }",
    )));
    harness.request_reload(shadertoy).unwrap();

    let program = harness.active_program().unwrap();
    let backend = harness.backend();
    let bindings = harness.bindings().unwrap();
    assert_eq!(bindings.program(), program);

    let declared = backend.active_uniforms(program);
    for uniform in Uniform::ALL {
        assert_eq!(
            bindings.is_present(uniform),
            declared.iter().any(|name| name == uniform.name()),
            "{uniform:?}"
        );
    }
    for attribute in Attribute::ALL {
        assert_eq!(bindings.attribute(attribute), backend.attrib_location(program, attribute.name()));
    }
    assert!(!bindings.is_present(Uniform::Millis));
    assert!(bindings.is_present(Uniform::Mouse));

    let frame = harness.render_frame(start + Duration::from_millis(40)).unwrap();
    assert_eq!(frame.program, program);
    assert_eq!(frame.written, 5);
    assert!(harness.backend().errors().is_empty());
}
