use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Result};
use clap::{ArgAction, Parser};
use shaderlab::{Dialect, HarnessSettings, ShaderOrigin, SourcePair, Viewport};

use crate::presets::Preset;

/// `shaderlab` - live GLSL shader harness.
///
/// Renders a full-screen quad with the selected shader program and recompiles
/// it from disk on demand (`R`) or periodically (auto-reload). A failed
/// compile keeps the last working program on screen.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Vertex shader to start with. Ignored in ShaderToy mode.
    #[arg(long, env = "SHADERLAB_VERTEX", requires = "fragment")]
    pub vertex: Option<PathBuf>,

    /// Fragment shader (or ShaderToy snippet) to start with.
    ///
    /// Defaults to the first preset found in `--shader-dir`.
    #[arg(long, env = "SHADERLAB_FRAGMENT")]
    pub fragment: Option<PathBuf>,

    /// Directory scanned for shader presets.
    #[arg(long, env = "SHADERLAB_SHADER_DIR", default_value = "shaders")]
    pub shader_dir: PathBuf,

    /// Image bound to the `background` sampler.
    #[arg(long, env = "SHADERLAB_BACKGROUND")]
    pub background: Option<PathBuf>,

    /// Treat fragment sources as ShaderToy `mainImage` snippets.
    #[arg(long, env = "SHADERLAB_SHADERTOY")]
    pub shadertoy: bool,

    #[arg(long, env = "SHADERLAB_WIDTH", default_value_t = 800)]
    pub width: u32,

    #[arg(long, env = "SHADERLAB_HEIGHT", default_value_t = 600)]
    pub height: u32,

    /// Start with auto-reload enabled.
    #[arg(long, env = "SHADERLAB_AUTO_RELOAD")]
    pub auto_reload: bool,

    /// Milliseconds between auto-reloads.
    #[arg(long, env = "SHADERLAB_RELOAD_INTERVAL_MS", default_value_t = 1000)]
    pub reload_interval_ms: u64,

    /// Number of procedural circles fed to `circles`.
    #[arg(long, env = "SHADERLAB_SHAPES", default_value_t = shaderlab::shapes::DEFAULT_SHAPE_COUNT)]
    pub shapes: usize,

    /// Seed for circle placement and `random`. Random when unset.
    #[arg(long, env = "SHADERLAB_SEED")]
    pub seed: Option<u64>,

    /// Wait for vertical sync between frames.
    #[arg(long, env = "SHADERLAB_VSYNC", default_value_t = true, action = ArgAction::Set)]
    pub vsync: bool,
}

impl Config {
    pub fn dialect(&self) -> Dialect {
        if self.shadertoy {
            Dialect::ShaderToy
        } else {
            Dialect::Glsl
        }
    }

    /// The pair to initialize with: explicit paths first, then the first
    /// preset.
    pub fn initial_sources(&self, presets: &[Preset]) -> Result<SourcePair> {
        match (&self.vertex, &self.fragment, self.dialect()) {
            (_, Some(fragment), Dialect::ShaderToy) => {
                Ok(SourcePair::shadertoy(ShaderOrigin::file(fragment)))
            }
            (Some(vertex), Some(fragment), Dialect::Glsl) => {
                Ok(SourcePair::from_files(vertex, fragment))
            }
            (None, Some(_), Dialect::Glsl) => {
                bail!("--fragment needs --vertex unless --shadertoy is set")
            }
            _ => match presets.first() {
                Some(preset) => Ok(preset.sources.clone()),
                None => bail!(
                    "no shaders given and no presets found in {}",
                    self.shader_dir.display()
                ),
            },
        }
    }

    pub fn harness_settings(&self, sources: SourcePair) -> HarnessSettings {
        HarnessSettings {
            sources,
            auto_reload: self.auto_reload,
            reload_interval: Duration::from_millis(self.reload_interval_ms),
            viewport: Viewport::new(self.width, self.height),
            shape_count: self.shapes,
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("shaderlab").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let config = parse(&[]);
        assert_eq!(config.shader_dir, PathBuf::from("shaders"));
        assert_eq!((config.width, config.height), (800, 600));
        assert!(config.vsync);
        assert!(!config.auto_reload);

        let settings = config.harness_settings(SourcePair::from_files("a.vert", "a.frag"));
        assert_eq!(settings.reload_interval, Duration::from_millis(1000));
        assert_eq!(settings.viewport, Viewport::new(800, 600));
    }

    #[test]
    fn explicit_paths_win_over_presets() {
        let config = parse(&["--vertex", "v.glsl", "--fragment", "f.glsl", "--vsync", "false"]);
        let preset = Preset {
            name: "other".into(),
            sources: SourcePair::from_files("x", "y"),
        };

        assert!(!config.vsync);
        assert_eq!(
            config.initial_sources(&[preset]).unwrap(),
            SourcePair::from_files("v.glsl", "f.glsl")
        );
    }

    #[test]
    fn shadertoy_needs_only_a_fragment() {
        let config = parse(&["--shadertoy", "--fragment", "toy.glsl"]);
        let sources = config.initial_sources(&[]).unwrap();
        assert_eq!(sources.dialect, Dialect::ShaderToy);
        assert_eq!(sources.fragment, ShaderOrigin::file("toy.glsl"));
    }

    #[test]
    fn nothing_to_load_is_an_error() {
        let config = parse(&["--shader-dir", "empty"]);
        assert!(config.initial_sources(&[]).is_err());
    }
}
