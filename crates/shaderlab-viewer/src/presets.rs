//! Shader presets found on disk and the keys that select them.
//!
//! GLSL mode expects one directory per preset holding `vertex.glsl` and
//! `fragment.glsl`. ShaderToy mode takes every `*.glsl` file in the shader
//! directory as a `mainImage` snippet. Presets are sorted by name and bound to
//! `1`-`9`, then `A`-`Z` when letters are free for selection.

use std::path::Path;

use shaderlab::{Dialect, ShaderOrigin, SourcePair};
use walkdir::WalkDir;

pub const VERTEX_FILE: &str = "vertex.glsl";
pub const FRAGMENT_FILE: &str = "fragment.glsl";

/// Number of presets reachable from the keyboard.
pub const MAX_DIGIT_SLOTS: usize = 9;
pub const MAX_LETTER_SLOTS: usize = 26;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    pub name: String,
    pub sources: SourcePair,
}

/// Finds presets under `dir`. A missing directory yields none.
pub fn discover(dir: &Path, dialect: Dialect) -> Vec<Preset> {
    let mut presets: Vec<Preset> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let path = entry.path();
            let name = path.file_stem()?.to_str()?.to_owned();
            match dialect {
                Dialect::Glsl if entry.file_type().is_dir() => {
                    let vertex = path.join(VERTEX_FILE);
                    let fragment = path.join(FRAGMENT_FILE);
                    (vertex.is_file() && fragment.is_file()).then(|| Preset {
                        name,
                        sources: SourcePair::from_files(vertex, fragment),
                    })
                }
                Dialect::ShaderToy
                    if entry.file_type().is_file()
                        && path.extension().and_then(|e| e.to_str()) == Some("glsl") =>
                {
                    Some(Preset {
                        name,
                        sources: SourcePair::shadertoy(ShaderOrigin::file(path)),
                    })
                }
                _ => None,
            }
        })
        .collect();

    presets.sort_by(|a, b| a.name.cmp(&b.name));
    presets
}

/// The key shown for preset `index`, if it has one.
pub fn key_label(index: usize, letters: bool) -> Option<char> {
    if index < MAX_DIGIT_SLOTS {
        char::from_digit(index as u32 + 1, 10)
    } else if letters && index < MAX_DIGIT_SLOTS + MAX_LETTER_SLOTS {
        Some((b'A' + (index - MAX_DIGIT_SLOTS) as u8) as char)
    } else {
        None
    }
}

/// Inverse of [`key_label`]. Accepts either letter case.
pub fn slot_for_key(key: char, letters: bool) -> Option<usize> {
    match key {
        '1'..='9' => Some(key as usize - '1' as usize),
        'a'..='z' | 'A'..='Z' if letters => {
            Some(MAX_DIGIT_SLOTS + (key.to_ascii_uppercase() as usize - 'A' as usize))
        }
        _ => None,
    }
}

/// One `key -> name` line per reachable preset.
pub fn describe(presets: &[Preset], letters: bool) -> Vec<String> {
    presets
        .iter()
        .enumerate()
        .filter_map(|(i, preset)| key_label(i, letters).map(|key| format!("{key} -> {}", preset.name)))
        .collect()
}
