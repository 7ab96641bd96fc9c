//! Per-frame uniform values.
//!
//! [`compute`] is a pure function of its inputs; [`FrameUniforms::push`] writes
//! the result through a binding set, skipping names the program lacks.

use std::time::Duration;

use glam::{Vec2, Vec3};
use log::trace;

use crate::{
    backend::{GraphicsBackend, UniformValue},
    bindings::{BindingSet, Uniform},
    input::{ClickState, PointerState, Viewport},
    shapes::ProceduralShape,
};

/// The six-entry `colors` palette.
pub const PALETTE: [Vec3; 6] = [
    Vec3::new(1.0, 0.0, 1.0),
    Vec3::new(0.0, 0.0, 1.0),
    Vec3::new(0.0, 1.0, 1.0),
    Vec3::new(1.0, 1.0, 0.0),
    Vec3::new(1.0, 0.0, 1.0),
    Vec3::new(0.0, 1.0, 1.0),
];

pub const FOCAL_POINT: Vec2 = Vec2::new(0.5, 0.5);

/// Length of one `phase` cycle.
pub const PHASE_PERIOD: Duration = Duration::from_secs(4);

/// Texture unit the `background` sampler reads from.
pub const BACKGROUND_UNIT: i32 = 0;

#[derive(Debug, Clone, Copy)]
pub struct FrameInputs<'a> {
    pub elapsed: Duration,
    pub delta: Duration,
    pub frame: u32,
    pub viewport: Viewport,
    pub pointer: PointerState,
    pub click: ClickState,
    pub shapes: &'a [ProceduralShape],
    /// Drawn by the caller from `[0, 1]`.
    pub random: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameUniforms {
    values: Vec<(Uniform, UniformValue)>,
}

/// Counts of one [`FrameUniforms::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeedReport {
    pub written: usize,
    pub skipped: usize,
}

pub fn compute(inputs: &FrameInputs<'_>) -> FrameUniforms {
    let elapsed = inputs.elapsed.as_secs_f32();
    let phase = (inputs.elapsed.as_secs_f64() / PHASE_PERIOD.as_secs_f64()).fract() as f32;
    let size = inputs.viewport.size();
    let mut shapes: Vec<Vec3> = inputs
        .shapes
        .iter()
        .map(|shape| shape.to_ndc(inputs.viewport))
        .collect();

    let values = Uniform::ALL
        .into_iter()
        .map(|uniform| {
            let value = match uniform {
                Uniform::Millis => UniformValue::Float(inputs.elapsed.as_millis() as f32),
                Uniform::Time => UniformValue::Float(elapsed),
                Uniform::TimeDelta => UniformValue::Float(inputs.delta.as_secs_f32()),
                Uniform::Frame => UniformValue::Int(inputs.frame as i32),
                Uniform::Resolution => UniformValue::Vec3(size.extend(1.0)),
                Uniform::Mouse => {
                    UniformValue::Vec4(inputs.pointer.shadertoy_mouse(inputs.viewport))
                }
                Uniform::Background => UniformValue::Int(BACKGROUND_UNIT),
                Uniform::Palette => UniformValue::Vec3Array(PALETTE.to_vec()),
                Uniform::Shapes => UniformValue::Vec3Array(std::mem::take(&mut shapes)),
                Uniform::Random => UniformValue::Float(inputs.random),
                Uniform::Aspect => UniformValue::Float(inputs.viewport.aspect()),
                Uniform::FocalPoint => UniformValue::Vec2(FOCAL_POINT),
                Uniform::Phase => UniformValue::Float(phase),
                Uniform::ClickPosition => UniformValue::Vec2(inputs.click.position),
                Uniform::ClickTime => UniformValue::Float(inputs.click.time),
            };
            (uniform, value)
        })
        .collect();

    FrameUniforms { values }
}

impl FrameUniforms {
    pub fn get(&self, uniform: Uniform) -> Option<&UniformValue> {
        self.values
            .iter()
            .find(|(u, _)| *u == uniform)
            .map(|(_, value)| value)
    }

    /// Writes every value whose name is present in `bindings`.
    ///
    /// The binding set's program must be the one currently bound.
    pub fn push<B: GraphicsBackend>(&self, backend: &B, bindings: &BindingSet<B>) -> FeedReport {
        let mut report = FeedReport::default();
        for (uniform, value) in &self.values {
            match bindings.uniform(*uniform) {
                Some(location) => {
                    backend.set_uniform(location, value);
                    report.written += 1;
                }
                None => report.skipped += 1,
            }
        }
        trace!(
            "Fed {} uniforms to {:?}, skipped {}",
            report.written,
            bindings.program(),
            report.skipped
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(shapes: &[ProceduralShape]) -> FrameInputs<'_> {
        FrameInputs {
            elapsed: Duration::from_millis(5_000),
            delta: Duration::from_millis(16),
            frame: 300,
            viewport: Viewport::new(800, 400),
            pointer: PointerState {
                position: Vec2::new(10.0, 20.0),
                down: true,
            },
            click: ClickState {
                position: Vec2::new(0.25, 0.5),
                time: 1.5,
            },
            shapes,
            random: 0.75,
        }
    }

    #[test]
    fn derived_values() {
        let shapes = [ProceduralShape::new(0.0, 0.0, 8.0)];
        let uniforms = compute(&inputs(&shapes));

        assert_eq!(uniforms.get(Uniform::Millis), Some(&UniformValue::Float(5000.0)));
        assert_eq!(uniforms.get(Uniform::Time), Some(&UniformValue::Float(5.0)));
        assert_eq!(uniforms.get(Uniform::Aspect), Some(&UniformValue::Float(2.0)));
        assert_eq!(uniforms.get(Uniform::Phase), Some(&UniformValue::Float(0.25)));
        assert_eq!(uniforms.get(Uniform::Frame), Some(&UniformValue::Int(300)));
        assert_eq!(
            uniforms.get(Uniform::Resolution),
            Some(&UniformValue::Vec3(Vec3::new(800.0, 400.0, 1.0)))
        );
        assert_eq!(
            uniforms.get(Uniform::Shapes),
            Some(&UniformValue::Vec3Array(vec![Vec3::new(-1.0, 1.0, 0.02)]))
        );
        assert_eq!(uniforms.get(Uniform::Random), Some(&UniformValue::Float(0.75)));
    }

    #[test]
    fn compute_is_pure() {
        let shapes = [ProceduralShape::new(3.0, 4.0, 2.0)];
        assert_eq!(compute(&inputs(&shapes)), compute(&inputs(&shapes)));
    }

    #[test]
    fn every_uniform_has_a_value() {
        let uniforms = compute(&inputs(&[]));
        for uniform in Uniform::ALL {
            assert!(uniforms.get(uniform).is_some(), "{uniform:?}");
        }
    }
}
