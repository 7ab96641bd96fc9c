//! Procedural circles scattered over the window at startup.

use glam::{Vec2, Vec3};
use rand::Rng;

use crate::input::Viewport;

pub const DEFAULT_SHAPE_COUNT: usize = 64;

/// A circle in window pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProceduralShape {
    pub position: Vec2,
    pub radius: f32,
}

impl ProceduralShape {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            radius,
        }
    }

    /// `(x, y, radius)` in normalized device coordinates. The radius is scaled
    /// by the width only.
    pub fn to_ndc(&self, viewport: Viewport) -> Vec3 {
        let size = viewport.size();
        Vec3::new(
            2.0 * self.position.x / size.x - 1.0,
            -(2.0 * self.position.y / size.y - 1.0),
            2.0 * self.radius / size.x,
        )
    }
}

/// `count` circles anywhere inside `viewport`, with radii of 1 to 5 pixels.
pub fn scatter<R: Rng + ?Sized>(count: usize, viewport: Viewport, rng: &mut R) -> Vec<ProceduralShape> {
    (0..count)
        .map(|_| {
            ProceduralShape::new(
                rng.gen_range(0..viewport.width()) as f32,
                rng.gen_range(0..viewport.height()) as f32,
                rng.gen_range(1..=5) as f32,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn corners_map_to_ndc_corners() {
        let viewport = Viewport::new(800, 600);

        assert_eq!(
            ProceduralShape::new(0.0, 0.0, 0.0).to_ndc(viewport),
            Vec3::new(-1.0, 1.0, 0.0)
        );
        assert_eq!(
            ProceduralShape::new(800.0, 600.0, 0.0).to_ndc(viewport),
            Vec3::new(1.0, -1.0, 0.0)
        );
        assert_eq!(
            ProceduralShape::new(400.0, 300.0, 4.0).to_ndc(viewport),
            Vec3::new(0.0, 0.0, 0.01)
        );
    }

    #[test]
    fn scatter_stays_inside_viewport() {
        let viewport = Viewport::new(320, 200);
        let mut rng = StdRng::seed_from_u64(7);
        let shapes = scatter(500, viewport, &mut rng);

        assert_eq!(shapes.len(), 500);
        for shape in shapes {
            assert!((0.0..320.0).contains(&shape.position.x));
            assert!((0.0..200.0).contains(&shape.position.y));
            assert!((1.0..=5.0).contains(&shape.radius));
        }
    }
}
