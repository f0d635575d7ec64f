//! Paint a weight function onto the per-vertex color attribute.

use crate::error::{MeshError, Result};
use crate::mesh::{MeshIndex, PolyMesh, Rgb, VertexId};

use super::weight::WeightFunction;

/// Colors used by [`colorize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorRamp {
    /// Color at the seed (normalized weight 1).
    pub start: Rgb,

    /// Color approached as the normalized weight falls to 0.
    pub end: Rgb,

    /// Color of points with a non-positive weight.
    pub neutral: Rgb,
}

impl Default for ColorRamp {
    fn default() -> Self {
        Self {
            start: Rgb::RED,
            end: Rgb::BLUE,
            neutral: Rgb::WHITE,
        }
    }
}

impl ColorRamp {
    /// Set the seed color.
    pub fn with_start(mut self, color: Rgb) -> Self {
        self.start = color;
        self
    }

    /// Set the far color.
    pub fn with_end(mut self, color: Rgb) -> Self {
        self.end = color;
        self
    }

    /// Set the color of unweighted points.
    pub fn with_neutral(mut self, color: Rgb) -> Self {
        self.neutral = color;
        self
    }

    /// Ramp color for a weight already divided by the seed weight.
    ///
    /// `normalized` is clamped to `[0, 1]` (NaN counts as 0): 1 gives the
    /// start color, 0 the end color. The neutral color is never returned.
    pub fn color_at(&self, normalized: f64) -> Rgb {
        let t = if normalized >= 0.0 { normalized.min(1.0) } else { 0.0 };
        self.start.mix(self.end, t)
    }
}

/// Recolor every point from `weight_fn`.
///
/// All points are first reset to `ramp.neutral`. Points whose own weight is
/// positive then get [`ColorRamp::color_at`] of `weight / weight(seed)`, so
/// with a negative seed weight they land on the end color.
/// The color attribute is created if the mesh has none.
///
/// # Errors
///
/// - [`MeshError::SeedOutOfRange`] if the seed is not a mesh point
/// - [`MeshError::ZeroSeedWeight`] if the seed weight is zero or not finite
///
/// # Example
///
/// ```
/// use harmonica::prelude::*;
///
/// let mut mesh: PolyMesh = harmonica::mesh::primitives::grid(3).unwrap();
/// let w = simple_harmonic(&mesh, VertexId::new(5), 2).unwrap();
///
/// colorize(&mut mesh, VertexId::new(5), &w, &ColorRamp::default()).unwrap();
/// assert_eq!(mesh.color(VertexId::new(5)), Some(Rgb::RED));
/// assert_eq!(mesh.color(VertexId::new(15)), Some(Rgb::WHITE));
/// ```
pub fn colorize<I, W>(
    mesh: &mut PolyMesh<I>,
    seed: VertexId<I>,
    weight_fn: &W,
    ramp: &ColorRamp,
) -> Result<()>
where
    I: MeshIndex,
    W: WeightFunction<I> + ?Sized,
{
    mesh.check_seed(seed)?;
    let seed_weight = weight_fn.evaluate(seed);
    if seed_weight == 0.0 || !seed_weight.is_finite() {
        return Err(MeshError::ZeroSeedWeight {
            weight: seed_weight,
        });
    }

    let mut painted = 0usize;
    let colors: Vec<Rgb> = mesh
        .vertex_ids()
        .map(|v| {
            let w = weight_fn.evaluate(v);
            if w > 0.0 {
                painted += 1;
                ramp.color_at(w / seed_weight)
            } else {
                ramp.neutral
            }
        })
        .collect();

    mesh.set_colors(colors)?;
    tracing::debug!(seed = seed.index(), painted, "colorized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::weight::{laplacian_diffusion, simple_harmonic};
    use crate::mesh::primitives;

    fn v(i: usize) -> VertexId {
        VertexId::new(i)
    }

    fn close(a: Rgb, b: Rgb) -> bool {
        (a.r - b.r).abs() < 1e-6 && (a.g - b.g).abs() < 1e-6 && (a.b - b.b).abs() < 1e-6
    }

    #[test]
    fn test_ring_colors() {
        let mut mesh: PolyMesh = primitives::grid(3).unwrap();
        let w = simple_harmonic(&mesh, v(5), 2).unwrap();
        colorize(&mut mesh, v(5), &w, &ColorRamp::default()).unwrap();

        assert_eq!(mesh.color(v(5)), Some(Rgb::RED));
        let half = mesh.color(v(6)).unwrap();
        assert!(close(half, Rgb::new(0.5, 0.0, 0.5)));
        for i in [2, 3, 7, 8, 11, 12, 13, 14, 15] {
            assert_eq!(mesh.color(v(i)), Some(Rgb::WHITE));
        }
    }

    #[test]
    fn test_previous_colors_are_reset() {
        let mut mesh: PolyMesh = primitives::grid(3).unwrap();
        mesh.fill_colors(Rgb::new(0.2, 0.9, 0.2));

        let w = simple_harmonic(&mesh, v(0), 1).unwrap();
        let ramp = ColorRamp::default().with_neutral(Rgb::new(0.5, 0.5, 0.5));
        colorize(&mut mesh, v(0), &w, &ramp).unwrap();

        assert_eq!(mesh.color(v(0)), Some(Rgb::RED));
        assert_eq!(mesh.color(v(9)), Some(Rgb::new(0.5, 0.5, 0.5)));
    }

    #[test]
    fn test_non_positive_weights_stay_neutral() {
        let mut mesh: PolyMesh = primitives::grid(1).unwrap();
        let f = |p: VertexId| match p.index() {
            0 => 2.0,
            1 => -1.0,
            2 => 0.0,
            _ => 1.0,
        };
        colorize(&mut mesh, v(0), &f, &ColorRamp::default()).unwrap();

        assert_eq!(mesh.color(v(1)), Some(Rgb::WHITE));
        assert_eq!(mesh.color(v(2)), Some(Rgb::WHITE));
        assert!(close(mesh.color(v(3)).unwrap(), Rgb::new(0.5, 0.0, 0.5)));
    }

    #[test]
    fn test_diffusion_gradient() {
        let mut mesh: PolyMesh = primitives::hex_disk(3).unwrap();
        let w = laplacian_diffusion(&mesh, v(0), 0.25, 3).unwrap();
        colorize(&mut mesh, v(0), &w, &ColorRamp::default()).unwrap();

        let colors = mesh.colors().unwrap();
        assert_eq!(colors.len(), mesh.num_vertices());
        assert_eq!(colors[0], Rgb::RED);
        // Red fades with the weight
        for (i, c) in colors.iter().enumerate().skip(1) {
            assert!(c.r < 1.0, "{}", i);
        }
    }

    #[test]
    fn test_zero_seed_weight_rejected() {
        let mut mesh: PolyMesh = primitives::grid(1).unwrap();
        let zero = |_: VertexId| 0.0;
        assert_eq!(
            colorize(&mut mesh, v(0), &zero, &ColorRamp::default()).unwrap_err(),
            MeshError::ZeroSeedWeight { weight: 0.0 }
        );
        assert!(mesh.colors().is_none());
    }

    #[test]
    fn test_negative_seed_weight_paints_by_sign_of_weight() {
        let mut mesh: PolyMesh = primitives::grid(1).unwrap();
        let f = |p: VertexId| match p.index() {
            0 => -2.0,
            1 => -1.0,
            2 => 1.0,
            _ => 0.0,
        };
        colorize(&mut mesh, v(0), &f, &ColorRamp::default()).unwrap();

        assert_eq!(mesh.color(v(0)), Some(Rgb::WHITE));
        assert_eq!(mesh.color(v(1)), Some(Rgb::WHITE));
        assert_eq!(mesh.color(v(2)), Some(Rgb::BLUE));
        assert_eq!(mesh.color(v(3)), Some(Rgb::WHITE));
    }

    #[test]
    fn test_color_at() {
        let ramp = ColorRamp::default();
        assert_eq!(ramp.color_at(1.0), Rgb::RED);
        assert_eq!(ramp.color_at(3.0), Rgb::RED);
        assert_eq!(ramp.color_at(0.0), Rgb::BLUE);
        assert_eq!(ramp.color_at(-0.5), Rgb::BLUE);
        assert_eq!(ramp.color_at(f64::NAN), Rgb::BLUE);
    }
}
