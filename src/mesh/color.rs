//! Per-vertex color values.

/// An RGB color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
}

impl Rgb {
    /// Pure white.
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);
    /// Pure red.
    pub const RED: Rgb = Rgb::new(1.0, 0.0, 0.0);
    /// Pure blue.
    pub const BLUE: Rgb = Rgb::new(0.0, 0.0, 1.0);

    /// Create a color from its channels.
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Linear blend: `t * self + (1 - t) * other`.
    pub fn mix(self, other: Rgb, t: f64) -> Rgb {
        let t = t as f32;
        Rgb {
            r: t * self.r + (1.0 - t) * other.r,
            g: t * self.g + (1.0 - t) * other.g,
            b: t * self.b + (1.0 - t) * other.b,
        }
    }

    /// 8-bit channels, as uploaded to a vertex color buffer.
    pub fn to_u8(self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}
