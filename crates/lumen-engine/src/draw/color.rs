use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::InvalidArgument;

/// Straight-alpha RGBA color with every component in `[0, 1]`.
///
/// Equality and hashing are component-wise. The range check in
/// [`Color::new`] rules out NaN, so `Eq` holds.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    r: f32,
    g: f32,
    b: f32,
    a: f32,
}

impl Color {
    pub const BLACK: Color = Color::opaque(0.0, 0.0, 0.0);
    pub const DARK_GRAY: Color = Color::opaque(0.25, 0.25, 0.25);
    pub const GRAY: Color = Color::opaque(0.5, 0.5, 0.5);
    pub const LIGHT_GRAY: Color = Color::opaque(0.75, 0.75, 0.75);
    pub const WHITE: Color = Color::opaque(1.0, 1.0, 1.0);
    pub const BLUE: Color = Color::opaque(0.0, 0.0, 1.0);
    pub const CYAN: Color = Color::opaque(0.0, 1.0, 1.0);
    pub const GREEN: Color = Color::opaque(0.0, 1.0, 0.0);
    pub const YELLOW: Color = Color::opaque(1.0, 1.0, 0.0);
    pub const ORANGE: Color = Color::opaque(1.0, 0.5, 0.0);
    pub const RED: Color = Color::opaque(1.0, 0.0, 0.0);
    pub const MAGENTA: Color = Color::opaque(1.0, 0.0, 1.0);
    pub const PINK: Color = Color::opaque(1.0, 0.5, 0.9);

    const fn opaque(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Creates a color, rejecting components outside `[0, 1]` (including NaN).
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Result<Self, InvalidArgument> {
        Ok(Self {
            r: check_component("r", r)?,
            g: check_component("g", g)?,
            b: check_component("b", b)?,
            a: check_component("a", a)?,
        })
    }

    /// Opaque color.
    pub fn rgb(r: f32, g: f32, b: f32) -> Result<Self, InvalidArgument> {
        Self::new(r, g, b, 1.0)
    }

    /// Same color with a different alpha.
    pub fn with_alpha(self, a: f32) -> Result<Self, InvalidArgument> {
        Self::new(self.r, self.g, self.b, a)
    }

    #[inline]
    pub fn red(self) -> f32 {
        self.r
    }

    #[inline]
    pub fn green(self) -> f32 {
        self.g
    }

    #[inline]
    pub fn blue(self) -> f32 {
        self.b
    }

    #[inline]
    pub fn alpha(self) -> f32 {
        self.a
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

fn check_component(name: &'static str, v: f32) -> Result<f32, InvalidArgument> {
    if (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err(InvalidArgument::new(name, format!("color component {v} is outside [0, 1]")))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for c in self.to_array() {
            // -0.0 == 0.0, so both must hash alike.
            let bits = if c == 0.0 { 0 } else { c.to_bits() };
            bits.hash(state);
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color[r={},g={},b={},a={}]", self.r, self.g, self.b, self.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(c: Color) -> u64 {
        let mut h = DefaultHasher::new();
        c.hash(&mut h);
        h.finish()
    }

    #[test]
    fn rejects_out_of_range_components() {
        assert!(Color::new(1.5, 0.0, 0.0, 1.0).is_err());
        assert!(Color::new(0.0, -0.1, 0.0, 1.0).is_err());
        assert!(Color::new(0.0, 0.0, f32::NAN, 1.0).is_err());
        let err = Color::new(0.0, 0.0, 0.0, 2.0).unwrap_err();
        assert_eq!(err.name, "a");
    }

    #[test]
    fn accepts_bounds() {
        let c = Color::new(0.0, 1.0, 0.5, 1.0).unwrap();
        assert_eq!(c.to_array(), [0.0, 1.0, 0.5, 1.0]);
    }

    #[test]
    fn equality_is_component_wise() {
        assert_eq!(Color::rgb(1.0, 0.5, 0.0).unwrap(), Color::ORANGE);
        assert_ne!(Color::ORANGE.with_alpha(0.5).unwrap(), Color::ORANGE);
    }

    #[test]
    fn negative_zero_hashes_like_zero() {
        let neg = Color::new(-0.0, 0.0, 0.0, 1.0).unwrap();
        assert_eq!(neg, Color::BLACK);
        assert_eq!(hash_of(neg), hash_of(Color::BLACK));
    }

    #[test]
    fn default_is_black() {
        assert_eq!(Color::default(), Color::BLACK);
    }
}
