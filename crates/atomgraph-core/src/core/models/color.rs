/// An 8-bit-per-channel color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for Rgba {
    fn default() -> Self {
        Self::new(255, 255, 255, 255)
    }
}

impl Rgba {
    /// Number of session ints one color occupies.
    pub const SESSION_NUM_INTS: usize = 4;

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub(crate) fn to_session_ints(self) -> [i32; 4] {
        [self.r as i32, self.g as i32, self.b as i32, self.a as i32]
    }

    /// Rebuilds a color from session ints, clamping channels into `0..=255`.
    pub(crate) fn from_session_ints(ints: &[i32]) -> Self {
        let channel = |i: usize| ints.get(i).copied().unwrap_or(255).clamp(0, 255) as u8;
        Self::new(channel(0), channel(1), channel(2), channel(3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_color_is_opaque_white() {
        assert_eq!(Rgba::default(), Rgba::new(255, 255, 255, 255));
    }

    #[test]
    fn from_session_ints_clamps_out_of_range_channels() {
        let color = Rgba::from_session_ints(&[-5, 300, 12, 128]);
        assert_eq!(color, Rgba::new(0, 255, 12, 128));
    }
}
