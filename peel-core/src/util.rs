//! Utility types, used throughout the crate.

/// A selection-expansion margin in pixels. Non-negative and finite.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug)]
#[repr(transparent)]
pub struct PixelMargin(f32);
impl PixelMargin {
    pub const ZERO: Self = Self(0.0);
    pub fn new(px: f32) -> Result<Self, PixelMarginError> {
        if !px.is_finite() {
            Err(PixelMarginError::NotFinite)
        } else if px < 0.0 {
            Err(PixelMarginError::Negative)
        } else {
            Ok(Self(px))
        }
    }
    #[must_use]
    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for PixelMargin {
    fn default() -> Self {
        Self::ZERO
    }
}

impl TryFrom<f32> for PixelMargin {
    type Error = PixelMarginError;
    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
// Hosts invoke the run with a whole number of pixels.
impl From<u16> for PixelMargin {
    fn from(px: u16) -> Self {
        Self(f32::from(px))
    }
}
impl From<PixelMargin> for f32 {
    fn from(value: PixelMargin) -> Self {
        value.get()
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelMarginError {
    #[error("not finite")]
    NotFinite,
    #[error("negative")]
    Negative,
}

// Safe - the constructors guarantee no component is ever NaN, so PartialEq
// can act like Eq.
impl Eq for PixelMargin {}
#[allow(clippy::derive_ord_xor_partial_ord)]
impl Ord for PixelMargin {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Unwrap OK - the wrapped f32 is never NaN, so this never compares
        // as None.
        self.partial_cmp(other).unwrap()
    }
}
impl std::hash::Hash for PixelMargin {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_u32(self.0.to_bits());
    }
}
