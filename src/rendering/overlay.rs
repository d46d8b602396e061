//! Framing guide drawn over the viewport while composing shots.

/// Fraction of the smaller viewport dimension covered by the guide.
pub const SQUARE_FRACTION: f64 = 0.8;

/// A square in viewport pixels, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquareOverlay {
    pub left: f64,
    pub top: f64,
    pub size: f64,
}

impl SquareOverlay {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.left + self.size && y >= self.top && y <= self.top + self.size
    }
}

/// Centered square covering 80% of the smaller viewport dimension.
///
/// Exports are square, so anything inside this guide is what ends up in the
/// captured images.
pub fn normalization_square(width: u32, height: u32) -> SquareOverlay {
    let (w, h) = (f64::from(width), f64::from(height));
    let size = w.min(h) * SQUARE_FRACTION;
    SquareOverlay {
        left: (w - size) / 2.0,
        top: (h - size) / 2.0,
        size,
    }
}
