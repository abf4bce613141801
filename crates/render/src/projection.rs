//! Mapping from Lorenz phase space to screen pixels.
//!
//! The map is a fixed affine transform centred on the surface:
//!
//! ```text
//! x = floor(width / 2)  + SCALE * state[horizontal]
//! y = floor(height / 2) - SCALE * state[vertical]
//! ```
//!
//! Screen `y` grows downwards, so positive vertical components appear above
//! the centre.

use attractor_core::State;

use crate::AxisSelection;

/// Pixels per unit of phase space.
pub const SCALE: f64 = 5.0;

/// Size of a render surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Extent {
    pub width: usize,
    pub height: usize,
}

impl Default for Extent {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
        }
    }
}

impl Extent {
    /// Largest width or height a configured surface may have.
    pub const MAX_SIDE: usize = 16_384;

    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Returns `true` if the extent covers no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` if neither side exceeds [`Extent::MAX_SIDE`].
    #[must_use]
    pub fn is_within_limits(&self) -> bool {
        self.width <= Self::MAX_SIDE && self.height <= Self::MAX_SIDE
    }

    /// Returns the number of pixels, or `None` if it overflows `usize`.
    #[must_use]
    pub fn area(&self) -> Option<usize> {
        self.width.checked_mul(self.height)
    }

    /// Returns the screen centre, `(floor(width / 2), floor(height / 2))`.
    #[must_use]
    pub fn center(&self) -> Pixel {
        #[allow(clippy::cast_precision_loss)]
        let (x, y) = ((self.width / 2) as f64, (self.height / 2) as f64);
        Pixel { x, y }
    }
}

/// A point in screen coordinates.
///
/// Coordinates are not rounded and may lie outside the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pixel {
    pub x: f64,
    pub y: f64,
}

impl Pixel {
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A projection for a fixed axis selection and surface size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Projection {
    axes: AxisSelection,
    extent: Extent,
}

impl Projection {
    #[must_use]
    pub fn new(axes: AxisSelection, extent: Extent) -> Self {
        Self { axes, extent }
    }

    #[must_use]
    pub fn axes(&self) -> AxisSelection {
        self.axes
    }

    #[must_use]
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Projects `state` to screen coordinates.
    #[must_use]
    pub fn project(&self, state: &State) -> Pixel {
        project(state, self.axes, self.extent)
    }
}

/// Projects `state` onto the plane spanned by `axes`, centred in `extent`.
#[must_use]
pub fn project(state: &State, axes: AxisSelection, extent: Extent) -> Pixel {
    let center = extent.center();
    Pixel {
        x: center.x + SCALE * axes.horizontal.component(state),
        y: center.y - SCALE * axes.vertical.component(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::Axis;

    #[test]
    fn initial_condition_projects_to_255_245() {
        let pixel = project(&[1.0, 1.0, 1.0], AxisSelection::default(), Extent::default());

        assert_relative_eq!(pixel.x, 255.0);
        assert_relative_eq!(pixel.y, 245.0);
    }

    #[test]
    fn horizontal_and_vertical_offsets_scale_by_five() {
        let extent = Extent::default();
        let axes = AxisSelection::default();

        for c in [-20.0, -1.5, 0.0, 3.25, 17.0] {
            let pixel = project(&[c, 99.0, 0.0], axes, extent);
            assert_relative_eq!(pixel.x, 250.0 + 5.0 * c);
            assert_relative_eq!(pixel.y, 250.0);

            let pixel = project(&[0.0, 99.0, c], axes, extent);
            assert_relative_eq!(pixel.x, 250.0);
            assert_relative_eq!(pixel.y, 250.0 - 5.0 * c);
        }
    }

    #[test]
    fn odd_extents_floor_the_centre() {
        let pixel = project(&[0.0; 3], AxisSelection::default(), Extent::new(501, 333));

        assert_relative_eq!(pixel.x, 250.0);
        assert_relative_eq!(pixel.y, 166.0);
    }

    #[test]
    fn area_reports_overflow() {
        assert_eq!(Extent::default().area(), Some(250_000));
        assert_eq!(Extent::new(0, 7).area(), Some(0));
        assert_eq!(Extent::new(usize::MAX, 2).area(), None);

        assert!(!Extent::new(Extent::MAX_SIDE + 1, 1).is_within_limits());
        assert!(Extent::new(Extent::MAX_SIDE, Extent::MAX_SIDE).is_within_limits());
    }

    #[test]
    fn degenerate_selection_lies_on_the_anti_diagonal() {
        let projection = Projection::new(AxisSelection::new(Axis::X, Axis::X), Extent::default());

        for c in [-10.0, 0.0, 4.0, 22.5] {
            let pixel = projection.project(&[c, 1.0, 2.0]);
            assert_relative_eq!(pixel.x + pixel.y, 500.0);
        }
    }
}
