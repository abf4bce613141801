//! The cached trail image and per-frame marker composition.
//!
//! Drawing ten thousand segments every frame is wasteful, so the background,
//! border, and full trail are rasterized once into a [`TrailImage`]. Each frame
//! then copies that image and draws only the marker on top.

use std::time::Instant;

use attractor_core::{State, Trajectory};
use thiserror::Error;
use tracing::debug;

use crate::{Canvas, Color, Extent, Projection};

/// Colors and stroke widths for the trail and marker.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Style {
    pub background: Color,
    pub border: Color,
    pub border_width: f64,
    pub trail: Color,
    pub trail_width: f64,
    pub marker: Color,
    pub marker_outline: Color,
    pub marker_outline_width: f64,
    pub marker_radius: f64,
}

/// Error returned when a [`Style`] width or radius is unusable.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum StyleError {
    #[error("{name} must be finite and non-negative, got {value}")]
    Width { name: &'static str, value: f64 },
}

impl Default for Style {
    fn default() -> Self {
        Self {
            background: Color::LAVENDER,
            border: Color::BLACK,
            border_width: 2.0,
            trail: Color::BLACK,
            trail_width: 0.5,
            marker: Color::WHITE,
            marker_outline: Color::BLACK,
            marker_outline_width: 1.0,
            marker_radius: 5.0,
        }
    }
}

impl Style {
    /// Validates that every width and the marker radius are finite and
    /// non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::Width`] naming the first invalid field.
    pub fn validate(&self) -> Result<(), StyleError> {
        for (name, value) in [
            ("border_width", self.border_width),
            ("trail_width", self.trail_width),
            ("marker_outline_width", self.marker_outline_width),
            ("marker_radius", self.marker_radius),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(StyleError::Width { name, value });
            }
        }
        Ok(())
    }
}

/// A trajectory rasterized once for a fixed projection and style.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailImage {
    canvas: Canvas,
    projection: Projection,
    style: Style,
    segments: usize,
}

impl TrailImage {
    /// Rasterizes the background, border, and every segment of `trajectory`.
    ///
    /// Short trajectories are fine: with fewer than two states only the
    /// background and border are drawn.
    #[must_use]
    pub fn render(trajectory: &Trajectory, projection: Projection, style: &Style) -> Self {
        let started = Instant::now();
        let extent = projection.extent();
        let mut canvas = Canvas::new(extent, style.background);

        if style.border_width > 0.0 {
            let inset = style.border_width;
            #[allow(clippy::cast_precision_loss)]
            let (width, height) = (extent.width as f64, extent.height as f64);
            canvas.stroke_rect(
                inset,
                inset,
                width - (inset + 1.0),
                height - (inset + 1.0),
                style.border,
                style.border_width,
            );
        }

        let mut segments = 0;
        for pair in trajectory.states().windows(2) {
            let from = projection.project(&pair[0]);
            let to = projection.project(&pair[1]);
            if from.is_finite() && to.is_finite() {
                canvas.stroke_line(from, to, style.trail, style.trail_width);
                segments += 1;
            }
        }

        debug!(
            segments,
            axes = %projection.axes(),
            elapsed_ms = started.elapsed().as_millis(),
            "rendered trail image"
        );

        Self {
            canvas,
            projection,
            style: *style,
            segments,
        }
    }

    /// Returns the rendered image without a marker.
    #[must_use]
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    #[must_use]
    pub fn projection(&self) -> Projection {
        self.projection
    }

    #[must_use]
    pub fn style(&self) -> &Style {
        &self.style
    }

    #[must_use]
    pub fn extent(&self) -> Extent {
        self.projection.extent()
    }

    /// Returns the number of segments drawn.
    #[must_use]
    pub fn segments(&self) -> usize {
        self.segments
    }

    /// Composes one animation frame into `frame`.
    ///
    /// Copies the trail image and, if `marker` is given, draws the marker
    /// circle at its projected position. With `None` the marker is hidden.
    pub fn compose(&self, marker: Option<&State>, frame: &mut Canvas) {
        frame.copy_from(&self.canvas);

        let Some(state) = marker else {
            return;
        };
        let center = self.projection.project(state);
        frame.fill_circle(center, self.style.marker_radius, self.style.marker);
        if self.style.marker_outline_width > 0.0 {
            frame.stroke_circle(
                center,
                self.style.marker_radius,
                self.style.marker_outline,
                self.style.marker_outline_width,
            );
        }
    }

    /// Composes one animation frame into a new canvas.
    #[must_use]
    pub fn frame(&self, marker: Option<&State>) -> Canvas {
        let mut frame = Canvas::new(self.extent(), Color::TRANSPARENT);
        self.compose(marker, &mut frame);
        frame
    }
}
