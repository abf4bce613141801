//! A small software rasterizer over an RGBA8 pixel buffer.
//!
//! Shapes are positioned in continuous screen coordinates. Pixel `(i, j)`
//! covers `[i, i + 1) × [j, j + 1)` and is painted when its centre falls
//! inside the shape. Sub-pixel stroke widths are drawn as partial coverage and
//! alpha-blended over the existing contents.

use std::fmt;

use thiserror::Error;

use crate::{Extent, Pixel};

/// An sRGB color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Error returned when a color string is not `#RRGGBB` or `#RRGGBBAA`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid color {0:?}, expected #RRGGBB or #RRGGBBAA")]
pub struct ParseColorError(String);

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const LAVENDER: Self = Self::rgb(0xCC, 0xCC, 0xFF);
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Parses `#RRGGBB` or `#RRGGBBAA`; the leading `#` is optional.
    ///
    /// # Errors
    ///
    /// Returns [`ParseColorError`] if the string is not six or eight hex digits.
    pub fn from_hex(hex: &str) -> Result<Self, ParseColorError> {
        let err = || ParseColorError(hex.to_owned());
        let digits = hex.trim().trim_start_matches('#');
        if !digits.is_ascii() || !matches!(digits.len(), 6 | 8) {
            return Err(err());
        }

        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| err());
        let a = if digits.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, a))
    }

    #[must_use]
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02X}", self.a)?;
        }
        Ok(())
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// An RGBA8 raster, row-major from the top-left corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    extent: Extent,
    pixels: Vec<u8>,
}

impl Canvas {
    /// Creates a canvas filled with `color`.
    ///
    /// An extent whose byte count does not fit in `usize` gives an empty
    /// canvas.
    #[must_use]
    pub fn new(extent: Extent, color: Color) -> Self {
        let area = extent.area().filter(|area| area.checked_mul(4).is_some());
        match area {
            Some(area) => Self {
                extent,
                pixels: color.to_array().repeat(area),
            },
            None => Self {
                extent: Extent::new(0, 0),
                pixels: Vec::new(),
            },
        }
    }

    #[must_use]
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Returns the raw RGBA bytes.
    #[must_use]
    pub fn as_rgba(&self) -> &[u8] {
        &self.pixels
    }

    #[must_use]
    pub fn into_rgba(self) -> Vec<u8> {
        self.pixels
    }

    /// Replaces every pixel with `color`.
    pub fn fill(&mut self, color: Color) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&color.to_array());
        }
    }

    /// Returns the color at `(x, y)`, or `None` outside the canvas.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        let offset = self.offset(x, y)?;
        let [r, g, b, a] = self.pixels[offset..offset + 4] else {
            return None;
        };
        Some(Color::new(r, g, b, a))
    }

    /// Overwrites this canvas with the contents of `source`.
    pub fn copy_from(&mut self, source: &Canvas) {
        self.extent = source.extent;
        self.pixels.clone_from(&source.pixels);
    }

    /// Blends `color` over pixel `(x, y)` with the given coverage in `[0, 1]`.
    ///
    /// Pixels outside the canvas are ignored.
    pub fn blend(&mut self, x: isize, y: isize, color: Color, coverage: f64) {
        let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
            return;
        };
        let Some(offset) = self.offset(x, y) else {
            return;
        };

        let alpha = f64::from(color.a) / 255.0 * coverage.clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        let dst = &mut self.pixels[offset..offset + 4];
        for (channel, src) in dst.iter_mut().take(3).zip([color.r, color.g, color.b]) {
            let mixed = f64::from(src) * alpha + f64::from(*channel) * (1.0 - alpha);
            *channel = to_channel(mixed);
        }
        let dst_alpha = f64::from(dst[3]) / 255.0;
        dst[3] = to_channel((alpha + dst_alpha * (1.0 - alpha)) * 255.0);
    }

    /// Fills the pixels whose centres lie in `[x0, x1) × [y0, y1)`.
    pub fn fill_rect(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Color) {
        let columns = self.span(x0, x1, self.extent.width);
        let rows = self.span(y0, y1, self.extent.height);
        for y in rows {
            for x in columns.clone() {
                self.blend(x, y, color, 1.0);
            }
        }
    }

    /// Strokes the outline of the rectangle with corner `(x, y)` and size
    /// `width × height`. The stroke is centred on the edges.
    pub fn stroke_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
        line_width: f64,
    ) {
        let half = line_width / 2.0;
        let (left, right) = (x - half, x + width + half);
        let (top, bottom) = (y - half, y + height + half);

        self.fill_rect(left, top, right, y + half, color);
        self.fill_rect(left, y + height - half, right, bottom, color);
        self.fill_rect(left, y + half, x + half, y + height - half, color);
        self.fill_rect(x + width - half, y + half, right, y + height - half, color);
    }

    /// Strokes a straight segment from `from` to `to`.
    ///
    /// Widths below one pixel are drawn one pixel wide with proportional
    /// coverage. Segments with a non-finite endpoint are skipped, and the rest
    /// are clipped to the canvas before rasterizing.
    pub fn stroke_line(&mut self, from: Pixel, to: Pixel, color: Color, width: f64) {
        if !from.is_finite() || !to.is_finite() || !width.is_finite() || width <= 0.0 {
            return;
        }

        #[allow(clippy::cast_possible_truncation)]
        let brush = width.round().max(1.0) as isize;
        let coverage = width.min(1.0);
        let margin = brush as f64;

        #[allow(clippy::cast_precision_loss)]
        let bounds = (
            -margin,
            -margin,
            self.extent.width as f64 + margin,
            self.extent.height as f64 + margin,
        );
        let Some((from, to)) = clip(from, to, bounds) else {
            return;
        };

        #[allow(clippy::cast_possible_truncation)]
        let (x0, y0, x1, y1) = (
            from.x.floor() as isize,
            from.y.floor() as isize,
            to.x.floor() as isize,
            to.y.floor() as isize,
        );
        let offset = (brush - 1) / 2;

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            for by in 0..brush {
                for bx in 0..brush {
                    self.blend(x + bx - offset, y + by - offset, color, coverage);
                }
            }
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Fills the disc of `radius` around `center`.
    pub fn fill_circle(&mut self, center: Pixel, radius: f64, color: Color) {
        self.paint_disc(center, radius + 0.5, |distance| distance <= radius, color);
    }

    /// Strokes the circle of `radius` around `center`, centred on the rim.
    pub fn stroke_circle(&mut self, center: Pixel, radius: f64, color: Color, line_width: f64) {
        let half = line_width / 2.0;
        self.paint_disc(
            center,
            radius + half + 0.5,
            |distance| (distance - radius).abs() <= half,
            color,
        );
    }

    fn paint_disc(
        &mut self,
        center: Pixel,
        reach: f64,
        inside: impl Fn(f64) -> bool,
        color: Color,
    ) {
        if !center.is_finite() || !reach.is_finite() {
            return;
        }
        let columns = self.span(center.x - reach, center.x + reach, self.extent.width);
        let rows = self.span(center.y - reach, center.y + reach, self.extent.height);

        for y in rows {
            for x in columns.clone() {
                #[allow(clippy::cast_precision_loss)]
                let (px, py) = (x as f64 + 0.5, y as f64 + 0.5);
                if inside((px - center.x).hypot(py - center.y)) {
                    self.blend(x, y, color, 1.0);
                }
            }
        }
    }

    /// Indices of pixels whose centres lie in `[lo, hi)`, clamped to `0..len`.
    fn span(&self, lo: f64, hi: f64, len: usize) -> std::ops::Range<isize> {
        #[allow(clippy::cast_precision_loss)]
        let len = len as f64;
        let first = (lo - 0.5).ceil().clamp(0.0, len);
        let last = (hi - 0.5).ceil().clamp(0.0, len);

        #[allow(clippy::cast_possible_truncation)]
        let range = first as isize..last as isize;
        range
    }

    fn offset(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.extent.width && y < self.extent.height).then(|| (y * self.extent.width + x) * 4)
    }
}

fn to_channel(value: f64) -> u8 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let channel = value.round().clamp(0.0, 255.0) as u8;
    channel
}

/// Clips the segment to `(xmin, ymin, xmax, ymax)` with Liang–Barsky.
fn clip(
    from: Pixel,
    to: Pixel,
    (xmin, ymin, xmax, ymax): (f64, f64, f64, f64),
) -> Option<(Pixel, Pixel)> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;

    for (p, q) in [
        (-dx, from.x - xmin),
        (dx, xmax - from.x),
        (-dy, from.y - ymin),
        (dy, ymax - from.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
        }
    }

    (t0 <= t1).then(|| {
        (
            Pixel {
                x: from.x + t0 * dx,
                y: from.y + t0 * dy,
            },
            Pixel {
                x: from.x + t1 * dx,
                y: from.y + t1 * dy,
            },
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Canvas {
        Canvas::new(Extent::new(10, 10), Color::WHITE)
    }

    #[test]
    fn parses_and_formats_hex_colors() {
        assert_eq!(Color::from_hex("#CCCCFF"), Ok(Color::LAVENDER));
        assert_eq!(Color::from_hex("ccccff"), Ok(Color::LAVENDER));
        assert_eq!(Color::from_hex("#00000080"), Ok(Color::new(0, 0, 0, 128)));
        assert!(Color::from_hex("#CCF").is_err());
        assert!(Color::from_hex("#GGGGGG").is_err());
        assert_eq!(Color::LAVENDER.to_string(), "#CCCCFF");
        assert_eq!(Color::new(1, 2, 3, 4).to_string(), "#01020304");
    }

    #[test]
    fn new_canvas_is_filled() {
        let canvas = Canvas::new(Extent::new(3, 2), Color::LAVENDER);

        assert_eq!(canvas.as_rgba().len(), 24);
        assert_eq!(canvas.pixel(2, 1), Some(Color::LAVENDER));
        assert_eq!(canvas.pixel(3, 0), None);
    }

    #[test]
    fn unaddressable_extent_gives_an_empty_canvas() {
        let mut canvas = Canvas::new(Extent::new(usize::MAX / 2, 3), Color::LAVENDER);

        assert_eq!(canvas.extent(), Extent::new(0, 0));
        assert!(canvas.as_rgba().is_empty());
        canvas.blend(0, 0, Color::BLACK, 1.0);
        assert_eq!(canvas.pixel(0, 0), None);
    }

    #[test]
    fn half_coverage_blends_halfway() {
        let mut canvas = small();

        canvas.blend(4, 4, Color::BLACK, 0.5);
        canvas.blend(-1, 4, Color::BLACK, 1.0);
        canvas.blend(4, 99, Color::BLACK, 1.0);

        assert_eq!(canvas.pixel(4, 4), Some(Color::new(128, 128, 128, 255)));
    }

    #[test]
    fn horizontal_line_covers_its_pixels() {
        let mut canvas = small();

        canvas.stroke_line(Pixel { x: 1.0, y: 3.0 }, Pixel { x: 6.0, y: 3.0 }, Color::BLACK, 1.0);

        for x in 1..=6 {
            assert_eq!(canvas.pixel(x, 3), Some(Color::BLACK));
        }
        assert_eq!(canvas.pixel(0, 3), Some(Color::WHITE));
        assert_eq!(canvas.pixel(7, 3), Some(Color::WHITE));
        assert_eq!(canvas.pixel(3, 2), Some(Color::WHITE));
    }

    #[test]
    fn lines_are_clipped_and_non_finite_lines_skipped() {
        let mut canvas = small();

        canvas.stroke_line(Pixel { x: -1e9, y: 5.0 }, Pixel { x: 1e9, y: 5.0 }, Color::BLACK, 1.0);
        let nan = Pixel { x: f64::NAN, y: 0.0 };
        canvas.stroke_line(nan, Pixel { x: 5.0, y: 0.0 }, Color::BLACK, 1.0);
        let outside = (Pixel { x: 20.0, y: 20.0 }, Pixel { x: 30.0, y: 25.0 });
        canvas.stroke_line(outside.0, outside.1, Color::BLACK, 1.0);

        for x in 0..10 {
            assert_eq!(canvas.pixel(x, 5), Some(Color::BLACK));
            assert_eq!(canvas.pixel(x, 0), Some(Color::WHITE));
        }
    }

    #[test]
    fn rectangle_stroke_is_centred_on_the_edges() {
        let mut canvas = small();

        canvas.stroke_rect(2.0, 2.0, 5.0, 5.0, Color::BLACK, 2.0);

        assert_eq!(canvas.pixel(1, 4), Some(Color::BLACK));
        assert_eq!(canvas.pixel(2, 4), Some(Color::BLACK));
        assert_eq!(canvas.pixel(3, 4), Some(Color::WHITE));
        assert_eq!(canvas.pixel(7, 7), Some(Color::BLACK));
        assert_eq!(canvas.pixel(0, 0), Some(Color::WHITE));
        assert_eq!(canvas.pixel(4, 4), Some(Color::WHITE));
    }

    #[test]
    fn circles_fill_and_stroke() {
        let mut canvas = Canvas::new(Extent::new(20, 20), Color::LAVENDER);
        let center = Pixel { x: 10.0, y: 10.0 };

        canvas.fill_circle(center, 5.0, Color::WHITE);
        canvas.stroke_circle(center, 5.0, Color::BLACK, 1.0);

        assert_eq!(canvas.pixel(10, 10), Some(Color::WHITE));
        assert_eq!(canvas.pixel(14, 10), Some(Color::BLACK));
        assert_eq!(canvas.pixel(0, 0), Some(Color::LAVENDER));
    }

    #[test]
    fn copy_from_replaces_contents() {
        let source = Canvas::new(Extent::new(4, 4), Color::BLACK);
        let mut target = Canvas::new(Extent::new(2, 2), Color::WHITE);

        target.copy_from(&source);

        assert_eq!(target, source);
    }
}
