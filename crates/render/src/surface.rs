use thiserror::Error;

use crate::{Canvas, Extent};

/// Errors reported by a [`RenderSurface`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("render surface is not available")]
    Unavailable,

    #[error("frame is {actual:?} but the surface is {expected:?}")]
    ExtentMismatch { expected: Extent, actual: Extent },
}

/// A destination for composed frames.
pub trait RenderSurface {
    /// Returns the size frames must have.
    fn extent(&self) -> Extent;

    /// Returns `true` once the surface can accept frames.
    fn is_ready(&self) -> bool;

    /// Displays `frame`.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Unavailable`] if the surface is not ready, or
    /// [`SurfaceError::ExtentMismatch`] if the frame has the wrong size.
    fn present(&mut self, frame: &Canvas) -> Result<(), SurfaceError>;
}

/// An in-memory surface that keeps the most recent frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelSurface {
    extent: Extent,
    attached: bool,
    last_frame: Option<Canvas>,
    frames_presented: usize,
}

impl PixelSurface {
    /// Creates a surface that is ready immediately.
    #[must_use]
    pub fn new(extent: Extent) -> Self {
        Self {
            extent,
            attached: true,
            last_frame: None,
            frames_presented: 0,
        }
    }

    /// Creates a surface that rejects frames until [`attach`](Self::attach).
    #[must_use]
    pub fn detached(extent: Extent) -> Self {
        Self {
            attached: false,
            ..Self::new(extent)
        }
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    pub fn detach(&mut self) {
        self.attached = false;
    }

    #[must_use]
    pub fn last_frame(&self) -> Option<&Canvas> {
        self.last_frame.as_ref()
    }

    #[must_use]
    pub fn frames_presented(&self) -> usize {
        self.frames_presented
    }
}

impl RenderSurface for PixelSurface {
    fn extent(&self) -> Extent {
        self.extent
    }

    fn is_ready(&self) -> bool {
        self.attached && !self.extent.is_empty()
    }

    fn present(&mut self, frame: &Canvas) -> Result<(), SurfaceError> {
        if !self.is_ready() {
            return Err(SurfaceError::Unavailable);
        }
        if frame.extent() != self.extent {
            return Err(SurfaceError::ExtentMismatch {
                expected: self.extent,
                actual: frame.extent(),
            });
        }

        match &mut self.last_frame {
            Some(last) => last.copy_from(frame),
            None => self.last_frame = Some(frame.clone()),
        }
        self.frames_presented += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::Color;

    #[test]
    fn detached_surface_rejects_frames() {
        let extent = Extent::new(4, 4);
        let mut surface = PixelSurface::detached(extent);
        let frame = Canvas::new(extent, Color::WHITE);

        assert!(!surface.is_ready());
        assert_eq!(surface.present(&frame), Err(SurfaceError::Unavailable));

        surface.attach();
        assert!(surface.present(&frame).is_ok());
        assert_eq!(surface.frames_presented(), 1);
        assert_eq!(surface.last_frame(), Some(&frame));
    }

    #[test]
    fn mismatched_frames_are_rejected() {
        let mut surface = PixelSurface::new(Extent::new(4, 4));
        let frame = Canvas::new(Extent::new(2, 2), Color::WHITE);

        assert_eq!(
            surface.present(&frame),
            Err(SurfaceError::ExtentMismatch {
                expected: Extent::new(4, 4),
                actual: Extent::new(2, 2),
            })
        );
        assert_eq!(surface.frames_presented(), 0);
    }

    #[test]
    fn empty_extent_is_never_ready() {
        assert!(!PixelSurface::new(Extent::new(0, 500)).is_ready());
    }
}
