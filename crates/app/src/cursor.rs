use rand::Rng;

/// An index into the current trajectory, advanced once per frame.
///
/// The cursor wraps to zero after the last sample, so it returns to its
/// starting index after `len` advances. An empty trajectory pins it at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackCursor {
    index: usize,
    len: usize,
}

impl PlaybackCursor {
    /// Creates a cursor at `index` over `len` samples, clamping the index.
    #[must_use]
    pub fn new(index: usize, len: usize) -> Self {
        let mut cursor = Self { index, len };
        cursor.clamp(len);
        cursor
    }

    /// Creates a cursor at a uniformly random index.
    #[must_use]
    pub fn random<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Self {
        Self::new(random_index(rng, len), len)
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Moves to the next sample, wrapping after the last.
    pub fn advance(&mut self) {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
    }

    /// Adapts the cursor to a trajectory of `len` samples.
    ///
    /// An index past the end is pulled back to the last sample.
    pub fn clamp(&mut self, len: usize) {
        self.len = len;
        self.index = self.index.min(len.saturating_sub(1));
    }
}

/// Returns a uniformly random index into `len` samples, or zero if empty.
pub fn random_index<R: Rng + ?Sized>(rng: &mut R, len: usize) -> usize {
    if len == 0 { 0 } else { rng.gen_range(0..len) }
}
