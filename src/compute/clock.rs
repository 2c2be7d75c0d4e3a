//! Fixed-step frame scheduling, decoupled from the host's refresh rate.

/// Longest wall-clock interval honoured in one call; stalls beyond this are
/// dropped instead of replayed as a burst of frames.
pub const MAX_ELAPSED_MS: u64 = 100;

/// Turns elapsed milliseconds into whole simulation frames, carrying the
/// remainder to the next call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameClock {
    frame_ms: u64,
    accumulated_ms: u64,
}

impl FrameClock {
    pub fn new(frame_ms: u64) -> Self {
        Self {
            frame_ms: frame_ms.max(1),
            accumulated_ms: 0,
        }
    }

    pub fn frame_ms(&self) -> u64 {
        self.frame_ms
    }

    /// Number of frames due after `elapsed_ms` more milliseconds.
    pub fn advance(&mut self, elapsed_ms: u64) -> u32 {
        self.accumulated_ms += elapsed_ms.min(MAX_ELAPSED_MS);
        let frames = self.accumulated_ms / self.frame_ms;
        self.accumulated_ms %= self.frame_ms;
        frames as u32
    }
}
