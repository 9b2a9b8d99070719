//! Rising-edge detection

/// Per-input edge detector
///
/// Remembers the last accepted level (initially low) and reports a press
/// when it goes from low to high. With `debounce_polls` above 1 a new level
/// must be sampled that many times in a row before it is accepted; 0 and 1
/// accept every change immediately, so bouncy contacts can fire twice.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeDetector {
    /// Last accepted level
    level: bool,
    /// Consecutive samples that disagreed with `level`
    streak: u32,
    /// Samples required to accept a change
    threshold: u32,
}

impl EdgeDetector {
    /// Create a detector accepting every change
    pub fn new() -> Self {
        Self::with_debounce(0)
    }

    /// Create a detector that needs `debounce_polls` agreeing samples
    pub fn with_debounce(debounce_polls: u32) -> Self {
        Self {
            level: false,
            streak: 0,
            threshold: debounce_polls.max(1),
        }
    }

    /// Feed one sample; true on an accepted low-to-high transition
    pub fn sample(&mut self, level: bool) -> bool {
        if level == self.level {
            self.streak = 0;
            return false;
        }

        self.streak += 1;
        if self.streak < self.threshold {
            return false;
        }

        self.level = level;
        self.streak = 0;
        level
    }

    /// Last accepted level
    pub fn level(&self) -> bool {
        self.level
    }
}
