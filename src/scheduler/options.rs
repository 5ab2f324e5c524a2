/// Fan-out settings.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Upper bound on concurrent probes. Mail servers rate-limit or flag
    /// bursts from a single client, so this stays small.
    pub workers: usize,
    /// Addresses submitted to the pool per chunk.
    pub batch_size: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            workers: 20,
            batch_size: 100,
        }
    }
}

impl RunOptions {
    pub fn workers(&self) -> usize {
        self.workers.max(1)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size.max(1)
    }
}
