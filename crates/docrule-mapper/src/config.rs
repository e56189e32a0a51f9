//! Configuration for the template mapper.

/// Configuration for a [`TemplateMapper`](crate::TemplateMapper).
///
/// # Example
///
/// ```rust
/// use docrule_mapper::MapperConfig;
///
/// let config = MapperConfig::default()
///     .with_parallel(true)
///     .with_min_parallel_batch(16);
/// assert!(config.parallel);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapperConfig {
    /// Evaluate batches on the rayon pool (requires the `parallel` feature).
    pub parallel: bool,
    /// Smallest batch that is split across threads.
    pub min_parallel_batch: usize,
}

impl MapperConfig {
    /// Enables or disables parallel batch evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the smallest batch evaluated in parallel.
    pub fn with_min_parallel_batch(mut self, min_parallel_batch: usize) -> Self {
        self.min_parallel_batch = min_parallel_batch;
        self
    }

    /// True if a batch of `len` records should be split across threads.
    pub(crate) fn parallel_for(&self, len: usize) -> bool {
        cfg!(feature = "parallel") && self.parallel && len >= self.min_parallel_batch.max(2)
    }
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            min_parallel_batch: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = MapperConfig::default();
        assert!(!config.parallel);
        assert_eq!(config.min_parallel_batch, 8);
        assert!(!config.parallel_for(1_000));
    }

    #[test]
    fn test_parallel_threshold() {
        let config = MapperConfig::default()
            .with_parallel(true)
            .with_min_parallel_batch(4);
        assert!(!config.parallel_for(3));
        assert_eq!(config.parallel_for(4), cfg!(feature = "parallel"));
    }

    #[test]
    fn test_single_record_never_parallel() {
        let config = MapperConfig::default()
            .with_parallel(true)
            .with_min_parallel_batch(0);
        assert!(!config.parallel_for(1));
    }
}
