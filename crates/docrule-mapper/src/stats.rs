//! Usage statistics for the template mapper.

/// Counters collected while mapping records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapperStats {
    /// Number of records mapped.
    pub records_mapped: usize,
    /// Number of placeholder values computed.
    pub placeholders_evaluated: usize,
    /// Placeholder values that came out empty.
    pub empty_placeholders: usize,
    /// Number of batch calls.
    pub batches: usize,
}

impl MapperStats {
    /// Returns the share of empty placeholders as a percentage.
    pub fn empty_rate(&self) -> f64 {
        if self.placeholders_evaluated == 0 {
            0.0
        } else {
            (self.empty_placeholders as f64 / self.placeholders_evaluated as f64) * 100.0
        }
    }

    pub(crate) fn record(&mut self, placeholders: usize, empty: usize) {
        self.records_mapped += 1;
        self.placeholders_evaluated += placeholders;
        self.empty_placeholders += empty;
    }
}

impl std::fmt::Display for MapperStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Template Mapper Statistics:")?;
        writeln!(f, "  Records:         {}", self.records_mapped)?;
        writeln!(f, "  Batches:         {}", self.batches)?;
        writeln!(f, "  Placeholders:    {}", self.placeholders_evaluated)?;
        writeln!(f, "  Empty:           {}", self.empty_placeholders)?;
        writeln!(f, "  Empty rate:      {:.1}%", self.empty_rate())?;
        Ok(())
    }
}
