//! Tracing hooks for arena growth.
//!
//! Each conversion reports what it added under a `convert` span carrying
//! the stage and counts as fields. Without the `tracing` feature these are
//! empty functions.

use radon_core::id::CacheRef;

use crate::generate::{script_node_count, PlannedOperator};
use crate::request::Stage;

/// What one conversion added to the arena.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionStats {
    pub sources: usize,
    pub operators: usize,
    pub nodes: usize,
    /// First handle minted, if anything was inserted.
    pub first: Option<CacheRef>,
}

impl ConversionStats {
    /// Counts for committing `scripts`; `first` is filled in by the caller
    /// once it knows the arena.
    pub fn from_plans(sources: usize, scripts: &[&[PlannedOperator<'_>]]) -> Self {
        Self {
            sources,
            operators: scripts.iter().map(|s| s.len()).sum(),
            nodes: scripts.iter().map(|s| script_node_count(s)).sum(),
            first: None,
        }
    }
}

/// `stage` is `None` for a whole-document conversion.
#[cfg(feature = "tracing")]
pub fn record_conversion(stage: Option<Stage>, stats: &ConversionStats) {
    let stage = stage.map_or_else(|| "document".to_string(), |s| s.to_string());
    let span = tracing::trace_span!(
        "convert",
        stage = %stage,
        sources = stats.sources,
        operators = stats.operators,
        nodes = stats.nodes
    );
    let _entered = span.enter();
    match stats.first {
        Some(first) => tracing::debug!(first = first.id, "arena grew"),
        None => tracing::trace!("nothing inserted"),
    }
}

#[cfg(not(feature = "tracing"))]
pub fn record_conversion(_stage: Option<Stage>, _stats: &ConversionStats) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Cache;
    use crate::generate::Generator;
    use crate::markup::ArgumentOptions;
    use radon_core::catalog::Catalog;
    use radon_core::mir::MirScript;
    use serde_json::json;

    #[test]
    fn stats_count_what_commit_inserts() {
        let generator = Generator::new(Catalog::standard(), ArgumentOptions::shared());
        let retrieve: MirScript = serde_json::from_value(json!([0x76, [0x61, "bpi"]])).unwrap();
        let tally: MirScript =
            serde_json::from_value(json!([[0x11, [0x05, 1.5]], [0x1b, 0x03]])).unwrap();
        let planned_retrieve = generator.plan_script(&retrieve).unwrap();
        let planned_tally = generator.plan_script(&tally).unwrap();

        let stats = ConversionStats::from_plans(
            1,
            &[planned_retrieve.as_slice(), planned_tally.as_slice()],
        );
        assert_eq!(stats.operators, 4);
        // 2 + 3 for retrieve, 5 + 4 for tally
        assert_eq!(stats.nodes, 14);

        let mut cache = Cache::new();
        generator.commit_script(&mut cache, planned_retrieve).unwrap();
        generator.commit_script(&mut cache, planned_tally).unwrap();
        assert_eq!(cache.len(), stats.nodes);

        record_conversion(Some(Stage::Tally), &stats);
        record_conversion(None, &ConversionStats::default());
    }
}
