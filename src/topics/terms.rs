// The significant-term table and its enrichment pipeline.
//
// Rows arrive from the upstream corpus-statistics step with word, score, and
// embedding vector populated, pre-sorted by importance. Enrichment appends
// what the display and weight-mapping stages need: a topic label, an
// exemplar flag, a per-topic position, and (optionally) 2-D projection
// coordinates computed elsewhere.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cluster::{self, Hdbscan, SearchConfig, SearchSolution, NOISE};
use crate::error::Result;
use crate::topics::{exemplar, position};

/// One significant term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermRow {
    pub word: String,
    /// Importance score from the upstream corpus statistics.
    pub score: f64,
    /// Embedding vector the clusterer runs on.
    pub vector: Vec<f32>,
    /// Topic label; [`NOISE`] until enrichment runs, or for outliers.
    #[serde(default = "noise_topic")]
    pub topic: i32,
    /// Whether the clusterer considers this term representative of its topic.
    #[serde(default)]
    pub exemplar: bool,
    /// 1-based slot within this row's topic, in table order.
    #[serde(default)]
    pub pos: usize,
    /// 2-D projection coordinates for plotting, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x2d: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y2d: Option<f64>,
}

fn noise_topic() -> i32 {
    NOISE
}

impl TermRow {
    /// The word with its exemplar star, as shown in the topic grid.
    pub fn display_word(&self) -> String {
        if self.exemplar {
            format!("{}*", self.word)
        } else {
            self.word.clone()
        }
    }
}

/// An ordered table of significant terms. Input order is meaningful: rows
/// are pre-sorted by importance upstream, and positions derive from it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TermTable {
    pub rows: Vec<TermRow>,
}

impl TermTable {
    pub fn new(rows: Vec<TermRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The embedding vectors, in row order.
    pub fn vectors(&self) -> Vec<Vec<f32>> {
        self.rows.iter().map(|r| r.vector.clone()).collect()
    }

    /// Highest topic label in the table, or [`NOISE`] when nothing is labeled.
    pub fn topic_max(&self) -> i32 {
        self.rows
            .iter()
            .map(|r| r.topic)
            .filter(|&t| t != NOISE)
            .max()
            .unwrap_or(NOISE)
    }

    /// Keep only rows whose score strictly exceeds the score at the given
    /// percentile. Rows equal to the threshold are dropped.
    pub fn filter_by_percentile(&self, percentile: f64) -> TermTable {
        if self.rows.is_empty() {
            return TermTable::default();
        }

        let scores: Vec<f64> = self.rows.iter().map(|r| r.score).collect();
        let threshold = score_at_percentile(&scores, percentile);
        let rows: Vec<TermRow> = self
            .rows
            .iter()
            .filter(|r| r.score > threshold)
            .cloned()
            .collect();

        info!(
            percentile,
            threshold,
            kept = rows.len(),
            total = self.rows.len(),
            "applied percentile threshold"
        );

        TermTable { rows }
    }

    /// Run the full enrichment over this table's vectors: search for
    /// clustering parameters, fit, and fill in `topic`, `exemplar`, and
    /// `pos` on every row. When `coords_2d` is given (one pair per row), the
    /// projection coordinates are attached as well.
    ///
    /// Returns the hyperparameters the search settled on.
    pub fn enrich(
        &mut self,
        config: &SearchConfig,
        coords_2d: Option<&[(f64, f64)]>,
    ) -> Result<SearchSolution> {
        let vectors = self.vectors();

        let solution = cluster::parameter_search(&vectors, config)?;
        let fit = Hdbscan::new(solution.min_cluster_size, solution.min_samples)
            .with_selection_method(config.selection_method)
            .fit(&vectors)?;

        for (row, &label) in self.rows.iter_mut().zip(fit.labels.iter()) {
            row.topic = label;
        }

        let marks = exemplar::mark_exemplars(&vectors, &fit);
        for (row, mark) in self.rows.iter_mut().zip(marks) {
            row.exemplar = mark;
        }

        let topics: Vec<i32> = self.rows.iter().map(|r| r.topic).collect();
        for (row, pos) in self.rows.iter_mut().zip(position::topic_order_index(&topics)) {
            row.pos = pos;
        }

        if let Some(coords) = coords_2d {
            for (row, &(x, y)) in self.rows.iter_mut().zip(coords.iter()) {
                row.x2d = Some(x);
                row.y2d = Some(y);
            }
        }

        Ok(solution)
    }

    /// Percentile-filter the table, then enrich what survives.
    pub fn filter_and_enrich(
        &self,
        percentile: f64,
        config: &SearchConfig,
    ) -> Result<(TermTable, SearchSolution)> {
        let mut filtered = self.filter_by_percentile(percentile);
        let solution = filtered.enrich(config, None)?;
        Ok((filtered, solution))
    }
}

/// The score at the given percentile (0-100), interpolating linearly between
/// order statistics.
pub fn score_at_percentile(scores: &[f64], percentile: f64) -> f64 {
    if scores.is_empty() {
        return f64::NAN;
    }

    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let fraction = (percentile / 100.0).clamp(0.0, 1.0);
    let rank = fraction * (sorted.len() - 1) as f64;
    let below = rank.floor() as usize;
    let above = rank.ceil() as usize;

    if below == above {
        sorted[below]
    } else {
        sorted[below] + (rank - below as f64) * (sorted[above] - sorted[below])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(word: &str, score: f64) -> TermRow {
        TermRow {
            word: word.to_string(),
            score,
            vector: vec![0.0, 0.0],
            topic: NOISE,
            exemplar: false,
            pos: 0,
            x2d: None,
            y2d: None,
        }
    }

    #[test]
    fn percentile_filter_excludes_threshold_ties() {
        let table = TermTable::new(vec![
            row("a", 1.0),
            row("b", 2.0),
            row("c", 3.0),
            row("d", 4.0),
            row("e", 5.0),
        ]);

        let kept = table.filter_by_percentile(60.0);
        let words: Vec<&str> = kept.rows.iter().map(|r| r.word.as_str()).collect();
        assert_eq!(words, vec!["d", "e"]);
    }

    #[test]
    fn percentile_filter_on_empty_table() {
        let table = TermTable::default();
        assert!(table.filter_by_percentile(50.0).is_empty());
    }

    #[test]
    fn score_at_percentile_interpolates() {
        let scores = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((score_at_percentile(&scores, 0.0) - 1.0).abs() < 1e-12);
        assert!((score_at_percentile(&scores, 100.0) - 5.0).abs() < 1e-12);
        assert!((score_at_percentile(&scores, 50.0) - 3.0).abs() < 1e-12);
        assert!((score_at_percentile(&scores, 60.0) - 3.4).abs() < 1e-12);
    }

    #[test]
    fn score_at_percentile_unsorted_input() {
        let scores = [5.0, 1.0, 4.0, 2.0, 3.0];
        assert!((score_at_percentile(&scores, 50.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn display_word_stars_exemplars() {
        let mut r = row("murasaki", 1.0);
        assert_eq!(r.display_word(), "murasaki");
        r.exemplar = true;
        assert_eq!(r.display_word(), "murasaki*");
    }

    #[test]
    fn term_table_round_trips_through_json() {
        let json = r#"[{"word":"genji","score":2.5,"vector":[0.1,0.2]}]"#;
        let table: TermTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].topic, NOISE);
        assert!(!table.rows[0].exemplar);

        let out = serde_json::to_string(&table).unwrap();
        assert!(out.contains("\"word\":\"genji\""));
        assert!(!out.contains("x2d"));
    }

    #[test]
    fn topic_max_ignores_noise() {
        let mut table = TermTable::new(vec![row("a", 1.0), row("b", 1.0)]);
        assert_eq!(table.topic_max(), NOISE);
        table.rows[0].topic = 3;
        assert_eq!(table.topic_max(), 3);
    }
}
