// Brute-force hyperparameter search for the clusterer.
//
// The topic pipeline wants "as many distinct topics as possible, within
// reason": every (min_cluster_size, min_samples) pair in the configured
// ranges is fitted, candidates whose cluster count lands in the target range
// are kept, and the one with the most clusters wins. Candidate counts are
// small (6x6 by default), so exhaustive search beats anything cleverer.

use std::ops::Range;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use super::hdbscan::{Hdbscan, SelectionMethod, NOISE};
use crate::error::{ClusterError, Result};

/// How equally-good candidates are resolved.
///
/// Scanning order is ascending in both hyperparameters, so `PreferLarger`
/// takes the last tied candidate (largest hyperparameters) and
/// `PreferSmaller` the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    /// Prefer the tied candidate with the largest hyperparameters (default).
    PreferLarger,
    /// Prefer the tied candidate with the smallest hyperparameters.
    PreferSmaller,
}

/// Search space and acceptance criteria for the parameter search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Half-open range of `min_cluster_size` values to try.
    pub min_cluster_size: Range<usize>,
    /// Half-open range of `min_samples` values to try.
    pub min_samples: Range<usize>,
    /// Lowest acceptable label maximum (inclusive).
    pub target_label_min: i32,
    /// Highest acceptable label maximum (inclusive).
    pub target_label_max: i32,
    /// Cluster extraction strategy passed to every fit.
    pub selection_method: SelectionMethod,
    /// Tie resolution among candidates with the winning label maximum.
    pub tie_break: TieBreak,
    /// Draw a progress bar while scanning (off in library use).
    pub progress: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_cluster_size: 4..10,
            min_samples: 4..10,
            target_label_min: 5,
            target_label_max: 260,
            selection_method: SelectionMethod::Leaf,
            tie_break: TieBreak::PreferLarger,
            progress: false,
        }
    }
}

/// The winning configuration, with the clustering shape it produced.
#[derive(Debug, Clone)]
pub struct SearchSolution {
    pub min_cluster_size: usize,
    pub min_samples: usize,
    /// Highest cluster label the winning fit produced.
    pub label_max: i32,
    /// Population of each cluster label `0..=label_max`.
    pub bincount: Vec<usize>,
}

struct Candidate {
    min_cluster_size: usize,
    min_samples: usize,
    label_max: i32,
    bincount: Vec<usize>,
}

/// Exhaustively fit every hyperparameter pair in the configured ranges and
/// pick the candidate with the most clusters inside the target range.
///
/// Candidates where every point comes back as noise are logged and skipped.
/// Returns [`ClusterError::NoViableParams`] when nothing qualifies — an
/// empty search result is a caller-visible outcome, not a crash later.
pub fn parameter_search(points: &[Vec<f32>], config: &SearchConfig) -> Result<SearchSolution> {
    info!(
        target_label_min = config.target_label_min,
        target_label_max = config.target_label_max,
        "searching for clusters"
    );

    let total = (config.min_cluster_size.len() * config.min_samples.len()) as u64;
    let bar = if config.progress {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("  Search [{bar:30}] {pos}/{len} ({eta})")
                .unwrap(),
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let mut kept: Vec<Candidate> = Vec::new();

    for min_cluster_size in config.min_cluster_size.clone() {
        for min_samples in config.min_samples.clone() {
            bar.inc(1);

            let fit = Hdbscan::new(min_cluster_size, min_samples)
                .with_selection_method(config.selection_method)
                .fit(points)?;

            let label_max = fit.label_max();
            if label_max == NOISE {
                warn!(min_cluster_size, min_samples, "all points noise, skipping candidate");
                continue;
            }

            if label_max < config.target_label_min || label_max > config.target_label_max {
                continue;
            }

            kept.push(Candidate {
                min_cluster_size,
                min_samples,
                label_max,
                bincount: bincount(&fit.labels, label_max),
            });
        }
    }
    bar.finish_and_clear();

    // max_by_key keeps the last of equally-maximal elements, so scanning
    // forward prefers the largest tied hyperparameters and scanning in
    // reverse prefers the smallest.
    let winner = match config.tie_break {
        TieBreak::PreferLarger => kept.iter().max_by_key(|c| c.label_max),
        TieBreak::PreferSmaller => kept.iter().rev().max_by_key(|c| c.label_max),
    }
    .ok_or(ClusterError::NoViableParams {
        target_label_min: config.target_label_min,
        target_label_max: config.target_label_max,
    })?;

    for c in kept.iter().filter(|c| c.label_max == winner.label_max) {
        info!(
            min_cluster_size = c.min_cluster_size,
            min_samples = c.min_samples,
            label_max = c.label_max,
            bincount = ?c.bincount,
            "candidate at maximum"
        );
    }

    info!(
        label_max = winner.label_max,
        min_cluster_size = winner.min_cluster_size,
        min_samples = winner.min_samples,
        "selected clustering parameters"
    );

    Ok(SearchSolution {
        min_cluster_size: winner.min_cluster_size,
        min_samples: winner.min_samples,
        label_max: winner.label_max,
        bincount: winner.bincount.clone(),
    })
}

/// Population of each label `0..=label_max`, noise excluded.
fn bincount(labels: &[i32], label_max: i32) -> Vec<usize> {
    let mut counts = vec![0usize; (label_max + 1) as usize];
    for &l in labels {
        if l != NOISE {
            counts[l as usize] += 1;
        }
    }
    counts
}
