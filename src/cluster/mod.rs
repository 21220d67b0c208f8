// Density clustering core: the HDBSCAN implementation the topic pipeline
// runs on term embedding vectors, plus the hyperparameter search that picks
// its settings.

pub mod hdbscan;
pub mod search;
mod util;

pub use hdbscan::{Hdbscan, HdbscanFit, SelectionMethod, NOISE};
pub use search::{parameter_search, SearchConfig, SearchSolution, TieBreak};
