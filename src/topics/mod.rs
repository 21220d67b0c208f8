// Topic enrichment — term-table filtering, clustering orchestration, and
// document-topic weight mapping.

pub mod exemplar;
pub mod position;
pub mod terms;
pub mod weights;
