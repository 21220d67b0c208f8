// Document -> topic weight vectors.
//
// Projects each document (a sentence, a paragraph) onto the topic space the
// term table defines: every significant term found in the document
// contributes its score to the term's topic, shared across the document's
// retained term count. The result is what the distribution plots downstream
// consume.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::topics::terms::TermTable;

/// A document to project onto topic space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
}

/// Accumulated topic weights for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocTopicWeights {
    pub doc_id: String,
    /// Topic id -> accumulated weight. Topics the document never touches are
    /// absent rather than zero.
    pub weights: BTreeMap<i32, f64>,
}

/// Word -> topic and word -> score lookups derived from an enriched table.
///
/// Lookups return `Option` so a missing word is an explicit branch for the
/// caller, not a swallowed default: a significant term the clusterer left
/// unlabeled is normal, and the weight mapper skips it.
pub struct TermLookup {
    topic_by_word: HashMap<String, i32>,
    weight_by_word: HashMap<String, f64>,
    topic_max: i32,
}

impl TermLookup {
    pub fn from_table(table: &TermTable) -> Self {
        let mut topic_by_word = HashMap::new();
        let mut weight_by_word = HashMap::new();
        for row in &table.rows {
            topic_by_word.insert(row.word.clone(), row.topic);
            weight_by_word.insert(row.word.clone(), row.score);
        }
        Self {
            topic_by_word,
            weight_by_word,
            topic_max: table.topic_max(),
        }
    }

    pub fn topic(&self, word: &str) -> Option<i32> {
        self.topic_by_word.get(word).copied()
    }

    pub fn weight(&self, word: &str) -> Option<f64> {
        self.weight_by_word.get(word).copied()
    }

    /// Highest topic id in the underlying table (the noise sentinel when
    /// nothing is labeled).
    pub fn topic_max(&self) -> i32 {
        self.topic_max
    }
}

/// Compute a topic-weight vector for every document.
///
/// Per document: whitespace-tokenize, keep tokens in the significant set
/// (every occurrence, so repeated terms count repeatedly), and accumulate
/// each retained term's weight into its topic, divided by the retained term
/// count. A document with no retained terms accumulates raw weights instead
/// of per-term shares. Terms without a weight, without a topic, or labeled
/// noise contribute nothing.
pub fn document_topics(
    lookup: &TermLookup,
    documents: &[Document],
    significant_terms: &HashSet<String>,
) -> Vec<DocTopicWeights> {
    let topic_max = lookup.topic_max();

    documents
        .iter()
        .map(|doc| {
            let retained: Vec<&str> = doc
                .text
                .split_whitespace()
                .filter(|w| significant_terms.contains(*w))
                .collect();

            let mut weights: BTreeMap<i32, f64> = BTreeMap::new();
            for word in &retained {
                let Some(weight) = lookup.weight(word) else {
                    continue;
                };
                let Some(topic) = lookup.topic(word) else {
                    continue;
                };
                if !(0..=topic_max).contains(&topic) {
                    continue;
                }

                let contribution = if !retained.is_empty() {
                    weight / retained.len() as f64
                } else {
                    weight
                };
                *weights.entry(topic).or_insert(0.0) += contribution;
            }

            DocTopicWeights {
                doc_id: doc.id.clone(),
                weights,
            }
        })
        .collect()
}
