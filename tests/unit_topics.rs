// Unit tests for topic enrichment and document weight mapping.
//
// Tests isolated pure functions: the position indexer's ordering contract,
// percentile gate boundary semantics, exemplar matching tolerance, and the
// weight mapper's normalization behavior.

use std::collections::HashSet;

use murasaki::cluster::{HdbscanFit, NOISE};
use murasaki::topics::exemplar::mark_exemplars;
use murasaki::topics::position::topic_order_index;
use murasaki::topics::terms::{score_at_percentile, TermRow, TermTable};
use murasaki::topics::weights::{document_topics, DocTopicWeights, Document, TermLookup};

fn term(word: &str, score: f64, topic: i32) -> TermRow {
    TermRow {
        word: word.to_string(),
        score,
        vector: vec![0.0, 0.0],
        topic,
        exemplar: false,
        pos: 0,
        x2d: None,
        y2d: None,
    }
}

fn doc(id: &str, text: &str) -> Document {
    Document {
        id: id.to_string(),
        text: text.to_string(),
    }
}

// ============================================================
// Position indexing — ordering contract
// ============================================================

#[test]
fn position_index_matches_the_reference_sequence() {
    assert_eq!(
        topic_order_index(&[1, 1, 2, 1, 3, 2, 2, 3]),
        vec![1, 2, 1, 3, 1, 2, 3, 2]
    );
}

#[test]
fn noise_rows_stay_out_of_real_topic_buckets() {
    let topics = [2, NOISE, 2, NOISE, NOISE, 2];
    let positions = topic_order_index(&topics);

    // Topic 2's slots run 1, 2, 3 untouched by the interleaved noise rows.
    let topic_positions: Vec<usize> = topics
        .iter()
        .zip(&positions)
        .filter(|(&t, _)| t == 2)
        .map(|(_, &p)| p)
        .collect();
    assert_eq!(topic_positions, vec![1, 2, 3]);

    // Noise rows advance only their own bucket.
    let noise_positions: Vec<usize> = topics
        .iter()
        .zip(&positions)
        .filter(|(&t, _)| t == NOISE)
        .map(|(_, &p)| p)
        .collect();
    assert_eq!(noise_positions, vec![1, 2, 3]);
}

// ============================================================
// Percentile gate — boundary semantics
// ============================================================

#[test]
fn percentile_gate_excludes_rows_at_the_threshold() {
    let table = TermTable::new(vec![
        term("a", 1.0, NOISE),
        term("b", 2.0, NOISE),
        term("c", 3.0, NOISE),
        term("d", 4.0, NOISE),
        term("e", 5.0, NOISE),
    ]);

    let kept = table.filter_by_percentile(60.0);
    let words: Vec<&str> = kept.rows.iter().map(|r| r.word.as_str()).collect();
    assert_eq!(words, vec!["d", "e"]);
}

#[test]
fn percentile_100_keeps_nothing() {
    let table = TermTable::new(vec![term("a", 1.0, NOISE), term("b", 2.0, NOISE)]);
    assert!(table.filter_by_percentile(100.0).is_empty());
}

#[test]
fn percentile_of_identical_scores() {
    let scores = [2.0, 2.0, 2.0];
    assert!((score_at_percentile(&scores, 50.0) - 2.0).abs() < 1e-12);

    // Every row sits exactly at the threshold, so the strict gate drops all.
    let table = TermTable::new(vec![
        term("a", 2.0, NOISE),
        term("b", 2.0, NOISE),
        term("c", 2.0, NOISE),
    ]);
    assert!(table.filter_by_percentile(50.0).is_empty());
}

// ============================================================
// Exemplar marking — tolerance and idempotence
// ============================================================

#[test]
fn exemplar_marking_runs_identically_twice() {
    let fit = HdbscanFit {
        labels: vec![0, 0, NOISE],
        exemplars: vec![vec![vec![1.0, 1.0]]],
    };
    let points = vec![vec![1.0, 1.0], vec![1.000_001, 1.0], vec![9.0, 9.0]];

    let first = mark_exemplars(&points, &fit);
    let second = mark_exemplars(&points, &fit);

    assert_eq!(first, vec![true, true, false]);
    assert_eq!(first, second);
}

// ============================================================
// Document weight mapping — normalization and fallbacks
// ============================================================

fn lookup() -> TermLookup {
    TermLookup::from_table(&TermTable::new(vec![
        term("moon", 2.0, 0),
        term("koto", 4.0, 1),
        term("mist", 8.0, NOISE),
    ]))
}

fn significant() -> HashSet<String> {
    ["moon", "koto", "mist"].iter().map(|w| w.to_string()).collect()
}

#[test]
fn weights_normalize_by_retained_count() {
    let docs = [doc("d1", "moon koto moon unrelated words")];
    let out = document_topics(&lookup(), &docs, &significant());

    // Three retained occurrences: moon twice, koto once.
    assert!((out[0].weights[&0] - 2.0 * 2.0 / 3.0).abs() < 1e-12);
    assert!((out[0].weights[&1] - 4.0 / 3.0).abs() < 1e-12);
}

#[test]
fn document_without_significant_terms_gets_an_empty_finite_vector() {
    let docs = [doc("empty", "unrelated words only")];
    let out = document_topics(&lookup(), &docs, &significant());

    assert_eq!(out[0].doc_id, "empty");
    assert!(out[0].weights.is_empty());
    assert!(out[0].weights.values().all(|w| w.is_finite()));
}

#[test]
fn noise_terms_never_reach_a_weight_bucket() {
    let docs = [doc("d1", "mist mist mist")];
    let out = document_topics(&lookup(), &docs, &significant());

    assert!(out[0].weights.is_empty());
}

#[test]
fn weight_vectors_serialize_with_their_doc_ids() {
    let docs = [doc("ch01", "moon koto")];
    let out = document_topics(&lookup(), &docs, &significant());

    let json = serde_json::to_string(&out).unwrap();
    let back: Vec<DocTopicWeights> = serde_json::from_str(&json).unwrap();
    assert_eq!(back[0].doc_id, "ch01");
    assert_eq!(back[0].weights.len(), 2);
}
