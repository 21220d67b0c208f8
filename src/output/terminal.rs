// Colored terminal rendering of the enriched topic table.
//
// The grid mirrors how a reader skims a topic model: one column per topic,
// ranked by how much exemplar weight the topic carries, with exemplar terms
// starred. This is the validation surface — if the columns don't read as
// coherent themes, the clustering parameters need another look.

use colored::Colorize;

use crate::cluster::NOISE;
use crate::topics::terms::TermTable;

/// Aggregate view of one topic: its exemplar terms and their summed score.
#[derive(Debug, Clone)]
pub struct TopicSummary {
    pub topic: i32,
    /// Sum of exemplar rows' scores; the topic's display rank.
    pub exemplar_score: f64,
    /// The starred terms, in table order.
    pub exemplar_words: Vec<String>,
}

impl TopicSummary {
    /// Hover-style one-liner: `topic 3: genji | murasaki | koto`.
    pub fn label(&self) -> String {
        format!("topic {}: {}", self.topic, self.exemplar_words.join(" | "))
    }
}

/// Summarize every real topic (noise excluded), in topic-id order.
pub fn topic_summaries(table: &TermTable) -> Vec<TopicSummary> {
    let topic_max = table.topic_max();
    if topic_max == NOISE {
        return Vec::new();
    }

    (0..=topic_max)
        .map(|topic| {
            let exemplars: Vec<&_> = table
                .rows
                .iter()
                .filter(|r| r.topic == topic && r.exemplar)
                .collect();
            TopicSummary {
                topic,
                exemplar_score: exemplars.iter().map(|r| r.score).sum(),
                exemplar_words: exemplars.iter().map(|r| r.word.clone()).collect(),
            }
        })
        .collect()
}

/// Topic ids ranked by exemplar score, strongest first.
pub fn rank_topics(summaries: &[TopicSummary]) -> Vec<i32> {
    let mut ranked: Vec<&TopicSummary> = summaries.iter().collect();
    ranked.sort_by(|a, b| {
        b.exemplar_score
            .partial_cmp(&a.exemplar_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.iter().map(|s| s.topic).collect()
}

/// Print the topic grid: the top `n_cols` topics as columns, `n_rows` terms
/// deep, exemplars starred, plus each column's exemplar summary below.
pub fn display_topics(table: &TermTable, n_rows: usize, n_cols: usize) {
    let summaries = topic_summaries(table);
    if summaries.is_empty() {
        println!("No topics assigned yet. Run the clustering step first.");
        return;
    }

    let top_topics: Vec<i32> = rank_topics(&summaries).into_iter().take(n_cols).collect();

    println!(
        "\n{}",
        format!(
            "=== Topics ({} terms, {} topics) ===",
            table.len(),
            summaries.len()
        )
        .bold()
    );
    println!();

    let mut header = String::from("  ");
    for topic in &top_topics {
        header.push_str(&format!("{:<18}", format!("topic {topic}")));
    }
    println!("{}", header.dimmed());
    println!("  {}", "-".repeat(18 * top_topics.len()).dimmed());

    // Column cells keyed by position: the n-th row of a column is the term
    // with pos == n within that topic.
    for pos in 1..=n_rows {
        let mut line = String::from("  ");
        let mut any = false;
        for topic in &top_topics {
            let cell = table
                .rows
                .iter()
                .find(|r| r.topic == *topic && r.pos == pos)
                .map(|r| r.display_word())
                .unwrap_or_default();
            if !cell.is_empty() {
                any = true;
            }
            line.push_str(&format!("{cell:<18}"));
        }
        if !any {
            break;
        }
        println!("{line}");
    }

    println!();
    for topic in &top_topics {
        if let Some(summary) = summaries.iter().find(|s| s.topic == *topic) {
            println!(
                "  {} {}",
                format!("[{:.2}]", summary.exemplar_score).bold(),
                summary.label().dimmed()
            );
        }
    }
}
