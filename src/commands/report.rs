//! Terminal rendering of comparison results

use colored::Colorize;
use simscope::analysis::{angle_between, top_contributions, Angle, Contribution};
use simscope::comparison::{Classification, ComparisonRecord};
use simscope::keyphrase::KeyPhrase;
use simscope::session::HistoryMap;
use serde::Serialize;

/// Dimensions listed in the contribution breakdown
pub const CONTRIBUTIONS_SHOWN: usize = 10;

const MAP_WIDTH: usize = 64;
const MAP_HEIGHT: usize = 20;

pub fn label(classification: Option<Classification>) -> String {
    match classification {
        Some(c @ Classification::LikelyMatch) => c.label().green().bold().to_string(),
        Some(c @ Classification::Borderline) => c.label().yellow().bold().to_string(),
        Some(c @ Classification::NoMatch) => c.label().red().bold().to_string(),
        None => "—".dimmed().to_string(),
    }
}

fn score(value: Option<f32>) -> String {
    value
        .map(|v| format!("{:.4}", v))
        .unwrap_or_else(|| "—".to_string())
}

/// One-line summary used by the session loop
pub fn print_summary(record: &ComparisonRecord, threshold: f32) {
    println!(
        "full {} {}   keyword {} {}",
        score(Some(record.full_similarity)).as_str().bold(),
        label(Some(record.full_classification(threshold))),
        score(record.keyword_similarity()).as_str().bold(),
        label(record.keyword_classification(threshold)),
    );
}

pub fn print_report(record: &ComparisonRecord, threshold: f32) {
    println!(
        "{} {} ({}d)   {} {}   {} {:.2}\n",
        "Model:".dimmed(),
        record.model,
        record.dimension(),
        "Metric:".dimmed(),
        record.metric,
        "Threshold:".dimmed(),
        threshold
    );

    println!(
        "  {:<28} {:>8}  {}",
        "Full-sentence similarity",
        score(Some(record.full_similarity)),
        label(Some(record.full_classification(threshold)))
    );
    println!(
        "  {:<28} {:>8}  {}",
        "Keyword-only similarity",
        score(record.keyword_similarity()),
        label(record.keyword_classification(threshold))
    );
    println!(
        "  {:<28} {:>8}",
        "Δ (keyword − full)",
        record
            .keyword_delta()
            .map(|d| format!("{:+.4}", d))
            .unwrap_or_else(|| "—".to_string())
    );

    if let Some(kw) = &record.keywords {
        if kw.used_fallback() {
            println!(
                "\n  {} no keyphrases found for {}, keyword score uses the full text",
                "note:".yellow(),
                fallback_sides(kw.scraped_fallback, kw.query_fallback)
            );
        }
    }

    println!("\n{}", "Preprocessed".bold());
    println!("  scraped: {}", record.scraped);
    println!("  query:   {}", record.query);

    if record.keywords.is_some() {
        print_phrases("Keyphrases (scraped)", &record.scraped_phrases);
        print_phrases("Keyphrases (query)", &record.query_phrases);
    }

    let angle = angle_between(&record.scraped_vector, &record.query_vector);
    println!("\n{}", "Vector view".bold());
    println!(
        "  angle between full-sentence vectors: {:.1}° (cos {:.4})",
        angle.degrees, angle.cosine
    );

    println!("  top contributing dimensions:");
    for c in top_contributions(
        &record.scraped_vector,
        &record.query_vector,
        CONTRIBUTIONS_SHOWN,
    ) {
        let value = format!("{:+.5}", c.value);
        let value = if c.value < 0.0 {
            value.as_str().red()
        } else {
            value.as_str().green()
        };
        println!("    dim {:>4}  {}", c.dimension, value);
    }
}

fn fallback_sides(scraped: bool, query: bool) -> &'static str {
    match (scraped, query) {
        (true, true) => "either text",
        (true, false) => "the scraped text",
        _ => "the query",
    }
}

fn print_phrases(title: &str, phrases: &[KeyPhrase]) {
    println!("\n{}", title.bold());
    if phrases.is_empty() {
        println!("  (none)");
        return;
    }
    println!("  {:>7}  PHRASE", "SCORE");
    for p in phrases {
        println!("  {:>7.4}  {}", p.score, p.phrase);
    }
}

/// Machine-readable report for `--json`
#[derive(Serialize)]
pub struct JsonReport<'a> {
    pub threshold: f32,
    pub full_label: Classification,
    pub keyword_label: Option<Classification>,
    pub keyword_delta: Option<f32>,
    pub angle: Angle,
    pub top_contributions: Vec<Contribution>,
    pub record: &'a ComparisonRecord,
}

impl<'a> JsonReport<'a> {
    pub fn new(record: &'a ComparisonRecord, threshold: f32) -> Self {
        Self {
            threshold,
            full_label: record.full_classification(threshold),
            keyword_label: record.keyword_classification(threshold),
            keyword_delta: record.keyword_delta(),
            angle: angle_between(&record.scraped_vector, &record.query_vector),
            top_contributions: top_contributions(
                &record.scraped_vector,
                &record.query_vector,
                CONTRIBUTIONS_SHOWN,
            ),
            record,
        }
    }
}

pub fn print_history<'a>(records: impl Iterator<Item = &'a ComparisonRecord>, threshold: f32) {
    println!(
        "{:>3}  {:<8}  {:<18}  {:>7}  {:>7}  {}",
        "#", "TIME", "MODEL", "FULL", "KEYWORD", "LABEL"
    );
    println!("{}", "─".repeat(72));
    for (i, r) in records.enumerate() {
        println!(
            "{:>3}  {:<8}  {:<18}  {:>7}  {:>7}  {}",
            i,
            r.time_label(),
            r.model,
            score(Some(r.full_similarity)),
            score(r.keyword_similarity()),
            label(Some(r.full_classification(threshold)))
        );
    }
}

/// Scatter plot of the history map on a character grid.
///
/// Each cell shows the marker of the last point drawn there; points of the
/// newest record are drawn last and highlighted.
pub fn print_map(map: &HistoryMap) {
    let (min_x, max_x) = bounds(map.points.iter().map(|p| p.x));
    let (min_y, max_y) = bounds(map.points.iter().map(|p| p.y));

    let mut grid = vec![vec![None::<(char, bool)>; MAP_WIDTH]; MAP_HEIGHT];
    let mut ordered: Vec<_> = map.points.iter().collect();
    ordered.sort_by_key(|p| std::cmp::Reverse(p.age));

    for p in ordered {
        let col = cell(p.x, min_x, max_x, MAP_WIDTH);
        let row = MAP_HEIGHT - 1 - cell(p.y, min_y, max_y, MAP_HEIGHT);
        grid[row][col] = Some((p.role.marker(), p.latest));
    }

    println!(
        "{} {}   PC1 {:.1}%  PC2 {:.1}%",
        "History map:".bold(),
        map.model,
        map.explained_variance_ratio[0] * 100.0,
        map.explained_variance_ratio[1] * 100.0
    );
    println!("┌{}┐", "─".repeat(MAP_WIDTH));
    for row in grid {
        let line: String = row
            .into_iter()
            .map(|c| match c {
                Some((marker, true)) => {
                    let marker = marker.to_string();
                    marker.as_str().cyan().bold().to_string()
                }
                Some((marker, false)) => marker.to_string(),
                None => " ".to_string(),
            })
            .collect();
        println!("│{}│", line);
    }
    println!("└{}┘", "─".repeat(MAP_WIDTH));
    println!(
        "  o scraped   ^ query   s scraped_kw   D query_kw   ({} = latest)",
        "cyan".cyan().bold()
    );
}

fn bounds(values: impl Iterator<Item = f32>) -> (f32, f32) {
    values.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

fn cell(value: f32, min: f32, max: f32, size: usize) -> usize {
    let span = max - min;
    if span <= f32::EPSILON {
        return size / 2;
    }
    let t = (value - min) / span;
    ((t * (size - 1) as f32).round() as usize).min(size - 1)
}
