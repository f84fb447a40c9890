//! Word cloud over the filtered rows, rendered as SVG.
//!
//! The corpus is every distinct post body plus every comment body, with
//! punctuation replaced by spaces. Words are counted case-insensitively,
//! English stopwords and bare numbers are dropped, and a plural ending in `s`
//! is folded into its singular when both occur. The layout is a seeded
//! Archimedean spiral search, so the same corpus always yields the same image.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;
use std::sync::LazyLock;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use threadscout_core::FilteredRecord;

const CANVAS: f64 = 1000.0;
const MAX_WORDS: usize = 300;
const MIN_WORD_LEN: usize = 2;
const PREFER_HORIZONTAL: f64 = 0.95;
const MAX_FONT: f64 = 150.0;
const MIN_FONT: f64 = 8.0;
const LAYOUT_SEED: u64 = 42;
const SPIRAL_STEPS: usize = 3000;

const PALETTE: &[&str] = &[
    "#440154", "#482878", "#3e4989", "#31688e", "#26828e", "#1f9e89", "#35b779", "#6ece58",
    "#b5de2b",
];

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));

static STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and",
        "any", "are", "aren", "as", "at", "be", "because", "been", "before", "being", "below",
        "between", "both", "but", "by", "can", "cannot", "com", "could", "couldn", "did", "didn",
        "do", "does", "doesn", "doing", "don", "down", "during", "each", "else", "ever", "few",
        "for", "from", "further", "get", "had", "hadn", "has", "hasn", "have", "haven", "having",
        "he", "hence", "her", "here", "hers", "herself", "him", "himself", "his", "how",
        "however", "http", "https", "i", "if", "in", "into", "is", "isn", "it", "its", "itself",
        "just", "k", "let", "ll", "me", "more", "most", "mustn", "my", "myself", "no", "nor",
        "not", "of", "off", "on", "once", "only", "or", "other", "otherwise", "ought", "our",
        "ours", "ourselves", "out", "over", "own", "r", "re", "same", "shall", "shan", "she",
        "should", "shouldn", "since", "so", "some", "such", "than", "that", "the", "their",
        "theirs", "them", "themselves", "then", "there", "therefore", "these", "they", "this",
        "those", "through", "to", "too", "under", "until", "up", "ve", "very", "was", "wasn",
        "we", "were", "weren", "what", "when", "where", "which", "while", "who", "whom", "why",
        "with", "won", "would", "wouldn", "www", "you", "your", "yours", "yourself",
        "yourselves",
    ]
    .into_iter()
    .collect()
});

/// A word and how often it occurs in the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordWeight {
    pub word: String,
    pub count: usize,
}

/// Joins distinct non-empty post bodies (first occurrence order) and all
/// non-empty comment bodies with `,`, then blanks out punctuation.
#[must_use]
pub fn build_corpus(rows: &[FilteredRecord]) -> String {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut parts: Vec<&str> = Vec::new();

    for post in rows.iter().filter_map(|row| row.record.post.as_ref()) {
        let body = post.text.as_str();
        if !body.is_empty() && seen.insert(body) {
            parts.push(body);
        }
    }
    parts.extend(
        rows.iter()
            .filter_map(|row| row.record.comment.as_ref())
            .map(|c| c.comment_text.as_str())
            .filter(|text| !text.is_empty()),
    );

    NON_WORD.replace_all(&parts.join(","), " ").into_owned()
}

/// Counts words in `corpus`, most frequent first, capped at the cloud size.
/// Each word is reported in its most frequent casing.
#[must_use]
pub fn word_frequencies(corpus: &str) -> Vec<WordWeight> {
    // lowercase key -> (casing -> count); BTreeMap keeps ties deterministic.
    let mut counts: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
    for token in corpus.split_whitespace() {
        if token.chars().count() < MIN_WORD_LEN || token.chars().all(char::is_numeric) {
            continue;
        }
        let lower = token.to_lowercase();
        if STOPWORDS.contains(lower.as_str()) {
            continue;
        }
        *counts
            .entry(lower)
            .or_default()
            .entry(token.to_string())
            .or_default() += 1;
    }

    let mut totals: BTreeMap<String, WordWeight> = counts
        .into_iter()
        .map(|(key, casings)| {
            let count = casings.values().sum();
            let word = casings
                .iter()
                .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
                .map(|(casing, _)| casing.clone())
                .unwrap_or_else(|| key.clone());
            (key, WordWeight { word, count })
        })
        .collect();

    let plurals: Vec<String> = totals
        .keys()
        .filter(|key| key.ends_with('s') && !key.ends_with("ss"))
        .filter(|key| totals.contains_key(&key[..key.len() - 1]))
        .cloned()
        .collect();
    for plural in plurals {
        if let Some(folded) = totals.remove(&plural) {
            if let Some(singular) = totals.get_mut(&plural[..plural.len() - 1]) {
                singular.count += folded.count;
            }
        }
    }

    let mut words: Vec<WordWeight> = totals.into_values().collect();
    words.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    words.truncate(MAX_WORDS);
    words
}

#[derive(Debug, Clone, Copy)]
struct Rect {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

impl Rect {
    fn centered(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        Self {
            x0: cx - width / 2.0,
            y0: cy - height / 2.0,
            x1: cx + width / 2.0,
            y1: cy + height / 2.0,
        }
    }

    fn inside_canvas(&self) -> bool {
        self.x0 >= 0.0 && self.y0 >= 0.0 && self.x1 <= CANVAS && self.y1 <= CANVAS
    }

    fn overlaps(&self, other: &Rect) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }
}

#[allow(clippy::cast_precision_loss)]
fn font_size(count: usize, max_count: usize) -> f64 {
    let ratio = count as f64 / max_count.max(1) as f64;
    MIN_FONT + (MAX_FONT - MIN_FONT) * ratio.sqrt()
}

#[allow(clippy::cast_precision_loss)]
fn text_box(word: &str, size: f64, vertical: bool) -> (f64, f64) {
    let width = word.chars().count() as f64 * size * 0.6;
    let height = size * 1.1;
    if vertical {
        (height, width)
    } else {
        (width, height)
    }
}

#[allow(clippy::cast_precision_loss)]
fn find_slot(word: &str, size: f64, vertical: bool, placed: &[Rect]) -> Option<(f64, f64, Rect)> {
    let (width, height) = text_box(word, size, vertical);
    let center = CANVAS / 2.0;
    (0..SPIRAL_STEPS).find_map(|step| {
        let theta = step as f64 * 0.12;
        let radius = 1.6 * theta;
        let x = center + radius * theta.cos();
        let y = center + radius * theta.sin();
        let rect = Rect::centered(x, y, width, height);
        (rect.inside_canvas() && !placed.iter().any(|p| p.overlaps(&rect))).then_some((x, y, rect))
    })
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Lays out `words` (most frequent first) on a white 1000×1000 canvas. A word
/// that does not fit is retried at smaller sizes; layout stops at the first
/// word that cannot be placed even at the minimum size.
#[must_use]
pub fn render_svg(words: &[WordWeight]) -> String {
    let mut rng = StdRng::seed_from_u64(LAYOUT_SEED);
    let max_count = words.first().map_or(1, |w| w.count);
    let mut placed: Vec<Rect> = Vec::new();

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{CANVAS}" height="{CANVAS}" viewBox="0 0 {CANVAS} {CANVAS}">"#
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);

    'words: for weight in words {
        let vertical = !rng.random_bool(PREFER_HORIZONTAL);
        let color = PALETTE[rng.random_range(0..PALETTE.len())];
        let mut size = font_size(weight.count, max_count);

        loop {
            if let Some((x, y, rect)) = find_slot(&weight.word, size, vertical, &placed) {
                placed.push(rect);
                let rotate = if vertical {
                    format!(r#" transform="rotate(-90 {x:.1} {y:.1})""#)
                } else {
                    String::new()
                };
                let _ = writeln!(
                    svg,
                    r#"<text x="{x:.1}" y="{y:.1}" font-size="{size:.1}" font-family="sans-serif" fill="{color}" text-anchor="middle" dominant-baseline="central"{rotate}>{}</text>"#,
                    escape_xml(&weight.word)
                );
                continue 'words;
            }
            size *= 0.8;
            if size < MIN_FONT {
                tracing::debug!(
                    placed = placed.len(),
                    word = %weight.word,
                    "word cloud canvas full"
                );
                break 'words;
            }
        }
    }

    svg.push_str("</svg>\n");
    svg
}

/// Builds the SVG word cloud for `rows`, or `None` when there are no usable
/// words.
#[must_use]
pub fn render_wordcloud(rows: &[FilteredRecord]) -> Option<String> {
    let corpus = build_corpus(rows);
    if corpus.trim().is_empty() {
        return None;
    }
    let words = word_frequencies(&corpus);
    if words.is_empty() {
        return None;
    }
    tracing::debug!(distinct = words.len(), "rendering word cloud");
    Some(render_svg(&words))
}
