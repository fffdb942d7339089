//! Indicator selection: the exact-match filter plus the option lists a
//! front end needs to build its selectors.

use crate::types::Observation;
use crate::util::resolve_display_label;
use std::collections::BTreeSet;

/// Observations of one indicator, optionally restricted to one chapter.
/// Both comparisons are exact string equality.
pub fn filter_indicator(
    data: &[Observation],
    indicator_name: &str,
    chapter: Option<&str>,
) -> Vec<Observation> {
    data.iter()
        .filter(|o| chapter.map_or(true, |c| o.chapter == c))
        .filter(|o| o.indicator_name == indicator_name)
        .cloned()
        .collect()
}

/// Same as [`filter_indicator`] but takes a display label.
pub fn filter_by_label(data: &[Observation], label: &str, chapter: Option<&str>) -> Vec<Observation> {
    filter_indicator(data, resolve_display_label(label), chapter)
}

pub fn filter_chapter(data: &[Observation], chapter: &str) -> Vec<Observation> {
    data.iter().filter(|o| o.chapter == chapter).cloned().collect()
}

/// Chapter of the first row carrying the display label `label`. Used when an
/// indicator is picked across all chapters.
pub fn chapter_of(data: &[Observation], label: &str) -> Option<String> {
    data.iter()
        .find(|o| o.display_label() == label)
        .map(|o| o.chapter.clone())
}

/// Distinct chapters, sorted.
pub fn chapters(data: &[Observation]) -> Vec<String> {
    data.iter()
        .map(|o| o.chapter.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted, distinct indicator display labels.
pub fn indicator_options(data: &[Observation]) -> Vec<String> {
    data.iter()
        .map(Observation::display_label)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Case-insensitive substring narrowing of a selector list. An empty term
/// returns everything.
pub fn search_options(options: &[String], term: &str) -> Vec<String> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return options.to_vec();
    }
    options
        .iter()
        .filter(|opt| opt.to_lowercase().contains(&term))
        .cloned()
        .collect()
}

/// Position of `preferred` in `options`, or 0 when it is absent.
pub fn default_index(options: &[String], preferred: Option<&str>) -> usize {
    preferred
        .and_then(|p| options.iter().position(|o| o == p))
        .unwrap_or(0)
}

/// Years present, newest first.
pub fn year_options(data: &[Observation]) -> Vec<i32> {
    let years: BTreeSet<i32> = data.iter().map(|o| o.year).collect();
    years.into_iter().rev().collect()
}

/// Quarters present, ascending.
pub fn quarter_options(data: &[Observation]) -> Vec<u8> {
    let quarters: BTreeSet<u8> = data.iter().map(|o| o.quarter).collect();
    quarters.into_iter().collect()
}

/// First non-empty unit among the rows.
pub fn unit_for(rows: &[Observation]) -> Option<String> {
    rows.iter().find_map(|o| o.unit.clone())
}
