use crate::config::DEFAULT_PALETTE;
use crate::time::TimePoint;
use crate::types::{Observation, RankedEntity, RankedEntitySet};
use std::collections::HashSet;

/// Cyclic list of display colors. Color ids index into it modulo its length.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<String>,
}

impl Palette {
    pub fn new(colors: Vec<String>) -> Self {
        if colors.is_empty() {
            return Palette::default();
        }
        Palette { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn color(&self, color_id: usize) -> &str {
        &self.colors[color_id % self.colors.len()]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            colors: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Top `n` entities of `rows` at `time_point`, highest value first.
///
/// Only the first observation of an entity at the time point counts. Ties
/// keep input order (the sort is stable). Color ids follow the ascending
/// display order, so the lowest selected entity gets slot 0.
pub fn rank_top_n(
    rows: &[Observation],
    time_point: TimePoint,
    n: usize,
    palette: &Palette,
) -> RankedEntitySet {
    // Duplicates are kept by the loader; the first row of an entity wins.
    let mut seen: HashSet<&str> = HashSet::new();
    let mut candidates: Vec<&Observation> = rows
        .iter()
        .filter(|o| o.year == time_point.year && o.quarter == time_point.quarter)
        .filter(|o| seen.insert(o.entity_name.as_str()))
        .collect();

    if candidates.is_empty() {
        return RankedEntitySet::empty(time_point);
    }

    // Stable sort: equal values stay in input order. -0.0 and 0.0 compare
    // equal. A NaN never comes out of the loader, but if one is passed in it
    // sorts last so the order stays total.
    candidates.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or_else(|| a.value.is_nan().cmp(&b.value.is_nan()))
    });
    candidates.truncate(n);

    // Bars are drawn lowest first, and colors are handed out in drawing
    // order, so rank 0 gets the last slot.
    let len = candidates.len();
    let entries = candidates
        .into_iter()
        .enumerate()
        .map(|(rank_idx, o)| RankedEntity {
            entity_name: o.entity_name.clone(),
            value: o.value,
            color_id: (len - 1 - rank_idx) % palette.len(),
        })
        .collect();

    RankedEntitySet { time_point, entries }
}
