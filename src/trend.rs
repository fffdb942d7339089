use crate::time::{TimePoint, TimeRange};
use crate::types::{EntityTrend, Observation, RankedEntitySet, TrendPoint, TrendSeries};
use std::collections::HashMap;

/// Time series over `range` for exactly the entities of `ranked`.
///
/// Series come out in ranked order and carry the ranked set's color ids.
/// Points are ordered by `(year, quarter)`; the first observation of an
/// entity at a time point wins. Entities with no point in range are left
/// out, and missing periods are not filled.
pub fn assemble_trend(
    rows: &[Observation],
    ranked: &RankedEntitySet,
    range: &TimeRange,
) -> TrendSeries {
    if ranked.is_empty() || range.is_inverted() {
        return TrendSeries::default();
    }

    // Seeded from the ranked set so rows of other entities are skipped.
    let mut by_entity: HashMap<&str, HashMap<TimePoint, f64>> = ranked
        .entries
        .iter()
        .map(|e| (e.entity_name.as_str(), HashMap::new()))
        .collect();

    for o in rows.iter().filter(|o| range.contains(o.year, o.quarter)) {
        if let Some(points) = by_entity.get_mut(o.entity_name.as_str()) {
            // same first-seen rule as the ranking, so the panel quarter agrees
            points.entry(o.time_point()).or_insert(o.value);
        }
    }

    let series = ranked
        .entries
        .iter()
        .filter_map(|e| {
            let points = by_entity.remove(e.entity_name.as_str())?;
            if points.is_empty() {
                return None;
            }
            // HashMap order is arbitrary; the chart needs chronological order.
            let mut points: Vec<(TimePoint, f64)> = points.into_iter().collect();
            points.sort_by_key(|(tp, _)| (tp.year, tp.quarter));
            Some(EntityTrend {
                entity_name: e.entity_name.clone(),
                color_id: e.color_id,
                points: points
                    .into_iter()
                    .map(|(tp, value)| TrendPoint {
                        time_label: tp.label(),
                        year: tp.year,
                        quarter: tp.quarter,
                        value,
                    })
                    .collect(),
            })
        })
        .collect();

    TrendSeries { series }
}
