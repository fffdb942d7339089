use crate::time::TimePoint;
use crate::types::Observation;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub const PERCENT_UNIT: &str = "%";

/// Folds a subordinate region into its parent region.
///
/// Standard provincial maps draw Xinjiang as one unit, so the corps figures
/// are added to the autonomous region and the corps row is dropped. Sums of
/// percentages are meaningless, so the rule does nothing for `%` indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionMergeRule {
    pub parent: String,
    pub subordinate: String,
}

impl Default for RegionMergeRule {
    fn default() -> Self {
        RegionMergeRule {
            parent: "新疆维吾尔自治区".to_string(),
            subordinate: "新疆生产建设兵团".to_string(),
        }
    }
}

impl RegionMergeRule {
    pub fn applies_to(&self, unit: Option<&str>) -> bool {
        unit.map(str::trim) != Some(PERCENT_UNIT)
    }

    /// Apply the rule to rows of one indicator. Rows are grouped by time
    /// point; within a group the first parent row and the first subordinate
    /// row are the ones combined. Row order is otherwise preserved.
    pub fn apply(&self, rows: Vec<Observation>, unit: Option<&str>) -> Vec<Observation> {
        if !self.applies_to(unit) {
            return rows;
        }

        let mut extra: HashMap<TimePoint, f64> = HashMap::new();
        for r in &rows {
            if r.region_key() == self.subordinate {
                extra.entry(r.time_point()).or_insert(r.value);
            }
        }

        let mut merged = 0usize;
        let mut seen_parent: HashSet<TimePoint> = HashSet::new();
        let out: Vec<Observation> = rows
            .into_iter()
            .filter(|r| r.region_key() != self.subordinate)
            .map(|mut r| {
                if r.region_key() == self.parent && seen_parent.insert(r.time_point()) {
                    if let Some(v) = extra.get(&r.time_point()) {
                        r.value += v;
                        merged += 1;
                    }
                }
                r
            })
            .collect();

        if merged > 0 {
            tracing::debug!(
                parent = %self.parent,
                subordinate = %self.subordinate,
                periods = merged,
                "Merged subordinate region values"
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(region: &str, year: i32, quarter: u8, value: f64) -> Observation {
        Observation {
            entity_name: region.to_string(),
            indicator_name: "营业收入".to_string(),
            indicator_number: "7".to_string(),
            chapter: "一".to_string(),
            unit: Some("亿元".to_string()),
            year,
            quarter,
            value,
            region: Some(region.to_string()),
        }
    }

    fn value_of(rows: &[Observation], region: &str) -> Option<f64> {
        rows.iter().find(|r| r.region_key() == region).map(|r| r.value)
    }

    #[test]
    fn merges_for_absolute_units() {
        let rule = RegionMergeRule::default();
        let rows = vec![
            row("新疆维吾尔自治区", 2025, 1, 5.0),
            row("广东省", 2025, 1, 20.0),
            row("新疆生产建设兵团", 2025, 1, 3.0),
        ];
        let out = rule.apply(rows, Some("亿元"));
        assert_eq!(out.len(), 2);
        assert_eq!(value_of(&out, "新疆维吾尔自治区"), Some(8.0));
        assert_eq!(value_of(&out, "新疆生产建设兵团"), None);
        assert_eq!(out[1].entity_name, "广东省");
    }

    #[test]
    fn percentage_rows_stay_distinct() {
        let rule = RegionMergeRule::default();
        let rows = vec![
            row("新疆维吾尔自治区", 2025, 1, 5.0),
            row("新疆生产建设兵团", 2025, 1, 3.0),
        ];
        let out = rule.apply(rows.clone(), Some("%"));
        assert_eq!(out, rows);
    }

    #[test]
    fn merge_is_per_time_point() {
        let rule = RegionMergeRule::default();
        let rows = vec![
            row("新疆维吾尔自治区", 2024, 4, 1.0),
            row("新疆维吾尔自治区", 2025, 1, 5.0),
            row("新疆生产建设兵团", 2025, 1, 3.0),
        ];
        let out = rule.apply(rows, None);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].value, 1.0);
        assert_eq!(out[1].value, 8.0);
    }

    #[test]
    fn subordinate_without_parent_is_dropped() {
        let rule = RegionMergeRule::default();
        let rows = vec![row("新疆生产建设兵团", 2025, 1, 3.0), row("广东省", 2025, 1, 2.0)];
        let out = rule.apply(rows, Some("亿元"));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].entity_name, "广东省");
    }

    #[test]
    fn first_seen_rows_are_combined() {
        let rule = RegionMergeRule::default();
        let rows = vec![
            row("新疆维吾尔自治区", 2025, 1, 5.0),
            row("新疆生产建设兵团", 2025, 1, 3.0),
            row("新疆维吾尔自治区", 2025, 1, 50.0),
            row("新疆生产建设兵团", 2025, 1, 30.0),
        ];
        let out = rule.apply(rows, Some("亿元"));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].value, 8.0);
        assert_eq!(out[1].value, 50.0);
    }
}
