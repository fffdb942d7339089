use crate::time::TimePoint;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

/// One row as produced by the spreadsheet export. Every field is kept as
/// text; typing happens in the normalizer.
#[derive(Debug, Default, Deserialize)]
pub struct RawRow {
    #[serde(rename = "企业名称", default)]
    pub entity_name: Option<String>,
    #[serde(rename = "省份", default)]
    pub region: Option<String>,
    #[serde(rename = "指标名称", default)]
    pub indicator_name: Option<String>,
    #[serde(rename = "指标序号", default)]
    pub indicator_number: Option<String>,
    #[serde(rename = "所属章节", default)]
    pub chapter: Option<String>,
    #[serde(rename = "单位", default)]
    pub unit: Option<String>,
    #[serde(rename = "年份", default)]
    pub year: Option<String>,
    #[serde(rename = "季度", default)]
    pub quarter: Option<String>,
    #[serde(rename = "数值", default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub entity_name: String,
    pub indicator_name: String,
    pub indicator_number: String,
    pub chapter: String,
    pub unit: Option<String>,
    pub year: i32,
    pub quarter: u8,
    pub value: f64,
    pub region: Option<String>,
}

impl Observation {
    pub fn time_point(&self) -> TimePoint {
        TimePoint { year: self.year, quarter: self.quarter }
    }

    /// Display label that disambiguates indicators sharing a name.
    pub fn display_label(&self) -> String {
        crate::util::indicator_display_label(&self.indicator_name, &self.indicator_number)
    }

    /// Name used when matching region-level rules.
    pub fn region_key(&self) -> &str {
        self.region.as_deref().unwrap_or(&self.entity_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetId {
    Central,
    Provincial,
}

impl DatasetId {
    pub const ALL: [DatasetId; 2] = [DatasetId::Central, DatasetId::Provincial];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetId::Central => "central",
            DatasetId::Provincial => "provincial",
        }
    }

    /// Column header used for the entity in previews.
    pub fn entity_header(&self) -> &'static str {
        match self {
            DatasetId::Central => "企业名称",
            DatasetId::Provincial => "省份",
        }
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetId {
    type Err = crate::error::DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "central" | "中央" => Ok(DatasetId::Central),
            "provincial" | "地方" => Ok(DatasetId::Provincial),
            other => Err(crate::error::DashboardError::UnknownDataset(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntity {
    pub entity_name: String,
    pub value: f64,
    pub color_id: usize,
}

/// Top-N entities at one time point, highest value first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntitySet {
    pub time_point: TimePoint,
    pub entries: Vec<RankedEntity>,
}

impl RankedEntitySet {
    pub fn empty(time_point: TimePoint) -> Self {
        RankedEntitySet { time_point, entries: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entity_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.entity_name.as_str()).collect()
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.entries.iter().any(|e| e.entity_name == entity)
    }

    pub fn color_map(&self) -> HashMap<String, usize> {
        self.entries
            .iter()
            .map(|e| (e.entity_name.clone(), e.color_id))
            .collect()
    }

    /// Entries lowest value first, the order horizontal bar charts use.
    pub fn display_ascending(&self) -> impl Iterator<Item = &RankedEntity> {
        self.entries.iter().rev()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub time_label: String,
    pub year: i32,
    pub quarter: u8,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityTrend {
    pub entity_name: String,
    pub color_id: usize,
    pub points: Vec<TrendPoint>,
}

/// Per-entity series in ranked order, sharing the ranked set's colors.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrendSeries {
    pub series: Vec<EntityTrend>,
}

impl TrendSeries {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn get(&self, entity: &str) -> Option<&EntityTrend> {
        self.series.iter().find(|s| s.entity_name == entity)
    }

    pub fn color_map(&self) -> HashMap<String, usize> {
        self.series
            .iter()
            .map(|s| (s.entity_name.clone(), s.color_id))
            .collect()
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RankingRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Entity")]
    #[tabled(rename = "Entity")]
    pub entity: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
    #[serde(rename = "Color")]
    #[tabled(rename = "Color")]
    pub color: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TrendRow {
    #[serde(rename = "Entity")]
    #[tabled(rename = "Entity")]
    pub entity: String,
    #[serde(rename = "Time")]
    #[tabled(rename = "Time")]
    pub time: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
    #[serde(rename = "Color")]
    #[tabled(rename = "Color")]
    pub color: String,
}
