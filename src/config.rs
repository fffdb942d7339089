//! Dashboard configuration.
//!
//! Read from a JSON file; every field has a default so a missing file or a
//! partial one is fine.

use crate::error::{DashboardError, Result};
use crate::region::RegionMergeRule;
use crate::types::DatasetId;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

pub const PASSWORD_ENV: &str = "DASHBOARD_PASSWORD";

/// Plotly's qualitative palette.
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#636EFA", "#EF553B", "#00CC96", "#AB63FA", "#FFA15A", "#19D3F3", "#FF6692", "#B6E880",
    "#FF97FF", "#FECB52",
];

/// Per-dataset settings.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DatasetProfile {
    /// CSV file, relative to `data_dir`.
    pub file: String,
    /// Number of entities kept by the ranking.
    pub rank_depth: usize,
    pub default_chapter: Option<String>,
    pub default_indicator: Option<String>,
    /// Region merge applied before ranking, if any.
    pub region_merge: Option<RegionMergeRule>,
}

impl DatasetProfile {
    pub fn central() -> Self {
        DatasetProfile {
            file: "central.csv".to_string(),
            rank_depth: 10,
            default_chapter: Some("三、完善国有企业科技创新机制加快实现高水平自立自强".to_string()),
            default_indicator: Some(
                "截至本填报期末，本企业研发人员占比（%），指标68/指标4 --- 3(68/4)".to_string(),
            ),
            region_merge: None,
        }
    }

    pub fn provincial() -> Self {
        DatasetProfile {
            file: "provincial.csv".to_string(),
            // 31 provincial regions plus the production and construction corps
            rank_depth: 32,
            default_chapter: Some("一、优化国有经济布局结构，加快建设现代化产业体系".to_string()),
            default_indicator: Some(
                "截至本填报期末，本年度监管企业前瞻性战略性新兴产业营业收入占比（指标7/指标4）"
                    .to_string(),
            ),
            region_merge: Some(RegionMergeRule::default()),
        }
    }
}

/// Keeps an explicit `null` apart from a missing key: a missing key stays
/// `None` through `#[serde(default)]`, `null` becomes `Some(None)`.
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial profile as written in the config file, applied over the
/// built-in profile of the same dataset. `null` clears an optional setting.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ProfilePatch {
    file: Option<String>,
    rank_depth: Option<usize>,
    #[serde(deserialize_with = "nullable")]
    default_chapter: Option<Option<String>>,
    #[serde(deserialize_with = "nullable")]
    default_indicator: Option<Option<String>>,
    #[serde(deserialize_with = "nullable")]
    region_merge: Option<Option<RegionMergeRule>>,
}

impl ProfilePatch {
    fn apply(self, mut base: DatasetProfile) -> DatasetProfile {
        if let Some(file) = self.file {
            base.file = file;
        }
        if let Some(depth) = self.rank_depth {
            base.rank_depth = depth;
        }
        if let Some(chapter) = self.default_chapter {
            base.default_chapter = chapter;
        }
        if let Some(indicator) = self.default_indicator {
            base.default_indicator = indicator;
        }
        if let Some(rule) = self.region_merge {
            base.region_merge = rule;
        }
        base
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ProfilesFile {
    central: ProfilePatch,
    provincial: ProfilePatch,
}

impl From<ProfilesFile> for DatasetProfiles {
    fn from(file: ProfilesFile) -> Self {
        DatasetProfiles {
            central: file.central.apply(DatasetProfile::central()),
            provincial: file.provincial.apply(DatasetProfile::provincial()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "ProfilesFile")]
pub struct DatasetProfiles {
    pub central: DatasetProfile,
    pub provincial: DatasetProfile,
}

impl Default for DatasetProfiles {
    fn default() -> Self {
        DatasetProfiles {
            central: DatasetProfile::central(),
            provincial: DatasetProfile::provincial(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    pub datasets: DatasetProfiles,
    pub palette: Vec<String>,
    pub password: Option<String>,
    /// Local GeoJSON file with region boundaries.
    pub boundary_path: Option<PathBuf>,
    pub export_dir: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data_dir: PathBuf::from("data"),
            datasets: DatasetProfiles::default(),
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            password: None,
            boundary_path: None,
            export_dir: PathBuf::from("."),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from `path`, falling back to defaults when the file
    /// does not exist. The password environment variable wins over the file.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(path)?;
            serde_json::from_str::<DashboardConfig>(&text)
                .map_err(|e| DashboardError::Config(format!("{}: {}", path.display(), e)))?
        } else {
            tracing::info!(path = %path.display(), "No config file, using defaults");
            DashboardConfig::default()
        };
        if let Ok(pw) = std::env::var(PASSWORD_ENV) {
            if !pw.is_empty() {
                config.password = Some(pw);
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.palette.is_empty() {
            return Err(DashboardError::Config("palette must not be empty".into()));
        }
        for id in DatasetId::ALL {
            if self.profile(id).rank_depth == 0 {
                return Err(DashboardError::Config(format!(
                    "rank_depth for '{}' must be at least 1",
                    id
                )));
            }
        }
        Ok(())
    }

    pub fn profile(&self, id: DatasetId) -> &DatasetProfile {
        match id {
            DatasetId::Central => &self.datasets.central,
            DatasetId::Provincial => &self.datasets.provincial,
        }
    }

    pub fn dataset_path(&self, id: DatasetId) -> PathBuf {
        self.data_dir.join(&self.profile(id).file)
    }
}
