use crate::error::{DashboardError, Result};
use crate::types::{DatasetId, Observation, RawRow};
use crate::util::{non_empty, parse_int_safe, parse_value};
use chrono::{DateTime, Local};
use csv::{ReaderBuilder, Trim};
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub dropped_rows: usize,
}

/// Immutable, typed view of one dataset.
#[derive(Debug, Clone)]
pub struct DatasetSnapshot {
    pub id: DatasetId,
    pub observations: Vec<Observation>,
    pub report: LoadReport,
    pub loaded_at: DateTime<Local>,
}

impl DatasetSnapshot {
    pub fn empty(id: DatasetId) -> Self {
        DatasetSnapshot {
            id,
            observations: Vec::new(),
            report: LoadReport::default(),
            loaded_at: Local::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Turn one raw row into an observation, or `None` if it is malformed.
///
/// The value is checked first since it is the field most often left blank
/// or filled with text in the source sheets.
pub fn normalize_row(row: RawRow) -> Option<Observation> {
    let value = parse_value(row.value.as_deref())?;
    let year = i32::try_from(parse_int_safe(row.year.as_deref())?).ok()?;
    let quarter = parse_int_safe(row.quarter.as_deref())?;
    if !(1..=4).contains(&quarter) {
        return None;
    }

    let region = non_empty(row.region);
    // Provincial sheets name the entity by its region only.
    let entity_name = non_empty(row.entity_name).or_else(|| region.clone())?;
    let indicator_name = non_empty(row.indicator_name)?;

    Some(Observation {
        entity_name,
        indicator_name,
        indicator_number: non_empty(row.indicator_number).unwrap_or_default(),
        chapter: non_empty(row.chapter).unwrap_or_default(),
        unit: non_empty(row.unit),
        year,
        quarter: quarter as u8,
        value,
        region,
    })
}

/// Normalize raw rows, keeping input order and silently dropping malformed
/// rows.
pub fn normalize<I>(rows: I) -> (Vec<Observation>, LoadReport)
where
    I: IntoIterator<Item = RawRow>,
{
    let mut report = LoadReport::default();
    let mut out = Vec::new();
    for (idx, row) in rows.into_iter().enumerate() {
        report.total_rows += 1;
        match normalize_row(row) {
            Some(obs) => out.push(obs),
            None => {
                report.dropped_rows += 1;
                tracing::debug!(row = idx + 1, "Dropped malformed row");
            }
        }
    }
    report.kept_rows = out.len();
    (out, report)
}

/// Read and normalize a CSV export. Rows the CSV reader itself rejects
/// count as dropped rows; only an unreadable file is an error.
pub fn load_csv(path: &Path) -> Result<(Vec<Observation>, LoadReport)> {
    if !path.exists() {
        return Err(DashboardError::DatasetNotFound(path.display().to_string()));
    }
    // Exports pad header cells and sometimes drop trailing empty cells.
    // Field values are left untouched here; the normalizer trims them.
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_path(path)?;

    let mut unreadable = 0usize;
    let mut raw = Vec::new();
    for result in rdr.deserialize::<RawRow>() {
        match result {
            Ok(r) => raw.push(r),
            Err(e) => {
                unreadable += 1;
                tracing::debug!(error = %e, "Skipped unreadable CSV record");
            }
        }
    }

    // Unreadable records never reach the normalizer, so add them to its counts.
    let (observations, mut report) = normalize(raw);
    report.total_rows += unreadable;
    report.dropped_rows += unreadable;
    Ok((observations, report))
}

/// Explicit cache handle for dataset snapshots. A dataset is read at most
/// once per cache; failures are cached as empty snapshots.
#[derive(Debug, Default)]
pub struct DatasetCache {
    snapshots: HashMap<DatasetId, Rc<DatasetSnapshot>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&mut self, id: DatasetId, path: &Path) -> Rc<DatasetSnapshot> {
        if let Some(snapshot) = self.snapshots.get(&id) {
            tracing::debug!(dataset = %id, "Dataset cache hit");
            return Rc::clone(snapshot);
        }

        let snapshot = match load_csv(path) {
            Ok((observations, report)) => {
                tracing::info!(
                    dataset = %id,
                    total = report.total_rows,
                    kept = report.kept_rows,
                    dropped = report.dropped_rows,
                    "Loaded dataset"
                );
                DatasetSnapshot {
                    id,
                    observations,
                    report,
                    loaded_at: Local::now(),
                }
            }
            Err(e) => {
                tracing::warn!(dataset = %id, path = %path.display(), error = %e, "Dataset load failed");
                DatasetSnapshot::empty(id)
            }
        };

        let snapshot = Rc::new(snapshot);
        self.snapshots.insert(id, Rc::clone(&snapshot));
        snapshot
    }

    pub fn is_cached(&self, id: DatasetId) -> bool {
        self.snapshots.contains_key(&id)
    }

    /// Forget a snapshot so the next request re-reads the source.
    pub fn invalidate(&mut self, id: DatasetId) {
        self.snapshots.remove(&id);
    }
}
