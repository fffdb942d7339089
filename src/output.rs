use crate::error::Result;
use crate::ranking::Palette;
use crate::types::{RankedEntitySet, RankingRow, TrendRow, TrendSeries};
use crate::util::format_number;
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Ranking table rows, rank 1 first. Values use one decimal with thousands
/// separators.
pub fn ranking_rows(ranked: &RankedEntitySet, palette: &Palette) -> Vec<RankingRow> {
    ranked
        .entries
        .iter()
        .enumerate()
        .map(|(idx, e)| RankingRow {
            rank: idx + 1,
            entity: e.entity_name.clone(),
            value: format_number(e.value, 1),
            color: palette.color(e.color_id).to_string(),
        })
        .collect()
}

pub fn trend_rows(trend: &TrendSeries, palette: &Palette) -> Vec<TrendRow> {
    trend
        .series
        .iter()
        .flat_map(|s| {
            s.points.iter().map(move |p| TrendRow {
                entity: s.entity_name.clone(),
                time: p.time_label.clone(),
                value: format_number(p.value, 1),
                color: palette.color(s.color_id).to_string(),
            })
        })
        .collect()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
