//! End-to-end tests: CSV fixture on disk → cache → view.

use reform_dashboard::auth::AuthContext;
use reform_dashboard::config::DashboardConfig;
use reform_dashboard::loader::{load_csv, DatasetCache};
use reform_dashboard::time::{TimePoint, TimeRange};
use reform_dashboard::types::DatasetId;
use reform_dashboard::{Dashboard, DashboardError, ViewRequest};
use std::path::Path;
use std::rc::Rc;
use tempfile::TempDir;

const CENTRAL_CSV: &str = "\
企业名称,指标名称,指标序号,所属章节,单位,年份,季度,数值
甲集团,研发人员占比,3(68/4),三、科技创新,%,2025,1,12.5%
乙集团,研发人员占比,3(68/4),三、科技创新,%,2025,1,12.5%
丙集团,研发人员占比,3(68/4),三、科技创新,%,2025,1,9%
丁集团,研发人员占比,3(68/4),三、科技创新,%,2025,1,abc
甲集团,研发人员占比,3(68/4),三、科技创新,%,2024,4,11%
乙集团,研发人员占比,3(68/4),三、科技创新,%,2024,3,10%
丙集团,研发人员占比,3(68/4),三、科技创新,%,2024,4,8%
甲集团,研发人员占比,3(68/4),三、科技创新,%,2024,2,7.5
乙集团,研发投入,5,三、科技创新,亿元,2025,1,100
";

const PROVINCIAL_CSV: &str = "\
省份,指标名称,指标序号,所属章节,单位,年份,季度,数值
新疆维吾尔自治区,新兴产业营业收入,7,一、布局结构,亿元,2025,1,5
新疆生产建设兵团,新兴产业营业收入,7,一、布局结构,亿元,2025,1,3
广东省,新兴产业营业收入,7,一、布局结构,亿元,2025,1,7
新疆维吾尔自治区,新兴产业营业收入占比,8,一、布局结构,%,2025,1,5%
新疆生产建设兵团,新兴产业营业收入占比,8,一、布局结构,%,2025,1,3%
广东省,新兴产业营业收入占比,8,一、布局结构,%,2025,1,7%
";

fn fixture() -> (TempDir, DashboardConfig) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("central.csv"), CENTRAL_CSV).unwrap();
    std::fs::write(dir.path().join("provincial.csv"), PROVINCIAL_CSV).unwrap();
    let config = DashboardConfig {
        data_dir: dir.path().to_path_buf(),
        password: Some("pw".to_string()),
        export_dir: dir.path().to_path_buf(),
        ..DashboardConfig::default()
    };
    (dir, config)
}

fn tp(y: i32, q: i64) -> TimePoint {
    TimePoint::new(y, q).unwrap()
}

fn auth(config: &DashboardConfig) -> AuthContext {
    AuthContext::verify(config.password.as_deref(), "pw").unwrap()
}

fn central_request(start: TimePoint, end: TimePoint) -> ViewRequest {
    ViewRequest {
        dataset: DatasetId::Central,
        chapter: Some("三、科技创新".to_string()),
        indicator_label: "研发人员占比 --- 3(68/4)".to_string(),
        panel: tp(2025, 1),
        range: TimeRange::new(start, end),
    }
}

#[test]
fn test_load_csv_drops_unparseable_values() {
    let (dir, _) = fixture();
    let (obs, report) = load_csv(&dir.path().join("central.csv")).unwrap();
    assert_eq!(report.total_rows, 9);
    assert_eq!(report.kept_rows, 8);
    assert_eq!(report.dropped_rows, 1);
    assert!(obs.iter().all(|o| o.entity_name != "丁集团"));
    assert_eq!(obs[0].value, 12.5);
    assert_eq!(obs[0].display_label(), "研发人员占比 --- 3(68/4)");
}

#[test]
fn test_cache_returns_same_snapshot() {
    let (dir, _) = fixture();
    let path = dir.path().join("central.csv");
    let mut cache = DatasetCache::new();
    let first = cache.get_or_load(DatasetId::Central, &path);
    // the source is not read again
    std::fs::remove_file(&path).unwrap();
    let second = cache.get_or_load(DatasetId::Central, &path);
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(second.observations.len(), 8);
}

#[test]
fn test_central_view_ranks_and_trends_consistently() {
    let (_dir, config) = fixture();
    let ctx = auth(&config);
    let mut dashboard = Dashboard::with_boundary_provider(config, None);
    let view = dashboard
        .view(&ctx, &central_request(tp(2024, 1), tp(2025, 4)))
        .unwrap();

    // tie at 12.5 keeps file order
    assert_eq!(view.ranked.entity_names(), vec!["甲集团", "乙集团", "丙集团"]);
    assert_eq!(view.axis_label, "数值 (%)");
    assert_eq!(view.indicator_name, "研发人员占比");

    let a = view.trend.get("甲集团").unwrap();
    let labels: Vec<&str> = a.points.iter().map(|p| p.time_label.as_str()).collect();
    assert_eq!(labels, vec!["2024-Q2", "2024-Q4", "2025-Q1"]);

    let colors = view.ranked.color_map();
    for series in &view.trend.series {
        assert_eq!(colors[&series.entity_name], series.color_id);
    }
}

#[test]
fn test_inverted_range_gives_empty_trend() {
    let (_dir, config) = fixture();
    let ctx = auth(&config);
    let mut dashboard = Dashboard::with_boundary_provider(config, None);
    let view = dashboard
        .view(&ctx, &central_request(tp(2025, 1), tp(2024, 1)))
        .unwrap();
    assert!(view.has_data());
    assert!(view.trend.is_empty());
}

#[test]
fn test_reselection_rederives_from_scratch() {
    let (_dir, config) = fixture();
    let ctx = auth(&config);
    let mut dashboard = Dashboard::with_boundary_provider(config, None);
    let mut req = central_request(tp(2024, 1), tp(2025, 4));
    let first = dashboard.view(&ctx, &req).unwrap();

    req.panel = tp(2024, 4);
    let second = dashboard.view(&ctx, &req).unwrap();
    assert_eq!(second.ranked.entity_names(), vec!["甲集团", "丙集团"]);
    assert!(!second.ranked.contains("乙集团"));
    assert!(second.trend.get("乙集团").is_none());

    req.panel = tp(2025, 1);
    let third = dashboard.view(&ctx, &req).unwrap();
    assert_eq!(first.ranked, third.ranked);
    assert_eq!(first.trend, third.trend);
}

#[test]
fn test_provincial_merge_only_for_absolute_units() {
    let (_dir, config) = fixture();
    let ctx = auth(&config);
    let mut dashboard = Dashboard::with_boundary_provider(config, None);
    let mut req = ViewRequest {
        dataset: DatasetId::Provincial,
        chapter: Some("一、布局结构".to_string()),
        indicator_label: "新兴产业营业收入 --- 7".to_string(),
        panel: tp(2025, 1),
        range: TimeRange::new(tp(2025, 1), tp(2025, 1)),
    };

    let view = dashboard.view(&ctx, &req).unwrap();
    assert_eq!(view.ranked.entity_names(), vec!["新疆维吾尔自治区", "广东省"]);
    assert_eq!(view.ranked.entries[0].value, 8.0);
    assert_eq!(view.merged_region.as_deref(), Some("新疆维吾尔自治区"));

    req.indicator_label = "新兴产业营业收入占比 --- 8".to_string();
    let view = dashboard.view(&ctx, &req).unwrap();
    assert_eq!(
        view.ranked.entity_names(),
        vec!["广东省", "新疆维吾尔自治区", "新疆生产建设兵团"]
    );
    assert!(view.merged_region.is_none());
}

#[test]
fn test_config_null_disables_provincial_merge() {
    let (dir, _) = fixture();
    let path = dir.path().join("dashboard.json");
    let json = format!(
        r#"{{ "data_dir": {}, "password": "pw", "datasets": {{ "provincial": {{ "region_merge": null }} }} }}"#,
        serde_json::to_string(dir.path()).unwrap()
    );
    std::fs::write(&path, json).unwrap();
    let config = DashboardConfig::load(&path).unwrap();
    assert!(config.datasets.provincial.region_merge.is_none());

    let ctx = AuthContext::verify(Some("pw"), "pw").unwrap();
    let mut dashboard = Dashboard::with_boundary_provider(config, None);
    let view = dashboard
        .view(
            &ctx,
            &ViewRequest {
                dataset: DatasetId::Provincial,
                chapter: None,
                indicator_label: "新兴产业营业收入 --- 7".to_string(),
                panel: tp(2025, 1),
                range: TimeRange::new(tp(2025, 1), tp(2025, 1)),
            },
        )
        .unwrap();
    assert_eq!(
        view.ranked.entity_names(),
        vec!["广东省", "新疆维吾尔自治区", "新疆生产建设兵团"]
    );
    assert!(view.merged_region.is_none());
}

#[test]
fn test_missing_dataset_reports_no_data() {
    let (dir, config) = fixture();
    std::fs::remove_file(dir.path().join("central.csv")).unwrap();
    let ctx = auth(&config);
    let mut dashboard = Dashboard::with_boundary_provider(config, None);
    let err = dashboard
        .view(&ctx, &central_request(tp(2024, 1), tp(2025, 4)))
        .unwrap_err();
    assert!(matches!(err, DashboardError::NoData(_)));
}

#[test]
fn test_config_file_round_trip() {
    let (dir, config) = fixture();
    let path = dir.path().join("dashboard.json");
    std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    let loaded = DashboardConfig::load(&path).unwrap();
    assert_eq!(loaded.data_dir, config.data_dir);
    assert_eq!(loaded.datasets, config.datasets);
    assert!(DashboardConfig::load(Path::new("/nonexistent/dashboard.json")).is_ok());
}
