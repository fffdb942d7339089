// Terminal front end.
//
// - The session starts behind a password gate.
// - The analyst picks a dataset, a chapter, an indicator (with keyword
//   search), a panel quarter and a trend range.
// - The ranking and the trend are printed as tables and exported to CSV
//   and JSON.
use reform_dashboard::auth::AuthContext;
use reform_dashboard::config::DashboardConfig;
use reform_dashboard::filter::{
    chapter_of, chapters, default_index, filter_chapter, indicator_options, quarter_options,
    search_options, year_options,
};
use reform_dashboard::output;
use reform_dashboard::time::{TimePoint, TimeRange};
use reform_dashboard::types::{DatasetId, Observation};
use reform_dashboard::util::format_int;
use reform_dashboard::{Dashboard, DashboardError, DashboardView, ViewRequest};
use std::io::{self, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

const MAX_PASSWORD_ATTEMPTS: usize = 3;
const ALL_CHAPTERS: &str = "全部章节";
const DEFAULT_RANGE_START: (i32, u8) = (2024, 4);
const DEFAULT_RANGE_END: (i32, u8) = (2025, 1);

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Let the user pick one entry by number. An empty answer keeps `default`.
fn pick<T: ToString>(title: &str, options: &[T], default: usize) -> Option<usize> {
    if options.is_empty() {
        return None;
    }
    println!("{}", title);
    for (i, opt) in options.iter().enumerate() {
        let marker = if i == default { "*" } else { " " };
        println!("{} [{}] {}", marker, i + 1, opt.to_string());
    }
    loop {
        let answer = read_line("Enter choice (blank for *): ");
        if answer.is_empty() {
            return Some(default);
        }
        match answer.parse::<usize>() {
            Ok(n) if (1..=options.len()).contains(&n) => return Some(n - 1),
            _ => println!("Invalid choice. Please enter 1-{}.", options.len()),
        }
    }
}

fn prompt_back_to_menu() -> bool {
    loop {
        let resp = read_line("Back to Dataset Selection (Y/N): ").to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn login(config: &DashboardConfig) -> Option<AuthContext> {
    for _ in 0..MAX_PASSWORD_ATTEMPTS {
        let attempt = read_line("请输入密码: ");
        match AuthContext::verify(config.password.as_deref(), &attempt) {
            Ok(ctx) => return Some(ctx),
            Err(DashboardError::IncorrectPassword) => {
                println!("密码不正确，请重试");
            }
            Err(e) => {
                eprintln!("{}", e);
                return None;
            }
        }
    }
    None
}

fn pick_indicator(chapter_rows: &[Observation], preferred: Option<&str>) -> Option<String> {
    let all = indicator_options(chapter_rows);
    loop {
        let term = read_line("指标关键词搜索 (blank for all): ");
        let options = search_options(&all, &term);
        if options.is_empty() {
            println!("No indicator matches '{}'. Adjust the keyword.\n", term);
            continue;
        }
        let default = if term.is_empty() { default_index(&options, preferred) } else { 0 };
        return pick("Indicators:", &options, default).map(|i| options[i].clone());
    }
}

fn pick_time_point(title: &str, years: &[i32], quarters: &[u8], preferred: Option<(i32, u8)>) -> Option<TimePoint> {
    let year_default = preferred
        .and_then(|(y, _)| years.iter().position(|v| *v == y))
        .unwrap_or(0);
    let quarter_default = preferred
        .and_then(|(_, q)| quarters.iter().position(|v| *v == q))
        .unwrap_or(0);
    let year = years[pick(&format!("{} - year:", title), years, year_default)?];
    let quarter = quarters[pick(&format!("{} - quarter:", title), quarters, quarter_default)?];
    TimePoint::new(year, quarter as i64).ok()
}

fn build_request(dashboard: &mut Dashboard, id: DatasetId) -> Option<ViewRequest> {
    let snapshot = dashboard.dataset(id);
    if snapshot.is_empty() {
        println!("Error: no data available for the {} dataset.\n", id);
        return None;
    }
    println!(
        "Dataset {} loaded at {} ({} rows kept, {} dropped)\n",
        id,
        snapshot.loaded_at.format("%Y-%m-%d %H:%M:%S"),
        format_int(snapshot.report.kept_rows),
        format_int(snapshot.report.dropped_rows)
    );

    let profile = dashboard.config().profile(id).clone();
    // First entry searches indicators across every chapter.
    let mut chapter_list = vec![ALL_CHAPTERS.to_string()];
    chapter_list.extend(chapters(&snapshot.observations));
    let chapter_idx = pick(
        "Chapters:",
        &chapter_list,
        default_index(&chapter_list, profile.default_chapter.as_deref()),
    )?;
    let chapter_rows = if chapter_idx == 0 {
        snapshot.observations.clone()
    } else {
        filter_chapter(&snapshot.observations, &chapter_list[chapter_idx])
    };

    let indicator_label = pick_indicator(&chapter_rows, profile.default_indicator.as_deref())?;
    // Narrow to the indicator's own chapter so a name shared across
    // chapters does not mix their rows.
    let chapter = chapter_of(&chapter_rows, &indicator_label);
    println!("\n当前分析指标：{}", indicator_label);
    if let Some(c) = &chapter {
        println!("所属章节：{}", c);
    }
    println!();

    let years = year_options(&chapter_rows);
    let quarters = quarter_options(&chapter_rows);
    let panel = pick_time_point("Panel", &years, &quarters, None)?;
    let start = pick_time_point("Trend start", &years, &quarters, Some(DEFAULT_RANGE_START))?;
    let end = pick_time_point("Trend end", &years, &quarters, Some(DEFAULT_RANGE_END))?;

    Some(ViewRequest {
        dataset: id,
        chapter,
        indicator_label,
        panel,
        range: TimeRange::new(start, end),
    })
}

fn show_view(dashboard: &Dashboard, view: &DashboardView) {
    let palette = dashboard.palette();
    if !view.has_data() {
        println!("当前筛选条件下无数据 ({}).\n", view.ranked.time_point);
        return;
    }

    let ranking = output::ranking_rows(&view.ranked, palette);
    println!(
        "{} - Top {} {} ({})\n",
        view.ranked.time_point,
        view.ranked.len(),
        view.dataset.entity_header(),
        view.axis_label
    );
    output::preview_table_rows(&ranking, ranking.len());

    let trend = output::trend_rows(&view.trend, palette);
    println!(
        "Trend {} - {} ({})\n",
        view.range.start, view.range.end, view.axis_label
    );
    output::preview_table_rows(&trend, trend.len());

    if let Some(parent) = &view.merged_region {
        println!("数据说明：地图与排名中“{}”的数值为自治区与兵团两者的总和。\n", parent);
    }

    if view.dataset == DatasetId::Provincial {
        let missing = dashboard.boundaries().missing(&view.ranked.entity_names());
        if !missing.is_empty() {
            println!("Note: no map boundary for {}\n", missing.join(", "));
        }
    }

    let dir = &dashboard.config().export_dir;
    let exports = [
        ("ranking.csv", output::write_csv(&dir.join("ranking.csv"), &ranking)),
        ("trend.csv", output::write_csv(&dir.join("trend.csv"), &trend)),
        ("view.json", output::write_json(&dir.join("view.json"), view)),
    ];
    for (name, result) in exports {
        match result {
            Ok(()) => println!("(Exported {})", dir.join(name).display()),
            Err(e) => eprintln!("Write error: {}", e),
        }
    }
    println!();
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "dashboard.json".to_string());
    let config = match DashboardConfig::load(Path::new(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let Some(auth) = login(&config) else {
        println!("Exiting the program.");
        return;
    };
    let mut dashboard = Dashboard::new(config);

    loop {
        println!("中央企业、地方国企改革深化提升行动重点量化指标");
        println!("[1] 中央企业 (central)");
        println!("[2] 地方国企 (provincial)");
        println!("[3] Exit\n");
        let id = match read_line("Enter choice: ").as_str() {
            "1" => DatasetId::Central,
            "2" => DatasetId::Provincial,
            "3" => break,
            _ => {
                println!("Invalid choice. Please enter 1, 2 or 3.\n");
                continue;
            }
        };

        if let Some(req) = build_request(&mut dashboard, id) {
            match dashboard.view(&auth, &req) {
                Ok(view) => show_view(&dashboard, &view),
                Err(e) => println!("{}\n", e),
            }
        }
        if !prompt_back_to_menu() {
            break;
        }
    }
    println!("Exiting the program.");
}
