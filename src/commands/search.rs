// Search command for listing registry mods matching a term

use crate::api::{Addon, Registry, SearchQuery, SortOrder};
use crate::constants::{GAME_MINECRAFT, NAME_WIDTH};
use crate::error::ModError;
use crate::ui;
use chrono::{DateTime, Utc};
use indicatif::HumanDuration;
use log::debug;

pub struct SearchOptions {
    pub term: String,
    pub game_version: Option<String>,
    /// Maximum rows to print, `None` prints every result
    pub limit: Option<usize>,
}

/// Search the registry by popularity and print one row per mod
pub async fn search(registry: &dyn Registry, options: SearchOptions) -> Result<usize, ModError> {
    let query = SearchQuery::new(options.term.as_str(), GAME_MINECRAFT)
        .game_version(options.game_version.clone())
        .sort(SortOrder::Popularity);

    let pb = ui::spinner(&format!("Searching for '{}'...", options.term));
    let results = registry.search(&query).await;
    ui::clear_bar(&pb);
    let results = results?;
    debug!("'{}' matched {} mod(s)", options.term, results.len());

    let shown = options.limit.unwrap_or(results.len()).min(results.len());
    let now = Utc::now();
    let rows: Vec<[String; 6]> = results[..shown].iter().map(|addon| row(addon, now)).collect();

    let header = [
        "ID".to_string(),
        "Name".to_string(),
        "Downloads".to_string(),
        "Last Updated".to_string(),
        "Slug".to_string(),
        "Versions".to_string(),
    ];
    let widths = column_widths(&header, &rows);

    ui::header(&render_row(&header, &widths));
    for row in &rows {
        ui::line(&render_row(row, &widths));
    }
    Ok(shown)
}

fn row(addon: &Addon, now: DateTime<Utc>) -> [String; 6] {
    [
        addon.id.to_string(),
        ellipsise(&addon.name, NAME_WIDTH),
        si_count(addon.download_count),
        addon
            .date_modified
            .map(|date| time_ago(date, now))
            .unwrap_or_else(|| "unknown".to_string()),
        addon.slug.clone(),
        addon.supported_versions().latest_patches().strings().join(", "),
    ]
}

fn column_widths(header: &[String; 6], rows: &[[String; 6]]) -> [usize; 6] {
    let mut widths = header.each_ref().map(|h| h.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    widths
}

fn render_row(cells: &[String; 6], widths: &[usize; 6]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Cut `text` to at most `width` characters, marking the cut with an ellipsis
fn ellipsise(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", kept.trim_end())
}

/// Render a count with an SI suffix and up to two decimals, e.g. `12.35M`
fn si_count(value: f64) -> String {
    const UNITS: [&str; 5] = ["", "k", "M", "G", "T"];
    let mut scaled = value;
    let mut unit = 0;
    while scaled.abs() >= 1000.0 && unit < UNITS.len() - 1 {
        scaled /= 1000.0;
        unit += 1;
    }
    let text = format!("{:.2}", scaled);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{}{}", text, UNITS[unit])
}

fn time_ago(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    match (now - date).to_std() {
        Ok(elapsed) => format!("{} ago", HumanDuration(elapsed)),
        Err(_) => "just now".to_string(),
    }
}
