//! Plain-text and JSON rendering for the CLI.

use std::fmt::Write as _;

use atlas_engine::listing::{ListProjection, PageControl};
use atlas_engine::{DetailSnapshot, NodeState};
use atlas_types::{CountryEntity, PhotoRecord, SummaryRecord, WeatherSnapshot};
use atlas_util::{display_width, pad_display};
use serde::Serialize;
use serde_json::{Value, json};

const COLUMN_GAP: usize = 2;

pub fn list_table(projection: &ListProjection<'_>, share: &str) -> String {
    let rows: Vec<[&str; 3]> = projection
        .items
        .iter()
        .map(|entity| [entity.common_name(), entity.region.as_str(), entity.primary_capital().unwrap_or("-")])
        .collect();
    let headers = ["NAME", "REGION", "CAPITAL"];
    let mut widths = headers.map(display_width);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(cell));
        }
    }

    let mut out = String::new();
    push_row(&mut out, &headers, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    if rows.is_empty() {
        out.push_str("(no countries match)\n");
    }

    let _ = writeln!(
        out,
        "\nPage {} of {} ({} matching)  {}",
        projection.page,
        projection.total_pages,
        projection.filtered_len,
        pagination_strip(projection)
    );
    if !share.is_empty() {
        let _ = writeln!(out, "share: ?{share}");
    }
    out
}

fn push_row(out: &mut String, cells: &[&str; 3], widths: &[usize; 3]) {
    let last = cells.len() - 1;
    for (index, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if index == last {
            out.push_str(cell);
        } else {
            out.push_str(&pad_display(cell, width + COLUMN_GAP));
        }
    }
    out.push('\n');
}

fn pagination_strip(projection: &ListProjection<'_>) -> String {
    let mut parts = Vec::with_capacity(projection.controls.len() + 2);
    parts.push(if projection.has_previous() { "<" } else { " " }.to_string());
    for control in &projection.controls {
        parts.push(match control {
            PageControl::Page(page) if *page == projection.page => format!("[{page}]"),
            PageControl::Page(page) => page.to_string(),
            PageControl::Ellipsis => "...".to_string(),
        });
    }
    parts.push(if projection.has_next() { ">" } else { " " }.to_string());
    parts.join(" ").trim_end().to_string()
}

pub fn detail_text(snapshot: &DetailSnapshot) -> String {
    let mut out = String::new();
    if snapshot.subject_key.is_empty() {
        out.push_str("no country given\n");
        return out;
    }

    match &snapshot.entity {
        NodeState::Success(entity) => entity_text(&mut out, entity),
        other => {
            let _ = writeln!(out, "{}: {}", snapshot.subject_key, node_note(other));
        }
    }

    out.push_str("\nWeather: ");
    match &snapshot.weather {
        NodeState::Success(weather) => weather_text(&mut out, weather),
        other => {
            let _ = writeln!(out, "{}", node_note(other));
        }
    }

    out.push_str("\nSummary: ");
    match &snapshot.summary {
        NodeState::Success(summary) => summary_text(&mut out, summary),
        other => {
            let _ = writeln!(out, "{}", node_note(other));
        }
    }

    out.push_str("\nPhotos: ");
    match &snapshot.photos {
        NodeState::Success(photos) => photos_text(&mut out, photos),
        other => {
            let _ = writeln!(out, "{}", node_note(other));
        }
    }
    out
}

fn node_note<T>(state: &NodeState<T>) -> String {
    match state {
        NodeState::Inactive => "not requested".to_string(),
        NodeState::Loading => "loading".to_string(),
        NodeState::Success(_) => "ok".to_string(),
        NodeState::Error(error) => format!("error: {error}"),
    }
}

fn entity_text(out: &mut String, entity: &CountryEntity) {
    match entity.name.official.as_deref() {
        Some(official) if official != entity.common_name() => {
            let _ = writeln!(out, "{} ({official})", entity.common_name());
        }
        _ => {
            let _ = writeln!(out, "{}", entity.common_name());
        }
    }
    let region = match entity.subregion.as_deref() {
        Some(subregion) => format!("{} / {subregion}", entity.region),
        None => entity.region.clone(),
    };
    let _ = writeln!(out, "  Region:     {region}");
    let _ = writeln!(out, "  Capital:    {}", entity.primary_capital().unwrap_or("-"));
    if let Some(population) = entity.population {
        let _ = writeln!(out, "  Population: {}", group_thousands(population));
    }
    let languages = entity.language_names();
    if !languages.is_empty() {
        let _ = writeln!(out, "  Languages:  {}", languages.join(", "));
    }
    let currencies = entity.currency_labels();
    if !currencies.is_empty() {
        let _ = writeln!(out, "  Currencies: {}", currencies.join(", "));
    }
    if let Some(flag) = entity.flag_image() {
        let _ = writeln!(out, "  Flag:       {flag}");
    }
}

fn weather_text(out: &mut String, weather: &WeatherSnapshot) {
    let mut parts = Vec::new();
    if let Some(temperature) = weather.temperature_2m {
        parts.push(format!("{temperature:.1} °C"));
    }
    if let Some(wind) = weather.wind_speed_10m {
        parts.push(format!("wind {wind:.1} km/h"));
    }
    if let Some(condition) = weather.condition() {
        parts.push(condition.to_string());
    }
    if parts.is_empty() {
        out.push_str("no current readings\n");
    } else {
        let _ = writeln!(out, "{}", parts.join(", "));
    }
}

fn summary_text(out: &mut String, summary: &SummaryRecord) {
    let _ = writeln!(out, "{}", summary.title);
    let _ = writeln!(out, "  {}", summary.extract.trim());
    if let Some(link) = summary.page_link() {
        let _ = writeln!(out, "  {link}");
    }
}

fn photos_text(out: &mut String, photos: &[PhotoRecord]) {
    if photos.is_empty() {
        out.push_str("none found\n");
        return;
    }
    out.push('\n');
    for photo in photos {
        let author = photo.author().unwrap_or("unknown");
        let _ = writeln!(out, "  - {} (by {author}, {})", photo.urls.regular, photo.links.html);
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

pub fn detail_json(snapshot: &DetailSnapshot) -> Value {
    json!({
        "subject": snapshot.subject_key,
        "entity": node_json(&snapshot.entity),
        "weather": node_json(&snapshot.weather),
        "summary": node_json(&snapshot.summary),
        "photos": node_json(&snapshot.photos),
    })
}

fn node_json<T: Serialize>(state: &NodeState<T>) -> Value {
    match state {
        NodeState::Success(value) => json!({ "status": state.status(), "value": value.as_ref() }),
        NodeState::Error(error) => json!({ "status": state.status(), "error": error.to_string() }),
        _ => json!({ "status": state.status() }),
    }
}
