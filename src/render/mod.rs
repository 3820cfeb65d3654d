use anyhow::{Context, Result};
use camino::Utf8Path;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use tracing::info;

use crate::config::MapSettings;
use crate::history::{GeoPoint, LocationSequence};

const MAP_TEMPLATE: &str = include_str!("map.html");
const POPUP_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
// Used when there is nothing to average over.
const EMPTY_CENTER: (f64, f64) = (0.0, 0.0);
const EMPTY_ZOOM: u8 = 2;

lazy_static::lazy_static! {
    static ref TEMPLATE_VAR: Regex =
        Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)*)\s*\}\}").unwrap();
}

#[derive(Serialize)]
struct Marker {
    lat: f64,
    lon: f64,
    popup: String,
}

/// Builds the HTML map document for a sequence.
pub fn render_map(sequence: &LocationSequence, settings: &MapSettings) -> Result<String> {
    let variables = build_variable_map(sequence, settings)?;
    Ok(apply_template(MAP_TEMPLATE, &variables))
}

pub fn save_map(sequence: &LocationSequence, settings: &MapSettings, path: &Utf8Path) -> Result<()> {
    let html = render_map(sequence, settings)?;
    fs::write(path, html).with_context(|| format!("Failed to write map to {path}"))?;
    info!(path = %path, points = sequence.len(), "map written");
    Ok(())
}

fn apply_template(template: &str, variables: &HashMap<&'static str, String>) -> String {
    TEMPLATE_VAR
        .replace_all(template, |caps: &regex::Captures| {
            let var_name = &caps[1];
            variables
                .get(var_name)
                .cloned()
                .unwrap_or_else(|| format!("{{unknown:{var_name}}}"))
        })
        .into_owned()
}

fn build_variable_map(
    sequence: &LocationSequence,
    settings: &MapSettings,
) -> Result<HashMap<&'static str, String>> {
    let mut vars = HashMap::new();

    let ((lat, lon), zoom) = match sequence.center() {
        Some(center) => (center, settings.zoom_start),
        None => (EMPTY_CENTER, EMPTY_ZOOM),
    };
    vars.insert("title", "Movement visualization".to_string());
    vars.insert("map.center_lat", lat.to_string());
    vars.insert("map.center_lon", lon.to_string());
    vars.insert("map.zoom", zoom.to_string());

    let markers: Vec<Marker> = sequence
        .iter()
        .map(|p| Marker {
            lat: p.latitude,
            lon: p.longitude,
            popup: popup(p),
        })
        .collect();
    let path: Vec<[f64; 2]> = sequence.iter().map(|p| [p.latitude, p.longitude]).collect();
    vars.insert("layers.markers", script_json(&markers)?);
    vars.insert("layers.path", script_json(&path)?);

    vars.insert("line.color", script_json(&settings.line_color)?);
    vars.insert("line.weight", settings.line_weight.to_string());

    Ok(vars)
}

fn popup(point: &GeoPoint) -> String {
    format!(
        "{}<br>{}<br>{}",
        point.timestamp.format(POPUP_TIMESTAMP_FORMAT),
        escape_html(&point.place_name),
        escape_html(&point.address)
    )
}

// JSON embedded in a <script> block must not close it early.
fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn point(hour: u32, latitude: f64, longitude: f64, name: &str) -> GeoPoint {
        GeoPoint {
            timestamp: NaiveDate::from_ymd_opt(2023, 6, 1)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            latitude,
            longitude,
            place_name: name.to_string(),
            address: "Unknown".to_string(),
        }
    }

    #[test]
    fn test_render_map_layers() {
        let sequence = LocationSequence::from_points(vec![
            point(12, 40.0, -74.0, "Office"),
            point(18, 34.0, -118.0, "Airport"),
        ]);
        let html = render_map(&sequence, &MapSettings::default()).unwrap();

        assert!(html.contains("setView([37, -96], 10)"));
        assert!(html.contains("2023-06-01 12:00:00<br>Office<br>Unknown"));
        assert!(html.contains("var path = [[40.0,-74.0],[34.0,-118.0]];"));
        assert!(html.contains(r#"{ color: "red", weight: 2 }"#));
        assert!(html.contains("L.heatLayer(path)"));
        assert!(!html.contains("{{"));
        assert!(!html.contains("{unknown:"));
    }

    #[test]
    fn test_render_map_empty_sequence() {
        let html = render_map(&LocationSequence::default(), &MapSettings::default()).unwrap();
        assert!(html.contains("setView([0, 0], 2)"));
        assert!(html.contains("var markers = [];"));
        assert!(html.contains("var path = [];"));
    }

    #[test]
    fn test_popup_is_escaped() {
        let sequence =
            LocationSequence::from_points(vec![point(9, 1.0, 2.0, "<script>alert(1)</script>")]);
        let html = render_map(&sequence, &MapSettings::default()).unwrap();
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>alert"));
    }

    #[test]
    fn test_script_json_escapes_closing_tags() {
        assert_eq!(script_json("</script>").unwrap(), r#""<\/script>""#);
    }

    #[test]
    fn test_apply_template_unknown_variable() {
        let vars = HashMap::from([("known", "yes".to_string())]);
        assert_eq!(
            apply_template("{{ known }} / {{missing.var}}", &vars),
            "yes / {unknown:missing.var}"
        );
    }

    #[test]
    fn test_save_map() {
        let dir = tempdir::TempDir::new("trailmap").unwrap();
        let path = camino::Utf8PathBuf::from_path_buf(dir.path().join("map.html")).unwrap();
        save_map(&LocationSequence::default(), &MapSettings::default(), &path).unwrap();
        assert!(fs::read_to_string(&path).unwrap().starts_with("<!DOCTYPE html>"));
    }
}
