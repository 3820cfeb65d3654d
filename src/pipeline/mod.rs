use anyhow::Result;
use camino::Utf8Path;
use tracing::info;

use crate::config::Settings;
use crate::history::{LocationSequence, SkippedItem, extract_points};
use crate::render::save_map;

/// Outcome of a full run over one export.
#[derive(Debug)]
pub struct RunSummary {
    pub sequence: LocationSequence,
    pub skipped: Vec<SkippedItem>,
    pub total_distance_km: f64,
}

/// Reads the export below `base` and orders every point it yields.
pub fn load_sequence(base: &Utf8Path) -> Result<(LocationSequence, Vec<SkippedItem>)> {
    let extraction = extract_points(base)?;
    info!(
        points = extraction.points.len(),
        skipped = extraction.skipped.len(),
        "export extracted"
    );
    Ok((
        LocationSequence::from_points(extraction.points),
        extraction.skipped,
    ))
}

/// Extracts, orders, measures and renders the export described by `settings`.
pub fn run(settings: &Settings) -> Result<RunSummary> {
    let (sequence, skipped) = load_sequence(&settings.base_path)?;
    let total_distance_km = sequence.total_distance_km();

    save_map(&sequence, &settings.map, &settings.output)?;

    Ok(RunSummary {
        sequence,
        skipped,
        total_distance_km,
    })
}
