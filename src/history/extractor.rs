use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::normalizer::{GeoPoint, normalize};
use super::record::{RawSubRecord, RecordError};

/// Directory of the Takeout export holding the yearly partitions.
pub const SEMANTIC_HISTORY_DIR: &str = "Semantic Location History";
pub const MONTH_FILE_EXTENSION: &str = ".json";

/// A timeline item that could not be turned into points.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedItem {
    pub file: Utf8PathBuf,
    pub index: usize,
    pub error: RecordError,
}

/// Points gathered from one or more month files, in encounter order.
#[derive(Debug, Default, Clone)]
pub struct Extraction {
    pub points: Vec<GeoPoint>,
    pub skipped: Vec<SkippedItem>,
}

impl Extraction {
    pub fn merge(mut self, other: Extraction) -> Self {
        self.points.extend(other.points);
        self.skipped.extend(other.skipped);
        self
    }
}

/// Lists every month file of the export, year directories and month files
/// both in lexicographic order.
pub fn month_files(base: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    let root = base.join(SEMANTIC_HISTORY_DIR);
    if !root.is_dir() {
        anyhow::bail!("Location history directory not found: {root}");
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(&root)
        .min_depth(2)
        .max_depth(2)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to read directory entry under {root}"))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = Utf8PathBuf::from_path_buf(entry.path().to_path_buf())
            .map_err(|p| anyhow::anyhow!("Non-UTF8 path: {p:?}"))?;
        if path.as_str().ends_with(MONTH_FILE_EXTENSION) {
            files.push(path);
        }
    }

    Ok(files)
}

/// Reads one month file and normalizes its timeline items.
///
/// A document that is not valid JSON is an error; a malformed item is logged
/// and recorded in [`Extraction::skipped`].
pub fn extract_file(path: &Utf8Path) -> Result<Extraction> {
    let document: Value = {
        let file = File::open(path).with_context(|| format!("Failed to open {path}"))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse JSON document {path}"))?
    };

    let Some(items) = document.get("timelineObjects") else {
        debug!(file = %path, "no timelineObjects, skipping");
        return Ok(Extraction::default());
    };
    let items = items
        .as_array()
        .with_context(|| format!("timelineObjects is not a list in {path}"))?;

    let mut extraction = Extraction::default();
    for (index, item) in items.iter().enumerate() {
        let points = RawSubRecord::from_value(item)
            .and_then(|record| record.map_or_else(|| Ok(Vec::new()), |r| normalize(&r)));

        match points {
            Ok(points) => extraction.points.extend(points),
            Err(error) => {
                warn!(file = %path, index, "skipping timeline item: {error}");
                extraction.skipped.push(SkippedItem {
                    file: path.to_path_buf(),
                    index,
                    error,
                });
            }
        }
    }

    debug!(
        file = %path,
        points = extraction.points.len(),
        skipped = extraction.skipped.len(),
        "month file processed"
    );
    Ok(extraction)
}

/// Extracts every month file below `base`, concatenated in file order.
pub fn extract_points(base: &Utf8Path) -> Result<Extraction> {
    month_files(base)?
        .iter()
        .try_fold(Extraction::default(), |acc, path| -> Result<Extraction> {
            Ok(acc.merge(extract_file(path)?))
        })
}
