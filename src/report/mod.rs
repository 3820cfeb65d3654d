use crate::history::LocationSequence;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const HEADERS: [&str; 6] = ["", "timestamp", "latitude", "longitude", "place_name", "address"];

/// Renders the first `rows` points as a right-aligned text table.
pub fn format_table(sequence: &LocationSequence, rows: usize) -> String {
    if sequence.is_empty() {
        return "Empty sequence".to_string();
    }

    let body: Vec<[String; 6]> = sequence
        .head(rows)
        .iter()
        .enumerate()
        .map(|(i, p)| {
            [
                i.to_string(),
                p.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                format!("{:.6}", p.latitude),
                format!("{:.6}", p.longitude),
                p.place_name.clone(),
                p.address.clone(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &body {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = vec![format_row(&HEADERS.map(str::to_string), &widths)];
    lines.extend(body.iter().map(|row| format_row(row, &widths)));
    if sequence.len() > body.len() {
        lines.push(format!("[{} rows total]", sequence.len()));
    }
    lines.join("\n")
}

fn format_row(cells: &[String; 6], widths: &[usize; 6]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:>width$}"))
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn format_total_distance(km: f64) -> String {
    format!("Total distance traveled: {km:.2} km")
}
