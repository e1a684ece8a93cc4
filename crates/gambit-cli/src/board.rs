//! Plain-text board dump.

use gambit_core::{FenError, FenFields, Side};

/// Renders the placement field of `fen` with `bottom` nearest the reader.
pub fn render(fen: &str, bottom: Side) -> Result<String, FenError> {
    let fields = FenFields::parse(fen)?;

    // rows[0] is rank 8
    let rows: Vec<Vec<char>> = fields
        .placement
        .split('/')
        .map(|row| {
            row.chars()
                .flat_map(|c| match c.to_digit(10) {
                    Some(n) => vec!['.'; n as usize],
                    None => vec![c],
                })
                .collect()
        })
        .collect();

    let ranks: Vec<usize> = match bottom {
        Side::White => (0..8).collect(),
        Side::Black => (0..8).rev().collect(),
    };
    let files: Vec<usize> = match bottom {
        Side::White => (0..8).collect(),
        Side::Black => (0..8).rev().collect(),
    };

    let mut out = String::from("  +-----------------+\n");
    for &r in &ranks {
        out.push_str(&format!("{} |", 8 - r));
        for &f in &files {
            let piece = rows.get(r).and_then(|row| row.get(f)).copied().unwrap_or('.');
            out.push(' ');
            out.push(piece);
        }
        out.push_str(" |\n");
    }
    out.push_str("  +-----------------+\n    ");
    let labels: Vec<String> = files
        .iter()
        .map(|&f| ((b'a' + f as u8) as char).to_string())
        .collect();
    out.push_str(&labels.join(" "));
    Ok(out)
}
