//! Plain-text control point format.
//!
//! ```text
//! # optional comments
//! 4
//! 50 5 0 0 1 0
//! 0 5 50 0 1 0
//! -50 5 0 0 1 0
//! 0 5 -50 0 1 0
//! ```
//!
//! The first data line is the point count, each following line is
//! `px py pz ox oy oz`. Blank lines and `#` comments are skipped.

use crate::sim::Float3;
use crate::track::ControlPoint;

use super::PersistenceError;

const FIELDS_PER_POINT: usize = 6;

fn data_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines().enumerate().filter_map(|(i, raw)| {
        let line = raw.split('#').next().unwrap_or("").trim();
        (!line.is_empty()).then_some((i + 1, line))
    })
}

fn parse_point(line_number: usize, line: &str) -> Result<ControlPoint, PersistenceError> {
    let values = line
        .split_whitespace()
        .map(|field| {
            field.parse::<f32>().map_err(|_| PersistenceError::Parse {
                line: line_number,
                message: format!("'{field}' is not a number"),
            })
        })
        .collect::<Result<Vec<f32>, _>>()?;

    if values.len() != FIELDS_PER_POINT {
        return Err(PersistenceError::Parse {
            line: line_number,
            message: format!("expected {FIELDS_PER_POINT} values, found {}", values.len()),
        });
    }

    Ok(ControlPoint::new(
        Float3::new(values[0], values[1], values[2]),
        Float3::new(values[3], values[4], values[5]),
    ))
}

/// Parses a control point file.
pub fn parse_points(text: &str) -> Result<Vec<ControlPoint>, PersistenceError> {
    let mut lines = data_lines(text);
    let Some((count_line, count_text)) = lines.next() else {
        return Err(PersistenceError::Parse {
            line: 1,
            message: "missing point count".into(),
        });
    };
    let expected: usize = count_text.parse().map_err(|_| PersistenceError::Parse {
        line: count_line,
        message: format!("'{count_text}' is not a point count"),
    })?;

    let points = lines
        .map(|(line, content)| parse_point(line, content))
        .collect::<Result<Vec<_>, _>>()?;

    if points.len() != expected {
        return Err(PersistenceError::CountMismatch {
            expected,
            found: points.len(),
        });
    }
    Ok(points)
}

/// Formats points in the layout [`parse_points`] reads.
pub fn format_points(points: &[ControlPoint]) -> String {
    let mut out = format!("{}\n", points.len());
    for p in points {
        let (pos, o) = (p.position, p.orientation);
        out.push_str(&format!(
            "{} {} {} {} {} {}\n",
            pos.x, pos.y, pos.z, o.x, o.y, o.z
        ));
    }
    out
}
