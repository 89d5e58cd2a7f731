//! Point file parsing
//!
//! One point per line, `x,y` or whitespace separated (`;` is accepted too).
//! Blank lines and lines starting with `#` are skipped.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::Point;

fn separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"\s*[,;]\s*|\s+").expect("valid separator regex"))
}

/// Parse point data. Line numbers in errors are 1-based.
#[instrument(level = "debug", skip(content), fields(bytes = content.len()))]
pub fn parse_points(content: &str) -> ApplicationResult<Vec<Point>> {
    let mut points = Vec::new();

    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        points.push(parse_line(trimmed, i + 1)?);
    }

    debug!("parsed {} points", points.len());
    Ok(points)
}

fn parse_line(line: &str, line_no: usize) -> ApplicationResult<Point> {
    let fields: Vec<&str> = separator().split(line).collect();
    if fields.len() != 2 {
        return Err(ApplicationError::InvalidPointData {
            line: line_no,
            message: format!("expected 2 coordinates, found {}", fields.len()),
        });
    }
    let coord = |s: &str| -> ApplicationResult<f64> {
        let v: f64 = s.parse().map_err(|_| ApplicationError::InvalidPointData {
            line: line_no,
            message: format!("not a number: '{s}'"),
        })?;
        if !v.is_finite() {
            return Err(ApplicationError::InvalidPointData {
                line: line_no,
                message: format!("coordinate is not finite: '{s}'"),
            });
        }
        Ok(v)
    };
    Ok(Point::new(coord(fields[0])?, coord(fields[1])?))
}

/// Serialize points in the format `parse_points` reads.
pub fn format_points(points: &[Point]) -> String {
    let mut out = String::with_capacity(points.len() * 24);
    for p in points {
        out.push_str(&format!("{},{}\n", p.x, p.y));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_mixed_separators_when_parsing_then_all_points_read() {
        let content = "# header\n0.5,1.5\n\n2 3\n-1.25 ; 4e2\n";

        let points = parse_points(content).unwrap();

        assert_eq!(
            points,
            vec![
                Point::new(0.5, 1.5),
                Point::new(2.0, 3.0),
                Point::new(-1.25, 400.0)
            ]
        );
    }

    #[test]
    fn given_bad_number_when_parsing_then_reports_line() {
        let content = "1,2\n3,abc\n";

        let err = parse_points(content).unwrap_err();

        match err {
            ApplicationError::InvalidPointData { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("abc"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn given_three_fields_when_parsing_then_rejected() {
        let err = parse_points("1,2,3\n").unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::InvalidPointData { line: 1, .. }
        ));
    }

    #[test]
    fn given_nan_when_parsing_then_rejected() {
        assert!(parse_points("NaN,1\n").is_err());
    }

    #[test]
    fn given_points_when_formatting_then_parse_reads_them_back() {
        let points = vec![Point::new(0.1, 0.2), Point::new(-3.0, 7.5)];
        assert_eq!(parse_points(&format_points(&points)).unwrap(), points);
    }
}
