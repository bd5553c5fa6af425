//! Flattened geometry decoding.
//!
//! The routing service returns its geometry as one flattened string of
//! back-to-back `[<lon>,<lat>]` groups embedded in a single field of the
//! response document. The string is not valid JSON on its own, so it is
//! decoded with a small hand-rolled scanner rather than a structured
//! parser.

use crate::GeoPoint;
use thiserror::Error;

/// A number in the geometry string failed to parse.
#[derive(Debug, Error)]
#[error("invalid number {text:?} in geometry string: {source}")]
pub struct DecodeError {
    text: String,
    #[source]
    source: std::num::ParseFloatError,
}

/// Decode a flattened `[lon,lat][lon,lat]...` geometry string into points.
///
/// The scanner walks the string once, accumulating digits, `.` and `-`
/// into a buffer. A `,` immediately after a digit closes the first number
/// of a pair (the wire longitude); any other non-digit immediately after a
/// digit closes the second (the wire latitude) and emits a point. All
/// other characters are ignored, so the decoder only relies on digit
/// adjacency to find field boundaries and tolerates arbitrary bracket and
/// comma noise around the numbers.
///
/// The wire order is longitude-first; emitted points are
/// (latitude, longitude). An empty input decodes to an empty vector.
///
/// # Example
/// ```
/// use tour_router::{decode_coordinates, GeoPoint};
///
/// let points = decode_coordinates("[-123.25,49.26][-123.24,49.27]").unwrap();
/// assert_eq!(points, vec![
///     GeoPoint::new(49.26, -123.25),
///     GeoPoint::new(49.27, -123.24),
/// ]);
/// ```
pub fn decode_coordinates(geometry: &str) -> Result<Vec<GeoPoint>, DecodeError> {
    let mut points = Vec::new();
    let mut buffer = String::new();
    // First number of the pair in wire order, held until the pair closes.
    let mut longitude = 0.0;
    let mut prev_was_digit = false;

    for ch in geometry.chars() {
        if ch.is_ascii_digit() || ch == '.' || ch == '-' {
            buffer.push(ch);
        } else if prev_was_digit {
            if ch == ',' {
                longitude = parse_number(&buffer)?;
                buffer.clear();
            } else {
                let latitude = parse_number(&buffer)?;
                points.push(GeoPoint::new(latitude, longitude));
                longitude = 0.0;
                buffer.clear();
            }
        }
        prev_was_digit = ch.is_ascii_digit();
    }

    Ok(points)
}

fn parse_number(buffer: &str) -> Result<f64, DecodeError> {
    buffer.parse().map_err(|source| DecodeError {
        text: buffer.to_string(),
        source,
    })
}
