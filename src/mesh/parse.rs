//! Record parsers for the ASCII mesh format
//!
//! ```text
//! # comment
//! Vertex 1  0.5 -0.25 0.0
//! Face 1  1 2 3 {rgb=(1 0 0)}
//! ```
//!
//! Each function looks at exactly one line; the loader owns all state.

use crate::rasterizer::Vec3;

/// Problem with a single record
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is not a number: {token:?}")]
    BadNumber { field: &'static str, token: String },

    #[error("malformed color block: {0:?}")]
    BadColor(String),
}

/// What kind of record a line holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Comment,
    Vertex,
    Face,
    Other,
}

pub fn classify(line: &str) -> LineKind {
    if line.starts_with('#') {
        return LineKind::Comment;
    }
    match line.split_whitespace().next() {
        Some("Vertex") => LineKind::Vertex,
        Some("Face") => LineKind::Face,
        _ => LineKind::Other,
    }
}

/// Split `Keyword a b c {attrs}` into the numeric tokens and the attribute block.
fn split_record(line: &str) -> (Vec<&str>, Option<&str>) {
    let (head, attrs) = match line.find('{') {
        Some(i) => (&line[..i], Some(&line[i..])),
        None => (line, None),
    };
    let tokens = head.split_whitespace().skip(1).collect();
    (tokens, attrs)
}

/// A vertex record, parsed best-effort
#[derive(Debug, Clone, PartialEq)]
pub struct VertexRecord {
    pub position: Vec3,
    /// Coordinates that were missing or malformed and read as 0.0
    pub errors: Vec<RecordError>,
}

/// Parse `Vertex <id> <x> <y> <z> [{...}]`.
///
/// The id is ignored. A coordinate that cannot be read becomes 0.0 and is
/// reported in `errors`, so the vertex still occupies its index.
pub fn parse_vertex_line(line: &str) -> VertexRecord {
    let (tokens, _) = split_record(line);
    let mut errors = Vec::new();
    let mut coord = |slot: usize, field: &'static str| -> f32 {
        match tokens.get(slot) {
            None => {
                errors.push(RecordError::MissingField(field));
                0.0
            }
            Some(tok) => match tok.parse::<f32>() {
                Ok(v) if v.is_finite() => v,
                _ => {
                    errors.push(RecordError::BadNumber {
                        field,
                        token: tok.to_string(),
                    });
                    0.0
                }
            },
        }
    };

    let x = coord(1, "x");
    let y = coord(2, "y");
    let z = coord(3, "z");

    VertexRecord {
        position: Vec3::new(x, y, z),
        errors,
    }
}

/// A face record with its 1-based vertex indices as written in the file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceRecord {
    pub indices: [usize; 3],
    pub color: Option<Vec3>,
}

const INDEX_FIELDS: [&str; 3] = ["v1", "v2", "v3"];

/// Index tokens may be written as floats; they are truncated like a C cast.
fn parse_index(token: &str, field: &'static str) -> Result<usize, RecordError> {
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v.max(0.0) as usize),
        _ => Err(RecordError::BadNumber {
            field,
            token: token.to_string(),
        }),
    }
}

/// Read `rgb=(r g b)` out of an attribute block. `Ok(None)` if absent.
fn parse_color(attrs: &str) -> Result<Option<Vec3>, RecordError> {
    let Some(start) = attrs.find("rgb=(") else {
        return Ok(None);
    };
    let rest = &attrs[start + "rgb=(".len()..];
    let end = rest
        .find(')')
        .ok_or_else(|| RecordError::BadColor(attrs.to_string()))?;

    let channels: Vec<f32> = rest[..end]
        .split_whitespace()
        .map(|t| t.parse::<f32>())
        .collect::<Result<_, _>>()
        .map_err(|_| RecordError::BadColor(attrs.to_string()))?;

    match channels[..] {
        [r, g, b] => Ok(Some(Vec3::new(r, g, b))),
        _ => Err(RecordError::BadColor(attrs.to_string())),
    }
}

/// Parse `Face [<id>] <v1> <v2> <v3> [{rgb=(r g b)}]`.
///
/// With four or more numbers the first one is the face id and is skipped.
pub fn parse_face_line(line: &str) -> Result<FaceRecord, RecordError> {
    let (tokens, attrs) = split_record(line);

    let index_tokens = match tokens.len() {
        0..=2 => return Err(RecordError::MissingField(INDEX_FIELDS[tokens.len()])),
        3 => &tokens[..],
        _ => &tokens[1..4],
    };

    // every numeric token must be readable, including an ignored face id
    if tokens.len() > 3 {
        parse_index(tokens[0], "id")?;
        for tok in &tokens[4..] {
            parse_index(tok, "trailing")?;
        }
    }

    let mut indices = [0usize; 3];
    for (slot, (tok, field)) in index_tokens.iter().zip(INDEX_FIELDS).enumerate() {
        indices[slot] = parse_index(tok, field)?;
    }

    let color = match attrs {
        Some(a) => parse_color(a)?,
        None => None,
    };

    Ok(FaceRecord { indices, color })
}
