//! Publishes the article list to the site's index page. The index page is a
//! hand-written HTML file whose inline script contains an assignment such as
//! `const articles = [...];`; the array literal is replaced with the current
//! [`Summary`] list on every build.

use crate::article::Summary;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// The statement prefix that precedes the article array by default.
pub const DEFAULT_MARKER: &str = "const articles = ";

/// Serializes `summaries` as pretty-printed JSON that is safe to embed in a
/// `<script>` element: `<` is escaped so no string can close the element.
pub fn to_json(summaries: &[Summary]) -> Result<String> {
    // `<` only ever occurs inside JSON strings, where `<` is equivalent.
    Ok(serde_json::to_string_pretty(summaries)?.replace('<', "\\u003c"))
}

/// Replaces the array literal following `marker` in `html` with `summaries`.
/// Everything else in the document is preserved.
pub fn update_index(html: &str, marker: &str, summaries: &[Summary]) -> Result<String> {
    let start = html
        .find(marker)
        .ok_or_else(|| Error::MissingMarker(marker.to_owned()))?
        + marker.len();
    let rest = &html[start..];
    let open = rest
        .find(|c: char| !c.is_whitespace())
        .filter(|&i| rest[i..].starts_with('['))
        .ok_or_else(|| Error::MissingArray(marker.to_owned()))?;
    let literal = &rest[open..];
    let end = array_end(literal).ok_or_else(|| Error::UnterminatedArray(marker.to_owned()))?;

    let json = to_json(summaries)?;
    let mut out = String::with_capacity(html.len() + json.len());
    out.push_str(&html[..start + open]);
    out.push_str(&json);
    out.push_str(&literal[end..]);
    Ok(out)
}

/// Returns the length of the array literal at the start of `literal`. A
/// literal that we wrote ourselves is valid JSON and is measured by parsing
/// it; anything else ends at the first `];`.
fn array_end(literal: &str) -> Option<usize> {
    let mut stream =
        serde_json::Deserializer::from_str(literal).into_iter::<serde_json::Value>();
    match stream.next() {
        Some(Ok(serde_json::Value::Array(_))) => Some(stream.byte_offset()),
        _ => literal.find("];").map(|i| i + 1),
    }
}

/// Reads the index page at `path`, replaces its article array, and writes it
/// back.
pub fn update_index_file(path: &Path, marker: &str, summaries: &[Summary]) -> Result<()> {
    let html = std::fs::read_to_string(path).map_err(|err| Error::Io {
        path: path.to_owned(),
        err,
    })?;
    let updated = update_index(&html, marker, summaries)
        .map_err(|err| Error::Annotated(path.to_owned(), Box::new(err)))?;
    std::fs::write(path, updated).map_err(|err| Error::Io {
        path: path.to_owned(),
        err,
    })
}

/// The result of a fallible index operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error updating the index page.
#[derive(Debug)]
pub enum Error {
    /// Returned when the index page doesn't contain the marker statement.
    MissingMarker(String),

    /// Returned when the marker isn't followed by an array literal.
    MissingArray(String),

    /// Returned when the array literal after the marker never ends.
    UnterminatedArray(String),

    /// Returned when the summaries can't be serialized.
    Json(serde_json::Error),

    /// Returned for I/O errors reading or writing the index page.
    Io { path: PathBuf, err: io::Error },

    /// An error annotated with the index page it occurred in.
    Annotated(PathBuf, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingMarker(marker) => {
                write!(f, "index page does not contain `{}`", marker.trim())
            }
            Error::MissingArray(marker) => {
                write!(f, "`{}` is not followed by an array", marker.trim())
            }
            Error::UnterminatedArray(marker) => {
                write!(f, "the array after `{}` is not terminated", marker.trim())
            }
            Error::Json(err) => err.fmt(f),
            Error::Io { path, err } => write!(f, "{}: {}", path.display(), err),
            Error::Annotated(path, err) => write!(f, "{}: {}", path.display(), err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingMarker(_) => None,
            Error::MissingArray(_) => None,
            Error::UnterminatedArray(_) => None,
            Error::Json(err) => Some(err),
            Error::Io { path: _, err } => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}
