//! Splits article sources into YAML front-matter and Markdown body and turns
//! the pair into an [`Article`]. Parsing never fails: a malformed
//! front-matter block is treated as part of the body and every missing field
//! gets a fallback (see [`parse`]).

use crate::article::{self, Article};
use crate::markdown;
use crate::order;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use log::warn;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

const FENCE: &str = "---";

/// The number of characters kept when an excerpt is derived from the body.
pub const EXCERPT_LENGTH: usize = 150;

#[derive(Deserialize, Default)]
struct Frontmatter {
    #[serde(default)]
    title: Option<String>,

    #[serde(default)]
    date: Option<String>,

    #[serde(default)]
    excerpt: Option<String>,

    #[serde(default)]
    tags: Option<Tags>,
}

/// Tags may be written either as a YAML sequence or as a single
/// comma-separated string.
#[derive(Deserialize)]
#[serde(untagged)]
enum Tags {
    List(Vec<String>),
    Joined(String),
}

impl Tags {
    fn normalize(self) -> BTreeSet<String> {
        let raw = match self {
            Tags::List(tags) => tags,
            Tags::Joined(joined) => joined.split(',').map(str::to_owned).collect(),
        };
        raw.iter()
            .map(|t| slug::slugify(t))
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// Parses an article, using the current time as the fallback date. See
/// [`parse_at`].
pub fn parse(file_name: &str, folder: &str, input: &str) -> Article {
    parse_at(file_name, folder, input, Utc::now())
}

/// Parses the contents of the file `file_name` found in `folder` (relative to
/// the content directory). The source may begin with a front-matter block:
///
/// ```md
/// ---
/// title: Installing Docker
/// date: 2026-02-14
/// excerpt: Get the engine running.
/// tags: [docker, setup]
/// ---
/// # Install
/// ```
///
/// Every field is optional. A missing `title` is derived from the file name
/// (`01-getting-started.md` becomes `getting started`), a missing `date` is
/// `now`, and a missing `excerpt` is the start of the body as plain text.
pub fn parse_at(
    file_name: &str,
    folder: &str,
    input: &str,
    now: DateTime<Utc>,
) -> Article {
    let input = input.trim_start_matches('\u{feff}');
    let (frontmatter, body) = match split(input) {
        Some((yaml, body)) => match deserialize(yaml) {
            Ok(frontmatter) => (frontmatter, body),
            Err(err) => {
                warn!(
                    "{}: invalid front-matter ({}), treating the whole file as the body",
                    file_name, err
                );
                (Frontmatter::default(), input)
            }
        },
        None => (Frontmatter::default(), input),
    };

    let base_name = Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name)
        .to_owned();

    let date = match &frontmatter.date {
        None => now,
        Some(raw) => parse_date(raw).unwrap_or_else(|| {
            warn!("{}: unrecognized date `{}`, using the current time", file_name, raw);
            now
        }),
    };

    Article {
        file_name: file_name.to_owned(),
        slug: article::slug(folder, &base_name),
        folder: folder.to_owned(),
        title: frontmatter
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| humanize(&base_name)),
        date,
        excerpt: frontmatter.excerpt.unwrap_or_else(|| excerpt(body)),
        content: body.to_owned(),
        tags: frontmatter.tags.map(Tags::normalize).unwrap_or_default(),
        order: order::order_key(&base_name),
        base_name,
    }
}

/// Returns the YAML between the opening and closing fences and the body that
/// follows the closing fence. Both fences must be lines of their own.
fn split(input: &str) -> Option<(&str, &str)> {
    let rest = input.strip_prefix(FENCE)?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(|c: char| c == '\r' || c == '\n') == FENCE {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

fn deserialize(yaml: &str) -> Result<Frontmatter, serde_yaml::Error> {
    if yaml.trim().is_empty() {
        return Ok(Frontmatter::default());
    }
    serde_yaml::from_str(yaml)
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }
    for format in &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    let naive = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&naive))
}

/// Turns a file base name into a title: the numeric order prefix is dropped
/// and separators become spaces.
pub fn humanize(base_name: &str) -> String {
    let stripped = order::strip_order_prefix(base_name);
    let stripped = match stripped.is_empty() {
        true => base_name,
        false => stripped,
    };
    stripped.replace(|c: char| c == '-' || c == '_', " ")
}

fn excerpt(body: &str) -> String {
    let text = markdown::plain_text(body);
    match text.char_indices().nth(EXCERPT_LENGTH) {
        None => text,
        Some((cut, _)) => format!("{}...", text[..cut].trim_end()),
    }
}
