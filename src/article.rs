//! Defines the [`Article`] record produced by the loader and the [`Summary`]
//! that is published to the index page.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// The extension of rendered article pages.
pub const HTML_EXTENSION: &str = "html";

/// A single parsed source file. Articles are created once per build by
/// [`crate::frontmatter::parse`] and never mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Article {
    /// The source file name including its extension (e.g., `01-intro.md`).
    pub file_name: String,

    /// The article's identifier: `{folder}/{base_name}`, or just `base_name`
    /// for articles at the root of the content directory.
    pub slug: String,

    /// The directory containing the source file relative to the content
    /// directory, `/`-separated. Empty for the root.
    pub folder: String,

    /// The file name less its extension.
    pub base_name: String,

    pub title: String,
    pub date: DateTime<Utc>,
    pub excerpt: String,

    /// The raw Markdown body, without the front-matter block.
    pub content: String,

    pub tags: BTreeSet<String>,

    /// The sort key taken from the file name's numeric prefix. See
    /// [`crate::order::order_key`].
    pub order: u32,
}

impl Article {
    /// Returns the location of the article's rendered page beneath
    /// `output_directory`. The result only depends on `folder` and
    /// `base_name`.
    pub fn output_path(&self, output_directory: &Path) -> PathBuf {
        let mut path = output_directory.to_owned();
        for component in self.folder.split('/').filter(|c| !c.is_empty()) {
            path.push(component);
        }
        path.push(format!("{}.{}", self.base_name, HTML_EXTENSION));
        path
    }

    /// Strips the article down to the fields listed on the index page.
    pub fn summary(&self) -> Summary {
        Summary {
            title: self.title.clone(),
            slug: self.slug.clone(),
            date: self.date.to_rfc3339_opts(SecondsFormat::Millis, true),
            excerpt: self.excerpt.clone(),
            folder: self.folder.clone(),
        }
    }
}

/// Builds the slug for an article in `folder` named `base_name`.
pub fn slug(folder: &str, base_name: &str) -> String {
    match folder.is_empty() {
        true => base_name.to_owned(),
        false => format!("{}/{}", folder, base_name),
    }
}

/// The per-article entry serialized into the index page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub title: String,
    pub slug: String,

    /// RFC 3339 timestamp with millisecond precision.
    pub date: String,

    pub excerpt: String,
    pub folder: String,
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::frontmatter;
    use chrono::TimeZone;

    #[test]
    fn test_output_path_mirrors_folder() {
        let now = Utc.with_ymd_and_hms(2026, 2, 14, 0, 0, 0).unwrap();
        let nested = frontmatter::parse_at("02-setup.md", "docker", "body", now);
        let root = frontmatter::parse_at("about.md", "", "body", now);

        assert_eq!(
            PathBuf::from("out/docker/02-setup.html"),
            nested.output_path(Path::new("out"))
        );
        assert_eq!(PathBuf::from("out/about.html"), root.output_path(Path::new("out")));
    }

    #[test]
    fn test_summary() {
        let now = Utc.with_ymd_and_hms(2026, 2, 14, 8, 30, 0).unwrap();
        let article = frontmatter::parse_at(
            "01-intro.md",
            "docker",
            "---\ntitle: Intro\nexcerpt: Short\n---\nBody",
            now,
        );

        assert_eq!(
            Summary {
                title: String::from("Intro"),
                slug: String::from("docker/01-intro"),
                date: String::from("2026-02-14T08:30:00.000Z"),
                excerpt: String::from("Short"),
                folder: String::from("docker"),
            },
            article.summary()
        );
    }

    #[test]
    fn test_slug() {
        assert_eq!("intro", slug("", "intro"));
        assert_eq!("k8s/intro", slug("k8s", "intro"));
    }
}
