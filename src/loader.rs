//! Finds article source files beneath the content directory and parses them
//! into [`Article`]s.

use crate::article::Article;
use crate::frontmatter;
use log::{debug, info};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// The extensions of article source files.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Walks `root` depth-first and parses every Markdown file found into an
/// [`Article`]. Siblings are visited in file name order so that repeated runs
/// see the same sequence, but the result is not in reading order; see
/// [`crate::order::sort`].
///
/// A missing `root` is created and yields no articles. A `root` that exists
/// but isn't a directory is an error, as is any I/O error.
pub fn load_articles(root: &Path) -> Result<Vec<Article>> {
    if !root.exists() {
        std::fs::create_dir_all(root).map_err(|err| Error::Io {
            path: root.to_owned(),
            err,
        })?;
        info!("Created empty content directory `{}`", root.display());
        return Ok(Vec::new());
    }
    if !root.is_dir() {
        return Err(Error::NotADirectory(root.to_owned()));
    }

    let mut articles = Vec::new();
    for result in WalkDir::new(root).sort_by(|a, b| a.file_name().cmp(b.file_name())) {
        let entry = result?;
        if !entry.file_type().is_file() || !is_markdown(entry.path()) {
            continue;
        }

        // strip_prefix() should never fail since every entry is beneath `root`
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|_| Error::InvalidFileName(entry.path().to_owned()))?;
        articles.push(load_article(entry.path(), relative)?);
    }

    debug!("Loaded {} articles from `{}`", articles.len(), root.display());
    Ok(articles)
}

fn is_markdown(path: &Path) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => MARKDOWN_EXTENSIONS.iter().any(|m| m.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

fn load_article(path: &Path, relative: &Path) -> Result<Article> {
    let invalid = || Error::InvalidFileName(path.to_owned());

    let file_name = relative
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(invalid)?;

    let mut folder = Vec::new();
    if let Some(parent) = relative.parent() {
        for component in parent.components() {
            match component {
                Component::Normal(name) => folder.push(name.to_str().ok_or_else(invalid)?),
                _ => return Err(invalid()),
            }
        }
    }

    let bytes = std::fs::read(path).map_err(|err| Error::Io {
        path: path.to_owned(),
        err,
    })?;
    let contents = String::from_utf8(bytes).map_err(|_| Error::NotUtf8(path.to_owned()))?;
    Ok(frontmatter::parse(file_name, &folder.join("/"), &contents))
}

/// The result of a fallible load operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading articles.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O errors on a specific file or directory.
    Io { path: PathBuf, err: std::io::Error },

    /// Returned for errors walking the content directory.
    WalkDir(walkdir::Error),

    /// Returned when a path isn't valid UTF-8.
    InvalidFileName(PathBuf),

    /// Returned when a source file isn't valid UTF-8.
    NotUtf8(PathBuf),

    /// Returned when the content root exists but isn't a directory.
    NotADirectory(PathBuf),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io { path, err } => write!(f, "{}: {}", path.display(), err),
            Error::WalkDir(err) => err.fmt(f),
            Error::InvalidFileName(path) => write!(f, "invalid file name: {:?}", path),
            Error::NotUtf8(path) => {
                write!(f, "{}: article is not valid UTF-8", path.display())
            }
            Error::NotADirectory(path) => {
                write!(f, "{}: content root is not a directory", path.display())
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { path: _, err } => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::InvalidFileName(_) => None,
            Error::NotUtf8(_) => None,
            Error::NotADirectory(_) => None,
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator while walking the content directory.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}
