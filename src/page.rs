//! Assembles complete article pages. A page is the article template applied
//! to a [`Value::Object`] built from the [`Article`], its rendered body, and
//! its [`Navigation`]; see [`Assembler::render`] for the fields.

use crate::article::{Article, HTML_EXTENSION};
use crate::order::Navigation;
use gtmpl::{Context, Template};
use gtmpl_value::Value;
use pulldown_cmark::escape::escape_html;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// The built-in article template. It carries the page styles, the theme
/// toggle, and the navigation widget.
pub const DEFAULT_TEMPLATE: &str = include_str!("../theme/article.html");

/// Renders article pages from a parsed template.
pub struct Assembler {
    template: Template,
}

impl Assembler {
    /// Parses `source` as the article template.
    pub fn new(source: &str) -> Result<Assembler> {
        let mut template = Template::default();
        template.parse(source).map_err(Error::ParseTemplate)?;
        Ok(Assembler { template })
    }

    /// Loads and parses the article template from `path`.
    pub fn from_file(path: &Path) -> Result<Assembler> {
        let source = std::fs::read_to_string(path).map_err(|err| {
            Error::OpenTemplateFile {
                path: path.to_owned(),
                err,
            }
        })?;
        Assembler::new(&source)
    }

    /// Renders the page for `article`. The template receives:
    ///
    /// * `title`, `date` (`YYYY-MM-DD`), `slug`, and `tags`, HTML-escaped
    /// * `body`, the rendered article HTML
    /// * `prev` and `next`, each either nil or an object with `href` (relative
    ///   to this page) and `title`
    /// * `navigation`, true when either `prev` or `next` is set
    pub fn render(
        &self,
        article: &Article,
        body: &str,
        navigation: &Navigation,
    ) -> Result<String> {
        let link = |target: Option<&Article>| match target {
            None => Value::Nil,
            Some(target) => {
                let mut m: HashMap<String, Value> = HashMap::new();
                m.insert(
                    "href".to_owned(),
                    Value::String(escape(&relative_href(article, target))),
                );
                m.insert("title".to_owned(), Value::String(escape(&target.title)));
                Value::Object(m)
            }
        };

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), Value::String(escape(&article.title)));
        m.insert(
            "date".to_owned(),
            Value::String(article.date.format("%Y-%m-%d").to_string()),
        );
        m.insert("slug".to_owned(), Value::String(escape(&article.slug)));
        m.insert(
            "tags".to_owned(),
            Value::Array(
                article
                    .tags
                    .iter()
                    .map(|t| Value::String(escape(t)))
                    .collect(),
            ),
        );
        m.insert("body".to_owned(), Value::String(body.to_owned()));
        m.insert("prev".to_owned(), link(navigation.prev));
        m.insert("next".to_owned(), link(navigation.next));
        m.insert(
            "navigation".to_owned(),
            Value::Bool(navigation.prev.is_some() || navigation.next.is_some()),
        );

        let mut out: Vec<u8> = Vec::new();
        self.template
            .execute(&mut out, &Context::from(Value::Object(m))?)?;
        String::from_utf8(out).map_err(|e| Error::Template(e.to_string()))
    }
}

/// Returns the link from the page of `from` to the page of `to`. Pages mirror
/// the content directory, so the link steps up out of `from`'s folder and
/// down into `to`'s. Only one level of folders is supported.
pub fn relative_href(from: &Article, to: &Article) -> String {
    let file = format!("{}.{}", to.base_name, HTML_EXTENSION);
    if from.folder == to.folder {
        file
    } else if from.folder.is_empty() {
        format!("{}/{}", to.folder, file)
    } else if to.folder.is_empty() {
        format!("../{}", file)
    } else {
        format!("../{}/{}", to.folder, file)
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    // Writing into a `String` can't fail.
    let _ = escape_html(&mut out, s);
    out
}

/// The result of a fallible page operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error assembling a page.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems while opening the template file.
    OpenTemplateFile { path: PathBuf, err: io::Error },

    /// Returned for errors parsing the template.
    ParseTemplate(String),

    /// Returned for errors executing the template.
    Template(String),
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for fallible template operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => write!(f, "Parsing template: {}", err),
            Error::Template(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::Template(_) => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::frontmatter;
    use chrono::{TimeZone, Utc};

    fn article(folder: &str, file_name: &str, input: &str) -> Article {
        let date = Utc.with_ymd_and_hms(2026, 2, 14, 0, 0, 0).unwrap();
        frontmatter::parse_at(file_name, folder, input, date)
    }

    #[test]
    fn test_relative_href() {
        let root = article("", "about.md", "");
        let docker = article("docker", "01-images.md", "");
        let docker2 = article("docker", "02-volumes.md", "");
        let k8s = article("k8s", "01-pods.md", "");

        assert_eq!("02-volumes.html", relative_href(&docker, &docker2));
        assert_eq!("docker/01-images.html", relative_href(&root, &docker));
        assert_eq!("../about.html", relative_href(&docker, &root));
        assert_eq!("../k8s/01-pods.html", relative_href(&docker, &k8s));
        assert_eq!("about.html", relative_href(&root, &root));
    }

    #[test]
    fn test_render_with_navigation() -> Result<()> {
        let current = article(
            "docker",
            "02-volumes.md",
            "---\ntitle: Volumes & <Mounts>\ntags: [storage]\n---\n",
        );
        let prev = article("docker", "01-images.md", "---\ntitle: Images\n---\n");
        let next = article("k8s", "01-pods.md", "---\ntitle: Pods\n---\n");
        let assembler = Assembler::new(DEFAULT_TEMPLATE)?;

        let html = assembler.render(
            &current,
            "<p>Persist data.</p>",
            &Navigation {
                prev: Some(&prev),
                next: Some(&next),
            },
        )?;

        assert!(html.contains("<h1>Volumes &amp; &lt;Mounts&gt;</h1>"));
        assert!(html.contains("<p>Persist data.</p>"));
        assert!(html.contains("2026-02-14"));
        assert!(html.contains("#storage"));
        assert!(html.contains(r#"href="01-images.html""#));
        assert!(html.contains(r#"href="../k8s/01-pods.html""#));
        assert!(html.contains("Pods</a>"));
        assert!(html.contains("localStorage"));
        assert!(html.contains("prefers-color-scheme"));
        Ok(())
    }

    #[test]
    fn test_render_without_navigation() -> Result<()> {
        let only = article("", "about.md", "About us.");
        let html = Assembler::new(DEFAULT_TEMPLATE)?.render(
            &only,
            "<p>About us.</p>",
            &Navigation::default(),
        )?;

        assert!(!html.contains("article-nav\">"));
        assert!(!html.contains("Previous"));
        assert!(html.contains("<title>about</title>"));
        Ok(())
    }

    #[test]
    fn test_custom_template() -> Result<()> {
        let current = article("", "01-intro.md", "");
        let html = Assembler::new("{{.title}}|{{if .next}}{{.next.href}}{{end}}")?
            .render(&current, "", &Navigation::default())?;
        assert_eq!("intro|", html);
        Ok(())
    }

    #[test]
    fn test_bad_template() {
        assert!(matches!(
            Assembler::new("{{if .title}}unterminated"),
            Err(Error::ParseTemplate(_))
        ));
        assert!(matches!(
            Assembler::from_file(Path::new("./does/not/exist.html")),
            Err(Error::OpenTemplateFile { .. })
        ));
    }
}
