//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the site: loading the articles ([`crate::loader`]),
//! ordering them ([`crate::order`]), rendering and writing a page per article
//! ([`crate::markdown`], [`crate::page`]), and publishing the article list to
//! the index page ([`crate::index`]).

use crate::article::{Article, Summary};
use crate::config::Config;
use crate::index::{self, Error as IndexError};
use crate::loader::{load_articles, Error as LoadError};
use crate::markdown;
use crate::order;
use crate::page::{Assembler, Error as PageError, DEFAULT_TEMPLATE};
use crate::util::rmdir;
use log::{debug, info};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

/// Builds the site described by a [`Config`] and returns the number of
/// articles written. The output directory is rebuilt from scratch.
pub fn build_site(config: &Config) -> Result<usize> {
    let mut articles = load_articles(&config.content_directory)?;

    let policy = order::policy(config.pinned_folder.as_deref());
    order::sort(&mut articles, policy.as_ref());

    let assembler = match &config.template {
        Some(path) => Assembler::from_file(path)?,
        None => Assembler::new(DEFAULT_TEMPLATE)?,
    };

    // Blow away the old pages so that renamed or deleted articles don't
    // linger. Only the article output directory is cleaned; the index page
    // is edited in place.
    rmdir(&config.output_directory).map_err(|err| Error::Clean {
        path: config.output_directory.clone(),
        err,
    })?;

    let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
    for (i, article) in articles.iter().enumerate() {
        let navigation = policy.navigation(&articles, i);
        let body = markdown::to_html(&article.content, config.diagrams.as_ref());
        let html = assembler.render(article, &body, &navigation)?;

        let path = article.output_path(&config.output_directory);
        if let Some(dir) = path.parent() {
            if seen_dirs.insert(dir.to_owned()) {
                std::fs::create_dir_all(dir).map_err(|err| Error::Write {
                    path: dir.to_owned(),
                    err,
                })?;
            }
        }
        std::fs::write(&path, html).map_err(|err| Error::Write {
            path: path.clone(),
            err,
        })?;
        debug!("Wrote `{}`", path.display());
    }

    let summaries: Vec<Summary> = articles.iter().map(Article::summary).collect();
    index::update_index_file(&config.index_file, &config.index_marker, &summaries)?;
    info!(
        "Built {} articles into `{}` and updated `{}`",
        articles.len(),
        config.output_directory.display(),
        config.index_file.display()
    );

    Ok(articles.len())
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during loading,
/// templating, writing pages, cleaning the output directory, and updating the
/// index page.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors loading articles.
    Load(LoadError),

    /// Returned for errors loading the template or rendering a page.
    Page(PageError),

    /// Returned for errors updating the index page.
    Index(IndexError),

    /// Returned for I/O problems while cleaning the output directory.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems while writing pages.
    Write { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Load(err) => err.fmt(f),
            Error::Page(err) => err.fmt(f),
            Error::Index(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::Write { path, err } => {
                write!(f, "Writing '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Load(err) => Some(err),
            Error::Page(err) => Some(err),
            Error::Index(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::Write { path: _, err } => Some(err),
        }
    }
}

impl From<LoadError> for Error {
    /// Converts [`LoadError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: LoadError) -> Error {
        Error::Load(err)
    }
}

impl From<PageError> for Error {
    /// Converts [`PageError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: PageError) -> Error {
        Error::Page(err)
    }
}

impl From<IndexError> for Error {
    /// Converts [`IndexError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: IndexError) -> Error {
        Error::Index(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::diagram::{self, DiagramServer};
    use crate::index::DEFAULT_MARKER;
    use std::fs;
    use std::path::Path;
    use url::Url;

    const INDEX: &str = "<html><script>\nconst articles = [];\nrender(articles);\n</script></html>";

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn config(root: &Path) -> Config {
        Config {
            content_directory: root.join("content"),
            output_directory: root.join("public/articles"),
            index_file: root.join("public/index.html"),
            index_marker: DEFAULT_MARKER.to_owned(),
            pinned_folder: Some(String::from("basics")),
            template: None,
            diagrams: Some(DiagramServer::new(
                Url::parse("https://www.plantuml.com/plantuml/svg/").unwrap(),
                8000,
            )),
        }
    }

    fn site(root: &Path) {
        write(root, "public/index.html", INDEX);
        write(
            root,
            "content/basics/01-install.md",
            "---\ntitle: Install\ndate: 2020-01-01\n---\nSee [images](02-images.md).",
        );
        write(
            root,
            "content/basics/02-images.md",
            "---\ntitle: Images\ndate: 2020-01-02\n---\n```plantuml\n@startuml\nA->B\n@enduml\n```\n",
        );
        write(
            root,
            "content/k8s/01-pods.md",
            "---\ntitle: Pods\ndate: 2026-01-01\n---\nPods.",
        );
        write(root, "content/about.md", "---\ndate: 2025-01-01\n---\nAbout.");
    }

    fn embedded(html: &str) -> Vec<Summary> {
        let start = html.find(DEFAULT_MARKER).unwrap() + DEFAULT_MARKER.len();
        serde_json::Deserializer::from_str(&html[start..])
            .into_iter::<Vec<Summary>>()
            .next()
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_build_site() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        site(root);
        let config = config(root);

        assert_eq!(4, build_site(&config)?);

        let out = root.join("public/articles");
        let install = fs::read_to_string(out.join("basics/01-install.html")).unwrap();
        assert!(install.contains("<h1>Install</h1>"));
        assert!(install.contains(r#"href="02-images.html""#));
        assert!(!install.contains("Previous"));

        let images = fs::read_to_string(out.join("basics/02-images.html")).unwrap();
        assert!(images.contains(&diagram::encode("@startuml\nA->B\n@enduml")));
        // The pinned folder's last article continues into the next folder.
        assert!(images.contains(r#"href="../k8s/01-pods.html""#));

        let pods = fs::read_to_string(out.join("k8s/01-pods.html")).unwrap();
        assert!(pods.contains(r#"href="../basics/02-images.html""#));
        assert!(pods.contains(r#"href="../about.html""#));

        let about = fs::read_to_string(out.join("about.html")).unwrap();
        assert!(about.contains(r#"href="k8s/01-pods.html""#));

        let index = fs::read_to_string(root.join("public/index.html")).unwrap();
        let slugs: Vec<String> = embedded(&index).into_iter().map(|s| s.slug).collect();
        assert_eq!(
            vec!["basics/01-install", "basics/02-images", "k8s/01-pods", "about"],
            slugs
        );
        assert!(index.ends_with("];\nrender(articles);\n</script></html>"));
        Ok(())
    }

    #[test]
    fn test_build_site_is_idempotent() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        site(root);
        let config = config(root);

        build_site(&config)?;
        let page = fs::read_to_string(root.join("public/articles/about.html")).unwrap();
        let index = fs::read_to_string(root.join("public/index.html")).unwrap();

        // Pages of deleted articles are removed by the next build.
        write(root, "public/articles/stale.html", "stale");
        build_site(&config)?;

        assert_eq!(page, fs::read_to_string(root.join("public/articles/about.html")).unwrap());
        assert_eq!(index, fs::read_to_string(root.join("public/index.html")).unwrap());
        assert!(!root.join("public/articles/stale.html").exists());
        Ok(())
    }

    #[test]
    fn test_build_site_without_diagrams() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        site(root);
        let mut config = config(root);
        config.diagrams = None;

        build_site(&config)?;
        let images =
            fs::read_to_string(root.join("public/articles/basics/02-images.html")).unwrap();
        assert!(images.contains("language-plantuml"));
        assert!(!images.contains("<img"));
        Ok(())
    }

    #[test]
    fn test_build_site_missing_marker() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        site(root);
        write(root, "public/index.html", "<html>no script</html>");

        assert!(matches!(build_site(&config(root)), Err(Error::Index(_))));
    }

    #[test]
    fn test_build_site_content_root_is_file() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        site(root);
        let config = config(root);
        build_site(&config)?;
        let index = fs::read_to_string(root.join("public/index.html")).unwrap();

        fs::remove_dir_all(root.join("content")).unwrap();
        write(root, "content", "oops");

        assert!(matches!(build_site(&config), Err(Error::Load(_))));
        assert!(root.join("public/articles/about.html").exists());
        assert_eq!(index, fs::read_to_string(root.join("public/index.html")).unwrap());
        Ok(())
    }

    #[test]
    fn test_build_site_empty_content() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "public/index.html", INDEX);

        assert_eq!(0, build_site(&config(root))?);
        assert!(root.join("content").is_dir());
        let index = fs::read_to_string(root.join("public/index.html")).unwrap();
        assert_eq!(INDEX, index);
        Ok(())
    }
}
