use crate::diagram::DiagramServer;
use crate::index::DEFAULT_MARKER;
use anyhow::{anyhow, Result};
use log::debug;
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the optional project file.
pub const PROJECT_FILE: &str = "articlepress.yaml";

/// The folder ordered before all others unless the project file says
/// otherwise.
pub const DEFAULT_PINNED_FOLDER: &str = "kubernetes";

/// The content directory used when the project file doesn't name one. Topics
/// are folders beneath it, e.g. `articles/kubernetes/01-pods.md`.
pub const DEFAULT_CONTENT_DIRECTORY: &str = "articles";

const DEFAULT_DIAGRAM_SERVER: &str = "https://www.plantuml.com/plantuml/svg/";

#[derive(Deserialize)]
#[serde(default)]
struct Project {
    content_directory: PathBuf,
    output_directory: PathBuf,
    index_file: PathBuf,
    index_marker: String,
    pinned_folder: Option<String>,
    template: Option<PathBuf>,
    diagrams: Diagrams,
}

impl Default for Project {
    fn default() -> Self {
        Project {
            content_directory: PathBuf::from(DEFAULT_CONTENT_DIRECTORY),
            output_directory: PathBuf::from("public/articles"),
            index_file: PathBuf::from("public/index.html"),
            index_marker: DEFAULT_MARKER.to_owned(),
            pinned_folder: Some(DEFAULT_PINNED_FOLDER.to_owned()),
            template: None,
            diagrams: Diagrams::default(),
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct Diagrams {
    enabled: bool,
    server: String,
    max_encoded_length: usize,
}

impl Default for Diagrams {
    fn default() -> Self {
        Diagrams {
            enabled: true,
            server: DEFAULT_DIAGRAM_SERVER.to_owned(),
            max_encoded_length: 8000,
        }
    }
}

/// Everything a build needs to know. Relative paths in the project file are
/// resolved against the directory containing it.
pub struct Config {
    /// The directory article sources are loaded from.
    pub content_directory: PathBuf,

    /// The directory rendered pages are written to. It is deleted and
    /// recreated on every build.
    pub output_directory: PathBuf,

    /// The index page whose article array is replaced.
    pub index_file: PathBuf,

    /// The statement prefix that precedes the article array in `index_file`.
    pub index_marker: String,

    /// The folder ordered first and given folder-local navigation, if any.
    pub pinned_folder: Option<String>,

    /// A custom article template. The built-in one is used when unset.
    pub template: Option<PathBuf>,

    /// The server PlantUML blocks are linked to. `None` renders them as code.
    pub diagrams: Option<DiagramServer>,
}

impl Config {
    /// Looks for [`PROJECT_FILE`] in `dir` and its ancestors and loads the
    /// first one found. Without a project file the defaults apply, relative to
    /// `dir`.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        for ancestor in dir.ancestors() {
            let path = ancestor.join(PROJECT_FILE);
            if path.exists() {
                return match Config::from_project_file(&path) {
                    Ok(config) => Ok(config),
                    Err(e) => Err(anyhow!("Loading configuration: {:?}", e)),
                };
            }
        }
        debug!(
            "No `{}` found above `{}`, using defaults",
            PROJECT_FILE,
            dir.display()
        );
        Config::from_project(dir, Project::default())
    }

    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = File::open(path)
            .map_err(|e| anyhow!("Opening project file `{}`: {}", path.display(), e))?;
        let project: Project = serde_yaml::from_reader(file)
            .map_err(|e| anyhow!("Parsing project file `{}`: {}", path.display(), e))?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => Config::from_project(project_root, project),
        }
    }

    fn from_project(project_root: &Path, project: Project) -> Result<Config> {
        let diagrams = match project.diagrams.enabled {
            false => None,
            true => Some(DiagramServer::new(
                Url::parse(&project.diagrams.server).map_err(|e| {
                    anyhow!("Invalid diagram server `{}`: {}", project.diagrams.server, e)
                })?,
                project.diagrams.max_encoded_length,
            )),
        };

        Ok(Config {
            content_directory: project_root.join(project.content_directory),
            output_directory: project_root.join(project.output_directory),
            index_file: project_root.join(project.index_file),
            index_marker: project.index_marker,
            pinned_folder: project.pinned_folder,
            template: project.template.map(|t| project_root.join(t)),
            diagrams,
        })
    }
}
