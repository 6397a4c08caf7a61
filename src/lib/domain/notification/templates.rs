//! Subject and body templates

use std::{borrow::Cow, fs, path::Path};

use lazy_static::lazy_static;
use minijinja::{Environment, UndefinedBehavior};
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::{
    domain::notification::errors::{NotificationError, TemplateFailure},
    infrastructure::filesystem::SourceRoot,
};

lazy_static! {
    static ref FIELD_REFERENCE: Regex =
        Regex::new(r"\{\{(-?)\s*\.([A-Za-z_][A-Za-z0-9_]*)\s*(-?)\}\}").unwrap();
}

/// Where the rendered subject is written in the source root
pub const SUBJECT_TEMPLATE_FILE: &str = "subject_template.txt";

/// Where the rendered body is written in the source root
pub const BODY_TEMPLATE_FILE: &str = "body_template.txt";

/// Metadata about the build being reported on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildMetadata {
    /// The build name
    pub build_name: String,

    /// The job name
    pub build_job_name: String,

    /// The pipeline name
    pub build_pipeline_name: String,

    /// The team name
    pub build_team_name: String,

    /// The external URL of the CI web interface
    pub external_url: String,
}

/// Values available to subject templates
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubjectContext<'a> {
    build_job_name: &'a str,
    build_pipeline_name: &'a str,
}

impl<'a> From<&'a BuildMetadata> for SubjectContext<'a> {
    fn from(build: &'a BuildMetadata) -> Self {
        Self {
            build_job_name: &build.build_job_name,
            build_pipeline_name: &build.build_pipeline_name,
        }
    }
}

/// Values available to body templates
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BodyContext<'a> {
    build_name: &'a str,
    build_job_name: &'a str,
    build_pipeline_name: &'a str,
    build_team_name: &'a str,
    #[serde(rename = "ExternalURL")]
    external_url: &'a str,
}

impl<'a> From<&'a BuildMetadata> for BodyContext<'a> {
    fn from(build: &'a BuildMetadata) -> Self {
        Self {
            build_name: &build.build_name,
            build_job_name: &build.build_job_name,
            build_pipeline_name: &build.build_pipeline_name,
            build_team_name: &build.build_team_name,
            external_url: &build.external_url,
        }
    }
}

/// Rewrites field references such as `{{.BuildJobName}}` into plain
/// variable lookups (`{{ BuildJobName }}`). Whitespace-control dashes are kept.
pub fn normalize_field_syntax(source: &str) -> Cow<'_, str> {
    FIELD_REFERENCE.replace_all(source, "{{$1 $2 $3}}")
}

/// Renders template text against `context`
///
/// Names missing from the context are errors and a trailing newline in the
/// template is kept.
pub fn render_template<C: Serialize>(source: &str, context: &C) -> Result<String, minijinja::Error> {
    let source = normalize_field_syntax(source);

    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_keep_trailing_newline(true);
    env.add_template("notification", &*source)?;

    env.get_template("notification")?.render(context)
}

/// Turns subject and body sources into text
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    root: SourceRoot,
    build: BuildMetadata,
}

impl TemplateRenderer {
    /// Create a new renderer
    pub fn new(root: SourceRoot, build: BuildMetadata) -> Self {
        Self { root, build }
    }

    /// Renders the subject template at `path`
    pub fn render_subject(&self, path: &str) -> Result<String, NotificationError> {
        self.render_to_artifact(
            path,
            SUBJECT_TEMPLATE_FILE,
            &SubjectContext::from(&self.build),
        )
    }

    /// Renders the body template at `path`
    pub fn render_body(&self, path: &str) -> Result<String, NotificationError> {
        self.render_to_artifact(path, BODY_TEMPLATE_FILE, &BodyContext::from(&self.build))
    }

    /// Reads a plain text source verbatim
    pub fn read_source(&self, path: &str) -> Result<String, NotificationError> {
        let path = self.root.resolve(path);

        debug!("reading {}", path.display());

        fs::read_to_string(&path).map_err(|source| NotificationError::FileReadError { path, source })
    }

    /// Renders the template, writes the result to `artifact` in the source
    /// root and returns what was read back from it.
    fn render_to_artifact<C: Serialize>(
        &self,
        path: &str,
        artifact: &str,
        context: &C,
    ) -> Result<String, NotificationError> {
        let template_path = self.root.resolve(path);

        debug!("rendering {}", template_path.display());

        let template = fs::read_to_string(&template_path)
            .map_err(|err| template_error(&template_path, err.into()))?;

        let rendered = render_template(&template, context)
            .map_err(|err| template_error(&template_path, err.into()))?;

        let artifact_path = self.root.artifact(artifact);

        fs::write(&artifact_path, rendered.as_bytes())
            .map_err(|err| template_error(&artifact_path, err.into()))?;

        fs::read_to_string(&artifact_path).map_err(|err| template_error(&artifact_path, err.into()))
    }
}

fn template_error(path: &Path, source: TemplateFailure) -> NotificationError {
    NotificationError::TemplateError {
        path: path.to_path_buf(),
        source,
    }
}
