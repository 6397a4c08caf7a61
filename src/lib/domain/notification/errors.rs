//! Error types for the notification pipeline

use std::{fmt, io, path::PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::domain::notification::mailer::MailerError;

/// A configuration field that must be present before anything is rendered or sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    /// `source.smtp.host`
    SmtpHost,

    /// `source.smtp.port`
    SmtpPort,

    /// `source.from`
    From,

    /// `source.to`
    To,

    /// `params.subject`
    Subject,

    /// `source.smtp.username`, only required for authenticated delivery
    SmtpUsername,

    /// `source.smtp.password`, only required for authenticated delivery
    SmtpPassword,
}

impl RequiredField {
    /// The dotted path of the field in the input JSON
    pub fn path(&self) -> &'static str {
        match self {
            Self::SmtpHost => "source.smtp.host",
            Self::SmtpPort => "source.smtp.port",
            Self::From => "source.from",
            Self::To => "source.to",
            Self::Subject => "params.subject",
            Self::SmtpUsername => "source.smtp.username",
            Self::SmtpPassword => "source.smtp.password",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subject => write!(f, "Subjectfile needs to be specified"),
            Self::SmtpUsername | Self::SmtpPassword => write!(
                f,
                "missing required field \"{}\" if anonymous specify anonymous: true",
                self.path()
            ),
            _ => write!(f, "missing required field \"{}\"", self.path()),
        }
    }
}

/// Why a template could not be turned into text
#[derive(Debug, Error)]
pub enum TemplateFailure {
    /// The template or the intermediate file could not be read or written
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The template engine rejected the template
    #[error(transparent)]
    Render(#[from] minijinja::Error),
}

/// Errors that end a notification run
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The input is not JSON of the expected shape
    #[error("error parsing input as JSON: {0}")]
    MalformedInput(#[from] serde_json::Error),

    /// A required configuration field is empty or absent
    #[error("{0}")]
    MissingField(RequiredField),

    /// A plain subject, body or headers file could not be read
    #[error("could not read {}: {source}", .path.display())]
    FileReadError {
        /// The resolved path
        path: PathBuf,

        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A subject or body template could not be rendered
    #[error("could not render template {}: {source}", .path.display())]
    TemplateError {
        /// The resolved template path, or the intermediate file that failed
        path: PathBuf,

        /// What went wrong
        #[source]
        source: TemplateFailure,
    },

    /// The SMTP exchange failed
    #[error("Unable to send an email using SMTP server {host} on port {port}: {source}")]
    DeliveryError {
        /// The configured SMTP host
        host: String,

        /// The configured SMTP port
        port: String,

        /// The transport failure
        #[source]
        source: MailerError,
    },
}

impl From<RequiredField> for NotificationError {
    fn from(field: RequiredField) -> Self {
        debug!("RequiredField -> NotificationError");

        NotificationError::MissingField(field)
    }
}
