//! Delivery request: the validated step configuration

use serde::Deserialize;
use tracing::debug;

use crate::domain::notification::{
    errors::{NotificationError, RequiredField},
    Password,
};

/// How the step authenticates against the SMTP server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmtpCredentials {
    /// Relay without authenticating
    Anonymous,

    /// Authenticate with a username and password
    Login {
        /// The SMTP username
        username: String,

        /// The SMTP password
        password: Password,
    },
}

/// SMTP endpoint settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    /// The SMTP host
    pub host: String,

    /// The SMTP port, as configured
    pub port: String,

    /// The credentials, or anonymous relay
    pub credentials: SmtpCredentials,
}

impl SmtpSettings {
    /// Whether delivery goes through the anonymous relay
    pub fn is_anonymous(&self) -> bool {
        matches!(self.credentials, SmtpCredentials::Anonymous)
    }
}

/// Where a subject or body comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSource {
    /// Path to the text or template, relative to the source root unless absolute
    pub path: String,

    /// Whether the file is a template to render
    pub is_template: bool,
}

/// A validated notification request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRequest {
    /// SMTP endpoint
    pub smtp: SmtpSettings,

    /// Envelope sender
    pub from: String,

    /// Recipients, in order
    pub to: Vec<String>,

    /// Subject source
    pub subject: MessageSource,

    /// Body source, [`None`] when no body was supplied
    pub body: Option<MessageSource>,

    /// Path to a file of extra header lines
    pub headers: Option<String>,

    /// Whether to deliver when the rendered body is empty
    pub send_empty_body: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRequest {
    source: RawSource,
    params: RawParams,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSource {
    smtp: RawSmtp,
    from: Option<String>,
    to: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSmtp {
    host: Option<String>,
    port: Option<String>,
    username: Option<String>,
    password: Option<String>,
    anonymous: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawParams {
    subject: Option<String>,
    istemplatesubject: Option<bool>,
    body: Option<String>,
    istemplatebody: Option<bool>,
    send_empty_body: Option<bool>,
    headers: Option<String>,
}

fn required(value: Option<String>, field: RequiredField) -> Result<String, NotificationError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(field.into()),
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

impl DeliveryRequest {
    /// Parses and validates the step input
    ///
    /// Fields are checked in a fixed order and the first missing one is reported.
    ///
    /// # Returns
    /// - [`Ok`] with the [`DeliveryRequest`] if the input is well formed and complete.
    /// - [`Err`] with [`NotificationError::MalformedInput`] or [`NotificationError::MissingField`].
    pub fn from_json(input: &[u8]) -> Result<Self, NotificationError> {
        let raw: RawRequest = serde_json::from_slice(input)?;

        let RawRequest { source, params } = raw;

        let host = required(source.smtp.host, RequiredField::SmtpHost)?;
        let port = required(source.smtp.port, RequiredField::SmtpPort)?;
        let from = required(source.from, RequiredField::From)?;

        let to = source.to.unwrap_or_default();
        if to.is_empty() {
            return Err(RequiredField::To.into());
        }

        let subject = MessageSource {
            path: required(params.subject, RequiredField::Subject)?,
            is_template: params.istemplatesubject.unwrap_or_default(),
        };

        let credentials = if source.smtp.anonymous.unwrap_or_default() {
            SmtpCredentials::Anonymous
        } else {
            SmtpCredentials::Login {
                username: required(source.smtp.username, RequiredField::SmtpUsername)?,
                password: Password::new(&required(
                    source.smtp.password,
                    RequiredField::SmtpPassword,
                )?),
            }
        };

        let body = optional(params.body).map(|path| MessageSource {
            path,
            is_template: params.istemplatebody.unwrap_or_default(),
        });

        let request = Self {
            smtp: SmtpSettings {
                host,
                port,
                credentials,
            },
            from,
            to,
            subject,
            body,
            headers: optional(params.headers),
            send_empty_body: params.send_empty_body.unwrap_or_default(),
        };

        debug!(
            host = %request.smtp.host,
            anonymous = request.smtp.is_anonymous(),
            recipients = request.to.len(),
            "validated delivery request"
        );

        Ok(request)
    }
}
