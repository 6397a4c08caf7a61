//! Notification service: render, assemble, deliver, report

use std::io::Write;

use tracing::{debug, info};

use crate::{
    domain::notification::{
        errors::NotificationError, mailer::Mailer, templates::TemplateRenderer, BuildMetadata,
        DeliveryRequest, MessageSource, OutcomeRecord, RenderedMessage,
    },
    infrastructure::filesystem::SourceRoot,
};

/// Explanation written when the empty-body guard skips delivery
pub const EMPTY_BODY_NOTICE: &str = "Message not sent because the message body is empty and send_empty_body parameter was set to false. Github readme: https://github.com/pivotal-cf/email-resource";

/// Runs a delivery request through the pipeline
#[derive(Debug, Clone)]
pub struct NotificationService {
    renderer: TemplateRenderer,
}

impl NotificationService {
    /// Creates a new notification service.
    ///
    /// # Arguments
    /// * `root` - The build source directory paths resolve against.
    /// * `build` - The build metadata templates are rendered with.
    pub fn new(root: SourceRoot, build: BuildMetadata) -> Self {
        Self {
            renderer: TemplateRenderer::new(root, build),
        }
    }

    /// Renders the subject, headers and body of a request.
    ///
    /// Rendered template text is echoed to `diagnostics`.
    ///
    /// # Returns
    /// - [`Ok`] with the [`RenderedMessage`].
    /// - [`Err`] with [`NotificationError::TemplateError`] or [`NotificationError::FileReadError`].
    pub fn render<D: Write>(
        &self,
        request: &DeliveryRequest,
        diagnostics: &mut D,
    ) -> Result<RenderedMessage, NotificationError> {
        let subject = self.load(&request.subject, diagnostics, |renderer, path| {
            renderer.render_subject(path)
        })?;

        let headers = match &request.headers {
            Some(path) => self.renderer.read_source(path)?,
            None => String::new(),
        };

        let body = match &request.body {
            Some(source) => self.load(source, diagnostics, |renderer, path| {
                renderer.render_body(path)
            })?,
            None => String::new(),
        };

        Ok(RenderedMessage::new(&subject, &headers, body))
    }

    /// Renders, assembles and delivers a request, and returns the record to report.
    ///
    /// When the body is empty and `send_empty_body` is off, nothing is sent, an
    /// explanation goes to `diagnostics`, and the record is still returned.
    ///
    /// # Returns
    /// - [`Ok`] with the [`OutcomeRecord`] if the message was delivered or deliberately skipped.
    /// - [`Err`] with the first [`NotificationError`] otherwise.
    pub fn notify<M, D>(
        &self,
        request: &DeliveryRequest,
        mailer: &M,
        diagnostics: &mut D,
    ) -> Result<OutcomeRecord, NotificationError>
    where
        M: Mailer + ?Sized,
        D: Write,
    {
        let message = self.render(request, diagnostics)?;
        let payload = message.assemble(&request.to);

        if !request.send_empty_body && message.has_empty_body() {
            info!("body is empty, skipping delivery");
            let _ = writeln!(diagnostics, "{EMPTY_BODY_NOTICE}");

            return Ok(OutcomeRecord::new(&request.smtp.host, &message.subject));
        }

        info!(
            host = %request.smtp.host,
            port = %request.smtp.port,
            anonymous = request.smtp.is_anonymous(),
            "delivering notification to {} recipient(s)",
            request.to.len()
        );

        mailer
            .send(&request.from, &request.to, &payload)
            .map_err(|source| NotificationError::DeliveryError {
                host: request.smtp.host.clone(),
                port: request.smtp.port.clone(),
                source,
            })?;

        debug!("notification delivered");

        Ok(OutcomeRecord::new(&request.smtp.host, &message.subject))
    }

    fn load<D, F>(
        &self,
        source: &MessageSource,
        diagnostics: &mut D,
        render: F,
    ) -> Result<String, NotificationError>
    where
        D: Write,
        F: Fn(&TemplateRenderer, &str) -> Result<String, NotificationError>,
    {
        if !source.is_template {
            return self.renderer.read_source(&source.path);
        }

        let text = render(&self.renderer, &source.path)?;
        let _ = write!(diagnostics, "Output : {text}");

        Ok(text)
    }
}
