//! Build notification emails: configuration, rendering, assembly and delivery.

mod message;
mod outcome;
mod password;
mod request;
mod service;

pub mod errors;
pub mod mailer;
pub mod templates;

pub use errors::{NotificationError, RequiredField};
pub use mailer::{Mailer, MailerError};
pub use message::{assemble, RenderedMessage};
pub use outcome::{MetadataItem, OutcomeRecord, Version};
pub use password::Password;
pub use request::{DeliveryRequest, MessageSource, SmtpCredentials, SmtpSettings};
pub use service::{NotificationService, EMPTY_BODY_NOTICE};
pub use templates::{BuildMetadata, TemplateRenderer};
