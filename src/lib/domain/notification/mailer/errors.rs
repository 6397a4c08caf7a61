//! Mailer errors

use lettre::{address::AddressError, transport::smtp};
use thiserror::Error;

/// Mailer errors
#[derive(Debug, Error)]
pub enum MailerError {
    /// The configured port is not a TCP port number
    #[error("invalid port {0:?}")]
    InvalidPort(String),

    /// An envelope address could not be parsed
    #[error("invalid email address {address:?}: {source}")]
    InvalidAddress {
        /// The address as configured
        address: String,

        /// Why it was rejected
        #[source]
        source: AddressError,
    },

    /// The envelope could not be built from the configured addresses
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(#[from] lettre::error::Error),

    /// The SMTP server could not be reached or refused the session
    #[error("error dialing: {0}")]
    Connect(#[source] smtp::Error),

    /// The server refused the envelope sender
    #[error("sender rejected: {0}")]
    Sender(#[source] smtp::Error),

    /// The server refused to open the data channel
    #[error("error getting writer context: {0}")]
    Data(#[source] smtp::Error),

    /// Writing the message to the data channel failed
    #[error("error writing bytes: {0}")]
    Write(#[source] smtp::Error),

    /// The authenticated send failed
    #[error(transparent)]
    Send(smtp::Error),
}
