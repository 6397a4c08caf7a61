//! Mailer module

mod errors;

#[cfg(test)]
use mockall::mock;

pub use errors::MailerError;

/// Delivers an assembled message over SMTP
pub trait Mailer {
    /// Send a message
    ///
    /// # Arguments
    /// * `from` - The envelope sender.
    /// * `to` - The envelope recipients, in the order they are announced to the server.
    /// * `payload` - The assembled message, headers and body.
    ///
    /// # Returns
    /// A [`Result`] indicating whether the whole payload was accepted.
    fn send(&self, from: &str, to: &[String], payload: &[u8]) -> Result<(), MailerError>;
}

#[cfg(test)]
mock! {
    pub Mailer {}

    impl Mailer for Mailer {
        fn send(&self, from: &str, to: &[String], payload: &[u8]) -> Result<(), MailerError>;
    }
}
