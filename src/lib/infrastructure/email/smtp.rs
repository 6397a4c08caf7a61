//! SMTP delivery strategies

use std::borrow::Cow;

use lettre::{
    address::Envelope,
    transport::smtp::{
        authentication::{Credentials, Mechanism},
        client::{SmtpConnection, Tls, TlsParameters},
        commands::{Data, Mail, Rcpt},
        extension::{ClientId, Extension, MailBodyParameter, MailParameter},
    },
    Address, SmtpTransport, Transport,
};
use tracing::{debug, warn};

use crate::domain::notification::{
    Mailer, MailerError, Password, SmtpCredentials, SmtpSettings,
};

/// Picks the delivery strategy for the configured credentials
pub fn select_mailer(settings: &SmtpSettings) -> Box<dyn Mailer> {
    match &settings.credentials {
        SmtpCredentials::Anonymous => Box::new(AnonymousRelay::new(&settings.host, &settings.port)),
        SmtpCredentials::Login { username, password } => Box::new(AuthenticatedSender::new(
            &settings.host,
            &settings.port,
            username,
            password.clone(),
        )),
    }
}

/// Relays through the server without authenticating, driving the SMTP
/// session one command at a time
#[derive(Debug, Clone)]
pub struct AnonymousRelay {
    host: String,
    port: String,
}

impl AnonymousRelay {
    /// Create a new anonymous relay
    pub fn new(host: &str, port: &str) -> Self {
        Self {
            host: host.to_string(),
            port: port.to_string(),
        }
    }
}

impl Mailer for AnonymousRelay {
    fn send(&self, from: &str, to: &[String], payload: &[u8]) -> Result<(), MailerError> {
        let port = parse_port(&self.port)?;
        let sender = parse_address(from)?;
        let payload = data_payload(payload);

        let mut session = RelaySession::connect(&self.host, port)?;

        let mut parameters = vec![];
        if !payload.is_ascii() && session.supports(Extension::EightBitMime) {
            parameters.push(MailParameter::Body(MailBodyParameter::EightBitMime));
        }

        session
            .connection
            .command(Mail::new(Some(sender), parameters))
            .map_err(MailerError::Sender)?;

        for recipient in to {
            let address = match parse_address(recipient) {
                Ok(address) => address,
                Err(err) => {
                    warn!("skipping recipient: {}", err);
                    continue;
                }
            };

            if let Err(err) = session.connection.command(Rcpt::new(address, vec![])) {
                warn!("recipient {} rejected: {}", recipient, err);
            }
        }

        session
            .connection
            .command(Data)
            .map_err(MailerError::Data)?;

        session
            .connection
            .message(&payload)
            .map_err(MailerError::Write)?;

        session.close();

        Ok(())
    }
}

/// An open SMTP session, aborted when dropped unless closed first
struct RelaySession {
    connection: SmtpConnection,
    closed: bool,
}

impl RelaySession {
    fn connect(host: &str, port: u16) -> Result<Self, MailerError> {
        debug!("dialing {}:{}", host, port);

        let connection = SmtpConnection::connect((host, port), None, &ClientId::default(), None, None)
            .map_err(MailerError::Connect)?;

        Ok(Self {
            connection,
            closed: false,
        })
    }

    fn supports(&self, extension: Extension) -> bool {
        self.connection.server_info().supports_feature(extension)
    }

    fn close(&mut self) {
        if let Err(err) = self.connection.quit() {
            debug!("error closing SMTP session: {}", err);
        }
        self.closed = true;
    }
}

impl Drop for RelaySession {
    fn drop(&mut self) {
        if !self.closed {
            self.connection.abort();
        }
    }
}

/// Sends in one call with PLAIN authentication. STARTTLS is required unless
/// the server is the local host
#[derive(Debug, Clone)]
pub struct AuthenticatedSender {
    host: String,
    port: String,
    username: String,
    password: Password,
}

impl AuthenticatedSender {
    /// Create a new authenticated sender
    pub fn new(host: &str, port: &str, username: &str, password: Password) -> Self {
        Self {
            host: host.to_string(),
            port: port.to_string(),
            username: username.to_string(),
            password,
        }
    }

    fn transport(&self, port: u16) -> Result<SmtpTransport, MailerError> {
        let creds = Credentials::new(
            self.username.clone(),
            self.password.as_str().to_string(),
        );

        let tls = TlsParameters::builder(self.host.to_string())
            .build()
            .map_err(MailerError::Connect)?;

        Ok(SmtpTransport::builder_dangerous(self.host.as_str())
            .port(port)
            .tls(tls_policy(&self.host, tls))
            .credentials(creds)
            .authentication(vec![Mechanism::Plain])
            .timeout(None)
            .build())
    }
}

impl Mailer for AuthenticatedSender {
    fn send(&self, from: &str, to: &[String], payload: &[u8]) -> Result<(), MailerError> {
        let port = parse_port(&self.port)?;

        let recipients = to
            .iter()
            .map(|address| parse_address(address))
            .collect::<Result<Vec<_>, _>>()?;
        let envelope = Envelope::new(Some(parse_address(from)?), recipients)?;

        debug!("sending to {}:{} as {}", self.host, port, self.username);

        self.transport(port)?
            .send_raw(&envelope, &data_payload(payload))
            .map_err(MailerError::Send)?;

        Ok(())
    }
}

fn parse_port(port: &str) -> Result<u16, MailerError> {
    port.trim()
        .parse()
        .map_err(|_| MailerError::InvalidPort(port.to_string()))
}

fn parse_address(address: &str) -> Result<Address, MailerError> {
    address
        .trim()
        .parse()
        .map_err(|source| MailerError::InvalidAddress {
            address: address.to_string(),
            source,
        })
}

/// Credentials may only cross an unencrypted connection to the local host
fn tls_policy(host: &str, parameters: TlsParameters) -> Tls {
    if is_localhost(host) {
        Tls::Opportunistic(parameters)
    } else {
        Tls::Required(parameters)
    }
}

fn is_localhost(host: &str) -> bool {
    matches!(host, "localhost" | "127.0.0.1" | "::1")
}

/// Prepares a payload for the data channel. Line endings become `\r\n` and
/// one trailing `\r\n` is dropped, since the transport writes its own before
/// the terminating dot.
pub fn data_payload(payload: &[u8]) -> Cow<'_, [u8]> {
    match normalize_line_endings(payload) {
        Cow::Borrowed(bytes) => Cow::Borrowed(bytes.strip_suffix(b"\r\n").unwrap_or(bytes)),
        Cow::Owned(mut bytes) => {
            if bytes.ends_with(b"\r\n") {
                bytes.truncate(bytes.len() - 2);
            }
            Cow::Owned(bytes)
        }
    }
}

/// Converts bare `\n` line endings to `\r\n` for the SMTP data channel
pub fn normalize_line_endings(payload: &[u8]) -> Cow<'_, [u8]> {
    let bare = payload
        .iter()
        .enumerate()
        .filter(|&(i, &byte)| byte == b'\n' && (i == 0 || payload[i - 1] != b'\r'))
        .count();

    if bare == 0 {
        return Cow::Borrowed(payload);
    }

    let mut normalized = Vec::with_capacity(payload.len() + bare);
    for (i, &byte) in payload.iter().enumerate() {
        if byte == b'\n' && (i == 0 || payload[i - 1] != b'\r') {
            normalized.push(b'\r');
        }
        normalized.push(byte);
    }

    Cow::Owned(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_bare_line_feeds() {
        assert_eq!(
            normalize_line_endings(b"To: b@x\nSubject: Hi\n\nbody"),
            &b"To: b@x\r\nSubject: Hi\r\n\r\nbody"[..]
        );
    }

    #[test]
    fn test_normalize_keeps_existing_crlf() {
        let payload = b"To: b@x\r\nSubject: Hi\r\n\r\nbody\n";

        assert_eq!(
            normalize_line_endings(payload),
            &b"To: b@x\r\nSubject: Hi\r\n\r\nbody\r\n"[..]
        );
        assert!(matches!(
            normalize_line_endings(b"a\r\nb"),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn test_normalize_leading_line_feed() {
        assert_eq!(normalize_line_endings(b"\nx"), &b"\r\nx"[..]);
    }

    #[test]
    fn test_data_payload_drops_one_trailing_line_ending() {
        assert_eq!(
            data_payload(b"To: b@x\nSubject: Hi\n\nbody\n"),
            &b"To: b@x\r\nSubject: Hi\r\n\r\nbody"[..]
        );
        assert_eq!(data_payload(b"body\r\n\r\n"), &b"body\r\n"[..]);
        assert_eq!(data_payload(b"body"), &b"body"[..]);
    }

    #[test]
    fn test_unencrypted_auth_only_for_localhost() -> Result<(), MailerError> {
        for host in ["localhost", "127.0.0.1", "::1"] {
            let parameters = TlsParameters::new(host.to_string()).map_err(MailerError::Connect)?;
            assert!(matches!(tls_policy(host, parameters), Tls::Opportunistic(_)));
        }

        for host in ["127.0.0.2", "smtp.example.com"] {
            let parameters = TlsParameters::new(host.to_string()).map_err(MailerError::Connect)?;
            assert!(matches!(tls_policy(host, parameters), Tls::Required(_)));
        }

        Ok(())
    }

    #[test]
    fn test_parse_port() {
        assert!(matches!(parse_port("25"), Ok(25)));
        assert!(matches!(parse_port("smtp"), Err(MailerError::InvalidPort(_))));
        assert!(matches!(parse_port("70000"), Err(MailerError::InvalidPort(_))));
    }

    #[test]
    fn test_parse_address() {
        assert!(parse_address("ci@example.com").is_ok());
        assert!(matches!(
            parse_address("not an address"),
            Err(MailerError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_invalid_port_fails_before_connecting() {
        let relay = AnonymousRelay::new("smtp.invalid", "twenty-five");

        let result = relay.send("a@example.com", &["b@example.com".to_string()], b"x");

        assert!(matches!(result, Err(MailerError::InvalidPort(_))));
    }

    #[test]
    fn test_invalid_recipient_fails_authenticated_send_before_connecting() {
        let sender = AuthenticatedSender::new(
            "smtp.invalid",
            "587",
            "ci",
            Password::new("hunter2"),
        );

        let result = sender.send("a@example.com", &["nobody".to_string()], b"x");

        assert!(matches!(result, Err(MailerError::InvalidAddress { .. })));
    }
}
