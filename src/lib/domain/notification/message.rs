//! Email message

/// A subject, header block and body ready to be assembled
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedMessage {
    /// The subject, without surrounding newlines
    pub subject: String,

    /// Extra raw header lines, without surrounding newlines; may be empty
    pub headers: String,

    /// The body; may be empty
    pub body: String,
}

impl RenderedMessage {
    /// Creates a message, trimming newlines around the subject and headers
    pub fn new(subject: &str, headers: &str, body: String) -> Self {
        Self {
            subject: subject.trim_matches('\n').to_string(),
            headers: headers.trim_matches('\n').to_string(),
            body,
        }
    }

    /// Whether there is nothing in the body
    pub fn has_empty_body(&self) -> bool {
        self.body.is_empty()
    }

    /// The raw message addressed to `recipients`
    pub fn assemble(&self, recipients: &[String]) -> Vec<u8> {
        assemble(recipients, &self.headers, &self.subject, &self.body)
    }
}

/// Builds the raw message:
///
/// ```text
/// To: <recipients>
/// [<headers>]
/// Subject: <subject>
///
/// <body>
/// ```
///
/// The header block is included verbatim when it is not empty.
pub fn assemble(recipients: &[String], headers: &str, subject: &str, body: &str) -> Vec<u8> {
    let mut message = String::with_capacity(headers.len() + subject.len() + body.len() + 64);

    message.push_str("To: ");
    message.push_str(&recipients.join(", "));
    message.push('\n');

    if !headers.is_empty() {
        message.push_str(headers);
        message.push('\n');
    }

    message.push_str("Subject: ");
    message.push_str(subject);
    message.push('\n');

    message.push('\n');
    message.push_str(body);

    message.into_bytes()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn recipients(addresses: &[&str]) -> Vec<String> {
        addresses.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_assemble_without_headers() {
        let message = assemble(&recipients(&["b@x"]), "", "Hi", "Build passed\n");

        assert_eq!(
            String::from_utf8_lossy(&message),
            "To: b@x\nSubject: Hi\n\nBuild passed\n"
        );
    }

    #[test]
    fn test_assemble_with_headers_and_several_recipients() {
        let message = assemble(
            &recipients(&["b@x", "c@x", "d@x"]),
            "MIME-version: 1.0\nContent-Type: text/html; charset=\"UTF-8\"",
            "Build failed",
            "<p>oops</p>",
        );

        assert_eq!(
            String::from_utf8_lossy(&message),
            "To: b@x, c@x, d@x\n\
             MIME-version: 1.0\n\
             Content-Type: text/html; charset=\"UTF-8\"\n\
             Subject: Build failed\n\
             \n\
             <p>oops</p>"
        );
    }

    #[test]
    fn test_assemble_with_empty_body_ends_with_blank_line() {
        let message = assemble(&recipients(&["b@x"]), "", "Hi", "");

        assert_eq!(String::from_utf8_lossy(&message), "To: b@x\nSubject: Hi\n\n");
    }

    #[test]
    fn test_rendered_message_trims_newlines_only() {
        let message = RenderedMessage::new("\n Hi \n\n", "\nX-Priority: 1\n", "\nbody\n".to_string());

        assert_eq!(message.subject, " Hi ");
        assert_eq!(message.headers, "X-Priority: 1");
        assert_eq!(message.body, "\nbody\n");
    }

    #[test]
    fn test_rendered_message_assemble() {
        let message = RenderedMessage::new("Hi\n", "", String::new());

        assert!(message.has_empty_body());
        assert_eq!(
            String::from_utf8_lossy(&message.assemble(&recipients(&["b@x"]))),
            "To: b@x\nSubject: Hi\n\n"
        );
    }
}
