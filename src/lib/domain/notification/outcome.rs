//! Outcome record written to standard output

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The version stamp of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// When the run completed
    pub time: DateTime<Utc>,
}

/// A name/value metadata pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataItem {
    /// The metadata name
    pub name: String,

    /// The metadata value
    pub value: String,
}

impl MetadataItem {
    fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// What the step reports once it finishes, whether or not a message was sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    /// The version stamp
    pub version: Version,

    /// The SMTP host and the subject, in that order
    pub metadata: Vec<MetadataItem>,
}

impl OutcomeRecord {
    /// Creates a record stamped with the current UTC time
    pub fn new(smtp_host: &str, subject: &str) -> Self {
        Self {
            version: Version { time: Utc::now() },
            metadata: vec![
                MetadataItem::new("smtp_host", smtp_host),
                MetadataItem::new("subject", subject),
            ],
        }
    }

    /// Looks up a metadata value by name
    pub fn metadata_value(&self, name: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|item| item.name == name)
            .map(|item| item.value.as_str())
    }

    /// Serializes the record as JSON to `writer`
    pub fn write_to<W: Write>(&self, writer: W) -> serde_json::Result<()> {
        serde_json::to_writer(writer, self)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use serde_json::Value;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn test_new_record_has_host_then_subject() {
        let record = OutcomeRecord::new("smtp.x", "Hi");

        assert_eq!(
            record.metadata,
            vec![
                MetadataItem::new("smtp_host", "smtp.x"),
                MetadataItem::new("subject", "Hi"),
            ]
        );
        assert_eq!(record.metadata_value("subject"), Some("Hi"));
        assert_eq!(record.metadata_value("missing"), None);
    }

    #[test]
    fn test_record_is_stamped_now() {
        let before = Utc::now();
        let record = OutcomeRecord::new("smtp.x", "Hi");

        assert!(record.version.time >= before);
        assert!(record.version.time - before < Duration::seconds(5));
    }

    #[test]
    fn test_write_json_shape() -> TestResult {
        let record = OutcomeRecord::new("smtp.x", "Hi");

        let mut out = Vec::new();
        record.write_to(&mut out)?;

        let json: Value = serde_json::from_slice(&out)?;

        assert!(json["version"]["time"].as_str().is_some_and(|t| t.ends_with('Z')));
        assert_eq!(json["metadata"][0]["name"], "smtp_host");
        assert_eq!(json["metadata"][0]["value"], "smtp.x");
        assert_eq!(json["metadata"][1]["name"], "subject");
        assert_eq!(json["metadata"][1]["value"], "Hi");

        let parsed: OutcomeRecord = serde_json::from_slice(&out)?;
        assert_eq!(parsed, record);

        Ok(())
    }
}
