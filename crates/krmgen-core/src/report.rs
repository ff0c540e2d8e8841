use crate::document::DocumentKey;
use serde::{Deserialize, Serialize};

/// Result severity, mirrored into the emitted ResourceList results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Error,
}

/// What a merge did with one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Created,
    Updated,
    Unchanged,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Updated => write!(f, "updated"),
            Self::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// One structured outcome record per merge operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRecord {
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub outcome: Option<Outcome>,
    #[serde(rename = "resourceRef", skip_serializing_if = "Option::is_none", default)]
    pub resource: Option<DocumentKey>,
}

impl MergeRecord {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
            outcome: None,
            resource: None,
        }
    }
}

/// Accumulates merge records across one invocation.
///
/// Purely observational: it never fails and never influences the merge.
#[derive(Debug, Default)]
pub struct Reporter {
    records: Vec<MergeRecord>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one merge outcome against a target resource
    pub fn record(&mut self, outcome: Outcome, resource: DocumentKey, message: impl Into<String>) {
        self.records.push(MergeRecord {
            severity: Severity::Info,
            message: message.into(),
            outcome: Some(outcome),
            resource: Some(resource),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.records.push(MergeRecord::info(message));
    }

    /// Drain into the final ordered record list.
    ///
    /// When no derivation occurred a single informational record is emitted
    /// so the caller always sees at least one result.
    pub fn finish(self) -> Vec<MergeRecord> {
        if self.records.is_empty() {
            vec![MergeRecord::info("no injections")]
        } else {
            self.records
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_injections_fallback() {
        let reporter = Reporter::new();
        let records = reporter.finish();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, Severity::Info);
        assert_eq!(records[0].message, "no injections");
        assert!(records[0].outcome.is_none());
    }

    #[test]
    fn test_record_accumulation_preserves_order() {
        let mut reporter = Reporter::new();
        reporter.record(
            Outcome::Created,
            DocumentKey::new("Service", "svc1"),
            "created Service/svc1",
        );
        reporter.record(
            Outcome::Unchanged,
            DocumentKey::new("Certificate", "svc1"),
            "Certificate/svc1 unchanged",
        );

        let records = reporter.finish();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].outcome, Some(Outcome::Created));
        assert_eq!(records[1].outcome, Some(Outcome::Unchanged));
        assert_eq!(
            records[1].resource,
            Some(DocumentKey::new("Certificate", "svc1"))
        );
    }

    #[test]
    fn test_record_serialization() {
        let mut reporter = Reporter::new();
        reporter.record(
            Outcome::Updated,
            DocumentKey::new("IngressRoute", "web"),
            "updated route",
        );
        let json = serde_json::to_value(reporter.finish()).unwrap();

        assert_eq!(json[0]["severity"], "info");
        assert_eq!(json[0]["outcome"], "updated");
        assert_eq!(json[0]["resourceRef"]["kind"], "IngressRoute");
    }

    #[test]
    fn test_info_record_has_no_resource() {
        let record = MergeRecord::info("no injections");
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("resourceRef").is_none());
        assert!(json.get("outcome").is_none());
    }
}
