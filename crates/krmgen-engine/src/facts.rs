//! Fact extraction: the one read-only pass over the existing document set.

use crate::settings::KindMatcher;
use krmgen_core::{CoreError, Document, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Workload identity extracted from the document set.
///
/// Derived once per invocation from the frozen snapshot; never recomputed
/// mid-pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadFacts {
    /// Name of the primary (first) container
    pub container: String,
    /// Declared named ports of that container
    pub ports: BTreeMap<String, i32>,
}

#[derive(Deserialize)]
struct WorkloadShape {
    spec: WorkloadSpec,
}

#[derive(Deserialize)]
struct WorkloadSpec {
    template: PodTemplate,
}

#[derive(Deserialize)]
struct PodTemplate {
    spec: PodSpec,
}

#[derive(Deserialize)]
struct PodSpec {
    #[serde(default)]
    containers: Vec<ContainerShape>,
}

#[derive(Deserialize)]
struct ContainerShape {
    name: String,
    #[serde(default)]
    ports: Vec<NamedPort>,
}

#[derive(Deserialize)]
struct NamedPort {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "containerPort")]
    container_port: i32,
}

impl WorkloadFacts {
    /// Extract facts from the single document matching the discriminator.
    ///
    /// Zero matches fail with `FactNotFound`; more than one fails with
    /// `AmbiguousFactSource` instead of silently picking the first.
    pub fn extract(docs: &[Document], workload: &KindMatcher) -> Result<Self> {
        let mut matches = docs.iter().filter(|d| workload.matches(d));
        let doc = matches
            .next()
            .ok_or_else(|| CoreError::fact_not_found(&workload.kind, &workload.api_version))?;
        let extra = matches.count();
        if extra > 0 {
            return Err(CoreError::ambiguous_fact_source(
                &workload.kind,
                &workload.api_version,
                extra + 1,
            ));
        }

        let shape: WorkloadShape = doc.decode()?;
        let container = shape
            .spec
            .template
            .spec
            .containers
            .into_iter()
            .next()
            .ok_or_else(|| {
                CoreError::malformed_document(&doc.kind, doc.name(), "workload has no containers")
            })?;

        let ports: BTreeMap<String, i32> = container
            .ports
            .into_iter()
            .filter_map(|p| p.name.map(|name| (name, p.container_port)))
            .collect();

        debug!(container = %container.name, ?ports, "extracted workload facts");

        Ok(Self {
            container: container.name,
            ports,
        })
    }

    pub fn port(&self, name: &str) -> Option<i32> {
        self.ports.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn deployment(name: &str, ports: serde_json::Value) -> Document {
        Document::new("apps/v1", "Deployment", name).with_body_field(
            "spec",
            json!({
                "template": {
                    "spec": {
                        "containers": [{ "name": name, "ports": ports }]
                    }
                }
            }),
        )
    }

    fn discriminator() -> KindMatcher {
        KindMatcher::new("Deployment", "apps/v1")
    }

    #[test]
    fn test_extract_named_ports() {
        let docs = vec![
            Document::new("v1", "ConfigMap", "unrelated"),
            deployment(
                "svc1",
                json!([
                    { "name": "https", "containerPort": 8080 },
                    { "name": "grpc", "containerPort": 9090 },
                    { "containerPort": 15000 }
                ]),
            ),
        ];

        let facts = WorkloadFacts::extract(&docs, &discriminator()).unwrap();
        assert_eq!(facts.container, "svc1");
        assert_eq!(facts.port("https"), Some(8080));
        assert_eq!(facts.port("grpc"), Some(9090));
        // unnamed ports carry no identity and are skipped
        assert_eq!(facts.ports.len(), 2);
    }

    #[test]
    fn test_fact_not_found() {
        let docs = vec![Document::new("v1", "Service", "svc1")];
        let err = WorkloadFacts::extract(&docs, &discriminator()).unwrap_err();
        assert!(matches!(err, CoreError::FactNotFound { .. }));
    }

    #[test]
    fn test_ambiguous_fact_source() {
        // Two documents match the discriminator: fail loudly and
        // deterministically instead of picking one.
        let docs = vec![
            deployment("svc1", json!([{ "name": "https", "containerPort": 8080 }])),
            deployment("svc2", json!([{ "name": "https", "containerPort": 8081 }])),
        ];
        let err = WorkloadFacts::extract(&docs, &discriminator()).unwrap_err();
        match err {
            CoreError::AmbiguousFactSource { count, .. } => assert_eq!(count, 2),
            other => panic!("expected AmbiguousFactSource, got {other}"),
        }
    }

    #[test]
    fn test_workload_without_containers_is_malformed() {
        let doc = Document::new("apps/v1", "Deployment", "svc1").with_body_field(
            "spec",
            json!({ "template": { "spec": { "containers": [] } } }),
        );
        let err = WorkloadFacts::extract(&[doc], &discriminator()).unwrap_err();
        assert!(matches!(err, CoreError::MalformedDocument { .. }));
    }

    #[test]
    fn test_workload_missing_spec_is_malformed() {
        let doc = Document::new("apps/v1", "Deployment", "svc1");
        let err = WorkloadFacts::extract(&[doc], &discriminator()).unwrap_err();
        assert!(matches!(err, CoreError::MalformedDocument { .. }));
    }
}
