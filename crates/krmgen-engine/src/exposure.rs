//! Exposure rule family: the Service fronting the workload.

use crate::facts::WorkloadFacts;
use crate::settings::GeneratorSettings;
use krmgen_core::{CoreError, Document, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePort {
    pub name: String,
    pub port: i64,
    #[serde(rename = "targetPort")]
    pub target_port: i64,
}

/// One Service exposing the fixed external port, mapped onto the
/// workload's https/grpc named ports (whichever are present), selecting
/// pods by the app label.
pub fn service_document(
    app: &str,
    facts: &WorkloadFacts,
    settings: &GeneratorSettings,
) -> Result<Document> {
    let mut ports = Vec::new();
    if let Some(https) = facts.port(&settings.https_port_name) {
        ports.push(ServicePort {
            name: settings.https_port_name.clone(),
            port: i64::from(settings.external_port),
            target_port: i64::from(https),
        });
    }
    if let Some(grpc) = facts.port(&settings.grpc_port_name) {
        ports.push(ServicePort {
            name: settings.grpc_port_name.clone(),
            port: i64::from(settings.external_port),
            target_port: i64::from(grpc),
        });
    }
    if ports.is_empty() {
        return Err(CoreError::configuration(format!(
            "workload exposes neither a `{}` nor a `{}` named port",
            settings.https_port_name, settings.grpc_port_name
        )));
    }

    let doc = Document::new("v1", "Service", app).with_body_field(
        "spec",
        json!({
            "ports": serde_json::to_value(ports)?,
            "selector": { "app": app }
        }),
    );
    Ok(doc)
}
