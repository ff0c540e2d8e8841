//! Autoscaler rule family.

use crate::intent::{ScalingSpec, WorkloadIntent};
use crate::settings::GeneratorSettings;
use krmgen_core::Document;
use serde_json::{Value, json};
use std::collections::BTreeMap;

pub const SCALER_API_VERSION: &str = "keda.sh/v1alpha1";

/// Synthesize the ScaledObject targeting a synthesized workload.
///
/// Trigger order is fixed (queue, memory, cpu) so reruns serialize
/// identically.
pub fn scaled_object_document(
    intent: &WorkloadIntent,
    scaling: &ScalingSpec,
    target_kind: &str,
    target_api_version: &str,
    settings: &GeneratorSettings,
) -> Document {
    let mut triggers: Vec<Value> = Vec::new();
    if let Some(queue) = &scaling.queue {
        triggers.push(json!({
            "type": "gcp-pubsub",
            "metadata": {
                "subscriptionName": queue.name,
                "subscriptionSize": queue.size
            },
            "authenticationRef": { "name": settings.scaler_auth_name }
        }));
    }
    if let Some(memory) = &scaling.memory {
        triggers.push(json!({
            "type": "memory",
            "metadata": { "type": "Utilization", "value": memory.target }
        }));
    }
    if let Some(cpu) = &scaling.cpu {
        triggers.push(json!({
            "type": "cpu",
            "metadata": { "type": "Utilization", "value": cpu.target }
        }));
    }

    Document::new(SCALER_API_VERSION, "ScaledObject", &intent.app)
        .with_labels(BTreeMap::from([
            ("app".to_string(), intent.app.clone()),
            ("part-of".to_string(), intent.part_of.clone()),
        ]))
        .with_body_field(
            "spec",
            json!({
                "scaleTargetRef": {
                    "apiVersion": target_api_version,
                    "kind": target_kind,
                    "name": intent.app
                },
                "minReplicaCount": scaling.min_replicas,
                "maxReplicaCount": scaling.max_replicas,
                "triggers": triggers
            }),
        )
}
