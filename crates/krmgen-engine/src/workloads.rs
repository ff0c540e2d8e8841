//! Workload rule family: controllers expanded from container shorthand.

use crate::intent::{ContainerSpec, StrategySpec, WorkloadIntent};
use crate::settings::GeneratorSettings;
use krmgen_core::{Document, Result};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

pub const ROLLOUT_API_VERSION: &str = "argoproj.io/v1alpha1";

/// Expand the compose-style shorthand fields into the target container
/// schema. `configs`/`secrets` become env sources, `http`/`grpc` become
/// named ports; every other field passes through untouched.
pub fn expand_container(spec: &ContainerSpec) -> Value {
    let mut container = Map::new();
    container.insert("name".to_string(), Value::String(spec.name.clone()));
    container.insert("image".to_string(), Value::String(spec.image.clone()));
    for (key, value) in &spec.rest {
        container.insert(key.clone(), value.clone());
    }

    let mut env_from = take_array(&mut container, "envFrom");
    for config in &spec.configs {
        env_from.push(json!({ "configMapRef": { "name": config } }));
    }
    for secret in &spec.secrets {
        env_from.push(json!({ "secretRef": { "name": secret } }));
    }
    if !env_from.is_empty() {
        container.insert("envFrom".to_string(), Value::Array(env_from));
    }

    let mut ports = take_array(&mut container, "ports");
    if let Some(http) = spec.http {
        ports.push(json!({ "name": "http", "containerPort": http.port, "protocol": "TCP" }));
    }
    if let Some(grpc) = spec.grpc {
        ports.push(json!({ "name": "grpc", "containerPort": grpc.port, "protocol": "TCP" }));
    }
    if !ports.is_empty() {
        container.insert("ports".to_string(), Value::Array(ports));
    }

    Value::Object(container)
}

fn take_array(map: &mut Map<String, Value>, key: &str) -> Vec<Value> {
    match map.remove(key) {
        Some(Value::Array(items)) => items,
        Some(other) => vec![other],
        None => Vec::new(),
    }
}

fn workload_labels(intent: &WorkloadIntent) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("app".to_string(), intent.app.clone()),
        ("part-of".to_string(), intent.part_of.clone()),
    ])
}

fn labels_value(intent: &WorkloadIntent) -> Value {
    json!({ "app": intent.app, "part-of": intent.part_of })
}

fn expanded_containers(intent: &WorkloadIntent) -> Vec<Value> {
    intent.containers.iter().map(expand_container).collect()
}

fn pod_template(intent: &WorkloadIntent) -> Value {
    json!({
        "metadata": {
            "name": intent.app,
            "labels": labels_value(intent)
        },
        "spec": { "containers": expanded_containers(intent) }
    })
}

/// Synthesize a Deployment from a workload intent
pub fn deployment_document(intent: &WorkloadIntent) -> Document {
    Document::new("apps/v1", "Deployment", &intent.app)
        .with_labels(workload_labels(intent))
        .with_body_field(
            "spec",
            json!({
                "selector": { "matchLabels": labels_value(intent) },
                "template": pod_template(intent)
            }),
        )
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanaryStep {
    #[serde(skip_serializing_if = "Option::is_none")]
    set_weight: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pause: Option<Pause>,
}

#[derive(Serialize)]
struct Pause {
    duration: i64,
}

fn set_weight(weight: i32) -> CanaryStep {
    CanaryStep {
        set_weight: Some(weight),
        pause: None,
    }
}

fn pause(duration: i64) -> CanaryStep {
    CanaryStep {
        set_weight: None,
        pause: Some(Pause { duration }),
    }
}

/// Canary step table per analysis environment: production rolls out in
/// stages with bake pauses, pre-production promotes in one step.
fn canary_steps(analysis_env: &str) -> Vec<CanaryStep> {
    match analysis_env {
        "prod" => vec![
            set_weight(30),
            pause(300),
            set_weight(60),
            pause(600),
            set_weight(100),
        ],
        "pre-prod" => vec![set_weight(100)],
        _ => Vec::new(),
    }
}

/// Synthesize a Rollout when the intent configures a rollout strategy
pub fn rollout_document(
    intent: &WorkloadIntent,
    strategy: &StrategySpec,
    settings: &GeneratorSettings,
) -> Result<Document> {
    let steps = serde_json::to_value(canary_steps(&strategy.analysis_env))?;
    let doc = Document::new(ROLLOUT_API_VERSION, "Rollout", &intent.app)
        .with_labels(workload_labels(intent))
        .with_body_field(
            "spec",
            json!({
                "selector": { "matchLabels": labels_value(intent) },
                "template": pod_template(intent),
                "strategy": {
                    "canary": {
                        "steps": steps,
                        "analysis": {
                            "templates": [
                                { "templateName": settings.analysis_template }
                            ],
                            "args": [
                                {
                                    "name": "service-name",
                                    "valueFrom": {
                                        "fieldRef": { "fieldPath": "metadata.name" }
                                    }
                                }
                            ],
                            "startingStep": 2
                        }
                    }
                }
            }),
        );
    Ok(doc)
}

fn job_spec(intent: &WorkloadIntent) -> Value {
    json!({ "template": pod_template(intent) })
}

/// Synthesize a Job from a job intent
pub fn job_document(intent: &WorkloadIntent) -> Document {
    Document::new("batch/v1", "Job", &intent.app)
        .with_labels(workload_labels(intent))
        .with_body_field("spec", job_spec(intent))
}

/// Synthesize a CronJob from a cron intent; the schedule is required
pub fn cronjob_document(intent: &WorkloadIntent) -> Result<Document> {
    let schedule = intent.require_schedule()?;
    let doc = Document::new("batch/v1", "CronJob", &intent.app)
        .with_labels(workload_labels(intent))
        .with_body_field(
            "spec",
            json!({
                "schedule": schedule,
                "jobTemplate": {
                    "metadata": {
                        "name": intent.app,
                        "labels": labels_value(intent)
                    },
                    "spec": job_spec(intent)
                }
            }),
        );
    Ok(doc)
}

/// Synthesize the Service fronting a workload: one service port per named
/// container port of the app container. Returns None when the workload
/// exposes no named ports.
pub fn workload_service_document(intent: &WorkloadIntent) -> Option<Document> {
    let containers = expanded_containers(intent);
    let app_container = containers
        .iter()
        .find(|c| c["name"] == json!(intent.app))
        .or_else(|| containers.first())?;

    let ports: Vec<Value> = app_container["ports"]
        .as_array()
        .map(|ports| {
            ports
                .iter()
                .filter_map(|p| {
                    let name = p.get("name")?.as_str()?;
                    let port = p.get("containerPort")?.as_i64()?;
                    Some(json!({ "name": name, "port": port, "targetPort": port }))
                })
                .collect()
        })
        .unwrap_or_default();
    if ports.is_empty() {
        return None;
    }

    Some(
        Document::new("v1", "Service", &intent.app)
            .with_labels(workload_labels(intent))
            .with_body_field(
                "spec",
                json!({
                    "ports": ports,
                    "selector": labels_value(intent)
                }),
            ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::{PortSpec, ScalingSpec};
    use assert_json_diff::assert_json_include;

    fn intent() -> WorkloadIntent {
        WorkloadIntent {
            part_of: "shop".to_string(),
            app: "svc1".to_string(),
            containers: vec![ContainerSpec {
                name: "svc1".to_string(),
                image: "registry.example.com/svc1:1.2.3".to_string(),
                configs: vec!["svc1-config".to_string()],
                secrets: vec!["svc1-secrets".to_string()],
                http: Some(PortSpec { port: 8080 }),
                grpc: Some(PortSpec { port: 9090 }),
                rest: Map::new(),
            }],
            scaling: Some(ScalingSpec {
                min_replicas: 2,
                max_replicas: 10,
                cpu: None,
                memory: None,
                queue: None,
            }),
            strategy: None,
            schedule: None,
        }
    }

    #[test]
    fn test_expand_container_shorthand() {
        let expanded = expand_container(&intent().containers[0]);

        assert_eq!(expanded["name"], "svc1");
        assert_eq!(expanded["image"], "registry.example.com/svc1:1.2.3");
        assert_eq!(
            expanded["envFrom"],
            json!([
                { "configMapRef": { "name": "svc1-config" } },
                { "secretRef": { "name": "svc1-secrets" } }
            ])
        );
        assert_eq!(
            expanded["ports"],
            json!([
                { "name": "http", "containerPort": 8080, "protocol": "TCP" },
                { "name": "grpc", "containerPort": 9090, "protocol": "TCP" }
            ])
        );
        // shorthand fields never leak into the target schema
        assert!(expanded.get("configs").is_none());
        assert!(expanded.get("http").is_none());
    }

    #[test]
    fn test_expand_container_preserves_passthrough_fields() {
        let mut spec = intent().containers[0].clone();
        spec.rest.insert(
            "resources".to_string(),
            json!({ "limits": { "memory": "256Mi" } }),
        );
        spec.rest
            .insert("ports".to_string(), json!([{ "containerPort": 15000 }]));

        let expanded = expand_container(&spec);
        assert_eq!(expanded["resources"]["limits"]["memory"], "256Mi");
        // declared ports stay ahead of shorthand ones
        assert_eq!(expanded["ports"][0]["containerPort"], 15000);
        assert_eq!(expanded["ports"][1]["name"], "http");
    }

    #[test]
    fn test_deployment_labels_selector_template() {
        let doc = deployment_document(&intent());

        assert_eq!(doc.kind, "Deployment");
        assert_eq!(doc.metadata.labels["app"], "svc1");
        assert_eq!(doc.metadata.labels["part-of"], "shop");

        let spec = doc.field("spec").unwrap();
        assert_json_include!(
            actual: spec.clone(),
            expected: json!({
                "selector": { "matchLabels": { "app": "svc1", "part-of": "shop" } },
                "template": {
                    "metadata": { "labels": { "app": "svc1", "part-of": "shop" } }
                }
            })
        );
        assert_eq!(
            spec["template"]["spec"]["containers"][0]["name"],
            "svc1"
        );
    }

    #[test]
    fn test_rollout_canary_steps_prod() {
        let strategy = StrategySpec {
            analysis_env: "prod".to_string(),
        };
        let doc =
            rollout_document(&intent(), &strategy, &GeneratorSettings::default()).unwrap();

        assert_eq!(doc.kind, "Rollout");
        assert_eq!(doc.api_version, ROLLOUT_API_VERSION);
        let canary = &doc.field("spec").unwrap()["strategy"]["canary"];
        let steps = canary["steps"].as_array().unwrap();
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[0]["setWeight"], 30);
        assert_eq!(steps[1]["pause"]["duration"], 300);
        assert_eq!(steps[4]["setWeight"], 100);
        assert_eq!(
            canary["analysis"]["templates"][0]["templateName"],
            "analysis-error-rate"
        );
    }

    #[test]
    fn test_rollout_canary_steps_pre_prod() {
        let strategy = StrategySpec {
            analysis_env: "pre-prod".to_string(),
        };
        let doc =
            rollout_document(&intent(), &strategy, &GeneratorSettings::default()).unwrap();

        let steps = doc.field("spec").unwrap()["strategy"]["canary"]["steps"]
            .as_array()
            .unwrap()
            .clone();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0]["setWeight"], 100);
    }

    #[test]
    fn test_job_and_cronjob() {
        let mut cron_intent = intent();
        cron_intent.schedule = Some("0 3 * * *".to_string());

        let job = job_document(&cron_intent);
        assert_eq!(job.kind, "Job");
        assert_eq!(
            job.field("spec").unwrap()["template"]["metadata"]["labels"]["part-of"],
            "shop"
        );

        let cron = cronjob_document(&cron_intent).unwrap();
        assert_eq!(cron.kind, "CronJob");
        let spec = cron.field("spec").unwrap();
        assert_eq!(spec["schedule"], "0 3 * * *");
        assert_eq!(
            spec["jobTemplate"]["spec"]["template"]["spec"]["containers"][0]["image"],
            "registry.example.com/svc1:1.2.3"
        );
    }

    #[test]
    fn test_cronjob_requires_schedule() {
        let err = cronjob_document(&intent()).unwrap_err();
        assert!(err.to_string().contains("schedule"));
    }

    #[test]
    fn test_workload_service_ports() {
        let doc = workload_service_document(&intent()).unwrap();
        let spec = doc.field("spec").unwrap();
        assert_eq!(spec["selector"]["app"], "svc1");
        assert_eq!(
            spec["ports"],
            json!([
                { "name": "http", "port": 8080, "targetPort": 8080 },
                { "name": "grpc", "port": 9090, "targetPort": 9090 }
            ])
        );
    }

    #[test]
    fn test_workload_service_skipped_without_ports() {
        let mut no_ports = intent();
        no_ports.containers[0].http = None;
        no_ports.containers[0].grpc = None;
        assert!(workload_service_document(&no_ports).is_none());
    }
}
