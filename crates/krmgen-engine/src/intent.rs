//! Typed intent documents.
//!
//! An intent is created once from the invocation's function-config (or an
//! in-snapshot intent document) and never mutated afterwards; derivation is
//! a pure function of (intent, facts).

use krmgen_core::{CoreError, Document, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One route spec inside a routing intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSpec {
    /// Match fragment, AND-joined onto the host expression
    #[serde(rename = "match")]
    pub match_fragment: String,
    /// Restricted-access routes get the configured middleware attached
    #[serde(default)]
    pub restricted: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub priority: Option<i64>,
}

/// Intent for the routing/exposure/certificate rule families
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingIntent {
    pub app: String,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub routes: Vec<RouteSpec>,
    #[serde(default)]
    pub grpc: bool,
}

impl RoutingIntent {
    /// Decode from the function-config document's `data` block
    pub fn from_function_config(doc: &Document) -> Result<Self> {
        let intent: RoutingIntent = doc.decode_field("data")?;
        intent.validate()?;
        Ok(intent)
    }

    fn validate(&self) -> Result<()> {
        if self.app.trim().is_empty() {
            return Err(CoreError::configuration("intent field `app` must not be empty"));
        }
        if self.domains.is_empty() {
            return Err(CoreError::configuration(
                "intent field `domains` must list at least one domain",
            ));
        }
        for route in &self.routes {
            if route.match_fragment.trim().is_empty() {
                return Err(CoreError::configuration(
                    "route match fragment must not be empty",
                ));
            }
        }
        Ok(())
    }
}

/// Named container port shorthand (`http:`/`grpc:` blocks)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
    pub port: i32,
}

/// Container spec with compose-style shorthand fields.
///
/// `configs`, `secrets`, `http` and `grpc` augment the container; every
/// other field passes through to the target container schema untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub configs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secrets: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<PortSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grpc: Option<PortSpec>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// Utilization target for cpu/memory autoscaler triggers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub target: String,
}

/// Queue-depth autoscaler trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSpec {
    pub name: String,
    pub size: String,
}

/// Scaling bounds and triggers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalingSpec {
    #[serde(rename = "minReplicas")]
    pub min_replicas: i32,
    #[serde(rename = "maxReplicas")]
    pub max_replicas: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<TargetSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<TargetSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue: Option<QueueSpec>,
}

/// Rollout strategy parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategySpec {
    #[serde(rename = "analysis-env")]
    pub analysis_env: String,
}

/// Intent for the workload rule family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadIntent {
    #[serde(rename = "part-of")]
    pub part_of: String,
    pub app: String,
    #[serde(default)]
    pub containers: Vec<ContainerSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaling: Option<ScalingSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StrategySpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
}

impl WorkloadIntent {
    /// Decode from an intent document's `spec` block
    pub fn from_document(doc: &Document) -> Result<Self> {
        let intent: WorkloadIntent = doc.decode_field("spec")?;
        intent.validate()?;
        Ok(intent)
    }

    fn validate(&self) -> Result<()> {
        if self.app.trim().is_empty() {
            return Err(CoreError::configuration("intent field `app` must not be empty"));
        }
        if self.part_of.trim().is_empty() {
            return Err(CoreError::configuration(
                "intent field `part-of` must not be empty",
            ));
        }
        if self.containers.is_empty() {
            return Err(CoreError::configuration(
                "intent must declare at least one container",
            ));
        }
        Ok(())
    }

    /// CronJob intents must carry a schedule; everything else ignores it
    pub fn require_schedule(&self) -> Result<&str> {
        match self.schedule.as_deref() {
            Some(s) if !s.trim().is_empty() => Ok(s),
            _ => Err(CoreError::configuration(
                "cron intent requires a non-empty `schedule`",
            )),
        }
    }
}
