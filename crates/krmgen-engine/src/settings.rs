//! Environment literals the derivation rules depend on.
//!
//! Collected on one settings struct instead of compiled-in constants:
//! tests and other environments pass their own values, the defaults
//! carry the production ones.

use crate::routing::MiddlewareRef;
use krmgen_core::Document;
use serde::{Deserialize, Serialize};

/// (kind, apiVersion) discriminator for locating documents in the set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindMatcher {
    pub kind: String,
    #[serde(rename = "apiVersion")]
    pub api_version: String,
}

impl KindMatcher {
    pub fn new(kind: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            api_version: api_version.into(),
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        doc.matches(&self.kind, &self.api_version)
    }
}

/// Certificate issuer reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerRef {
    pub name: String,
    pub kind: String,
}

/// Fixed parameters of every derivation rule family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorSettings {
    /// Routing resource the additive merge targets and the networking run owns
    pub route_resource: KindMatcher,
    /// Workload document the fact extractor wires backends against
    pub workload: KindMatcher,
    /// Kind field stamped on every derived route entry
    pub route_entry_kind: String,
    /// External port every derived Service and backend reference exposes
    pub external_port: u16,
    /// Named container port conventions
    pub https_port_name: String,
    pub grpc_port_name: String,
    /// Middleware attached to restricted routes
    pub restricted_middleware: MiddlewareRef,
    /// Certificate issuer and apiVersion
    pub issuer: IssuerRef,
    pub certificate_api_version: String,
    /// Domain suffix for internal gRPC host rules
    pub internal_domain: String,
    /// Autoscaler trigger authentication reference
    pub scaler_auth_name: String,
    /// Rollout background analysis template
    pub analysis_template: String,
    /// Intent document kinds consumed by the workloads run
    pub deployment_intent_kind: String,
    pub job_intent_kind: String,
    pub cron_intent_kind: String,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            route_resource: KindMatcher::new("IngressRoute", "traefik.containo.us/v1alpha1"),
            workload: KindMatcher::new("Deployment", "apps/v1"),
            route_entry_kind: "Rule".to_string(),
            external_port: 80,
            https_port_name: "https".to_string(),
            grpc_port_name: "grpc".to_string(),
            restricted_middleware: MiddlewareRef {
                name: "vpn-only".to_string(),
                namespace: "traefik".to_string(),
            },
            issuer: IssuerRef {
                name: "letsencrypt".to_string(),
                kind: "ClusterIssuer".to_string(),
            },
            certificate_api_version: "cert-manager.io/v1".to_string(),
            internal_domain: "internal.cluster.local".to_string(),
            scaler_auth_name: "keda-trigger-auth-gcp-credentials".to_string(),
            analysis_template: "analysis-error-rate".to_string(),
            deployment_intent_kind: "AppDeployment".to_string(),
            job_intent_kind: "AppJob".to_string(),
            cron_intent_kind: "AppCronJob".to_string(),
        }
    }
}

impl GeneratorSettings {
    /// Kinds the networking run exclusively owns and wholesale-replaces
    pub fn owned_networking_kinds(&self) -> Vec<String> {
        vec![
            self.route_resource.kind.clone(),
            "Service".to_string(),
            "Certificate".to_string(),
        ]
    }

    /// Kinds the workloads run exclusively owns and wholesale-replaces
    pub fn owned_workload_kinds(&self) -> Vec<String> {
        vec![
            "Deployment".to_string(),
            "Rollout".to_string(),
            "Service".to_string(),
            "ScaledObject".to_string(),
            "Job".to_string(),
            "CronJob".to_string(),
        ]
    }

    pub fn is_workload_intent(&self, doc: &Document) -> bool {
        doc.kind == self.deployment_intent_kind
            || doc.kind == self.job_intent_kind
            || doc.kind == self.cron_intent_kind
    }
}
