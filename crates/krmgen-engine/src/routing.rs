//! Routing rule family: rendered match expressions and route resources.

use crate::facts::WorkloadFacts;
use crate::intent::RoutingIntent;
use crate::settings::GeneratorSettings;
use krmgen_core::{CoreError, Document, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Reference to a middleware attached to a route entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiddlewareRef {
    pub name: String,
    pub namespace: String,
}

/// Backend service reference inside a route entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteService {
    pub name: String,
    pub port: i64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub scheme: Option<String>,
    #[serde(
        rename = "passHostHeader",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub pass_host_header: Option<bool>,
}

/// One derived forwarding rule.
///
/// The rendered match expression doubles as the entry's natural key and
/// must stay unique within its parent route list after merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    #[serde(rename = "match")]
    pub match_expr: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub priority: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub middlewares: Vec<MiddlewareRef>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub services: Vec<RouteService>,
}

/// Render one match expression: OR-join of the domains, AND-joined with
/// the route's fragment. Domain order determines the OR-join order.
///
/// An empty fragment is rejected: it must never silently widen into a
/// wildcard route.
pub fn render_match(domains: &[String], fragment: &str) -> Result<String> {
    if fragment.trim().is_empty() {
        return Err(CoreError::configuration(
            "route match fragment must not be empty",
        ));
    }
    if domains.is_empty() {
        return Err(CoreError::configuration(
            "at least one domain is required to render a match expression",
        ));
    }
    let hosts: Vec<String> = domains.iter().map(|d| format!("Host(`{d}`)")).collect();
    Ok(format!("{} && {}", hosts.join(" || "), fragment))
}

/// Derive the ordered candidate route entries for a routing intent
pub fn derive_route_entries(
    intent: &RoutingIntent,
    facts: &WorkloadFacts,
    settings: &GeneratorSettings,
) -> Result<Vec<RouteEntry>> {
    intent
        .routes
        .iter()
        .map(|route| {
            let match_expr = render_match(&intent.domains, &route.match_fragment)?;
            let middlewares = if route.restricted {
                vec![settings.restricted_middleware.clone()]
            } else {
                Vec::new()
            };
            Ok(RouteEntry {
                match_expr,
                kind: settings.route_entry_kind.clone(),
                priority: route.priority,
                middlewares,
                services: vec![RouteService {
                    name: facts.container.clone(),
                    port: i64::from(settings.external_port),
                    scheme: None,
                    pass_host_header: None,
                }],
            })
        })
        .collect()
}

/// Synthesize the HTTP route resource owned by the networking run
pub fn http_route_document(
    intent: &RoutingIntent,
    facts: &WorkloadFacts,
    settings: &GeneratorSettings,
) -> Result<Document> {
    let entries = derive_route_entries(intent, facts, settings)?;
    let doc = Document::new(
        &settings.route_resource.api_version,
        &settings.route_resource.kind,
        &intent.app,
    )
    .with_body_field("spec", json!({ "routes": serde_json::to_value(entries)? }));
    Ok(doc)
}

/// Synthesize the internal gRPC route resource.
///
/// Requires the workload to expose the configured grpc named port.
pub fn grpc_route_document(
    intent: &RoutingIntent,
    facts: &WorkloadFacts,
    settings: &GeneratorSettings,
) -> Result<Document> {
    let grpc_port = facts.port(&settings.grpc_port_name).ok_or_else(|| {
        CoreError::configuration(format!(
            "grpc is enabled but the workload exposes no `{}` port",
            settings.grpc_port_name
        ))
    })?;

    let entry = RouteEntry {
        match_expr: format!("Host(`{}.{}`)", intent.app, settings.internal_domain),
        kind: settings.route_entry_kind.clone(),
        priority: None,
        middlewares: Vec::new(),
        services: vec![RouteService {
            name: facts.container.clone(),
            port: i64::from(grpc_port),
            scheme: Some("h2c".to_string()),
            pass_host_header: Some(true),
        }],
    };

    let doc = Document::new(
        &settings.route_resource.api_version,
        &settings.route_resource.kind,
        format!("{}-grpc", intent.app),
    )
    .with_body_field(
        "spec",
        json!({ "routes": serde_json::to_value(vec![entry])? }),
    );
    Ok(doc)
}
