//! Certificate rule family.

use crate::intent::RoutingIntent;
use crate::settings::GeneratorSettings;
use krmgen_core::Document;
use serde_json::json;

/// One Certificate naming every intent domain, secret `<app>-cert`,
/// issuer reference from settings.
pub fn certificate_document(intent: &RoutingIntent, settings: &GeneratorSettings) -> Document {
    Document::new(
        &settings.certificate_api_version,
        "Certificate",
        &intent.app,
    )
    .with_body_field(
        "spec",
        json!({
            "secretName": format!("{}-cert", intent.app),
            "dnsNames": intent.domains,
            "issuerRef": {
                "name": settings.issuer.name,
                "kind": settings.issuer.kind
            }
        }),
    )
}
