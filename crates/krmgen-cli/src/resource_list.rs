//! The ResourceList wire format: the envelope every invocation reads and
//! writes.
//!
//! YAML only appears here at the process boundary. Input is bridged
//! through a generic JSON tree before typed decoding so flattened
//! envelope fields behave the same in both directions.

use anyhow::{Context, Result, bail};
use krmgen_core::{Document, MergeRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Read;
use std::path::Path;

pub const RESOURCE_LIST_API_VERSION: &str = "config.kubernetes.io/v1";
pub const RESOURCE_LIST_KIND: &str = "ResourceList";

#[derive(Debug, Serialize, Deserialize)]
pub struct ResourceList {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub items: Vec<Document>,
    #[serde(
        rename = "functionConfig",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub function_config: Option<Document>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub results: Vec<MergeRecord>,
}

impl ResourceList {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let yaml: serde_yaml::Value = serde_yaml::from_str(text).context("invalid YAML input")?;
        let json: Value =
            serde_json::to_value(yaml).context("input is not a JSON-compatible document")?;
        let list: ResourceList =
            serde_json::from_value(json).context("input is not a ResourceList")?;
        if list.kind != RESOURCE_LIST_KIND {
            bail!("expected kind {RESOURCE_LIST_KIND}, got {}", list.kind);
        }
        Ok(list)
    }

    pub fn to_yaml(&self) -> Result<String> {
        let json = serde_json::to_value(self).context("failed to serialize ResourceList")?;
        serde_yaml::to_string(&json).context("failed to render ResourceList as YAML")
    }

    pub fn require_function_config(&self) -> Result<&Document> {
        self.function_config
            .as_ref()
            .context("ResourceList carries no functionConfig")
    }
}

pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p)
            .with_context(|| format!("failed to read {}", p.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

pub fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(p) => std::fs::write(p, text)
            .with_context(|| format!("failed to write {}", p.display())),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}
