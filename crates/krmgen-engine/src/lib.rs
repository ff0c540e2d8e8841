//! Synthesis and merge engine.
//!
//! Derivation is a pure function of (intent, facts, settings); the merge
//! layer reconciles the derived candidates into the existing document set
//! under one of two disciplines (additive or full-replace).

pub mod certificate;
pub mod exposure;
pub mod facts;
pub mod intent;
pub mod merge;
pub mod pipeline;
pub mod routing;
pub mod scaling;
pub mod settings;
pub mod workloads;

pub use facts::WorkloadFacts;
pub use intent::{RoutingIntent, WorkloadIntent};
pub use pipeline::{Engine, RunOutput};
pub use settings::GeneratorSettings;
