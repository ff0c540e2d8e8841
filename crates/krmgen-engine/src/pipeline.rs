//! Pipeline orchestration: one synchronous batch transformation per run.
//!
//! Every run reads the whole document set as a frozen snapshot, derives
//! candidates as a pure function of (intent, facts, settings), merges, and
//! returns one fully computed replacement snapshot plus ordered records.
//! Any error aborts the run; no partial output is ever produced.

use crate::certificate::certificate_document;
use crate::exposure::service_document;
use crate::facts::WorkloadFacts;
use crate::intent::{RoutingIntent, WorkloadIntent};
use crate::merge::{full_replace, inject_route_entries};
use crate::routing::{derive_route_entries, grpc_route_document, http_route_document};
use crate::scaling::scaled_object_document;
use crate::settings::GeneratorSettings;
use crate::workloads::{
    ROLLOUT_API_VERSION, cronjob_document, deployment_document, job_document, rollout_document,
    workload_service_document,
};
use krmgen_core::{Document, DocumentKey, MergeRecord, Outcome, Reporter, Result};
use tracing::info;

/// The replacement snapshot and the ordered outcome records of one run
#[derive(Debug)]
pub struct RunOutput {
    pub documents: Vec<Document>,
    pub results: Vec<MergeRecord>,
}

/// The synthesis and merge engine shared by every generator family
#[derive(Debug, Clone, Default)]
pub struct Engine {
    settings: GeneratorSettings,
}

impl Engine {
    pub fn new(settings: GeneratorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Additive run: overlay derived route entries into every existing
    /// routing resource. Existing entries are never removed.
    pub fn inject_routes(
        &self,
        fn_config: &Document,
        documents: Vec<Document>,
    ) -> Result<RunOutput> {
        let intent = RoutingIntent::from_function_config(fn_config)?;
        let facts = WorkloadFacts::extract(&documents, &self.settings.workload)?;
        let candidates = derive_route_entries(&intent, &facts, &self.settings)?;

        let mut documents = documents;
        let mut reporter = Reporter::new();
        for doc in documents.iter_mut() {
            if !self.settings.route_resource.matches(doc) {
                continue;
            }
            let key = doc.key();
            for (match_key, outcome) in inject_route_entries(doc, &candidates)? {
                let message = match outcome {
                    Outcome::Created => format!("injected route `{match_key}` into {key}"),
                    Outcome::Updated => format!("updated route `{match_key}` in {key}"),
                    Outcome::Unchanged => format!("route `{match_key}` already present in {key}"),
                };
                reporter.record(outcome, key.clone(), message);
            }
        }

        info!(app = %intent.app, "route injection finished");
        Ok(RunOutput {
            documents,
            results: reporter.finish(),
        })
    }

    /// Full-replace run for the networking family: route resource(s),
    /// Service and Certificate are engine-owned and wholesale-replaced.
    pub fn synthesize_networking(
        &self,
        fn_config: &Document,
        documents: Vec<Document>,
    ) -> Result<RunOutput> {
        let intent = RoutingIntent::from_function_config(fn_config)?;
        let facts = WorkloadFacts::extract(&documents, &self.settings.workload)?;

        let mut candidates = vec![http_route_document(&intent, &facts, &self.settings)?];
        if intent.grpc {
            candidates.push(grpc_route_document(&intent, &facts, &self.settings)?);
        }
        candidates.push(service_document(&intent.app, &facts, &self.settings)?);
        candidates.push(certificate_document(&intent, &self.settings));

        info!(app = %intent.app, candidates = candidates.len(), "synthesized networking resources");

        let owned = self.settings.owned_networking_kinds();
        let (documents, outcomes) = full_replace(documents, &owned, candidates);
        Ok(RunOutput {
            documents,
            results: report_outcomes(outcomes),
        })
    }

    /// Full-replace run for the workload family: intent documents in the
    /// snapshot are consumed and replaced by the controllers, services and
    /// autoscalers they describe.
    pub fn synthesize_workloads(&self, documents: Vec<Document>) -> Result<RunOutput> {
        let mut rest = Vec::with_capacity(documents.len());
        let mut candidates = Vec::new();

        for doc in documents {
            if !self.settings.is_workload_intent(&doc) {
                rest.push(doc);
                continue;
            }
            let intent = WorkloadIntent::from_document(&doc)?;
            if doc.kind == self.settings.deployment_intent_kind {
                let target = match &intent.strategy {
                    Some(strategy) => {
                        candidates.push(rollout_document(&intent, strategy, &self.settings)?);
                        ("Rollout", ROLLOUT_API_VERSION)
                    }
                    None => {
                        candidates.push(deployment_document(&intent));
                        ("Deployment", "apps/v1")
                    }
                };
                if let Some(service) = workload_service_document(&intent) {
                    candidates.push(service);
                }
                if let Some(scaling) = &intent.scaling {
                    candidates.push(scaled_object_document(
                        &intent,
                        scaling,
                        target.0,
                        target.1,
                        &self.settings,
                    ));
                }
            } else if doc.kind == self.settings.job_intent_kind {
                candidates.push(job_document(&intent));
            } else {
                candidates.push(cronjob_document(&intent)?);
            }
        }

        // No intents means nothing to regenerate: the snapshot passes
        // through untouched, so a rerun over the run's own output keeps
        // the generation it produced.
        if candidates.is_empty() {
            return Ok(RunOutput {
                documents: rest,
                results: Reporter::new().finish(),
            });
        }

        info!(candidates = candidates.len(), "synthesized workload resources");

        let owned = self.settings.owned_workload_kinds();
        let (documents, outcomes) = full_replace(rest, &owned, candidates);
        Ok(RunOutput {
            documents,
            results: report_outcomes(outcomes),
        })
    }
}

fn report_outcomes(outcomes: Vec<(DocumentKey, Outcome)>) -> Vec<MergeRecord> {
    let mut reporter = Reporter::new();
    for (key, outcome) in outcomes {
        let message = match outcome {
            Outcome::Created => format!("created {key}"),
            Outcome::Updated => format!("updated {key}"),
            Outcome::Unchanged => format!("{key} unchanged"),
        };
        reporter.record(outcome, key, message);
    }
    reporter.finish()
}
