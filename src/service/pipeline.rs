//! Assessment pipeline: profile, per-vendor dimension evaluation, aggregation
//!
//! Vendors are processed in submission order and dimensions in
//! [`Dimension::ALL`] order, one at a time, since every stage shares the same
//! search quota. Each stage is raced against the run's cancellation token.

use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex};

use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::db::{DbError, EvaluationStore};
use crate::model::{
    Dimension, Evaluation, EvaluationKind, EvaluationStatus, EventKind, PipelineEvent,
};
use crate::service::aggregation::{RecommendationService, composite_score};
use crate::service::dimension::DimensionEvaluator;
use crate::service::events::EventSender;
use crate::service::evidence::{EvidenceCollector, VendorRef};
use crate::service::llm::LlmClient;
use crate::service::profile::RequirementProfileService;

const STAGE_PROFILE: &str = "profile";
const STAGE_VENDOR: &str = "vendor";
const STAGE_AGGREGATION: &str = "aggregation";
const STAGE_WORKFLOW: &str = "workflow";

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Evaluation not found: {0}")]
    EvaluationNotFound(String),

    #[error("Evaluation {0} is not an assessment")]
    WrongEvaluationType(String),

    #[error("Evaluation {0} has no vendors")]
    NoVendors(String),

    #[error("Store error: {0}")]
    Store(#[from] DbError),

    #[error("Run cancelled")]
    Cancelled,
}

/// Evaluations with a run in progress in this process
#[derive(Debug, Clone, Default)]
pub struct RunRegistry {
    active: Arc<Mutex<HashSet<String>>>,
}

/// Held by a running task; frees the evaluation on drop
#[derive(Debug)]
pub struct RunSlot {
    id: String,
    active: Arc<Mutex<HashSet<String>>>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the evaluation, or `None` when a run is already active
    pub fn start(&self, evaluation_id: &str) -> Option<RunSlot> {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if !active.insert(evaluation_id.to_string()) {
            return None;
        }
        Some(RunSlot {
            id: evaluation_id.to_string(),
            active: Arc::clone(&self.active),
        })
    }
}

impl Drop for RunSlot {
    fn drop(&mut self) {
        if let Ok(mut active) = self.active.lock() {
            active.remove(&self.id);
        }
    }
}

pub struct AssessmentPipeline {
    store: Arc<dyn EvaluationStore>,
    profiles: RequirementProfileService,
    evaluators: Vec<DimensionEvaluator>,
    recommendations: RecommendationService,
}

/// Race a stage against cancellation
async fn until_cancelled<F: Future>(
    cancel: &CancellationToken,
    stage: F,
) -> Result<F::Output, PipelineError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(PipelineError::Cancelled),
        output = stage => Ok(output),
    }
}

impl AssessmentPipeline {
    pub fn new(
        store: Arc<dyn EvaluationStore>,
        collector: Arc<EvidenceCollector>,
        llm: LlmClient,
    ) -> Self {
        Self {
            store,
            profiles: RequirementProfileService::new(llm.clone()),
            evaluators: DimensionEvaluator::all(collector, llm.clone()),
            recommendations: RecommendationService::new(llm),
        }
    }

    /// Run the assessment to completion, cancellation or failure. Exactly one
    /// terminal event is emitted and the stored status reflects the outcome.
    pub async fn run(
        &self,
        evaluation_id: &str,
        events: EventSender,
        cancel: CancellationToken,
    ) -> Result<Evaluation, PipelineError> {
        let start_time = std::time::Instant::now();
        let result = self.execute(evaluation_id, &events, &cancel).await;

        match &result {
            Ok(evaluation) => {
                let recommended = evaluation
                    .recommendation
                    .as_ref()
                    .map(|r| r.recommended_vendor_id.clone())
                    .unwrap_or_default();
                let refused = evaluation
                    .recommendation
                    .as_ref()
                    .is_none_or(|r| r.is_refusal());

                tracing::info!(
                    evaluation_id = %evaluation_id,
                    vendors = evaluation.vendors.len(),
                    recommended = %recommended,
                    refused,
                    elapsed_ms = start_time.elapsed().as_millis() as u64,
                    "Assessment completed"
                );

                events
                    .emit_terminal(
                        PipelineEvent::new(
                            EventKind::WorkflowComplete,
                            STAGE_WORKFLOW,
                            "Assessment completed",
                        )
                        .with_data(json!({
                            "evaluation_id": evaluation_id,
                            "recommended_vendor_id": recommended,
                        })),
                    )
                    .await;
            }
            Err(e) => {
                let status = match e {
                    PipelineError::Cancelled => EvaluationStatus::Cancelled,
                    _ => EvaluationStatus::Failed,
                };

                match e {
                    PipelineError::Cancelled => tracing::info!(
                        evaluation_id = %evaluation_id,
                        elapsed_ms = start_time.elapsed().as_millis() as u64,
                        "Assessment cancelled"
                    ),
                    _ => tracing::error!(
                        evaluation_id = %evaluation_id,
                        error = %e,
                        "Assessment failed"
                    ),
                }

                if !matches!(e, PipelineError::EvaluationNotFound(_))
                    && let Err(db_err) = self
                        .store
                        .update_status(evaluation_id, status, Some(&e.to_string()))
                        .await
                {
                    tracing::error!(
                        evaluation_id = %evaluation_id,
                        error = %db_err,
                        "Failed to record assessment outcome"
                    );
                }

                events
                    .emit_terminal(
                        PipelineEvent::new(EventKind::WorkflowError, STAGE_WORKFLOW, e.to_string())
                            .with_data(json!({
                                "evaluation_id": evaluation_id,
                                "status": status,
                            })),
                    )
                    .await;
            }
        }

        result
    }

    async fn execute(
        &self,
        evaluation_id: &str,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<Evaluation, PipelineError> {
        let mut evaluation = self.store.get(evaluation_id).await.map_err(|e| match e {
            DbError::NotFound(id) => PipelineError::EvaluationNotFound(id),
            e => PipelineError::Store(e),
        })?;

        if evaluation.kind != EvaluationKind::Assessment {
            return Err(PipelineError::WrongEvaluationType(evaluation.id));
        }
        if evaluation.vendors.is_empty() {
            return Err(PipelineError::NoVendors(evaluation.id));
        }
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        evaluation.status = EvaluationStatus::Running;
        evaluation.error = None;
        evaluation.updated_at = chrono::Utc::now();
        self.store.save(&evaluation).await?;

        // Requirement profile
        events.emit(PipelineEvent::new(
            EventKind::StageStart,
            STAGE_PROFILE,
            "Building requirement profile",
        ));
        let mut profile =
            until_cancelled(cancel, self.profiles.build(&evaluation.use_case)).await?;
        if let Some(weights) = evaluation.weights {
            profile.dimension_importance = weights.clamped();
        }
        events.emit(
            PipelineEvent::new(EventKind::StageComplete, STAGE_PROFILE, "Requirement profile ready")
                .with_data(serde_json::to_value(&profile).unwrap_or_default()),
        );

        // Vendors, one dimension at a time
        for vendor in evaluation.vendors.iter_mut() {
            events.emit(
                PipelineEvent::new(
                    EventKind::StageStart,
                    STAGE_VENDOR,
                    format!("Evaluating {}", vendor.name),
                )
                .with_vendor(vendor.name.as_str()),
            );

            let vendor_ref = VendorRef {
                name: &vendor.name,
                website: vendor.website.as_deref(),
            };

            let mut outputs = BTreeMap::new();
            for evaluator in &self.evaluators {
                let dimension: Dimension = evaluator.dimension();
                let stage = format!("dimension:{}", dimension);

                events.emit(
                    PipelineEvent::new(
                        EventKind::StageStart,
                        stage.as_str(),
                        format!("Evaluating {}", dimension.label()),
                    )
                    .with_vendor(vendor_ref.name)
                    .with_dimension(dimension),
                );

                let output =
                    until_cancelled(cancel, evaluator.evaluate(vendor_ref, &profile, events))
                        .await?;

                events.emit(
                    PipelineEvent::new(
                        EventKind::StageComplete,
                        stage.as_str(),
                        format!("{}: {}", dimension.label(), output.status.label()),
                    )
                    .with_vendor(vendor_ref.name)
                    .with_dimension(dimension)
                    .with_data(json!({
                        "status": output.status,
                        "score": output.score,
                        "confidence": output.confidence,
                        "sources": output.sources.len(),
                    })),
                );

                outputs.insert(dimension, output);
            }

            vendor.dimension_outputs = outputs;
            vendor.total_score =
                composite_score(&vendor.dimension_outputs, &profile.dimension_importance);

            events.emit(
                PipelineEvent::new(
                    EventKind::StageComplete,
                    STAGE_VENDOR,
                    format!("Finished {}", vendor.name),
                )
                .with_vendor(vendor.name.as_str())
                .with_data(json!({ "total_score": vendor.total_score })),
            );
        }

        // Aggregation
        events.emit(PipelineEvent::new(
            EventKind::StageStart,
            STAGE_AGGREGATION,
            "Comparing vendors",
        ));
        let recommendation = until_cancelled(
            cancel,
            self.recommendations
                .recommend(&evaluation.vendors, &profile, &evaluation.use_case),
        )
        .await?;
        events.emit(
            PipelineEvent::new(
                EventKind::StageComplete,
                STAGE_AGGREGATION,
                recommendation.short_reason.as_str(),
            )
            .with_data(json!({ "recommended_vendor_id": recommendation.recommended_vendor_id })),
        );

        // Decisions recorded while the run was in progress win over the copy
        // loaded at start
        let latest = self.store.get(evaluation_id).await?;
        for vendor in evaluation.vendors.iter_mut() {
            if let Some(current) = latest.vendors.iter().find(|v| v.id == vendor.id) {
                vendor.decision = current.decision;
            }
        }

        // Persisted even when the observer has gone
        evaluation.requirement_profile = Some(profile);
        evaluation.recommendation = Some(recommendation);
        evaluation.status = EvaluationStatus::Completed;
        evaluation.updated_at = chrono::Utc::now();
        self.store.save(&evaluation).await?;

        Ok(evaluation)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::db::InMemoryEvaluationStore;
    use crate::model::{
        Confidence, DimensionImportance, DimensionStatus, VendorDecision, VendorEvaluation,
    };
    use crate::service::events::event_channel;
    use crate::service::evidence::EvidenceConfig;
    use crate::service::evidence::testing::{StaticPageFetcher, StaticSearchProvider, long_text};
    use crate::service::llm::LlmError;
    use crate::service::llm::testing::{ScriptedChatModel, client};
    use crate::service::search::ThrottledSearchCache;

    const INTEROP_JSON: &str = r#"{
        "sso": ["Supports SAML SSO"],
        "apis": ["Provides a REST API"],
        "webhooks": ["Supports webhooks"],
        "integrations": ["Slack integration available"]
    }"#;
    const COST_JSON: &str = r#"{
        "pricing": ["Provides per-user pricing at $12 per user per month"],
        "implementation_costs": ["Implementation fees not published"],
        "support_costs": ["Premium support available"]
    }"#;
    const ADOPTION_JSON: &str = r#"{
        "support_channels": ["24/7 support available"],
        "onboarding": ["Provides guided onboarding"],
        "training": ["Provides training courses"],
        "sla": ["Supports a 99.9% uptime SLA"]
    }"#;
    const STRONG_COMPLIANCE_JSON: &str = r#"{
        "certifications": ["SOC 2 Type II certified"],
        "privacy": ["GDPR compliant"],
        "data_handling": ["Provides encryption at rest"],
        "security_features": ["Supports SAML SSO"]
    }"#;
    const WEAK_COMPLIANCE_JSON: &str = r#"{
        "certifications": ["No public SOC 2 report"],
        "privacy": ["GDPR status unclear"],
        "data_handling": ["Encryption details not documented"],
        "security_features": ["Supports SSO"]
    }"#;

    /// Routes on the "Vendor:" and "Dimension:" lines of findings prompts;
    /// every other call (profile, comparison) fails
    fn routed_model() -> Arc<ScriptedChatModel> {
        ScriptedChatModel::new(|request| {
            let prompt = request.user_prompt();
            let answer = if prompt.contains("Dimension: interoperability") {
                INTEROP_JSON
            } else if prompt.contains("Dimension: cost") {
                COST_JSON
            } else if prompt.contains("Dimension: adoption") {
                ADOPTION_JSON
            } else if prompt.contains("Vendor: Acme Cloud\nDimension: compliance") {
                STRONG_COMPLIANCE_JSON
            } else if prompt.contains("Vendor: Globex\nDimension: compliance") {
                WEAK_COMPLIANCE_JSON
            } else {
                return Err(LlmError::EmptyResponse);
            };
            Ok(answer.to_string())
        })
    }

    fn pipeline(
        store: Arc<InMemoryEvaluationStore>,
        search: StaticSearchProvider,
        fetcher: StaticPageFetcher,
        model: Arc<ScriptedChatModel>,
    ) -> AssessmentPipeline {
        let cache = Arc::new(ThrottledSearchCache::new(Arc::new(search), Duration::ZERO));
        let collector = Arc::new(EvidenceCollector::new(
            cache,
            Arc::new(fetcher),
            EvidenceConfig::default(),
        ));
        AssessmentPipeline::new(store, collector, client(model))
    }

    async fn stored(store: &InMemoryEvaluationStore, vendors: Vec<VendorEvaluation>) -> Evaluation {
        let evaluation = Evaluation::new(
            EvaluationKind::Assessment,
            "Team chat",
            "Team chat for 300 users",
            vendors,
            None,
        );
        store.create(&evaluation).await.unwrap();
        evaluation
    }

    async fn drain(mut rx: crate::service::events::EventReceiver) -> Vec<PipelineEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_single_vendor_without_compliance_evidence() {
        let store = Arc::new(InMemoryEvaluationStore::new());
        let search = StaticSearchProvider::default()
            .rule(&["site:acme.com", "soc2"], &["https://acme.com/trust"])
            .rule(&["site:acme.com", "webhooks"], &["https://acme.com/developers"])
            .rule(&["site:acme.com", "pricing"], &["https://acme.com/pricing"])
            .rule(&["site:acme.com", "onboarding"], &["https://acme.com/support"]);
        // The trust page is unreachable
        let fetcher = StaticPageFetcher::default()
            .page("https://acme.com/developers", &long_text("REST API and webhooks."))
            .page("https://acme.com/pricing", &long_text("Pro plan $12 per user per month."))
            .page("https://acme.com/support", &long_text("Onboarding and 24/7 support."));
        let pipeline = pipeline(store.clone(), search, fetcher, routed_model());
        let evaluation = stored(
            &store,
            vec![VendorEvaluation::new("Acme Cloud", Some("https://www.acme.com".into()))],
        )
        .await;

        let (tx, rx) = event_channel(256);
        let result = pipeline
            .run(&evaluation.id, tx, CancellationToken::new())
            .await
            .unwrap();

        let vendor = &result.vendors[0];
        let compliance = vendor.output(Dimension::Compliance).unwrap();
        assert_eq!(compliance.status, DimensionStatus::InsufficientData);
        assert_eq!(compliance.score, None);
        assert_eq!(compliance.confidence, Confidence::Low);
        assert!(!compliance.notes.is_empty());

        assert_eq!(vendor.output(Dimension::Interoperability).unwrap().score, Some(5.0));
        assert_eq!(vendor.output(Dimension::Cost).unwrap().score, Some(3.5));
        assert_eq!(vendor.output(Dimension::Adoption).unwrap().score, Some(5.0));
        assert_eq!(vendor.total_score, Some(4.5));

        let tco = vendor
            .output(Dimension::Cost)
            .and_then(|o| o.cost_estimate.clone())
            .unwrap();
        assert_eq!(tco.users, 300);
        assert_eq!(tco.per_user_monthly, 12.0);

        let recommendation = result.recommendation.as_ref().unwrap();
        assert!(recommendation.is_refusal());
        assert!(recommendation.short_reason.contains("No vendor can be safely recommended"));

        let persisted = store.get(&evaluation.id).await.unwrap();
        assert_eq!(persisted.status, EvaluationStatus::Completed);
        assert_eq!(persisted, result);

        let events = drain(rx).await;
        assert_eq!(events.first().map(|e| e.kind), Some(EventKind::StageStart));
        assert_eq!(events.last().map(|e| e.kind), Some(EventKind::WorkflowComplete));
        assert_eq!(events.iter().filter(|e| e.kind.is_terminal()).count(), 1);
    }

    #[tokio::test]
    async fn test_two_vendors_recommends_verified_one() {
        let store = Arc::new(InMemoryEvaluationStore::new());
        let search = StaticSearchProvider::default()
            .rule(
                &["site:acme.com", "soc2"],
                &["https://acme.com/trust", "https://acme.com/security"],
            )
            .rule(&["site:globex.io", "soc2"], &["https://globex.io/security"]);
        let fetcher = StaticPageFetcher::default()
            .page("https://acme.com/trust", &long_text("SOC 2 Type II report."))
            .page("https://acme.com/security", &long_text("Encryption and SSO."))
            .page("https://globex.io/security", &long_text("Security overview."));
        let pipeline = pipeline(store.clone(), search, fetcher, routed_model());

        let acme = VendorEvaluation::new("Acme Cloud", Some("https://acme.com".into()));
        let globex = VendorEvaluation::new("Globex", Some("https://globex.io".into()));
        let evaluation = stored(&store, vec![globex.clone(), acme.clone()]).await;

        let result = pipeline
            .run(&evaluation.id, EventSender::disabled(), CancellationToken::new())
            .await
            .unwrap();

        let acme_compliance = result.vendors[1].output(Dimension::Compliance).unwrap();
        assert_eq!(acme_compliance.status, DimensionStatus::Ok);
        assert_eq!(acme_compliance.score, Some(5.0));

        let globex_compliance = result.vendors[0].output(Dimension::Compliance).unwrap();
        assert_eq!(globex_compliance.status, DimensionStatus::Risk);
        assert_eq!(globex_compliance.score, Some(1.5));

        let recommendation = result.recommendation.unwrap();
        assert_eq!(recommendation.recommended_vendor_id, acme.id);
        assert!(recommendation.short_reason.starts_with("Acme Cloud ranks first"));
        assert_eq!(recommendation.ranking[1].vendor_id, globex.id);
    }

    #[tokio::test]
    async fn test_weights_override_inferred_importance() {
        let store = Arc::new(InMemoryEvaluationStore::new());
        let pipeline = pipeline(
            store.clone(),
            StaticSearchProvider::default(),
            StaticPageFetcher::default(),
            routed_model(),
        );
        let weights = DimensionImportance {
            compliance: 1,
            interoperability: 2,
            cost: 5,
            adoption: 0,
        };
        let evaluation = Evaluation::new(
            EvaluationKind::Assessment,
            "CRM",
            "Regulated bank CRM",
            vec![VendorEvaluation::new("Acme Cloud", None)],
            Some(weights),
        );
        store.create(&evaluation).await.unwrap();

        let result = pipeline
            .run(&evaluation.id, EventSender::disabled(), CancellationToken::new())
            .await
            .unwrap();

        let profile = result.requirement_profile.unwrap();
        assert_eq!(profile.dimension_importance, weights);
        assert_eq!(result.vendors[0].total_score, None);
    }

    #[tokio::test]
    async fn test_input_errors_fail_the_evaluation() {
        let store = Arc::new(InMemoryEvaluationStore::new());
        let pipeline = pipeline(
            store.clone(),
            StaticSearchProvider::default(),
            StaticPageFetcher::default(),
            routed_model(),
        );

        let missing = pipeline
            .run("missing", EventSender::disabled(), CancellationToken::new())
            .await;
        assert!(matches!(missing, Err(PipelineError::EvaluationNotFound(_))));

        let empty = stored(&store, vec![]).await;
        let (tx, rx) = event_channel(8);
        let result = pipeline.run(&empty.id, tx, CancellationToken::new()).await;
        assert!(matches!(result, Err(PipelineError::NoVendors(_))));

        let persisted = store.get(&empty.id).await.unwrap();
        assert_eq!(persisted.status, EvaluationStatus::Failed);
        assert!(persisted.error.unwrap().contains("has no vendors"));

        let events = drain(rx).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::WorkflowError);

        let application = Evaluation::new(
            EvaluationKind::Application,
            "Onboard Acme",
            "",
            vec![VendorEvaluation::new("Acme", None)],
            None,
        );
        store.create(&application).await.unwrap();
        let result = pipeline
            .run(&application.id, EventSender::disabled(), CancellationToken::new())
            .await;
        assert!(matches!(result, Err(PipelineError::WrongEvaluationType(_))));
    }

    #[tokio::test]
    async fn test_cancellation_discards_partial_results() {
        let store = Arc::new(InMemoryEvaluationStore::new());
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        // The first model call (profile extraction) cancels the run
        let model = ScriptedChatModel::new(move |_| {
            trigger.cancel();
            Err(LlmError::EmptyResponse)
        });
        let pipeline = pipeline(
            store.clone(),
            StaticSearchProvider::default(),
            StaticPageFetcher::default(),
            model,
        );
        let evaluation = stored(&store, vec![VendorEvaluation::new("Acme Cloud", None)]).await;

        let (tx, rx) = event_channel(64);
        let result = pipeline.run(&evaluation.id, tx, cancel).await;
        assert!(matches!(result, Err(PipelineError::Cancelled)));

        let persisted = store.get(&evaluation.id).await.unwrap();
        assert_eq!(persisted.status, EvaluationStatus::Cancelled);
        assert!(persisted.vendors[0].dimension_outputs.is_empty());
        assert!(persisted.recommendation.is_none());

        let events = drain(rx).await;
        assert_eq!(events.last().map(|e| e.kind), Some(EventKind::WorkflowError));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_decision_recorded_mid_run_survives() {
        let store = Arc::new(InMemoryEvaluationStore::new());
        let evaluation = stored(&store, vec![VendorEvaluation::new("Acme Cloud", None)]).await;
        let vendor_id = evaluation.vendors[0].id.clone();

        // The profile call is the first model call; a reviewer approves the
        // vendor through the store while it is in flight
        let decided = std::sync::Once::new();
        let writer = store.clone();
        let (eval_id, decided_vendor) = (evaluation.id.clone(), vendor_id.clone());
        let model = ScriptedChatModel::new(move |_| {
            decided.call_once(|| {
                tokio::task::block_in_place(|| {
                    tokio::runtime::Handle::current().block_on(async {
                        let mut current = writer.get(&eval_id).await.unwrap();
                        let vendor = current
                            .vendors
                            .iter_mut()
                            .find(|v| v.id == decided_vendor)
                            .unwrap();
                        vendor.decision = VendorDecision::Approved;
                        writer.save(&current).await.unwrap();
                    })
                })
            });
            Err(LlmError::EmptyResponse)
        });
        let pipeline = pipeline(
            store.clone(),
            StaticSearchProvider::default(),
            StaticPageFetcher::default(),
            model,
        );

        // On a worker thread, where the model may block in place
        let id = evaluation.id.clone();
        let result = tokio::spawn(async move {
            pipeline
                .run(&id, EventSender::disabled(), CancellationToken::new())
                .await
        })
        .await
        .unwrap()
        .unwrap();
        assert_eq!(result.vendors[0].decision, VendorDecision::Approved);

        let persisted = store.get(&evaluation.id).await.unwrap();
        assert_eq!(persisted.status, EvaluationStatus::Completed);
        assert_eq!(persisted.vendors[0].decision, VendorDecision::Approved);
        assert!(persisted.recommendation.is_some());
    }

    #[test]
    fn test_run_registry_rejects_second_run() {
        let registry = RunRegistry::new();
        let slot = registry.start("eval-1").unwrap();
        assert!(registry.start("eval-1").is_none());
        assert!(registry.start("eval-2").is_some());

        drop(slot);
        assert!(registry.start("eval-1").is_some());
    }
}
