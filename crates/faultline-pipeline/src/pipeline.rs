//! ErrorPipeline: owns the components and runs ingestion through them.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use faultline_buffer::{BufferManager, BufferStats, SearchCriteria};
use faultline_classification::{ClassificationService, ClassificationStats};
use faultline_core::errors::{ClassificationError, FaultlineError, FaultlineResult};
use faultline_core::traits::{IAlertChannel, IBatchSink, IContextSupplier};
use faultline_core::{time, ErrorEvent, ErrorInput, ExecutionContext, FaultlineConfig, Severity};
use faultline_learning::{KnowledgeBase, LearningStats, LearningSystem, Recommendation};
use faultline_patterns::{AnalysisStats, Anomaly, Pattern, PatternAnalyzer, TrendReport};
use faultline_prediction::{Prediction, PredictionEngine, PredictionStats, TracingAlertChannel};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::context::SystemContextSupplier;
use crate::notifications::PipelineEvent;
use crate::report::{IngestReport, PipelineStats};
use crate::scheduler::{self, SchedulerHandle};

/// Lock a component, recovering the guard if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn get_mut<T>(mutex: &mut Mutex<T>) -> &mut T {
    mutex.get_mut().unwrap_or_else(PoisonError::into_inner)
}

/// The error observability pipeline.
///
/// Each component sits behind its own mutex. Ingestion takes them one at a time
/// in the order classifier, buffer, prediction, analyzer, learning, prediction,
/// never holding two at once.
pub struct ErrorPipeline {
    config: FaultlineConfig,
    classifier: Mutex<ClassificationService>,
    buffer: Mutex<BufferManager>,
    analyzer: Mutex<PatternAnalyzer>,
    learning: Mutex<LearningSystem>,
    prediction: Mutex<PredictionEngine>,
    context: Arc<dyn IContextSupplier>,
    events: broadcast::Sender<PipelineEvent>,
}

impl ErrorPipeline {
    /// A memory-only pipeline: no log files, no state file.
    pub fn new(config: FaultlineConfig) -> Self {
        let buffer = BufferManager::new(config.buffer.clone());
        Self::with_buffer(config, buffer)
    }

    /// A pipeline with file logging and persisted state per `config.buffer`.
    pub fn open(config: FaultlineConfig) -> Self {
        let buffer = BufferManager::open(config.buffer.clone());
        Self::with_buffer(config, buffer)
    }

    fn with_buffer(config: FaultlineConfig, buffer: BufferManager) -> Self {
        let (events, _) = broadcast::channel(config.observability.event_channel_capacity.max(1));
        let mut prediction = PredictionEngine::new(config.prediction.clone());
        prediction.add_channel(Arc::new(TracingAlertChannel));
        Self {
            classifier: Mutex::new(ClassificationService::new(config.classification.clone())),
            buffer: Mutex::new(buffer),
            analyzer: Mutex::new(PatternAnalyzer::new(config.analysis.clone())),
            learning: Mutex::new(LearningSystem::new(config.learning.clone())),
            prediction: Mutex::new(prediction),
            context: Arc::new(SystemContextSupplier::new()),
            events,
            config,
        }
    }

    pub fn with_context_supplier(mut self, supplier: Arc<dyn IContextSupplier>) -> Self {
        self.context = supplier;
        self
    }

    /// Add an alert channel next to the default `TracingAlertChannel`.
    pub fn with_alert_channel(mut self, channel: Arc<dyn IAlertChannel>) -> Self {
        get_mut(&mut self.prediction).add_channel(channel);
        self
    }

    pub fn with_batch_sink(mut self, sink: Arc<dyn IBatchSink>) -> Self {
        get_mut(&mut self.buffer).set_sink(sink);
        self
    }

    pub fn config(&self) -> &FaultlineConfig {
        &self.config
    }

    /// Receive typed notifications. Slow receivers lag and skip ahead.
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.events.subscribe()
    }

    fn notify(&self, event: PipelineEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }

    // ── Ingestion ─────────────────────────────────────────────────────────

    /// Submit a raw error. Returns `false` if it could not be recorded.
    pub fn add_error(&self, input: ErrorInput) -> bool {
        match self.submit(input) {
            Ok(_) => true,
            Err(FaultlineError::Classification(ClassificationError::DuplicateSuppressed {
                content_hash,
            })) => {
                debug!(%content_hash, "duplicate suppressed");
                false
            }
            Err(e) => {
                warn!(error = %e, "error ingestion failed");
                false
            }
        }
    }

    /// Submit a raw error and report what it produced.
    pub fn submit(&self, input: ErrorInput) -> FaultlineResult<IngestReport> {
        self.submit_with_context(input, ExecutionContext::default())
    }

    /// Submit a raw error together with the caller's execution context, such as
    /// the outcome of a recovery attempt for this error. Fields left unset are
    /// filled from the pipeline's context supplier.
    ///
    /// With `classification.suppress_duplicates` set, a duplicate is dropped before
    /// buffering and `ClassificationError::DuplicateSuppressed` is returned.
    pub fn submit_with_context(
        &self,
        input: ErrorInput,
        context: ExecutionContext,
    ) -> FaultlineResult<IngestReport> {
        let span = crate::ingest_span!(input.resolved_module(), input.severity);
        let _entered = span.enter();

        let classification = lock(&self.classifier).classify_input(&input, time::now_ms());
        if classification.duplicate && self.config.classification.suppress_duplicates {
            self.notify(PipelineEvent::Suppressed {
                module: input.resolved_module(),
                content_hash: classification.content_hash.clone(),
            });
            return Err(ClassificationError::DuplicateSuppressed {
                content_hash: classification.content_hash,
            }
            .into());
        }
        let record = classification.apply(&input);
        let event = lock(&self.buffer).ingest(record)?;

        self.notify(PipelineEvent::Ingested {
            id: event.id.clone(),
            module: event.module.clone(),
            severity: event.severity,
            category: event.category().to_string(),
        });
        if classification.duplicate {
            self.notify(PipelineEvent::Duplicate {
                id: event.id.clone(),
                module: event.module.clone(),
            });
        }

        let resolved = lock(&self.prediction).verify_predictions(&event);
        for prediction in &resolved {
            self.notify(PipelineEvent::PredictionResolved {
                prediction: prediction.clone(),
            });
        }

        let outcome = lock(&self.analyzer).process_event(&event);

        let context = context.merged_over(self.context.capture());
        lock(&self.learning).learn_from_error(&event, &context);

        let generated = lock(&self.prediction).process_event(&event);
        for prediction in &generated.predictions {
            if prediction.reinforcements == 0 && prediction.trigger_id == event.id {
                self.notify(PipelineEvent::PredictionCreated {
                    prediction: prediction.clone(),
                });
            }
        }
        for alert in &generated.alerts {
            self.notify(PipelineEvent::AlertRaised {
                alert: alert.clone(),
            });
        }

        debug!(
            id = %event.id,
            patterns = outcome.patterns.len(),
            predictions = generated.predictions.len(),
            "error processed"
        );
        Ok(IngestReport {
            event,
            classification,
            patterns: outcome.patterns,
            resolved,
            predictions: generated.predictions,
            alerts: generated.alerts,
        })
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn search(&self, criteria: &SearchCriteria) -> Vec<Arc<ErrorEvent>> {
        lock(&self.buffer).search(criteria)
    }

    pub fn recent_errors(&self, limit: usize) -> Vec<Arc<ErrorEvent>> {
        lock(&self.buffer).recent_errors(limit)
    }

    pub fn critical_errors(&self, limit: usize) -> Vec<Arc<ErrorEvent>> {
        lock(&self.buffer).critical_errors(limit)
    }

    pub fn errors_by_module(&self, module: &str, limit: usize) -> Vec<Arc<ErrorEvent>> {
        lock(&self.buffer).errors_by_module(module, limit)
    }

    pub fn errors_by_severity(&self, severity: Severity, limit: usize) -> Vec<Arc<ErrorEvent>> {
        lock(&self.buffer).errors_by_severity(severity, limit)
    }

    pub fn errors_by_category(&self, category: &str, limit: usize) -> Vec<Arc<ErrorEvent>> {
        lock(&self.buffer).errors_by_category(category, limit)
    }

    pub fn stats(&self) -> BufferStats {
        lock(&self.buffer).stats()
    }

    pub fn classification_stats(&self) -> ClassificationStats {
        lock(&self.classifier).stats()
    }

    pub fn analysis_stats(&self) -> AnalysisStats {
        lock(&self.analyzer).stats()
    }

    pub fn learning_stats(&self) -> LearningStats {
        lock(&self.learning).stats()
    }

    pub fn prediction_stats(&self) -> PredictionStats {
        lock(&self.prediction).stats()
    }

    pub fn pipeline_stats(&self) -> PipelineStats {
        PipelineStats {
            buffer: self.stats(),
            classification: self.classification_stats(),
            analysis: self.analysis_stats(),
            learning: self.learning_stats(),
            prediction: self.prediction_stats(),
        }
    }

    pub fn recommendations(&self, event: &ErrorEvent) -> Vec<Recommendation> {
        let context = self.context.capture();
        lock(&self.learning).recommendations_with_context(event, &context)
    }

    pub fn knowledge_base(&self) -> KnowledgeBase {
        lock(&self.learning).knowledge_base()
    }

    pub fn patterns(&self) -> Vec<Pattern> {
        lock(&self.analyzer).patterns().into_iter().cloned().collect()
    }

    pub fn anomalies(&self) -> Vec<Anomaly> {
        lock(&self.analyzer).anomalies()
    }

    pub fn last_trends(&self) -> Option<TrendReport> {
        lock(&self.analyzer).last_trends().cloned()
    }

    pub fn active_predictions(&self) -> Vec<Prediction> {
        lock(&self.prediction).active_predictions().to_vec()
    }

    // ── Periodic jobs ─────────────────────────────────────────────────────

    /// Hand pending temporal events to the batch sink.
    pub fn flush_temporal(&self) -> usize {
        lock(&self.buffer).flush_temporal()
    }

    pub fn persist(&self) -> FaultlineResult<()> {
        lock(&self.buffer).persist()
    }

    /// Rotate oversized log streams, announcing every archive.
    pub fn check_rotation(&self) -> Vec<PathBuf> {
        let archived = lock(&self.buffer).check_rotation();
        for archive in &archived {
            self.notify(PipelineEvent::LogRotated {
                archive: archive.clone(),
            });
        }
        archived
    }

    /// Index rebuild, recent-buffer pruning and analysis/learning cleanup.
    pub fn maintenance(&self, now: i64) {
        {
            let mut buffer = lock(&self.buffer);
            buffer.rebuild_indexes();
            buffer.prune_recent(now);
        }
        lock(&self.analyzer).cleanup(now);
        lock(&self.learning).cleanup(now);
    }

    /// Trend analysis and anomaly detection. Returns the anomalies found.
    pub fn run_analysis(&self, now: i64) -> Vec<Anomaly> {
        let span = crate::analysis_span!(now);
        let _entered = span.enter();

        let mut analyzer = lock(&self.analyzer);
        if let Err(e) = analyzer.analyze_trends(now) {
            warn!(error = %e, "trend analysis failed");
        }
        let anomalies = analyzer.detect_anomalies(now);
        drop(analyzer);

        for anomaly in &anomalies {
            self.notify(PipelineEvent::AnomalyDetected {
                anomaly: anomaly.clone(),
            });
        }
        anomalies
    }

    /// Expire predictions whose verification window has passed.
    pub fn expire_predictions(&self, now: i64) -> Vec<Prediction> {
        let expired = lock(&self.prediction).expire_stale(now);
        for prediction in &expired {
            self.notify(PipelineEvent::PredictionResolved {
                prediction: prediction.clone(),
            });
        }
        expired
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Spawn the periodic jobs on the current tokio runtime.
    pub fn start(self: &Arc<Self>) -> SchedulerHandle {
        info!(event = "pipeline_started");
        scheduler::start(Arc::clone(self))
    }

    /// Stop the scheduler, then flush and persist.
    pub async fn stop(self: &Arc<Self>, handle: SchedulerHandle) {
        handle.shutdown().await;
        let pipeline = Arc::clone(self);
        if let Err(e) = tokio::task::spawn_blocking(move || pipeline.shutdown()).await {
            warn!(error = %e, "final shutdown task failed");
        }
    }

    /// Final temporal flush, log flush and persist.
    pub fn shutdown(&self) {
        lock(&self.buffer).shutdown();
        info!(event = "pipeline_stopped");
    }
}

impl std::fmt::Debug for ErrorPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorPipeline")
            .field("buffer", &self.buffer)
            .field("subscribers", &self.events.receiver_count())
            .finish_non_exhaustive()
    }
}
