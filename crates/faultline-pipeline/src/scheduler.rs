//! Background jobs on tokio intervals, cancelled together on shutdown.
//!
//! Every job gets its own task. A task awaits its job before polling the next
//! tick and missed ticks are skipped, so a job never overlaps itself.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use faultline_core::{time, FaultlineConfig};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn, Instrument};

use crate::pipeline::ErrorPipeline;

/// A periodic pipeline job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Job {
    FlushTemporal,
    Persist,
    RotationCheck,
    Maintenance,
    Analysis,
    PredictionExpiry,
}

impl Job {
    pub const ALL: [Job; 6] = [
        Job::FlushTemporal,
        Job::Persist,
        Job::RotationCheck,
        Job::Maintenance,
        Job::Analysis,
        Job::PredictionExpiry,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FlushTemporal => "flush_temporal",
            Self::Persist => "persist",
            Self::RotationCheck => "rotation_check",
            Self::Maintenance => "maintenance",
            Self::Analysis => "analysis",
            Self::PredictionExpiry => "prediction_expiry",
        }
    }

    /// Configured period; `None` when the interval is 0 (job disabled).
    pub fn period(self, config: &FaultlineConfig) -> Option<Duration> {
        let secs = match self {
            Self::FlushTemporal => config.buffer.temporal_flush_interval_secs,
            Self::Persist => config.buffer.persist_interval_secs,
            Self::RotationCheck => config.buffer.rotation_check_interval_secs,
            Self::Maintenance => config.buffer.index_rebuild_interval_secs,
            Self::Analysis => config.analysis.analysis_interval_secs,
            Self::PredictionExpiry => config.prediction.expiry_interval_secs,
        };
        (secs > 0).then(|| Duration::from_secs(secs))
    }

    /// Run the job once, synchronously.
    pub fn execute(self, pipeline: &ErrorPipeline) {
        let now = time::now_ms();
        match self {
            Self::FlushTemporal => {
                let flushed = pipeline.flush_temporal();
                if flushed > 0 {
                    debug!(flushed, "temporal buffer flushed");
                }
            }
            Self::Persist => {
                if let Err(e) = pipeline.persist() {
                    warn!(error = %e, "scheduled persist failed");
                }
            }
            Self::RotationCheck => {
                pipeline.check_rotation();
            }
            Self::Maintenance => pipeline.maintenance(now),
            Self::Analysis => {
                pipeline.run_analysis(now);
            }
            Self::PredictionExpiry => {
                pipeline.expire_predictions(now);
            }
        }
    }

    /// Every job takes component locks, so it runs on the blocking pool.
    async fn run(self, pipeline: &Arc<ErrorPipeline>) {
        let pipeline = Arc::clone(pipeline);
        if let Err(e) = tokio::task::spawn_blocking(move || self.execute(&pipeline)).await {
            warn!(job = self.as_str(), error = %e, "job panicked");
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle to the running jobs.
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<(Job, JoinHandle<()>)>,
}

impl SchedulerHandle {
    pub fn jobs(&self) -> Vec<Job> {
        self.tasks.iter().map(|(job, _)| *job).collect()
    }

    /// Signal every job to stop and wait for them. A job mid-run finishes first.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        for (job, task) in self.tasks {
            if let Err(e) = task.await {
                warn!(job = job.as_str(), error = %e, "job task ended abnormally");
            }
        }
        info!(event = "scheduler_stopped");
    }

}

impl fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("jobs", &self.jobs())
            .finish()
    }
}

/// Spawn one task per enabled job. Must be called inside a tokio runtime.
pub fn start(pipeline: Arc<ErrorPipeline>) -> SchedulerHandle {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let tasks = Job::ALL
        .into_iter()
        .filter_map(|job| {
            let period = job.period(pipeline.config())?;
            let task = spawn_job(Arc::clone(&pipeline), job, period, shutdown_rx.clone());
            Some((job, task))
        })
        .collect();
    SchedulerHandle { shutdown_tx, tasks }
}

fn spawn_job(
    pipeline: Arc<ErrorPipeline>,
    job: Job,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!(job = job.as_str(), period_secs = period.as_secs(), "job scheduled");
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    job.run(&pipeline)
                        .instrument(crate::job_span!(job))
                        .await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        debug!(job = job.as_str(), "job stopped");
    })
}
