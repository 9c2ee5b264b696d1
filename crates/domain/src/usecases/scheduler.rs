//! Background scheduler - runs a single job on a cron or fixed-interval cadence
//!
//! The scheduler is an ordinary value owned by the host process. Nothing is
//! started until [`Scheduler::start`] is called, and [`Scheduler::stop`] must
//! be awaited to shut the background task down.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde::Serialize;
use time::{Duration, OffsetDateTime};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::{
    cron::{CronError, CronSchedule},
    model::{ScheduleConfig, ScheduleMode},
    ports::Clock,
};

/// Errors from the scheduler
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("Invalid cron expression: {0}")]
    InvalidCron(#[from] CronError),
    #[error("Interval must be between 1 and {} minutes", MAX_INTERVAL_MINUTES)]
    InvalidInterval,
    #[error("Job failed: {0}")]
    Job(String),
}

/// Longest accepted interval, one year
pub const MAX_INTERVAL_MINUTES: u64 = 366 * 24 * 60;

/// A unit of work fired by the scheduler
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    /// Stable job identifier reported in status
    fn id(&self) -> &str;

    async fn run(&self) -> Result<(), SchedulerError>;
}

/// When the job fires
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleTrigger {
    Cron(CronSchedule),
    Interval(Duration),
}

impl ScheduleTrigger {
    pub fn from_config(config: &ScheduleConfig) -> Result<Self, SchedulerError> {
        match config.mode {
            ScheduleMode::Cron => Ok(Self::Cron(CronSchedule::parse(&config.cron)?)),
            ScheduleMode::Interval => {
                if !(1..=MAX_INTERVAL_MINUTES).contains(&config.interval_minutes) {
                    return Err(SchedulerError::InvalidInterval);
                }
                let minutes = i64::try_from(config.interval_minutes)
                    .map_err(|_| SchedulerError::InvalidInterval)?;
                Ok(Self::Interval(Duration::minutes(minutes)))
            }
        }
    }

    /// Next fire time strictly after `after`; `None` if it never fires again
    pub fn next_fire(&self, after: OffsetDateTime) -> Option<OffsetDateTime> {
        match self {
            Self::Cron(cron) => cron.next_after(after),
            Self::Interval(every) => after.checked_add(*every),
        }
    }
}

/// Result of [`Scheduler::start`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Scheduling is switched off in configuration
    Disabled,
    Started,
    AlreadyRunning,
}

/// Per-job status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobStatus {
    pub id: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub next_run_time: Option<OffsetDateTime>,
}

/// Scheduler snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchedulerStatus {
    pub enabled: bool,
    pub running: bool,
    pub jobs: Vec<JobStatus>,
}

impl SchedulerStatus {
    /// Status of a schedule that is configured but not running in this process
    pub fn planned(
        config: &ScheduleConfig,
        job_id: &str,
        now: OffsetDateTime,
    ) -> Result<Self, SchedulerError> {
        if !config.enabled {
            return Ok(Self {
                enabled: false,
                running: false,
                jobs: vec![],
            });
        }

        let trigger = ScheduleTrigger::from_config(config)?;
        Ok(Self {
            enabled: true,
            running: false,
            jobs: vec![JobStatus {
                id: job_id.to_string(),
                next_run_time: trigger.next_fire(now),
            }],
        })
    }
}

struct RunningJob {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
    next_run: Arc<Mutex<Option<OffsetDateTime>>>,
}

/// Single-job background scheduler
pub struct Scheduler<J, Cl>
where
    J: ScheduledJob + ?Sized + 'static,
    Cl: Clock + ?Sized + 'static,
{
    config: ScheduleConfig,
    job: Arc<J>,
    clock: Arc<Cl>,
    running: Mutex<Option<RunningJob>>,
}

impl<J, Cl> Scheduler<J, Cl>
where
    J: ScheduledJob + ?Sized + 'static,
    Cl: Clock + ?Sized + 'static,
{
    pub fn new(config: ScheduleConfig, job: Arc<J>, clock: Arc<Cl>) -> Self {
        Self {
            config,
            job,
            clock,
            running: Mutex::new(None),
        }
    }

    /// Spawn the background task. Must be called inside a Tokio runtime.
    pub fn start(&self) -> Result<StartOutcome, SchedulerError> {
        if !self.config.enabled {
            tracing::info!("Scheduler is disabled");
            return Ok(StartOutcome::Disabled);
        }

        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if running.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            tracing::debug!("Scheduler already running");
            return Ok(StartOutcome::AlreadyRunning);
        }

        let trigger = ScheduleTrigger::from_config(&self.config)?;
        let first_run = trigger.next_fire(self.clock.now());
        let next_run = Arc::new(Mutex::new(first_run));
        let (shutdown, shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(run_job_loop(
            Arc::clone(&self.job),
            Arc::clone(&self.clock),
            trigger,
            Arc::clone(&next_run),
            shutdown_rx,
        ));

        tracing::info!(
            mode = ?self.config.mode,
            job_id = self.job.id(),
            next_run = ?first_run,
            "Scheduler started"
        );

        *running = Some(RunningJob {
            shutdown,
            handle,
            next_run,
        });

        Ok(StartOutcome::Started)
    }

    /// Stop the background task, waiting for an in-flight job to finish.
    /// Stopping a stopped scheduler is a no-op.
    pub async fn stop(&self) {
        let running = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(running) = running else {
            return;
        };

        // The task may already have exited, in which case nobody is listening
        let _ = running.shutdown.send(());
        if let Err(e) = running.handle.await {
            tracing::warn!(error = %e, "Scheduler task ended abnormally");
        }

        tracing::info!("Scheduler stopped");
    }

    pub fn status(&self) -> SchedulerStatus {
        let running = self.running.lock().unwrap_or_else(PoisonError::into_inner);

        match running.as_ref() {
            Some(job) if !job.handle.is_finished() => SchedulerStatus {
                enabled: self.config.enabled,
                running: true,
                jobs: vec![JobStatus {
                    id: self.job.id().to_string(),
                    next_run_time: *job.next_run.lock().unwrap_or_else(PoisonError::into_inner),
                }],
            },
            _ => SchedulerStatus {
                enabled: self.config.enabled,
                running: false,
                jobs: vec![],
            },
        }
    }
}

async fn run_job_loop<J, Cl>(
    job: Arc<J>,
    clock: Arc<Cl>,
    trigger: ScheduleTrigger,
    next_run: Arc<Mutex<Option<OffsetDateTime>>>,
    mut shutdown: oneshot::Receiver<()>,
) where
    J: ScheduledJob + ?Sized,
    Cl: Clock + ?Sized,
{
    loop {
        let Some(due) = *next_run.lock().unwrap_or_else(PoisonError::into_inner) else {
            tracing::warn!(job_id = job.id(), "Schedule has no future run time");
            break;
        };

        let wait = std::time::Duration::try_from(due - clock.now()).unwrap_or_default();

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = &mut shutdown => break,
        }

        tracing::info!(job_id = job.id(), "Running scheduled job");
        if let Err(e) = job.run().await {
            tracing::error!(job_id = job.id(), error = %e, "Scheduled job failed");
        }

        let next = trigger.next_fire(due.max(clock.now()));
        *next_run.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use time::macros::datetime;

    struct CountingJob {
        runs: AtomicUsize,
    }

    #[async_trait]
    impl ScheduledJob for CountingJob {
        fn id(&self) -> &str {
            "publish_check"
        }

        async fn run(&self) -> Result<(), SchedulerError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FakeClock {
        time: OffsetDateTime,
    }

    impl Clock for FakeClock {
        fn now(&self) -> OffsetDateTime {
            self.time
        }
    }

    const NOW: OffsetDateTime = datetime!(2024-05-01 08:00 UTC);

    fn scheduler(config: ScheduleConfig) -> (Scheduler<CountingJob, FakeClock>, Arc<CountingJob>) {
        let job = Arc::new(CountingJob {
            runs: AtomicUsize::new(0),
        });
        let scheduler = Scheduler::new(
            config,
            Arc::clone(&job),
            Arc::new(FakeClock { time: NOW }),
        );
        (scheduler, job)
    }

    fn interval_config(minutes: u64) -> ScheduleConfig {
        ScheduleConfig {
            enabled: true,
            mode: ScheduleMode::Interval,
            interval_minutes: minutes,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_interval_scheduler_reports_running_then_stops() {
        let (scheduler, _job) = scheduler(interval_config(30));

        assert_eq!(scheduler.start().unwrap(), StartOutcome::Started);

        let status = scheduler.status();
        assert!(status.enabled);
        assert!(status.running);
        assert_eq!(status.jobs.len(), 1);
        assert_eq!(status.jobs[0].id, "publish_check");
        assert_eq!(status.jobs[0].next_run_time, Some(datetime!(2024-05-01 08:30 UTC)));

        scheduler.stop().await;

        let status = scheduler.status();
        assert!(!status.running);
        assert!(status.jobs.is_empty());
    }

    #[tokio::test]
    async fn test_disabled_start_is_a_reported_noop() {
        let (scheduler, _job) = scheduler(ScheduleConfig::default());

        assert_eq!(scheduler.start().unwrap(), StartOutcome::Disabled);

        let status = scheduler.status();
        assert!(!status.enabled);
        assert!(!status.running);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let (scheduler, _job) = scheduler(interval_config(5));

        scheduler.stop().await;
        scheduler.start().unwrap();
        scheduler.stop().await;
        scheduler.stop().await;

        assert!(!scheduler.status().running);
    }

    #[tokio::test]
    async fn test_second_start_reports_already_running() {
        let (scheduler, _job) = scheduler(interval_config(5));

        scheduler.start().unwrap();
        assert_eq!(scheduler.start().unwrap(), StartOutcome::AlreadyRunning);

        scheduler.stop().await;
    }

    #[tokio::test]
    async fn test_cron_next_run_time() {
        let (scheduler, _job) = scheduler(ScheduleConfig {
            enabled: true,
            mode: ScheduleMode::Cron,
            cron: "0 9 * * *".to_string(),
            ..Default::default()
        });

        scheduler.start().unwrap();
        assert_eq!(
            scheduler.status().jobs[0].next_run_time,
            Some(datetime!(2024-05-01 09:00 UTC))
        );
        scheduler.stop().await;
    }

    #[tokio::test]
    async fn test_invalid_cron_fails_start() {
        let (scheduler, _job) = scheduler(ScheduleConfig {
            enabled: true,
            mode: ScheduleMode::Cron,
            cron: "every morning".to_string(),
            ..Default::default()
        });

        assert!(matches!(
            scheduler.start(),
            Err(SchedulerError::InvalidCron(_))
        ));
        assert!(!scheduler.status().running);
    }

    #[tokio::test]
    async fn test_zero_interval_is_rejected() {
        let (scheduler, _job) = scheduler(interval_config(0));
        assert!(matches!(
            scheduler.start(),
            Err(SchedulerError::InvalidInterval)
        ));
    }

    #[test]
    fn test_planned_status_shape() {
        let status = SchedulerStatus::planned(&interval_config(30), "publish_check", NOW).unwrap();
        assert!(status.enabled);
        assert!(!status.running);
        assert_eq!(status.jobs.len(), 1);
        assert_eq!(status.jobs[0].next_run_time, Some(datetime!(2024-05-01 08:30 UTC)));

        let disabled =
            SchedulerStatus::planned(&ScheduleConfig::default(), "publish_check", NOW).unwrap();
        assert!(!disabled.enabled);
        assert!(disabled.jobs.is_empty());

        assert!(SchedulerStatus::planned(&interval_config(0), "publish_check", NOW).is_err());
    }

    #[test]
    fn test_oversized_interval_is_rejected() {
        for minutes in [MAX_INTERVAL_MINUTES + 1, 1 << 60, u64::MAX] {
            let result = ScheduleTrigger::from_config(&interval_config(minutes));
            assert!(
                matches!(result, Err(SchedulerError::InvalidInterval)),
                "{minutes}"
            );
        }
    }

    #[test]
    fn test_longest_interval_fires_in_the_future() {
        let trigger = ScheduleTrigger::from_config(&interval_config(MAX_INTERVAL_MINUTES)).unwrap();
        let next = trigger.next_fire(NOW).unwrap();
        assert_eq!(next, NOW + Duration::days(366));
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_fires_after_interval() {
        let (scheduler, job) = scheduler(interval_config(30));

        scheduler.start().unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(29 * 60)).await;
        assert_eq!(job.runs.load(Ordering::SeqCst), 0);

        tokio::time::sleep(std::time::Duration::from_secs(2 * 60)).await;
        assert_eq!(job.runs.load(Ordering::SeqCst), 1);

        scheduler.stop().await;
    }
}
