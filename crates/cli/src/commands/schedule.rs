//! Schedule command - run the background scan job or show its timing

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use wechat_publisher_domain::{
    Clock, SystemClock,
    usecases::{PUBLISH_CHECK_JOB, ScanPendingArticles, Scheduler, SchedulerStatus, StartOutcome},
};

use crate::args::{ScheduleArgs, ScheduleCommands};
use crate::commands::open_store;
use crate::config::AppConfig;

pub async fn execute(args: ScheduleArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    match args.command {
        ScheduleCommands::Run => run_scheduler(&config).await,
        ScheduleCommands::Status { json } => show_status(&config, json),
    }
}

async fn run_scheduler(config: &AppConfig) -> Result<()> {
    let store = open_store(config).await?;
    let scheduler = Scheduler::new(
        config.schedule.to_domain(),
        Arc::new(ScanPendingArticles::new(store)),
        Arc::new(SystemClock),
    );

    match scheduler.start().context("Failed to start scheduler")? {
        StartOutcome::Disabled => {
            println!("Scheduler is disabled; set schedule.enabled = true to run it");
            return Ok(());
        }
        StartOutcome::Started | StartOutcome::AlreadyRunning => {}
    }

    let status = scheduler.status();
    for job in &status.jobs {
        tracing::info!(job_id = %job.id, next_run = ?job.next_run_time, "Waiting for next run");
    }

    tokio::signal::ctrl_c()
        .await
        .context("Failed to install Ctrl+C handler")?;
    tracing::info!("Shutdown signal received");

    scheduler.stop().await;
    Ok(())
}

fn show_status(config: &AppConfig, json: bool) -> Result<()> {
    let schedule = config.schedule.to_domain();
    let status = SchedulerStatus::planned(&schedule, PUBLISH_CHECK_JOB, SystemClock.now())
        .context("Invalid schedule")?;

    if json {
        let mut output = serde_json::to_value(&status)?;
        output["mode"] = serde_json::to_value(schedule.mode)?;
        output["cron"] = schedule.cron.clone().into();
        output["interval_minutes"] = schedule.interval_minutes.into();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Schedule");
    println!("========");
    println!("  Enabled: {}", status.enabled);
    println!("  Running: {} (runs inside 'schedule run')", status.running);
    println!("  Mode: {:?}", schedule.mode);
    println!("  Cron: {}", schedule.cron);
    println!("  Interval: {} minutes", schedule.interval_minutes);
    if status.jobs.is_empty() {
        println!("  Jobs: -");
    }
    for job in &status.jobs {
        match job.next_run_time {
            Some(at) => println!("  Job {}: next run {}", job.id, format_time(at)?),
            None => println!("  Job {}: never runs again", job.id),
        }
    }

    Ok(())
}

fn format_time(at: OffsetDateTime) -> Result<String> {
    at.format(&Rfc3339).context("Failed to format time")
}
