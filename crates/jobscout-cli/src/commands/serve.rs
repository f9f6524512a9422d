//! `serve` — run the Batcher and the daily sweep on their own schedule
//! instead of being invoked once per cron tick.
//!
//! Wires two persisted jobs into the scheduler engine: `batch` on a fixed
//! interval, and a `daily-sweep` job (process pending messages, then
//! rescore channels) once a day. The engine only decides *when* a job is
//! due; dispatching the fired job to the right command lives here.

use jobscout_core::config::JobScoutConfig;
use jobscout_scheduler::{Schedule, SchedulerEngine};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use crate::{commands, context};

const BATCH_JOB_NAME: &str = "batch";
const DAILY_SWEEP_JOB_NAME: &str = "daily-sweep";
const DAILY_SWEEP_HOUR_UTC: u8 = 2;
const DAILY_SWEEP_MINUTE_UTC: u8 = 0;

pub async fn run(config: &JobScoutConfig) -> anyhow::Result<()> {
    let conn = context::open_scheduler(config)?;
    let (fired_tx, mut fired_rx) = mpsc::channel(16);
    let engine = SchedulerEngine::new(conn, Some(fired_tx))?;

    ensure_job(&engine, BATCH_JOB_NAME, Schedule::Interval { every_secs: config.scheduler.batch_every_mins * 60 })?;
    ensure_job(
        &engine,
        DAILY_SWEEP_JOB_NAME,
        Schedule::Daily { hour: DAILY_SWEEP_HOUR_UTC, minute: DAILY_SWEEP_MINUTE_UTC },
    )?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let engine_task = tokio::spawn(engine.run(shutdown_rx));

    info!("jobscout serve started, awaiting scheduled jobs (ctrl-c to stop)");
    loop {
        tokio::select! {
            fired = fired_rx.recv() => {
                match fired {
                    Some(job) => dispatch(config, &job.action).await,
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                let _ = shutdown_tx.send(true);
                break;
            }
        }
    }

    engine_task.await?;
    Ok(())
}

fn ensure_job(engine: &SchedulerEngine, name: &str, schedule: Schedule) -> anyhow::Result<()> {
    let already_scheduled = engine.list_jobs()?.iter().any(|j| j.name == name);
    if !already_scheduled {
        engine.add_job(name, schedule, name)?;
        info!(job = name, "registered scheduled job");
    }
    Ok(())
}

async fn dispatch(config: &JobScoutConfig, action: &str) {
    let outcome = match action {
        BATCH_JOB_NAME => commands::batch::run(config, false).await,
        DAILY_SWEEP_JOB_NAME => run_daily_sweep(config),
        other => {
            warn!(action = other, "fired job has no known handler");
            return;
        }
    };
    if let Err(e) = outcome {
        error!(action, error = %e, "scheduled job failed");
    }
}

fn run_daily_sweep(config: &JobScoutConfig) -> anyhow::Result<()> {
    commands::process::run(config, usize::MAX)?;
    commands::score_channels::run(config)
}
