// src/jobs/scheduler.rs

use std::str::FromStr;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use cron::Schedule;
use futures::future::BoxFuture;
use tokio::task::JoinHandle;

use crate::common::error::AppError;

/// Fábrica do futuro executado a cada disparo.
pub type RecurringJob = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

pub trait Scheduler: Send + Sync {
    fn register_recurring_job(&self, name: &str, cron_expr: &str, job: RecurringJob) -> Result<(), AppError>;
}

/// Agenda cada job numa task própria do tokio.
#[derive(Default)]
pub struct CronScheduler {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl CronScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shutdown(&self) {
        if let Ok(mut handles) = self.handles.lock() {
            for handle in handles.drain(..) {
                handle.abort();
            }
        }
    }
}

impl Drop for CronScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

pub fn parse_schedule(cron_expr: &str) -> Result<Schedule, AppError> {
    Schedule::from_str(cron_expr)
        .map_err(|e| AppError::BadRequest(format!("Expressão cron inválida '{cron_expr}': {e}")))
}

pub fn next_run(schedule: &Schedule, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    schedule.after(&after).next()
}

impl Scheduler for CronScheduler {
    fn register_recurring_job(&self, name: &str, cron_expr: &str, job: RecurringJob) -> Result<(), AppError> {
        let schedule = parse_schedule(cron_expr)?;
        let name = name.to_string();

        tracing::info!(job = %name, cron = cron_expr, "⏰ Job recorrente registrado");

        let handle = tokio::spawn(async move {
            while let Some(next) = next_run(&schedule, Utc::now()) {
                let wait = (next - Utc::now()).to_std().unwrap_or_default();
                tokio::time::sleep(wait).await;

                tracing::info!(job = %name, "Executando job recorrente");
                job().await;
            }
            tracing::warn!(job = %name, "Agenda sem próximas execuções, job encerrado");
        });

        self.handles
            .lock()
            .map_err(|_| AppError::InternalServerError(anyhow::anyhow!("scheduler lock poisoned")))?
            .push(handle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use futures::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn daily_cleanup_expression_fires_at_three_utc() {
        let schedule = parse_schedule("0 0 3 * * *").unwrap();
        let after = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();

        assert_eq!(
            next_run(&schedule, after),
            Some(Utc.with_ymd_and_hms(2025, 3, 2, 3, 0, 0).unwrap())
        );
    }

    #[test]
    fn invalid_expressions_are_rejected() {
        let scheduler = CronScheduler::new();
        let job: RecurringJob = Arc::new(|| async {}.boxed());
        assert!(scheduler.register_recurring_job("broken", "not a cron", job).is_err());
    }

    #[tokio::test]
    async fn registered_jobs_run_on_schedule() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let job: RecurringJob = Arc::new(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            .boxed()
        });

        let scheduler = CronScheduler::new();
        scheduler.register_recurring_job("every-second", "* * * * * *", job).unwrap();
        tokio::time::sleep(Duration::from_millis(2100)).await;
        scheduler.shutdown();

        assert!(runs.load(Ordering::SeqCst) >= 1);
    }
}
