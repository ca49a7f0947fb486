//! The scheduled export job.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::services::ExportRunner;

use super::scheduler::{Job, JobFrequency};

/// Evaluates every enabled export config each tick and runs the due ones.
pub struct ScheduledExportJob {
    runner: Arc<ExportRunner>,
    tick_minutes: u64,
}

impl ScheduledExportJob {
    pub fn new(runner: Arc<ExportRunner>, tick_minutes: u64) -> Self {
        Self {
            runner,
            tick_minutes,
        }
    }
}

#[async_trait::async_trait]
impl Job for ScheduledExportJob {
    fn name(&self) -> &'static str {
        "scheduled_exports"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(self.tick_minutes)
    }

    async fn execute(&self) -> Result<(), String> {
        let summary = self
            .runner
            .run_due_configs(Utc::now())
            .await
            .map_err(|e| format!("Failed to load export configs: {e}"))?;

        if summary.due > 0 {
            info!(
                evaluated = summary.evaluated,
                due = summary.due,
                succeeded = summary.succeeded,
                failed = summary.failed,
                skipped = summary.skipped,
                "Export tick finished"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_tick_frequency_follows_config() {
        let freq = JobFrequency::Minutes(15);
        assert_eq!(freq.duration(), Duration::from_secs(900));
    }
}
