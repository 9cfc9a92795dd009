//! Best-effort delivery of finished attempts to a persistence sink.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::{sync::mpsc::UnboundedReceiver, task::JoinHandle};

use crate::assessment::AssessmentEvent;
use crate::models::AttemptRecord;
use crate::{log_debug, log_error, log_info};

const ENABLE_LOGS: bool = true;

/// Single write operation for a completed attempt.
#[async_trait]
pub trait AttemptSink: Send + Sync {
    async fn record(&self, attempt: &AttemptRecord) -> Result<()>;
}

/// Drains orchestrator events and forwards completed attempts to `sink`.
///
/// Failures are logged and dropped; nothing is retried and nothing flows back
/// to the orchestrator. The task ends when every event sender is gone.
pub fn spawn_sink_dispatcher(
    mut events: UnboundedReceiver<AssessmentEvent>,
    sink: Arc<dyn AttemptSink>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                AssessmentEvent::AttemptCompleted { record } => {
                    match sink.record(&record).await {
                        Ok(()) => log_info!("Attempt {} persisted", record.id),
                        Err(err) => log_error!("Failed to persist attempt {}: {err:#}", record.id),
                    }
                }
                other => log_debug!("Assessment event: {other:?}"),
            }
        }
        log_debug!("Sink dispatcher stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AttemptContext, Band, Confidence, LearnerGroup, PlacementLevel, PlacementPlan,
        PlacementResult, ReadingProfile,
    };
    use anyhow::bail;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    #[derive(Default)]
    struct MemorySink {
        saved: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AttemptSink for MemorySink {
        async fn record(&self, attempt: &AttemptRecord) -> Result<()> {
            self.saved.lock().unwrap().push(attempt.id.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FailingSink {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AttemptSink for FailingSink {
        async fn record(&self, _attempt: &AttemptRecord) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            bail!("network unreachable")
        }
    }

    fn record(id: &str) -> AttemptRecord {
        let profile = ReadingProfile {
            domains: Vec::new(),
            overall_band: None,
            confidence: Confidence::Low,
            strengths: Vec::new(),
            needs: Vec::new(),
            suggested_focus: Vec::new(),
        };
        let placement = PlacementResult {
            learner_group: LearnerGroup::Adult,
            level: PlacementLevel::Foundations,
            weighted_score: None,
            confidence: Confidence::Low,
            focus: Vec::new(),
        };
        let plan = PlacementPlan {
            level: PlacementLevel::Foundations,
            steps: Vec::new(),
            reassess_after_weeks: 6,
        };
        let context = AttemptContext {
            id: id.into(),
            device_id: "device".into(),
            learner_group: LearnerGroup::Adult,
            target_band: Band::Beginner,
            started_at: Utc::now(),
            completed_at: Utc::now(),
        };
        AttemptRecord::new(context, &[], &profile, &placement, &plan)
    }

    #[tokio::test]
    async fn forwards_completed_attempts_only() {
        let sink = Arc::new(MemorySink::default());
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = spawn_sink_dispatcher(rx, sink.clone());

        tx.send(AssessmentEvent::AssessmentCancelled {
            attempt_id: "a-0".into(),
        })
        .unwrap();
        tx.send(AssessmentEvent::AttemptCompleted {
            record: Box::new(record("a-1")),
        })
        .unwrap();
        drop(tx);
        handle.await.unwrap();

        assert_eq!(*sink.saved.lock().unwrap(), vec!["a-1".to_string()]);
    }

    #[tokio::test]
    async fn failures_are_swallowed_without_retry() {
        let sink = Arc::new(FailingSink::default());
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = spawn_sink_dispatcher(rx, sink.clone());

        for id in ["a-1", "a-2"] {
            tx.send(AssessmentEvent::AttemptCompleted {
                record: Box::new(record(id)),
            })
            .unwrap();
        }
        drop(tx);
        handle.await.unwrap();

        assert_eq!(sink.calls.load(Ordering::SeqCst), 2);
    }
}
