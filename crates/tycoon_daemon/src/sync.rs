//! Fan-out of committed events: the SSE stream and the durable filesystem.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tycoon_core::files::FileChange;
use tycoon_core::{Event, EventEnvelope};
use tycoon_world::{apply_change, FileSystemService, SyncError};

use crate::state::{AppState, EventTx, NoticeLevel, StreamItem};

/// Hand committed events to subscribers and queue any file changes for
/// durable sync. Never blocks on either.
pub fn publish(app: &AppState, events: Vec<EventEnvelope>) {
    if events.is_empty() {
        return;
    }
    if let Some(file_sync) = &app.file_sync {
        let changes: Vec<FileChange> = events
            .iter()
            .filter_map(|envelope| match &envelope.event {
                Event::FileChanged { change } => Some(change.clone()),
                _ => None,
            })
            .collect();
        if !changes.is_empty() && file_sync.send(changes).is_err() {
            tracing::warn!("file sync worker is gone; change dropped");
        }
    }
    let _ = app.event_tx.send(StreamItem::Events { events });
}

/// How often queued changes are retried while the filesystem is failing.
pub const SYNC_RETRY_INTERVAL: Duration = Duration::from_secs(2);

struct PendingChange {
    change: FileChange,
    attempts: u32,
}

/// Replays change batches in arrival order. A change that fails with a
/// retryable error stays at the head of the queue and blocks later ones
/// until it lands; any other failure drops it. Each failure becomes one
/// warning on the stream; the simulation state is never rolled back.
pub async fn run_file_sync(
    fs: Arc<dyn FileSystemService>,
    mut rx: mpsc::UnboundedReceiver<Vec<FileChange>>,
    event_tx: EventTx,
    retry_every: Duration,
) {
    let mut pending: VecDeque<PendingChange> = VecDeque::new();
    let mut retry = tokio::time::interval(retry_every);
    retry.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            batch = rx.recv() => match batch {
                Some(changes) => pending.extend(
                    changes.into_iter().map(|change| PendingChange { change, attempts: 0 }),
                ),
                None => break,
            },
            _ = retry.tick(), if !pending.is_empty() => {}
        }
        pending = flush(&fs, pending, &event_tx).await;
    }

    pending = flush(&fs, pending, &event_tx).await;
    if !pending.is_empty() {
        tracing::warn!(count = pending.len(), "file changes left unsynced at shutdown");
    }
}

async fn flush(
    fs: &Arc<dyn FileSystemService>,
    pending: VecDeque<PendingChange>,
    event_tx: &EventTx,
) -> VecDeque<PendingChange> {
    if pending.is_empty() {
        return pending;
    }
    let fs = Arc::clone(fs);
    let result = tokio::task::spawn_blocking(move || {
        let mut pending = pending;
        let mut failures: Vec<(String, SyncError, bool)> = Vec::new();
        while let Some(head) = pending.front_mut() {
            match apply_change(fs.as_ref(), &head.change) {
                Ok(()) => {
                    pending.pop_front();
                }
                Err(err) if err.is_retryable() => {
                    head.attempts += 1;
                    if head.attempts == 1 {
                        failures.push((head.change.path.clone(), err, true));
                    }
                    break;
                }
                Err(err) => {
                    failures.push((head.change.path.clone(), err, false));
                    pending.pop_front();
                }
            }
        }
        (pending, failures)
    })
    .await;

    match result {
        Ok((pending, failures)) => {
            for (path, err, retrying) in failures {
                let action = if retrying { "will retry" } else { "dropped" };
                tracing::warn!(%path, "file sync failed ({action}): {err}");
                let _ = event_tx.send(StreamItem::Notice {
                    level: NoticeLevel::Warning,
                    message: format!("file sync failed for {path} ({action}): {err}"),
                });
            }
            pending
        }
        Err(err) => {
            tracing::error!("file sync task panicked: {err}");
            VecDeque::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tycoon_core::files::FileChangeKind;
    use tycoon_world::LocalDiskFs;

    fn change(kind: FileChangeKind, path: &str, content: Option<&str>) -> FileChange {
        FileChange {
            kind,
            path: path.to_string(),
            new_path: None,
            content: content.map(str::to_string),
            is_folder: false,
            recursive: false,
        }
    }

    fn disk() -> (tempfile::TempDir, Arc<dyn FileSystemService>) {
        let dir = tempfile::tempdir().unwrap();
        let fs: Arc<dyn FileSystemService> = Arc::new(LocalDiskFs::new(dir.path()).unwrap());
        (dir, fs)
    }

    #[tokio::test]
    async fn worker_replays_batches_and_drops_hopeless_changes() {
        let (_dir, fs) = disk();
        let (tx, rx) = mpsc::unbounded_channel();
        let (event_tx, mut events) = tokio::sync::broadcast::channel(16);
        let worker = tokio::spawn(run_file_sync(
            Arc::clone(&fs),
            rx,
            event_tx,
            Duration::from_millis(10),
        ));

        tx.send(vec![change(FileChangeKind::Create, "/notes/a.txt", Some("hello"))])
            .unwrap();
        tx.send(vec![change(FileChangeKind::Delete, "/missing.txt", None)])
            .unwrap();
        drop(tx);
        worker.await.unwrap();

        let entry = fs.get_entry("/notes/a.txt").unwrap().unwrap();
        assert_eq!(entry.content.as_deref(), Some("hello"));
        match events.recv().await.unwrap() {
            StreamItem::Notice { level, message } => {
                assert_eq!(level, NoticeLevel::Warning);
                assert!(message.contains("/missing.txt"));
                assert!(message.contains("dropped"));
            }
            other => panic!("expected a warning, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn blocked_changes_land_once_the_disk_recovers() {
        let (dir, fs) = disk();
        let blocker = dir.path().join("projects");
        std::fs::write(&blocker, "in the way").unwrap();

        let (tx, rx) = mpsc::unbounded_channel();
        let (event_tx, mut events) = tokio::sync::broadcast::channel(16);
        let worker = tokio::spawn(run_file_sync(
            Arc::clone(&fs),
            rx,
            event_tx,
            Duration::from_millis(10),
        ));
        tx.send(vec![
            change(FileChangeKind::Create, "/projects/a.txt", Some("one")),
            change(FileChangeKind::Create, "/projects/b.txt", Some("two")),
        ])
        .unwrap();

        match events.recv().await.unwrap() {
            StreamItem::Notice { message, .. } => assert!(message.contains("will retry")),
            other => panic!("expected a warning, got {other:?}"),
        }
        assert!(fs.get_entry("/projects/b.txt").unwrap_or(None).is_none());

        std::fs::remove_file(&blocker).unwrap();
        let mut landed = false;
        for _ in 0..200 {
            if fs.get_entry("/projects/b.txt").unwrap_or(None).is_some() {
                landed = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(landed, "queued changes never reached the disk");
        assert!(fs.get_entry("/projects/a.txt").unwrap().is_some());

        drop(tx);
        worker.await.unwrap();
    }

    #[test]
    fn publish_forwards_only_file_changes() {
        let mut app = crate::state::test_app(None);
        let (tx, mut rx) = mpsc::unbounded_channel();
        app.file_sync = Some(tx);
        let envelope = |event| EventEnvelope {
            id: tycoon_core::EventId::from("evt_000001"),
            tick: 0,
            event,
        };
        publish(&app, vec![envelope(Event::DayStarted { day: 2 })]);
        assert!(rx.try_recv().is_err());

        publish(
            &app,
            vec![envelope(Event::FileChanged {
                change: change(FileChangeKind::Create, "/a.txt", Some("x")),
            })],
        );
        let batch = rx.try_recv().unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].path, "/a.txt");
    }
}
