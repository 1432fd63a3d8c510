//! Chat presence. Purely cosmetic: the simulation never reads it.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub seq: u64,
    pub sender: String,
    pub text: String,
}

pub type ChatListener = Box<dyn Fn(ChatMessage) + Send>;

pub trait PresenceService: Send {
    /// Starts delivering messages. Starting twice restarts the feed.
    fn start(&mut self, on_message: ChatListener);
    fn stop(&mut self);
}

const HANDLES: [&str; 6] = ["n0va", "gh0stwire", "b1tshift", "kernel_panic", "z3ro", "lambda_l"];
const LINES: [&str; 8] = [
    "anyone else seeing the gpu prices?",
    "nexus is hiring again lol",
    "trace meter went red on me twice today",
    "who's selling cheap coolers",
    "just shipped my first app",
    "don't answer signals from unknown senders",
    "raid last night, lost half my stack",
    "gm",
];

/// Emits one synthetic message per interval on a background thread.
pub struct MockPresence {
    interval: Duration,
    seed: u64,
    worker: Option<(Sender<()>, JoinHandle<()>)>,
}

impl MockPresence {
    pub fn new(interval: Duration, seed: u64) -> Self {
        Self {
            interval,
            seed,
            worker: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }
}

impl PresenceService for MockPresence {
    fn start(&mut self, on_message: ChatListener) {
        self.stop();
        let (stop_tx, stop_rx) = mpsc::channel();
        let interval = self.interval;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let handle = std::thread::spawn(move || {
            let mut seq = 0;
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
                seq += 1;
                let sender = HANDLES.choose(&mut rng).copied().unwrap_or("anon");
                let mut text = LINES.choose(&mut rng).copied().unwrap_or("...").to_string();
                if rng.gen_bool(0.1) {
                    text.push_str(" :)");
                }
                on_message(ChatMessage {
                    seq,
                    sender: sender.to_string(),
                    text,
                });
            }
        });
        self.worker = Some((stop_tx, handle));
    }

    fn stop(&mut self) {
        if let Some((stop_tx, handle)) = self.worker.take() {
            let _ = stop_tx.send(());
            if handle.join().is_err() {
                tracing::warn!("presence worker panicked");
            }
        }
    }
}

impl Drop for MockPresence {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn emits_until_stopped() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let mut presence = MockPresence::new(Duration::from_millis(5), 42);
        presence.start(Box::new(move |msg: ChatMessage| sink.lock().unwrap().push(msg)));
        std::thread::sleep(Duration::from_millis(100));
        presence.stop();
        assert!(!presence.is_running());

        let count = received.lock().unwrap().len();
        assert!(count > 0);
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(received.lock().unwrap().len(), count);

        let seqs: Vec<u64> = received.lock().unwrap().iter().map(|m| m.seq).collect();
        assert_eq!(seqs, (1..=count as u64).collect::<Vec<_>>());
    }

    #[test]
    fn stop_without_start_is_noop() {
        let mut presence = MockPresence::new(Duration::from_secs(1), 1);
        presence.stop();
        assert!(!presence.is_running());
    }
}
