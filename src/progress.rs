//! Animated status line for the wait between prompt and first visible text.
//!
//! The indicator redraws a single line on a background thread. `start` and
//! `stop` are idempotent, and `stop` may race against itself from the ctrl-c
//! handler: the worker slot is taken under a mutex, so exactly one caller
//! signals the worker and the worker erases its line exactly once as it
//! exits. `stop` waits for that acknowledgement, bounded so a stuck terminal
//! cannot hang the session.

use std::io::{self, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

const FRAMES: [char; 4] = ['◢', '◣', '◤', '◥'];
const FRAME_DELAY: Duration = Duration::from_millis(150);
const STOP_WAIT: Duration = Duration::from_millis(500);

/// A start/stop handle for the spinner. Share it as `Arc<ProgressIndicator>`
/// between the chat loop and the interrupt handler; at most one worker runs
/// at a time.
#[derive(Debug, Default)]
pub struct ProgressIndicator {
    worker: Mutex<Option<Worker>>,
}

#[derive(Debug)]
struct Worker {
    running: Arc<Mutex<bool>>,
    done: Receiver<()>,
}

impl ProgressIndicator {
    /// Creates an indicator with no worker running.
    pub fn new() -> Self {
        Self::default()
    }

    /// Launches the background worker drawing `label` plus a cycling glyph.
    /// No-op while a worker is already running.
    pub fn start(&self, label: &str) {
        let mut slot = self.worker.lock().unwrap();
        if slot.is_some() {
            return;
        }
        let running = Arc::new(Mutex::new(true));
        let (done_tx, done_rx) = mpsc::channel();
        let flag = Arc::clone(&running);
        let label = label.to_string();
        thread::spawn(move || spin(label, flag, done_tx));
        *slot = Some(Worker {
            running,
            done: done_rx,
        });
    }

    /// Signals the worker to halt and waits, bounded, for it to erase its
    /// line. No-op when nothing is running, including when another caller won
    /// the race to stop the same worker.
    pub fn stop(&self) {
        let worker = self.worker.lock().unwrap().take();
        let Some(worker) = worker else {
            return;
        };
        *worker.running.lock().unwrap() = false;
        let _ = worker.done.recv_timeout(STOP_WAIT);
    }

    /// True while a worker is running.
    pub fn is_running(&self) -> bool {
        self.worker.lock().unwrap().is_some()
    }
}

/// Worker loop: one frame per delay while the flag stays set, then erase the
/// status line and acknowledge.
fn spin(label: String, running: Arc<Mutex<bool>>, done: Sender<()>) {
    let mut frame = 0usize;
    loop {
        if !*running.lock().unwrap() {
            break;
        }
        let glyph = FRAMES[frame % FRAMES.len()];
        let mut out = io::stdout();
        let _ = write!(out, "\r{label} {glyph}");
        let _ = out.flush();
        thread::sleep(FRAME_DELAY);
        frame += 1;
    }
    let width = label.chars().count() + 5;
    let mut out = io::stdout();
    let _ = write!(out, "\r{:width$}\r", "");
    let _ = out.flush();
    let _ = done.send(());
}
