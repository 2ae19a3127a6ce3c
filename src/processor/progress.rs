//! Periodic progress reporting for long scans.
//!
//! Scanners batch byte counts into `add`; a ticker thread turns them into
//! a log line whenever the integer percentage moves. The log carries the
//! process RSS so a runaway working set is visible mid-run.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, select, tick, Sender};

const INTERVAL: Duration = Duration::from_secs(5);

pub struct Progress {
    done: AtomicU64,
}

impl Progress {
    pub fn new() -> Self {
        Self {
            done: AtomicU64::new(0),
        }
    }

    /// Record `n` more input bytes as processed.
    #[inline]
    pub fn add(&self, n: u64) {
        self.done.fetch_add(n, Ordering::Relaxed);
    }

    pub fn done_bytes(&self) -> u64 {
        self.done.load(Ordering::Relaxed)
    }

    /// Start the ticker thread; the returned guard stops and joins it on
    /// drop. Logs only when the integer percentage strictly increases.
    pub fn run(self: Arc<Self>, total: u64) -> ProgressTicker {
        let (stop_tx, stop_rx) = bounded::<()>(0);
        let handle = std::thread::spawn(move || {
            let ticker = tick(INTERVAL);
            let mut last_pct = 0u64;
            loop {
                select! {
                    recv(ticker) -> _ => {
                        if total == 0 {
                            continue;
                        }
                        let done = self.done_bytes().min(total);
                        let pct = done * 100 / total;
                        if pct > last_pct {
                            last_pct = pct;
                            eprintln!(
                                "[progress] {}% | {} / {} | rss={:.1} MB",
                                pct,
                                human_bytes(done),
                                human_bytes(total),
                                process_rss_mb(),
                            );
                        }
                        if done >= total {
                            return;
                        }
                    }
                    recv(stop_rx) -> _ => return,
                }
            }
        });
        ProgressTicker {
            stop: Some(stop_tx),
            handle: Some(handle),
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

/// Stops the ticker thread when dropped.
pub struct ProgressTicker {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        // Dropping the sender disconnects the channel and wakes the select.
        drop(self.stop.take());
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

pub(crate) fn human_bytes(b: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * KB;
    const GB: f64 = 1024.0 * MB;
    let f = b as f64;
    if f >= GB {
        format!("{:.2}GB", f / GB)
    } else if f >= MB {
        format!("{:.2}MB", f / MB)
    } else if f >= KB {
        format!("{:.2}KB", f / KB)
    } else {
        format!("{b}B")
    }
}

/// Resident set size of this process. Assumes 4 KiB pages.
#[cfg(target_os = "linux")]
pub(crate) fn process_rss_mb() -> f64 {
    std::fs::read_to_string("/proc/self/statm")
        .ok()
        .and_then(|s| s.split_whitespace().nth(1)?.parse::<u64>().ok())
        .map(|pages| pages as f64 * 4096.0 / (1024.0 * 1024.0))
        .unwrap_or(0.0)
}

#[cfg(target_os = "macos")]
pub(crate) fn process_rss_mb() -> f64 {
    use std::process::Command;

    if let Ok(output) = Command::new("ps")
        .args(["-o", "rss=", "-p", &std::process::id().to_string()])
        .output()
    {
        if let Ok(rss) = String::from_utf8(output.stdout) {
            if let Ok(kb) = rss.trim().parse::<u64>() {
                return kb as f64 / 1024.0;
            }
        }
    }
    0.0
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
pub(crate) fn process_rss_mb() -> f64 {
    0.0
}
