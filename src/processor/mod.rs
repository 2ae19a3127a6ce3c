//! Parallel file processing.
//!
//! `FileProcessor` plans byte shards over the input, scans every shard on
//! its own thread with positional reads only, and feeds each parsed
//! address into the shared membership bitmap. First fatal error trips the
//! shared cancel flag; everyone else drains out at their next line.

pub mod plan;
pub mod progress;
mod section;

use std::fs::File;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crate::bitset::Ipv4Bitset;
use crate::error::{CounterError, Result};
use crate::parse;

use self::plan::{split_to_shards, Shard};
use self::progress::Progress;
use self::section::{SectionReader, SCAN_BUF_SIZE};

/// Scanners hand byte counts to the progress sink in chunks of this size.
const FLUSH_EVERY: u64 = 256 << 10;

pub struct FileProcessor {
    file: File,
    bitset: Arc<Ipv4Bitset>,
    workers: usize,
    progress: Arc<Progress>,
}

impl FileProcessor {
    pub fn new(file: File, bitset: Arc<Ipv4Bitset>, workers: usize) -> Self {
        Self {
            file,
            bitset,
            workers,
            progress: Arc::new(Progress::new()),
        }
    }

    pub fn unique_count(&self) -> u64 {
        self.bitset.unique_count()
    }

    /// Scan the whole file, one worker per shard. The first fatal error
    /// trips `cancel` and is returned once every worker has drained;
    /// tripping `cancel` from outside surfaces as `Cancelled`.
    pub fn process(&self, cancel: &AtomicBool) -> Result<()> {
        let size = self.file.metadata()?.len();
        if size == 0 {
            return Ok(());
        }
        let _ticker = self.progress.clone().run(size);

        let shards = split_to_shards(&self.file, size, self.workers)?;

        let first_err = thread::scope(|s| {
            let handles: Vec<_> = shards
                .iter()
                .map(|&shard| {
                    s.spawn(move || {
                        let res = self.process_shard(cancel, shard);
                        if res.is_err() {
                            cancel.store(true, Ordering::SeqCst);
                        }
                        res
                    })
                })
                .collect();

            let mut first: Option<CounterError> = None;
            for h in handles {
                let res = match h.join() {
                    Ok(res) => res,
                    Err(panic) => std::panic::resume_unwind(panic),
                };
                if let Err(e) = res {
                    // A real failure beats the cancellations it caused.
                    let replace = match &first {
                        None => true,
                        Some(CounterError::Cancelled) => {
                            !matches!(e, CounterError::Cancelled)
                        }
                        Some(_) => false,
                    };
                    if replace {
                        first = Some(e);
                    }
                }
            }
            first
        });

        match first_err {
            None => Ok(()),
            Some(e) => Err(e),
        }
    }

    fn process_shard(&self, cancel: &AtomicBool, shard: Shard) -> Result<()> {
        let mut reader = SectionReader::new(&self.file, shard.start, shard.end, SCAN_BUF_SIZE);
        let mut local_bytes = 0u64;
        let mut local_new = 0u64;
        let result = self.scan_lines(cancel, &mut reader, &mut local_bytes, &mut local_new);

        // Deferred flushes run on every exit path, cancellation included.
        self.bitset.add_unique(local_new);
        if local_bytes > 0 {
            self.progress.add(local_bytes);
        }
        result
    }

    fn scan_lines(
        &self,
        cancel: &AtomicBool,
        reader: &mut SectionReader<'_>,
        local_bytes: &mut u64,
        local_new: &mut u64,
    ) -> Result<()> {
        loop {
            if cancel.load(Ordering::Relaxed) {
                return Err(CounterError::Cancelled);
            }
            let line = match reader.next_line()? {
                Some(line) => line,
                None => return Ok(()),
            };

            *local_bytes += line.len() as u64;
            if *local_bytes >= FLUSH_EVERY {
                self.progress.add(*local_bytes);
                *local_bytes = 0;
            }

            if let Some(addr) = parse::parse(trim_crlf(line)) {
                if self.bitset.set_if_new(addr) {
                    *local_new += 1;
                }
            }
        }
    }
}

/// Strip any run of trailing `\r` / `\n` bytes.
fn trim_crlf(b: &[u8]) -> &[u8] {
    let mut n = b.len();
    while n > 0 && (b[n - 1] == b'\n' || b[n - 1] == b'\r') {
        n -= 1;
    }
    &b[..n]
}
