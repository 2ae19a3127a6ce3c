// uniqip - count distinct IPv4 addresses in huge line-oriented files.

use std::fs::File;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;

use uniqip::bitset::Ipv4Bitset;
use uniqip::cli::{default_threads, Args};
use uniqip::processor::FileProcessor;

fn main() -> ExitCode {
    let args = Args::parse();

    let workers = match args.threads {
        Some(0) => {
            eprintln!("[✗] --threads must be at least 1");
            return ExitCode::from(2);
        }
        Some(n) => n,
        None => default_threads(),
    };

    let file = match File::open(&args.file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("[✗] cannot open {}: {}", args.file.display(), e);
            return ExitCode::from(1);
        }
    };

    // Interrupt/terminate/hangup all trip the shared cancel flag; workers
    // notice at their next line and drain out.
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_sig = shutdown.clone();
    ctrlc::set_handler(move || {
        eprintln!("\n[!] Stopping...");
        shutdown_sig.store(true, Ordering::SeqCst);
    })
    .ok();

    eprintln!(
        "[▶] running uniqip: {} workers, input {}",
        workers,
        args.file.display()
    );

    let bitset = Arc::new(Ipv4Bitset::new());
    let fp = FileProcessor::new(file, bitset, workers);

    let start = Instant::now();
    match fp.process(&shutdown) {
        Ok(()) => {
            println!(
                "unique ip's: {}, total time: {} sec",
                fp.unique_count(),
                start.elapsed().as_secs_f64()
            );
            eprintln!("[✓] uniqip exited properly");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("[✗] FileProcessor error: {e}");
            ExitCode::from(1)
        }
    }
}
