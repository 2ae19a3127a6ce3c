// tests/integration/correctness.rs
// End-to-end counting runs over real temp files, across worker counts.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use uniqip::bitset::Ipv4Bitset;
use uniqip::parse;
use uniqip::processor::FileProcessor;

fn write_temp(content: &[u8]) -> PathBuf {
    let id: u64 = rand::thread_rng().gen();
    let path = std::env::temp_dir().join(format!("uniqip_e2e_{id}.txt"));
    File::create(&path).unwrap().write_all(content).unwrap();
    path
}

/// Run a full count over `content` with the given worker count.
fn count_unique(content: &[u8], workers: usize) -> u64 {
    let path = write_temp(content);
    let file = File::open(&path).unwrap();
    let bitset = Arc::new(Ipv4Bitset::new());
    let fp = FileProcessor::new(file, bitset, workers);

    let cancel = AtomicBool::new(false);
    fp.process(&cancel).expect("processing failed");

    let _ = std::fs::remove_file(&path);
    fp.unique_count()
}

/// Duplicates, CRLF, and garbage mixed together count three distinct
/// addresses whatever the worker count.
#[test]
fn test_mixed_input_any_worker_count() {
    let content = b"1.1.1.1\n2.2.2.2\r\ngarbage\n1.1.1.1\n255.255.255.255\n";
    for workers in [1, 2, 3, 4, 8] {
        assert_eq!(
            count_unique(content, workers),
            3,
            "wrong count with {workers} workers"
        );
    }
}

#[test]
fn test_single_worker_crlf_and_garbage() {
    let content = b"10.0.0.1\r\n10.0.0.2\n10.0.0.1\nbad\n";
    assert_eq!(count_unique(content, 1), 2);
}

#[test]
fn test_leading_zeros_normalize_to_same_address() {
    assert_eq!(count_unique(b"001.002.003.004\n", 1), 1);
    assert_eq!(parse::parse(b"001.002.003.004"), Some(0x0102_0304));
    // Zero-padded and plain spellings are the same address.
    assert_eq!(count_unique(b"001.002.003.004\n1.2.3.4\n", 2), 1);
}

/// A known multiset of addresses: the count is the underlying set size,
/// independent of ordering and worker count.
#[test]
fn test_known_multiset_across_worker_counts() {
    let mut rng = rand::thread_rng();

    const UNIQUE: usize = 1_000;
    let addrs: Vec<String> = (0..UNIQUE)
        .map(|i| format!("10.{}.{}.{}", i / 256, i % 256, rng.gen_range(0..=255)))
        .collect();
    // The format above can collide on its own; count the real set size.
    let mut packed: Vec<u32> = addrs
        .iter()
        .map(|a| parse::parse(a.as_bytes()).unwrap())
        .collect();
    packed.sort_unstable();
    packed.dedup();
    let expected = packed.len() as u64;

    // Each address appears 1-4 times, shuffled.
    let mut lines: Vec<&String> = Vec::new();
    for a in &addrs {
        for _ in 0..rng.gen_range(1..=4) {
            lines.push(a);
        }
    }
    lines.shuffle(&mut rng);

    let mut content = Vec::new();
    for line in &lines {
        content.extend_from_slice(line.as_bytes());
        content.push(b'\n');
    }

    for workers in [1, 2, 4, 7, 16] {
        assert_eq!(
            count_unique(&content, workers),
            expected,
            "wrong count with {workers} workers"
        );
    }
}

/// Addresses spread over many top-16-bit shards still dedupe exactly.
#[test]
fn test_addresses_across_many_leaves() {
    let mut content = Vec::new();
    for hi in 0..512u32 {
        content.extend_from_slice(format!("{}.{}.0.1\n", hi >> 8, hi & 0xFF).as_bytes());
        // Duplicate every line once.
        content.extend_from_slice(format!("{}.{}.0.1\n", hi >> 8, hi & 0xFF).as_bytes());
    }
    assert_eq!(count_unique(&content, 4), 512);
}

/// Final line without a newline is a trailing fragment and is dropped.
#[test]
fn test_unterminated_final_line_dropped() {
    assert_eq!(count_unique(b"1.1.1.1\n2.2.2.2", 1), 1);
    assert_eq!(count_unique(b"1.1.1.1\n2.2.2.2", 4), 1);
}
