//! Byte-range planning: cut the file into one shard per worker, with every
//! boundary after the first moved forward onto a line start so no line is
//! ever seen by two workers.

use std::fs::File;

use crate::error::Result;

use super::section::read_at;

/// Window for the newline search at shard boundaries.
const ALIGN_BUF_SIZE: usize = 64 << 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shard {
    pub start: u64,
    pub end: u64,
}

/// Plan shards tiling `[0, size)`. Each shard after the first starts one
/// byte past a newline (its predecessor absorbs the skipped bytes), so a
/// scanner can start parsing immediately.
pub fn split_to_shards(file: &File, size: u64, workers: usize) -> Result<Vec<Shard>> {
    if size == 0 {
        return Ok(Vec::new());
    }
    let mut n = workers.max(1);
    if n as u64 > size {
        n = 1;
    }
    let mut part = size / n as u64;
    if part == 0 {
        n = 1;
        part = size;
    }

    let mut shards: Vec<Shard> = Vec::with_capacity(n);
    let mut start = 0u64;
    for i in 0..n {
        let mut end = start + part;
        if i == n - 1 || end > size {
            end = size;
        }

        let mut cur = Shard { start, end };
        if i > 0 {
            let aligned = move_start_to_newline(file, cur)?;
            shards[i - 1].end = aligned.start;
            cur = aligned;
        }
        shards.push(cur);
        start = end;
    }
    Ok(shards)
}

/// Advance `start` one byte past the first `\n` at or after it, never
/// looking past the shard's own end. A region with no newline collapses the
/// shard to `[end, end)`.
fn move_start_to_newline(file: &File, s: Shard) -> Result<Shard> {
    if s.start == 0 {
        return Ok(s);
    }
    let mut buf = vec![0u8; ALIGN_BUF_SIZE];
    let mut off = s.start;
    while off < s.end {
        let want = buf.len().min((s.end - off) as usize);
        let n = read_at(file, &mut buf[..want], off)?;
        if n == 0 {
            break; // file ended early
        }
        if let Some(i) = buf[..n].iter().position(|&b| b == b'\n') {
            return Ok(Shard {
                start: off + i as u64 + 1,
                end: s.end,
            });
        }
        off += n as u64;
    }
    Ok(Shard {
        start: s.end,
        end: s.end,
    })
}
