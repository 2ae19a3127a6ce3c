//! Buffered line reading over one byte range of a shared file.
//!
//! Every read is positional, so any number of readers can work the same
//! `File` handle without touching its cursor.

use std::fs::File;

use crate::error::{CounterError, Result};

/// Line scan buffer. A single line must fit in it.
pub(crate) const SCAN_BUF_SIZE: usize = 2 << 20;

#[cfg(unix)]
pub(crate) fn read_at(file: &File, buf: &mut [u8], off: u64) -> std::io::Result<usize> {
    std::os::unix::fs::FileExt::read_at(file, buf, off)
}

#[cfg(windows)]
pub(crate) fn read_at(file: &File, buf: &mut [u8], off: u64) -> std::io::Result<usize> {
    std::os::windows::fs::FileExt::seek_read(file, buf, off)
}

pub(crate) struct SectionReader<'f> {
    file: &'f File,
    off: u64, // next unread file offset, never past `end`
    end: u64,
    buf: Vec<u8>,
    pos: usize,    // consumed bytes in buf
    filled: usize, // valid bytes in buf
}

impl<'f> SectionReader<'f> {
    pub fn new(file: &'f File, start: u64, end: u64, buf_size: usize) -> Self {
        Self {
            file,
            off: start,
            end,
            buf: vec![0u8; buf_size],
            pos: 0,
            filled: 0,
        }
    }

    /// Next `\n`-terminated line, newline included, borrowed from the
    /// internal buffer. `None` once the range is exhausted; a trailing
    /// fragment with no newline is dropped. A line that cannot fit in the
    /// buffer is an error.
    pub fn next_line(&mut self) -> Result<Option<&[u8]>> {
        let mut scanned = 0; // prefix of the pending line already searched
        let range = loop {
            if let Some(i) = self.buf[self.pos + scanned..self.filled]
                .iter()
                .position(|&b| b == b'\n')
            {
                let start = self.pos;
                let end = self.pos + scanned + i + 1;
                self.pos = end;
                break Some((start, end));
            }
            scanned = self.filled - self.pos;

            // Make room: shift the partial line to the buffer front.
            if self.pos > 0 {
                self.buf.copy_within(self.pos..self.filled, 0);
                self.filled = scanned;
                self.pos = 0;
            }
            if self.filled == self.buf.len() {
                return Err(CounterError::LineTooLong {
                    limit: self.buf.len(),
                    offset: self.off - self.filled as u64,
                });
            }

            let want = (self.buf.len() - self.filled).min((self.end - self.off) as usize);
            if want == 0 {
                break None; // range exhausted
            }
            let n = read_at(
                self.file,
                &mut self.buf[self.filled..self.filled + want],
                self.off,
            )?;
            if n == 0 {
                break None; // file ended inside the range
            }
            self.off += n as u64;
            self.filled += n;
        };
        Ok(range.map(|(s, e)| &self.buf[s..e]))
    }
}
