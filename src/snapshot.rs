//! Flat binary snapshot of a `Store`.
//!
//! Layout (little-endian; field offsets and padding follow the x86-64 C
//! struct layout the format was first written with):
//!
//! ```text
//! header, 24 bytes
//!   0  u32  magic (0x4D564442)
//!   4  u32  version (1)
//!   8  i32  next identifier
//!  12  4    padding, zero
//!  16  u64  record count
//! record, 232 bytes each
//!   0  i32  identifier
//!   4  100  title, zero-padded
//! 104  50   genre, zero-padded
//! 154  60   director, zero-padded
//! 214  2    padding, zero
//! 216  i32  year
//! 220  i32  duration
//! 224  f64  score
//! ```
//!
//! Loading decodes and validates everything before installing, so a
//! failed load never leaves a partially replaced store behind.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Result, SnapshotError};
use crate::record::{FixedText, Record, RecordFields, RecordId, DIRECTOR_BUF, GENRE_BUF, TITLE_BUF};
use crate::store::Store;

pub const MAGIC: u32 = 0x4D56_4442;
pub const VERSION: u32 = 1;
pub const HEADER_LEN: usize = 24;
pub const RECORD_LEN: usize = 232;

const ID_AT: usize = 0;
const TITLE_AT: usize = 4;
const GENRE_AT: usize = TITLE_AT + TITLE_BUF;
const DIRECTOR_AT: usize = GENRE_AT + GENRE_BUF;
const YEAR_AT: usize = 216;
const DURATION_AT: usize = 220;
const SCORE_AT: usize = 224;

const _: () = assert!(DIRECTOR_AT + DIRECTOR_BUF <= YEAR_AT);
const _: () = assert!(SCORE_AT + 8 == RECORD_LEN);

/// Decoded snapshot contents, not yet installed anywhere.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub next_id: i32,
    pub records: Vec<Record>,
}

fn header(next_id: i32, count: usize) -> [u8; HEADER_LEN] {
    let mut h = [0u8; HEADER_LEN];
    h[0..4].copy_from_slice(&MAGIC.to_le_bytes());
    h[4..8].copy_from_slice(&VERSION.to_le_bytes());
    h[8..12].copy_from_slice(&next_id.to_le_bytes());
    h[16..24].copy_from_slice(&(count as u64).to_le_bytes());
    h
}

fn put_text(buf: &mut [u8], at: usize, s: &str) {
    buf[at..at + s.len()].copy_from_slice(s.as_bytes());
}

fn encode_record(r: &Record, buf: &mut [u8; RECORD_LEN]) {
    buf.fill(0);
    buf[ID_AT..ID_AT + 4].copy_from_slice(&r.id().get().to_le_bytes());
    put_text(buf, TITLE_AT, r.title());
    put_text(buf, GENRE_AT, r.genre());
    put_text(buf, DIRECTOR_AT, r.director());
    buf[YEAR_AT..YEAR_AT + 4].copy_from_slice(&r.year().to_le_bytes());
    buf[DURATION_AT..DURATION_AT + 4].copy_from_slice(&r.duration().to_le_bytes());
    buf[SCORE_AT..SCORE_AT + 8].copy_from_slice(&r.score().to_le_bytes());
}

/// Stream `store` in snapshot format to `w`.
pub fn write<W: Write>(store: &Store, mut w: W) -> std::io::Result<()> {
    w.write_all(&header(store.next_id(), store.len()))?;
    let mut buf = [0u8; RECORD_LEN];
    for r in store.iter() {
        encode_record(r, &mut buf);
        w.write_all(&buf)?;
    }
    Ok(())
}

pub fn encode(store: &Store) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + store.len() * RECORD_LEN);
    write(store, &mut out).expect("writing to a Vec cannot fail");
    out
}

fn u32_at(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(b[at..at + 4].try_into().expect("4-byte slice"))
}

fn i32_at(b: &[u8], at: usize) -> i32 {
    i32::from_le_bytes(b[at..at + 4].try_into().expect("4-byte slice"))
}

fn u64_at(b: &[u8], at: usize) -> u64 {
    u64::from_le_bytes(b[at..at + 8].try_into().expect("8-byte slice"))
}

fn f64_at(b: &[u8], at: usize) -> f64 {
    f64::from_le_bytes(b[at..at + 8].try_into().expect("8-byte slice"))
}

fn text_at<const BUF: usize>(
    b: &[u8],
    at: usize,
    index: usize,
    field: &'static str,
) -> Result<FixedText<BUF>> {
    let raw = &b[at..at + BUF];
    let end = raw.iter().position(|&c| c == 0).unwrap_or(BUF);
    let s = match std::str::from_utf8(&raw[..end]) {
        Ok(s) => s,
        // A multi-byte character clipped by the buffer limit: keep the
        // complete prefix, as `FixedText::truncating` does.
        Err(e) if e.error_len().is_none() => std::str::from_utf8(&raw[..e.valid_up_to()])
            .map_err(|_| SnapshotError::InvalidText { index, field })?,
        Err(_) => return Err(SnapshotError::InvalidText { index, field }),
    };
    // An unterminated buffer is one byte over the limit and is rejected here.
    FixedText::new(s).map_err(|_| SnapshotError::InvalidText { index, field })
}

fn decode_record(b: &[u8], index: usize) -> Result<Record> {
    let raw_id = i32_at(b, ID_AT);
    let id = RecordId::new(raw_id).ok_or(SnapshotError::InvalidId { index, id: raw_id })?;
    let fields = RecordFields {
        title: text_at::<TITLE_BUF>(b, TITLE_AT, index, "title")?,
        genre: text_at::<GENRE_BUF>(b, GENRE_AT, index, "genre")?,
        director: text_at::<DIRECTOR_BUF>(b, DIRECTOR_AT, index, "director")?,
        year: i32_at(b, YEAR_AT),
        duration: i32_at(b, DURATION_AT),
        score: f64_at(b, SCORE_AT),
    };
    Ok(Record::new(id, fields))
}

/// Parse and validate a snapshot. Trailing bytes after the last record
/// are ignored.
pub fn decode(bytes: &[u8]) -> Result<Snapshot> {
    if bytes.len() < HEADER_LEN {
        return Err(SnapshotError::TruncatedHeader {
            expected: HEADER_LEN,
            available: bytes.len(),
        });
    }
    let magic = u32_at(bytes, 0);
    if magic != MAGIC {
        return Err(SnapshotError::BadMagic {
            found: magic,
            expected: MAGIC,
        });
    }
    let version = u32_at(bytes, 4);
    if version != VERSION {
        return Err(SnapshotError::UnsupportedVersion(version));
    }
    let next_id = i32_at(bytes, 8);
    let count = u64_at(bytes, 16);

    let body = &bytes[HEADER_LEN..];
    let needed = count.checked_mul(RECORD_LEN as u64).unwrap_or(u64::MAX);
    if needed > body.len() as u64 {
        return Err(SnapshotError::TruncatedRecords {
            count,
            expected: needed,
            available: body.len() as u64,
        });
    }

    // `needed` fits in the slice length, so `count` fits in usize.
    let records = body
        .chunks_exact(RECORD_LEN)
        .take(count as usize)
        .enumerate()
        .map(|(i, chunk)| decode_record(chunk, i))
        .collect::<Result<Vec<_>>>()?;

    Ok(Snapshot { next_id, records })
}

impl Store {
    /// Replace this store's contents with a decoded snapshot.
    pub fn install(&mut self, snapshot: Snapshot) -> Result<()> {
        self.bulk_replace(snapshot.records, snapshot.next_id)
    }

    /// Replace this store's contents from snapshot bytes. On error the
    /// store is unchanged.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let snapshot = decode(bytes)?;
        self.install(snapshot)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        encode(self)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut w = BufWriter::new(File::create(path)?);
        write(self, &mut w)?;
        w.flush()?;
        tracing::debug!(path = %path.display(), records = self.len(), "snapshot.save");
        Ok(())
    }

    /// Replace this store's contents from a snapshot file. On error the
    /// store is unchanged.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        self.load_bytes(&bytes)?;
        tracing::debug!(path = %path.display(), records = self.len(), "snapshot.load");
        Ok(())
    }
}
