//! Record types: identifier, bounded text fields, and the record itself.

use crate::error::FieldError;
use core::fmt;

/// Identifier assigned by the store. Always positive.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RecordId(i32);

impl RecordId {
    /// Wrap a raw identifier. Returns `None` for zero or negative values.
    pub fn new(raw: i32) -> Option<Self> {
        (raw > 0).then_some(RecordId(raw))
    }

    pub fn get(self) -> i32 {
        self.0
    }

    /// Bit pattern fed to the index hash.
    #[inline]
    pub(crate) fn hash_bits(self) -> u32 {
        self.0 as u32
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Owned UTF-8 text that fits a zero-terminated buffer of `BUF` bytes.
///
/// The contract is enforced at construction: at most `BUF - 1` bytes and
/// no interior NUL, so the value always round-trips through the
/// fixed-width snapshot layout.
#[derive(Clone, Default, Eq, PartialEq, Hash)]
pub struct FixedText<const BUF: usize>(String);

impl<const BUF: usize> FixedText<BUF> {
    /// Largest accepted length in bytes.
    pub const MAX_LEN: usize = BUF - 1;

    pub fn new(s: impl Into<String>) -> Result<Self, FieldError> {
        let s = s.into();
        if s.len() > Self::MAX_LEN {
            return Err(FieldError::TooLong {
                max: Self::MAX_LEN,
                len: s.len(),
            });
        }
        if s.contains('\0') {
            return Err(FieldError::InteriorNul);
        }
        Ok(FixedText(s))
    }

    /// Clip `s` to the limit on a char boundary and cut at the first NUL.
    pub fn truncating(s: &str) -> Self {
        let s = s.split('\0').next().unwrap_or_default();
        let mut end = s.len().min(Self::MAX_LEN);
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        FixedText(s[..end].to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl<const BUF: usize> fmt::Debug for FixedText<BUF> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<const BUF: usize> fmt::Display for FixedText<BUF> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<const BUF: usize> AsRef<str> for FixedText<BUF> {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<const BUF: usize> TryFrom<&str> for FixedText<BUF> {
    type Error = FieldError;
    fn try_from(s: &str) -> Result<Self, FieldError> {
        Self::new(s)
    }
}

/// On-disk buffer sizes, terminator included.
pub const TITLE_BUF: usize = 100;
pub const GENRE_BUF: usize = 50;
pub const DIRECTOR_BUF: usize = 60;

pub type Title = FixedText<TITLE_BUF>;
pub type Genre = FixedText<GENRE_BUF>;
pub type Director = FixedText<DIRECTOR_BUF>;

/// The editable part of a record. Range checks on the numeric fields
/// belong to whoever collects the input.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordFields {
    pub title: Title,
    pub genre: Genre,
    pub director: Director,
    pub year: i32,
    /// Running time in minutes.
    pub duration: i32,
    pub score: f64,
}

impl RecordFields {
    pub fn new(
        title: &str,
        genre: &str,
        director: &str,
        year: i32,
        duration: i32,
        score: f64,
    ) -> Result<Self, FieldError> {
        Ok(Self {
            title: Title::new(title).map_err(|e| e.in_field("title"))?,
            genre: Genre::new(genre).map_err(|e| e.in_field("genre"))?,
            director: Director::new(director).map_err(|e| e.in_field("director"))?,
            year,
            duration,
            score,
        })
    }
}

/// A stored record. Equality compares identifiers only.
#[derive(Clone, Debug)]
pub struct Record {
    id: RecordId,
    fields: RecordFields,
}

impl Record {
    pub fn new(id: RecordId, fields: RecordFields) -> Self {
        Self { id, fields }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }
    pub fn fields(&self) -> &RecordFields {
        &self.fields
    }
    pub(crate) fn fields_mut(&mut self) -> &mut RecordFields {
        &mut self.fields
    }
    pub fn into_fields(self) -> RecordFields {
        self.fields
    }

    pub fn title(&self) -> &str {
        self.fields.title.as_str()
    }
    pub fn genre(&self) -> &str {
        self.fields.genre.as_str()
    }
    pub fn director(&self) -> &str {
        self.fields.director.as_str()
    }
    pub fn year(&self) -> i32 {
        self.fields.year
    }
    pub fn duration(&self) -> i32 {
        self.fields.duration
    }
    pub fn score(&self) -> f64 {
        self.fields.score
    }

    /// Case-insensitive substring match on title, genre, or director.
    pub fn matches(&self, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        [self.title(), self.genre(), self.director()]
            .iter()
            .any(|hay| hay.to_lowercase().contains(&needle))
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Record {}
