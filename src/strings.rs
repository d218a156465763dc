//! Interned string repository (component A).
//!
//! Modula-2 identifiers and lexemes are content-addressed: two handles are
//! equal if and only if the underlying bytes are equal, so every other
//! component (the symbol table in particular) can compare identifiers by
//! handle rather than by byte string. Unlike a process-wide singleton, the
//! repository here is an ordinary owned value held by the top-level
//! session (Design Note 9) — there is no global mutable state, which keeps
//! the crate usable from more than one caller in the same process.

use rustc_hash::FxHashMap;
use std::fmt;

/// Entries longer than this are rejected with [`InternError::SizeLimitExceeded`].
pub const MAX_STRING_LENGTH: usize = 2000;

/// A handle into a [`StringRepo`]. Equal content always produces an equal
/// `StringId`; unequal content always produces a distinct one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StringId(u32);

impl fmt::Display for StringId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternError {
    InvalidReference,
    InvalidIndices,
    AllocationFailed,
    SizeLimitExceeded,
}

impl fmt::Display for InternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InternError::InvalidReference => write!(f, "invalid string reference"),
            InternError::InvalidIndices => write!(f, "slice contains non-printable byte"),
            InternError::AllocationFailed => write!(f, "allocation failed"),
            InternError::SizeLimitExceeded => write!(f, "string exceeds maximum length"),
        }
    }
}

impl std::error::Error for InternError {}

/// Streaming byte hash shared with the symbol table (`symtab::hash`). Any
/// pure function of the byte sequence satisfies the spec; this is FNV-1a.
pub fn hash_initial() -> u64 {
    0xcbf29ce484222325
}

pub fn hash_next(state: u64, byte: u8) -> u64 {
    (state ^ byte as u64).wrapping_mul(0x100000001b3)
}

pub fn hash_final(state: u64) -> u64 {
    state
}

pub fn hash_bytes(bytes: &[u8]) -> u64 {
    hash_final(bytes.iter().fold(hash_initial(), |s, &b| hash_next(s, b)))
}

struct Entry {
    bytes: Box<[u8]>,
    hash: u64,
    refcount: u32,
}

/// The repository itself. `size` buckets are reserved up front purely as a
/// capacity hint; the backing map grows as needed.
pub struct StringRepo {
    by_content: FxHashMap<Box<[u8]>, StringId>,
    entries: Vec<Option<Entry>>,
}

impl StringRepo {
    /// `size` of 0 selects a small default capacity.
    pub fn new(size: usize) -> Self {
        let cap = if size == 0 { 64 } else { size };
        Self {
            by_content: FxHashMap::with_capacity_and_hasher(cap, Default::default()),
            entries: Vec::with_capacity(cap),
        }
    }

    fn is_printable(bytes: &[u8]) -> bool {
        bytes.iter().all(|&b| (32..=126).contains(&b))
    }

    /// Intern `bytes`, creating and retaining a fresh entry on miss, or
    /// retaining the existing one on hit.
    pub fn get(&mut self, bytes: &[u8]) -> Result<StringId, InternError> {
        if bytes.len() > MAX_STRING_LENGTH {
            return Err(InternError::SizeLimitExceeded);
        }
        if let Some(&id) = self.by_content.get(bytes) {
            self.entries[id.0 as usize].as_mut().unwrap().refcount += 1;
            return Ok(id);
        }
        let hash = hash_bytes(bytes);
        let entry = Entry {
            bytes: bytes.into(),
            hash,
            refcount: 1,
        };
        let id = StringId(self.entries.len() as u32);
        self.entries.push(Some(entry));
        self.by_content.insert(bytes.into(), id);
        Ok(id)
    }

    /// Intern a printable-ASCII substring `source[offset..offset+length]`.
    pub fn get_slice(
        &mut self,
        source: &[u8],
        offset: usize,
        length: usize,
    ) -> Result<StringId, InternError> {
        let end = offset
            .checked_add(length)
            .ok_or(InternError::InvalidIndices)?;
        let slice = source.get(offset..end).ok_or(InternError::InvalidIndices)?;
        if !Self::is_printable(slice) {
            return Err(InternError::InvalidIndices);
        }
        self.get(slice)
    }

    /// Intern the concatenation `a ++ b` of two already-interned handles.
    pub fn get_concat(&mut self, a: StringId, b: StringId) -> Result<StringId, InternError> {
        let mut buf = Vec::with_capacity(self.length(a)? + self.length(b)?);
        buf.extend_from_slice(self.as_bytes(a)?);
        buf.extend_from_slice(self.as_bytes(b)?);
        self.get(&buf)
    }

    pub fn as_bytes(&self, id: StringId) -> Result<&[u8], InternError> {
        self.entries
            .get(id.0 as usize)
            .and_then(|e| e.as_ref())
            .map(|e| &e.bytes[..])
            .ok_or(InternError::InvalidReference)
    }

    pub fn as_str(&self, id: StringId) -> Result<&str, InternError> {
        // Source is restricted to printable ASCII plus the interned string
        // never contains a byte outside that range, so this is infallible
        // in practice; surface it as InvalidReference rather than panic.
        std::str::from_utf8(self.as_bytes(id)?).map_err(|_| InternError::InvalidReference)
    }

    pub fn length(&self, id: StringId) -> Result<usize, InternError> {
        self.entries
            .get(id.0 as usize)
            .and_then(|e| e.as_ref())
            .map(|e| e.bytes.len())
            .ok_or(InternError::InvalidReference)
    }

    /// The hash computed at intern time, shared with the symbol table's
    /// bucket index arithmetic.
    pub fn hash_of(&self, id: StringId) -> Result<u64, InternError> {
        self.entries
            .get(id.0 as usize)
            .and_then(|e| e.as_ref())
            .map(|e| e.hash)
            .ok_or(InternError::InvalidReference)
    }

    pub fn retain(&mut self, id: StringId) -> Result<(), InternError> {
        self.entries
            .get_mut(id.0 as usize)
            .and_then(|e| e.as_mut())
            .map(|e| e.refcount += 1)
            .ok_or(InternError::InvalidReference)
    }

    /// Decrement the refcount; at zero, remove the entry from the table and
    /// deallocate it. The slot's index is never reused.
    pub fn release(&mut self, id: StringId) -> Result<(), InternError> {
        let slot = self
            .entries
            .get_mut(id.0 as usize)
            .ok_or(InternError::InvalidReference)?;
        let entry = slot.as_mut().ok_or(InternError::InvalidReference)?;
        entry.refcount -= 1;
        if entry.refcount == 0 {
            let bytes = entry.bytes.clone();
            self.by_content.remove(&bytes);
            *slot = None;
        }
        Ok(())
    }

    /// Number of live (non-released) entries.
    pub fn count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_content_yields_equal_handle() {
        let mut repo = StringRepo::new(0);
        let a = repo.get(b"MODULE").unwrap();
        let b = repo.get(b"MODULE").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unequal_content_yields_distinct_handle() {
        let mut repo = StringRepo::new(0);
        let a = repo.get(b"MODULE").unwrap();
        let b = repo.get(b"CONST").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn release_at_zero_refcount_frees_entry() {
        let mut repo = StringRepo::new(0);
        let a = repo.get(b"x").unwrap();
        assert_eq!(repo.count(), 1);
        repo.release(a).unwrap();
        assert_eq!(repo.count(), 0);
        assert!(repo.as_bytes(a).is_err());
    }

    #[test]
    fn retain_keeps_entry_alive_across_one_release() {
        let mut repo = StringRepo::new(0);
        let a = repo.get(b"x").unwrap();
        repo.retain(a).unwrap();
        repo.release(a).unwrap();
        assert_eq!(repo.count(), 1);
        repo.release(a).unwrap();
        assert_eq!(repo.count(), 0);
    }

    #[test]
    fn slice_rejects_non_printable_bytes() {
        let mut repo = StringRepo::new(0);
        let err = repo.get_slice(b"abc\x01def", 0, 7).unwrap_err();
        assert_eq!(err, InternError::InvalidIndices);
    }

    #[test]
    fn concat_interns_joined_bytes() {
        let mut repo = StringRepo::new(0);
        let a = repo.get(b"foo").unwrap();
        let b = repo.get(b"bar").unwrap();
        let ab = repo.get_concat(a, b).unwrap();
        assert_eq!(repo.as_str(ab).unwrap(), "foobar");
    }

    #[test]
    fn size_limit_is_enforced() {
        let mut repo = StringRepo::new(0);
        let big = vec![b'a'; MAX_STRING_LENGTH + 1];
        assert_eq!(repo.get(&big).unwrap_err(), InternError::SizeLimitExceeded);
    }

    #[test]
    fn hash_is_pure_function_of_content() {
        assert_eq!(hash_bytes(b"hello"), hash_bytes(b"hello"));
        assert_ne!(hash_bytes(b"hello"), hash_bytes(b"world"));
    }
}
