//! Buffered source reader (component C).
//!
//! The whole file is read into memory on open; thereafter every operation
//! is a pure cursor movement over the in-memory buffer (Design Note 9:
//! "direct indexing into the fully read buffer ... matches the source's
//! in-memory design").

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderStatus {
    Success,
    InvalidReference,
    FileNotFound,
    FileAccessDenied,
    FileEmpty,
    PastEof,
    AllocationFailed,
    IoError,
}

impl fmt::Display for ReaderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ReaderStatus::Success => "success",
            ReaderStatus::InvalidReference => "invalid reference",
            ReaderStatus::FileNotFound => "file not found",
            ReaderStatus::FileAccessDenied => "file access denied",
            ReaderStatus::FileEmpty => "file is empty",
            ReaderStatus::PastEof => "attempt to read past end of file",
            ReaderStatus::AllocationFailed => "allocation failed",
            ReaderStatus::IoError => "I/O subsystem error",
        };
        write!(f, "{}", msg)
    }
}

impl std::error::Error for ReaderStatus {}

/// One logical character's worth of lookahead: every line-terminator form
/// (LF, CR, CR-LF) is normalized to `'\n'` for consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookahead {
    pub ch: char,
    /// Number of raw bytes this logical character spans in the buffer
    /// (2 for CR-LF, 1 otherwise).
    pub width: usize,
}

pub struct SourceReader {
    path: PathBuf,
    buffer: Vec<u8>,
    cursor: usize,
    line: u32,
    column: u32,
    mark: Option<usize>,
    status: ReaderStatus,
}

impl SourceReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ReaderStatus> {
        let path = path.as_ref().to_path_buf();
        let buffer = match fs::read(&path) {
            Ok(b) => b,
            Err(e) => {
                return Err(match e.kind() {
                    io::ErrorKind::NotFound => ReaderStatus::FileNotFound,
                    io::ErrorKind::PermissionDenied => ReaderStatus::FileAccessDenied,
                    _ => ReaderStatus::IoError,
                })
            }
        };
        if buffer.is_empty() {
            return Err(ReaderStatus::FileEmpty);
        }
        Ok(Self {
            path,
            buffer,
            cursor: 0,
            line: 1,
            column: 1,
            mark: None,
            status: ReaderStatus::Success,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn status(&self) -> ReaderStatus {
        self.status
    }

    pub fn current_line(&self) -> u32 {
        self.line
    }

    pub fn current_column(&self) -> u32 {
        self.column
    }

    fn peek_raw(&self, at: usize) -> Option<(char, usize)> {
        if at >= self.buffer.len() {
            return None;
        }
        match self.buffer[at] {
            b'\r' if self.buffer.get(at + 1) == Some(&b'\n') => Some(('\n', 2)),
            b'\r' => Some(('\n', 1)),
            b => Some((b as char, 1)),
        }
    }

    /// One-character lookahead without consuming.
    pub fn next_char(&mut self) -> Option<Lookahead> {
        match self.peek_raw(self.cursor) {
            Some((ch, width)) => {
                self.status = ReaderStatus::Success;
                Some(Lookahead { ch, width })
            }
            None => {
                self.status = ReaderStatus::PastEof;
                None
            }
        }
    }

    /// Two-character lookahead without consuming.
    pub fn la2_char(&mut self) -> Option<Lookahead> {
        let first = self.peek_raw(self.cursor)?;
        self.peek_raw(self.cursor + first.1).map(|(ch, width)| Lookahead { ch, width })
    }

    /// Advance the cursor past exactly one logical character, updating
    /// line/column tracking. CR and CR-LF both advance past the whole
    /// terminator and increment the line.
    pub fn read_char(&mut self) -> Option<Lookahead> {
        let la = self.next_char()?;
        self.cursor += la.width;
        if la.ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(la)
    }

    /// Alias kept for the consume-without-return usage pattern.
    pub fn consume_char(&mut self) -> bool {
        self.read_char().is_some()
    }

    pub fn mark_lexeme(&mut self) {
        self.mark = Some(self.cursor);
    }

    /// Return the bytes spanned since [`Self::mark_lexeme`], clearing the
    /// mark. Fails if no mark is set or the span is empty.
    pub fn read_marked_lexeme(&mut self) -> Result<&[u8], ReaderStatus> {
        let start = self.mark.take().ok_or(ReaderStatus::InvalidReference)?;
        if start >= self.cursor {
            return Err(ReaderStatus::InvalidReference);
        }
        Ok(&self.buffer[start..self.cursor])
    }

    /// Return the `n`th (1-based) source line, for diagnostics.
    pub fn source_for_line(&self, n: u32) -> Option<&str> {
        if n == 0 {
            return None;
        }
        let text = std::str::from_utf8(&self.buffer).ok()?;
        text.split(['\n']).map(|l| l.trim_end_matches('\r')).nth((n - 1) as usize)
    }

    pub fn at_eof(&self) -> bool {
        self.cursor >= self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn missing_file_is_an_error() {
        assert_eq!(
            SourceReader::open("/no/such/path/does-not-exist.mod").unwrap_err(),
            ReaderStatus::FileNotFound
        );
    }

    #[test]
    fn empty_file_is_an_error() {
        let f = temp_file(b"");
        assert_eq!(SourceReader::open(f.path()).unwrap_err(), ReaderStatus::FileEmpty);
    }

    #[test]
    fn cr_lf_and_lone_cr_and_lf_all_normalize_to_lf() {
        for body in [&b"a\r\nb"[..], &b"a\rb"[..], &b"a\nb"[..]] {
            let f = temp_file(body);
            let mut r = SourceReader::open(f.path()).unwrap();
            assert_eq!(r.read_char().unwrap().ch, 'a');
            assert_eq!(r.read_char().unwrap().ch, '\n');
            assert_eq!(r.read_char().unwrap().ch, 'b');
            assert!(r.read_char().is_none());
        }
    }

    #[test]
    fn line_accounting_counts_terminators() {
        let f = temp_file(b"a\nb\r\nc\rd");
        let mut r = SourceReader::open(f.path()).unwrap();
        while r.read_char().is_some() {}
        assert_eq!(r.current_line(), 4);
    }

    #[test]
    fn mark_and_read_marked_lexeme() {
        let f = temp_file(b"hello world");
        let mut r = SourceReader::open(f.path()).unwrap();
        r.mark_lexeme();
        for _ in 0..5 {
            r.read_char();
        }
        let lexeme = r.read_marked_lexeme().unwrap().to_vec();
        assert_eq!(&lexeme, b"hello");
    }

    #[test]
    fn reading_without_mark_fails() {
        let f = temp_file(b"abc");
        let mut r = SourceReader::open(f.path()).unwrap();
        assert_eq!(r.read_marked_lexeme().unwrap_err(), ReaderStatus::InvalidReference);
    }

    #[test]
    fn source_for_line_returns_requested_line() {
        let f = temp_file(b"one\ntwo\nthree");
        let r = SourceReader::open(f.path()).unwrap();
        assert_eq!(r.source_for_line(2), Some("two"));
        assert_eq!(r.source_for_line(4), None);
    }

    #[test]
    fn la2_char_does_not_consume() {
        let f = temp_file(b"ab");
        let mut r = SourceReader::open(f.path()).unwrap();
        assert_eq!(r.la2_char().unwrap().ch, 'b');
        assert_eq!(r.next_char().unwrap().ch, 'a');
    }
}
