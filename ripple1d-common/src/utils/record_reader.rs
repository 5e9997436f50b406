/*
This code is part of the ripple1d geospatial reach-modeling engine.
License: MIT
*/

use std::io::{Error, ErrorKind};

/// A cursor over the lines of a HEC-RAS text file, generalizing the binary
/// `ByteOrderReader` cursor idiom (position tracking plus typed `read_*`
/// helpers) to line-oriented ASCII records (spec §4.1). The "position" unit
/// here is a line index rather than a byte offset, since every HEC-RAS
/// record block is newline-delimited.
pub struct RecordReader {
    lines: Vec<String>,
    pos: usize,
}

impl RecordReader {
    pub fn new(contents: &str) -> RecordReader {
        RecordReader {
            lines: contents.lines().map(|l| l.to_string()).collect(),
            pos: 0,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn seek(&mut self, position: usize) {
        self.pos = position;
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.lines.len()
    }

    /// Returns the current line without advancing.
    pub fn peek(&self) -> Option<&str> {
        self.lines.get(self.pos).map(|s| s.as_str())
    }

    /// Returns the current line and advances the cursor by one.
    pub fn next_line(&mut self) -> Option<&str> {
        let line = self.lines.get(self.pos).map(|s| s.as_str());
        if line.is_some() {
            self.pos += 1;
        }
        line
    }

    /// Consumes exactly `n` lines, returning them verbatim. Used for the
    /// fixed-width coordinate, station/elevation, and Manning's-n blocks
    /// (spec §4.1), whose line count is derived from a declared record
    /// count rather than stored on disk.
    pub fn take_lines(&mut self, n: usize) -> Result<Vec<String>, Error> {
        if self.pos + n > self.lines.len() {
            return Err(Error::new(
                ErrorKind::UnexpectedEof,
                format!(
                    "expected {} more lines at line {}, only {} remain",
                    n,
                    self.pos,
                    self.lines.len() - self.pos
                ),
            ));
        }
        let out = self.lines[self.pos..self.pos + n].to_vec();
        self.pos += n;
        Ok(out)
    }

    /// Finds the first `KEY=` line at or after the current position without
    /// advancing the cursor, returning its value (the text after `=`).
    pub fn peek_keyed(&self, key: &str) -> Option<&str> {
        let prefix = format!("{}=", key);
        self.lines[self.pos..]
            .iter()
            .find(|l| l.starts_with(&prefix))
            .map(|l| l[prefix.len()..].trim())
    }

    /// Returns every line (with its index) whose text starts with `prefix`,
    /// scanning the whole file regardless of cursor position. Used for
    /// record headers like `River Reach=` or `Junct Name=` that can recur
    /// throughout a geometry file.
    pub fn find_with_prefix(&self, prefix: &str) -> Vec<(usize, &str)> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, l)| l.starts_with(prefix))
            .map(|(i, l)| (i, l.as_str()))
            .collect()
    }

    /// Returns the first line anywhere in the file starting with `prefix`,
    /// with the prefix stripped and the remainder trimmed.
    pub fn find_one_value(&self, prefix: &str) -> Option<&str> {
        self.lines
            .iter()
            .find(|l| l.starts_with(prefix))
            .map(|l| l[prefix.len()..].trim())
    }

    pub fn line_at(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(|s| s.as_str())
    }

    /// Splits a fixed-width record line into `width`-character fields,
    /// right-trimmed, as used for the 32-char coordinate pairs, 16-char
    /// station/elevation pairs, and 24-char Manning's-n triplets (spec
    /// §4.1).
    pub fn split_fixed_width(line: &str, width: usize) -> Vec<String> {
        let chars: Vec<char> = line.chars().collect();
        let mut out = Vec::with_capacity(chars.len() / width + 1);
        let mut i = 0;
        while i < chars.len() {
            let end = (i + width).min(chars.len());
            out.push(chars[i..end].iter().collect::<String>().trim().to_string());
            i += width;
        }
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn take_lines_advances_and_errors_on_underrun() {
        let mut r = RecordReader::new("a\nb\nc\n");
        assert_eq!(r.take_lines(2).unwrap(), vec!["a", "b"]);
        assert_eq!(r.pos(), 2);
        assert!(r.take_lines(5).is_err());
    }

    #[test]
    fn split_fixed_width_handles_16_char_pairs() {
        let line = format!("{:>16}{:>16}", "123.45", "67.89");
        let fields = RecordReader::split_fixed_width(&line, 16);
        assert_eq!(fields, vec!["123.45", "67.89"]);
    }

    #[test]
    fn peek_keyed_finds_ahead_without_advancing() {
        let r = RecordReader::new("A=1\nB=2\nC=3\n");
        assert_eq!(r.peek_keyed("B"), Some("2"));
        assert_eq!(r.pos(), 0);
    }
}
