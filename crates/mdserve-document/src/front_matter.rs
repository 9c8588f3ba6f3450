//! Front matter parsing.
//!
//! A document may start with a block of `Key: Value` lines terminated by a
//! blank line, using MIME header rules:
//!
//! ```text
//! Title: Example Page
//! Created: 2019-03-01
//!
//! ## Your Markdown Here
//! ```
//!
//! Lines starting with a space or tab continue the previous value. Anything
//! that doesn't fit this shape (a line without a `key:`, or a stream ending
//! before the blank line) means the document has no front matter, and the
//! whole stream is its content.

use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};

use crate::attributes::{Attributes, canonical_key};

/// Document split into attributes and Markdown content.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrontMatter {
    /// Parsed attributes, empty if there was no front matter.
    pub attributes: Attributes,
    /// Bytes after the front matter block.
    pub content: Vec<u8>,
}

/// Split a document stream into front matter and content.
///
/// When no front matter block is found the stream is rewound and read in
/// full, so `reader` must be positioned at its start.
///
/// # Errors
///
/// Returns the underlying [`io::Error`] if reading or rewinding fails.
pub fn parse<R: Read + Seek + ?Sized>(reader: &mut R) -> io::Result<FrontMatter> {
    let mut buffered = BufReader::new(&mut *reader);

    if let Some(attributes) = read_header(&mut buffered)? {
        let mut content = Vec::new();
        buffered.read_to_end(&mut content)?;
        return Ok(FrontMatter {
            attributes,
            content,
        });
    }

    drop(buffered);
    reader.seek(SeekFrom::Start(0))?;
    let mut content = Vec::new();
    reader.read_to_end(&mut content)?;

    Ok(FrontMatter {
        attributes: Attributes::new(),
        content,
    })
}

/// Read a header block up to and including its terminating blank line.
///
/// Returns `None` if the block is malformed or never terminated.
fn read_header(reader: &mut impl BufRead) -> io::Result<Option<Attributes>> {
    let mut attributes = Attributes::new();
    let mut last_key: Option<String> = None;
    let mut raw = Vec::new();

    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw)? == 0 {
            tracing::trace!("Front matter not terminated, treating as content");
            return Ok(None);
        }
        let line = trim_line_ending(&raw);

        if line.is_empty() {
            return Ok(Some(attributes));
        }

        if matches!(line[0], b' ' | b'\t') {
            let Some(value) = last_key.as_deref().and_then(|k| attributes.last_value_mut(k))
            else {
                return Ok(None);
            };
            let continuation = String::from_utf8_lossy(line);
            let continuation = continuation.trim_matches([' ', '\t']);
            if !continuation.is_empty() {
                value.push(' ');
                value.push_str(continuation);
            }
            continue;
        }

        let Some(colon) = line.iter().position(|&b| b == b':') else {
            return Ok(None);
        };
        let (key, value) = (&line[..colon], &line[colon + 1..]);
        if key.is_empty() || !key.iter().copied().all(is_token_byte) {
            return Ok(None);
        }

        // Token bytes are ASCII.
        let key = canonical_key(&String::from_utf8_lossy(key));
        let value = String::from_utf8_lossy(value);
        attributes.insert(&key, value.trim_matches([' ', '\t']));
        last_key = Some(key);
    }
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// HTTP token character, the only bytes allowed in a key.
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_str(input: &str) -> FrontMatter {
        parse(&mut Cursor::new(input.as_bytes().to_vec())).unwrap()
    }

    fn content(fm: &FrontMatter) -> &str {
        std::str::from_utf8(&fm.content).unwrap()
    }

    #[test]
    fn test_no_front_matter() {
        let input = "# Heading\n\nSome text.\n";

        let fm = parse_str(input);

        assert!(fm.attributes.is_empty());
        assert_eq!(content(&fm), input);
    }

    #[test]
    fn test_title_header() {
        let fm = parse_str("Title: Hello\n\n# Heading\n");

        assert_eq!(fm.attributes.get("Title"), "Hello");
        assert_eq!(content(&fm), "# Heading\n");
    }

    #[test]
    fn test_multiple_headers_and_case() {
        let fm = parse_str("title: Hello\ncreated:2019-03-01\n\nbody");

        assert_eq!(fm.attributes.get("TITLE"), "Hello");
        assert_eq!(fm.attributes.get("Created"), "2019-03-01");
        assert_eq!(content(&fm), "body");
    }

    #[test]
    fn test_continuation_line_folds() {
        let fm = parse_str("Summary: first\n  second\n\tthird\n\nbody");

        assert_eq!(fm.attributes.get("Summary"), "first second third");
    }

    #[test]
    fn test_crlf_line_endings() {
        let fm = parse_str("Title: Hello\r\n\r\nbody\r\n");

        assert_eq!(fm.attributes.get("Title"), "Hello");
        assert_eq!(content(&fm), "body\r\n");
    }

    #[test]
    fn test_empty_header_block() {
        let fm = parse_str("\n# Heading\n");

        assert!(fm.attributes.is_empty());
        assert_eq!(content(&fm), "# Heading\n");
    }

    #[test]
    fn test_unterminated_header_is_content() {
        let input = "Title: Hello";

        let fm = parse_str(input);

        assert!(fm.attributes.is_empty());
        assert_eq!(content(&fm), input);
    }

    #[test]
    fn test_malformed_second_line_rewinds() {
        let input = "Title: Hello\nnot a header\n\nbody\n";

        let fm = parse_str(input);

        assert!(fm.attributes.is_empty());
        assert_eq!(content(&fm), input);
    }

    #[test]
    fn test_key_with_space_is_not_header() {
        let input = "# Title: with colon\n\nbody\n";

        let fm = parse_str(input);

        assert!(fm.attributes.is_empty());
        assert_eq!(content(&fm), input);
    }

    #[test]
    fn test_leading_continuation_is_not_header() {
        let input = "  indented: x\n\nbody\n";

        let fm = parse_str(input);

        assert!(fm.attributes.is_empty());
        assert_eq!(content(&fm), input);
    }

    #[test]
    fn test_empty_stream() {
        let fm = parse_str("");

        assert!(fm.attributes.is_empty());
        assert!(fm.content.is_empty());
    }

    /// Reader that fails after the first read.
    struct FailingReader {
        inner: Cursor<Vec<u8>>,
        reads: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            if self.reads > 1 {
                return Err(io::Error::other("device gone"));
            }
            let n = buf.len().min(4);
            self.inner.read(&mut buf[..n])
        }
    }

    impl Seek for FailingReader {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    #[test]
    fn test_read_error_is_reported() {
        let mut reader = FailingReader {
            inner: Cursor::new(b"Title: Hello\n\nbody".to_vec()),
            reads: 0,
        };

        let err = parse(&mut reader).unwrap_err();

        assert_eq!(err.to_string(), "device gone");
    }
}
