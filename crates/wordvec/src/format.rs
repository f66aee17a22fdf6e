//! Readers and writers for the two word2vec on-disk layouts.
//!
//! Text: a `"<count> <dims>"` header line, then `term v1 … vdims` per line.
//! Binary: the same header line, then per record the UTF-8 term, one space,
//! `dims` little-endian `f32`s and an optional `\n`.

use std::io::{self, BufRead, Read, Write};
use thiserror::Error;

use crate::Vocabulary;

/// Widest vector a header may declare.
pub const MAX_DIMS: usize = 1 << 16;

/// Upper bound on rows reserved up front; the header count is untrusted.
const PREALLOC_ROWS: usize = 1 << 16;

/// Parse failures for either layout.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("malformed header: {0}")]
    Header(String),
    #[error("line {line}: {reason}")]
    Row { line: usize, reason: String },
    #[error("record {record} is truncated")]
    Truncated { record: usize },
    #[error("record {record} has a term that is not valid UTF-8")]
    Utf8 { record: usize },
    #[error("header declares {expected} records but {actual} were read")]
    Count { expected: usize, actual: usize },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

fn parse_header(line: &str) -> Result<(usize, usize), FormatError> {
    let mut parts = line.split_whitespace();
    let mut next = |name: &str| -> Result<usize, FormatError> {
        parts
            .next()
            .ok_or_else(|| FormatError::Header(format!("missing {name}")))?
            .parse::<usize>()
            .map_err(|e| FormatError::Header(format!("{name}: {e}")))
    };
    let count = next("count")?;
    let dims = next("dimensions")?;
    if dims == 0 {
        return Err(FormatError::Header("dimensions must be positive".into()));
    }
    if dims > MAX_DIMS {
        return Err(FormatError::Header(format!(
            "dimensions {dims} exceed the limit of {MAX_DIMS}"
        )));
    }
    Ok((count, dims))
}

/// Reads the text layout.
pub fn read_text<R: BufRead>(reader: R) -> Result<Vocabulary, FormatError> {
    let mut lines = reader.lines().enumerate();

    let (count, dims) = loop {
        match lines.next() {
            Some((_, line)) => {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                break parse_header(&line)?;
            }
            None => return Err(FormatError::Header("empty file".into())),
        }
    };

    let mut vocab = Vocabulary::with_capacity(dims, count.min(PREALLOC_ROWS));
    let mut vector = Vec::with_capacity(dims);
    let mut rows = 0usize;

    for (idx, line) in lines {
        let line = line?;
        let mut fields = line.split_whitespace();
        let Some(term) = fields.next() else {
            continue;
        };

        vector.clear();
        for field in fields {
            let value = field.parse::<f32>().map_err(|e| FormatError::Row {
                line: idx + 1,
                reason: format!("component {field:?}: {e}"),
            })?;
            vector.push(value);
        }
        if vector.len() != dims {
            return Err(FormatError::Row {
                line: idx + 1,
                reason: format!("expected {dims} components, found {}", vector.len()),
            });
        }

        vocab
            .insert(term, &vector)
            .map_err(|e| FormatError::Row {
                line: idx + 1,
                reason: e.to_string(),
            })?;
        rows += 1;
    }

    if rows != count {
        return Err(FormatError::Count {
            expected: count,
            actual: rows,
        });
    }
    Ok(vocab)
}

/// Reads the binary layout.
pub fn read_binary<R: BufRead>(mut reader: R) -> Result<Vocabulary, FormatError> {
    let mut header = String::new();
    if reader.read_line(&mut header)? == 0 {
        return Err(FormatError::Header("empty file".into()));
    }
    let (count, dims) = parse_header(&header)?;

    let mut vocab = Vocabulary::with_capacity(dims, count.min(PREALLOC_ROWS));
    let mut term_buf = Vec::new();
    let record_bytes = dims
        .checked_mul(4)
        .ok_or_else(|| FormatError::Header(format!("dimensions {dims} overflow")))?;
    let mut raw = vec![0u8; record_bytes];
    let mut vector = vec![0f32; dims];

    for record in 0..count {
        term_buf.clear();
        reader.read_until(b' ', &mut term_buf)?;
        if term_buf.last() != Some(&b' ') {
            return Err(FormatError::Truncated { record });
        }
        term_buf.pop();
        let start = term_buf
            .iter()
            .position(|&b| b != b'\n')
            .unwrap_or(term_buf.len());
        let term =
            std::str::from_utf8(&term_buf[start..]).map_err(|_| FormatError::Utf8 { record })?;

        reader.read_exact(&mut raw).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => FormatError::Truncated { record },
            _ => FormatError::Io(e),
        })?;
        for (slot, bytes) in vector.iter_mut().zip(raw.chunks_exact(4)) {
            *slot = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }

        vocab
            .insert(term, &vector)
            .map_err(|e| FormatError::Row {
                line: record + 2,
                reason: e.to_string(),
            })?;
    }

    Ok(vocab)
}

/// Writes the binary layout. Every record ends with `\n`, as the original tool does.
pub fn write_binary<W: Write>(vocab: &Vocabulary, mut writer: W) -> io::Result<()> {
    writeln!(writer, "{} {}", vocab.len(), vocab.dims())?;
    for (term, vector) in vocab.iter() {
        writer.write_all(term.as_bytes())?;
        writer.write_all(b" ")?;
        for value in vector {
            writer.write_all(&value.to_le_bytes())?;
        }
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TEXT: &str = "3 2\nrust 0.5 -1.25\nownership 1 2\nborrow 3.5 0\n";

    #[test]
    fn reads_text_model() {
        let vocab = read_text(Cursor::new(TEXT)).unwrap();
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.dims(), 2);
        assert_eq!(vocab.get("rust"), Some(&[0.5, -1.25][..]));
        assert_eq!(vocab.get("borrow"), Some(&[3.5, 0.0][..]));
    }

    #[test]
    fn text_tolerates_trailing_spaces_and_blank_lines() {
        let text = "2 2\nrust 1 2 \n\nborrow 3 4\r\n";
        let vocab = read_text(Cursor::new(text)).unwrap();
        assert_eq!(vocab.get("borrow"), Some(&[3.0, 4.0][..]));
    }

    #[test]
    fn text_rejects_short_row() {
        let err = read_text(Cursor::new("1 3\nrust 1 2\n")).unwrap_err();
        assert!(matches!(err, FormatError::Row { line: 2, .. }));
    }

    #[test]
    fn text_rejects_count_mismatch() {
        let err = read_text(Cursor::new("4 2\nrust 1 2\n")).unwrap_err();
        assert!(matches!(
            err,
            FormatError::Count {
                expected: 4,
                actual: 1
            }
        ));
    }

    #[test]
    fn text_rejects_garbage_header() {
        assert!(matches!(
            read_text(Cursor::new("hello world\n")),
            Err(FormatError::Header(_))
        ));
        assert!(matches!(
            read_text(Cursor::new("")),
            Err(FormatError::Header(_))
        ));
    }

    #[test]
    fn binary_matches_text_source() {
        let vocab = read_text(Cursor::new(TEXT)).unwrap();
        let mut bytes = Vec::new();
        write_binary(&vocab, &mut bytes).unwrap();
        assert!(bytes.starts_with(b"3 2\n"));

        let reloaded = read_binary(Cursor::new(bytes)).unwrap();
        assert_eq!(reloaded, vocab);
    }

    #[test]
    fn binary_without_record_newlines() {
        let mut bytes = b"2 1\n".to_vec();
        bytes.extend_from_slice(b"a ");
        bytes.extend_from_slice(&1.5f32.to_le_bytes());
        bytes.extend_from_slice(b"b ");
        bytes.extend_from_slice(&(-2.0f32).to_le_bytes());

        let vocab = read_binary(Cursor::new(bytes)).unwrap();
        assert_eq!(vocab.get("a"), Some(&[1.5][..]));
        assert_eq!(vocab.get("b"), Some(&[-2.0][..]));
    }

    #[test]
    fn oversized_header_is_rejected_not_allocated() {
        let huge = format!("{} 2\n", usize::MAX);
        assert!(matches!(
            read_binary(Cursor::new(huge.clone().into_bytes())),
            Err(FormatError::Truncated { record: 0 })
        ));
        assert!(matches!(
            read_text(Cursor::new(huge)),
            Err(FormatError::Count { actual: 0, .. })
        ));

        let wide = format!("1 {}\n", usize::MAX);
        assert!(matches!(
            read_binary(Cursor::new(wide.clone().into_bytes())),
            Err(FormatError::Header(_))
        ));
        assert!(matches!(read_text(Cursor::new(wide)), Err(FormatError::Header(_))));
    }

    #[test]
    fn binary_detects_truncation() {
        let mut bytes = b"2 2\n".to_vec();
        bytes.extend_from_slice(b"a ");
        bytes.extend_from_slice(&1.0f32.to_le_bytes());
        let err = read_binary(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, FormatError::Truncated { record: 0 }));
    }
}
