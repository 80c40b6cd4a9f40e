//! Token-level scan of content streams.
//!
//! lopdf's content parser stops at the first token it cannot read and
//! returns the operations before it as a success. This scan walks the same
//! bytes, rejects unbalanced strings, arrays and dictionaries, and counts
//! the operators a complete decode must produce. Inline images are cut out
//! so each remaining segment can be decoded on its own.

use std::ops::Range;

use crate::error::{Error, Result};

/// Content between inline images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub range: Range<usize>,
    /// Top-level operators in the segment
    pub operators: usize,
}

fn is_whitespace(c: u8) -> bool {
    b" \t\n\r\0\x0C".contains(&c)
}

fn is_delimiter(c: u8) -> bool {
    b"()<>[]{}/%".contains(&c)
}

fn is_regular(c: u8) -> bool {
    !is_whitespace(c) && !is_delimiter(c)
}

/// Numbers and the `true`/`false`/`null` keywords are operands.
fn is_operand_token(token: &[u8]) -> bool {
    matches!(token, b"true" | b"false" | b"null")
        || token
            .iter()
            .all(|c| c.is_ascii_digit() || b"+-.".contains(c))
}

fn malformed(what: &str, at: usize) -> Error {
    Error::parse(format!("content stream: {} at byte {}", what, at))
}

fn skip_regular(data: &[u8], mut i: usize) -> usize {
    while i < data.len() && is_regular(data[i]) {
        i += 1;
    }
    i
}

/// Index just past the literal string opening at `open`.
fn skip_literal_string(data: &[u8], open: usize) -> Result<usize> {
    let mut level = 0usize;
    let mut i = open;
    while i < data.len() {
        match data[i] {
            b'\\' => i += 1,
            b'(' => level += 1,
            b')' => {
                level -= 1;
                if level == 0 {
                    return Ok(i + 1);
                }
            }
            _ => {}
        }
        i += 1;
    }
    Err(malformed("unterminated string", open))
}

/// Index just past the hex string opening at `open`.
fn skip_hex_string(data: &[u8], open: usize) -> Result<usize> {
    for (offset, &c) in data[open + 1..].iter().enumerate() {
        if c == b'>' {
            return Ok(open + offset + 2);
        }
        if !c.is_ascii_hexdigit() && !is_whitespace(c) {
            return Err(malformed("malformed hex string", open));
        }
    }
    Err(malformed("unterminated hex string", open))
}

/// Position of `keyword` standing alone as a token at or after `from`.
fn find_keyword(data: &[u8], from: usize, keyword: &[u8]) -> Option<usize> {
    (from..data.len()).find(|&i| {
        data[i..].starts_with(keyword)
            && (i == 0 || !is_regular(data[i - 1]))
            && data.get(i + keyword.len()).map_or(true, |c| !is_regular(*c))
    })
}

/// Index just past the `EI` closing an inline image whose `BI` ends at `from`.
fn skip_inline_image(data: &[u8], from: usize) -> Result<usize> {
    let id = find_keyword(data, from, b"ID")
        .ok_or_else(|| malformed("inline image without ID", from))?;
    // one whitespace byte separates ID from the sample data
    let body = (id + 3).min(data.len());
    let ei = find_keyword(data, body, b"EI")
        .ok_or_else(|| malformed("unterminated inline image", id))?;
    Ok(ei + 2)
}

/// Split a content stream into inline-image-free segments and count the
/// operators in each.
pub fn scan_content(data: &[u8]) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut operators = 0;
    // expected closers of open arrays (`]`) and dictionaries (`>`)
    let mut open: Vec<u8> = Vec::new();
    let mut pending_operands = false;
    let mut i = 0;

    while i < data.len() {
        match data[i] {
            c if is_whitespace(c) => i += 1,
            b'%' => {
                while i < data.len() && !b"\r\n".contains(&data[i]) {
                    i += 1;
                }
            }
            b'(' => {
                i = skip_literal_string(data, i)?;
                pending_operands = true;
            }
            b'<' if data.get(i + 1) == Some(&b'<') => {
                open.push(b'>');
                i += 2;
            }
            b'<' => {
                i = skip_hex_string(data, i)?;
                pending_operands = true;
            }
            b'>' if data.get(i + 1) == Some(&b'>') && open.last() == Some(&b'>') => {
                open.pop();
                i += 2;
                pending_operands = true;
            }
            b'[' => {
                open.push(b']');
                i += 1;
            }
            b']' if open.last() == Some(&b']') => {
                open.pop();
                i += 1;
                pending_operands = true;
            }
            b'/' => {
                i = skip_regular(data, i + 1);
                pending_operands = true;
            }
            c if is_regular(c) => {
                let end = skip_regular(data, i);
                let token = &data[i..end];
                if !open.is_empty() || is_operand_token(token) {
                    pending_operands = true;
                    i = end;
                } else if token == b"BI" {
                    segments.push(Segment {
                        range: start..i,
                        operators,
                    });
                    i = skip_inline_image(data, end)?;
                    start = i;
                    operators = 0;
                    pending_operands = false;
                } else {
                    operators += 1;
                    pending_operands = false;
                    i = end;
                }
            }
            c => return Err(malformed(&format!("unexpected '{}'", c as char), i)),
        }
    }

    if !open.is_empty() {
        return Err(malformed("unclosed array or dictionary", data.len()));
    }
    if pending_operands {
        return Err(malformed("operands without an operator", data.len()));
    }
    segments.push(Segment {
        range: start..data.len(),
        operators,
    });
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(data: &[u8]) -> Vec<usize> {
        scan_content(data)
            .unwrap()
            .iter()
            .map(|s| s.operators)
            .collect()
    }

    #[test]
    fn test_counts_operators() {
        assert_eq!(counts(b"BT /F1 12 Tf 72 700 Td (Hi) Tj ET"), vec![5]);
        assert_eq!(counts(b"[(A) -120 (B)] TJ 0.5 g T* (x) ' 1 2 (y) \""), vec![5]);
        assert_eq!(counts(b"/P <</MCID 0>> BDC EMC % note\nq Q"), vec![4]);
        assert_eq!(counts(b"<48 69> Tj (a (nested) \\) paren) Tj"), vec![2]);
        assert_eq!(counts(b""), vec![0]);
    }

    #[test]
    fn test_inline_image_is_cut_out() {
        let data = b"q BI /W 2 /H 1 /CS /G /BPC 8 ID \xffEI EI Q";
        let segments = scan_content(data).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(&data[segments[0].range.clone()], b"q ");
        assert_eq!(segments[0].operators, 1);
        assert_eq!(&data[segments[1].range.clone()], b" Q");
        assert_eq!(segments[1].operators, 1);
    }

    #[test]
    fn test_rejects_malformed_streams() {
        for data in [
            &b"BT /F1 12 Tf 72 720 Td (unterminated Tj ET"[..],
            b"q 1 0 0 1 0 0 cm [ ( ] >> << Tj",
            b"[1 2 >> d",
            b"<< /A 1 cm",
            b"(x) Tj ] ET",
            b"<4G> Tj",
            b"1 0 0 rg 72",
            b"BI /W 1 ID \x00",
        ] {
            assert!(
                matches!(scan_content(data), Err(Error::DocumentParse { page: None, .. })),
                "accepted {:?}",
                String::from_utf8_lossy(data)
            );
        }
    }
}
