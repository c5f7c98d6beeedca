//! Lexical primitives (`spec.md` §4.2): NCName/QName reading, quoted
//! literals, numeric/named character references, and whitespace helpers.
//! These operate directly on the character queue, one level below the
//! markup tokenizer.

use crate::common::{is_ncname_char, is_ncname_start_char, is_whitespace_char, Position};
use crate::name::QName;
use crate::reader::error::{Error, SyntaxError};
use crate::reader::source::CharQueue;

/// Consumes zero or more whitespace characters; returns whether any were
/// consumed.
pub(crate) fn space(q: &mut CharQueue) -> Result<bool, Error> {
    let mut any = false;
    while let Some(c) = q.peek()? {
        if !is_whitespace_char(c) {
            break;
        }
        q.next()?;
        any = true;
    }
    Ok(any)
}

/// Requires at least one whitespace character, else fails with `msg`
/// tagged to `prod`.
pub(crate) fn space1(q: &mut CharQueue, prod: &'static str, msg: &'static str) -> Result<(), Error> {
    if space(q)? {
        Ok(())
    } else {
        Err(Error::syntax(SyntaxError::new(prod, msg), q.position()))
    }
}

/// Reads a single `NCName` (no colon).
pub(crate) fn read_ncname(q: &mut CharQueue) -> Result<String, Error> {
    let start_pos = q.position();
    let mut s = String::new();
    match q.peek()? {
        Some(c) if is_ncname_start_char(c) => {
            s.push(q.next()?);
        }
        _ => return Err(Error::syntax(SyntaxError::new("5", "expected a name"), start_pos)),
    }
    while let Some(c) = q.peek()? {
        if !is_ncname_char(c) {
            break;
        }
        s.push(q.next()?);
    }
    Ok(s)
}

/// Reads a `QName`: `NCName [':' NCName]`.
pub(crate) fn read_qname(q: &mut CharQueue) -> Result<QName, Error> {
    let first = read_ncname(q)?;
    if q.peek()? == Some(':') {
        q.next()?;
        let local = read_ncname(q)?;
        Ok(QName::with_prefix(first, local))
    } else {
        Ok(QName::local(first))
    }
}

/// Reads a matched `"…"` or `'…'` literal, returning its (unescaped)
/// content. The delimiter is whichever quote character comes next.
pub(crate) fn read_quoted(q: &mut CharQueue) -> Result<String, Error> {
    let start = q.position();
    let delim = match q.peek()? {
        Some(c @ ('"' | '\'')) => {
            q.next()?;
            c
        }
        _ => return Err(Error::syntax(SyntaxError::new("10", "expected a quoted literal"), start)),
    };
    let mut s = String::new();
    loop {
        match q.next_opt()? {
            Some(c) if c == delim => break,
            Some(c) => s.push(c),
            None => return Err(Error::syntax(SyntaxError::unexpected_eof(), q.position())),
        }
    }
    Ok(s)
}

/// Reads a `PubidLiteral`: a quoted literal restricted to
/// `#x20 #xD #xA a–z A–Z 0–9 -'()+,./:=?;!*#@$_%` (and no `'` inside a
/// `'…'`-delimited literal — the restriction is the same one `read_quoted`
/// already enforces structurally, this just validates the character set).
pub(crate) fn read_pubid_literal(q: &mut CharQueue) -> Result<String, Error> {
    let start = q.position();
    let literal = read_quoted(q)?;
    if literal.chars().all(is_pubid_char) {
        Ok(literal)
    } else {
        Err(Error::syntax(SyntaxError::new("12", "invalid character in public identifier"), start))
    }
}

fn is_pubid_char(c: char) -> bool {
    matches!(c,
        ' ' | '\r' | '\n' |
        'a'..='z' | 'A'..='Z' | '0'..='9' |
        '-' | '\'' | '(' | ')' | '+' | ',' | '.' | '/' | ':' | '=' | '?' | ';' | '!' | '*' | '#' | '@' | '$' | '_' | '%'
    )
}

/// The value of a decimal or hex numeric character reference, after the
/// `&#` / `&#x` prefix and up to (not including) the terminating `;`.
pub(crate) fn parse_numeric_ref(digits: &str, hex: bool) -> Option<u32> {
    if digits.is_empty() {
        return None;
    }
    u32::from_str_radix(digits, if hex { 16 } else { 10 }).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ncname_and_qname() {
        let mut q = CharQueue::from_str("foo:bar rest");
        let name = read_qname(&mut q).unwrap();
        assert_eq!(name.prefix.as_deref(), Some("foo"));
        assert_eq!(&*name.local, "bar");
    }

    #[test]
    fn quoted_literal() {
        let mut q = CharQueue::from_str("'hello'x");
        assert_eq!(read_quoted(&mut q).unwrap(), "hello");
        assert_eq!(q.next().unwrap(), 'x');
    }

    #[test]
    fn pubid_rejects_bad_chars() {
        let mut q = CharQueue::from_str("'a<b'");
        assert!(read_pubid_literal(&mut q).is_err());
    }

    #[test]
    fn numeric_ref_parsing() {
        assert_eq!(parse_numeric_ref("65", false), Some(65));
        assert_eq!(parse_numeric_ref("41", true), Some(0x41));
        assert_eq!(parse_numeric_ref("", false), None);
    }
}
