//! The markup tokenizer (`spec.md` §4.3): classifies the lexeme following
//! a just-consumed `<` into one of a handful of shapes. Adapted from the
//! teacher's byte-oriented `Lexer`/`Token` (`examples/kornelski-xml-rs/src/reader/lexer.rs`)
//! down to the coarser token set this design calls for — the teacher
//! recognises every single-character markup lexeme (`>`, `/>`, `=`, quotes,
//! `;`, …) as its own `Token`; here the pull parser reads those directly
//! off the character queue via the lexical primitives (`lexical.rs`), and
//! the tokenizer's only job is to decide *what kind* of markup follows an
//! opening `<`.

use crate::lexical::read_qname;
use crate::name::QName;
use crate::reader::error::{Error, SyntaxError};
use crate::reader::source::CharQueue;

/// One classified markup lexeme, valid only immediately after a `<` has
/// been consumed from the queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Token {
    /// `</name` — the closing-tag name, read but not yet the `>`.
    EndToken(QName),
    /// `<?target` — target read, body left for the caller.
    PIToken(String),
    /// `<!--` — comment opener, already consumed through the second `-`.
    CommentToken,
    /// `<![NAME[` (e.g. `CDATA`, `INCLUDE`, `IGNORE`) or `<![%peref;[`,
    /// already consumed through the final `[`.
    SectionToken(String),
    /// `<!NAME` bare markup declaration keyword (`DOCTYPE`, `ENTITY`, …),
    /// already consumed.
    DeclToken(String),
    /// `<name` — an opening tag name.
    StartToken(QName),
}

/// Classifies the token starting right after an already-consumed `<`.
pub(crate) fn classify(q: &mut CharQueue) -> Result<Token, Error> {
    match q.peek()? {
        Some('/') => {
            q.next()?;
            let name = read_qname(q)?;
            Ok(Token::EndToken(name))
        }
        Some('?') => {
            q.next()?;
            let target = read_qname(q)?;
            Ok(Token::PIToken(target.qualified()))
        }
        Some('!') => {
            q.next()?;
            classify_bang(q)
        }
        _ => {
            let name = read_qname(q)?;
            Ok(Token::StartToken(name))
        }
    }
}

fn classify_bang(q: &mut CharQueue) -> Result<Token, Error> {
    match q.peek()? {
        Some('-') => {
            q.next()?;
            expect(q, '-')?;
            Ok(Token::CommentToken)
        }
        Some('[') => {
            q.next()?;
            let name = if q.peek()? == Some('%') {
                q.next()?;
                let mut s = String::from("%");
                s.push_str(&crate::lexical::read_ncname(q)?);
                expect(q, ';')?;
                s
            } else {
                crate::lexical::read_ncname(q)?
            };
            expect(q, '[')?;
            Ok(Token::SectionToken(name))
        }
        Some(c) if c.is_alphabetic() => {
            let name = crate::lexical::read_ncname(q)?;
            Ok(Token::DeclToken(name))
        }
        _ => Err(Error::syntax(
            SyntaxError::unexpected_token(format!("{:?}", q.peek()?)),
            q.position(),
        )),
    }
}

fn expect(q: &mut CharQueue, expected: char) -> Result<(), Error> {
    let start = q.position();
    match q.next_opt()? {
        Some(c) if c == expected => Ok(()),
        Some(c) => Err(Error::syntax(SyntaxError::unexpected_token(format!("'{c}', expected '{expected}'")), start)),
        None => Err(Error::syntax(SyntaxError::unexpected_eof(), start)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_after_lt(src: &str) -> Token {
        let mut q = CharQueue::from_str(src);
        q.next().unwrap(); // consume '<'
        classify(&mut q).unwrap()
    }

    #[test]
    fn classifies_start_and_end_tags() {
        assert_eq!(classify_after_lt("foo "), Token::StartToken(QName::local("foo")));
        assert_eq!(classify_after_lt("/foo>"), Token::EndToken(QName::local("foo")));
    }

    #[test]
    fn classifies_pi_comment_and_sections() {
        assert_eq!(classify_after_lt("?target "), Token::PIToken("target".into()));
        assert_eq!(classify_after_lt("!--"), Token::CommentToken);
        assert_eq!(classify_after_lt("![CDATA["), Token::SectionToken("CDATA".into()));
        assert_eq!(classify_after_lt("!DOCTYPE "), Token::DeclToken("DOCTYPE".into()));
    }

    #[test]
    fn classifies_parameter_entity_section() {
        assert_eq!(classify_after_lt("![%pe;["), Token::SectionToken("%pe".into()));
    }
}
