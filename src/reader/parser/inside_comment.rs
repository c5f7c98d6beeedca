//! Comments (`spec.md` §4.4): read from just after the tokenizer's
//! `CommentToken` (already consumed through the second `-`) up to `-->`,
//! forbidding a bare `--` inside. Comments never reach the tree — they are
//! discarded in the prolog/epilog and surfaced as `XmlComment` only inside
//! the document body (`body.rs`).

use crate::reader::error::{Error, SyntaxError};

use super::PullParser;

impl PullParser {
    /// Discards a comment's body (used in the prolog/epilog, where
    /// `spec.md` §4.4 says comments are simply discarded).
    pub(super) fn skip_comment_body(&mut self) -> Result<(), Error> {
        self.read_comment_body().map(drop)
    }

    /// Reads a comment's body as text (used inside the document body,
    /// where it becomes an `XmlComment` event).
    pub(super) fn read_comment_body(&mut self) -> Result<String, Error> {
        let mut text = String::new();
        loop {
            let pos = self.queue.position();
            match self.queue.next()? {
                '-' if self.queue.peek()? == Some('-') => {
                    self.queue.next()?;
                    match self.queue.next()? {
                        '>' => return Ok(text),
                        _ => return Err(self.err(SyntaxError::new("15", "'--' is not allowed inside a comment"), pos)),
                    }
                }
                c => text.push(c),
            }
        }
    }
}
