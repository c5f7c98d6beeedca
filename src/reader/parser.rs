//! The event pull parser (`spec.md` §4.4): the state machine that drives
//! the markup tokenizer and the character queue to emit `XmlEvent`s.
//! Organised the way the teacher organises `PullParser` — one state (or
//! closely related cluster of states) per submodule, each contributing an
//! `impl PullParser` block (`examples/kornelski-xml-rs/src/reader/parser/inside_comment.rs`).

use std::collections::VecDeque;

use crate::common::{Position, TextPosition};
use crate::reader::config::ParserConfig;
use crate::reader::error::{Error, SyntaxError};
use crate::reader::events::XmlEvent;
use crate::reader::source::CharQueue;

mod attributes;
mod body;
mod cdata;
mod chardata;
mod doctype;
mod inside_comment;
mod pi;
mod prolog;
mod xmldecl;

pub(crate) type Result = std::result::Result<XmlEvent, Error>;

/// Where in the document the parser currently sits (`spec.md` §4.4).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum DocPosition {
    Prolog0,
    Prolog1,
    Prolog2,
    Body,
    Postlog,
}

/// The pull parser's full state: character queue, document position,
/// open-element depth, XML-1.1 flag, and the templating suspension flag.
pub(crate) struct PullParser {
    pub(super) queue: CharQueue,
    pub(super) position: DocPosition,
    pub(super) level: u32,
    pub(super) xml11: bool,
    pub(super) partial: bool,
    pub(super) config: ParserConfig,
    /// Events already produced but not yet returned from `next()` — used
    /// to synthesise the paired `EndTag` for a self-closing `StartTag`
    /// without re-entering the state machine recursively.
    pub(super) pending: VecDeque<XmlEvent>,
    pub(super) seen_root: bool,
    pub(super) finished: bool,
    pub(super) started: bool,
    /// An in-progress start tag's attribute list left unfinished by a
    /// templating suspension (`spec.md` §4.8), resumed before any other
    /// work happens in `body()`.
    pub(super) suspended_tag: Option<attributes::SuspendedTag>,
}

impl PullParser {
    pub(crate) fn new(config: ParserConfig) -> Self {
        let partial = config.partial;
        PullParser {
            queue: CharQueue::new(),
            position: DocPosition::Prolog0,
            level: 0,
            xml11: false,
            partial,
            config,
            pending: VecDeque::new(),
            seen_root: false,
            finished: false,
            started: false,
            suspended_tag: None,
        }
    }

    pub(crate) fn feed(&mut self, source: impl Iterator<Item = char> + 'static) {
        self.queue.feed(source);
    }

    pub(crate) fn feed_str(&mut self, s: String) {
        self.queue.feed_str(s);
    }

    pub(crate) fn set_partial(&mut self, partial: bool) {
        self.partial = partial;
    }

    /// Produces the next event, or `None` once `EndDocument` has already
    /// been returned (repeated calls after that are a caller bug the
    /// teacher's own `Events` iterator guards against at the `reader.rs`
    /// level, not here).
    pub(crate) fn next(&mut self) -> Option<Result> {
        if let Some(ev) = self.pending.pop_front() {
            return Some(Ok(ev));
        }
        if self.finished {
            return None;
        }
        let result = self.next_uncached();
        if let Ok(XmlEvent::EndDocument { .. }) | Err(_) = &result {
            self.finished = true;
        }
        Some(result)
    }

    fn next_uncached(&mut self) -> Result {
        if !self.started {
            self.started = true;
            return Ok(XmlEvent::StartDocument { pos: TextPosition::new() });
        }
        match self.position {
            DocPosition::Prolog0 => self.prolog0(),
            DocPosition::Prolog1 => self.prolog1(),
            DocPosition::Prolog2 => self.prolog2(),
            DocPosition::Body => self.body(),
            DocPosition::Postlog => self.postlog(),
        }
    }

    pub(super) fn at_eof(&mut self) -> std::result::Result<bool, Error> {
        self.queue.is_exhausted()
    }

    pub(crate) fn position(&self) -> TextPosition {
        self.queue.position()
    }

    /// Whether the document declared itself XML 1.1 (or later), widening
    /// the character-range and namespace-undeclaring rules the tree
    /// builder applies (`spec.md` §4.1, §4.6).
    pub(crate) fn is_xml11(&self) -> bool {
        self.xml11
    }

    /// Whether `xmlns=""` / `xmlns:p=""` undeclaring is permitted for this
    /// document even under XML 1.0 (`ParserConfig::xml11_permissive_undeclare`,
    /// `SPEC_FULL.md` §6).
    pub(crate) fn permissive_undeclare(&self) -> bool {
        self.config.xml11_permissive_undeclare
    }

    pub(super) fn err(&self, e: SyntaxError, pos: TextPosition) -> Error {
        Error::syntax(e, pos)
    }
}
