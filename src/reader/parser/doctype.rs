//! `DOCTYPE` (`spec.md` §4.4): name, optional `ExternalId`, optional
//! internal subset, closing `>`. The internal subset itself is delegated
//! to `dtd.rs` (`spec.md` §4.5); declared general entities are carried
//! out on the event for the tree builder to populate its `EntityTable`
//! from (`spec.md` §4.7) rather than tracked here.

use crate::common::TextPosition;
use crate::dtd;
use crate::lexical::{read_qname, space, space1};
use crate::reader::error::Error;
use crate::reader::events::XmlEvent;

use super::PullParser;

impl PullParser {
    pub(super) fn read_doctype(&mut self, pos: TextPosition) -> Result<XmlEvent, Error> {
        space1(&mut self.queue, "28", "expected whitespace before DOCTYPE name")?;
        let name = read_qname(&mut self.queue)?;
        space(&mut self.queue)?;

        let external_id = if matches!(self.queue.peek()?, Some('S') | Some('P')) {
            let id = dtd::parse_external_id(&mut self.queue)?;
            space(&mut self.queue)?;
            Some(id)
        } else {
            None
        };

        let subset = if self.queue.peek()? == Some('[') {
            self.queue.next()?;
            let decls = dtd::parse_internal_subset(&mut self.queue, self.config.recognize_conditional_sections)?;
            space(&mut self.queue)?;
            decls
        } else {
            Vec::new()
        };
        self.expect_str(">")?;
        Ok(XmlEvent::XmlDoctype { name, external_id, subset, pos })
    }
}
