//! Processing instructions (`spec.md` §4.3/§4.4): `<?target body?>`. The
//! tokenizer (`reader::lexer`) already read the target; this reads the
//! (optional, whitespace-separated) body up to the terminating `?>`.

use crate::common::TextPosition;
use crate::lexical::space;
use crate::reader::error::Error;
use crate::reader::events::XmlEvent;

use super::PullParser;

impl PullParser {
    pub(super) fn read_pi(&mut self, target: String, pos: TextPosition) -> Result<XmlEvent, Error> {
        space(&mut self.queue)?;
        let mut body = String::new();
        loop {
            match self.queue.next()? {
                '?' if self.queue.peek()? == Some('>') => {
                    self.queue.next()?;
                    return Ok(XmlEvent::XmlPI { target, body, pos });
                }
                c => body.push(c),
            }
        }
    }
}
