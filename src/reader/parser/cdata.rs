//! CDATA sections (`spec.md` §4.4): read from just after `<![CDATA[` up
//! to `]]>`, normalising line endings and honouring the legacy `&gt;`
//! workaround for embedding a literal `]]>` inside the section.

use crate::common::TextPosition;
use crate::reader::error::Error;
use crate::reader::events::XmlEvent;

use super::PullParser;

fn flush_brackets(text: &mut String, run: &mut u32) {
    for _ in 0..*run {
        text.push(']');
    }
    *run = 0;
}

impl PullParser {
    pub(super) fn read_cdata(&mut self, pos: TextPosition) -> Result<XmlEvent, Error> {
        let mut text = String::new();
        // Number of trailing `]` characters read but not yet committed to
        // `text` — buffered so a run like `]]]` followed by `>` closes at
        // the *last* two brackets instead of greedily matching the first
        // two and treating a third `]` as literal content
        // (`spec.md` §8: "CDATA containing `]]` followed by a non-`>`
        // character is accepted").
        let mut run = 0u32;
        loop {
            match self.queue.next()? {
                ']' => run += 1,
                '>' if run >= 2 => {
                    for _ in 0..run - 2 {
                        text.push(']');
                    }
                    return Ok(XmlEvent::XmlString { text, is_cdata: true, pos });
                }
                '\r' => {
                    flush_brackets(&mut text, &mut run);
                    if self.queue.peek()? == Some('\n') {
                        self.queue.next()?;
                    }
                    text.push('\n');
                }
                '&' if self.peek_literal("gt;")? => {
                    flush_brackets(&mut text, &mut run);
                    text.push('>');
                }
                c => {
                    flush_brackets(&mut text, &mut run);
                    text.push(c);
                }
            }
        }
    }

    /// Matches a literal ASCII tail (e.g. `"gt;"` after an already-consumed
    /// `&`) without leaving a partial consumption behind on a mismatch.
    fn peek_literal(&mut self, tail: &str) -> Result<bool, Error> {
        let mut matched = String::new();
        for expected in tail.chars() {
            match self.queue.peek()? {
                Some(c) if c == expected => matched.push(self.queue.next()?),
                _ => {
                    if !matched.is_empty() {
                        self.queue.unread(&matched);
                    }
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use crate::reader::config::ParserConfig;
    use crate::reader::events::XmlEvent;
    use crate::reader::parser::PullParser;

    fn cdata_text(src: &str) -> String {
        let mut p = PullParser::new(ParserConfig::new());
        p.feed_str(format!("<r>{src}</r>"));
        for r in std::iter::from_fn(|| p.next()) {
            if let XmlEvent::XmlString { text, is_cdata: true, .. } = r.unwrap() {
                return text;
            }
        }
        panic!("no CDATA text event produced");
    }

    #[test]
    fn plain_cdata() {
        assert_eq!(cdata_text("<![CDATA[hello]]>"), "hello");
    }

    #[test]
    fn double_bracket_followed_by_non_gt_is_literal() {
        assert_eq!(cdata_text("<![CDATA[a]]b]]>"), "a]]b");
    }

    #[test]
    fn triple_bracket_run_closes_at_last_two() {
        assert_eq!(cdata_text("<![CDATA[x]]]>"), "x]");
    }

    #[test]
    fn gt_entity_workaround_is_literal_and_does_not_close() {
        assert_eq!(cdata_text("<![CDATA[a]]&gt;b]]>"), "a]]>b");
    }
}
