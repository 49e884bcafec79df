use kuchiki::NodeRef;

use crate::dom::{self, Document};
use crate::entities;
use crate::quotes::{find_candidates, pair, quote_targets};
use crate::types::QuoteRole;

const WRAPPER_TAG: &str = "q";

/// A piece of text split at paired quotes. Quote segments keep the glyph they
/// were cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Open(&'a str),
    Close(&'a str),
}

pub fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut last = 0;
    for quote in pair(&find_candidates(text)) {
        if quote.position > last {
            out.push(Segment::Text(&text[last..quote.position]));
        }
        let glyph = &text[quote.position..quote.position + quote.len];
        out.push(match quote.role {
            QuoteRole::Open => Segment::Open(glyph),
            QuoteRole::Close => Segment::Close(glyph),
        });
        last = quote.position + quote.len;
    }
    if last < text.len() {
        out.push(Segment::Text(&text[last..]));
    }
    out
}

/// Concatenate segments back into text.
pub fn unwrap(segments: &[Segment<'_>]) -> String {
    segments
        .iter()
        .map(|s| match s {
            Segment::Text(t) | Segment::Open(t) | Segment::Close(t) => *t,
        })
        .collect()
}

/// Wraps paired quotations in `<q>` elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuoteWrapper;

impl QuoteWrapper {
    pub fn run(&self, doc: &Document) {
        for (node, decoded) in quote_targets(doc) {
            let segs = segments(&decoded);
            if !segs.iter().any(|s| matches!(s, Segment::Open(_))) {
                continue;
            }
            dom::replace_with(&node, materialize(&segs));
        }
    }
}

fn materialize(segs: &[Segment<'_>]) -> Vec<NodeRef> {
    let mut top = Vec::new();
    let mut open: Vec<NodeRef> = Vec::new();
    for seg in segs {
        let node = match seg {
            Segment::Text(text) => NodeRef::new_text(entities::encode(text)),
            Segment::Open(_) => dom::new_element(WRAPPER_TAG),
            Segment::Close(_) => {
                open.pop();
                continue;
            }
        };
        match open.last() {
            Some(parent) => parent.append(node.clone()),
            None => top.push(node.clone()),
        }
        if matches!(seg, Segment::Open(_)) {
            open.push(node);
        }
    }
    top
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(html: &str) -> String {
        let doc = Document::parse(html);
        QuoteWrapper.run(&doc);
        doc.serialize().unwrap()
    }

    #[test]
    fn nested_quotes_become_nested_elements() {
        assert_eq!(
            wrap("<p>\"outer 'inner' outer\"</p>"),
            "<p><q>outer <q>inner</q> outer</q></p>"
        );
        assert_eq!(
            wrap("<p>\"a 'b \"c\" b' a\"</p>"),
            "<p><q>a <q>b <q>c</q> b</q> a</q></p>"
        );
    }

    #[test]
    fn sequential_quotes() {
        assert_eq!(
            wrap("<p>\"first\" and \"second\"</p>"),
            "<p><q>first</q> and <q>second</q></p>"
        );
    }

    #[test]
    fn curly_quotes_are_wrapped() {
        assert_eq!(wrap("<p>\u{201C}curly\u{201D}</p>"), "<p><q>curly</q></p>");
    }

    #[test]
    fn apostrophes_and_unpaired_quotes_stay() {
        assert_eq!(wrap("<p>don't touch Edit's</p>"), "<p>don't touch Edit's</p>");
        assert_eq!(wrap("<p>\u{201E}unclosed</p>"), "<p>\u{201E}unclosed</p>");
        assert_eq!(wrap("<p>unopened\"</p>"), "<p>unopened\"</p>");
    }

    #[test]
    fn attributes_are_not_wrapped() {
        assert_eq!(
            wrap(r#"<a href="/x?q=&quot;y&quot;">"link"</a>"#),
            r#"<a href="/x?q=&quot;y&quot;"><q>link</q></a>"#
        );
    }

    #[test]
    fn entities_inside_quotes_survive() {
        assert_eq!(wrap("<p>\"Fish &amp; Chips\"</p>"), "<p><q>Fish &amp; Chips</q></p>");
    }

    #[test]
    fn segments_unwrap_to_the_input() {
        for text in [
            "\"outer 'inner' outer\"",
            "\u{201E}Hallo\u{201C} \u{00AB}x\u{00BB}",
            "no quotes at all",
            "\"a \"b\" a\" and 'c",
            "",
        ] {
            assert_eq!(unwrap(&segments(text)), text);
        }
    }

    #[test]
    fn segment_shape() {
        assert_eq!(
            segments("\"a\" b"),
            vec![Segment::Open("\""), Segment::Text("a"), Segment::Close("\""), Segment::Text(" b")]
        );
    }
}
