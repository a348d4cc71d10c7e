// Document-order lookups over a parsed page: "the table after this heading",
// "the cell after this label", "the table this cell lives in".
use scraper::{ElementRef, Html, Node, Selector};

use crate::util::text::collapse_whitespace;

/// Position of a node in document order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Anchor(usize);

pub struct Page {
    doc: Html,
}

impl Page {
    pub fn parse(html: &str) -> Self {
        Page { doc: Html::parse_document(html) }
    }

    pub fn select(&self, sel: &str) -> Vec<ElementRef<'_>> {
        let Ok(sel) = Selector::parse(sel) else { return Vec::new() };
        self.doc.select(&sel).collect()
    }

    pub fn title(&self) -> Option<String> {
        self.select("title").into_iter().next().map(text_of)
    }

    /// First text node satisfying `pred`.
    pub fn find_text(&self, pred: impl Fn(&str) -> bool) -> Option<Anchor> {
        self.doc.root_element().descendants().enumerate()
            .find(|(_, n)| n.value().as_text().is_some_and(|t| pred(&**t)))
            .map(|(i, _)| Anchor(i))
    }

    /// First `tag` element whose single string (see [`string_of`]) satisfies `pred`.
    pub fn find_by_string(&self, tag: &str, pred: impl Fn(&str) -> bool) -> Option<ElementRef<'_>> {
        self.select(tag).into_iter().find(|el| string_of(*el).is_some_and(|s| pred(&s)))
    }

    pub fn anchor_of(&self, el: ElementRef<'_>) -> Option<Anchor> {
        self.doc.root_element().descendants().position(|n| n.id() == el.id()).map(Anchor)
    }

    /// Text content of the node at `at`, whitespace-collapsed.
    pub fn text_at(&self, at: Anchor) -> Option<String> {
        let node = self.doc.root_element().descendants().nth(at.0)?;
        match node.value() {
            Node::Text(t) => Some(collapse_whitespace(t)),
            Node::Element(_) => ElementRef::wrap(node).map(text_of),
            _ => None,
        }
    }

    /// First `tag` element strictly after `at` in document order.
    pub fn next_element_after(&self, at: Anchor, tag: &str) -> Option<ElementRef<'_>> {
        self.doc.root_element().descendants().skip(at.0 + 1)
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name().eq_ignore_ascii_case(tag))
    }

    /// First non-blank text node strictly after `at`.
    pub fn next_text_after(&self, at: Anchor) -> Option<String> {
        self.doc.root_element().descendants().skip(at.0 + 1)
            .filter_map(|n| n.value().as_text().map(|t| collapse_whitespace(t)))
            .find(|s| !s.is_empty())
    }
}

/// Whitespace-collapsed text of the element and all its descendants.
pub fn text_of(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

/// The element's text when it wraps exactly one piece of text, possibly through
/// single-child inline wrappers (`<td><b>Year Built</b></td>`). Whitespace-only
/// text siblings are ignored. Cells that hold several things yield `None`,
/// so a layout cell enclosing a whole sub-table never matches a label.
pub fn string_of(el: ElementRef<'_>) -> Option<String> {
    let mut node = *el;
    loop {
        let mut kids = node.children().filter(|c| match c.value() {
            Node::Text(t) => !t.trim().is_empty(),
            Node::Comment(_) => false,
            _ => true,
        });
        let only = kids.next()?;
        if kids.next().is_some() { return None; }
        match only.value() {
            Node::Text(t) => return Some(collapse_whitespace(t)),
            Node::Element(_) => node = only,
            _ => return None,
        }
    }
}

pub fn enclosing<'a>(el: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    el.ancestors().filter_map(ElementRef::wrap).find(|a| a.value().name().eq_ignore_ascii_case(tag))
}

pub fn enclosing_table(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    enclosing(el, "table")
}

pub fn select_in<'a>(el: ElementRef<'a>, sel: &str) -> Vec<ElementRef<'a>> {
    let Ok(sel) = Selector::parse(sel) else { return Vec::new() };
    el.select(&sel).collect()
}

pub fn rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    select_in(table, "tr")
}

pub fn cells(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    select_in(row, "td")
}

/// Text pieces directly under `el`, split wherever a `<br>` (or any child element) sits.
pub fn direct_text_parts(el: ElementRef<'_>) -> Vec<String> {
    el.children()
        .filter_map(|c| c.value().as_text().map(|t| collapse_whitespace(t)))
        .filter(|s| !s.is_empty())
        .collect()
}
