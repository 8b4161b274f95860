//! Tree construction.
//!
//! Turns the token stream into a [`DomTree`], inventing the skeleton
//! elements (`html`, `head`, `body`) when the source leaves them out and
//! closing the elements HTML authors habitually leave open.

use halftone_dom::{DomTree, ElementData, NodeId, NodeKind};

use crate::tokenizer::{Token, tokenize};

/// Elements that never have children.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements that belong in `<head>` when no `<body>` has opened yet.
const HEAD_CONTENT: &[&str] = &["base", "link", "meta", "style", "title"];

/// Parse an HTML string into a document tree. Never fails.
#[must_use]
pub fn parse(input: &str) -> DomTree {
    let mut builder = TreeBuilder::new();
    for token in tokenize(input) {
        match token {
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => builder.start_tag(&name, attributes, self_closing),
            Token::EndTag { name } => builder.end_tag(&name),
            Token::Text(text) => builder.text(&text),
        }
    }
    builder.finish()
}

/// Incremental tree builder over the token stream.
struct TreeBuilder {
    tree: DomTree,
    /// Stack of open elements; the document node is the base entry.
    open: Vec<NodeId>,
    html: Option<NodeId>,
    head: Option<NodeId>,
    body: Option<NodeId>,
}

impl TreeBuilder {
    fn new() -> Self {
        let tree = DomTree::new();
        let root = tree.root();
        Self {
            tree,
            open: vec![root],
            html: None,
            head: None,
            body: None,
        }
    }

    fn current(&self) -> NodeId {
        *self.open.last().expect("open stack never empties")
    }

    fn current_name(&self) -> Option<&str> {
        self.tree.as_element(self.current()).map(|e| e.name.as_str())
    }

    fn insert_element(&mut self, name: &str, attributes: halftone_dom::AttributeList) -> NodeId {
        let id = self.tree.alloc(NodeKind::Element(ElementData {
            name: name.to_ascii_lowercase(),
            attributes,
        }));
        let parent = self.current();
        self.tree.append_child(parent, id);
        id
    }

    /// Make sure `<html>` exists and is open.
    fn ensure_html(&mut self) {
        if self.html.is_none() {
            let id = self.insert_element("html", halftone_dom::AttributeList::new());
            self.html = Some(id);
            self.open.push(id);
        }
    }

    /// Make sure `<head>` exists; used for metadata content before the body.
    fn ensure_head(&mut self) -> NodeId {
        self.ensure_html();
        if let Some(head) = self.head {
            return head;
        }
        let html = self.html.expect("ensure_html ran");
        let id = self.tree.alloc(NodeKind::Element(ElementData::new("head")));
        self.tree.append_child(html, id);
        self.head = Some(id);
        id
    }

    /// Make sure `<body>` exists and is open.
    fn ensure_body(&mut self) {
        self.ensure_html();
        if self.body.is_some() {
            return;
        }
        // Invent head-before-body so document order matches real markup.
        let _ = self.ensure_head();
        let html = self.html.expect("ensure_html ran");
        let id = self.tree.alloc(NodeKind::Element(ElementData::new("body")));
        self.tree.append_child(html, id);
        self.body = Some(id);
        // The body replaces html as the open insertion point.
        while self.open.len() > 1 {
            let _ = self.open.pop();
        }
        self.open.push(html);
        self.open.push(id);
    }

    /// Auto-close elements that the incoming tag implicitly terminates.
    fn auto_close_for(&mut self, name: &str) {
        let closes: &[&str] = match name {
            "p" | "div" | "ul" | "ol" | "table" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
            | "blockquote" | "pre" | "hr" => &["p"],
            "li" => &["li", "p"],
            "tr" => &["tr", "td", "th"],
            "td" | "th" => &["td", "th"],
            _ => return,
        };
        while self.current_name().is_some_and(|n| closes.contains(&n)) {
            let _ = self.open.pop();
        }
    }

    fn start_tag(
        &mut self,
        name: &str,
        attributes: halftone_dom::AttributeList,
        self_closing: bool,
    ) {
        match name {
            "html" => {
                if self.html.is_none() {
                    let id = self.insert_element("html", attributes);
                    self.html = Some(id);
                    self.open.push(id);
                }
            }
            "head" => {
                self.ensure_html();
                if self.head.is_none() {
                    let id = self.insert_element("head", attributes);
                    self.head = Some(id);
                    self.open.push(id);
                }
            }
            "body" => {
                self.ensure_html();
                if self.body.is_none() {
                    // Close any open head first.
                    while self.open.len() > 2 {
                        let _ = self.open.pop();
                    }
                    if self.current_name() == Some("head") {
                        let _ = self.open.pop();
                    }
                    let id = self.insert_element("body", attributes);
                    self.body = Some(id);
                    self.open.push(id);
                }
            }
            _ if HEAD_CONTENT.contains(&name) && self.body.is_none() => {
                let head = self.ensure_head();
                let id = self.tree.alloc(NodeKind::Element(ElementData {
                    name: name.to_string(),
                    attributes,
                }));
                self.tree.append_child(head, id);
                if !VOID_ELEMENTS.contains(&name) && !self_closing {
                    // Rawtext content (style, title) arrives as the next
                    // text token; keep the element open for it.
                    self.open.push(id);
                    // But head elements aren't on the main stack path, so
                    // a missing end tag must not swallow the body. The
                    // end_tag handler pops it; rawtext always emits one.
                }
            }
            _ => {
                self.ensure_body();
                self.auto_close_for(name);
                let id = self.insert_element(name, attributes);
                if !VOID_ELEMENTS.contains(&name) && !self_closing {
                    self.open.push(id);
                }
            }
        }
    }

    fn end_tag(&mut self, name: &str) {
        // Pop to the nearest matching open element; ignore strays.
        let Some(depth) = self
            .open
            .iter()
            .rposition(|&id| self.tree.as_element(id).is_some_and(|e| e.name == name))
        else {
            return;
        };
        if depth == 0 {
            return;
        }
        self.open.truncate(depth);
    }

    fn text(&mut self, text: &str) {
        // Whitespace between structural tags (before <body>, directly
        // under <html>) is formatting, not content.
        let in_flow = self
            .current_name()
            .is_some_and(|n| !matches!(n, "html" | "head"));
        if !in_flow && text.trim().is_empty() {
            return;
        }
        if !in_flow && self.current_name() != Some("style") && self.current_name() != Some("title") {
            self.ensure_body();
        }
        let id = self.tree.alloc(NodeKind::Text(text.to_string()));
        let parent = self.current();
        self.tree.append_child(parent, id);
    }

    fn finish(mut self) -> DomTree {
        // Documents with no content at all still get a skeleton.
        self.ensure_body();
        self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_fragment_gets_skeleton() {
        let tree = parse("<div>hi</div>");
        let body = tree.body().expect("body exists");
        let children = tree.children(body);
        assert_eq!(children.len(), 1);
        assert_eq!(tree.as_element(children[0]).unwrap().name, "div");
    }

    #[test]
    fn style_in_head_keeps_raw_css() {
        let tree = parse("<head><style>p { color: red }</style></head><p>x</p>");
        let html = tree.document_element().unwrap();
        let head = tree.children(html)[0];
        assert_eq!(tree.as_element(head).unwrap().name, "head");
        let style = tree.children(head)[0];
        assert_eq!(tree.text_content(style), "p { color: red }");
    }

    #[test]
    fn unclosed_paragraphs_auto_close() {
        let tree = parse("<p>one<p>two");
        let body = tree.body().unwrap();
        let children = tree.children(body);
        assert_eq!(children.len(), 2);
        for &child in children {
            assert_eq!(tree.as_element(child).unwrap().name, "p");
        }
    }

    #[test]
    fn void_elements_take_no_children() {
        let tree = parse("<body><br>text after</body>");
        let body = tree.body().unwrap();
        let children = tree.children(body);
        assert_eq!(children.len(), 2);
        assert_eq!(tree.as_element(children[0]).unwrap().name, "br");
        assert!(tree.children(children[0]).is_empty());
        assert_eq!(tree.as_text(children[1]), Some("text after"));
    }

    #[test]
    fn list_items_auto_close() {
        let tree = parse("<ul><li>a<li>b</ul>");
        let body = tree.body().unwrap();
        let ul = tree.children(body)[0];
        assert_eq!(tree.children(ul).len(), 2);
    }

    #[test]
    fn stray_end_tags_are_ignored() {
        let tree = parse("</div><p>ok</p></span>");
        let body = tree.body().unwrap();
        assert_eq!(tree.children(body).len(), 1);
    }
}
