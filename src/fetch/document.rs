/// Queryable markup documents
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::site::text::tidy_string;

/// A parsed HTML page or embedded XML fragment
pub struct Document {
    html: Html,
}

/// One element matched by a query
#[derive(Clone, Copy)]
pub struct Node<'a> {
    element: ElementRef<'a>,
}

fn compile(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(selector) => Some(selector),
        Err(e) => {
            debug!("Invalid selector {:?}: {:?}", selector, e);
            None
        }
    }
}

impl Document {
    /// Parse a full HTML page
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }

    /// Parse a fragment such as a player data blob
    pub fn parse_fragment(body: &str) -> Self {
        Self {
            html: Html::parse_fragment(body),
        }
    }

    /// All elements matching `selector`, in document order
    pub fn query(&self, selector: &str) -> Vec<Node<'_>> {
        match compile(selector) {
            Some(selector) => self
                .html
                .select(&selector)
                .map(|element| Node { element })
                .collect(),
            None => Vec::new(),
        }
    }

    /// First match for `selector`
    pub fn first(&self, selector: &str) -> Option<Node<'_>> {
        self.query(selector).into_iter().next()
    }

    /// Tidied own text of the first match
    pub fn first_text(&self, selector: &str) -> Option<String> {
        self.first(selector).map(|node| node.own_text())
    }

    /// Attribute of the first match
    pub fn first_attr(&self, selector: &str, attr: &str) -> Option<String> {
        self.first(selector)
            .and_then(|node| node.attr(attr).map(str::to_string))
    }
}

impl<'a> Node<'a> {
    /// Matching descendants of this node
    pub fn query(&self, selector: &str) -> Vec<Node<'a>> {
        match compile(selector) {
            Some(selector) => self
                .element
                .select(&selector)
                .map(|element| Node { element })
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn first(&self, selector: &str) -> Option<Node<'a>> {
        self.query(selector).into_iter().next()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Text nodes directly under this element, tidied. Descendant elements are ignored.
    pub fn own_text(&self) -> String {
        let raw: String = self
            .element
            .children()
            .filter_map(|child| child.value().as_text())
            .map(|text| &**text)
            .collect();
        tidy_string(Some(&raw))
    }

    /// All text beneath this element, tidied
    pub fn text(&self) -> String {
        let raw: String = self.element.text().collect();
        tidy_string(Some(&raw))
    }

    /// Child elements in order
    pub fn children(&self) -> Vec<Node<'a>> {
        self.element
            .children()
            .filter_map(ElementRef::wrap)
            .map(|element| Node { element })
            .collect()
    }

    /// Child elements with the given tag name
    pub fn children_named(&self, name: &str) -> Vec<Node<'a>> {
        self.children()
            .into_iter()
            .filter(|child| child.name() == name)
            .collect()
    }

    pub fn name(&self) -> &'a str {
        self.element.value().name()
    }
}
