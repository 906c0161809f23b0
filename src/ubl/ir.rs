//! Intermediate XML tree.
//!
//! Documents are lowered to [`Node`]s first and written by a single generic
//! renderer ([`xml_utils::render`](super::xml_utils::render)). Optional
//! structure is expressed with the `Option`-returning constructors, which
//! return `None` instead of an empty element.

use rust_decimal::Decimal;

use super::xml_utils::format_decimal;
use crate::core::{MonetaryAmount, Quantity};

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: &'static str,
    pub attrs: Vec<(&'static str, String)>,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Text(String),
    Children(Vec<Node>),
}

impl Node {
    /// Leaf element with text content.
    pub fn text(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            attrs: Vec::new(),
            body: Body::Text(value.into()),
        }
    }

    /// Leaf element, or `None` when the value is absent or blank.
    pub fn opt_text(name: &'static str, value: Option<&String>) -> Option<Self> {
        value
            .filter(|v| !v.trim().is_empty())
            .map(|v| Self::text(name, v.as_str()))
    }

    /// Element with children, rendered even when `children` is empty.
    /// Used for required structure only.
    pub fn parent(name: &'static str, children: Vec<Node>) -> Self {
        Self {
            name,
            attrs: Vec::new(),
            body: Body::Children(children),
        }
    }

    /// Element with children, or `None` when there are none.
    pub fn group(name: &'static str, children: Vec<Node>) -> Option<Self> {
        if children.is_empty() {
            None
        } else {
            Some(Self::parent(name, children))
        }
    }

    /// Add an attribute.
    pub fn attr(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((key, value.into()));
        self
    }

    /// Add an attribute when the value is present and non-blank.
    pub fn opt_attr(self, key: &'static str, value: Option<&str>) -> Self {
        match value.filter(|v| !v.trim().is_empty()) {
            Some(v) => self.attr(key, v),
            None => self,
        }
    }

    /// Amount element with `currencyID` (omitted when the currency is blank).
    pub fn amount(name: &'static str, amount: &MonetaryAmount) -> Self {
        Self::text(name, format_decimal(amount.value))
            .opt_attr("currencyID", Some(amount.currency.as_str()))
    }

    /// Quantity element with `unitCode` when present.
    pub fn quantity(name: &'static str, quantity: &Quantity) -> Self {
        Self::text(name, format_decimal(quantity.value))
            .opt_attr("unitCode", quantity.unit_code.as_deref())
    }

    /// Plain decimal leaf (percentages).
    pub fn decimal(name: &'static str, value: Decimal) -> Self {
        Self::text(name, format_decimal(value))
    }

    /// Child elements with the given name, depth-first in document order.
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a Node> {
        let mut found = Vec::new();
        self.collect(name, &mut found);
        found
    }

    fn collect<'a>(&'a self, name: &str, found: &mut Vec<&'a Node>) {
        if let Body::Children(children) = &self.body {
            for child in children {
                if child.name == name {
                    found.push(child);
                }
                child.collect(name, found);
            }
        }
    }

    /// Text content of a leaf.
    pub fn text_value(&self) -> Option<&str> {
        match &self.body {
            Body::Text(t) => Some(t),
            Body::Children(_) => None,
        }
    }
}

/// Builder for a sequence of children that skips absent optional parts.
#[derive(Default)]
pub struct Children(Vec<Node>);

impl Children {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(mut self, node: Node) -> Self {
        self.0.push(node);
        self
    }

    pub fn opt(mut self, node: Option<Node>) -> Self {
        self.0.extend(node);
        self
    }

    pub fn extend(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.0.extend(nodes);
        self
    }

    pub fn into_vec(self) -> Vec<Node> {
        self.0
    }
}
