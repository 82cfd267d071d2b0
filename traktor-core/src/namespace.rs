//! Nested trees of endpoint templates.
//!
//! Provider APIs are described as a [`Namespace`]: each entry is either a leaf
//! [`Endpoint`] or a nested namespace, decided when the tree is built.

use std::collections::BTreeMap;

use crate::error::CoreError;
use crate::template::{Endpoint, EndpointBuilder};

/// A node of an endpoint namespace.
#[derive(Debug, Clone)]
pub enum ApiNode {
    /// A leaf endpoint template.
    Endpoint(Endpoint),
    /// A nested group of endpoints.
    Namespace(Namespace),
}

impl From<Endpoint> for ApiNode {
    fn from(endpoint: Endpoint) -> Self {
        Self::Endpoint(endpoint)
    }
}

impl From<EndpointBuilder> for ApiNode {
    fn from(builder: EndpointBuilder) -> Self {
        Self::Endpoint(builder.build())
    }
}

impl From<Namespace> for ApiNode {
    fn from(namespace: Namespace) -> Self {
        Self::Namespace(namespace)
    }
}

/// A named group of endpoints and nested groups.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    entries: BTreeMap<String, ApiNode>,
}

impl Namespace {
    /// Creates an empty namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an endpoint, builder style.
    #[must_use]
    pub fn endpoint(mut self, name: impl Into<String>, endpoint: impl Into<Endpoint>) -> Self {
        self.entries
            .insert(name.into(), ApiNode::Endpoint(endpoint.into()));
        self
    }

    /// Adds a nested namespace, builder style.
    #[must_use]
    pub fn namespace(mut self, name: impl Into<String>, namespace: Namespace) -> Self {
        self.entries
            .insert(name.into(), ApiNode::Namespace(namespace));
        self
    }

    /// Inserts a node, returning the node it replaced.
    pub fn insert(&mut self, name: impl Into<String>, node: impl Into<ApiNode>) -> Option<ApiNode> {
        self.entries.insert(name.into(), node.into())
    }

    /// Returns a direct child.
    pub fn get(&self, name: &str) -> Option<&ApiNode> {
        self.entries.get(name)
    }

    /// Looks up a node by dotted path, e.g. `movies.summary`.
    pub fn lookup(&self, path: &str) -> Option<&ApiNode> {
        let mut segments = path.split('.');
        let mut node = self.entries.get(segments.next()?)?;
        for segment in segments {
            match node {
                ApiNode::Namespace(ns) => node = ns.entries.get(segment)?,
                ApiNode::Endpoint(_) => return None,
            }
        }
        Some(node)
    }

    /// Iterates over the direct children.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ApiNode)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no children.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All leaf endpoints with their dotted paths, depth first.
    pub fn endpoints(&self) -> Vec<(String, &Endpoint)> {
        let mut out = Vec::new();
        self.collect_endpoints("", &mut out);
        out
    }

    fn collect_endpoints<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a Endpoint)>) {
        for (name, node) in &self.entries {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}.{name}")
            };
            match node {
                ApiNode::Endpoint(endpoint) => out.push((path, endpoint)),
                ApiNode::Namespace(ns) => ns.collect_endpoints(&path, out),
            }
        }
    }

    /// Runs [`Endpoint::check`] on every leaf.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn check(&self) -> Result<(), CoreError> {
        self.endpoints()
            .into_iter()
            .try_for_each(|(_, endpoint)| endpoint.check())
    }
}

// ============================================================================
// Tests
// ============================================================================
