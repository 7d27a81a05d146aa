// Path hierarchy reconstructed from sitemap URLs

use indexmap::IndexMap;
use serde::Serialize;
use url::Url;

/// One level of the site's path tree. Children keep first-seen order.
///
/// Equality ignores child order, so two trees built from the same URLs in a
/// different order compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HierarchyNode {
    children: IndexMap<String, HierarchyNode>,
}

impl HierarchyNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn children(&self) -> &IndexMap<String, HierarchyNode> {
        &self.children
    }

    pub fn child(&self, segment: &str) -> Option<&HierarchyNode> {
        self.children.get(segment)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes below this one.
    pub fn len(&self) -> usize {
        self.children.values().map(|child| 1 + child.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Longest chain of segments below this node.
    pub fn depth(&self) -> usize {
        self.children
            .values()
            .map(|child| 1 + child.depth())
            .max()
            .unwrap_or(0)
    }

    /// Return the child for `segment`, creating an empty one if needed.
    pub(crate) fn insert_if_absent(&mut self, segment: &str) -> &mut HierarchyNode {
        self.children.entry(segment.to_string()).or_default()
    }
}

/// Folds URLs into a [`HierarchyNode`] tree rooted at the site origin.
pub struct HierarchyBuilder {
    origin: String,
    root: HierarchyNode,
}

impl HierarchyBuilder {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            root: HierarchyNode::new(),
        }
    }

    pub fn insert(&mut self, url: &str) {
        let mut current = &mut self.root;
        for segment in path_segments(url, &self.origin) {
            current = current.insert_if_absent(segment);
        }
    }

    pub fn build(self) -> HierarchyNode {
        self.root
    }
}

/// Build the hierarchy for `urls`, stripping `origin` from each.
pub fn build_hierarchy(urls: &[String], origin: &str) -> HierarchyNode {
    let mut builder = HierarchyBuilder::new(origin);
    for url in urls {
        builder.insert(url);
    }
    builder.build()
}

/// Path segments of `url` once `origin` is stripped and surrounding slashes
/// trimmed. URLs outside the origin keep their full text and split into
/// degenerate segments. Empty segments inside the path are kept.
pub fn path_segments<'a>(url: &'a str, origin: &str) -> Vec<&'a str> {
    let path = url.strip_prefix(origin).unwrap_or(url).trim_matches('/');
    if path.is_empty() {
        return Vec::new();
    }
    path.split('/').collect()
}

/// `scheme://authority` of `url` exactly as written, if it has a tuple origin.
///
/// The text is sliced rather than re-serialized so it stays a prefix of every
/// URL written the same way (host case, explicit ports and IDN hosts kept).
pub fn derive_origin(url: &str) -> Option<String> {
    if !Url::parse(url).ok()?.origin().is_tuple() {
        return None;
    }

    let authority_start = url.find("://")? + 3;
    let authority_end = url[authority_start..]
        .find(['/', '?', '#'])
        .map_or(url.len(), |offset| authority_start + offset);

    Some(url[..authority_end].to_string())
}
