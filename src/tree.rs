//! Dependency tree data structures
//!
//! Typed view of the converter's output: one [`DepTree`] per sentence, with
//! 0-indexed node ids and parent/child links resolved.

use rustc_hash::FxHashMap;

/// Unique identifier for a node (0-indexed position in the sentence)
pub type NodeId = usize;

/// Morphological features (`key=value|key=value`)
pub type Features = FxHashMap<String, String>;

/// A token in a dependency tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepNode {
    pub id: NodeId,
    pub form: String,
    pub lemma: String,
    pub pos: String,
    pub feats: Features,
    pub deprel: String,
    pub head: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl DepNode {
    /// Create a new node with no features and no attachments
    pub fn new(id: NodeId, form: &str, lemma: &str, pos: &str, deprel: &str) -> Self {
        Self {
            id,
            form: form.to_string(),
            lemma: lemma.to_string(),
            pos: pos.to_string(),
            feats: Features::default(),
            deprel: deprel.to_string(),
            head: None,
            children: Vec::new(),
        }
    }
}

/// A dependency tree (sentence)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepTree {
    pub nodes: Vec<DepNode>,
    pub root_id: Option<NodeId>,
}

impl DepTree {
    /// Build a tree from nodes in sentence order, linking each node to its
    /// head
    ///
    /// The first headless node becomes the root. Heads outside the sentence
    /// are left unlinked.
    pub fn from_nodes(mut nodes: Vec<DepNode>) -> Self {
        let mut root_id = None;
        for id in 0..nodes.len() {
            let head = nodes[id].head;
            match head {
                Some(head) if head < nodes.len() => nodes[head].children.push(id),
                Some(_) => {}
                None => {
                    root_id.get_or_insert(id);
                }
            }
        }
        Self { nodes, root_id }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&DepNode> {
        self.nodes.get(id)
    }

    pub fn root(&self) -> Option<&DepNode> {
        self.root_id.and_then(|id| self.node(id))
    }

    /// Governor of `id`, if it has one
    pub fn head(&self, id: NodeId) -> Option<&DepNode> {
        self.node(id)?.head.and_then(|head| self.node(head))
    }

    /// Direct dependents of `id` in sentence order
    pub fn dependents(&self, id: NodeId) -> impl Iterator<Item = &DepNode> {
        self.node(id)
            .into_iter()
            .flat_map(move |node| node.children.iter().filter_map(move |&child| self.node(child)))
    }

    /// Surface forms joined by spaces
    pub fn sentence(&self) -> String {
        self.nodes
            .iter()
            .map(|node| node.form.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
