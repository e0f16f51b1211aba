// ordfix-core/src/domain/document/tree.rs

use xmltree::{Element, XMLNode};

use crate::domain::rules::{InsertPosition, TargetPath};

/// Position of an element as child indices walked from the root.
/// The root itself has an empty address.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeAddress(Vec<usize>);

impl NodeAddress {
    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

/// Result of resolving a target path, creating missing elements if needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub address: NodeAddress,
    /// How many elements matched the full path before any creation or, when
    /// part of the chain was created, how many matched the prefix it was
    /// created under.
    pub matches: usize,
    /// How many elements were created to reach the target.
    pub created: usize,
}

impl Resolution {
    pub fn is_ambiguous(&self) -> bool {
        self.matches > 1
    }
}

/// A mutable XML order document and its identifier (usually the file name).
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: String,
    root: Element,
}

impl Document {
    pub fn new(id: impl Into<String>, root: Element) -> Self {
        Self {
            id: id.into(),
            root,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Every element matching `path`, in document order.
    pub fn find_all(&self, path: &TargetPath) -> Vec<NodeAddress> {
        self.find_steps(path.steps())
            .into_iter()
            .map(NodeAddress)
            .collect()
    }

    /// Text of the first element matching `path`.
    pub fn text_at(&self, path: &TargetPath) -> Option<String> {
        let first = self.find_all(path).into_iter().next()?;
        self.element(&first).map(element_text)
    }

    pub fn element(&self, address: &NodeAddress) -> Option<&Element> {
        let mut current = &self.root;
        for &index in &address.0 {
            current = match current.children.get(index) {
                Some(XMLNode::Element(child)) => child,
                _ => return None,
            };
        }
        Some(current)
    }

    fn element_mut(&mut self, address: &[usize]) -> Option<&mut Element> {
        let mut current = &mut self.root;
        for &index in address {
            current = match current.children.get_mut(index) {
                Some(XMLNode::Element(child)) => child,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Resolves `path` to a single element, creating the missing part of the
    /// chain under the deepest existing prefix. Intermediate elements are
    /// appended; the leaf is placed according to `insert`.
    ///
    /// Returns `None` only if an address computed during the walk no longer
    /// points at an element.
    pub fn resolve_or_create(
        &mut self,
        path: &TargetPath,
        insert: &InsertPosition,
    ) -> Option<Resolution> {
        let steps = path.steps();
        let matches = self.find_steps(steps);
        if let Some(first) = matches.first() {
            return Some(Resolution {
                address: NodeAddress(first.clone()),
                matches: matches.len(),
                created: 0,
            });
        }

        // Deepest prefix that already exists; the first one is extended. No
        // prefix at all means the chain hangs off the root.
        let (mut address, depth, prefix_matches) = (1..steps.len())
            .rev()
            .find_map(|k| {
                let found = self.find_steps(&steps[..k]);
                let count = found.len();
                found.into_iter().next().map(|first| (first, k, count))
            })
            .unwrap_or((Vec::new(), 0, 0));

        let append = InsertPosition::Last;
        let mut created = 0;
        for (offset, step) in steps[depth..].iter().enumerate() {
            let is_leaf = depth + offset + 1 == steps.len();
            let parent = self.element_mut(&address)?;
            let position = if is_leaf { insert } else { &append };
            let index = insert_child(parent, step, position);
            address.push(index);
            created += 1;
        }

        Some(Resolution {
            address: NodeAddress(address),
            matches: prefix_matches,
            created,
        })
    }

    /// Replaces the text content of the addressed element. Child elements,
    /// comments and attributes are kept. Returns whether the text changed,
    /// or `None` if the address is stale.
    pub fn set_text(&mut self, address: &NodeAddress, value: &str) -> Option<bool> {
        let element = self.element_mut(&address.0)?;
        let previous = element_text(element);

        element
            .children
            .retain(|node| !matches!(node, XMLNode::Text(_) | XMLNode::CData(_)));
        if !value.is_empty() {
            element.children.insert(0, XMLNode::Text(value.to_string()));
        }

        Some(previous != value)
    }

    /// All text and CDATA content, in document order.
    pub fn texts(&self) -> Vec<&str> {
        fn walk<'a>(element: &'a Element, out: &mut Vec<&'a str>) {
            for node in &element.children {
                match node {
                    XMLNode::Text(text) | XMLNode::CData(text) => out.push(text.as_str()),
                    XMLNode::Element(child) => walk(child, out),
                    _ => {}
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.root, &mut out);
        out
    }

    fn find_steps(&self, steps: &[String]) -> Vec<Vec<usize>> {
        let Some((first, rest)) = steps.split_first() else {
            return Vec::new();
        };

        let mut frontier = Vec::new();
        collect_named(&self.root, first, &mut Vec::new(), &mut frontier);

        for step in rest {
            let mut next = Vec::new();
            for address in &frontier {
                let Some(element) = self.element(&NodeAddress(address.clone())) else {
                    continue;
                };
                for (index, node) in element.children.iter().enumerate() {
                    if let XMLNode::Element(child) = node
                        && child.name == *step
                    {
                        let mut found = address.clone();
                        found.push(index);
                        next.push(found);
                    }
                }
            }
            frontier = next;
        }

        frontier
    }
}

/// Pre-order walk collecting every element named `name`, root included.
fn collect_named(
    element: &Element,
    name: &str,
    cursor: &mut Vec<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    if element.name == name {
        out.push(cursor.clone());
    }
    for (index, node) in element.children.iter().enumerate() {
        if let XMLNode::Element(child) = node {
            cursor.push(index);
            collect_named(child, name, cursor, out);
            cursor.pop();
        }
    }
}

fn insert_child(parent: &mut Element, name: &str, position: &InsertPosition) -> usize {
    let mut child = Element::new(name);
    // Same namespace as the parent so the new element is not pulled out of
    // the document's default namespace on output.
    child.namespace = parent.namespace.clone();
    child.prefix = parent.prefix.clone();

    let index = match position {
        InsertPosition::First => 0,
        InsertPosition::Last => parent.children.len(),
        InsertPosition::After(sibling) => parent
            .children
            .iter()
            .rposition(|node| matches!(node, XMLNode::Element(e) if e.name == *sibling))
            .map(|i| i + 1)
            .unwrap_or(parent.children.len()),
    };

    parent.children.insert(index, XMLNode::Element(child));
    index
}

/// Concatenated direct text of an element.
pub fn element_text(element: &Element) -> String {
    element
        .children
        .iter()
        .filter_map(|node| match node {
            XMLNode::Text(text) | XMLNode::CData(text) => Some(text.as_str()),
            _ => None,
        })
        .collect()
}
