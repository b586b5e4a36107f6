use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A section's value: either its own body, or its subsections in reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionNode<T> {
    Leaf(T),
    Node(IndexMap<String, T>),
}

impl<T> SectionNode<T> {
    pub fn as_leaf(&self) -> Option<&T> {
        match self {
            SectionNode::Leaf(value) => Some(value),
            SectionNode::Node(_) => None,
        }
    }

    pub fn subsections(&self) -> Option<&IndexMap<String, T>> {
        match self {
            SectionNode::Leaf(_) => None,
            SectionNode::Node(children) => Some(children),
        }
    }

    pub fn has_subsections(&self) -> bool {
        matches!(self, SectionNode::Node(_))
    }
}

/// Two-level section tree keyed by title. Insertion order is the document's reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionTree<T = String> {
    sections: IndexMap<String, SectionNode<T>>,
}

/// One leaf of a tree, flattened.
#[derive(Debug, PartialEq)]
pub struct LeafRef<'a, T> {
    pub section: &'a str,
    pub subsection: Option<&'a str>,
    pub value: &'a T,
}

impl<T> Clone for LeafRef<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for LeafRef<'_, T> {}

impl<T> Default for SectionTree<T> {
    fn default() -> Self {
        Self {
            sections: IndexMap::new(),
        }
    }
}

impl<T> SectionTree<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn get(&self, title: &str) -> Option<&SectionNode<T>> {
        self.sections.get(title)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SectionNode<T>)> {
        self.sections.iter()
    }

    pub fn titles(&self) -> impl Iterator<Item = &String> {
        self.sections.keys()
    }

    /// Write a section body. Returns false when the section already holds
    /// subsections, which are kept untouched.
    pub fn insert_leaf(&mut self, section: &str, value: T) -> bool {
        match self.sections.get_mut(section) {
            Some(SectionNode::Node(_)) => false,
            Some(node) => {
                *node = SectionNode::Leaf(value);
                true
            }
            None => {
                self.sections
                    .insert(section.to_string(), SectionNode::Leaf(value));
                true
            }
        }
    }

    /// Write a subsection body, turning the section into a nested map first if needed.
    /// A body previously stored directly on the section is discarded by that conversion.
    pub fn insert_subsection(&mut self, section: &str, subsection: &str, value: T) {
        let node = self
            .sections
            .entry(section.to_string())
            .or_insert_with(|| SectionNode::Node(IndexMap::new()));
        if let SectionNode::Leaf(_) = node {
            *node = SectionNode::Node(IndexMap::new());
        }
        if let SectionNode::Node(children) = node {
            children.insert(subsection.to_string(), value);
        }
    }

    /// Every leaf in reading order.
    pub fn leaves(&self) -> Vec<LeafRef<'_, T>> {
        let mut leaves = Vec::new();
        for (title, node) in &self.sections {
            match node {
                SectionNode::Leaf(value) => leaves.push(LeafRef {
                    section: title,
                    subsection: None,
                    value,
                }),
                SectionNode::Node(children) => {
                    for (sub_title, value) in children {
                        leaves.push(LeafRef {
                            section: title,
                            subsection: Some(sub_title),
                            value,
                        });
                    }
                }
            }
        }
        leaves
    }

    /// Same shape, transformed leaves.
    pub fn map_leaves<U, F>(&self, mut f: F) -> SectionTree<U>
    where
        F: FnMut(LeafRef<'_, T>) -> U,
    {
        let mut sections = IndexMap::with_capacity(self.sections.len());
        for (title, node) in &self.sections {
            let mapped = match node {
                SectionNode::Leaf(value) => SectionNode::Leaf(f(LeafRef {
                    section: title,
                    subsection: None,
                    value,
                })),
                SectionNode::Node(children) => SectionNode::Node(
                    children
                        .iter()
                        .map(|(sub_title, value)| {
                            let out = f(LeafRef {
                                section: title,
                                subsection: Some(sub_title),
                                value,
                            });
                            (sub_title.clone(), out)
                        })
                        .collect(),
                ),
            };
            sections.insert(title.clone(), mapped);
        }
        SectionTree { sections }
    }

    /// Like [`SectionTree::map_leaves`], stopping at the first leaf that fails.
    pub fn try_map_leaves<U, E, F>(&self, mut f: F) -> Result<SectionTree<U>, E>
    where
        F: FnMut(LeafRef<'_, T>) -> Result<U, E>,
    {
        let mut sections = IndexMap::with_capacity(self.sections.len());
        for (title, node) in &self.sections {
            let mapped = match node {
                SectionNode::Leaf(value) => SectionNode::Leaf(f(LeafRef {
                    section: title,
                    subsection: None,
                    value,
                })?),
                SectionNode::Node(children) => {
                    let mut mapped_children = IndexMap::with_capacity(children.len());
                    for (sub_title, value) in children {
                        let out = f(LeafRef {
                            section: title,
                            subsection: Some(sub_title),
                            value,
                        })?;
                        mapped_children.insert(sub_title.clone(), out);
                    }
                    SectionNode::Node(mapped_children)
                }
            };
            sections.insert(title.clone(), mapped);
        }
        Ok(SectionTree { sections })
    }
}

impl<T: Sync> SectionTree<T> {
    /// Like [`SectionTree::map_leaves`], with leaves processed on the rayon pool.
    /// Output order still follows the tree.
    pub fn par_map_leaves<U, F>(&self, f: F) -> SectionTree<U>
    where
        U: Send,
        F: Fn(LeafRef<'_, T>) -> U + Sync,
    {
        let results: Vec<U> = self.leaves().into_par_iter().map(&f).collect();
        let mut mapped = results.into_iter();

        let mut sections = IndexMap::with_capacity(self.sections.len());
        for (title, node) in &self.sections {
            let out = match node {
                SectionNode::Leaf(_) => match mapped.next() {
                    Some(value) => SectionNode::Leaf(value),
                    None => continue,
                },
                SectionNode::Node(children) => SectionNode::Node(
                    children
                        .keys()
                        .filter_map(|sub_title| {
                            mapped.next().map(|value| (sub_title.clone(), value))
                        })
                        .collect(),
                ),
            };
            sections.insert(title.clone(), out);
        }
        SectionTree { sections }
    }
}

impl SectionTree<String> {
    /// Every leaf body, in reading order.
    pub fn bodies(&self) -> Vec<&str> {
        self.leaves()
            .into_iter()
            .map(|leaf| leaf.value.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_overwrite_keeps_position() {
        let mut tree = SectionTree::new();
        tree.insert_leaf("Intro", "one".to_string());
        tree.insert_leaf("Body", "two".to_string());
        tree.insert_leaf("Intro", "three".to_string());

        let titles: Vec<_> = tree.titles().cloned().collect();
        assert_eq!(titles, vec!["Intro", "Body"]);
        assert_eq!(tree.get("Intro").unwrap().as_leaf().unwrap(), "three");
    }

    #[test]
    fn subsection_converts_leaf_to_node() {
        let mut tree = SectionTree::new();
        tree.insert_leaf("Scope", "preamble".to_string());
        tree.insert_subsection("Scope", "1.1. details", "nested".to_string());

        let node = tree.get("Scope").unwrap();
        assert!(node.has_subsections());
        let children = node.subsections().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children["1.1. details"], "nested");
    }

    #[test]
    fn leaf_write_does_not_clobber_subsections() {
        let mut tree = SectionTree::new();
        tree.insert_subsection("Scope", "1.1. a", "x".to_string());
        assert!(!tree.insert_leaf("Scope", "late body".to_string()));
        assert_eq!(tree.get("Scope").unwrap().subsections().unwrap()["1.1. a"], "x");
    }

    #[test]
    fn map_preserves_shape_and_order() {
        let mut tree = SectionTree::new();
        tree.insert_leaf("A", "a b c".to_string());
        tree.insert_subsection("B", "1.1. x", "x".to_string());
        tree.insert_subsection("B", "1.2. y", "y y".to_string());
        tree.insert_leaf("C", String::new());

        let sequential = tree.map_leaves(|leaf| leaf.value.split_whitespace().count());
        let parallel = tree.par_map_leaves(|leaf| leaf.value.split_whitespace().count());
        assert_eq!(sequential, parallel);

        let leaves = parallel.leaves();
        let flat: Vec<_> = leaves
            .iter()
            .map(|l| (l.section, l.subsection, *l.value))
            .collect();
        assert_eq!(
            flat,
            vec![
                ("A", None, 3),
                ("B", Some("1.1. x"), 1),
                ("B", Some("1.2. y"), 2),
                ("C", None, 0),
            ]
        );
    }

    #[test]
    fn try_map_keeps_shape_or_stops_at_first_error() {
        let mut tree = SectionTree::new();
        tree.insert_leaf("A", "1".to_string());
        tree.insert_subsection("B", "1.1. x", "2".to_string());
        tree.insert_subsection("B", "1.2. y", "oops".to_string());
        tree.insert_leaf("C", "3".to_string());

        let mut visited = Vec::new();
        let err = tree
            .try_map_leaves(|leaf| {
                visited.push(leaf.value.clone());
                leaf.value.parse::<u32>()
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid digit found in string");
        assert_eq!(visited, vec!["1", "2", "oops"]);

        tree.insert_subsection("B", "1.2. y", "4".to_string());
        let parsed = tree.try_map_leaves(|leaf| leaf.value.parse::<u32>()).unwrap();
        assert_eq!(parsed, tree.map_leaves(|leaf| leaf.value.parse::<u32>().unwrap()));
        assert_eq!(parsed.get("B").unwrap().subsections().unwrap()["1.2. y"], 4);
    }

    #[test]
    fn serializes_as_ordered_object() {
        let mut tree = SectionTree::new();
        tree.insert_leaf("Zeta", "z".to_string());
        tree.insert_subsection("Alpha", "1.1. a", "a".to_string());
        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(json, r#"{"Zeta":"z","Alpha":{"1.1. a":"a"}}"#);
    }
}
