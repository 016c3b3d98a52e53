//! Dependency tracking for workflow ordering

use std::collections::{BTreeSet, HashMap, HashSet};
use std::hash::Hash;

/// Dependency graph between ordered nodes
///
/// Nodes are ordered keys (typically a step's index in position order);
/// when several nodes are ready at once the smallest key runs first.
#[derive(Debug, Clone)]
pub struct DependencyGraph<K> {
    /// Node → nodes that depend on it (dependents)
    dependents: HashMap<K, HashSet<K>>,
    /// Node → nodes it depends on (precedents)
    precedents: HashMap<K, HashSet<K>>,
    /// All known nodes
    nodes: BTreeSet<K>,
}

impl<K> Default for DependencyGraph<K> {
    fn default() -> Self {
        Self {
            dependents: HashMap::new(),
            precedents: HashMap::new(),
            nodes: BTreeSet::new(),
        }
    }
}

impl<K: Copy + Eq + Hash + Ord> DependencyGraph<K> {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node without dependencies
    pub fn add_node(&mut self, node: K) {
        self.nodes.insert(node);
    }

    /// Add a dependency: dependent depends on precedent
    pub fn add_dependency(&mut self, precedent: K, dependent: K) {
        self.nodes.insert(precedent);
        self.nodes.insert(dependent);
        if precedent == dependent {
            return;
        }
        self.dependents
            .entry(precedent)
            .or_default()
            .insert(dependent);
        self.precedents
            .entry(dependent)
            .or_default()
            .insert(precedent);
    }

    /// Get nodes that depend on the given node
    pub fn get_dependents(&self, node: K) -> impl Iterator<Item = K> + '_ {
        self.dependents
            .get(&node)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Get nodes that the given node depends on
    pub fn get_precedents(&self, node: K) -> impl Iterator<Item = K> + '_ {
        self.precedents
            .get(&node)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Order all nodes so every node follows its precedents.
    ///
    /// Among ready nodes the smallest key goes first, so an already
    /// consistent key order is kept unchanged. On a cycle, returns the
    /// nodes that could not be ordered, in key order.
    pub fn order(&self) -> std::result::Result<Vec<K>, Vec<K>> {
        let mut remaining: HashMap<K, usize> = self
            .nodes
            .iter()
            .map(|node| (*node, self.precedents.get(node).map_or(0, HashSet::len)))
            .collect();
        let mut ready: BTreeSet<K> = remaining
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(node, _)| *node)
            .collect();
        let mut result = Vec::with_capacity(self.nodes.len());

        while let Some(node) = ready.pop_first() {
            remaining.remove(&node);
            result.push(node);
            for dependent in self.get_dependents(node) {
                if let Some(count) = remaining.get_mut(&dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert(dependent);
                    }
                }
            }
        }

        if remaining.is_empty() {
            Ok(result)
        } else {
            let mut stuck: Vec<K> = remaining.into_keys().collect();
            stuck.sort();
            Err(stuck)
        }
    }

    /// Check if a node can reach itself through its precedents
    pub fn is_on_cycle(&self, node: K) -> bool {
        let mut visited = HashSet::new();
        let mut stack: Vec<K> = self.get_precedents(node).collect();
        while let Some(current) = stack.pop() {
            if current == node {
                return true;
            }
            if visited.insert(current) {
                stack.extend(self.get_precedents(current));
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_dependency() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency(0usize, 1);

        assert!(graph.get_dependents(0).any(|n| n == 1));
        assert!(graph.get_precedents(1).any(|n| n == 0));
    }

    #[test]
    fn test_order_keeps_consistent_order() {
        let mut graph = DependencyGraph::new();
        for node in 0..4usize {
            graph.add_node(node);
        }
        graph.add_dependency(0, 2);
        graph.add_dependency(1, 3);

        assert_eq!(graph.order().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_order_moves_producer_first() {
        let mut graph = DependencyGraph::new();
        for node in 0..3usize {
            graph.add_node(node);
        }
        // node 0 needs what node 2 produces
        graph.add_dependency(2, 0);

        assert_eq!(graph.order().unwrap(), vec![1, 2, 0]);
    }

    #[test]
    fn test_circular_reference() {
        let mut graph = DependencyGraph::new();
        graph.add_node(3usize);
        graph.add_dependency(0usize, 1);
        graph.add_dependency(1, 2);
        graph.add_dependency(2, 0);

        assert!(graph.is_on_cycle(0));
        assert!(!graph.is_on_cycle(3));
        assert_eq!(graph.order().unwrap_err(), vec![0, 1, 2]);
    }

    #[test]
    fn test_is_on_cycle() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency(0usize, 1);
        graph.add_dependency(1, 0);
        graph.add_dependency(1, 2);

        assert!(graph.is_on_cycle(0));
        assert!(graph.is_on_cycle(1));
        // downstream of the cycle, not on it
        assert!(!graph.is_on_cycle(2));
    }
}
