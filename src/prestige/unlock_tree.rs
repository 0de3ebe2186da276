//! Purchase trees with prerequisite chains
//!
//! An unlock tree holds a fixed set of nodes in definition order plus
//! the subset already purchased. Prerequisites gate purchases; the
//! caller supplies the currency balance, the tree never holds one.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::core::bignum::BigNumber;

/// One purchasable upgrade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlockNode {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cost: BigNumber,
    pub tier: u32,
}

impl UnlockNode {
    pub fn new(id: &str, name: &str, description: &str, cost: f64, tier: u32) -> Self {
        UnlockNode {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            cost: BigNumber::new(cost),
            tier,
        }
    }
}

/// Nodes plus purchase state. Node order is definition order, which is
/// also the order unlocked ids are reported and saved in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnlockTree {
    nodes: Vec<UnlockNode>,
    requirements: AHashMap<String, Vec<String>>,
    unlocked: AHashSet<String>,
}

impl UnlockTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: UnlockNode) {
        self.nodes.push(node);
    }

    /// Declares that `id` cannot unlock until `prerequisite` has.
    pub fn add_requirement(&mut self, id: &str, prerequisite: &str) {
        self.requirements
            .entry(id.to_string())
            .or_default()
            .push(prerequisite.to_string());
    }

    pub fn node(&self, id: &str) -> Option<&UnlockNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn nodes(&self) -> &[UnlockNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.contains(id)
    }

    /// True when the node exists, is still locked, every prerequisite is
    /// unlocked, and `available` covers its cost.
    pub fn can_unlock(&self, id: &str, available: BigNumber) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        if self.unlocked.contains(id) {
            return false;
        }
        if !self.requirements_met(id) {
            return false;
        }
        available >= node.cost
    }

    /// True when every prerequisite of `id` is already unlocked.
    pub fn requirements_met(&self, id: &str) -> bool {
        match self.requirements.get(id) {
            Some(prereqs) => prereqs.iter().all(|p| self.unlocked.contains(p)),
            None => true,
        }
    }

    /// Marks a node unlocked without checking prerequisites or cost.
    /// Returns false for unknown or already-unlocked ids.
    pub fn unlock(&mut self, id: &str) -> bool {
        if self.node(id).is_none() || self.unlocked.contains(id) {
            return false;
        }
        self.unlocked.insert(id.to_string());
        true
    }

    /// Unlocked ids in definition order.
    pub fn unlocked_ids(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| self.unlocked.contains(&n.id))
            .map(|n| n.id.as_str())
            .collect()
    }

    pub fn unlocked_count(&self) -> usize {
        self.unlocked.len()
    }

    /// Fraction of nodes unlocked, 0.0 for an empty tree.
    pub fn progress(&self) -> f64 {
        if self.nodes.is_empty() {
            return 0.0;
        }
        self.unlocked.len() as f64 / self.nodes.len() as f64
    }

    /// Relocks everything; the node definitions stay.
    pub fn reset(&mut self) {
        self.unlocked.clear();
    }
}
