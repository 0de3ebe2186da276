//! The four fixed echo specialization trees
//!
//! Each tree is a strict linear chain of four tiers costing 1, 3, 10
//! and 25 echoes. Definitions are data; the effect of a node lives in
//! whatever queries [`crate::prestige::PrestigeManager`] exposes for it.

use crate::core::types::EchoTree;

use super::unlock_tree::{UnlockNode, UnlockTree};

/// Builds the schema for one specialization.
pub fn build_tree(tree: EchoTree) -> UnlockTree {
    match tree {
        EchoTree::Economist => economist_tree(),
        EchoTree::Manipulator => manipulator_tree(),
        EchoTree::Scholar => scholar_tree(),
        EchoTree::Architect => architect_tree(),
    }
}

/// Wealth generation bonuses.
fn economist_tree() -> UnlockTree {
    let mut tree = UnlockTree::new();
    tree.add_node(UnlockNode::new(
        "startup-capital",
        "Startup Capital",
        "Begin each run with double your starting gold",
        1.0,
        1,
    ));
    tree.add_node(UnlockNode::new(
        "market-sense",
        "Market Sense",
        "Gain +15% accuracy on market predictions",
        3.0,
        2,
    ));
    tree.add_requirement("market-sense", "startup-capital");
    tree.add_node(UnlockNode::new(
        "compound-master",
        "Compound Master",
        "All investments gain +2% base interest rate",
        10.0,
        3,
    ));
    tree.add_requirement("compound-master", "market-sense");
    tree.add_node(UnlockNode::new(
        "perfect-foresight",
        "Perfect Foresight",
        "Divination reveals events 50 years in advance",
        25.0,
        4,
    ));
    tree.add_requirement("perfect-foresight", "compound-master");
    tree
}

/// Agent and influence bonuses.
fn manipulator_tree() -> UnlockTree {
    let mut tree = UnlockTree::new();
    tree.add_node(UnlockNode::new(
        "established-network",
        "Established Network",
        "Begin each run with an established agent family",
        1.0,
        1,
    ));
    tree.add_node(UnlockNode::new(
        "whisper-network",
        "Whisper Network",
        "Agents can serve as double agents",
        3.0,
        2,
    ));
    tree.add_requirement("whisper-network", "established-network");
    tree.add_node(UnlockNode::new(
        "shadow-council",
        "Shadow Council",
        "Double the effectiveness of political investments",
        10.0,
        3,
    ));
    tree.add_requirement("shadow-council", "whisper-network");
    tree.add_node(UnlockNode::new(
        "puppetmaster",
        "Puppetmaster",
        "Immortal competitors begin with reduced power",
        25.0,
        4,
    ));
    tree.add_requirement("puppetmaster", "shadow-council");
    tree
}

/// Knowledge retention bonuses.
fn scholar_tree() -> UnlockTree {
    let mut tree = UnlockTree::new();
    tree.add_node(UnlockNode::new(
        "memory-fragments",
        "Memory Fragments",
        "Retain 25% of Ledger discoveries on prestige",
        1.0,
        1,
    ));
    tree.add_node(UnlockNode::new(
        "pattern-recognition",
        "Pattern Recognition",
        "Discover Ledger entries 25% faster",
        3.0,
        2,
    ));
    tree.add_requirement("pattern-recognition", "memory-fragments");
    tree.add_node(UnlockNode::new(
        "cosmic-insight",
        "Cosmic Insight",
        "Gain access to hidden investment opportunities",
        10.0,
        3,
    ));
    tree.add_requirement("cosmic-insight", "pattern-recognition");
    tree.add_node(UnlockNode::new(
        "omniscience",
        "Omniscience",
        "The Ledger persists completely across prestige",
        25.0,
        4,
    ));
    tree.add_requirement("omniscience", "cosmic-insight");
    tree
}

/// Preservation bonuses.
fn architect_tree() -> UnlockTree {
    let mut tree = UnlockTree::new();
    tree.add_node(UnlockNode::new(
        "phylactery-preservation",
        "Phylactery Preservation",
        "Retain one phylactery enchantment on prestige",
        1.0,
        1,
    ));
    tree.add_node(UnlockNode::new(
        "eternal-projects",
        "Eternal Projects",
        "Great works retain 25% progress on prestige",
        3.0,
        2,
    ));
    tree.add_requirement("eternal-projects", "phylactery-preservation");
    tree.add_node(UnlockNode::new(
        "dimensional-vault",
        "Dimensional Vault",
        "Retain 50% of gold on prestige",
        10.0,
        3,
    ));
    tree.add_requirement("dimensional-vault", "eternal-projects");
    tree.add_node(UnlockNode::new(
        "immortal-holdings",
        "Immortal Holdings",
        "One investment persists across prestige",
        25.0,
        4,
    ));
    tree.add_requirement("immortal-holdings", "dimensional-vault");
    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bignum::BigNumber;

    #[test]
    fn test_every_tree_has_four_tiers() {
        for tree_kind in EchoTree::ALL {
            let tree = build_tree(tree_kind);
            assert_eq!(tree.len(), 4, "{} tree", tree_kind.name());
            let tiers: Vec<u32> = tree.nodes().iter().map(|n| n.tier).collect();
            assert_eq!(tiers, vec![1, 2, 3, 4]);
        }
    }

    #[test]
    fn test_tier_costs_are_fixed() {
        for tree_kind in EchoTree::ALL {
            let tree = build_tree(tree_kind);
            let costs: Vec<f64> = tree.nodes().iter().map(|n| n.cost.to_f64()).collect();
            assert_eq!(costs, vec![1.0, 3.0, 10.0, 25.0]);
        }
    }

    #[test]
    fn test_chains_are_strictly_linear() {
        for tree_kind in EchoTree::ALL {
            let mut tree = build_tree(tree_kind);
            let ids: Vec<String> =
                tree.nodes().iter().map(|n| n.id.clone()).collect();
            let plenty = BigNumber::new(1000.0);
            // Only the first tier is open; each unlock opens exactly the next.
            for (i, id) in ids.iter().enumerate() {
                for (j, later) in ids.iter().enumerate() {
                    let expect_open = j == i;
                    assert_eq!(
                        tree.can_unlock(later, plenty),
                        expect_open,
                        "{} after {} unlocks",
                        later,
                        i
                    );
                }
                assert!(tree.unlock(id));
            }
        }
    }

    #[test]
    fn test_queried_node_ids_exist() {
        assert!(build_tree(EchoTree::Economist).node("startup-capital").is_some());
        assert!(build_tree(EchoTree::Economist).node("compound-master").is_some());
        assert!(build_tree(EchoTree::Scholar).node("memory-fragments").is_some());
        assert!(build_tree(EchoTree::Scholar).node("omniscience").is_some());
        assert!(build_tree(EchoTree::Architect).node("dimensional-vault").is_some());
    }
}
