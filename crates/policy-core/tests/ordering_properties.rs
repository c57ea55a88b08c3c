use std::collections::HashSet;

use policy_core::{Error, PredecessorGraph};
use proptest::prelude::*;

fn id(n: usize) -> String {
    format!("s{}", n)
}

/// Predecessors that only point backwards, so the graph is acyclic, plus a
/// shuffled insertion order.
fn acyclic() -> impl Strategy<Value = (Vec<Option<usize>>, Vec<usize>)> {
    (1usize..16).prop_flat_map(|n| {
        let preds: Vec<BoxedStrategy<Option<usize>>> = (0..n)
            .map(|i| {
                if i == 0 {
                    Just(None::<usize>).boxed()
                } else {
                    proptest::option::of(0..i).boxed()
                }
            })
            .collect();
        (preds, Just((0..n).collect::<Vec<_>>()).prop_shuffle())
    })
}

/// Predecessors pointing anywhere, cycles included.
fn arbitrary() -> impl Strategy<Value = Vec<Option<usize>>> {
    (1usize..10).prop_flat_map(|n| proptest::collection::vec(proptest::option::of(0..n), n))
}

fn build(preds: &[Option<usize>], insertion: &[usize]) -> PredecessorGraph {
    PredecessorGraph::from_pairs(insertion.iter().map(|&i| (id(i), preds[i].map(id))))
}

fn has_cycle(preds: &[Option<usize>]) -> bool {
    (0..preds.len()).any(|start| {
        let mut seen = HashSet::new();
        let mut current = Some(start);
        while let Some(node) = current {
            if !seen.insert(node) {
                return true;
            }
            current = preds[node];
        }
        false
    })
}

proptest! {
    #[test]
    fn test_acyclic_graphs_linearize_totally((preds, insertion) in acyclic()) {
        let graph = build(&preds, &insertion);
        let order = graph.linearize().unwrap();

        // Every section exactly once
        prop_assert_eq!(order.len(), preds.len());
        let unique: HashSet<&String> = order.iter().collect();
        prop_assert_eq!(unique.len(), preds.len());

        // The sequence starts at a section without predecessor
        prop_assert_eq!(graph.predecessor(&order[0]), None);

        // Every section comes after the one it names
        for (pos, node) in order.iter().enumerate() {
            if let Some(pred) = graph.predecessor(node) {
                let pred_pos = order.iter().position(|o| o == pred).unwrap();
                prop_assert!(pred_pos < pos);
            }
        }
    }

    #[test]
    fn test_cycle_detection_matches_graph(preds in arbitrary()) {
        let insertion: Vec<usize> = (0..preds.len()).collect();
        let graph = build(&preds, &insertion);

        match graph.validate() {
            Ok(()) => {
                prop_assert!(!has_cycle(&preds));
                prop_assert_eq!(graph.linearize().unwrap().len(), preds.len());
            }
            Err(Error::OrderingCycle { chain }) => {
                prop_assert!(has_cycle(&preds));
                prop_assert!(chain.len() >= 2);
                prop_assert_eq!(chain.first(), chain.last());
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    #[test]
    fn test_splice_out_keeps_every_other_section((preds, insertion) in acyclic(), victim in 0usize..16) {
        let graph = build(&preds, &insertion);
        let victim = id(victim % preds.len());

        let spliced = graph.splice_out(&victim);

        prop_assert!(!spliced.contains(&victim));
        prop_assert_eq!(spliced.len(), preds.len() - 1);

        let remaining: HashSet<String> = spliced.linearize().unwrap().into_iter().collect();
        let expected: HashSet<String> = graph.ids().filter(|n| *n != victim).map(str::to_string).collect();
        prop_assert_eq!(remaining, expected);

        // Former successors now follow the victim's own predecessor
        for successor in graph.successors_of(&victim) {
            prop_assert_eq!(spliced.predecessor(successor), graph.predecessor(&victim));
        }
    }
}
