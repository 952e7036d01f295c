use std::collections::{BTreeMap, BTreeSet};

use crate::table::Table;

/// Creation order for a set of tables, derived from their table-level references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceOrder {
    /// Table positions, referenced tables first. `None` when a cycle exists.
    pub order: Option<Vec<usize>>,
    /// Physical names of the tables caught in a cycle.
    pub cycle: Option<Vec<String>>,
}

impl ReferenceOrder {
    /// The computed order, or declaration order when a cycle prevents one.
    pub fn order_or_declared(&self, len: usize) -> Vec<usize> {
        self.order.clone().unwrap_or_else(|| (0..len).collect())
    }
}

/// Build a deterministic creation order for the given tables.
///
/// References to tables outside the set are ignored. Among tables that are
/// ready at the same time, the one declared first wins.
pub fn build_reference_order(tables: &[Table]) -> ReferenceOrder {
    let graph = build_adjacency(tables);

    match toposort(&graph) {
        Ok(order) => ReferenceOrder {
            order: Some(order),
            cycle: None,
        },
        Err(cycle) => ReferenceOrder {
            order: None,
            cycle: Some(
                cycle
                    .into_iter()
                    .map(|idx| tables[idx].physical_name().unwrap_or_default().to_string())
                    .collect(),
            ),
        },
    }
}

/// Edges run from a referenced table to the tables that refer to it.
fn build_adjacency(tables: &[Table]) -> BTreeMap<usize, BTreeSet<usize>> {
    let mut by_name: BTreeMap<&str, usize> = BTreeMap::new();
    for (idx, table) in tables.iter().enumerate() {
        if let Some(name) = table.physical_name() {
            by_name.entry(name).or_insert(idx);
        }
    }

    let mut graph: BTreeMap<usize, BTreeSet<usize>> =
        (0..tables.len()).map(|idx| (idx, BTreeSet::new())).collect();

    for (idx, table) in tables.iter().enumerate() {
        for reference in table.table_references().unwrap_or_default() {
            if let Some(&referenced) = by_name.get(reference.physical_name.as_str()) {
                if referenced != idx {
                    graph.entry(referenced).or_default().insert(idx);
                }
            }
        }
    }

    graph
}

fn toposort(graph: &BTreeMap<usize, BTreeSet<usize>>) -> Result<Vec<usize>, Vec<usize>> {
    let mut indegree: BTreeMap<usize, usize> = graph.keys().map(|node| (*node, 0)).collect();

    for targets in graph.values() {
        for target in targets {
            *indegree.entry(*target).or_insert(0) += 1;
        }
    }

    let mut ready: BTreeSet<usize> = indegree
        .iter()
        .filter_map(|(node, count)| if *count == 0 { Some(*node) } else { None })
        .collect();

    let mut order = Vec::with_capacity(graph.len());

    while let Some(node) = ready.pop_first() {
        order.push(node);

        if let Some(targets) = graph.get(&node) {
            for target in targets {
                if let Some(count) = indegree.get_mut(target) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.insert(*target);
                    }
                }
            }
        }
    }

    if order.len() == graph.len() {
        Ok(order)
    } else {
        let cycle_nodes: Vec<usize> = indegree
            .into_iter()
            .filter_map(|(node, count)| if count > 0 { Some(node) } else { None })
            .collect();
        Err(cycle_nodes)
    }
}
