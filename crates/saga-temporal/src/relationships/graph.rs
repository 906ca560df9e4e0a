//! Breadth-first relationship neighborhood.

use std::collections::{HashSet, VecDeque};

use saga_core::errors::SagaResult;
use saga_core::models::{IntervalRecord, RelationshipGraph, TimePoint};

/// Walk outward from `center`, expanding every entity up to depth
/// `max_depth`. `edges_of` returns the relationships touching one entity,
/// already restricted to `at`.
///
/// Depth 0 yields the center's own relationships and their far ends, so
/// `max_depth` hops reach `max_depth + 1` rings. Each relationship appears once.
pub(crate) fn neighborhood<T, F>(
    center: &str,
    at: Option<T>,
    max_depth: usize,
    mut edges_of: F,
) -> SagaResult<RelationshipGraph<T>>
where
    T: TimePoint,
    F: FnMut(&str) -> SagaResult<Vec<IntervalRecord<T>>>,
{
    let mut entity_ids = vec![center.to_string()];
    let mut seen_entities: HashSet<String> = HashSet::from([center.to_string()]);
    let mut seen_edges: HashSet<String> = HashSet::new();
    let mut relationships = Vec::new();

    let mut frontier = VecDeque::from([(center.to_string(), 0usize)]);
    while let Some((entity, depth)) = frontier.pop_front() {
        if depth > max_depth {
            continue;
        }
        for edge in edges_of(&entity)? {
            if !seen_edges.insert(edge.id.clone()) {
                continue;
            }
            if let Some(other) = edge.other_end(&entity) {
                if seen_entities.insert(other.to_string()) {
                    entity_ids.push(other.to_string());
                    frontier.push_back((other.to_string(), depth + 1));
                }
            }
            relationships.push(edge);
        }
    }

    Ok(RelationshipGraph {
        center_id: center.to_string(),
        at,
        relationships,
        entity_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn edge(id: &str, source: &str, target: &str) -> IntervalRecord<i64> {
        IntervalRecord {
            id: id.to_string(),
            source_id: source.to_string(),
            target_id: target.to_string(),
            relation_kind: "knows".to_string(),
            weight: 1.0,
            starts_at: None,
            ends_at: None,
            metadata: serde_json::Value::Null,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn chain() -> Vec<IntervalRecord<i64>> {
        vec![edge("ab", "a", "b"), edge("bc", "b", "c"), edge("cd", "c", "d")]
    }

    fn lookup(edges: &[IntervalRecord<i64>], id: &str) -> SagaResult<Vec<IntervalRecord<i64>>> {
        Ok(edges.iter().filter(|e| e.touches(id)).cloned().collect())
    }

    fn edge_ids(graph: &RelationshipGraph<i64>) -> Vec<&str> {
        graph.relationships.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn depth_zero_expands_the_center() {
        let edges = chain();
        let graph = neighborhood("a", None, 0, |id| lookup(&edges, id)).unwrap();
        assert_eq!(graph.entity_ids, vec!["a", "b"]);
        assert_eq!(edge_ids(&graph), vec!["ab"]);
    }

    #[test]
    fn depth_limits_hops() {
        let edges = chain();
        let graph = neighborhood("a", None, 1, |id| lookup(&edges, id)).unwrap();
        assert_eq!(graph.entity_ids, vec!["a", "b", "c"]);
        assert_eq!(edge_ids(&graph), vec!["ab", "bc"]);

        let graph = neighborhood("a", None, 2, |id| lookup(&edges, id)).unwrap();
        assert_eq!(graph.entity_ids, vec!["a", "b", "c", "d"]);
        assert_eq!(edge_ids(&graph), vec!["ab", "bc", "cd"]);
    }

    #[test]
    fn isolated_center_has_no_edges() {
        let edges = chain();
        let graph = neighborhood("z", None, 2, |id| lookup(&edges, id)).unwrap();
        assert_eq!(graph.entity_ids, vec!["z"]);
        assert!(graph.relationships.is_empty());
    }

    #[test]
    fn cycles_visit_each_edge_once() {
        let edges = vec![edge("ab", "a", "b"), edge("bc", "b", "c"), edge("ca", "c", "a")];
        let graph = neighborhood("a", None, 5, |id| lookup(&edges, id)).unwrap();
        assert_eq!(graph.relationships.len(), 3);
        assert_eq!(graph.entity_ids.len(), 3);
    }
}
