//! Graph compilation - baking rate records into a searchable structure
//!
//! Vertices and edges live in flat arenas and refer to each other by index,
//! so the cyclic structure needs no shared ownership.

use chrono::{DateTime, Utc};
use hashbrown::HashMap;

use crate::error::Result;
use crate::rate::{truncate_day, Rate};

pub(crate) type VertexId = usize;

/// A directed rate edge as stored in the compiled graph.
#[derive(Debug, Clone)]
pub(crate) struct Edge {
    pub dst: VertexId,
    pub rate: f64,
    pub day: DateTime<Utc>,
    pub info: String,
    pub inverse: bool,
}

#[derive(Debug)]
pub(crate) struct Vertex {
    pub symbol: String,
    /// Must remain sorted from the most recent day.
    pub edges: Vec<Edge>,
}

/// A compiled graph of currencies connected by their conversion rates.
///
/// Query using [`convert`](crate::graph::convert), not directly. A graph is
/// never mutated after compilation, which is what makes lock-free concurrent
/// reads safe: holders of a handle can keep querying while a replacement
/// graph is being built elsewhere.
#[derive(Debug, Default)]
pub struct Graph {
    index: HashMap<String, VertexId>,
    vertices: Vec<Vertex>,
}

impl Graph {
    /// Compiles rate records into a conversion graph.
    ///
    /// Every input rate produces two edges: the forward edge as published,
    /// and the reciprocal edge marked as inverse. Duplicate rates are kept as
    /// parallel edges. Days are truncated to UTC midnight before indexing.
    ///
    /// Compilation currently has no failure mode; the `Result` reserves one.
    pub fn compile(rates: &[Rate]) -> Result<Graph> {
        let mut graph = Graph::default();

        for rate in rates {
            let day = truncate_day(rate.day);
            let src = graph.intern(&rate.from);
            let dst = graph.intern(&rate.to);

            graph.vertices[src].edges.push(Edge {
                dst,
                rate: rate.rate,
                day,
                info: rate.info.clone(),
                inverse: false,
            });
            graph.vertices[dst].edges.push(Edge {
                dst: src,
                rate: 1.0 / rate.rate,
                day,
                info: format!("{} (inverse)", rate.info),
                inverse: true,
            });
        }

        for vertex in &mut graph.vertices {
            // Stable sort: edges on the same day keep their insertion order.
            vertex.edges.sort_by(|a, b| b.day.cmp(&a.day));
        }

        Ok(graph)
    }

    /// Number of currencies in the graph.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterates over the currency symbols in the graph, in no special order.
    pub fn currencies(&self) -> impl Iterator<Item = &str> {
        self.vertices.iter().map(|v| v.symbol.as_str())
    }

    fn intern(&mut self, symbol: &str) -> VertexId {
        if let Some(&id) = self.index.get(symbol) {
            return id;
        }
        let id = self.vertices.len();
        self.vertices.push(Vertex {
            symbol: symbol.to_string(),
            edges: Vec::new(),
        });
        self.index.insert(symbol.to_string(), id);
        id
    }

    pub(crate) fn lookup(&self, symbol: &str) -> Option<VertexId> {
        self.index.get(symbol).copied()
    }

    pub(crate) fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id]
    }

    pub(crate) fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn rate(from: &str, to: &str, day: DateTime<Utc>, value: f64) -> Rate {
        Rate {
            from: from.to_string(),
            to: to.to_string(),
            rate: value,
            day,
            info: "test".to_string(),
        }
    }

    #[test]
    fn test_compile_creates_both_directions() {
        let day = Utc.with_ymd_and_hms(2022, 1, 2, 0, 0, 0).unwrap();
        let graph = Graph::compile(&[rate("USD", "EUR", day, 0.9)]).unwrap();

        assert_eq!(graph.len(), 2);

        let usd = graph.lookup("USD").unwrap();
        let eur = graph.lookup("EUR").unwrap();

        let forward = &graph.vertex(usd).edges[0];
        assert_eq!(forward.dst, eur);
        assert_eq!(forward.rate, 0.9);
        assert!(!forward.inverse);
        assert_eq!(forward.info, "test");

        let backward = &graph.vertex(eur).edges[0];
        assert_eq!(backward.dst, usd);
        assert!((backward.rate - 1.0 / 0.9).abs() < 1e-12);
        assert!(backward.inverse);
        assert_eq!(backward.info, "test (inverse)");
    }

    #[test]
    fn test_compile_truncates_days() {
        let noon = Utc.with_ymd_and_hms(2022, 1, 2, 12, 30, 0).unwrap();
        let midnight = Utc.with_ymd_and_hms(2022, 1, 2, 0, 0, 0).unwrap();
        let graph = Graph::compile(&[rate("USD", "EUR", noon, 0.9)]).unwrap();

        let usd = graph.lookup("USD").unwrap();
        assert_eq!(graph.vertex(usd).edges[0].day, midnight);
    }

    #[test]
    fn test_edges_sorted_most_recent_first() {
        let d1 = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        let d2 = Utc.with_ymd_and_hms(2022, 1, 2, 0, 0, 0).unwrap();
        let d3 = Utc.with_ymd_and_hms(2022, 1, 3, 0, 0, 0).unwrap();

        let graph = Graph::compile(&[
            rate("USD", "EUR", d1, 0.9),
            rate("USD", "EUR", d3, 0.92),
            rate("USD", "EUR", d2, 0.91),
        ])
        .unwrap();

        let usd = graph.lookup("USD").unwrap();
        let days: Vec<_> = graph.vertex(usd).edges.iter().map(|e| e.day).collect();
        assert_eq!(days, vec![d3, d2, d1]);
    }

    #[test]
    fn test_duplicates_become_parallel_edges() {
        let day = Utc.with_ymd_and_hms(2022, 1, 2, 0, 0, 0).unwrap();
        let graph = Graph::compile(&[
            rate("USD", "EUR", day, 0.9),
            rate("USD", "EUR", day, 0.9),
        ])
        .unwrap();

        let usd = graph.lookup("USD").unwrap();
        assert_eq!(graph.vertex(usd).edges.len(), 2);
    }

    #[test]
    fn test_currencies() {
        let day = Utc.with_ymd_and_hms(2022, 1, 2, 0, 0, 0).unwrap();
        let graph = Graph::compile(&[
            rate("USD", "EUR", day, 0.9),
            rate("EUR", "CZK", day, 25.0),
        ])
        .unwrap();

        let mut symbols: Vec<_> = graph.currencies().collect();
        symbols.sort_unstable();
        assert_eq!(symbols, vec!["CZK", "EUR", "USD"]);
    }

    #[test]
    fn test_empty_compile() {
        let graph = Graph::compile(&[]).unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.lookup("USD"), None);
    }
}
