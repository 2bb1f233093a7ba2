//! The conversion search - breadth-first shortest path over rate edges
//!
//! The rate graph has cycles by construction (every ingested rate also adds
//! its reciprocal), so correctness hinges on the global set of visited
//! currencies, not on the shape of the graph. Each edge is only valid on a
//! specific day; since every vertex keeps its edges sorted from the most
//! recent day, the valid window for a query is found with two binary
//! searches.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HistfxError, Result};
use crate::graph::compile::{Edge, Graph, VertexId};
use crate::graph::options::{ConvertOptions, ResultDetail};
use crate::rate::{truncate_day, Rate};

/// A computed currency conversion obtained from [`convert`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Conversion {
    /// The computed rate. If a central bank published a rate for the
    /// currency pair, this is that rate; otherwise it is composed through
    /// one or more intermediate currencies.
    pub rate: f64,
    /// The conversion chain: `trace[0].from` is the source currency and the
    /// last element's `to` is the target. Empty unless the query asked for
    /// [`ResultDetail::FullTrace`].
    pub trace: Vec<Rate>,
}

/// A queued edge. `rate` starts as the edge's own rate; in rate-only mode it
/// carries the accumulated product along the path prefix instead, which is
/// what lets that mode skip predecessor bookkeeping entirely.
#[derive(Clone, Copy)]
struct Candidate {
    src: VertexId,
    edge: usize,
    rate: f64,
}

/// Computes the exchange rate between `from` and `to` on the given day.
///
/// Only rates published on `day` are used, unless the options extend the
/// window with [`ConvertOptions::accept_older_rate`]. The search returns the
/// chain with the fewest hops; among equal-length chains the one discovered
/// first wins, which biases toward fresher rates but does not guarantee
/// them.
///
/// Returns [`HistfxError::NotFound`] when no chain satisfies the query. An
/// unknown currency on either end produces the same error. A query with
/// `from == to` is not special-cased: no currency has an edge to itself, so
/// it also yields `NotFound`.
pub fn convert(
    graph: &Graph,
    from: &str,
    to: &str,
    day: DateTime<Utc>,
    options: &ConvertOptions,
) -> Result<Conversion> {
    let day = truncate_day(day);
    let cutoff = day - options.tolerance();

    let start = graph.lookup(from).ok_or(HistfxError::NotFound)?;
    let trace_mode = options.detail() == ResultDetail::FullTrace;

    let vertex_count = graph.vertex_count();
    let mut seen = vec![false; vertex_count];
    // The scan ordinal of the last candidate that enqueued an edge to each
    // vertex. Prevents enqueueing several same-destination edges (one per
    // day) from a single parent; only the most recent one goes in.
    let mut scheduled = vec![0usize; vertex_count];
    let mut parents: Vec<Option<Candidate>> = if trace_mode {
        vec![None; vertex_count]
    } else {
        Vec::new()
    };

    let mut queue: VecDeque<Candidate> = VecDeque::new();
    let edges = &graph.vertex(start).edges;
    let (lo, hi) = day_window(edges, day, cutoff);
    for (i, edge) in edges.iter().enumerate().take(hi).skip(lo) {
        queue.push_back(Candidate {
            src: start,
            edge: i,
            rate: edge.rate,
        });
    }
    seen[start] = true;

    let mut scan = 0usize;
    while let Some(candidate) = queue.pop_front() {
        let dst = graph.vertex(candidate.src).edges[candidate.edge].dst;
        if seen[dst] {
            continue;
        }

        if graph.vertex(dst).symbol == to {
            return Ok(finalize(graph, candidate, trace_mode.then_some(&parents)));
        }

        scan += 1;
        let edges = &graph.vertex(dst).edges;
        let (lo, hi) = day_window(edges, day, cutoff);
        for (i, edge) in edges.iter().enumerate().take(hi).skip(lo) {
            if seen[edge.dst] || scheduled[edge.dst] == scan {
                continue;
            }
            scheduled[edge.dst] = scan;
            queue.push_back(Candidate {
                src: dst,
                edge: i,
                rate: if trace_mode {
                    edge.rate
                } else {
                    candidate.rate * edge.rate
                },
            });
        }

        seen[dst] = true;
        if trace_mode {
            parents[dst] = Some(candidate);
        }
    }

    Err(HistfxError::NotFound)
}

/// Index range of the edges valid on `[cutoff, day]`, both ends inclusive.
/// Relies on `edges` being sorted by day descending.
fn day_window(edges: &[Edge], day: DateTime<Utc>, cutoff: DateTime<Utc>) -> (usize, usize) {
    let lo = edges.partition_point(|e| e.day > day);
    let hi = lo + edges[lo..].partition_point(|e| e.day >= cutoff);
    (lo, hi)
}

fn finalize(graph: &Graph, winning: Candidate, parents: Option<&Vec<Option<Candidate>>>) -> Conversion {
    let Some(parents) = parents else {
        // Rate-only: the winning candidate already carries the full product.
        return Conversion {
            rate: winning.rate,
            trace: Vec::new(),
        };
    };

    // Walk the predecessor table back to the source, rebuilding the product
    // from the original edge rates as we go.
    let mut rate = winning.rate;
    let mut trace = Vec::new();
    let mut current = winning;
    loop {
        trace.push(export(graph, &current));
        match parents[current.src] {
            Some(previous) => {
                current = previous;
                rate *= current.rate;
            }
            None => break,
        }
    }
    trace.reverse();

    Conversion { rate, trace }
}

/// Renders a candidate's edge as a plain rate record, hiding the arena
/// indices from callers.
fn export(graph: &Graph, candidate: &Candidate) -> Rate {
    let src = graph.vertex(candidate.src);
    let edge = &src.edges[candidate.edge];
    Rate {
        from: src.symbol.clone(),
        to: graph.vertex(edge.dst).symbol.clone(),
        rate: edge.rate,
        day: edge.day,
        info: edge.info.clone(),
    }
}
