//! Bend rows for orthogonal routing.
//!
//! Inside one layer gap every edge whose ends differ in x needs a horizontal run. Runs are
//! packed into rows with an active list: a run goes into the first row whose last run ended at
//! least `bend_sep` before this one starts, otherwise it opens a new row.

use crate::graph::EdgeId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Run {
    pub edge: EdgeId,
    pub from: f64,
    pub to: f64,
}

impl Run {
    pub fn new(edge: EdgeId, a: f64, b: f64) -> Self {
        Self {
            edge,
            from: a.min(b),
            to: a.max(b),
        }
    }
}

/// Row index per run (same order as `runs`) and the number of rows used.
pub fn allocate(runs: &[Run], bend_sep: f64) -> (Vec<usize>, usize) {
    let mut sorted: Vec<usize> = (0..runs.len()).collect();
    sorted.sort_by(|&a, &b| {
        runs[a]
            .from
            .total_cmp(&runs[b].from)
            .then(runs[a].to.total_cmp(&runs[b].to))
            .then(runs[a].edge.cmp(&runs[b].edge))
    });
    let mut row_of = vec![0; runs.len()];
    let mut ends: Vec<f64> = Vec::new();
    for i in sorted {
        let run = runs[i];
        let row = match ends.iter().position(|&end| end + bend_sep <= run.from) {
            Some(r) => r,
            None => {
                ends.push(f64::NEG_INFINITY);
                ends.len() - 1
            }
        };
        ends[row] = run.to;
        row_of[i] = row;
    }
    (row_of, ends.len())
}

/// Gap height needed for `rows` rows spaced `bend_sep` apart, with the same clearance to both
/// layers.
pub fn required_gap(rows: usize, bend_sep: f64) -> f64 {
    if rows == 0 {
        0.0
    } else {
        (rows as f64 + 1.0) * bend_sep
    }
}
