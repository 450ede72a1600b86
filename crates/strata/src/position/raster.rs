//! Snapping to the coordinate raster.

use super::Spacing;
use crate::session::LayoutSession;

const EPS: f64 = 1e-9;

pub fn snap_up(value: f64, raster: f64) -> f64 {
    (value / raster - EPS).ceil() * raster
}

pub fn snap_down(value: f64, raster: f64) -> f64 {
    (value / raster + EPS).floor() * raster
}

/// Snaps every x to `raster_x`, layer by layer from the left. A node that moved right of its
/// packed position rounds up, one that moved left rounds down; when that would bring it closer
/// to its left neighbour than the spacing allows, the other direction is taken, and failing
/// that the smallest raster point past the limit.
pub fn snap_x(session: &mut LayoutSession, spacing: &Spacing, packed: &[f64]) {
    let raster = session.config.raster_x();
    let g = &mut session.graph;
    for layer in &session.layers {
        let mut prev: Option<(crate::graph::NodeId, f64)> = None;
        for &v in &layer.nodes {
            let Some(x) = g.node(v).map(|n| n.x) else {
                continue;
            };
            let start = packed.get(v.index()).copied().unwrap_or(x);
            let (first, second) = if x >= start {
                (snap_up(x, raster), snap_down(x, raster))
            } else {
                (snap_down(x, raster), snap_up(x, raster))
            };
            let snapped = match prev {
                None => first,
                Some((u, ux)) => {
                    let min = ux + spacing.gap(g, u, v);
                    if first >= min - EPS {
                        first
                    } else if second >= min - EPS {
                        second
                    } else {
                        snap_up(min, raster)
                    }
                }
            };
            if let Some(n) = g.node_mut(v) {
                n.x = snapped;
            }
            prev = Some((v, snapped));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapping_respects_direction() {
        assert_eq!(snap_up(11.0, 5.0), 15.0);
        assert_eq!(snap_down(14.0, 5.0), 10.0);
        assert_eq!(snap_up(10.0, 5.0), 10.0);
        assert_eq!(snap_down(10.0, 5.0), 10.0);
    }
}
