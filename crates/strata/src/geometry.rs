//! Shape outlines: where an edge touching a node at a given offset meets its boundary.
//!
//! Triangles point where their node's [`Apex`] says, in the frame the layout runs in.

use crate::model::{Apex, NodeLabel, Point, Shape};

fn ratio(offset: f64, half: f64) -> f64 {
    if half <= 0.0 {
        0.0
    } else {
        (offset.abs() / half).min(1.0)
    }
}

/// Distances from the centre to the top and bottom outline at horizontal offset `dx`.
pub fn vertical_reach(
    shape: Shape,
    apex: Apex,
    width: f64,
    height: f64,
    dx: f64,
) -> (f64, f64) {
    let hh = height / 2.0;
    let t = ratio(dx, width / 2.0);
    match shape {
        Shape::Box => (hh, hh),
        Shape::Rhombus => (hh * (1.0 - t), hh * (1.0 - t)),
        Shape::Ellipse => {
            let r = hh * (1.0 - t * t).max(0.0).sqrt();
            (r, r)
        }
        Shape::Triangle => match apex {
            Apex::Up => (hh - height * t, hh),
            Apex::Down => (hh, hh - height * t),
            Apex::Left => {
                if width <= 0.0 {
                    (hh, hh)
                } else {
                    let dx = dx.clamp(-width / 2.0, width / 2.0);
                    let r = hh * (dx + width / 2.0) / width;
                    (r, r)
                }
            }
        },
    }
}

/// Distances from the centre to the left and right outline at vertical offset `dy`.
pub fn horizontal_reach(
    shape: Shape,
    apex: Apex,
    width: f64,
    height: f64,
    dy: f64,
) -> (f64, f64) {
    let hw = width / 2.0;
    let t = ratio(dy, height / 2.0);
    match shape {
        Shape::Box => (hw, hw),
        Shape::Rhombus => (hw * (1.0 - t), hw * (1.0 - t)),
        Shape::Ellipse => {
            let r = hw * (1.0 - t * t).max(0.0).sqrt();
            (r, r)
        }
        Shape::Triangle => match apex {
            Apex::Up | Apex::Down => {
                if height <= 0.0 {
                    (hw, hw)
                } else {
                    let dy = dy.clamp(-height / 2.0, height / 2.0);
                    let from_apex = match apex {
                        Apex::Down => height / 2.0 - dy,
                        _ => dy + height / 2.0,
                    };
                    let r = hw * from_apex / height;
                    (r, r)
                }
            }
            // Negative once the slanted edge passes the centre line.
            Apex::Left => (hw - width * t, hw),
        },
    }
}

fn clamp_dx(n: &NodeLabel, dx: f64) -> f64 {
    let hw = n.width / 2.0;
    dx.clamp(-hw, hw)
}

fn clamp_dy(n: &NodeLabel, dy: f64) -> f64 {
    let hh = n.height / 2.0;
    dy.clamp(-hh, hh)
}

pub fn top_port(n: &NodeLabel, dx: f64) -> Point {
    let dx = clamp_dx(n, dx);
    let (up, _) = vertical_reach(n.shape, n.apex, n.width, n.height, dx);
    Point::new(n.x + dx, n.y - up)
}

pub fn bottom_port(n: &NodeLabel, dx: f64) -> Point {
    let dx = clamp_dx(n, dx);
    let (_, down) = vertical_reach(n.shape, n.apex, n.width, n.height, dx);
    Point::new(n.x + dx, n.y + down)
}

pub fn side_port(n: &NodeLabel, dy: f64, right: bool) -> Point {
    let dy = clamp_dy(n, dy);
    let (left, right_reach) = horizontal_reach(n.shape, n.apex, n.width, n.height, dy);
    let x = if right { n.x + right_reach } else { n.x - left };
    Point::new(x, n.y + dy)
}

/// True when `p` lies on the outline of `n` (within `eps`).
pub fn on_boundary(n: &NodeLabel, p: Point, eps: f64) -> bool {
    let dx = p.x - n.x;
    let dy = p.y - n.y;
    let (up, down) = vertical_reach(n.shape, n.apex, n.width, n.height, dx);
    let (left, right) = horizontal_reach(n.shape, n.apex, n.width, n.height, dy);
    let on_vertical = dx.abs() <= n.width / 2.0 + eps
        && ((dy + up).abs() <= eps || (dy - down).abs() <= eps);
    let on_horizontal = dy.abs() <= n.height / 2.0 + eps
        && ((dx + left).abs() <= eps || (dx - right).abs() <= eps);
    on_vertical || on_horizontal
}

/// Re-projects a shifted endpoint onto the same side of `n` that `original` touched.
pub fn slide_port(n: &NodeLabel, original: Point, shift: f64) -> Point {
    let dx = original.x - n.x;
    let dy = original.y - n.y;
    let vertical_side = n.width <= 0.0
        || (n.height > 0.0 && dy.abs() / (n.height / 2.0) >= dx.abs() / (n.width / 2.0));
    if vertical_side {
        if dy < 0.0 {
            top_port(n, dx + shift)
        } else {
            bottom_port(n, dx + shift)
        }
    } else {
        side_port(n, dy + shift, dx > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(shape: Shape) -> NodeLabel {
        NodeLabel {
            shape,
            x: 100.0,
            y: 50.0,
            width: 40.0,
            height: 20.0,
            ..Default::default()
        }
    }

    #[test]
    fn ports_lie_on_every_outline() {
        let shapes = [Shape::Box, Shape::Rhombus, Shape::Ellipse, Shape::Triangle];
        for (shape, apex) in shapes
            .into_iter()
            .flat_map(|s| [Apex::Up, Apex::Down, Apex::Left].map(|a| (s, a)))
        {
            let n = NodeLabel {
                apex,
                ..node(shape)
            };
            for dx in [-20.0, -7.0, 0.0, 13.0] {
                let (top, bottom) = (top_port(&n, dx), bottom_port(&n, dx));
                assert!(on_boundary(&n, top, 1e-9), "{shape:?} {apex:?} top {dx}");
                assert!(on_boundary(&n, bottom, 1e-9), "{shape:?} {apex:?} bottom {dx}");
            }
            for dy in [-5.0, 0.0, 9.0] {
                let (right, left) = (side_port(&n, dy, true), side_port(&n, dy, false));
                assert!(on_boundary(&n, right, 1e-9), "{shape:?} {apex:?} right {dy}");
                assert!(on_boundary(&n, left, 1e-9), "{shape:?} {apex:?} left {dy}");
            }
        }
    }

    #[test]
    fn triangle_apex_is_the_top_centre() {
        let n = node(Shape::Triangle);
        assert_eq!(top_port(&n, 0.0), Point::new(100.0, 40.0));
        assert_eq!(bottom_port(&n, 10.0), Point::new(110.0, 60.0));
        assert_eq!(side_port(&n, -10.0, true), Point::new(100.0, 40.0));
    }

    #[test]
    fn turned_triangles_move_their_apex() {
        let down = NodeLabel {
            apex: Apex::Down,
            ..node(Shape::Triangle)
        };
        assert_eq!(bottom_port(&down, 0.0), Point::new(100.0, 60.0));
        assert_eq!(top_port(&down, 10.0), Point::new(110.0, 40.0));

        let left = NodeLabel {
            apex: Apex::Left,
            ..node(Shape::Triangle)
        };
        assert_eq!(side_port(&left, 0.0, false), Point::new(80.0, 50.0));
        assert_eq!(side_port(&left, 5.0, true), Point::new(120.0, 55.0));
        assert_eq!(top_port(&left, 20.0), Point::new(120.0, 40.0));
        assert_eq!(top_port(&left, -20.0), Point::new(80.0, 50.0));
    }

    #[test]
    fn zero_sized_nodes_collapse_to_their_centre() {
        let n = NodeLabel {
            x: 3.0,
            y: 4.0,
            ..Default::default()
        };
        assert_eq!(top_port(&n, 5.0), Point::new(3.0, 4.0));
        assert_eq!(bottom_port(&n, 0.0), Point::new(3.0, 4.0));
    }
}
