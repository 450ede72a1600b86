//! Intrinsic sizes for nodes and edge labels.

use crate::config::TextMetrics;
use crate::model::Shape;
use crate::session::LayoutSession;
use unicode_width::UnicodeWidthStr;

/// Width and height of a multi-line text block, without padding.
pub fn text_size(text: &str, metrics: &TextMetrics) -> (f64, f64) {
    let mut widest: usize = 0;
    let mut lines: usize = 0;
    for line in text.lines() {
        widest = widest.max(UnicodeWidthStr::width(line));
        lines += 1;
    }
    let lines = lines.max(1);
    (
        widest as f64 * metrics.char_width,
        lines as f64 * metrics.line_height,
    )
}

/// Box around `text` for a node of the given shape. Pointed shapes need more room to keep the
/// text inside their outline.
pub fn node_size(text: &str, shape: Shape, metrics: &TextMetrics) -> (f64, f64) {
    let (w, h) = text_size(text, metrics);
    let (w, h) = (w + 2.0 * metrics.padding, h + 2.0 * metrics.padding);
    let factor = match shape {
        Shape::Box => 1.0,
        Shape::Ellipse => std::f64::consts::SQRT_2,
        Shape::Rhombus | Shape::Triangle => 2.0,
    };
    (w * factor, h * factor)
}

pub fn run(session: &mut LayoutSession) {
    let metrics = session.config.text.clone();
    session.graph.for_each_node_mut(|_, n| {
        if n.fixed_width && n.fixed_height {
            return;
        }
        let (w, h) = node_size(&n.title, n.shape, &metrics);
        if !n.fixed_width {
            n.width = w;
        }
        if !n.fixed_height {
            n.height = h;
        }
    });
    session.graph.for_each_edge_mut(|_, e| {
        if let Some(label) = e.label.as_mut() {
            let (w, h) = text_size(&label.text, &metrics);
            label.width = w;
            label.height = h;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_size_uses_display_columns() {
        let m = TextMetrics {
            char_width: 10.0,
            line_height: 20.0,
            padding: 0.0,
        };
        assert_eq!(text_size("ab\nabcd", &m), (40.0, 40.0));
        // Wide CJK glyphs take two columns.
        assert_eq!(text_size("日本", &m), (40.0, 20.0));
        assert_eq!(text_size("", &m), (0.0, 20.0));
    }

    #[test]
    fn pointed_shapes_are_enlarged() {
        let m = TextMetrics {
            char_width: 10.0,
            line_height: 10.0,
            padding: 5.0,
        };
        assert_eq!(node_size("ab", Shape::Box, &m), (30.0, 20.0));
        assert_eq!(node_size("ab", Shape::Rhombus, &m), (60.0, 40.0));
    }
}
