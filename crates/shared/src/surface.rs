//! Drawing target abstraction: the browser canvas in production, a recorder in tests.
use crate::atlas::SourceRect;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Rect { x, y, w, h }
    }

    /// A `w` x `h` rect centered on `(cx, cy)`.
    pub fn centered(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Rect { x: cx - w / 2.0, y: cy - h / 2.0, w, h }
    }

    /// Normalized rect spanning two corners in any order.
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        let (x0, x1) = if a.0 <= b.0 { (a.0, b.0) } else { (b.0, a.0) };
        let (y0, y1) = if a.1 <= b.1 { (a.1, b.1) } else { (b.1, a.1) };
        Rect { x: x0, y: y0, w: x1 - x0, h: y1 - y0 }
    }
}

/// Immediate-mode 2D drawing.
///
/// Images are referenced by path; an implementation that has not finished
/// loading an image draws nothing for it.
pub trait Surface {
    fn clear(&mut self, w: f64, h: f64);
    fn draw_image(&mut self, image: &str, src: Option<SourceRect>, dst: Rect);
    fn fill_rect(&mut self, rect: Rect, color: &str);
    fn stroke_rect(&mut self, rect: Rect, color: &str, line_width: f64);
    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: &str, font_px: f64);
    fn set_alpha(&mut self, alpha: f64);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear { w: f64, h: f64 },
    Image { image: String, src: Option<SourceRect>, dst: Rect, alpha: f64 },
    FillRect { rect: Rect, color: String, alpha: f64 },
    StrokeRect { rect: Rect, color: String, line_width: f64, alpha: f64 },
    Text { text: String, x: f64, y: f64, color: String },
}

/// Records every call, tagging draws with the alpha in effect.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
    alpha: f64,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        RecordingSurface { ops: Vec::new(), alpha: 1.0 }
    }
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn images(&self) -> Vec<&DrawOp> {
        self.ops.iter().filter(|op| matches!(op, DrawOp::Image { .. })).collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, w: f64, h: f64) {
        self.ops.push(DrawOp::Clear { w, h });
    }

    fn draw_image(&mut self, image: &str, src: Option<SourceRect>, dst: Rect) {
        self.ops.push(DrawOp::Image { image: image.to_string(), src, dst, alpha: self.alpha });
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) {
        self.ops.push(DrawOp::FillRect { rect, color: color.to_string(), alpha: self.alpha });
    }

    fn stroke_rect(&mut self, rect: Rect, color: &str, line_width: f64) {
        self.ops.push(DrawOp::StrokeRect {
            rect,
            color: color.to_string(),
            line_width,
            alpha: self.alpha,
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: &str, _font_px: f64) {
        self.ops.push(DrawOp::Text { text: text.to_string(), x, y, color: color.to_string() });
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }
}
