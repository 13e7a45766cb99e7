use std::collections::HashMap;

use minirts_shared::atlas::SourceRect;
use minirts_shared::surface::{Rect, Surface};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::api;

/// Sprite sheets by atlas path. Loading starts once and is never awaited by drawing.
#[derive(Default)]
pub struct ImageCache {
    images: HashMap<String, HtmlImageElement>,
}

impl ImageCache {
    pub fn load<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
        let mut images = HashMap::new();
        for path in paths {
            let Ok(img) = HtmlImageElement::new() else {
                tracing::warn!(image = path, "could not create image element");
                continue;
            };
            img.set_src(&api::image_url(path));

            let decode = img.decode();
            let name = path.to_string();
            wasm_bindgen_futures::spawn_local(async move {
                match wasm_bindgen_futures::JsFuture::from(decode).await {
                    Ok(_) => tracing::debug!(image = %name, "sprite sheet ready"),
                    Err(_) => tracing::warn!(image = %name, "sprite sheet failed to load"),
                }
            });
            images.insert(path.to_string(), img);
        }
        ImageCache { images }
    }

    fn get(&self, path: &str) -> Option<&HtmlImageElement> {
        self.images.get(path)
    }
}

pub fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .ok()??
        .dyn_into::<CanvasRenderingContext2d>()
        .ok()
}

/// `Surface` over a browser 2D context.
pub struct CanvasSurface<'a> {
    ctx: CanvasRenderingContext2d,
    images: &'a ImageCache,
}

impl<'a> CanvasSurface<'a> {
    pub fn new(ctx: CanvasRenderingContext2d, images: &'a ImageCache) -> Self {
        CanvasSurface { ctx, images }
    }
}

impl Surface for CanvasSurface<'_> {
    fn clear(&mut self, w: f64, h: f64) {
        self.ctx.clear_rect(0.0, 0.0, w, h);
    }

    fn draw_image(&mut self, image: &str, src: Option<SourceRect>, dst: Rect) {
        let Some(img) = self.images.get(image) else {
            return;
        };
        // An image that is still loading or failed to decode draws nothing.
        let drawn = match src {
            Some(s) => self
                .ctx
                .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                    img, s.x, s.y, s.w, s.h, dst.x, dst.y, dst.w, dst.h,
                ),
            None => self
                .ctx
                .draw_image_with_html_image_element_and_dw_and_dh(img, dst.x, dst.y, dst.w, dst.h),
        };
        if drawn.is_err() {
            tracing::trace!(image, "draw skipped");
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
    }

    fn stroke_rect(&mut self, rect: Rect, color: &str, line_width: f64) {
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(line_width);
        self.ctx.stroke_rect(rect.x, rect.y, rect.w, rect.h);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: &str, font_px: f64) {
        self.ctx.set_font(&format!("{}px Arial", font_px));
        self.ctx.set_fill_style_str(color);
        let _ = self.ctx.fill_text(text, x, y);
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.ctx.set_global_alpha(alpha);
    }
}
