//! Frame composition: map, entities, then the side panel.
pub mod entity;
pub mod hud;
pub mod map;

use crate::atlas::{AtlasBook, SpriteSpec};
use crate::config::ViewerConfig;
use crate::coords::Layout;
use crate::error::AtlasError;
use crate::models::Tick;
use crate::surface::{Rect, Surface};

/// Everything a draw call needs besides the surface and the entity.
#[derive(Clone, Copy)]
pub struct RenderCtx<'a> {
    pub layout: &'a Layout,
    pub cfg: &'a ViewerConfig,
    pub atlas: &'a AtlasBook,
    pub tick: Tick,
}

impl RenderCtx<'_> {
    /// Draw `spec` centered on `(px, py)`, animated by `key`.
    pub fn draw_sprite(
        &self,
        surface: &mut dyn Surface,
        spec: &SpriteSpec,
        key: &str,
        px: f64,
        py: f64,
    ) -> Result<(), AtlasError> {
        let src = spec.source_rect(key, self.tick, self.cfg.ticks_per_frame)?;
        let (w, h) = spec.base_size();
        let k = spec.scale() * self.layout.zoom();
        surface.draw_image(spec.image(), src, Rect::centered(px, py, w * k, h * k));
        Ok(())
    }
}
