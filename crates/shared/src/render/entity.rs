use crate::atlas::Orientation;
use crate::error::AtlasError;
use crate::models::{Bullet, BulletState, Unit};
use crate::surface::{Rect, Surface};

use super::RenderCtx;

/// Gap between the top of the HP bar and the unit anchor, at full zoom.
const HP_BAR_RISE: f64 = 27.0;
/// Outline margin around a selected unit.
const SELECT_MARGIN: f64 = 2.0;

/// Filled width of a `width`-pixel bar at `ratio`, rounded half up.
pub fn hp_bar_fill(width: f64, ratio: f64) -> f64 {
    (width * ratio + 0.5).floor()
}

pub fn hp_color(ratio: f64) -> &'static str {
    if ratio <= 0.2 {
        "red"
    } else if ratio <= 0.5 {
        "yellow"
    } else {
        "green"
    }
}

/// A horizontal gauge: HP bars on the map and in the panel, cooldown bars in the panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar<'a> {
    pub rect: Rect,
    pub ratio: f64,
    pub label: Option<&'a str>,
    pub label_color: &'a str,
    pub outline: &'a str,
    pub font_px: f64,
}

pub fn draw_bar(surface: &mut dyn Surface, bar: &Bar<'_>) {
    let Rect { x, y, w, h } = bar.rect;
    surface.fill_rect(bar.rect, "black");
    surface.stroke_rect(bar.rect, bar.outline, 2.0);
    surface.fill_rect(Rect::new(x, y, hp_bar_fill(w, bar.ratio), h), hp_color(bar.ratio));
    if let Some(label) = bar.label {
        surface.fill_text(label, x + w + 10.0, (y + h / 2.0).floor(), bar.label_color, bar.font_px);
    }
}

/// Sprite, HP bar, status label and, when `selected`, the highlight outline.
pub fn draw_unit(
    surface: &mut dyn Surface,
    ctx: &RenderCtx<'_>,
    unit: &Unit,
    facing: Orientation,
    selected: bool,
) -> Result<(), AtlasError> {
    let spec = ctx.atlas.unit_sprite_for(ctx.cfg, unit.unit_type)?;
    let (px, py) = ctx.layout.grid_to_pixel(unit.p.x, unit.p.y);
    ctx.draw_sprite(surface, spec, facing.as_key(), px, py)?;

    let zoom = ctx.layout.zoom();
    let size = ctx.cfg.unit_size * zoom;
    let color = ctx.cfg.player_color(unit.player_id);
    let status = unit.status_label();
    draw_bar(
        surface,
        &Bar {
            rect: Rect::new(px - size / 2.0, py - HP_BAR_RISE * zoom, size, ctx.cfg.hp_bar_height * zoom),
            ratio: unit.hp_ratio(),
            label: status.as_deref(),
            label_color: "white",
            outline: color,
            font_px: 10.0,
        },
    );

    if selected {
        let edge = (size + 2.0 * SELECT_MARGIN) * spec.select_scale();
        surface.stroke_rect(Rect::centered(px, py, edge, edge), color, 2.0);
    }
    Ok(())
}

pub fn draw_bullet(surface: &mut dyn Surface, ctx: &RenderCtx<'_>, bullet: &Bullet) -> Result<(), AtlasError> {
    if bullet.state == BulletState::BulletDone {
        return Ok(());
    }
    let (px, py) = ctx.layout.grid_to_pixel(bullet.p.x, bullet.p.y);
    ctx.draw_sprite(surface, &ctx.atlas.bullet, bullet.state.as_key(), px, py)
}

pub fn draw_drag_box(surface: &mut dyn Surface, rect: Rect) {
    surface.stroke_rect(rect, "green", 2.0);
}
