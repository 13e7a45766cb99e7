use crate::error::AtlasError;
use crate::models::{MapGrid, TERRAIN_FOG};
use crate::surface::{Rect, Surface};

use super::RenderCtx;

/// Frame key for animated terrain sheets.
pub const TERRAIN_KEY: &str = "default";

/// How a single map cell is composited this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellLook {
    /// In vision: terrain at full opacity.
    Visible(usize),
    /// Out of vision but observed before: fog, then faded terrain.
    Remembered(usize),
    /// Never observed: fog only.
    Unseen,
}

pub fn classify(map: &MapGrid, idx: usize, spectator: bool) -> CellLook {
    let terrain = map.terrain_at(idx);
    if !spectator && map.was_seen_before(idx) {
        CellLook::Remembered(terrain)
    } else if terrain == TERRAIN_FOG {
        CellLook::Unseen
    } else {
        CellLook::Visible(terrain)
    }
}

fn draw_terrain(
    surface: &mut dyn Surface,
    ctx: &RenderCtx<'_>,
    terrain: usize,
    dst: Rect,
) -> Result<(), AtlasError> {
    let spec = ctx.atlas.terrain_sprite(terrain)?;
    let src = spec.source_rect(TERRAIN_KEY, ctx.tick, ctx.cfg.ticks_per_frame)?;
    surface.draw_image(spec.image(), src, dst);
    Ok(())
}

fn draw_fog(surface: &mut dyn Surface, ctx: &RenderCtx<'_>, dst: Rect) -> Result<(), AtlasError> {
    let src = ctx.atlas.fog.source_rect(TERRAIN_KEY, ctx.tick, ctx.cfg.ticks_per_frame)?;
    surface.draw_image(ctx.atlas.fog.image(), src, dst);
    Ok(())
}

/// Paint every cell row-major, compositing fog of war.
pub fn draw_map(
    surface: &mut dyn Surface,
    ctx: &RenderCtx<'_>,
    map: &MapGrid,
    spectator: bool,
) -> Result<(), AtlasError> {
    let cell = ctx.layout.cell_size;
    for y in 0..map.height {
        for x in 0..map.width {
            let idx = y * map.width + x;
            let dst = Rect::new(x as f64 * cell, y as f64 * cell, cell, cell);
            match classify(map, idx, spectator) {
                CellLook::Visible(terrain) => draw_terrain(surface, ctx, terrain, dst)?,
                CellLook::Remembered(terrain) => {
                    draw_fog(surface, ctx, dst)?;
                    if terrain != TERRAIN_FOG {
                        surface.set_alpha(ctx.cfg.remembered_alpha);
                        let drawn = draw_terrain(surface, ctx, terrain, dst);
                        surface.set_alpha(1.0);
                        drawn?;
                    }
                }
                CellLook::Unseen => draw_fog(surface, ctx, dst)?,
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::AtlasBook;
    use crate::config::ViewerConfig;
    use crate::coords::Layout;
    use crate::surface::{DrawOp, RecordingSurface};

    fn images(s: &RecordingSurface) -> Vec<(String, f64)> {
        s.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Image { image, alpha, .. } => Some((image.clone(), *alpha)),
                _ => None,
            })
            .collect()
    }

    fn render(map: &MapGrid, spectator: bool) -> RecordingSurface {
        let layout = Layout::with_cell_size(50.0, map.width, map.height);
        let cfg = ViewerConfig::default();
        let atlas = AtlasBook::minirts();
        let ctx = RenderCtx { layout: &layout, cfg: &cfg, atlas: &atlas, tick: 0 };
        let mut s = RecordingSurface::new();
        draw_map(&mut s, &ctx, map, spectator).unwrap();
        s
    }

    #[test]
    fn test_classify_cells() {
        let map = MapGrid {
            width: 3,
            height: 1,
            slots: vec![0, 2, 1],
            seen_before: Some(vec![false, false, true]),
            units: None,
        };
        assert_eq!(classify(&map, 0, false), CellLook::Visible(0));
        assert_eq!(classify(&map, 1, false), CellLook::Unseen);
        assert_eq!(classify(&map, 2, false), CellLook::Remembered(1));
        assert_eq!(classify(&map, 2, true), CellLook::Visible(1));
    }

    #[test]
    fn test_remembered_cell_fades_terrain_over_fog() {
        let map = MapGrid {
            width: 1,
            height: 1,
            slots: vec![1],
            seen_before: Some(vec![true]),
            units: None,
        };
        let drawn = images(&render(&map, false));
        assert_eq!(drawn.len(), 2);
        assert_eq!(drawn[0].0, "imgs/fog.png");
        assert!((drawn[0].1 - 1.0).abs() < 1e-9);
        assert_eq!(drawn[1].0, "imgs/terrain_impassable.png");
        assert!((drawn[1].1 - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_unseen_cell_draws_fog_only() {
        let map = MapGrid {
            width: 1,
            height: 1,
            slots: vec![TERRAIN_FOG],
            seen_before: Some(vec![false]),
            units: None,
        };
        let drawn = images(&render(&map, false));
        assert_eq!(drawn, vec![("imgs/fog.png".to_string(), 1.0)]);
    }

    #[test]
    fn test_cells_are_row_major() {
        let map = MapGrid { width: 2, height: 2, slots: vec![0, 1, 1, 0], ..Default::default() };
        let s = render(&map, true);
        let dsts: Vec<Rect> = s
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Image { dst, .. } => Some(*dst),
                _ => None,
            })
            .collect();
        assert_eq!(dsts[1], Rect::new(50.0, 0.0, 50.0, 50.0));
        assert_eq!(dsts[2], Rect::new(0.0, 50.0, 50.0, 50.0));
    }

    #[test]
    fn test_missing_terrain_sprite_is_an_error() {
        let map = MapGrid { width: 1, height: 1, slots: vec![7], ..Default::default() };
        let layout = Layout::with_cell_size(50.0, 1, 1);
        let cfg = ViewerConfig::default();
        let atlas = AtlasBook::minirts();
        let ctx = RenderCtx { layout: &layout, cfg: &cfg, atlas: &atlas, tick: 0 };
        let mut s = RecordingSurface::new();
        assert_eq!(
            draw_map(&mut s, &ctx, &map, false),
            Err(AtlasError::MissingTerrainSprite(7))
        );
    }
}
