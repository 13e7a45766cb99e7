//! Side panel text and gauges to the right of the map.
use crate::command::gate::{Binding, HotkeyAction};
use crate::config::ViewerConfig;
use crate::models::{Snapshot, Unit};
use crate::surface::{Rect, Surface};

use super::entity::{draw_bar, Bar};
use super::RenderCtx;

const TEXT: &str = "black";
const FONT_PX: f64 = 15.0;

/// Which detail view the selection gets.
#[derive(Debug, Clone, Copy)]
pub enum SelectionPanel<'a> {
    Empty,
    Single(&'a Unit),
    Multi(usize),
}

impl<'a> SelectionPanel<'a> {
    pub fn from_units(units: &[&'a Unit]) -> Self {
        match units {
            [] => SelectionPanel::Empty,
            [one] => SelectionPanel::Single(*one),
            many => SelectionPanel::Multi(many.len()),
        }
    }
}

/// `<TYPE> <cmd>[<state>]`, or just the type for a unit without a command.
pub fn unit_title(cfg: &ViewerConfig, unit: &Unit) -> String {
    let name = cfg.unit_name(unit.unit_type).unwrap_or("UNKNOWN");
    match &unit.cmd {
        Some(c) => format!("{} {}[{}]", name, c.cmd, c.state),
        None => name.to_string(),
    }
}

pub fn binding_label(cfg: &ViewerConfig, binding: &Binding) -> String {
    match &binding.action {
        HotkeyAction::Command(id) => format!("{}: {}", binding.key, id),
        HotkeyAction::Build { unit_type, price } => {
            let name = cfg.unit_name(*unit_type).unwrap_or("UNKNOWN");
            format!("{}: build {} ({})", binding.key, name, price)
        }
    }
}

/// Replay-rate and progress readouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readouts {
    pub fps: u32,
    pub progress: Option<u32>,
}

pub fn draw_hud(
    surface: &mut dyn Surface,
    ctx: &RenderCtx<'_>,
    snapshot: &Snapshot,
    selected: &[&Unit],
    bindings: &[Binding],
    readouts: Readouts,
) {
    let layout = ctx.layout;
    let x0 = layout.panel_left();
    let indent = x0 + layout.scale(40.0);

    surface.fill_text(&format!("Tick: {}", snapshot.tick), x0, layout.scale(20.0), TEXT, FONT_PX);
    for (i, player) in snapshot.players.iter().enumerate() {
        let label = format!("PlayerId {} Resource {}", player.player_id, player.resource);
        surface.fill_text(&label, x0, layout.scale((i as f64 + 1.0) * 50.0), TEXT, FONT_PX);
    }

    match SelectionPanel::from_units(selected) {
        SelectionPanel::Empty => {}
        SelectionPanel::Single(unit) => draw_unit_detail(surface, ctx, unit, x0),
        SelectionPanel::Multi(n) => {
            surface.fill_text(&format!("{} units", n), indent, layout.scale(200.0), TEXT, FONT_PX);
        }
    }

    let mut y = layout.scale(330.0);
    for binding in bindings {
        surface.fill_text(&binding_label(ctx.cfg, binding), x0, y, TEXT, FONT_PX);
        y += 18.0;
    }

    let fps = format!("Current FPS is {}", readouts.fps);
    surface.fill_text(&fps, indent, layout.scale(570.0), TEXT, FONT_PX);
    if let Some(p) = readouts.progress {
        let label = format!("Current progress_percent is {}", p);
        surface.fill_text(&label, indent, layout.scale(670.0), TEXT, FONT_PX);
    }
}

fn draw_unit_detail(surface: &mut dyn Surface, ctx: &RenderCtx<'_>, unit: &Unit, x0: f64) {
    let mut y = ctx.layout.scale(150.0);
    surface.fill_text(&unit_title(ctx.cfg, unit), x0, y, TEXT, FONT_PX);

    let bar_at = |y: f64| Rect::new(x0, y, 100.0, 15.0);
    y += 20.0;
    let hp = format!("HP: {} / {}", unit.hp, unit.max_hp);
    draw_bar(
        surface,
        &Bar {
            rect: bar_at(y),
            ratio: unit.hp_ratio(),
            label: Some(&hp),
            label_color: TEXT,
            outline: TEXT,
            font_px: 10.0,
        },
    );
    for cd in &unit.cds {
        let Some((curr, ratio)) = cd.progress(ctx.tick) else {
            continue;
        };
        y += 20.0;
        let label = format!("{}: {} / {}", cd.name, curr, cd.cd);
        draw_bar(
            surface,
            &Bar {
                rect: bar_at(y),
                ratio,
                label: Some(&label),
                label_color: TEXT,
                outline: TEXT,
                font_px: 10.0,
            },
        );
    }
}
