//! The viewer's whole client-side state and its event handlers.
//!
//! Every input (snapshot, resize, pointer, key, widget) goes through a
//! `&mut ViewerSession`; rendering reads it and never mutates it.
use std::collections::HashMap;

use crate::atlas::{AtlasBook, Orientation};
use crate::command::gate::{self, Binding, HotkeyAction};
use crate::command::{emit, Command, CommandSink};
use crate::config::ViewerConfig;
use crate::controls::{ControlAction, SpeedControl};
use crate::coords::Layout;
use crate::error::AtlasError;
use crate::models::{Snapshot, Tick, Unit, UnitId};
use crate::render::entity::{draw_bullet, draw_drag_box, draw_unit};
use crate::render::hud::{draw_hud, Readouts};
use crate::render::map::draw_map;
use crate::render::RenderCtx;
use crate::selection::{Gesture, PointerButton, SelectionState};
use crate::surface::Surface;

pub struct ViewerSession {
    cfg: ViewerConfig,
    viewport: (f64, f64),
    layout: Layout,
    snapshot: Option<Snapshot>,
    selection: SelectionState,
    speed: SpeedControl,
    facing: HashMap<UnitId, Orientation>,
    /// Hotkey waiting for its target click.
    armed: Option<char>,
    scrub: u32,
}

impl ViewerSession {
    pub fn new(cfg: ViewerConfig) -> Self {
        let layout = Layout::fit(0.0, 0.0, 0, 0, &cfg);
        let speed = SpeedControl::new(cfg.min_speed, cfg.max_speed);
        ViewerSession {
            cfg,
            viewport: (0.0, 0.0),
            layout,
            snapshot: None,
            selection: SelectionState::new(),
            speed,
            facing: HashMap::new(),
            armed: None,
            scrub: 0,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.cfg
    }

    /// Canvas size in pixels, as last passed to `resize`.
    pub fn viewport(&self) -> (f64, f64) {
        self.viewport
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn armed(&self) -> Option<char> {
        self.armed
    }

    /// Tick stamped on outgoing commands: the latest snapshot's.
    pub fn tick(&self) -> Tick {
        self.snapshot.as_ref().map_or(0, |s| s.tick)
    }

    pub fn speed(&self) -> i32 {
        self.speed.speed()
    }

    pub fn fps(&self) -> u32 {
        self.speed.fps()
    }

    pub fn scrub_percent(&self) -> u32 {
        self.scrub
    }

    pub fn facing(&self, id: UnitId) -> Orientation {
        self.facing.get(&id).copied().unwrap_or(Orientation::Down)
    }

    pub fn on_snapshot(&mut self, snapshot: Snapshot) {
        if snapshot.spectator && snapshot.rts_map.seen_before.is_some() {
            tracing::warn!(tick = snapshot.tick, "spectator snapshot carries seen_before; ignoring it");
        }

        let mut facing = HashMap::with_capacity(snapshot.units.len());
        for u in snapshot.units.iter().chain(snapshot.remembered_units()) {
            let last = self.facing.get(&u.id).copied();
            let dir = Orientation::infer(u.p.x - u.last_p.x, u.p.y - u.last_p.y, last);
            facing.insert(u.id, dir);
        }
        self.facing = facing;

        self.selection.sync_from_server(snapshot.selected_units.as_deref());
        if let Some(p) = snapshot.replay_progress() {
            self.scrub = p;
        }

        let (cols, rows) = (snapshot.rts_map.width, snapshot.rts_map.height);
        self.snapshot = Some(snapshot);
        if cols != self.layout.map_cols || rows != self.layout.map_rows {
            self.refit();
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport = (width, height);
        self.refit();
    }

    fn refit(&mut self) {
        let (cols, rows) = self
            .snapshot
            .as_ref()
            .map_or((0, 0), |s| (s.rts_map.width, s.rts_map.height));
        self.layout = Layout::fit(self.viewport.0, self.viewport.1, cols, rows, &self.cfg);
    }

    pub fn pointer_down(&mut self, button: PointerButton, px: f64, py: f64) {
        let Some(snap) = &self.snapshot else {
            return;
        };
        self.selection.pointer_down(button, px, py, &self.layout, &snap.rts_map);
    }

    pub fn pointer_move(&mut self, px: f64, py: f64) {
        self.selection.pointer_move(px, py, self.cfg.drag_threshold);
    }

    pub fn pointer_up(&mut self, button: PointerButton, px: f64, py: f64, sink: &mut dyn CommandSink) {
        let Some(snap) = &self.snapshot else {
            return;
        };
        let Some(gesture) = self.selection.pointer_up(button, px, py, &self.layout, &snap.rts_map) else {
            return;
        };
        let cmd = match gesture {
            Gesture::Point(c) => Command::Point(c),
            Gesture::Box(a, b) => Command::Box(a, b),
            Gesture::Context(c) => Command::Context(c),
        };
        if self.armed.take().is_none() {
            let owner = if snap.spectator { None } else { snap.player_id };
            self.selection.predict(gesture, &snap.units, owner);
        }
        emit(sink, snap.tick, cmd);
    }

    /// Units in the committed selection that exist in the current snapshot.
    pub fn selected_units(&self) -> Vec<&Unit> {
        let Some(snap) = &self.snapshot else {
            return Vec::new();
        };
        self.selection.committed.iter().filter_map(|id| snap.unit(*id)).collect()
    }

    pub fn legend(&self) -> Vec<Binding> {
        match &self.snapshot {
            Some(snap) => gate::legal_bindings(&self.selected_units(), &snap.gamedef),
            None => Vec::new(),
        }
    }

    pub fn key(&mut self, key: char, sink: &mut dyn CommandSink) {
        let Some(snap) = &self.snapshot else {
            return;
        };
        let tick = snap.tick;
        let selected = self.selected_units();
        let count = selected.len();
        match gate::resolve(key, &selected, &snap.gamedef) {
            Some(action) => {
                // Build orders take no target.
                if matches!(action, HotkeyAction::Command(_)) {
                    tracing::debug!(%key, ?action, "hotkey armed");
                    self.armed = Some(key);
                } else {
                    tracing::debug!(%key, ?action, "build hotkey sent");
                }
                emit(sink, tick, Command::Hotkey(key));
            }
            None => tracing::debug!(%key, selected = count, "hotkey not legal for selection"),
        }
    }

    pub fn control(&mut self, action: ControlAction, sink: &mut dyn CommandSink) {
        let tick = self.tick();
        let cmds = match action {
            ControlAction::SetSpeed(v) => self.speed.set(v),
            ControlAction::Faster => self.speed.faster().into_iter().collect(),
            ControlAction::Slower => self.speed.slower().into_iter().collect(),
            ControlAction::Cycle => vec![Command::Cycle],
            ControlAction::Pause => vec![Command::Pause],
            ControlAction::Scrub(p) => {
                self.scrub = p.min(100);
                vec![Command::Scrub(self.scrub)]
            }
        };
        for cmd in cmds {
            emit(sink, tick, cmd);
        }
    }

    /// Draw the current snapshot. Without one, only clears.
    pub fn render(&self, surface: &mut dyn Surface, atlas: &AtlasBook) -> Result<(), AtlasError> {
        surface.clear(self.viewport.0, self.viewport.1);
        let Some(snap) = &self.snapshot else {
            return Ok(());
        };
        let ctx = RenderCtx { layout: &self.layout, cfg: &self.cfg, atlas, tick: snap.tick };

        draw_map(surface, &ctx, &snap.rts_map, snap.spectator)?;

        let remembered = snap.remembered_units();
        if !remembered.is_empty() {
            surface.set_alpha(self.cfg.remembered_alpha);
            let drawn = remembered
                .iter()
                .try_for_each(|u| draw_unit(surface, &ctx, u, self.facing(u.id), false));
            surface.set_alpha(1.0);
            drawn?;
        }

        for u in &snap.units {
            let selected = self.selection.committed.contains(&u.id);
            draw_unit(surface, &ctx, u, self.facing(u.id), selected)?;
        }
        if let Some(rect) = self.selection.drag_box() {
            draw_drag_box(surface, rect);
        }
        for b in &snap.bullets {
            draw_bullet(surface, &ctx, b)?;
        }

        let readouts = Readouts { fps: self.fps(), progress: snap.replay_progress() };
        draw_hud(surface, &ctx, snap, &self.selected_units(), &self.legend(), readouts);
        Ok(())
    }
}
