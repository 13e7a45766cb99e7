//! Pointer gesture tracking and the locally committed selection.
use crate::coords::{GridCell, Layout};
use crate::models::{MapGrid, PlayerId, Unit, UnitId};
use crate::surface::Rect;

/// Point-select radius in cells.
pub const PICK_RADIUS: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Other,
}

/// Press-to-release state of the primary button.
///
/// `cell` is the press cell, fixed at press time. `anchor` and `current` are
/// canvas pixels for the rubber band only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Anchored { cell: GridCell, anchor: (f64, f64), current: (f64, f64) },
    Dragging { cell: GridCell, anchor: (f64, f64), current: (f64, f64) },
}

/// A completed pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Point(GridCell),
    Box(GridCell, GridCell),
    Context(GridCell),
}

#[derive(Debug, Clone)]
pub struct SelectionState {
    pub drag: DragState,
    pub committed: Vec<UnitId>,
    /// Last selection the server reported.
    server_view: Option<Vec<UnitId>>,
}

impl Default for SelectionState {
    fn default() -> Self {
        SelectionState { drag: DragState::Idle, committed: Vec::new(), server_view: None }
    }
}

fn in_map(cell: GridCell, map: &MapGrid) -> bool {
    map.contains(cell.x, cell.y)
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_down(&mut self, button: PointerButton, px: f64, py: f64, layout: &Layout, map: &MapGrid) {
        if button != PointerButton::Primary {
            return;
        }
        let cell = layout.pixel_to_cell(px, py);
        if !in_map(cell, map) {
            tracing::debug!(px, py, "press outside map ignored");
            return;
        }
        self.drag = DragState::Anchored { cell, anchor: (px, py), current: (px, py) };
    }

    /// Promote to `Dragging` once the Manhattan distance exceeds `threshold`.
    pub fn pointer_move(&mut self, px: f64, py: f64, threshold: f64) {
        self.drag = match self.drag {
            DragState::Idle => DragState::Idle,
            DragState::Anchored { cell, anchor, .. } => {
                let dist = (anchor.0 - px).abs() + (anchor.1 - py).abs();
                if dist > threshold {
                    DragState::Dragging { cell, anchor, current: (px, py) }
                } else {
                    DragState::Anchored { cell, anchor, current: (px, py) }
                }
            }
            DragState::Dragging { cell, anchor, .. } => {
                DragState::Dragging { cell, anchor, current: (px, py) }
            }
        };
    }

    pub fn pointer_up(
        &mut self,
        button: PointerButton,
        px: f64,
        py: f64,
        layout: &Layout,
        map: &MapGrid,
    ) -> Option<Gesture> {
        let cell = layout.pixel_to_cell(px, py);
        match button {
            PointerButton::Secondary => {
                if in_map(cell, map) {
                    Some(Gesture::Context(cell))
                } else {
                    tracing::debug!(%cell, "context click outside map discarded");
                    None
                }
            }
            PointerButton::Other => None,
            PointerButton::Primary => {
                let drag = std::mem::replace(&mut self.drag, DragState::Idle);
                if !in_map(cell, map) {
                    tracing::debug!(%cell, "release outside map discarded");
                    return None;
                }
                let (pressed, dragged) = match drag {
                    DragState::Idle => return None,
                    DragState::Anchored { cell, .. } => (cell, false),
                    DragState::Dragging { cell, .. } => (cell, true),
                };
                // The map may have shrunk since the press.
                if !in_map(pressed, map) {
                    tracing::debug!(%pressed, "press cell left the map, gesture discarded");
                    return None;
                }
                if dragged {
                    Some(Gesture::Box(pressed, cell))
                } else {
                    Some(Gesture::Point(pressed))
                }
            }
        }
    }

    /// Rubber band rectangle while dragging.
    pub fn drag_box(&self) -> Option<Rect> {
        match self.drag {
            DragState::Dragging { anchor, current, .. } => Some(Rect::from_corners(anchor, current)),
            _ => None,
        }
    }

    /// Adopt the server's selection when it changed since the last snapshot.
    pub fn sync_from_server(&mut self, reported: Option<&[UnitId]>) {
        let Some(reported) = reported else {
            return;
        };
        if self.server_view.as_deref() != Some(reported) {
            self.committed = reported.to_vec();
            self.server_view = Some(reported.to_vec());
        }
    }

    /// Predict the selection a point or box gesture will produce.
    pub fn predict(&mut self, gesture: Gesture, units: &[Unit], owner: Option<PlayerId>) {
        let mine = units.iter().filter(|u| owner.map_or(true, |p| u.player_id == p));
        self.committed = match gesture {
            Gesture::Point(cell) => closest_unit(mine, cell, PICK_RADIUS).into_iter().collect(),
            Gesture::Box(a, b) => units_in_box(mine, a, b),
            Gesture::Context(_) => return,
        };
    }
}

/// Nearest unit to `cell` strictly within `radius` cells.
pub fn closest_unit<'a>(units: impl IntoIterator<Item = &'a Unit>, cell: GridCell, radius: f64) -> Option<UnitId> {
    units
        .into_iter()
        .map(|u| {
            let dx = u.p.x - cell.x as f64;
            let dy = u.p.y - cell.y as f64;
            (u.id, (dx * dx + dy * dy).sqrt())
        })
        .filter(|(_, d)| *d < radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

/// Units whose position lies in the rectangle spanned by two cells, inclusive.
pub fn units_in_box<'a>(units: impl IntoIterator<Item = &'a Unit>, a: GridCell, b: GridCell) -> Vec<UnitId> {
    let (x0, x1) = (a.x.min(b.x) as f64, a.x.max(b.x) as f64);
    let (y0, y1) = (a.y.min(b.y) as f64, a.y.max(b.y) as f64);
    units
        .into_iter()
        .filter(|u| u.p.x >= x0 && u.p.x <= x1 && u.p.y >= y0 && u.p.y <= y1)
        .map(|u| u.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PointF;

    fn map() -> MapGrid {
        MapGrid { width: 20, height: 20, slots: vec![0; 400], ..Default::default() }
    }

    fn unit_at(id: i32, player_id: i32, x: f64, y: f64) -> Unit {
        Unit {
            id,
            player_id,
            unit_type: 1,
            p: PointF::new(x, y),
            last_p: PointF::new(x, y),
            hp: 1,
            max_hp: 1,
            cmd: None,
            cds: Vec::new(),
        }
    }

    #[test]
    fn test_move_past_threshold_starts_drag() {
        let layout = Layout::with_cell_size(50.0, 20, 20);
        let mut s = SelectionState::new();
        s.pointer_down(PointerButton::Primary, 10.0, 10.0, &layout, &map());
        s.pointer_move(25.0, 10.0, 10.0);
        assert!(matches!(s.drag, DragState::Dragging { .. }));
    }

    #[test]
    fn test_small_move_stays_anchored() {
        let layout = Layout::with_cell_size(50.0, 20, 20);
        let mut s = SelectionState::new();
        s.pointer_down(PointerButton::Primary, 10.0, 10.0, &layout, &map());
        s.pointer_move(12.0, 11.0, 10.0);
        assert!(matches!(s.drag, DragState::Anchored { .. }));
        assert!(s.drag_box().is_none());
    }

    #[test]
    fn test_dragging_never_reverts() {
        let layout = Layout::with_cell_size(50.0, 20, 20);
        let mut s = SelectionState::new();
        s.pointer_down(PointerButton::Primary, 10.0, 10.0, &layout, &map());
        s.pointer_move(40.0, 10.0, 10.0);
        s.pointer_move(11.0, 10.0, 10.0);
        assert!(matches!(s.drag, DragState::Dragging { .. }));
    }

    #[test]
    fn test_click_yields_point_at_anchor() {
        let layout = Layout::with_cell_size(50.0, 20, 20);
        let mut s = SelectionState::new();
        s.pointer_down(PointerButton::Primary, 130.0, 170.0, &layout, &map());
        s.pointer_move(133.0, 172.0, 10.0);
        let g = s.pointer_up(PointerButton::Primary, 133.0, 172.0, &layout, &map());
        assert_eq!(g, Some(Gesture::Point(GridCell::new(2, 3))));
        assert_eq!(s.drag, DragState::Idle);
    }

    #[test]
    fn test_drag_yields_box_between_cells() {
        let layout = Layout::with_cell_size(50.0, 20, 20);
        let (ax, ay) = layout.grid_to_pixel(2.0, 3.0);
        let (bx, by) = layout.grid_to_pixel(5.0, 7.0);
        let mut s = SelectionState::new();
        s.pointer_down(PointerButton::Primary, ax, ay, &layout, &map());
        s.pointer_move(bx, by, 10.0);
        let g = s.pointer_up(PointerButton::Primary, bx, by, &layout, &map());
        assert_eq!(g, Some(Gesture::Box(GridCell::new(2, 3), GridCell::new(5, 7))));
    }

    #[test]
    fn test_press_outside_map_is_ignored() {
        let layout = Layout::with_cell_size(50.0, 20, 20);
        let mut s = SelectionState::new();
        s.pointer_down(PointerButton::Primary, 1200.0, 10.0, &layout, &map());
        assert_eq!(s.drag, DragState::Idle);
        assert_eq!(s.pointer_up(PointerButton::Primary, 1200.0, 10.0, &layout, &map()), None);
    }

    #[test]
    fn test_release_outside_map_discards_and_resets() {
        let layout = Layout::with_cell_size(50.0, 20, 20);
        let mut s = SelectionState::new();
        s.pointer_down(PointerButton::Primary, 10.0, 10.0, &layout, &map());
        s.pointer_move(1500.0, 10.0, 10.0);
        assert_eq!(s.pointer_up(PointerButton::Primary, 1500.0, 10.0, &layout, &map()), None);
        assert_eq!(s.drag, DragState::Idle);
    }

    #[test]
    fn test_secondary_release_leaves_drag_alone() {
        let layout = Layout::with_cell_size(50.0, 20, 20);
        let mut s = SelectionState::new();
        s.pointer_down(PointerButton::Primary, 10.0, 10.0, &layout, &map());
        let g = s.pointer_up(PointerButton::Secondary, 275.0, 25.0, &layout, &map());
        assert_eq!(g, Some(Gesture::Context(GridCell::new(5, 0))));
        assert!(matches!(s.drag, DragState::Anchored { .. }));
    }

    #[test]
    fn test_predict_point_picks_closest_own_unit() {
        let units = vec![unit_at(1, 0, 4.0, 4.0), unit_at(2, 0, 3.2, 3.0), unit_at(3, 1, 3.0, 3.0)];
        let mut s = SelectionState::new();
        s.predict(Gesture::Point(GridCell::new(3, 3)), &units, Some(0));
        assert_eq!(s.committed, vec![2]);
        s.predict(Gesture::Point(GridCell::new(15, 15)), &units, Some(0));
        assert!(s.committed.is_empty());
    }

    #[test]
    fn test_predict_box_is_order_independent() {
        let units = vec![unit_at(1, 0, 4.0, 4.0), unit_at(2, 0, 6.0, 4.0), unit_at(3, 0, 9.0, 9.0)];
        let mut s = SelectionState::new();
        s.predict(Gesture::Box(GridCell::new(5, 5), GridCell::new(3, 3)), &units, None);
        assert_eq!(s.committed, vec![1]);
        s.predict(Gesture::Box(GridCell::new(3, 3), GridCell::new(9, 9)), &units, None);
        assert_eq!(s.committed, vec![1, 2, 3]);
    }

    #[test]
    fn test_server_selection_overrides_only_when_changed() {
        let mut s = SelectionState::new();
        s.sync_from_server(Some(&[4, 5]));
        assert_eq!(s.committed, vec![4, 5]);
        s.committed = vec![9];
        s.sync_from_server(Some(&[4, 5]));
        assert_eq!(s.committed, vec![9]);
        s.sync_from_server(None);
        assert_eq!(s.committed, vec![9]);
        s.sync_from_server(Some(&[]));
        assert!(s.committed.is_empty());
    }

    #[test]
    fn test_box_keeps_press_cell_across_rescale() {
        let map = map();
        let mut s = SelectionState::new();
        s.pointer_down(PointerButton::Primary, 975.0, 975.0, &Layout::with_cell_size(50.0, 20, 20), &map);
        let smaller = Layout::with_cell_size(24.0, 20, 20);
        s.pointer_move(100.0, 100.0, 10.0);
        let g = s.pointer_up(PointerButton::Primary, 100.0, 100.0, &smaller, &map);
        assert_eq!(g, Some(Gesture::Box(GridCell::new(19, 19), GridCell::new(4, 4))));
    }

    #[test]
    fn test_press_cell_outside_shrunk_map_is_discarded() {
        let mut s = SelectionState::new();
        s.pointer_down(PointerButton::Primary, 975.0, 975.0, &Layout::with_cell_size(50.0, 20, 20), &map());
        let small = MapGrid { width: 10, height: 10, slots: vec![0; 100], ..Default::default() };
        let g = s.pointer_up(PointerButton::Primary, 60.0, 60.0, &Layout::with_cell_size(50.0, 10, 10), &small);
        assert_eq!(g, None);
        assert!(matches!(s.drag, DragState::Idle));
    }
}
