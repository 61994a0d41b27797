//! # Central Map Canvas
//!
//! Renders the open map and routes pointer input to the planner:
//! - The background image fitted to the map's aspect ratio
//! - Barriers as translucent polygons with their vertices
//! - Antennas with their coverage circle, beacons on top
//! - The delete-mode hover ring, the barrier draft and a drag preview
//!
//! ## Coordinate Mapping
//!
//! Map meters are mapped to screen points through [`super::view`]. Hit
//! tolerances are given here in screen points and converted to meters with
//! the current zoom, so grabbing a beacon feels the same at every zoom level.
//!
//! ## Input
//!
//! Scrolling zooms around the cursor. A drag that does not grab an entity or
//! a barrier vertex pans the view.

use crate::planner::geometry::is_convex;
use crate::planner::hit_test::Tolerances;
use crate::planner::interaction::{DragTarget, Mode};
use crate::planner::{Extent, PlannerSession, Point};
use crate::ui::AppState;
use crate::ui::view::{fit_rect, meters_per_point, to_screen, to_world};
use eframe::egui;
use egui::Color32;

/// Hover highlight distance in delete modes, in screen points.
const HOVER_TOLERANCE_PX: f64 = 10.0;
/// Click/grab distance, in screen points.
const CLICK_TOLERANCE_PX: f64 = 5.0;
const SNAP_TOLERANCE_PX: f64 = 10.0;

const BEACON_COLOR: Color32 = Color32::from_rgb(40, 120, 255);
const ANTENNA_COLOR: Color32 = Color32::from_rgb(230, 60, 60);
const BARRIER_COLOR: Color32 = Color32::from_rgb(90, 90, 90);
const DRAFT_COLOR: Color32 = Color32::from_rgb(255, 165, 0);
const HOVER_COLOR: Color32 = Color32::YELLOW;

/// Render the central map panel.
///
/// # Parameters
///
/// * `ctx` - egui context for rendering
/// * `state` - Mutable application state holding the session and view
pub fn render(ctx: &egui::Context, state: &mut AppState) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let Some(session) = state.session.as_mut() else {
            return;
        };
        let extent = *session.extent();

        let aspect_ratio = (extent.width() / extent.height()) as f32;
        let frame = fit_rect(ui.available_rect_before_wrap(), aspect_ratio);
        let response = ui.interact(frame, egui::Id::new("map_canvas"), egui::Sense::click_and_drag());
        let painter = ui.painter_at(frame);

        let map_rect = state.view.map_rect(frame);
        state.export_region = Some(map_rect.intersect(frame));

        painter.rect_filled(frame, 4.0, ui.visuals().extreme_bg_color);
        if let Some(texture) = &state.background_texture {
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            painter.image(texture.id(), map_rect, uv, Color32::WHITE);
        }

        let mpp = meters_per_point(&extent, map_rect);
        let tolerances = Tolerances::from_pixels(HOVER_TOLERANCE_PX, CLICK_TOLERANCE_PX, SNAP_TOLERANCE_PX, mpp);

        let mut events = Vec::new();
        handle_input(ui, &response, frame, map_rect, session, &mut state.view, &mut state.panning, tolerances, &mut events);

        // Input may have zoomed or panned; draw with the updated transform.
        let map_rect = state.view.map_rect(frame);
        let px_per_meter = (1.0 / meters_per_point(&extent, map_rect)) as f32;
        if session.visibility.barriers {
            draw_barriers(&painter, &extent, map_rect, session);
        }
        if session.visibility.antennas {
            draw_antennas(&painter, &extent, map_rect, session, px_per_meter);
        }
        if session.visibility.beacons {
            draw_beacons(&painter, &extent, map_rect, session);
        }
        draw_draft(&painter, &extent, map_rect, session, response.hover_pos());
        draw_hover(&painter, &extent, map_rect, session);

        set_cursor(ui, &response, session);

        for event in events {
            state.notify_event(Some(event));
        }
    });
}

#[allow(clippy::too_many_arguments)]
fn handle_input(
    ui: &egui::Ui,
    response: &egui::Response,
    frame: egui::Rect,
    map_rect: egui::Rect,
    session: &mut PlannerSession,
    view: &mut crate::ui::view::MapView,
    panning: &mut bool,
    tolerances: Tolerances,
    events: &mut Vec<crate::planner::EditEvent>,
) {
    let extent = *session.extent();
    let env = session.gesture_env(tolerances);
    let world = |pos: egui::Pos2| to_world(&extent, map_rect, pos);

    // Zoom around the cursor
    if let Some(cursor) = response.hover_pos() {
        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll != 0.0 {
            view.zoom_at(frame, cursor, (scroll * 0.002).exp());
        }
    }

    if response.drag_started_by(egui::PointerButton::Primary) {
        if let Some(pos) = response.interact_pointer_pos() {
            let grabbed = session.controller.drag_started(&session.store, &env, world(pos));
            *panning = !grabbed;
        }
    } else if response.drag_started() {
        *panning = true;
    }

    if response.dragged() {
        if session.controller.drag().is_some() {
            if let Some(pos) = response.interact_pointer_pos() {
                session.controller.drag_moved(world(pos));
            }
        } else if *panning {
            view.pan_by(frame, response.drag_delta());
        }
    }

    if response.drag_stopped() {
        *panning = false;
        if let Some(pos) = response.interact_pointer_pos() {
            events.extend(session.controller.drag_ended(&mut session.store, &env, world(pos)));
        }
    }

    if response.double_clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            events.extend(session.controller.double_clicked(&mut session.store, &env, world(pos)));
        }
    } else if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            events.extend(session.controller.clicked(&mut session.store, &env, world(pos)));
        }
    } else if response.secondary_clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            events.extend(session.controller.secondary_clicked(&mut session.store, &env, world(pos)));
        }
    }

    match response.hover_pos() {
        Some(pos) if session.controller.drag().is_none() => session.controller.pointer_moved(&session.store, &env, world(pos)),
        Some(_) => {}
        None => session.controller.pointer_left(),
    }
}

/// Draw barrier polygons. Only convex ones are filled, since egui fills
/// polygons as triangle fans.
fn draw_barriers(painter: &egui::Painter, extent: &Extent, map_rect: egui::Rect, session: &PlannerSession) {
    let fill = Color32::from_rgba_unmultiplied(90, 90, 90, 110);
    let stroke = egui::Stroke::new(2.0, BARRIER_COLOR);
    let dragged = match session.controller.drag() {
        Some(drag) => match &drag.target {
            DragTarget::BarrierVertex { barrier_id, index } => Some((barrier_id.as_str(), *index, drag.current)),
            _ => None,
        },
        None => None,
    };

    for barrier in session.store.barriers().iter() {
        let points: Vec<egui::Pos2> = barrier
            .vertices
            .iter()
            .enumerate()
            .map(|(i, v)| match dragged {
                Some((id, index, current)) if id == barrier.id && index == i => to_screen(extent, map_rect, &extent.clamp(current)),
                _ => to_screen(extent, map_rect, v),
            })
            .collect();

        if is_convex(&barrier.vertices) {
            painter.add(egui::Shape::convex_polygon(points.clone(), fill, stroke));
        } else {
            painter.add(egui::Shape::closed_line(points.clone(), stroke));
        }
        for p in points {
            painter.circle_filled(p, 3.0, BARRIER_COLOR);
        }
    }
}

fn draw_antennas(painter: &egui::Painter, extent: &Extent, map_rect: egui::Rect, session: &PlannerSession, px_per_meter: f32) {
    let range_fill = Color32::from_rgba_unmultiplied(230, 60, 60, 30);
    let range_stroke = egui::Stroke::new(1.0, Color32::from_rgba_unmultiplied(230, 60, 60, 120));
    let dragged = dragged_entity(session, EntityDrag::Antenna);

    for antenna in session.store.antennas().iter() {
        let position = match dragged {
            Some((id, current)) if id == antenna.id => extent.clamp(current),
            _ => antenna.position,
        };
        let pos = to_screen(extent, map_rect, &position);
        let radius = antenna.range as f32 * px_per_meter;
        painter.circle_filled(pos, radius, range_fill);
        painter.circle_stroke(pos, radius, range_stroke);
        painter.circle_filled(pos, 5.0, ANTENNA_COLOR);
    }
}

fn draw_beacons(painter: &egui::Painter, extent: &Extent, map_rect: egui::Rect, session: &PlannerSession) {
    let dragged = dragged_entity(session, EntityDrag::Beacon);
    for beacon in session.store.beacons().iter() {
        let position = match dragged {
            Some((id, current)) if id == beacon.id => extent.clamp(current),
            _ => beacon.position,
        };
        let pos = to_screen(extent, map_rect, &position);
        painter.circle_filled(pos, 4.0, BEACON_COLOR);
        painter.circle_stroke(pos, 4.0, egui::Stroke::new(1.0, Color32::WHITE));
    }
}

/// Draft polyline plus a rubber band to the cursor.
fn draw_draft(painter: &egui::Painter, extent: &Extent, map_rect: egui::Rect, session: &PlannerSession, cursor: Option<egui::Pos2>) {
    let draft = session.controller.draft();
    if session.controller.mode() != Mode::DrawBarrier || draft.is_empty() {
        return;
    }
    let stroke = egui::Stroke::new(2.0, DRAFT_COLOR);
    let mut points: Vec<egui::Pos2> = draft.iter().map(|v| to_screen(extent, map_rect, v)).collect();
    for p in &points {
        painter.circle_filled(*p, 3.0, DRAFT_COLOR);
    }
    if let Some(cursor) = cursor {
        points.push(cursor);
    }
    painter.add(egui::Shape::line(points, stroke));
}

fn draw_hover(painter: &egui::Painter, extent: &Extent, map_rect: egui::Rect, session: &PlannerSession) {
    let Some(id) = session.controller.hovered() else {
        return;
    };
    let position = match session.controller.mode() {
        Mode::DeleteBeacons => session.store.beacons().iter().find(|b| b.id == id).map(|b| b.position),
        Mode::DeleteAntennas => session.store.antennas().iter().find(|a| a.id == id).map(|a| a.position),
        _ => None,
    };
    if let Some(position) = position {
        painter.circle_stroke(to_screen(extent, map_rect, &position), 9.0, egui::Stroke::new(2.5, HOVER_COLOR));
    }
}

#[derive(Clone, Copy, PartialEq)]
enum EntityDrag {
    Beacon,
    Antenna,
}

/// Id and unsnapped position of the point entity being dragged, if it is of `kind`.
fn dragged_entity(session: &PlannerSession, kind: EntityDrag) -> Option<(&str, Point)> {
    let drag = session.controller.drag()?;
    match (&drag.target, kind) {
        (DragTarget::Beacon(id), EntityDrag::Beacon) | (DragTarget::Antenna(id), EntityDrag::Antenna) => Some((id.as_str(), drag.current)),
        _ => None,
    }
}

fn set_cursor(ui: &egui::Ui, response: &egui::Response, session: &PlannerSession) {
    if !response.hovered() {
        return;
    }
    let icon = match session.controller.mode() {
        _ if session.controller.drag().is_some() => egui::CursorIcon::Grabbing,
        Mode::PlaceBeacon | Mode::PlaceAntenna | Mode::DrawBarrier => egui::CursorIcon::Crosshair,
        mode if mode.is_edit() => egui::CursorIcon::Grab,
        mode if mode.is_delete() && session.controller.hovered().is_some() => egui::CursorIcon::PointingHand,
        _ => egui::CursorIcon::Default,
    };
    ui.ctx().set_cursor_icon(icon);
}
