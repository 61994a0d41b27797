//! # Top Panel - Tool Bar
//!
//! This module renders the fixed-height top panel:
//! - Row 1: One toggle button per editing mode; exactly one is active
//! - Row 2: Clear buttons, layer visibility, view reset, export and close
//! - Row 3: A short hint for the active mode

use crate::planner::Mode;
use crate::ui::AppState;
use eframe::egui;

fn hint(mode: Mode) -> &'static str {
    match mode {
        Mode::Idle => "Scroll to zoom, drag to pan. Drag a barrier corner to reshape it; right-click a barrier to delete it.",
        Mode::PlaceBeacon => "Click on the map to place a beacon with the current RSSI.",
        Mode::PlaceAntenna => "Click on the map to place an antenna with the current height and angle.",
        Mode::DrawBarrier => "Click to add corners. Double-click, Enter or a click on the first corner closes the barrier; Backspace undoes, Esc discards.",
        Mode::EditBeacons => "Drag a beacon to move it.",
        Mode::EditAntennas => "Drag an antenna to move it.",
        Mode::DeleteBeacons => "Click a highlighted beacon to delete it.",
        Mode::DeleteAntennas => "Click a highlighted antenna to delete it.",
    }
}

/// Render the tool bar.
///
/// # Parameters
///
/// * `ctx` - egui context
/// * `state` - Mutable application state
pub fn render(ctx: &egui::Context, state: &mut AppState) {
    let mut export_clicked = false;
    let mut close_clicked = false;
    let mut messages: Vec<String> = Vec::new();

    egui::TopBottomPanel::top("tool_bar").show(ctx, |ui| {
        let Some(session) = state.session.as_mut() else {
            return;
        };
        ui.add_space(4.0);

        ui.horizontal_wrapped(|ui| {
            for mode in Mode::ALL {
                let active = session.controller.is_active(mode);
                if ui.selectable_label(active, mode.label()).clicked() {
                    session.set_mode(mode);
                }
            }
        });

        ui.separator();
        ui.horizontal_wrapped(|ui| {
            if ui.button("Clear beacons").clicked() {
                session.clear_beacons();
                messages.push("All beacons cleared".to_string());
            }
            if ui.button("Clear antennas").clicked() {
                session.clear_antennas();
                messages.push("All antennas cleared".to_string());
            }
            if ui.button("Clear barriers").clicked() {
                session.clear_barriers();
                messages.push("All barriers cleared".to_string());
            }

            ui.separator();
            ui.label("Show:");
            ui.checkbox(&mut session.visibility.beacons, "Beacons");
            ui.checkbox(&mut session.visibility.antennas, "Antennas");
            ui.checkbox(&mut session.visibility.barriers, "Barriers");

            ui.separator();
            if ui.button("Reset view").clicked() {
                state.view.reset();
            }
            let exporting = session.export.is_pending();
            if ui.add_enabled(!exporting, egui::Button::new("Export PNG")).clicked() {
                export_clicked = true;
            }
            if ui.button("Close map").clicked() {
                close_clicked = true;
            }
        });

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(hint(session.controller.mode())).italics());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(egui::RichText::new(format!("Zoom {:.1}x", state.view.zoom())).monospace());
            });
        });
        ui.add_space(4.0);
    });

    for text in messages {
        state.notify(text);
    }
    if export_clicked {
        state.request_export(ctx);
    }
    if close_clicked {
        state.close_map();
    }
}
