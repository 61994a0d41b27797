//! # Right Panel - Placement Settings and Entity Lists
//!
//! This module renders the resizable right side panel with:
//! - Placement settings: RSSI, beacon grid step, antenna height and angle
//! - Derived antenna range and auto-placement step (recomputed every frame)
//! - Auto-placement buttons for beacons and antennas
//! - Entity tables: placed beacons (fed by the store's change notifications),
//!   antennas, and barriers with a per-row delete button
//! - Recent activity with local timestamps
//!
//! Tables use `egui_extras::TableBuilder` so only visible rows are built.

use crate::planner::{Antenna, Barrier, Beacon};
use crate::ui::AppState;
use eframe::egui;
use egui::Color32;
use egui_extras::{Column, TableBuilder};

const TABLE_HEIGHT: f32 = 180.0;

/// Render the right panel.
///
/// # Parameters
///
/// * `ctx` - egui context
/// * `state` - Mutable application state
pub fn render(ctx: &egui::Context, state: &mut AppState) {
    let mut messages: Vec<String> = Vec::new();
    let mut alert: Option<String> = None;

    let panel = egui::SidePanel::right("settings_right")
        .resizable(true)
        .default_width(state.right_panel_width)
        .width_range(260.0..=800.0)
        .show(ctx, |ui| {
            let Some(session) = state.session.as_mut() else {
                return;
            };

            egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
                ui.heading("Placement");
                ui.separator();

                egui::Grid::new("placement_settings").num_columns(2).spacing([12.0, 6.0]).show(ui, |ui| {
                    ui.label("RSSI (dBm):");
                    ui.add(egui::Slider::new(&mut session.settings.rssi, -100.0..=-30.0).step_by(1.0));
                    ui.end_row();

                    ui.label("Beacon step (m):");
                    ui.add(egui::DragValue::new(&mut session.settings.beacon_step).range(0.5..=1000.0).speed(0.5));
                    ui.end_row();

                    ui.label("Antenna height (m):");
                    ui.add(egui::Slider::new(&mut session.settings.antenna_height, 0.0..=50.0).step_by(0.5));
                    ui.end_row();

                    ui.label("Antenna angle (°):");
                    ui.add(egui::Slider::new(&mut session.settings.antenna_angle, 0.0..=359.0).step_by(1.0));
                    ui.end_row();

                    ui.label("Antenna range:");
                    ui.label(egui::RichText::new(format!("{:.2} m", session.settings.antenna_range())).strong());
                    ui.end_row();

                    ui.label("Antenna step:");
                    ui.label(egui::RichText::new(format!("{:.2} m", session.settings.antenna_step())).strong());
                    ui.end_row();
                });

                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    if ui.button("Auto-place beacons").clicked() {
                        match session.auto_place_beacons() {
                            Ok(count) => messages.push(format!("{} beacons placed automatically", count)),
                            Err(e) => alert = Some(e.to_string()),
                        }
                    }
                    if ui.button("Auto-place antennas").clicked() {
                        match session.auto_place_antennas() {
                            Ok(count) => messages.push(format!("{} antennas placed automatically", count)),
                            Err(e) => alert = Some(e.to_string()),
                        }
                    }
                });

                ui.add_space(10.0);
                egui::CollapsingHeader::new(format!("Placed beacons ({})", state.placed_beacons.len()))
                    .default_open(true)
                    .show(ui, |ui| {
                        ui.push_id("beacon_table", |ui| beacon_table(ui, &state.placed_beacons));
                    });

                egui::CollapsingHeader::new(format!("Antennas ({})", session.store.antennas().len())).show(ui, |ui| {
                    ui.push_id("antenna_table", |ui| antenna_table(ui, session.store.antennas()));
                });

                let mut remove: Option<String> = None;
                egui::CollapsingHeader::new(format!("Barriers ({})", session.store.barriers().len())).show(ui, |ui| {
                    ui.push_id("barrier_table", |ui| barrier_table(ui, session.store.barriers(), &mut remove));
                });
                if let Some(id) = remove {
                    match session.remove_barrier(&id) {
                        Ok(()) => messages.push(format!("Barrier deleted ({})", id)),
                        Err(e) => log::warn!("{}", e),
                    }
                }

                ui.add_space(10.0);
                ui.heading("Activity");
                ui.separator();
                for notification in state.notifications.iter().take(12) {
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(notification.time.format("%H:%M:%S").to_string()).monospace().color(Color32::GRAY));
                        ui.label(&notification.text);
                    });
                }
            });
        });
    state.right_panel_width = panel.response.rect.width();

    for text in messages {
        state.notify(text);
    }
    if alert.is_some() {
        state.alert = alert;
    }
}

fn header_row(ui: &mut egui::Ui, row_height: f32) -> TableBuilder<'_> {
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .vscroll(true)
        .max_scroll_height(TABLE_HEIGHT)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::remainder().at_least(80.0)) // Id
        .column(Column::initial(60.0).at_least(40.0)) // X
        .column(Column::initial(60.0).at_least(40.0)) // Y
        .column(Column::initial(70.0).at_least(40.0))
        .min_scrolled_height(row_height)
}

fn beacon_table(ui: &mut egui::Ui, beacons: &[Beacon]) {
    let row_height = ui.text_style_height(&egui::TextStyle::Body) * 1.3;
    header_row(ui, row_height)
        .header(row_height, |mut header| {
            header.col(|ui| {
                ui.strong("Id");
            });
            header.col(|ui| {
                ui.strong("X (m)");
            });
            header.col(|ui| {
                ui.strong("Y (m)");
            });
            header.col(|ui| {
                ui.strong("RSSI");
            });
        })
        .body(|body| {
            body.rows(row_height, beacons.len(), |mut row| {
                let beacon = &beacons[row.index()];
                row.col(|ui| {
                    ui.label(&beacon.id);
                });
                row.col(|ui| {
                    ui.label(format!("{:.2}", beacon.position.x));
                });
                row.col(|ui| {
                    ui.label(format!("{:.2}", beacon.position.y));
                });
                row.col(|ui| {
                    ui.label(beacon.rssi.map_or_else(|| "-".to_string(), |rssi| format!("{:.0}", rssi)));
                });
            });
        });
}

fn antenna_table(ui: &mut egui::Ui, antennas: &[Antenna]) {
    let row_height = ui.text_style_height(&egui::TextStyle::Body) * 1.3;
    header_row(ui, row_height)
        .header(row_height, |mut header| {
            header.col(|ui| {
                ui.strong("Id");
            });
            header.col(|ui| {
                ui.strong("X (m)");
            });
            header.col(|ui| {
                ui.strong("Y (m)");
            });
            header.col(|ui| {
                ui.strong("Range");
            });
        })
        .body(|body| {
            body.rows(row_height, antennas.len(), |mut row| {
                let antenna = &antennas[row.index()];
                row.col(|ui| {
                    ui.label(&antenna.id).on_hover_text(format!("Height {} m, angle {}°", antenna.height, antenna.angle));
                });
                row.col(|ui| {
                    ui.label(format!("{:.2}", antenna.position.x));
                });
                row.col(|ui| {
                    ui.label(format!("{:.2}", antenna.position.y));
                });
                row.col(|ui| {
                    ui.label(format!("{:.2} m", antenna.range));
                });
            });
        });
}

/// Barrier list; a click on a row's delete button stores its id in `remove`.
fn barrier_table(ui: &mut egui::Ui, barriers: &[Barrier], remove: &mut Option<String>) {
    let row_height = ui.spacing().interact_size.y;
    header_row(ui, row_height)
        .header(row_height, |mut header| {
            header.col(|ui| {
                ui.strong("Id");
            });
            header.col(|ui| {
                ui.strong("Corners");
            });
            header.col(|ui| {
                ui.strong("");
            });
            header.col(|ui| {
                ui.strong("");
            });
        })
        .body(|body| {
            body.rows(row_height, barriers.len(), |mut row| {
                let barrier = &barriers[row.index()];
                row.col(|ui| {
                    ui.label(&barrier.id);
                });
                row.col(|ui| {
                    ui.label(barrier.vertices.len().to_string());
                });
                row.col(|_| {});
                row.col(|ui| {
                    if ui.small_button("Delete").clicked() {
                        *remove = Some(barrier.id.clone());
                    }
                });
            });
        });
}
