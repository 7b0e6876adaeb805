use crate::notice::{Notice, NoticeLevel};
use crate::prelude::*;

use super::overlay_state::OverlayState;

const CROSSHAIR_SIZE: f32 = 7.0;
const HIGHLIGHT: egui::Color32 = egui::Color32::from_rgb(232, 196, 104);

/// Everything the overlay shows this frame, read from the world up front so
/// the lock is not needed while laying out.
#[derive(Debug, Default)]
pub struct OverlayView {
    pub hovered: Option<String>,
    pub selected: Option<Exhibit>,
    pub notices: Vec<Notice>,
}

impl OverlayView {
    pub fn gather(world: &World) -> Self {
        let Some(controller) = world.get_resource::<MuseumController>() else {
            return Self::default();
        };

        let title_of = |entity: Entity| world.get::<Exhibit>(entity).map(|e| e.title.clone());

        Self {
            hovered: controller.hovered().and_then(title_of),
            selected: controller
                .selected()
                .and_then(|entity| world.get::<Exhibit>(entity).cloned()),
            notices: world
                .get_resource::<Notices>()
                .map(|notices| notices.iter().cloned().collect())
                .unwrap_or_default(),
        }
    }
}

/// Lays out the overlay. Returns true when the detail window asked to close.
pub fn draw_ui(
    ctx: &egui::Context,
    view: &OverlayView,
    viewport_texture_id: Option<egui::TextureId>,
    state: &OverlayState,
) -> bool {
    egui::CentralPanel::default()
        .frame(egui::Frame::NONE)
        .show(ctx, |ui| {
            let viewport_rect = ui.available_rect_before_wrap();

            if let Some(texture_id) = viewport_texture_id {
                let size = viewport_rect.size();
                ui.add(
                    egui::Image::new(egui::load::SizedTexture::new(texture_id, size))
                        .fit_to_exact_size(size),
                );
            } else {
                ui.painter()
                    .rect_filled(viewport_rect, 0.0, egui::Color32::from_rgb(0, 0, 0));
            }

            if view.selected.is_none() {
                draw_crosshair(ui.painter(), viewport_rect.center(), view.hovered.is_some());
            }
        });

    if view.selected.is_none()
        && let Some(title) = &view.hovered
    {
        egui::Area::new(egui::Id::new("hovered_exhibit"))
            .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -48.0))
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.label(egui::RichText::new(title).strong().color(HIGHLIGHT));
                    ui.label(egui::RichText::new("Click to learn more").small());
                });
            });
    }

    let close_requested = view
        .selected
        .as_ref()
        .is_some_and(|exhibit| draw_exhibit_window(ctx, exhibit));

    if state.show_controls {
        egui::Area::new(egui::Id::new("controls"))
            .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(16.0, -16.0))
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.label("Drag to look around");
                    ui.label("W A S D or arrow keys to walk");
                    ui.label("Click a highlighted piece to read about it");
                    ui.label(egui::RichText::new("H hides this help").small());
                });
            });
    }

    draw_notices(ctx, &view.notices);

    close_requested
}

fn draw_crosshair(painter: &egui::Painter, center: egui::Pos2, active: bool) {
    let color = if active {
        HIGHLIGHT
    } else {
        egui::Color32::from_white_alpha(180)
    };
    let stroke = egui::Stroke::new(2.0, color);

    painter.line_segment(
        [
            center - egui::vec2(CROSSHAIR_SIZE, 0.0),
            center + egui::vec2(CROSSHAIR_SIZE, 0.0),
        ],
        stroke,
    );
    painter.line_segment(
        [
            center - egui::vec2(0.0, CROSSHAIR_SIZE),
            center + egui::vec2(0.0, CROSSHAIR_SIZE),
        ],
        stroke,
    );
}

fn draw_exhibit_window(ctx: &egui::Context, exhibit: &Exhibit) -> bool {
    let mut close = false;

    egui::Window::new(exhibit.title.as_str())
        .id(egui::Id::new("exhibit_detail"))
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .collapsible(false)
        .resizable(false)
        .max_width(420.0)
        .show(ctx, |ui| {
            let provenance = [exhibit.origin.as_str(), exhibit.era.as_str()]
                .into_iter()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(", ");
            if !provenance.is_empty() {
                ui.label(egui::RichText::new(provenance).italics());
            }

            ui.separator();
            ui.label(exhibit.description.trim());
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                if ui.button("Close").clicked() {
                    close = true;
                }
                ui.label(egui::RichText::new("or press Esc").small());
            });
        });

    close
}

fn draw_notices(ctx: &egui::Context, notices: &[Notice]) {
    if notices.is_empty() {
        return;
    }

    egui::Area::new(egui::Id::new("notices"))
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-16.0, 16.0))
        .interactable(false)
        .show(ctx, |ui| {
            for notice in notices {
                let color = match notice.level {
                    NoticeLevel::Info => egui::Color32::from_rgb(200, 200, 200),
                    NoticeLevel::Warning => egui::Color32::from_rgb(240, 190, 80),
                    NoticeLevel::Error => egui::Color32::from_rgb(235, 90, 80),
                };

                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.colored_label(color, &notice.message);
                });
            }
        });
}
