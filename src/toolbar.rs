use egui::{vec2, Align, Layout, RichText, Ui};

use crate::theme::AppTheme;
use crate::ui_controls;

pub struct ToolbarOutput {
    pub open_image: bool,
}

pub struct ToolbarInfo<'a> {
    pub image_name: Option<&'a str>,
    pub circle_count: usize,
    pub undo_depth: usize,
    pub dirty: bool,
    pub status: Option<&'a str>,
}

pub fn show_toolbar(ui: &mut Ui, theme: &AppTheme, info: ToolbarInfo<'_>) -> ToolbarOutput {
    let mut out = ToolbarOutput { open_image: false };
    let action_h = theme.controls.action_height;

    ui.horizontal_centered(|ui| {
        ui.label(
            RichText::new("Pinmark")
                .size(18.0)
                .strong()
                .color(theme.text.accent),
        );
        ui.add_space(theme.layout.space_3);

        if ui_controls::primary_button(ui, theme, "Open Photo", vec2(104.0, action_h)).clicked() {
            out.open_image = true;
        }

        ui.add_space(theme.layout.space_4);
        match (info.image_name, info.status) {
            (_, Some(status)) => {
                ui.label(RichText::new(status).color(egui::Color32::from_rgb(0xC6, 0x28, 0x28)));
            }
            (Some(name), None) => {
                ui.label(RichText::new(name).color(theme.text.secondary));
                ui.label(
                    RichText::new(format!("· {} circles", info.circle_count))
                        .color(theme.text.muted),
                );
            }
            (None, None) => {
                ui.label(RichText::new("No photo open").color(theme.text.muted));
            }
        }

        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            if info.dirty {
                ui.label(RichText::new("Saving…").small().color(theme.text.muted));
            } else if info.image_name.is_some() {
                ui.label(RichText::new("Saved").small().color(theme.text.muted));
            }
            ui.add_space(theme.layout.space_3);
            if info.undo_depth > 0 {
                ui.label(RichText::new("undo").small().color(theme.text.muted));
                ui_controls::keycap(ui, theme, "Esc");
            }
        });
    });

    out
}
