use egui::{vec2, RichText, ScrollArea, Ui};

use crate::circle::CircleId;
use crate::comment::CommentDraft;
use crate::editor::EditorState;
use crate::theme::AppTheme;
use crate::ui_controls;

pub struct CommentPanelOutput {
    pub select: Option<Option<CircleId>>,
    pub delete: Option<CircleId>,
    pub save: bool,
}

/// Circle list plus the draft editor for the selected circle. Pure widget
/// code: the caller applies the returned intents to the editor state.
pub fn show_comment_panel(
    ui: &mut Ui,
    theme: &AppTheme,
    state: &EditorState,
    draft: &mut CommentDraft,
) -> CommentPanelOutput {
    let mut out = CommentPanelOutput {
        select: None,
        delete: None,
        save: false,
    };

    ui.heading("Comments");
    ui.add_space(theme.layout.space_2);

    if state.circles.is_empty() {
        ui.label(
            RichText::new("Drag on the photo to add a circle.").color(theme.text.muted),
        );
        return out;
    }

    let list_height = ui.available_height() * 0.55;
    ScrollArea::vertical()
        .id_source("pinmark_comment_list")
        .max_height(list_height)
        .show(ui, |ui| {
            for circle in state.circles.circles() {
                show_row(ui, theme, state, circle.id, &mut out);
                ui.add_space(theme.layout.space_1);
            }
        });

    ui.add_space(theme.layout.space_3);
    ui.separator();
    ui.add_space(theme.layout.space_2);

    if let Some(selected) = state.selected_circle() {
        ui.label(
            RichText::new(format!("Comment for circle {}", selected.index + 1))
                .color(theme.text.secondary),
        );
        ui.add_space(theme.layout.space_1);
        ui.add(
            egui::TextEdit::multiline(draft.buffer_mut())
                .desired_rows(4)
                .desired_width(f32::INFINITY)
                .hint_text("Write a note…"),
        );
        ui.add_space(theme.layout.space_2);
        ui.horizontal(|ui| {
            if ui_controls::primary_button(
                ui,
                theme,
                "Save Comment",
                vec2(130.0, theme.controls.action_height),
            )
            .clicked()
            {
                out.save = true;
            }
            let stored = selected.comment.as_deref().unwrap_or("");
            if draft.text() != stored {
                ui.label(RichText::new("unsaved").small().color(theme.text.muted));
            }
        });
    } else {
        ui.label(RichText::new("Select a circle to edit its comment.").color(theme.text.muted));
    }

    out
}

fn show_row(
    ui: &mut Ui,
    theme: &AppTheme,
    state: &EditorState,
    id: CircleId,
    out: &mut CommentPanelOutput,
) {
    let Some(circle) = state.circles.get(id) else {
        return;
    };
    let selected = state.edit.selected_id == Some(id);
    let frame = if selected {
        ui_controls::selected_card_frame(theme)
    } else {
        ui_controls::card_frame(theme)
    };

    let response = frame
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(format!("{}", circle.index + 1))
                        .strong()
                        .color(theme.text.accent),
                );
                let preview = match circle.comment.as_deref() {
                    Some(text) if !text.is_empty() => {
                        let mut line = text.lines().next().unwrap_or("").to_string();
                        if line.chars().count() > 28 {
                            line = line.chars().take(28).collect::<String>() + "…";
                        }
                        RichText::new(line).color(theme.text.primary)
                    }
                    _ => RichText::new("No comment yet").italics().color(theme.text.muted),
                };
                ui.label(preview);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui_controls::ghost_button(ui, theme, "✕", vec2(24.0, 22.0)).clicked() {
                        out.delete = Some(id);
                    }
                });
            });
        })
        .response;

    if response.interact(egui::Sense::click()).clicked() {
        out.select = Some(if selected { None } else { Some(id) });
    }
}
