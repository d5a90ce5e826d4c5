use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context as _, Result};
use eframe::egui::{self, Context as EguiContext, Key};
use eframe::{App, Frame};
use image::DynamicImage;

use crate::canvas;
use crate::comment::CommentDraft;
use crate::comment_panel;
use crate::editor::{dispatch, CanvasEvent, EditorState};
use crate::storage::{CircleRepository, DebouncedSaver, LocalStore, SAVE_DEBOUNCE};
use crate::theme::{self, AppTheme};
use crate::toolbar::{self, ToolbarInfo};
use crate::ui_controls;

pub struct EditorImage {
    pub dynamic: DynamicImage,
    pub texture: Option<egui::TextureHandle>,
}

impl EditorImage {
    pub fn size_vec2(&self) -> egui::Vec2 {
        egui::Vec2::new(self.dynamic.width() as f32, self.dynamic.height() as f32)
    }

    pub fn ensure_texture(&mut self, ctx: &EguiContext) {
        if self.texture.is_some() {
            return;
        }
        let rgba = self.dynamic.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        let color = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
        let texture = ctx.load_texture("photo", color, egui::TextureOptions::LINEAR);
        self.texture = Some(texture);
    }
}

pub struct PinmarkApp {
    state: EditorState,
    draft: CommentDraft,
    image: Option<EditorImage>,
    image_id: Option<String>,
    image_name: Option<String>,
    store: Option<LocalStore>,
    saver: DebouncedSaver,
    status: Option<String>,
    theme: AppTheme,
}

impl PinmarkApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let theme = theme::paper_light_theme();
        theme::apply_theme(&cc.egui_ctx, &theme);

        let store = match LocalStore::open() {
            Ok(store) => Some(store),
            Err(err) => {
                log::error!("circle store unavailable, edits will not persist: {err:#}");
                None
            }
        };

        Self {
            state: EditorState::new(),
            draft: CommentDraft::new(),
            image: None,
            image_id: None,
            image_name: None,
            store,
            saver: DebouncedSaver::new(SAVE_DEBOUNCE),
            status: None,
            theme,
        }
    }

    fn open_image_dialog(&mut self, ctx: &EguiContext) {
        let file = rfd::FileDialog::new()
            .set_title("Open a photo")
            .add_filter("Images", &["png", "jpg", "jpeg", "gif", "bmp", "webp"])
            .pick_file();
        let Some(path) = file else {
            return;
        };
        if let Err(err) = self.load_image(ctx, &path) {
            log::error!("cannot open {}: {err:#}", path.display());
            self.status = Some(format!("Cannot open image: {err:#}"));
        }
    }

    fn load_image(&mut self, ctx: &EguiContext, path: &Path) -> Result<()> {
        let dynamic =
            image::open(path).with_context(|| format!("decoding {}", path.display()))?;

        // Whatever is pending for the previous image goes out first.
        self.flush_pending();

        let image_id = image_key(path);
        let circles = match &self.store {
            Some(store) => store.load_circles(&image_id).unwrap_or_else(|err| {
                log::error!("loading circles for {image_id} failed: {err:#}");
                Vec::new()
            }),
            None => Vec::new(),
        };

        self.state = EditorState::with_circles(circles);
        self.saver.settle_at(self.state.circles.revision());
        self.draft = CommentDraft::new();
        let mut editor_image = EditorImage {
            dynamic,
            texture: None,
        };
        editor_image.ensure_texture(ctx);
        self.image = Some(editor_image);
        self.image_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string);
        self.image_id = Some(image_id);
        self.status = None;
        Ok(())
    }

    fn flush_pending(&mut self) {
        if let (Some(store), Some(image_id)) = (&self.store, &self.image_id) {
            self.saver.flush(store, image_id, &mut self.state.circles);
        }
    }

    fn handle_shortcuts(&mut self, ctx: &EguiContext) {
        let cmd = ctx.input(|input| input.modifiers.command || input.modifiers.ctrl);
        if cmd && ctx.input(|input| input.key_pressed(Key::O)) {
            self.open_image_dialog(ctx);
            return;
        }

        // Editing keys stay with the comment box while it has focus.
        if ctx.wants_keyboard_input() {
            return;
        }

        if ctx.input(|input| input.key_pressed(Key::Escape)) {
            dispatch(&mut self.state, CanvasEvent::Cancel);
        }
        if ctx.input(|input| input.key_pressed(Key::Delete) || input.key_pressed(Key::Backspace)) {
            self.state.delete_selected();
        }
    }
}

impl App for PinmarkApp {
    fn update(&mut self, ctx: &EguiContext, _frame: &mut Frame) {
        self.handle_shortcuts(ctx);

        let selected = self.state.selected_circle();
        self.draft.sync(selected);

        let mut open_requested = false;
        egui::TopBottomPanel::top("toolbar")
            .exact_height(self.theme.layout.toolbar_height)
            .frame(ui_controls::toolbar_frame(&self.theme))
            .show(ctx, |ui| {
                let info = ToolbarInfo {
                    image_name: self.image_name.as_deref(),
                    circle_count: self.state.circles.len(),
                    undo_depth: self.state.history.len(),
                    dirty: self.saver.is_dirty(),
                    status: self.status.as_deref(),
                };
                if toolbar::show_toolbar(ui, &self.theme, info).open_image {
                    open_requested = true;
                }
            });
        if open_requested {
            self.open_image_dialog(ctx);
        }

        if self.image.is_some() {
            let panel_out = egui::SidePanel::right("comments")
                .exact_width(self.theme.layout.comment_panel_width)
                .resizable(false)
                .frame(ui_controls::side_panel_frame(&self.theme))
                .show(ctx, |ui| {
                    comment_panel::show_comment_panel(ui, &self.theme, &self.state, &mut self.draft)
                })
                .inner;

            if let Some(selection) = panel_out.select {
                self.state.edit.selected_id = selection;
            }
            if let Some(id) = panel_out.delete {
                self.state.delete_circle(id);
            }
            if panel_out.save {
                let selected_id = self.state.edit.selected_id;
                self.draft.save(&mut self.state.circles, selected_id);
            }
        }

        egui::CentralPanel::default()
            .frame(
                egui::Frame::none()
                    .fill(self.theme.surfaces.app_bg)
                    .inner_margin(egui::Margin::symmetric(
                        self.theme.layout.panel_padding_x,
                        self.theme.layout.panel_padding_y,
                    )),
            )
            .show(ctx, |ui| {
                canvas::show_canvas(ui, ctx, &self.theme, self.image.as_mut(), &mut self.state);
            });

        if let (Some(store), Some(image_id)) = (&self.store, &self.image_id) {
            self.saver
                .tick(store, image_id, &mut self.state.circles, Instant::now());
        }
        if self.saver.is_dirty() {
            // Keep polling until the quiet window elapses and the save runs.
            ctx.request_repaint_after(Duration::from_millis(120));
        }
    }
}

impl Drop for PinmarkApp {
    fn drop(&mut self) {
        self.flush_pending();
    }
}

/// Stable storage key for a photo: readable stem plus a hash of the full
/// path, so same-named files in different folders do not share circles.
fn image_key(path: &Path) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("image");
    let safe: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    format!("{safe}-{:016x}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::image_key;
    use std::path::Path;

    #[test]
    fn image_key_is_stable_and_path_sensitive() {
        let a = image_key(Path::new("/photos/Cat Photo.jpg"));
        let b = image_key(Path::new("/photos/Cat Photo.jpg"));
        let c = image_key(Path::new("/other/Cat Photo.jpg"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("cat-photo-"));
    }
}
