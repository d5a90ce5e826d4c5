use egui::epaint::Shadow;
use egui::{
    vec2, Color32, Context, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals,
};

#[derive(Clone, Debug)]
pub struct AppTheme {
    pub surfaces: SurfaceTokens,
    pub text: TextTokens,
    pub marks: MarkTokens,
    pub controls: ControlTokens,
    pub layout: LayoutTokens,
}

#[derive(Clone, Debug)]
pub struct SurfaceTokens {
    pub app_bg: Color32,
    pub panel_bg: Color32,
    pub card_bg: Color32,
    pub canvas_bg: Color32,
    pub stroke_soft: Color32,
    pub stroke_strong: Color32,
    pub accent: Color32,
    pub accent_soft: Color32,
}

#[derive(Clone, Debug)]
pub struct TextTokens {
    pub primary: Color32,
    pub secondary: Color32,
    pub muted: Color32,
    pub accent: Color32,
}

/// Colors for the annotation layer itself.
#[derive(Clone, Debug)]
pub struct MarkTokens {
    pub circle_fill: Color32,
    pub circle_fill_selected: Color32,
    pub circle_stroke: Color32,
    pub circle_stroke_selected: Color32,
    pub preview_fill: Color32,
    pub preview_stroke: Color32,
    pub handle_fill: Color32,
    pub handle_stroke: Color32,
}

#[derive(Clone, Debug)]
pub struct ControlTokens {
    pub card_rounding: f32,
    pub panel_rounding: f32,
    pub button_rounding: f32,
    pub action_height: f32,
}

#[derive(Clone, Debug)]
pub struct LayoutTokens {
    pub space_1: f32,
    pub space_2: f32,
    pub space_3: f32,
    pub space_4: f32,
    pub panel_padding_x: f32,
    pub panel_padding_y: f32,
    pub toolbar_height: f32,
    pub comment_panel_width: f32,
}

pub fn paper_light_theme() -> AppTheme {
    AppTheme {
        surfaces: SurfaceTokens {
            app_bg: Color32::from_rgb(0xF5, 0xF9, 0xFD),
            panel_bg: Color32::from_rgb(0xFF, 0xFF, 0xFF),
            card_bg: Color32::from_rgb(0xF0, 0xF7, 0xFC),
            canvas_bg: Color32::from_rgb(0xE1, 0xF5, 0xFE),
            stroke_soft: Color32::from_rgba_unmultiplied(3, 155, 229, 36),
            stroke_strong: Color32::from_rgba_unmultiplied(3, 155, 229, 90),
            accent: Color32::from_rgb(0x03, 0x9B, 0xE5),
            accent_soft: Color32::from_rgba_unmultiplied(3, 155, 229, 42),
        },
        text: TextTokens {
            primary: Color32::from_rgb(0x1E, 0x2A, 0x33),
            secondary: Color32::from_rgb(0x4F, 0x62, 0x70),
            muted: Color32::from_rgb(0x8A, 0x9B, 0xA8),
            accent: Color32::from_rgb(0x03, 0x9B, 0xE5),
        },
        marks: MarkTokens {
            circle_fill: Color32::from_rgba_unmultiplied(33, 150, 243, 33),
            circle_fill_selected: Color32::from_rgba_unmultiplied(33, 150, 243, 56),
            circle_stroke: Color32::from_rgb(0x03, 0x9B, 0xE5),
            circle_stroke_selected: Color32::from_rgb(0x19, 0x76, 0xD2),
            preview_fill: Color32::from_rgba_unmultiplied(33, 150, 243, 23),
            preview_stroke: Color32::from_rgb(0x4F, 0xC3, 0xF7),
            handle_fill: Color32::from_rgb(0x03, 0x9B, 0xE5),
            handle_stroke: Color32::WHITE,
        },
        controls: ControlTokens {
            card_rounding: 10.0,
            panel_rounding: 8.0,
            button_rounding: 8.0,
            action_height: 30.0,
        },
        layout: LayoutTokens {
            space_1: 4.0,
            space_2: 8.0,
            space_3: 12.0,
            space_4: 16.0,
            panel_padding_x: 12.0,
            panel_padding_y: 8.0,
            toolbar_height: 48.0,
            comment_panel_width: 300.0,
        },
    }
}

pub fn apply_theme(ctx: &Context, theme: &AppTheme) {
    let mut style: Style = (*ctx.style()).clone();

    style.spacing.item_spacing = vec2(theme.layout.space_2, theme.layout.space_2);
    style.spacing.button_padding = vec2(theme.layout.space_3, theme.layout.space_1 + 2.0);

    style.visuals = Visuals::light();
    style.visuals.override_text_color = Some(theme.text.primary);
    style.visuals.panel_fill = theme.surfaces.panel_bg;
    style.visuals.window_fill = theme.surfaces.panel_bg;
    style.visuals.faint_bg_color = theme.surfaces.card_bg;
    style.visuals.extreme_bg_color = theme.surfaces.app_bg;
    style.visuals.window_rounding = Rounding::same(theme.controls.panel_rounding);

    style.visuals.widgets.noninteractive.bg_fill = theme.surfaces.panel_bg;
    style.visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, theme.text.secondary);
    style.visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, theme.surfaces.stroke_soft);

    style.visuals.widgets.inactive.bg_fill = theme.surfaces.card_bg;
    style.visuals.widgets.inactive.weak_bg_fill = theme.surfaces.card_bg;
    style.visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, theme.surfaces.stroke_soft);
    style.visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, theme.text.secondary);

    style.visuals.widgets.hovered.bg_fill = theme.surfaces.accent_soft;
    style.visuals.widgets.hovered.weak_bg_fill = theme.surfaces.accent_soft;
    style.visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, theme.surfaces.stroke_strong);
    style.visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, theme.text.primary);

    style.visuals.widgets.active.bg_fill = theme.surfaces.accent_soft;
    style.visuals.widgets.active.bg_stroke = Stroke::new(1.0, theme.surfaces.accent);
    style.visuals.widgets.active.fg_stroke = Stroke::new(1.0, theme.text.primary);

    style.visuals.selection.bg_fill = theme.surfaces.accent_soft;
    style.visuals.selection.stroke = Stroke::new(1.0, theme.surfaces.accent);
    style.visuals.hyperlink_color = theme.text.accent;
    style.visuals.popup_shadow = Shadow {
        offset: vec2(0.0, 6.0),
        blur: 16.0,
        spread: 0.0,
        color: Color32::from_rgba_unmultiplied(3, 155, 229, 30),
    };

    style.visuals.widgets.noninteractive.rounding = Rounding::same(theme.controls.button_rounding);
    style.visuals.widgets.inactive.rounding = Rounding::same(theme.controls.button_rounding);
    style.visuals.widgets.hovered.rounding = Rounding::same(theme.controls.button_rounding);
    style.visuals.widgets.active.rounding = Rounding::same(theme.controls.button_rounding);
    style.visuals.widgets.open.rounding = Rounding::same(theme.controls.button_rounding);

    style.text_styles.insert(
        TextStyle::Heading,
        FontId::new(22.0, FontFamily::Proportional),
    );
    style
        .text_styles
        .insert(TextStyle::Body, FontId::new(15.0, FontFamily::Proportional));
    style.text_styles.insert(
        TextStyle::Button,
        FontId::new(14.0, FontFamily::Proportional),
    );
    style.text_styles.insert(
        TextStyle::Small,
        FontId::new(12.0, FontFamily::Proportional),
    );

    ctx.set_style(style);
}
