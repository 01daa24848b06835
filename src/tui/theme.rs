use crate::settings::PickerSection;
use anyhow::{anyhow, Context, Result};
use ratatui::style::{Color, Modifier, Style};

const DEFAULT_TITLE: &str = "Select a profile (Enter: activate, Esc: cancel)";

// Dracula-ish defaults.
const DEFAULT_HIGHLIGHT_FG: Color = Color::Rgb(0x28, 0x2a, 0x36);
const DEFAULT_HIGHLIGHT_BG: Color = Color::Rgb(0xbd, 0x93, 0xf9);
const DEFAULT_BORDER: Color = Color::Rgb(0x62, 0x72, 0xa4);

#[derive(Debug, Clone)]
pub struct Theme {
    pub title: String,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub border: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            highlight_fg: DEFAULT_HIGHLIGHT_FG,
            highlight_bg: DEFAULT_HIGHLIGHT_BG,
            border: DEFAULT_BORDER,
        }
    }
}

impl Theme {
    pub fn list_highlight(&self) -> Style {
        Style::default()
            .bg(self.highlight_bg)
            .fg(self.highlight_fg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn dim_text(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn active_marker(&self) -> Style {
        Style::default().fg(self.highlight_bg)
    }
}

pub fn resolve_theme(section: Option<&PickerSection>) -> Result<Theme> {
    let mut theme = Theme::default();
    let Some(s) = section else {
        return Ok(theme);
    };

    if let Some(title) = s.title.as_ref().filter(|t| !t.trim().is_empty()) {
        theme.title = title.clone();
    }
    if let Some(c) = &s.highlight_fg {
        theme.highlight_fg = parse_color(c).context("picker.highlight_fg")?;
    }
    if let Some(c) = &s.highlight_bg {
        theme.highlight_bg = parse_color(c).context("picker.highlight_bg")?;
    }
    if let Some(c) = &s.border {
        theme.border = parse_color(c).context("picker.border")?;
    }
    Ok(theme)
}

fn parse_color(s: &str) -> Result<Color> {
    let s = s.trim();
    if s.is_empty() {
        return Err(anyhow!("empty color"));
    }

    match s.strip_prefix('#') {
        Some(hex) => parse_hex_color(hex),
        None => Err(anyhow!("unsupported color format: {s}")),
    }
}

fn parse_hex_color(hex: &str) -> Result<Color> {
    let hex = hex.trim();
    if !hex.is_ascii() {
        return Err(anyhow!("invalid hex color: #{hex}"));
    }
    let (r, g, b) = match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16)?;
            let g = u8::from_str_radix(&hex[2..4], 16)?;
            let b = u8::from_str_radix(&hex[4..6], 16)?;
            (r, g, b)
        }
        3 => {
            let r = u8::from_str_radix(&hex[0..1].repeat(2), 16)?;
            let g = u8::from_str_radix(&hex[1..2].repeat(2), 16)?;
            let b = u8::from_str_radix(&hex[2..3].repeat(2), 16)?;
            (r, g, b)
        }
        _ => return Err(anyhow!("invalid hex color: #{hex}")),
    };
    Ok(Color::Rgb(r, g, b))
}
