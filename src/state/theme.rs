use egui::{Color32, Visuals};
use serde::{Deserialize, Serialize};

/// Device colour palette, cycled by device index.
pub const COLOR_PALETTE: [[u8; 3]; 12] = [
    [59, 130, 246],  // Blue
    [239, 68, 68],   // Red
    [34, 197, 94],   // Green
    [234, 179, 8],   // Yellow
    [168, 85, 247],  // Purple
    [6, 182, 212],   // Cyan
    [249, 115, 22],  // Orange
    [236, 72, 153],  // Pink
    [20, 184, 166],  // Teal
    [99, 102, 241],  // Indigo
    [132, 204, 22],  // Lime
    [120, 113, 108], // Stone
];

pub fn color_for_index(index: usize) -> Color32 {
    let [r, g, b] = COLOR_PALETTE[index % COLOR_PALETTE.len()];
    Color32::from_rgb(r, g, b)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggle(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn visuals(&self) -> Visuals {
        match self {
            Theme::Dark => Visuals::dark(),
            Theme::Light => Visuals::light(),
        }
    }

    /// Text colour for flagged devices and outlier readings.
    pub fn flag_color(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_rgb(255, 100, 100),
            Theme::Light => Color32::from_rgb(220, 38, 38),
        }
    }

    /// Text colour for devices with too few readings for an SD.
    pub fn muted_color(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_gray(120),
            Theme::Light => Color32::from_gray(156),
        }
    }

    /// Label for the button that switches to the other theme.
    pub fn toggle_label(&self) -> &'static str {
        match self {
            Theme::Dark => "Light Mode",
            Theme::Light => "Dark Mode",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_between_themes() {
        assert_eq!(Theme::default(), Theme::Dark);
        assert_eq!(Theme::Dark.toggle(), Theme::Light);
        assert_eq!(Theme::Light.toggle().toggle(), Theme::Light);
    }

    #[test]
    fn palette_cycles() {
        assert_eq!(color_for_index(0), color_for_index(COLOR_PALETTE.len()));
        assert_ne!(color_for_index(0), color_for_index(1));
    }
}
