//! Shared hour palette used by the map, the bar chart, and the scatter plot

use egui::Color32;

/// One high-contrast color per hour of day.
pub const HOUR_COLORS: [Color32; 24] = [
    Color32::from_rgb(0xFF, 0x00, 0x00), // 0
    Color32::from_rgb(0x00, 0x74, 0xD9), // 1
    Color32::from_rgb(0x2E, 0xCC, 0x40), // 2
    Color32::from_rgb(0xFF, 0xDC, 0x00), // 3
    Color32::from_rgb(0xFF, 0x85, 0x1B), // 4
    Color32::from_rgb(0xB1, 0x0D, 0xC9), // 5
    Color32::from_rgb(0x11, 0x11, 0x11), // 6
    Color32::from_rgb(0x7F, 0xDB, 0xFF), // 7
    Color32::from_rgb(0xF0, 0x12, 0xBE), // 8
    Color32::from_rgb(0x01, 0xFF, 0x70), // 9
    Color32::from_rgb(0x85, 0x14, 0x4B), // 10
    Color32::from_rgb(0xAA, 0xAA, 0xAA), // 11
    Color32::from_rgb(0xFF, 0x41, 0x36), // 12
    Color32::from_rgb(0x39, 0xCC, 0xCC), // 13
    Color32::from_rgb(0x3D, 0x99, 0x70), // 14
    Color32::from_rgb(0xF3, 0x9C, 0x12), // 15
    Color32::from_rgb(0x8B, 0x45, 0x13), // 16
    Color32::from_rgb(0xE6, 0x7E, 0x22), // 17
    Color32::from_rgb(0x29, 0x80, 0xB9), // 18
    Color32::from_rgb(0xE7, 0x4C, 0x3C), // 19
    Color32::from_rgb(0x16, 0xA0, 0x85), // 20
    Color32::from_rgb(0xD3, 0x54, 0x00), // 21
    Color32::from_rgb(0x34, 0x49, 0x5E), // 22
    Color32::from_rgb(0xC0, 0x39, 0x2B), // 23
];

/// Style applied to the highlighted trip path.
pub const HIGHLIGHT_COLOR: Color32 = Color32::from_rgb(0xE7, 0x4C, 0x3C);

pub fn hour_color(hour: u32) -> Color32 {
    HOUR_COLORS[(hour % 24) as usize]
}

/// Apply an opacity factor to a palette color.
pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    let a = (opacity.clamp(0.0, 1.0) * 255.0) as u8;
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), a)
}
