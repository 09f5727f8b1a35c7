use crate::constants::FONT_SIZE;

use super::{
    Renderer,
    colors::{Colors, cell_color},
};

const LINE_HEIGHT: f32 = 22.0;
const SWATCH: u32 = 14;

/// Legend entry kinds
enum Swatch {
    Fill(image::Rgb<u8>),
    Tower,
    Ring,
}

/// Draws the legend panel starting at (`x`, `y`).
///
/// Swatches are always drawn; labels only when a font was loaded.
pub(crate) fn render_legend(renderer: &mut Renderer, x: f32, y: f32, towers: usize, radius: u32) {
    let mut current_y = y;

    renderer.draw_text(x, current_y, "Legend", FONT_SIZE + 4.0, Colors::BLACK);
    current_y += LINE_HEIGHT * 1.2;

    let items = [
        ("Blocked", Swatch::Fill(Colors::BLACK)),
        ("Coverage", Swatch::Fill(cell_color(false, true))),
        ("Tower", Swatch::Tower),
        ("Tower radius", Swatch::Ring),
    ];

    for (label, swatch) in items {
        let (sx, sy) = (x as i32, current_y as i32);
        match swatch {
            Swatch::Fill(color) => {
                renderer.fill_rect(sx, sy, SWATCH, SWATCH, color);
                renderer.outline_rect(sx, sy, SWATCH, SWATCH, Colors::DARK_GRAY);
            }
            Swatch::Tower => {
                let half = SWATCH as f32 / 2.0;
                renderer.draw_tower_marker(x + half, current_y + half, half);
            }
            Swatch::Ring => {
                let half = SWATCH as f32 / 2.0;
                renderer.draw_dotted_circle(x + half, current_y + half, half);
            }
        }
        renderer.draw_text(x + SWATCH as f32 + 8.0, current_y, label, FONT_SIZE, Colors::BLACK);
        current_y += LINE_HEIGHT;
    }

    current_y += LINE_HEIGHT * 0.5;
    renderer.draw_text(x, current_y, &format!("Towers: {towers}"), FONT_SIZE, Colors::BLACK);
    current_y += LINE_HEIGHT;
    renderer.draw_text(x, current_y, &format!("Radius: {radius}"), FONT_SIZE, Colors::BLACK);
}

/// Height the legend needs, in px
pub(crate) fn legend_height() -> u32 {
    (LINE_HEIGHT * 8.0) as u32
}
