use image::Rgb;

/// Figure palette
pub struct Colors;

impl Colors {
    pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    pub const LIGHT_GRAY: Rgb<u8> = Rgb([210, 210, 210]);
    pub const DARK_GRAY: Rgb<u8> = Rgb([96, 96, 96]);
    pub const RED: Rgb<u8> = Rgb([220, 30, 30]);
    pub const COVERAGE_BLUE: Rgb<u8> = Rgb([49, 130, 189]);
}

/// Opacity of the coverage overlay
pub const COVERAGE_ALPHA: f32 = 0.3;

/// `overlay` drawn over `base` with the given opacity.
pub fn blend(base: Rgb<u8>, overlay: Rgb<u8>, alpha: f32) -> Rgb<u8> {
    let alpha = alpha.clamp(0.0, 1.0);
    let mix = |b: u8, o: u8| (b as f32 * (1.0 - alpha) + o as f32 * alpha).round() as u8;
    Rgb([
        mix(base[0], overlay[0]),
        mix(base[1], overlay[1]),
        mix(base[2], overlay[2]),
    ])
}

/// Fill color of a cell, before towers and circles are drawn.
pub fn cell_color(blocked: bool, covered: bool) -> Rgb<u8> {
    let base = if blocked { Colors::BLACK } else { Colors::WHITE };
    if covered {
        blend(base, Colors::COVERAGE_BLUE, COVERAGE_ALPHA)
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_endpoints() {
        assert_eq!(blend(Colors::WHITE, Colors::BLACK, 0.0), Colors::WHITE);
        assert_eq!(blend(Colors::WHITE, Colors::BLACK, 1.0), Colors::BLACK);
        assert_eq!(blend(Colors::WHITE, Colors::BLACK, 0.5), Rgb([128, 128, 128]));
    }

    #[test]
    fn test_cell_color() {
        assert_eq!(cell_color(false, false), Colors::WHITE);
        assert_eq!(cell_color(true, false), Colors::BLACK);
        assert_eq!(
            cell_color(false, true),
            blend(Colors::WHITE, Colors::COVERAGE_BLUE, COVERAGE_ALPHA)
        );
        assert!(cell_color(false, true)[2] > cell_color(false, true)[0]);
        assert_ne!(cell_color(true, true), Colors::BLACK);
    }
}
