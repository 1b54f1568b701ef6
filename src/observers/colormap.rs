/// Maps dye density onto display colours

use plotters::style::RGBColor;

use crate::sim::fluid::MAX_DENSITY;

/// Blue at zero density, green at half, red at `MAX_DENSITY`. Exactly one of
/// blue and red is non-zero and green takes up the remainder.
pub fn density_color(density: f32) -> RGBColor {
    let ratio = 2. * density / MAX_DENSITY;

    let b = (255. * (1. - ratio)).clamp(0., 255.) as u8;
    let r = (255. * (ratio - 1.)).clamp(0., 255.) as u8;
    let g = 255 - b - r;

    RGBColor(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_ramp() {
        assert_eq!(density_color(0.), RGBColor(0, 0, 255));
        assert_eq!(density_color(127.5), RGBColor(0, 255, 0));
        assert_eq!(density_color(255.), RGBColor(255, 0, 0));

        let RGBColor(r, g, b) = density_color(64.);
        assert_eq!(r, 0);
        assert!(b > 0 && g > 0);
        assert_eq!(r as u16 + g as u16 + b as u16, 255);
    }

    #[test]
    fn test_out_of_range_saturates() {
        assert_eq!(density_color(-10.), RGBColor(0, 0, 255));
        assert_eq!(density_color(1000.), RGBColor(255, 0, 0));
    }
}
