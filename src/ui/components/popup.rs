//! Popup placement.

use ratatui::layout::Rect;

/// A `width` x `height` rectangle centered in `area`, shrunk to fit.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centers_inside_area() {
        let r = centered_rect(40, 10, Rect::new(10, 5, 100, 30));
        assert_eq!(r, Rect::new(40, 15, 40, 10));
    }

    #[test]
    fn test_shrinks_to_small_area() {
        let r = centered_rect(40, 10, Rect::new(0, 0, 20, 4));
        assert_eq!(r, Rect::new(0, 0, 20, 4));
    }
}
