//! Field rendering. The engine knows nothing about drawing; this widget
//! reads its accessors and paints cells into whatever area the driver gives
//! it, one terminal cell per tile.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::Widget;

use crate::engine::Engine;
use crate::field::Pos;

const TRAIL_COLOR: Color = Color::Green;
const HEAD_COLOR: Color = Color::Yellow;
const FOOD_COLOR: Color = Color::Red;

impl Widget for &Engine {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let tile = self.tile_size();

        for cell in self.trail() {
            paint(buf, area, *cell, tile, TRAIL_COLOR);
        }
        paint(buf, area, self.food(), tile, FOOD_COLOR);
        paint(buf, area, self.head(), tile, HEAD_COLOR);
    }
}

fn paint(buf: &mut Buffer, area: Rect, pos: Pos, tile: u16, color: Color) {
    let Some((x, y)) = screen_cell(area, pos, tile) else {
        return;
    };
    buf[(x, y)].set_symbol(" ").set_bg(color);
}

/// Maps a grid position into the render area, rounding fractional smooth
/// positions to whole cells. Positions outside the area are skipped: after a
/// shrink the trail may briefly hold cells beyond the new bounds.
fn screen_cell(area: Rect, pos: Pos, tile: u16) -> Option<(u16, u16)> {
    let col = pos.x.round();
    let row = pos.y.round();
    if col < 0.0 || row < 0.0 {
        return None;
    }

    let x = u64::from(area.x) + col as u64 * u64::from(tile);
    let y = u64::from(area.y) + row as u64 * u64::from(tile);
    if x >= u64::from(area.right()) || y >= u64::from(area.bottom()) {
        return None;
    }
    Some((x as u16, y as u16))
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::engine::Engine;
    use crate::score::MemoryScoreStore;

    fn engine(width: u16, height: u16) -> Engine {
        let mut rng = StdRng::seed_from_u64(7);
        Engine::new(width, height, 1, Box::<MemoryScoreStore>::default(), &mut rng)
    }

    #[test]
    fn test_renders_head_and_food() {
        let engine = engine(10, 10);
        let area = Rect::new(2, 1, 10, 10);
        let mut buf = Buffer::empty(area);

        (&engine).render(area, &mut buf);

        let head = engine.head();
        assert_eq!(
            buf[(2 + head.x as u16, 1 + head.y as u16)].bg,
            HEAD_COLOR
        );

        let food = engine.food();
        if food != head {
            assert_eq!(buf[(2 + food.x as u16, 1 + food.y as u16)].bg, FOOD_COLOR);
        }
    }

    #[test]
    fn test_out_of_area_cells_are_skipped() {
        let engine = engine(30, 30);
        let area = Rect::new(0, 0, 5, 5);
        let mut buf = Buffer::empty(area);

        // Head sits at (15, 15), far outside the 5x5 area; must not panic.
        (&engine).render(area, &mut buf);
    }

    #[test]
    fn test_screen_cell_rounds_fractional_positions() {
        let area = Rect::new(0, 0, 10, 10);
        let pos = Pos { x: 6.375, y: 4.625 };
        assert_eq!(screen_cell(area, pos, 1), Some((6, 5)));
    }
}
