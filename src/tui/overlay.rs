//! # Overlay Compositor
//!
//! Modal panels are rendered into their own [`Buffer`] and then painted over
//! whatever is already on screen. The screen underneath keeps rendering
//! normally; nothing about its state changes while a modal is up.
//!
//! [`composite`] is the pure form (returns a new buffer); [`paint`] writes
//! into an existing one and is what the draw path uses.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Center,
    /// One cell in from the top-right corner (toasts).
    TopRight,
}

/// Where a `width`×`height` panel lands inside `region`.
pub fn placement(anchor: Anchor, width: u16, height: u16, region: Rect) -> Rect {
    let width = width.min(region.width);
    let height = height.min(region.height);
    let (x, y) = match anchor {
        Anchor::Center => (
            region.x + (region.width - width) / 2,
            region.y + (region.height - height) / 2,
        ),
        Anchor::TopRight => (
            region.x + region.width.saturating_sub(width + 1),
            region.y + u16::from(region.height > height),
        ),
    };
    Rect::new(x, y, width, height)
}

/// Renders `widget` into a fresh buffer of the given size.
pub fn render_panel(widget: impl Widget, width: u16, height: u16) -> Buffer {
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    widget.render(area, &mut buf);
    buf
}

/// Copies `fg` over `bg` inside `region`, clipped to it.
pub fn paint(fg: &Buffer, bg: &mut Buffer, region: Rect, anchor: Anchor) {
    let region = region.intersection(bg.area);
    let target = placement(anchor, fg.area.width, fg.area.height, region);
    for dy in 0..target.height {
        for dx in 0..target.width {
            let src = fg.cell((fg.area.x + dx, fg.area.y + dy));
            let dst = bg.cell_mut((target.x + dx, target.y + dy));
            if let (Some(src), Some(dst)) = (src, dst) {
                *dst = src.clone();
            }
        }
    }
}

/// Pure form of [`paint`] over the whole background.
pub fn composite(fg: &Buffer, bg: &Buffer, anchor: Anchor) -> Buffer {
    let mut out = bg.clone();
    paint(fg, &mut out, bg.area, anchor);
    out
}
