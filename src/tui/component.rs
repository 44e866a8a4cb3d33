use ratatui::Frame;
use ratatui::layout::Rect;

/// A reusable UI component.
///
/// Components follow the React pattern:
/// - They receive data via props (struct fields).
/// - They may hold internal state.
/// - They render to a `Frame` within a given `Rect`.
///
/// `render` takes `&mut self` so components can update presentation state
/// (scroll offsets, list selection) during the render pass, the same way
/// Ratatui's `StatefulWidget` does.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component that reacts to key names.
pub trait EventHandler {
    /// The type of high-level event this component emits.
    type Event;

    /// Handle a key name (see [`keys::key_name`](super::keys::key_name)) and
    /// optionally return a high-level event.
    fn handle_key(&mut self, key: &str) -> Option<Self::Event>;
}
