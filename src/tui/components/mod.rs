//! # TUI Components
//!
//! Reusable building blocks the screens and the root controller compose.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Built fresh every frame from borrowed data:
//! - `TabBar`, `Breadcrumb`, `HelpBar`: the chrome around the content area
//! - `ConfirmPanel`, `SelectPanel`: modal panels painted through the overlay
//!   compositor
//!
//! ### Stateful Components (Event-Driven)
//!
//! Own their state across frames and turn keys into events:
//! - `TextInput`: single-line field with optional masking
//! - `ConfirmDialog`: yes/no prompt tagged with the action it guards
//! - `SelectModal`: pick one of a fixed set of options
//! - `Loader`: bouncing progress bar shown while a screen loads
//!
//! Components receive external data as props rather than reaching into the
//! controller, which keeps them testable on a `TestBackend`.
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── chrome.rs        (tab bar, breadcrumb, help bar)
//! ├── confirm.rs       (confirmation dialog + panel)
//! ├── loader.rs        (loading overlay)
//! ├── select_modal.rs  (option picker + panel)
//! ├── text_input.rs    (text field)
//! └── toast.rs         (notification painter)
//! ```

pub mod chrome;
pub mod confirm;
pub mod loader;
pub mod select_modal;
pub mod text_input;
pub mod toast;
