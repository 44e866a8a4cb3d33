//! # Core Orchestration
//!
//! The parts of Folio that decide *when* things happen. None of them know
//! about ratatui or crossterm.
//!
//! ```text
//!                    ┌─────────────────────────────┐
//!                    │            CORE             │
//!                    │                             │
//!                    │  • Session (who is signed   │
//!                    │    in, with which token)    │
//!                    │  • Scheduler (commands +    │
//!                    │    timers → events)         │
//!                    │  • DebounceGate             │
//!                    │  • Notifications (toasts)   │
//!                    │  • Config + CredentialStore │
//!                    └──────────────┬──────────────┘
//!                                   │ events over mpsc
//!                                   ▼
//!                    ┌─────────────────────────────┐
//!                    │     TUI (ratatui adapter)   │
//!                    │  root controller, screens,  │
//!                    │  overlays, rendering        │
//!                    └─────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`session`]: the explicitly owned `Session` value
//! - [`scheduler`]: `Command`, `CommandResult`, and the `Scheduler` that runs them
//! - [`debounce`]: generation-tagged debounce gate
//! - [`notify`]: toast queue with per-entry expiry
//! - [`credentials`]: where the API token lives between runs
//! - [`config`]: settings with defaults → file → env → CLI override order

pub mod config;
pub mod credentials;
pub mod debounce;
pub mod notify;
pub mod scheduler;
pub mod session;
