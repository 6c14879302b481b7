//! termgrid: a container-tree terminal dashboard engine.
//!
//! This crate provides the layout and rendering core for building
//! terminal dashboards: a binary-split container tree with focus and
//! event routing, a styled cell buffer and canvas for compositing
//! widget output, a fan-out event distribution subsystem, and a
//! cooperative run loop that interleaves timer- and event-driven
//! redraws. Concrete widgets are out of scope; the engine only knows
//! widgets through the [`widget::Widget`] trait.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │              Container tree (container.rs)                │
//! │   binary splits, option inheritance, focus, hit-testing   │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │         Widget::draw → Canvas → Buffer (cell.rs,           │
//! │         buffer.rs, canvas.rs): full-width/partial pairing   │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │            Terminal contract (terminal/mod.rs):             │
//! │        CrosstermTerminal or TestTerminal back end           │
//! └──────────────────────────────────────────────────────────┘
//!                              ▲
//!                              │
//! ┌──────────────────────────────────────────────────────────┐
//! │   Run loop (runloop.rs) + event distributor (dist.rs):       │
//! │   terminal events in, redraws out, fan-out to subscribers    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key types
//!
//! - [`container::ContainerTree`]: the engine's single owner of
//!   layout, focus, and per-leaf widgets.
//! - [`widget::Widget`]: the trait every leaf's contents implement.
//! - [`buffer::Buffer`] / [`canvas::Canvas`]: the styled cell grid and
//!   its clipped, atomically-applied views.
//! - [`dist::Distributor`]: per-subscriber fan-out with throttling.
//! - [`runloop::RunLoop`]: the cooperative engine tying it together.

pub mod buffer;
pub mod cancel;
pub mod canvas;
pub mod cell;
pub mod color;
pub mod container;
pub mod dist;
pub mod error;
pub mod event;
pub mod geometry;
pub mod layout;
pub mod runloop;
pub mod style;
pub mod terminal;
pub mod widget;

pub use buffer::Buffer;
pub use cancel::CancelToken;
pub use canvas::Canvas;
pub use cell::Cell;
pub use color::{Color, NamedColor};
pub use container::{
    Align, BorderStyle, ContainerOptions, ContainerTree, Sides, Spec, TreeOptions, WidgetFailure,
};
pub use dist::{Distributor, SubscriberHandle};
pub use error::{Result, TermGridError};
pub use event::{Event, EventKind, KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent};
pub use geometry::{Axis, Point, Rect, Size};
pub use layout::SplitPosition;
pub use runloop::{ErrorAction, RunLoop, RunLoopError, RunLoopOptions};
pub use style::CellOptions;
pub use terminal::{CrosstermTerminal, Terminal, TestTerminal};
pub use widget::{KeyboardScope, MouseScope, Widget, WidgetMeta, WidgetOptions};
