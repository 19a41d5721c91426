//! # Veneer UI
//!
//! A retained tree of 2D controls living on a render [`Surface`]. The
//! surface measures what changed, records a [`veneer_core::Scene`] for the
//! host's [`veneer_core::RenderBackend`], and turns raw pointer samples into
//! enter/out/down/up/move/click callbacks.
//!
//! ```rust
//! use veneer_core::{Color, PointerSample, RecordingBackend};
//! use veneer_ui::*;
//!
//! let mut surface = Surface::new(SurfaceConfig::new(800.0, 600.0));
//! let button = surface.add_control(
//!     Control::rectangle("button")
//!         .size("200px", "100px")
//!         .background(Color::from_rgb(30, 30, 120))
//!         .on_pointer_click(|ctx, _| ctx.edit_self(|c| {
//!             c.set_color(Color::WHITE);
//!         })),
//! );
//!
//! let mut backend = RecordingBackend::default();
//! surface.tick(&mut backend);
//! assert_eq!(surface.control(button).unwrap().rect().left, 300.0);
//!
//! surface.pointer(PointerSample::mouse_down(400.0, 300.0));
//! surface.pointer(PointerSample::mouse_up(400.0, 300.0));
//! assert_eq!(surface.control(button).unwrap().foreground(), Color::WHITE);
//! assert!(surface.tick(&mut backend).is_some());
//! ```
//!
//! Layout is memoized per control: a control that is not layout-dirty and
//! gets the same parent rect as last pass is skipped with its subtree, so
//! [`RenderStats::measured`] tracks the size of what changed.

pub mod config;
pub mod control;
pub mod dirty;
pub mod editor;
pub mod event;
pub mod interaction;
mod layout;
pub mod measure;
mod paint;
pub mod picking;
pub mod surface;
pub mod tests;
pub mod tree;

pub use config::*;
pub use control::*;
pub use dirty::{Change, Dirty, font_invalidation, layout_invalidation, matrix_invalidation};
pub use editor::*;
pub use event::*;
pub use interaction::*;
pub use measure::*;
pub use picking::*;
pub use surface::*;
pub use tree::{Ancestors, ControlId, StyleId, Tree, TreeError};
