//! # Veneer core types
//!
//! Leaf types shared by the control tree and its hosts:
//!
//! - [`Value`]: a number tagged as pixels or percentage.
//! - [`Rect`], [`Vec2`], [`Size`]: layout geometry in render-target pixels.
//! - [`Affine2D`]: the 2×3 transform kernel used for control rotation/scale
//!   and for mapping pointer samples back into layout space.
//! - [`Style`] / [`Font`]: shared font templates and their resolved form.
//! - [`Scene`]: the backend-agnostic draw list a render pass produces, and
//!   [`RenderBackend`], the trait a host implements to consume it.
//! - [`input`]: pointer samples and key events.
//!
//! ## Values
//!
//! ```rust
//! use veneer_core::*;
//!
//! let width: Value = "50%".parse().unwrap();
//! assert_eq!(width.to_pixels(300.0), 150.0);
//! assert_eq!(width.to_string(), "50%");
//! ```
//!
//! ## Transforms
//!
//! Matrices use row vectors, so `a.multiply(&b)` means "`a`, then `b`".
//! Picking inverts a control's accumulated transform to bring a surface point
//! back into layout space:
//!
//! ```rust
//! use veneer_core::*;
//!
//! let t = Affine2D::around_pivot(50.0, 50.0, 0.5, 2.0, 2.0, None);
//! let p = t.transform_point(10.0, 20.0);
//! let back = t.invert().apply(p);
//! assert!((back.x - 10.0).abs() < 1e-3 && (back.y - 20.0).abs() < 1e-3);
//! ```

pub mod color;
pub mod error;
pub mod geometry;
pub mod input;
pub mod render_api;
pub mod scene;
pub mod style;
pub mod tests;
pub mod transform;
pub mod value;

pub use color::*;
pub use error::*;
pub use geometry::*;
pub use input::*;
pub use render_api::*;
pub use scene::*;
pub use style::*;
pub use transform::*;
pub use value::*;
