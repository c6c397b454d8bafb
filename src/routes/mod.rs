// src/routes/mod.rs

//! HTTP surface.
//!
//! - [`table`] turns the validated catalog into an exact path → binding map,
//!   with the catalog listings serialized once up front.
//! - [`dispatch`] serves that map through one axum fallback handler
//!   (404 for unknown paths, 405 for non-GET methods).

pub mod dispatch;
pub mod table;

pub use dispatch::build_router;
pub use table::{CategoryEntry, ExecEntry, RouteBinding, RouteTable};
