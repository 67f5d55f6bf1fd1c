//! glassdo: a small task list with optional AI task breakdown.
//!
//! Tasks and the colour theme live in a key-value store (one JSON file per
//! key under the data directory). The `gd` binary is a thin layer over
//! [`session::Session`].

pub mod cli;
pub mod io;
pub mod model;
pub mod ops;
pub mod session;
pub mod suggest;
pub mod util;
