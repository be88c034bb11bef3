//! Settings for the shelf: where the library lives, how panes render and
//! where logs go.
//!
//! `schema` holds the serde types, `load` layers them from file and
//! environment.

mod load;
mod schema;

pub use schema::*;
