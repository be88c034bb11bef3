//! Terminal application state, independent of rendering.
//!
//! See [`App`] for the two-pane model and the prompts it drives.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
