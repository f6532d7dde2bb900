//! Domain models for the Coffee Roast Tracker

mod bean;
mod blend;
mod roast;

pub use bean::*;
pub use blend::*;
pub use roast::*;
