pub mod errors;
pub mod graphs;
pub mod aligner;
pub mod io;

pub use errors::{Result, VaralignError};
