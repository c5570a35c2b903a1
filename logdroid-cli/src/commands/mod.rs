//! Command handlers -- one module per operating mode

pub mod dump;
pub mod parse;
