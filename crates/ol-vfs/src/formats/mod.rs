//! File format parsers

pub mod sfo;
