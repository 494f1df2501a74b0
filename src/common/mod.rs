// Common types shared across the engine.

pub mod datum;

pub use datum::Datum;
