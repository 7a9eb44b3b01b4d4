// Groove - Meter, subdivisions and swing
// Shared by the pattern library and the arrangement engine

pub mod grid;

pub use grid::{swung_offset, Subdivision, TimeSignature};
