//! Domain models

pub mod plate;

pub use plate::{is_valid_plate, is_valid_plate_str, PositionClass, PLATE_LEN, POSITION_CLASSES};
