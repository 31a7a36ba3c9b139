pub mod property;

pub use property::{coerce_bool, coerce_number, coerce_string, OwnerOccupied, PropertyRecord};
