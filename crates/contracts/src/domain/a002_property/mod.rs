pub mod aggregate;

pub use aggregate::{Property, PropertyForm, PropertyStatus};
