pub mod aggregate;

pub use aggregate::{Unit, UnitForm, UnitStatus};
