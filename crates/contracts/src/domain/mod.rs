pub mod a001_unit;
pub mod a002_property;
pub mod a003_agent;
pub mod common;
