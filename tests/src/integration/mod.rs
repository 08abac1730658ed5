pub mod properties;
pub mod scenarios;
