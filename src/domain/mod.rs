pub mod actor;
pub mod ai;
pub mod grid;
pub mod rules;
