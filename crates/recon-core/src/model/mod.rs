pub mod moves;
pub mod square;
