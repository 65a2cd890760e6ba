pub mod me;
pub mod tokens;
