pub mod document;
pub mod jwt;
pub mod problem;
