pub mod describe;
pub mod parse;
