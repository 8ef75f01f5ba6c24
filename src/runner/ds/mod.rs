pub mod arguments;
pub mod error;
pub mod map;
pub mod operations;
pub mod value;
