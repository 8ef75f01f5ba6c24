pub mod path;
pub mod test_and_comparison;
pub mod type_conversion;
