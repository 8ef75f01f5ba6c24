pub mod options;
pub mod xml;

pub use options::OptionsParser;
pub use xml::XmlParser;
