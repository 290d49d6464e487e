//! Pluggable configuration file parsers.
//!
//! Two parser variants are registered, selected by file extension: a
//! PHP array-returning file extractor (§4.4.1 of the design notes — a
//! minimal static parser, never a PHP interpreter) and a YAML parser. Both
//! yield the same tolerant [`ParseResult`] shape.

mod parser;
mod php_array;
mod result;

pub use parser::ConfigurationParser;
pub use parser::ParserRegistry;
pub use parser::PhpArrayParser;
pub use parser::YamlParser;
pub use result::ParseResult;
