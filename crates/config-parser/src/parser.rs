use std::path::Path;

use crate::ParseResult;
use crate::php_array;

/// A pluggable parser for one configuration file format, selected by file
/// extension. Implementations must never panic or propagate an error out of
/// `parse_file` — all failures become a `ParseResult::failure(...)`.
pub trait ConfigurationParser: Send + Sync {
    fn name(&self) -> &'static str;

    fn supports(&self, path: &Path) -> bool;

    fn parse_file(&self, path: &Path) -> ParseResult;
}

/// Parses `<?php ... return ARRAY;` style files by statically extracting the
/// returned array literal (§4.4.1). Never executes the file.
pub struct PhpArrayParser;

impl ConfigurationParser for PhpArrayParser {
    fn name(&self) -> &'static str {
        "php-array"
    }

    fn supports(&self, path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()).is_some_and(|ext| ext.eq_ignore_ascii_case("php"))
    }

    fn parse_file(&self, path: &Path) -> ParseResult {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(error) => return ParseResult::failure(vec![error.to_string()], self.name(), path),
        };

        let extraction = php_array::extract(&content);

        let Some(value) = extraction.value else {
            return ParseResult::failure(extraction.errors, self.name(), path).with_warnings(extraction.warnings);
        };

        match value {
            serde_json::Value::Object(map) => {
                ParseResult::success(map, self.name(), path).with_warnings(extraction.warnings)
            }
            _ => ParseResult::failure(vec!["returned value is not a string-keyed array".to_owned()], self.name(), path),
        }
    }
}

/// Parses standard YAML files into a string-keyed map.
pub struct YamlParser;

impl ConfigurationParser for YamlParser {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn supports(&self, path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()).is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
    }

    fn parse_file(&self, path: &Path) -> ParseResult {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(error) => return ParseResult::failure(vec![error.to_string()], self.name(), path),
        };

        let value: serde_json::Value = match serde_norway::from_str(&content) {
            Ok(value) => value,
            Err(error) => return ParseResult::failure(vec![error.to_string()], self.name(), path),
        };

        match value {
            serde_json::Value::Object(map) => ParseResult::success(map, self.name(), path),
            serde_json::Value::Null => ParseResult::success(serde_json::Map::new(), self.name(), path),
            _ => ParseResult::failure(vec!["document root is not a mapping".to_owned()], self.name(), path),
        }
    }
}

/// Selects the first registered parser that supports a given file.
pub struct ParserRegistry {
    parsers: Vec<Box<dyn ConfigurationParser>>,
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self { parsers: vec![Box::new(PhpArrayParser), Box::new(YamlParser)] }
    }
}

impl ParserRegistry {
    pub fn parser_for(&self, path: &Path) -> Option<&dyn ConfigurationParser> {
        self.parsers.iter().find(|p| p.supports(path)).map(std::convert::AsRef::as_ref)
    }

    pub fn parse(&self, path: &Path) -> ParseResult {
        match self.parser_for(path) {
            Some(parser) => parser.parse_file(path),
            None => ParseResult::failure(vec!["no parser registered for this file extension".to_owned()], "unknown", path),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn selects_php_parser_by_extension() {
        let registry = ParserRegistry::default();
        assert_eq!(registry.parser_for(Path::new("ext_emconf.php")).map(ConfigurationParser::name), Some("php-array"));
        assert_eq!(registry.parser_for(Path::new("Services.yaml")).map(ConfigurationParser::name), Some("yaml"));
        assert!(registry.parser_for(Path::new("README.md")).is_none());
    }

    #[test]
    fn yaml_parser_parses_mapping() {
        let dir = tempfile_dir();
        let path = dir.join("Services.yaml");
        std::fs::write(&path, "services:\n  _defaults:\n    autowire: true\n").unwrap();

        let result = YamlParser.parse_file(&path);
        assert!(result.success);
        assert!(result.data.contains_key("services"));
    }

    fn tempfile_dir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("cua-config-parser-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}
