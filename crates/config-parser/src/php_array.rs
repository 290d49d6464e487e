//! A minimal, hand-written extractor for the narrow subset of PHP
//! array-literal syntax actually used by TYPO3-style configuration files
//! (`ext_emconf.php`, `LocalConfiguration.php`, ...). No PHP interpreter is
//! embedded or spawned: this recognizes `array(...)`/`[...]` literals,
//! `'key' => value` / positional entries, and scalar literals, and nothing
//! else. Anything it doesn't recognize inside a value position degrades
//! that single entry to a warning and a `null` placeholder rather than
//! failing the whole file, matching the tolerant `ParseResult` contract.

use regex::Regex;
use serde_json::Map;
use serde_json::Value;
use std::sync::LazyLock;

static EM_CONF_ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$EM_CONF\s*\[[^\]]*\]\s*=\s*").expect("valid regex"));
static RETURN_STATEMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\breturn\s+").expect("valid regex"));

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LBracket,
    RBracket,
    Arrow,
    Comma,
    Semicolon,
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    Identifier(String),
}

/// The outcome of extracting a literal: the value (if any could be
/// recovered), plus warnings for degraded entries and errors for total
/// failure.
pub struct Extraction {
    pub value: Option<Value>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

/// Locates and parses the first top-level array literal return/assignment
/// in a PHP file's contents.
pub fn extract(content: &str) -> Extraction {
    let start = find_literal_start(content);
    let Some(start) = start else {
        return Extraction { value: None, warnings: vec![], errors: vec!["no array literal return found".to_owned()] };
    };

    let tokens = tokenize(&content[start..]);
    let mut parser = Parser { tokens: &tokens, pos: 0, warnings: Vec::new() };
    match parser.parse_value() {
        Ok(value) => Extraction { value: Some(value), warnings: parser.warnings, errors: vec![] },
        Err(error) => Extraction { value: None, warnings: parser.warnings, errors: vec![error] },
    }
}

/// Finds the end-offset of the first `$EM_CONF[...] = ` assignment or,
/// failing that, the first `return` keyword — whichever the file actually
/// contains (these files use exactly one of the two shapes).
fn find_literal_start(content: &str) -> Option<usize> {
    if let Some(m) = EM_CONF_ASSIGNMENT.find(content) {
        return Some(m.end());
    }
    RETURN_STATEMENT.find(content).map(|m| m.end())
}

fn tokenize(src: &str) -> Vec<Token> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '[' | '(' => {
                tokens.push(Token::LBracket);
                i += 1;
            }
            ']' | ')' => {
                tokens.push(Token::RBracket);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            ';' => {
                tokens.push(Token::Semicolon);
                i += 1;
            }
            '=' if chars.get(i + 1) == Some(&'>') => {
                tokens.push(Token::Arrow);
                i += 2;
            }
            '\'' | '"' => {
                let quote = c;
                let mut s = String::new();
                i += 1;
                while i < chars.len() && chars[i] != quote {
                    if chars[i] == '\\' && i + 1 < chars.len() {
                        let escaped = chars[i + 1];
                        match (quote, escaped) {
                            (_, '\\') => s.push('\\'),
                            ('\'', '\'') | ('"', '"') => s.push(escaped),
                            ('"', 'n') => s.push('\n'),
                            ('"', 't') => s.push('\t'),
                            _ => {
                                s.push(chars[i]);
                                s.push(escaped);
                            }
                        }
                        i += 2;
                    } else {
                        s.push(chars[i]);
                        i += 1;
                    }
                }
                i += 1; // closing quote
                tokens.push(Token::String(s));
            }
            c if c.is_ascii_digit() || (c == '-' && chars.get(i + 1).is_some_and(char::is_ascii_digit)) => {
                let start = i;
                if c == '-' {
                    i += 1;
                }
                let mut is_float = false;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    if chars[i] == '.' {
                        is_float = true;
                    }
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                if is_float {
                    tokens.push(text.parse::<f64>().map_or(Token::Identifier(text), Token::Float));
                } else {
                    tokens.push(text.parse::<i64>().map_or(Token::Identifier(text), Token::Int));
                }
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                let lower = word.to_ascii_lowercase();
                match lower.as_str() {
                    "true" => tokens.push(Token::Bool(true)),
                    "false" => tokens.push(Token::Bool(false)),
                    "null" => tokens.push(Token::Null),
                    "array" => {} // `array(` — the `(` token already opens the literal.
                    _ => tokens.push(Token::Identifier(word)),
                }
            }
            _ => i += 1, // skip anything else (e.g. stray operators) rather than abort tokenizing.
        }
    }

    tokens
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    warnings: Vec<String>,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        self.pos += 1;
        tok
    }

    fn parse_value(&mut self) -> Result<Value, String> {
        match self.advance() {
            Some(Token::LBracket) => self.parse_array(),
            Some(Token::String(s)) => Ok(Value::String(s.clone())),
            Some(Token::Int(n)) => Ok(Value::Number((*n).into())),
            Some(Token::Float(n)) => Ok(serde_json::Number::from_f64(*n).map_or(Value::Null, Value::Number)),
            Some(Token::Bool(b)) => Ok(Value::Bool(*b)),
            Some(Token::Null) => Ok(Value::Null),
            Some(Token::Identifier(name)) => Err(format!("unsupported expression: `{name}`")),
            other => Err(format!("unexpected token: {other:?}")),
        }
    }

    fn parse_array(&mut self) -> Result<Value, String> {
        let mut entries: Vec<(String, Value)> = Vec::new();
        let mut next_index: i64 = 0;

        if self.peek() == Some(&Token::RBracket) {
            self.advance();
            return Ok(object_from(entries));
        }

        loop {
            let first = self.parse_array_entry_value();

            let (key, value) = if self.peek() == Some(&Token::Arrow) {
                self.advance();
                let key = match first {
                    Ok(Value::String(s)) => s,
                    Ok(Value::Number(n)) => n.to_string(),
                    _ => {
                        self.warnings.push("non-scalar array key degraded to positional entry".to_owned());
                        let idx = next_index;
                        next_index += 1;
                        idx.to_string()
                    }
                };
                let value = self.recover_value();
                (key, value)
            } else {
                let idx = next_index;
                next_index += 1;
                (idx.to_string(), first.unwrap_or_else(|error| {
                    self.warnings.push(error);
                    Value::Null
                }))
            };

            entries.push((key, value));

            match self.peek() {
                Some(Token::Comma) => {
                    self.advance();
                    if self.peek() == Some(&Token::RBracket) {
                        self.advance();
                        break;
                    }
                }
                Some(Token::RBracket) => {
                    self.advance();
                    break;
                }
                _ => {
                    self.warnings.push("malformed array entry separator; recovering at next boundary".to_owned());
                    self.skip_to_boundary();
                    match self.advance() {
                        Some(Token::RBracket) => break,
                        Some(Token::Comma) => {}
                        _ => break,
                    }
                }
            }
        }

        Ok(object_from(entries))
    }

    /// Parses an entry's first value, tolerating failure by recording it
    /// as an `Err` the caller turns into a warning + null.
    fn parse_array_entry_value(&mut self) -> Result<Value, String> {
        self.parse_value()
    }

    fn recover_value(&mut self) -> Value {
        self.parse_value().unwrap_or_else(|error| {
            self.warnings.push(error);
            Value::Null
        })
    }

    /// Skips tokens, tracking nesting depth, until a top-level comma or
    /// closing bracket is found — used to resynchronize after a malformed
    /// entry without aborting the rest of the literal.
    fn skip_to_boundary(&mut self) {
        let mut depth = 0i32;
        while let Some(tok) = self.peek() {
            match tok {
                Token::LBracket => {
                    depth += 1;
                    self.pos += 1;
                }
                Token::RBracket if depth > 0 => {
                    depth -= 1;
                    self.pos += 1;
                }
                Token::RBracket | Token::Comma if depth == 0 => return,
                Token::Semicolon if depth == 0 => return,
                _ => self.pos += 1,
            }
        }
    }
}

fn object_from(entries: Vec<(String, Value)>) -> Value {
    let mut map = Map::new();
    for (k, v) in entries {
        map.insert(k, v);
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn extracts_simple_em_conf_array() {
        let content = r#"<?php
$EM_CONF['news'] = [
    'title' => 'News System',
    'version' => '11.0.0',
    'state' => 'stable',
];
"#;
        let extraction = extract(content);
        assert!(extraction.errors.is_empty());
        let value = extraction.value.expect("value extracted");
        assert_eq!(value["title"], Value::String("News System".to_owned()));
        assert_eq!(value["version"], Value::String("11.0.0".to_owned()));
    }

    #[test]
    fn extracts_nested_return_array() {
        let content = r#"<?php
return array(
    'packages' => array(
        'news' => array('packagePath' => 'typo3conf/ext/news/', 'state' => 'active'),
    ),
);
"#;
        let extraction = extract(content);
        assert!(extraction.errors.is_empty());
        let value = extraction.value.expect("value extracted");
        assert_eq!(value["packages"]["news"]["state"], Value::String("active".to_owned()));
    }

    #[test]
    fn degrades_unsupported_value_to_warning_and_continues() {
        let content = r#"<?php
return [
    'valid' => 'yes',
    'broken' => SOME_CONSTANT,
    'alsoValid' => 42,
];
"#;
        let extraction = extract(content);
        assert!(extraction.errors.is_empty());
        assert!(!extraction.warnings.is_empty());
        let value = extraction.value.expect("value extracted");
        assert_eq!(value["valid"], Value::String("yes".to_owned()));
        assert_eq!(value["broken"], Value::Null);
        assert_eq!(value["alsoValid"], Value::Number(42.into()));
    }

    #[test]
    fn fails_when_no_literal_found() {
        let extraction = extract("<?php\necho 'hello';\n");
        assert!(extraction.value.is_none());
        assert!(!extraction.errors.is_empty());
    }
}
