use regex::Regex;
use std::sync::LazyLock;

static CLASSLIKE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(class|interface|trait|enum)\s+\w+").expect("valid regex"));
static FUNCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(public|private|protected|static)?\s*function\s+\w+").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Comment,
    Code,
}

/// Tracks multi-line comment state across sequential `classify` calls for
/// one file.
#[derive(Debug, Default)]
pub struct LineClassifier {
    in_block_comment: bool,
}

impl LineClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classify(&mut self, line: &str) -> LineKind {
        let trimmed = line.trim();

        if self.in_block_comment {
            if trimmed.contains("*/") {
                self.in_block_comment = false;
            }
            return LineKind::Comment;
        }

        if trimmed.is_empty() {
            return LineKind::Blank;
        }

        if trimmed.starts_with("/*") {
            if !trimmed.contains("*/") {
                self.in_block_comment = true;
            }
            return LineKind::Comment;
        }

        if trimmed.starts_with("//") || trimmed.starts_with('#') {
            return LineKind::Comment;
        }

        LineKind::Code
    }
}

pub fn is_classlike(line: &str) -> bool {
    CLASSLIKE.is_match(line)
}

pub fn is_function_like(line: &str) -> bool {
    FUNCTION.is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_blank_single_line_and_multi_line_comments() {
        let mut classifier = LineClassifier::new();
        assert_eq!(classifier.classify(""), LineKind::Blank);
        assert_eq!(classifier.classify("// a comment"), LineKind::Comment);
        assert_eq!(classifier.classify("# a hash comment"), LineKind::Comment);
        assert_eq!(classifier.classify("/* starts a block"), LineKind::Comment);
        assert_eq!(classifier.classify("still inside the block"), LineKind::Comment);
        assert_eq!(classifier.classify("ends the block */"), LineKind::Comment);
        assert_eq!(classifier.classify("$x = 1;"), LineKind::Code);
    }

    #[test]
    fn a_single_line_block_comment_does_not_leak_into_the_next_line() {
        let mut classifier = LineClassifier::new();
        assert_eq!(classifier.classify("/* inline */"), LineKind::Comment);
        assert_eq!(classifier.classify("$x = 1;"), LineKind::Code);
    }

    #[test]
    fn detects_classlike_and_function_declarations() {
        assert!(is_classlike("class NewsController extends ActionController"));
        assert!(is_classlike("interface RepositoryInterface"));
        assert!(!is_classlike("$class = 'NewsController';"));

        assert!(is_function_like("public function initializeAction()"));
        assert!(is_function_like("function helper()"));
        assert!(!is_function_like("$function = 'helper';"));
    }
}
