// src/classify/language.rs

use std::path::Path;

/// Maps a lowercase extension (with leading dot, e.g. ".rs") to a language.
pub trait LanguageDetector: Send + Sync {
    fn language_for_extension(&self, ext: &str) -> String;
}

/// Lowercased extension of `path` including the dot, or "" if none.
pub fn extension_of(path: &str) -> String {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// Static lookup table; anything unknown is "Unknown".
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtensionLanguages;

impl LanguageDetector for ExtensionLanguages {
    fn language_for_extension(&self, ext: &str) -> String {
        let language = match ext {
            ".rs" => "Rust",
            ".py" | ".pyi" => "Python",
            ".js" | ".mjs" | ".cjs" => "JavaScript",
            ".ts" | ".tsx" => "TypeScript",
            ".go" => "Go",
            ".java" => "Java",
            ".kt" | ".kts" => "Kotlin",
            ".c" | ".h" => "C",
            ".cc" | ".cpp" | ".cxx" | ".hpp" => "C++",
            ".cs" => "C#",
            ".rb" => "Ruby",
            ".php" => "PHP",
            ".swift" => "Swift",
            ".scala" => "Scala",
            ".sh" | ".bash" => "Shell",
            ".md" | ".markdown" => "Markdown",
            ".json" => "JSON",
            ".toml" => "TOML",
            ".yml" | ".yaml" => "YAML",
            ".html" | ".htm" => "HTML",
            ".css" => "CSS",
            ".sql" => "SQL",
            _ => "Unknown",
        };
        language.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("src/Main.RS"), ".rs");
        assert_eq!(extension_of("Makefile"), "");
        assert_eq!(extension_of("a/b.tar.gz"), ".gz");
    }

    #[test]
    fn test_lookup() {
        let d = ExtensionLanguages;
        assert_eq!(d.language_for_extension(".rs"), "Rust");
        assert_eq!(d.language_for_extension(".yaml"), "YAML");
        assert_eq!(d.language_for_extension(""), "Unknown");
    }
}
