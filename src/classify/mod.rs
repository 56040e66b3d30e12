// src/classify/mod.rs
// =============================================================================
// Collaborators the traverser asks about file contents.
//
// Submodules:
// - text: is this file worth emitting (text) or not (binary)?
// - language: which programming language does an extension belong to?
//
// Both are traits so a caller can plug in better heuristics; the defaults
// here are deliberately simple.
// =============================================================================

mod language;
mod text;

pub use language::{extension_of, ExtensionLanguages, LanguageDetector};
pub use text::{DefaultTextClassifier, TextClassifier};
