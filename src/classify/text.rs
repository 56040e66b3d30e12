// src/classify/text.rs
// =============================================================================
// Text/binary decision for a fetched file.
//
// Checks run in this order:
// 1. Declared size above MAX_TEXT_SIZE: binary
// 2. File name guessed as image/audio/video/font (mime_guess): binary
// 3. Magic bytes of the sample recognised by `infer`: text only for the
//    text matchers (html, xml, shell scripts), binary for everything else
// 4. Unrecognised bytes: binary if the first SNIFF_LEN bytes contain a NUL
// =============================================================================

use infer::MatcherType;
use mime_guess::mime;

/// Decides whether a file's content should be emitted.
pub trait TextClassifier: Send + Sync {
    fn is_text_file(&self, path: &str, declared_size: u64, sample: Option<&[u8]>) -> bool;
}

/// Bytes of the sample inspected for NULs.
const SNIFF_LEN: usize = 8000;

/// Files above this size are never treated as text.
const MAX_TEXT_SIZE: u64 = 10 * 1024 * 1024;

/// Name guess, then magic bytes, then a NUL-byte sniff.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTextClassifier;

impl TextClassifier for DefaultTextClassifier {
    fn is_text_file(&self, path: &str, declared_size: u64, sample: Option<&[u8]>) -> bool {
        if declared_size > MAX_TEXT_SIZE || is_media_name(path) {
            return false;
        }
        match sample {
            Some(bytes) => is_text_sample(bytes),
            None => true,
        }
    }
}

// Media types that are never worth reading as text, by file name alone.
fn is_media_name(path: &str) -> bool {
    mime_guess::from_path(path).iter().any(|m| {
        let top = m.type_();
        top == mime::IMAGE || top == mime::AUDIO || top == mime::VIDEO || top == mime::FONT
    })
}

fn is_text_sample(bytes: &[u8]) -> bool {
    match infer::get(bytes) {
        Some(kind) => kind.matcher_type() == MatcherType::Text,
        None => !bytes.iter().take(SNIFF_LEN).any(|&b| b == 0),
    }
}
