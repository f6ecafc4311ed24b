pub mod huggingface;
pub mod lexicon;

pub use huggingface::HuggingFaceClassifier;
pub use lexicon::LexiconClassifier;

/// Longest prefix of `text` holding at most `max_chars` characters.
///
/// Cuts on a char boundary so multi-byte text never panics. `max_chars == 0`
/// means no limit.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    if max_chars == 0 {
        return text;
    }
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
