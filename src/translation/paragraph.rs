/*!
 * Paragraph segmentation of the input text.
 *
 * A paragraph is one newline-delimited unit of the input, possibly empty:
 * empty elements stand for blank lines and must survive into the output.
 */

/// Word-count class of a paragraph, used for template selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthClass {
    /// At most five space-separated words
    Short,
    /// More than five space-separated words
    Long,
}

/// Split the input into its ordered paragraphs
///
/// Splitting is on `'\n'` only; empty strings are valid elements and
/// represent blank lines.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

/// Number of space-separated words in a paragraph
pub fn word_count(paragraph: &str) -> usize {
    paragraph.split(' ').count()
}

/// Classify a paragraph by its word count
pub fn classify(paragraph: &str) -> LengthClass {
    if word_count(paragraph) > 5 {
        LengthClass::Long
    } else {
        LengthClass::Short
    }
}
