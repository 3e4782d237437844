/*!
 * Prompt templates for paragraph translation.
 *
 * Each paragraph is submitted as a single instruction message: a fixed
 * template selected by (direction, length class), with the paragraph
 * appended verbatim. Short paragraphs get the word-oriented template,
 * longer ones the sentence-oriented template.
 */

use once_cell::sync::Lazy;

use crate::app_config::Direction;
use crate::translation::paragraph::LengthClass;

/// The default word-level French to English instruction.
const WORD_FRENCH_TO_ENGLISH: &str = "Traduis ce mot ou groupe de mots du français vers l'anglais, réponds uniquement avec la traduction : ";

/// The default word-level English to French instruction.
const WORD_ENGLISH_TO_FRENCH: &str = "Traduis ce mot ou groupe de mots de l'anglais vers le français, réponds uniquement avec la traduction : ";

/// The default sentence-level French to English instruction.
const SENTENCE_FRENCH_TO_ENGLISH: &str = "Traduis cette phrase du français vers l'anglais, réponds uniquement avec la traduction : ";

/// The default sentence-level English to French instruction.
const SENTENCE_ENGLISH_TO_FRENCH: &str = "Traduis cette phrase de l'anglais vers le français, réponds uniquement avec la traduction : ";

/// The fixed instruction strings for both directions and length classes
#[derive(Debug, Clone)]
pub struct PromptSet {
    /// Word-level instruction, French source
    pub word_french_to_english: String,
    /// Word-level instruction, English source
    pub word_english_to_french: String,
    /// Sentence-level instruction, French source
    pub sentence_french_to_english: String,
    /// Sentence-level instruction, English source
    pub sentence_english_to_french: String,
}

/// The prompt set shipped with the binary
static DEFAULT_PROMPTS: Lazy<PromptSet> = Lazy::new(|| PromptSet {
    word_french_to_english: WORD_FRENCH_TO_ENGLISH.to_string(),
    word_english_to_french: WORD_ENGLISH_TO_FRENCH.to_string(),
    sentence_french_to_english: SENTENCE_FRENCH_TO_ENGLISH.to_string(),
    sentence_english_to_french: SENTENCE_ENGLISH_TO_FRENCH.to_string(),
});

impl PromptSet {
    /// The instruction for a direction and length class
    pub fn instruction(&self, direction: Direction, class: LengthClass) -> &str {
        match (direction, class) {
            (Direction::FrenchToEnglish, LengthClass::Short) => &self.word_french_to_english,
            (Direction::FrenchToEnglish, LengthClass::Long) => &self.sentence_french_to_english,
            (Direction::EnglishToFrench, LengthClass::Short) => &self.word_english_to_french,
            (Direction::EnglishToFrench, LengthClass::Long) => &self.sentence_english_to_french,
        }
    }

    /// The full instruction payload for one paragraph
    pub fn payload(&self, direction: Direction, class: LengthClass, paragraph: &str) -> String {
        format!("{}{}", self.instruction(direction, class), paragraph)
    }
}

impl Default for PromptSet {
    fn default() -> Self {
        DEFAULT_PROMPTS.clone()
    }
}
