/*!
 * Tests for prompt template selection
 */

use tradwai::app_config::Direction;
use tradwai::translation::paragraph::{LengthClass, classify};
use tradwai::translation::prompts::PromptSet;

/// Every (direction, class) pair has a distinct instruction
#[test]
fn test_promptSet_allFourInstructions_shouldBeDistinct() {
    let prompts = PromptSet::default();
    let mut instructions = vec![
        prompts.instruction(Direction::FrenchToEnglish, LengthClass::Short),
        prompts.instruction(Direction::FrenchToEnglish, LengthClass::Long),
        prompts.instruction(Direction::EnglishToFrench, LengthClass::Short),
        prompts.instruction(Direction::EnglishToFrench, LengthClass::Long),
    ];
    instructions.sort_unstable();
    instructions.dedup();
    assert_eq!(instructions.len(), 4);
}

/// Classification feeds template selection across the boundary
#[test]
fn test_payload_acrossBoundary_shouldSwitchTemplates() {
    let prompts = PromptSet::default();
    let direction = Direction::FrenchToEnglish;

    let five = "un deux trois quatre cinq";
    let six = "un deux trois quatre cinq six";

    let short_payload = prompts.payload(direction, classify(five), five);
    let long_payload = prompts.payload(direction, classify(six), six);

    assert!(short_payload.starts_with(prompts.instruction(direction, LengthClass::Short)));
    assert!(long_payload.starts_with(prompts.instruction(direction, LengthClass::Long)));
}

/// A custom prompt set is used verbatim
#[test]
fn test_customPromptSet_shouldBeUsedVerbatim() {
    let prompts = PromptSet {
        word_french_to_english: "W1 ".to_string(),
        word_english_to_french: "W2 ".to_string(),
        sentence_french_to_english: "S1 ".to_string(),
        sentence_english_to_french: "S2 ".to_string(),
    };

    assert_eq!(
        prompts.payload(Direction::FrenchToEnglish, LengthClass::Short, "mot"),
        "W1 mot"
    );
    assert_eq!(
        prompts.payload(Direction::EnglishToFrench, LengthClass::Long, "sentence"),
        "S2 sentence"
    );
}
