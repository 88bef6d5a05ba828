// Practice module - reference text selection
//
// This module decides which reference text is active:
// 1. PracticeModeState: Manual vs Drill transition table with sticky text memory
// 2. DrillPhrasePool: fixed pool of drill phrases (tongue twisters)
// 3. Language catalogue: practice languages and their default sentences

pub mod drill;
pub mod language;
pub mod mode;

pub use drill::DrillPhrasePool;
pub use language::{find_language, Language, DEFAULT_LANGUAGE_TAG, LANGUAGES};
pub use mode::{PracticeMode, PracticeModeState};
