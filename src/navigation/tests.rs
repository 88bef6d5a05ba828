use super::*;

fn word(text: &str, score: f64) -> WordScore {
    WordScore {
        text: Some(text.to_string()),
        accuracy_score: score,
        syllables: vec![SyllableScore {
            syllable_label: Some(text.to_uppercase()),
            grapheme_label: None,
            accuracy_score: score,
        }],
    }
}

fn hierarchy(words: Vec<WordScore>) -> Arc<ScoreHierarchy> {
    Arc::new(ScoreHierarchy {
        overall_score: 89.0,
        accuracy_score: 92.0,
        fluency_score: 85.0,
        completeness_score: 95.0,
        prosody_score: Some(88.0),
        words,
    })
}

fn seven_word_navigator() -> ScoreNavigator {
    let text = "they were looking for a good book";
    let words = text.split(' ').map(|w| word(w, 90.0)).collect();
    ScoreNavigator::new(text, hierarchy(words))
}

#[test]
fn test_next_wraps_from_last_to_first() {
    let mut navigator = seven_word_navigator();
    navigator.select_word(6).unwrap();
    navigator.next_word();
    assert_eq!(navigator.state().current_word_index, 0);
}

#[test]
fn test_previous_wraps_from_first_to_last() {
    let mut navigator = seven_word_navigator();
    navigator.previous_word();
    assert_eq!(navigator.state().current_word_index, 6);
}

#[test]
fn test_full_cycle_returns_to_start() {
    let mut navigator = seven_word_navigator();
    for start in 0..7 {
        navigator.select_word(start).unwrap();
        for _ in 0..navigator.word_count() {
            navigator.next_word();
        }
        assert_eq!(navigator.state().current_word_index, start);
    }
}

#[test]
fn test_previous_undoes_next_everywhere() {
    let mut navigator = seven_word_navigator();
    for start in 0..7 {
        navigator.select_word(start).unwrap();
        navigator.next_word();
        navigator.previous_word();
        assert_eq!(navigator.state().current_word_index, start);

        navigator.previous_word();
        navigator.next_word();
        assert_eq!(navigator.state().current_word_index, start);
    }
}

#[test]
fn test_select_word_opens_detail() {
    let mut navigator = seven_word_navigator();
    assert!(!navigator.state().detail_open);

    navigator.select_word(2).unwrap();
    assert_eq!(navigator.current_word(), "looking");
    assert!(navigator.state().detail_open);

    navigator.close_detail();
    assert!(!navigator.state().detail_open);
    assert_eq!(navigator.state().current_word_index, 2);
}

#[test]
fn test_select_out_of_range_is_rejected() {
    let mut navigator = seven_word_navigator();
    navigator.select_word(3).unwrap();

    let result = navigator.select_word(7);
    assert_eq!(
        result,
        Err(SessionError::WordIndexOutOfRange { index: 7, len: 7 })
    );
    assert_eq!(
        navigator.state(),
        NavigatorState {
            current_word_index: 3,
            detail_open: true
        }
    );
}

#[test]
fn test_backend_shorter_than_reference_yields_no_score() {
    // Reference has four words, backend scored only two.
    let mut navigator = ScoreNavigator::new(
        "one two three four",
        hierarchy(vec![word("one", 95.0), word("two", 75.0)]),
    );
    assert_eq!(navigator.word_count(), 4);

    navigator.select_word(1).unwrap();
    assert_eq!(navigator.current_word_score().map(|w| w.accuracy_score), Some(75.0));

    navigator.select_word(3).unwrap();
    assert_eq!(navigator.current_word(), "four");
    assert!(navigator.current_word_score().is_none());

    let view = navigator.view();
    assert_eq!(view.current_word, "four");
    assert_eq!(view.word_score, None);
    assert_eq!(view.word_band, None);
    assert!(view.syllables.is_empty());
}

#[test]
fn test_empty_backend_words_still_navigable() {
    let mut navigator = ScoreNavigator::new("hello there", hierarchy(Vec::new()));
    assert_eq!(navigator.word_count(), 2);
    navigator.next_word();
    navigator.next_word();
    assert_eq!(navigator.state().current_word_index, 0);
    assert!(navigator.current_word_score().is_none());
}

#[test]
fn test_backend_longer_than_reference_limits_navigation() {
    let navigator = ScoreNavigator::new(
        "hello",
        hierarchy(vec![word("hel", 80.0), word("lo", 70.0)]),
    );
    assert_eq!(navigator.word_count(), 1);
}

#[test]
fn test_double_space_produces_empty_word() {
    assert_eq!(reference_words("good  book"), vec!["good", "", "book"]);
    assert_eq!(reference_words("single"), vec!["single"]);
}

#[test]
fn test_view_carries_phonetics_and_band() {
    let mut navigator = seven_word_navigator();
    navigator.select_word(5).unwrap();
    let view = navigator.view();
    assert_eq!(view.current_word, "good");
    assert_eq!(view.word_band, Some(ScoreBand::Excellent));
    assert_eq!(view.phonetic_text.as_deref(), Some("/GOOD/"));
    assert_eq!(view.syllables.len(), 1);
    assert!(view.state.detail_open);
}
