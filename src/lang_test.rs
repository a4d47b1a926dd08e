use super::*;

// =============================================================
// detect_language
// =============================================================

#[test]
fn arabic_character_wins() {
    assert_eq!(detect_language("ما هو"), Language::Ar);
    assert_eq!(detect_language("hello مرحبا le chat et la souris"), Language::Ar);
}

#[test]
fn french_stop_words_tag_french() {
    assert_eq!(detect_language("le chat et la souris"), Language::Fr);
    assert_eq!(detect_language("Quelle est la capitale ?"), Language::Fr);
}

#[test]
fn elisions_split_on_apostrophe() {
    assert_eq!(detect_language("C'est l'heure"), Language::Fr);
}

#[test]
fn curly_apostrophe_elisions_count() {
    assert_eq!(detect_language("l\u{2019}eau est froide"), Language::Fr);
    assert_eq!(detect_language("qu'il vienne"), Language::Fr);
}

#[test]
fn english_contractions_are_not_elisions() {
    assert_eq!(detect_language("It's late and she's tired"), Language::En);
    assert_eq!(detect_language("I'd say it's fine, don't you think?"), Language::En);
    assert_eq!(detect_language("It\u{2019}s what she\u{2019}d want"), Language::En);
}

#[test]
fn english_words_shared_with_french_are_ignored() {
    assert_eq!(detect_language("My son washed the car"), Language::En);
    assert_eq!(detect_language("Pour the water and leave a comment for the non-profit"), Language::En);
}

#[test]
fn bare_single_letters_do_not_count() {
    assert_eq!(detect_language("Plan B: section d, part l, item s"), Language::En);
}

#[test]
fn french_hits_per_word() {
    assert_eq!(french_hits("c'est"), 2);
    assert_eq!(french_hits("l'heure"), 1);
    assert_eq!(french_hits("it's"), 0);
    assert_eq!(french_hits("son"), 0);
}

#[test]
fn single_french_word_is_not_enough() {
    assert_eq!(detect_language("bonjour Alice"), Language::En);
}

#[test]
fn english_is_the_fallback() {
    assert_eq!(detect_language("hello there"), Language::En);
    assert_eq!(detect_language(""), Language::En);
    assert_eq!(detect_language("12345 !!"), Language::En);
}

#[test]
fn detection_is_case_insensitive() {
    assert_eq!(detect_language("LE CHAT ET LA SOURIS"), Language::Fr);
}

// =============================================================
// Language
// =============================================================

#[test]
fn language_codes() {
    assert_eq!(Language::En.code(), "en");
    assert_eq!(Language::Fr.to_string(), "fr");
    assert_eq!(Language::Ar.code(), "ar");
    assert_eq!(Language::default(), Language::En);
}
