use super::*;
use crate::source::OfflineSummary;
use rand::SeedableRng as _;

#[test]
fn offline_corpus_is_the_static_set() {
    let c = Corpus::fetch_and_build("void", &OfflineSummary);
    assert_eq!(c.len(), WARNING_PHRASES.len());
    assert_eq!(c.lines()[0], "EMERGENCY BROADCAST SYSTEM");
    assert!(!c.is_empty());
}

#[test]
fn keyed_phrases_contain_exact_keyword() {
    for keyword in ["void", "Hollow-Man", "x"] {
        let c = Corpus::build(keyword, FetchOutcome::Unavailable("down".into()));
        let mut keyed = 0;
        for (phrase, line) in WARNING_PHRASES.iter().zip(c.lines()) {
            if let WarningPhrase::Keyed(_) = phrase {
                keyed += 1;
                assert!(line.contains(keyword), "{line:?} lacks {keyword:?}");
            }
        }
        assert!(keyed >= 1);
    }
}

#[test]
fn summary_is_prepended() {
    let c = Corpus::build("void", FetchOutcome::Success("A void is empty.".into()));
    assert_eq!(c.len(), WARNING_PHRASES.len() + 1);
    assert_eq!(c.lines()[0], "A void is empty.");
    assert_eq!(c.lines()[1], "EMERGENCY BROADCAST SYSTEM");
}

#[test]
fn order_is_stable_for_same_inputs() {
    let a = Corpus::build("void", FetchOutcome::Success("s".into()));
    let b = Corpus::build("void", FetchOutcome::Success("s".into()));
    assert_eq!(a, b);
}

#[test]
fn choose_index_is_in_bounds() {
    let c = Corpus::build("void", FetchOutcome::Unavailable("x".into()));
    let mut rng = rand::rngs::StdRng::seed_from_u64(0);
    for _ in 0..100 {
        assert!(c.choose_index(&mut rng) < c.len());
    }
}
