use super::*;
use rand::SeedableRng as _;

struct FixedLexicon(Vec<&'static str>);

impl LexiconProvider for FixedLexicon {
    fn fetch_words(&self) -> FetchOutcome<Vec<String>> {
        FetchOutcome::Success(self.0.iter().map(|w| w.to_string()).collect())
    }
}

#[test]
fn word_list_is_trimmed_filtered_and_truncated() {
    let body = "alpha\r\n\n  beta \ngamma\ndelta\n";
    assert_eq!(
        parse_word_list(body, 3),
        FetchOutcome::Success(vec![
            "alpha".to_string(),
            "beta".to_string(),
            "gamma".to_string()
        ])
    );
}

#[test]
fn empty_word_list_is_unavailable() {
    assert!(!parse_word_list("\n \n", 10).is_success());
}

#[test]
fn offline_lexicon_falls_back_to_builtin_keywords() {
    let words = keyword_candidates(&OfflineLexicon);
    assert_eq!(words, FALLBACK_KEYWORDS);
}

#[test]
fn fetched_words_are_used_as_is() {
    let words = keyword_candidates(&FixedLexicon(vec!["hollow", "static"]));
    assert_eq!(words, ["hollow", "static"]);
}

#[test]
fn selection_is_uniform_member_and_seed_stable() {
    let candidates: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
    let mut r1 = rand::rngs::StdRng::seed_from_u64(9);
    let mut r2 = rand::rngs::StdRng::seed_from_u64(9);
    for _ in 0..20 {
        let a = select_keyword(&candidates, &mut r1);
        let b = select_keyword(&candidates, &mut r2);
        assert_eq!(a, b);
        assert!(candidates.contains(&a));
    }
}

#[test]
fn empty_candidates_select_a_fallback() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(1);
    let k = select_keyword(&[], &mut rng);
    assert!(FALLBACK_KEYWORDS.contains(&k.as_str()));
}
