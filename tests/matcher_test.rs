mod common;

use common::{event, keywords};
use trademark_monitor::deduplication::DedupWindow;
use trademark_monitor::matcher::Matcher;

fn matcher(words: &[&str]) -> Matcher {
    let mut matcher = Matcher::default();
    matcher.replace_keywords(keywords(words));
    matcher
}

#[test]
fn reshares_never_match() {
    let mut m = matcher(&["FakeBrand", "great"]);
    let mut e = event(1, "RT @x: FakeBrand is great");
    e.is_reshare = true;

    assert!(m.check(&e).is_none());
    assert!(m.window().is_empty());
}

#[test]
fn matching_ignores_case() {
    let mut m = matcher(&["FAKEBRAND"]);
    let hit = m.check(&event(2, "who sells fakebrand shoes?")).unwrap();
    assert_eq!(hit.text, "FAKEBRAND");
    assert_eq!(hit.trademark_id, 1);
}

#[test]
fn extended_text_supersedes_text() {
    let mut m = matcher(&["counterfeit"]);
    let mut e = event(3, "Look at this deal…");
    e.extended_text = Some("Look at this deal on counterfeit bags".into());
    assert!(m.check(&e).is_some());

    let mut m = matcher(&["deal"]);
    let mut e = event(4, "Look at this deal…");
    e.extended_text = Some("Nothing to see".into());
    assert!(m.check(&e).is_none());
}

#[test]
fn first_keyword_wins() {
    let mut m = matcher(&["nope", "brand", "fake"]);
    let hit = m.check(&event(5, "fake brand")).unwrap();
    assert_eq!(hit.text, "brand");
}

#[test]
fn blank_keywords_never_match() {
    let mut m = matcher(&["", "   "]);
    assert_eq!(m.keyword_count(), 0);
    assert!(m.check(&event(6, "anything at all")).is_none());
}

#[test]
fn same_id_matches_only_once() {
    let mut m = matcher(&["FakeBrand"]);
    assert!(m.check(&event(42, "Buy FakeBrand now")).is_some());
    assert!(m.window().contains(42));
    assert!(m.check(&event(42, "Buy FakeBrand now")).is_none());
    assert_eq!(m.window().len(), 1);
}

#[test]
fn non_matching_events_do_not_enter_window() {
    let mut m = matcher(&["FakeBrand"]);
    assert!(m.check(&event(7, "unrelated chatter")).is_none());
    assert!(!m.window().contains(7));
}

#[test]
fn window_resets_on_the_insert_past_capacity() {
    let mut m = Matcher::new(DedupWindow::new(1000));
    m.replace_keywords(keywords(&["FakeBrand"]));

    for id in 0..1000 {
        assert!(m.check(&event(id, "FakeBrand")).is_some());
    }
    assert_eq!(m.window().len(), 1000);

    assert!(m.check(&event(1000, "FakeBrand")).is_some());
    assert_eq!(m.window().len(), 0);

    // Forgotten by the reset, so it alerts again.
    assert!(m.check(&event(0, "FakeBrand")).is_some());
}
