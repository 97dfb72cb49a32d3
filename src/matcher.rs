use crate::falling::FallingItem;

/// Outcome of checking the input buffer against the items on screen.
/// `Complete` and `Partial` carry the index of the item in the slice that was scanned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchKind {
    Complete(usize),
    Partial(usize),
    Wrong,
}

/// Scans `items` in order and classifies `buffer` against them.
///
/// Every active item scanned gets its matched prefix refreshed. The first exact
/// match ends the scan, so items after it keep their previous highlighting.
/// When nothing starts with the buffer all prefixes are cleared.
pub fn classify(buffer: &str, items: &mut [FallingItem]) -> MatchKind {
    let buffer = buffer.to_lowercase();
    let mut partial = None;

    for (idx, item) in items.iter_mut().enumerate() {
        if !item.is_active() {
            continue;
        }
        let prefix_ok = item.update_prefix(&buffer);
        if !buffer.is_empty() && item.text() == buffer {
            return MatchKind::Complete(idx);
        }
        if prefix_ok && partial.is_none() {
            partial = Some(idx);
        }
    }

    match partial {
        Some(idx) => MatchKind::Partial(idx),
        None => {
            for item in items.iter_mut() {
                item.clear_prefix();
            }
            MatchKind::Wrong
        }
    }
}

/// Index of the first active item whose text equals the buffer
pub fn find_exact(buffer: &str, items: &[FallingItem]) -> Option<usize> {
    let buffer = buffer.to_lowercase();
    if buffer.is_empty() {
        return None;
    }
    items
        .iter()
        .position(|item| item.is_active() && item.text() == buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn items(words: &[&str]) -> Vec<FallingItem> {
        words
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let mut item = FallingItem::new(i as u64, *w, 10.0, 1.0);
                item.start_falling();
                item
            })
            .collect()
    }

    #[test]
    fn test_partial_then_complete() {
        let mut list = items(&["cat"]);
        assert_matches!(classify("c", &mut list), MatchKind::Partial(0));
        assert_matches!(classify("ca", &mut list), MatchKind::Partial(0));
        assert_matches!(classify("cat", &mut list), MatchKind::Complete(0));
    }

    #[test]
    fn test_case_insensitive() {
        let mut list = items(&["Hello"]);
        assert_matches!(classify("HEL", &mut list), MatchKind::Partial(0));
        assert_eq!(list[0].matched_prefix(), "hel");
        assert_matches!(classify("hello", &mut list), MatchKind::Complete(0));
    }

    #[test]
    fn test_exact_match_beats_earlier_prefix() {
        let mut list = items(&["cats", "cat"]);
        assert_matches!(classify("cat", &mut list), MatchKind::Complete(1));
        assert_eq!(list[0].matched_prefix(), "cat");
    }

    #[test]
    fn test_earliest_exact_match_wins_ties() {
        let mut list = items(&["dog", "dog"]);
        assert_matches!(classify("dog", &mut list), MatchKind::Complete(0));
    }

    #[test]
    fn test_first_prefix_is_partial() {
        let mut list = items(&["zebra", "apple", "apricot"]);
        assert_matches!(classify("ap", &mut list), MatchKind::Partial(1));
        assert_eq!(list[0].matched_prefix(), "");
        assert_eq!(list[1].matched_prefix(), "ap");
        assert_eq!(list[2].matched_prefix(), "ap");
    }

    #[test]
    fn test_wrong_clears_every_prefix() {
        let mut list = items(&["apple", "apricot"]);
        classify("ap", &mut list);
        assert_matches!(classify("apx", &mut list), MatchKind::Wrong);
        assert!(list.iter().all(|i| i.matched_prefix().is_empty()));
    }

    #[test]
    fn test_empty_buffer_is_never_complete() {
        let mut list = items(&["a", "b"]);
        assert_matches!(classify("", &mut list), MatchKind::Partial(0));
        assert_eq!(find_exact("", &list), None);
    }

    #[test]
    fn test_no_items_is_wrong() {
        let mut list = items(&[]);
        assert_matches!(classify("a", &mut list), MatchKind::Wrong);
    }

    #[test]
    fn test_inactive_items_are_skipped() {
        let mut list = items(&["cat", "cat"]);
        list[0].mark_matched();
        assert_matches!(classify("cat", &mut list), MatchKind::Complete(1));
        assert_eq!(find_exact("CAT", &list), Some(1));
    }

    #[test]
    fn test_classify_is_deterministic() {
        let mut a = items(&["foo", "food", "bar"]);
        let mut b = a.clone();
        for buf in ["f", "fo", "foo", "x", "ba"] {
            assert_eq!(classify(buf, &mut a), classify(buf, &mut b));
        }
    }
}
