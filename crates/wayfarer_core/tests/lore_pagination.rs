use wayfarer_core::generate::paginate;

fn anchors() -> Vec<String> {
    vec!["[page]".to_string()]
}

#[test]
fn short_text_is_one_trimmed_page() {
    assert_eq!(
        paginate("  A quiet valley.\n", 256, &anchors()),
        vec!["A quiet valley."]
    );
    assert!(paginate("   \n\t ", 256, &anchors()).is_empty());
}

#[test]
fn anchors_split_exactly_and_drop_empty_pages() {
    let pages = paginate("One[page]  Two [page][page]Three ", 256, &anchors());
    assert_eq!(pages, vec!["One", "Two", "Three"]);

    // Anchored text is never re-packed, even over budget.
    let pages = paginate("a long first page[page]b", 5, &anchors());
    assert_eq!(pages, vec!["a long first page", "b"]);
}

#[test]
fn paragraphs_pack_before_words() {
    let text = "Alpha beta gamma.\n\nDelta epsilon.\n  \nZeta eta theta iota kappa lambda mu nu xi omicron.";
    let pages = paginate(text, 40, &anchors());
    assert_eq!(
        pages,
        vec![
            "Alpha beta gamma.\n\nDelta epsilon.",
            "Zeta eta theta iota kappa lambda mu nu",
            "xi omicron.",
        ]
    );
    assert!(pages.iter().all(|page| page.chars().count() <= 40));
}

#[test]
fn overlong_words_are_hard_split() {
    assert_eq!(
        paginate("abcdefghijkl mn", 5, &[]),
        vec!["abcde", "fghij", "kl mn"]
    );
}

#[test]
fn budget_counts_characters_not_bytes() {
    assert_eq!(
        paginate("ééééé ééééé", 5, &[]),
        vec!["ééééé", "ééééé"]
    );
}
