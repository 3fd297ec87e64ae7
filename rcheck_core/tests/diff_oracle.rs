use proptest::prelude::*;
use rcheck_core::lcs::{diff, Edit};
use similar::{capture_diff_slices, Algorithm, DiffTag};

fn changed(edits: &[Edit]) -> usize {
    edits
        .iter()
        .map(|e| (e.end - e.start) + (e.repl_end - e.repl_start))
        .sum()
}

fn oracle_changed(a: &[&str], b: &[&str]) -> usize {
    capture_diff_slices(Algorithm::Myers, a, b)
        .iter()
        .map(|op| op.as_tag_tuple())
        .filter(|(tag, _, _)| *tag != DiffTag::Equal)
        .map(|(_, old, new)| old.len() + new.len())
        .sum()
}

#[test]
fn test_known_texts_match_oracle() {
    let cases = [
        ("a\nb\nc\nd", "a\nc\nd\ne"),
        ("T{\n  A: 1,\n  B: 2,\n}", "T{\n  A: 1,\n  B: 3,\n}"),
        ("", "x\ny"),
        ("same", "same"),
    ];
    for (a, b) in cases {
        let al: Vec<&str> = a.split('\n').collect();
        let bl: Vec<&str> = b.split('\n').collect();
        assert_eq!(changed(&diff(&al, &bl)), oracle_changed(&al, &bl), "{a:?} vs {b:?}");
    }
}

proptest! {
    #[test]
    fn test_never_worse_than_oracle(a in "[abcd\n]{0,40}", b in "[abcd\n]{0,40}") {
        let al: Vec<&str> = a.split('\n').collect();
        let bl: Vec<&str> = b.split('\n').collect();
        prop_assert!(changed(&diff(&al, &bl)) <= oracle_changed(&al, &bl));
    }
}
