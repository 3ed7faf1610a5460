//! Property tests for the flat property text format

use proptest::prelude::*;
use realmadmin_core::vault::{PropertiesError, parse_properties, write_properties};

/// Generates a property key (stable upper-case names plus arbitrary text)
fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Z][A-Z0-9_]{0,24}",
        "[a-zA-Z0-9 =:#!._-]{1,16}".prop_filter("key must not be blank", |s| {
            !s.trim().is_empty() && !s.ends_with(' ')
        }),
    ]
}

proptest! {
    #[test]
    fn any_value_survives_write_then_parse(
        key in arb_key(),
        value in any::<String>(),
    ) {
        let text = write_properties(&["header"], [(key.as_str(), value.as_str())]);
        let map = parse_properties(&text).unwrap();

        prop_assert_eq!(map.len(), 1);
        prop_assert_eq!(map.get(&key), Some(&value));
    }

    #[test]
    fn written_text_has_one_line_per_entry(
        values in prop::collection::vec("[ -~\n\r\t]{0,32}", 1..8),
    ) {
        let keys: Vec<String> = (0..values.len()).map(|i| format!("KEY_{i}")).collect();
        let text = write_properties(
            &[],
            keys.iter().map(String::as_str).zip(values.iter().map(String::as_str)),
        );

        prop_assert_eq!(text.lines().count(), values.len());
        let map = parse_properties(&text).unwrap();
        for (key, value) in keys.iter().zip(&values) {
            prop_assert_eq!(&map[key], value);
        }
    }

    #[test]
    fn comment_lines_never_become_entries(comment in "[ -~]{0,40}") {
        let text = write_properties(&[comment.as_str()], std::iter::empty());
        prop_assert!(parse_properties(&text).unwrap().is_empty());
    }
}

#[test]
fn later_duplicate_wins() {
    let map = parse_properties("CONN_HOST=first\nCONN_HOST=second\n").unwrap();
    assert_eq!(map["CONN_HOST"], "second");
}

#[test]
fn malformed_line_is_reported_with_its_number() {
    assert_eq!(
        parse_properties("# header\nA=1\n\nbroken\n"),
        Err(PropertiesError::MissingSeparator(4))
    );
}
