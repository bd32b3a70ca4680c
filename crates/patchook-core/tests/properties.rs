use patchook_core::{build_lines, char_len, pack, Limits, LineOptions, PatchInfo};
use proptest::prelude::*;

fn raw_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("   ".to_string()),
        "[a-zA-Z ]{1,80}",
        "[a-zA-Z ]{1,30}".prop_map(|text| format!("\t\t{text}")),
        "[a-zA-Z ]{1,30}".prop_map(|text| format!("\t\t\t\t{text}")),
        "[a-zA-Z ]{1,20}".prop_map(|text| format!("**{text}**")),
    ]
}

fn packed_line() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z ]{1,200}".prop_map(|text| format!("{text}\n")),
        "[A-Za-z]{1,40}".prop_map(|text| format!("**{text}**\n")),
        (1usize..3000).prop_map(|len| "w".repeat(len)),
    ]
}

proptest! {
    #[test]
    fn test_no_leading_or_doubled_blank_lines(lines in prop::collection::vec(raw_line(), 0..60)) {
        let text = lines.join("\n");
        let built = build_lines(&text, &LineOptions::default());

        if let Some(first) = built.first() {
            prop_assert_ne!(first.as_str(), "\n");
        }
        for pair in built.windows(2) {
            let doubled = pair[0] == "\n" && pair[1] == "\n";
            prop_assert!(!doubled, "consecutive blanks in {:?}", built);
        }
    }

    #[test]
    fn test_packed_payload_respects_limits(lines in prop::collection::vec(packed_line(), 0..200)) {
        let limits = Limits::default();
        let payload = pack(&lines, &PatchInfo::default(), &limits);

        prop_assert!(char_len(&payload.description) <= limits.description);
        prop_assert!(payload.fields.len() <= limits.max_fields);
        for field in &payload.fields {
            prop_assert!(char_len(&field.value) <= limits.field_value);
            prop_assert!(char_len(&field.name) <= limits.field_name);
        }
        prop_assert!(payload.total_characters() <= limits.total);
    }

    #[test]
    fn test_packing_preserves_order(lines in prop::collection::vec("[a-z]{1,20}\n", 0..50)) {
        let payload = pack(&lines, &PatchInfo::default(), &Limits::default());
        let mut joined = payload.description.clone();
        for field in &payload.fields {
            joined.push_str(&field.value);
        }
        prop_assert_eq!(joined, lines.concat());
    }
}
