use paperwork_core::error::CoreError;
use paperwork_core::placeholder::{Placeholder, PlaceholderMap, TokenStyle};

#[test]
fn token_styles_render_fixed_spelling() {
    assert_eq!(TokenStyle::Tight.token("Client Name").unwrap().as_str(), "<<Client Name>>");
    assert_eq!(
        TokenStyle::Spaced.token("Client Name").unwrap().as_str(),
        "<< Client Name >>"
    );
}

#[test]
fn placeholder_name_strips_delimiters_and_padding() {
    let p = Placeholder::new("<< Total Cost >>").unwrap();
    assert_eq!(p.name(), "Total Cost");
}

#[test]
fn malformed_tokens_are_rejected() {
    for raw in ["Name", "<<Name", "Name>>", "<<>>", "<<   >>", "<<Na\nme>>", "<<a<<b>>"] {
        let err = Placeholder::new(raw).unwrap_err();
        assert!(matches!(err, CoreError::InvalidPlaceholder(_)), "{raw}");
    }
}

#[test]
fn insert_replaces_existing_value_in_place() {
    let mut map = PlaceholderMap::new();
    map.insert_raw("<<A>>", "1").unwrap();
    map.insert_raw("<<B>>", "2").unwrap();
    map.insert_raw("<<A>>", "3").unwrap();

    let entries: Vec<_> = map.iter().map(|(k, v)| (k.as_str(), v)).collect();
    assert_eq!(entries, vec![("<<A>>", "3"), ("<<B>>", "2")]);
}

#[test]
fn replace_in_returns_none_without_match() {
    let mut map = PlaceholderMap::new();
    map.insert_raw("<<A>>", "x").unwrap();

    assert_eq!(map.replace_in("no tokens here"), None);
    assert_eq!(map.replace_in("<<B>> only"), None);
}

#[test]
fn replace_in_handles_extra_leading_bracket() {
    let mut map = PlaceholderMap::new();
    map.insert_raw("<<A>>", "x").unwrap();

    assert_eq!(map.replace_in("<<<A>>>").as_deref(), Some("<x>"));
}

#[test]
fn placeholder_map_deserializes_and_validates_keys() {
    let ok: Result<Placeholder, _> = serde_json::from_str("\"<<Email>>\"");
    assert!(ok.is_ok());

    let bad: Result<Placeholder, _> = serde_json::from_str("\"Email\"");
    assert!(bad.is_err());
}
