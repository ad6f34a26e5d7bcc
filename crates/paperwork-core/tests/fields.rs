use std::collections::BTreeMap;

use jiff::civil::date;
use paperwork_core::error::CoreError;
use paperwork_core::fields::{FieldKind, FieldSpec, build_placeholder_map, format_date};
use paperwork_core::placeholder::TokenStyle;

fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn agreement_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("Date", FieldKind::Date),
        FieldSpec::text("Client Name").required(),
        FieldSpec::new("Bahraini Ownership", FieldKind::Percent),
        FieldSpec::text("Text1").tight(),
        FieldSpec::new("Company Formation Cost", FieldKind::Money),
        FieldSpec::new("Businessman Visa Cost", FieldKind::Money),
        FieldSpec::new(
            "Total Cost",
            FieldKind::Total {
                of: vec![
                    "Company Formation Cost".to_string(),
                    "Businessman Visa Cost".to_string(),
                ],
            },
        ),
    ]
}

#[test]
fn renders_each_kind_with_template_token_style() {
    let map = build_placeholder_map(
        &agreement_fields(),
        TokenStyle::Spaced,
        &values(&[
            ("Client Name", "Acme W.L.L."),
            ("Bahraini Ownership", "51"),
            ("Text1", "4711"),
            ("Company Formation Cost", "350"),
            ("Businessman Visa Cost", "120.5"),
        ]),
        date(2024, 7, 3),
    )
    .unwrap();

    assert_eq!(map.get("<< Date >>"), Some("03-07-2024"));
    assert_eq!(map.get("<< Client Name >>"), Some("Acme W.L.L."));
    assert_eq!(map.get("<< Bahraini Ownership >>"), Some("51%"));
    assert_eq!(map.get("<<Text1>>"), Some("4711"));
    assert_eq!(map.get("<< Company Formation Cost >>"), Some("350.00"));
    assert_eq!(map.get("<< Businessman Visa Cost >>"), Some("120.50"));
    assert_eq!(map.get("<< Total Cost >>"), Some("470.50"));
}

#[test]
fn blank_optional_fields_render_empty_forms() {
    let map = build_placeholder_map(
        &agreement_fields(),
        TokenStyle::Spaced,
        &values(&[("Client Name", "Acme"), ("Date", "2023-01-09")]),
        date(2024, 7, 3),
    )
    .unwrap();

    assert_eq!(map.get("<< Date >>"), Some("09-01-2023"));
    assert_eq!(map.get("<< Bahraini Ownership >>"), Some("0%"));
    assert_eq!(map.get("<<Text1>>"), Some(""));
    assert_eq!(map.get("<< Total Cost >>"), Some("0.00"));
}

#[test]
fn rejects_bad_input() {
    let cases = [
        values(&[]),
        values(&[("Client Name", "Acme"), ("Bahraini Ownership", "101")]),
        values(&[("Client Name", "Acme"), ("Company Formation Cost", "-5")]),
        values(&[("Client Name", "Acme"), ("Date", "03/07/2024")]),
        values(&[("Client Name", "Acme"), ("Nickname", "x")]),
    ];
    for input in cases {
        let err = build_placeholder_map(
            &agreement_fields(),
            TokenStyle::Spaced,
            &input,
            date(2024, 7, 3),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidField { .. }), "{input:?}");
    }
}

#[test]
fn format_date_is_day_month_year() {
    assert_eq!(format_date(date(2024, 12, 1)), "01-12-2024");
}
