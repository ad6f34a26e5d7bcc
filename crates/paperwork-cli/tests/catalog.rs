use paperwork_cli::catalog::{builtin_templates, sat, service_agreement};
use paperwork_core::placeholder::TokenStyle;
use paperwork_core::substitute::Strategy;

#[test]
fn builtin_templates_are_valid() {
    for spec in builtin_templates() {
        spec.validate()
            .unwrap_or_else(|e| panic!("{} is invalid: {e}", spec.id));
    }
}

#[test]
fn builtin_template_ids_are_unique() {
    let specs = builtin_templates();
    let mut ids: Vec<&str> = specs.iter().map(|s| s.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), specs.len());
}

#[test]
fn sat_uses_run_local_with_tight_tokens() {
    let spec = sat();
    assert_eq!(spec.strategy, Strategy::RunLocal);
    assert_eq!(spec.token_style, TokenStyle::Tight);
    assert_eq!(spec.image_placeholder.as_deref(), Some("<<Signature Image>>"));
}

#[test]
fn service_agreement_mixes_token_styles() {
    let spec = service_agreement();
    assert_eq!(spec.strategy, Strategy::ParagraphJoined);

    let client = spec.field("Client Name").unwrap();
    let text1 = spec.field("Text1").unwrap();
    assert_eq!(
        client.token_style.unwrap_or(spec.token_style).token(&client.name).unwrap().as_str(),
        "<< Client Name >>"
    );
    assert_eq!(
        text1.token_style.unwrap_or(spec.token_style).token(&text1.name).unwrap().as_str(),
        "<<Text1>>"
    );
}

#[test]
fn template_spec_survives_json() {
    let spec = service_agreement();
    let json = serde_json::to_string(&spec).unwrap();
    let back: paperwork_cli::catalog::TemplateSpec = serde_json::from_str(&json).unwrap();
    assert_eq!(back, spec);
}

#[test]
fn missing_client_field_is_rejected() {
    let mut spec = sat();
    spec.client_field = "Customer".to_string();
    let err = spec.validate().unwrap_err();
    assert!(err.to_string().contains("Customer"));
}
