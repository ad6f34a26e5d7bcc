use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use paperwork_core::error::CoreError;
use paperwork_core::fields::{FieldKind, FieldSpec};
use paperwork_core::placeholder::TokenStyle;
use paperwork_core::reference::ReferenceScheme;
use paperwork_core::substitute::Strategy;

/// Field that receives a generated reference number unless the user
/// supplies one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceField {
    pub field: String,
    pub scheme: ReferenceScheme,
}

/// One document template and how to fill it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSpec {
    pub id: String,
    /// Used in output file names.
    pub title: String,
    /// Template file, relative to the configured template directory unless absolute.
    pub file: PathBuf,
    pub strategy: Strategy,
    pub token_style: TokenStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_placeholder: Option<String>,
    /// Field whose value names the client in the output file name.
    pub client_field: String,
    pub fields: Vec<FieldSpec>,
}

impl TemplateSpec {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check that every field renders to a valid token and that the
    /// reference and client fields exist.
    pub fn validate(&self) -> Result<(), CoreError> {
        for field in &self.fields {
            field.token_style.unwrap_or(self.token_style).token(&field.name)?;
            if let FieldKind::Total { of } = &field.kind {
                if let Some(missing) = of.iter().find(|name| self.field(name).is_none()) {
                    return Err(CoreError::InvalidField {
                        field: field.name.clone(),
                        reason: format!("total refers to unknown field '{missing}'"),
                    });
                }
            }
        }
        for name in self
            .reference
            .as_ref()
            .map(|r| r.field.as_str())
            .into_iter()
            .chain([self.client_field.as_str()])
        {
            if self.field(name).is_none() {
                return Err(CoreError::InvalidField {
                    field: name.to_string(),
                    reason: format!("not declared by template '{}'", self.id),
                });
            }
        }
        if let Some(key) = &self.image_placeholder {
            paperwork_core::placeholder::Placeholder::new(key.as_str())?;
        }
        Ok(())
    }
}

fn money(name: &str) -> FieldSpec {
    FieldSpec::new(name, FieldKind::Money)
}

fn percent(name: &str) -> FieldSpec {
    FieldSpec::new(name, FieldKind::Percent)
}

const SERVICE_COSTS: [&str; 9] = [
    "Company Formation Cost",
    "Desk-Space Office Rental Cost",
    "Businessman Visa Cost",
    "Miscellaneous/Admin Charges",
    "Power of Attorney Cost",
    "Estimation Charges (Per Head)",
    "Labour Authority Registration Cost",
    "Social Insurance Registration Cost",
    "Free Advice/Guidance Cost",
];

/// VAT registration and filing engagement letter.
pub fn sat() -> TemplateSpec {
    TemplateSpec {
        id: "sat".to_string(),
        title: "SAT".to_string(),
        file: PathBuf::from("SAMPLE VAT registration and VAT filling -SME package.docx"),
        strategy: Strategy::RunLocal,
        token_style: TokenStyle::Tight,
        reference: Some(ReferenceField {
            field: "Reference Number".to_string(),
            scheme: ReferenceScheme::Business {
                prefix: "BKR".to_string(),
            },
        }),
        image_placeholder: Some("<<Signature Image>>".to_string()),
        client_field: "Client Name".to_string(),
        fields: vec![
            FieldSpec::new("Date", FieldKind::Date),
            FieldSpec::text("Reference Number"),
            FieldSpec::text("Atten"),
            FieldSpec::text("Email"),
            FieldSpec::text("Client Name").required(),
            FieldSpec::text("Commercial Registration Number"),
            FieldSpec::text("Service Provider Name"),
            FieldSpec::text("Service Provider CR Number"),
            FieldSpec::text("Company Name"),
            FieldSpec::text("VAT Registration Fee"),
            FieldSpec::text("Consultancy Fee"),
            FieldSpec::text("Authorized Person Name"),
        ],
    }
}

/// Company formation service agreement. Mostly spaced tokens, but the
/// business-activity cells use tight `<<TextN>>` tokens.
pub fn service_agreement() -> TemplateSpec {
    let mut fields = vec![
        FieldSpec::new("Date", FieldKind::Date),
        FieldSpec::text("Reference Number"),
        FieldSpec::text("Client Name").required(),
        percent("Bahraini Ownership"),
        percent("GCC Nationals Ownership"),
        percent("American Nationals Ownership"),
        percent("Foreign Ownership"),
    ];
    fields.extend((1..=6).map(|n| FieldSpec::text(format!("Text{n}")).tight()));
    fields.extend(SERVICE_COSTS.iter().map(|name| money(name)));
    fields.push(FieldSpec::new(
        "Total Cost",
        FieldKind::Total {
            of: SERVICE_COSTS.iter().map(|s| s.to_string()).collect(),
        },
    ));
    fields.push(FieldSpec::text("Signatory Name"));
    fields.push(FieldSpec::text("Passport Number"));

    TemplateSpec {
        id: "service-agreement".to_string(),
        title: "Service Agreement".to_string(),
        file: PathBuf::from("SAMPLE Service Agreement -Company formation -Bahrain - Filled.docx"),
        strategy: Strategy::ParagraphJoined,
        token_style: TokenStyle::Spaced,
        reference: Some(ReferenceField {
            field: "Reference Number".to_string(),
            scheme: ReferenceScheme::Business {
                prefix: "BKR".to_string(),
            },
        }),
        image_placeholder: Some("<< Signatory Image >>".to_string()),
        client_field: "Client Name".to_string(),
        fields,
    }
}

/// Invoice numbered by timestamp rather than by the serial counter.
pub fn invoice() -> TemplateSpec {
    TemplateSpec {
        id: "invoice".to_string(),
        title: "Invoice".to_string(),
        file: PathBuf::from("invoice.docx"),
        strategy: Strategy::ParagraphJoined,
        token_style: TokenStyle::Tight,
        reference: Some(ReferenceField {
            field: "Invoice Number".to_string(),
            scheme: ReferenceScheme::Unique,
        }),
        image_placeholder: None,
        client_field: "Client Name".to_string(),
        fields: vec![
            FieldSpec::new("Date", FieldKind::Date),
            FieldSpec::text("Invoice Number"),
            FieldSpec::text("Client Name").required(),
            FieldSpec::text("Description"),
            money("Amount"),
            money("VAT"),
            FieldSpec::new(
                "Total",
                FieldKind::Total {
                    of: vec!["Amount".to_string(), "VAT".to_string()],
                },
            ),
        ],
    }
}

pub fn builtin_templates() -> Vec<TemplateSpec> {
    vec![sat(), service_agreement(), invoice()]
}
