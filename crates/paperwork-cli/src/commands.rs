use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use jiff::civil::{Date, DateTime};
use tracing::info;

use paperwork_core::fields::build_placeholder_map;
use paperwork_core::inject::ImageSize;
use paperwork_core::reference::{format_business_reference, format_unique_reference};
use paperwork_core::serial::SerialAllocator;
use paperwork_export::pipeline::{GenerationRequest, ImageRequest, PdfOutcome, generate};

use crate::catalog::TemplateSpec;
use crate::config::{PaperworkConfig, save_config};

#[derive(Debug, Clone, Default, clap::Args)]
pub struct GenerateArgs {
    /// Template id, see `paperwork templates`
    pub template: String,

    /// Field value, e.g. --set "Client Name=Acme W.L.L."
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    pub sets: Vec<(String, String)>,

    /// JSON object of field values; --set entries take precedence
    #[arg(long, value_name = "FILE")]
    pub values: Option<PathBuf>,

    /// Document date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub date: Option<Date>,

    /// PNG or JPEG to place at the template's image placeholder
    #[arg(long, value_name = "FILE")]
    pub image: Option<PathBuf>,

    /// Keep the DOCX only
    #[arg(long)]
    pub no_pdf: bool,

    /// Output directory, overrides the configured one
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}

/// Parse `FIELD=VALUE`. Only the first `=` separates; the value may be empty.
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (field, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got {s:?}"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in {s:?}"));
    }
    Ok((field.to_string(), value.to_string()))
}

/// Merge values from an optional JSON file with `--set` overrides.
pub fn collect_values(
    values_file: Option<&Path>,
    sets: &[(String, String)],
) -> eyre::Result<BTreeMap<String, String>> {
    let mut values = BTreeMap::new();

    if let Some(path) = values_file {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("failed to read {}: {e}", path.display()))?;
        let json: serde_json::Value = serde_json::from_str(&contents)?;
        let obj = json
            .as_object()
            .ok_or_else(|| eyre::eyre!("{} must contain a JSON object", path.display()))?;
        for (key, value) in obj {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Null => continue,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(eyre::eyre!(
                        "field '{key}' in {} must be a string or number, got {other}",
                        path.display()
                    ));
                }
            };
            values.insert(key.clone(), value);
        }
    }

    for (field, value) in sets {
        values.insert(field.clone(), value.clone());
    }
    Ok(values)
}

/// Fill in the template's reference field unless the user supplied one.
fn issue_reference(
    config: &PaperworkConfig,
    spec: &TemplateSpec,
    values: &mut BTreeMap<String, String>,
    now: DateTime,
) -> eyre::Result<()> {
    let Some(reference) = &spec.reference else {
        return Ok(());
    };
    if values
        .get(&reference.field)
        .is_some_and(|v| !v.trim().is_empty())
    {
        return Ok(());
    }

    let allocator = if reference.scheme.needs_allocator() {
        Some(SerialAllocator::open(&config.serial_path)?)
    } else {
        None
    };
    let issued = reference.scheme.issue(allocator.as_ref(), now)?;
    info!(field = %reference.field, reference = %issued, "reference issued");
    values.insert(reference.field.clone(), issued);
    Ok(())
}

pub fn build_request(
    config: &PaperworkConfig,
    args: &GenerateArgs,
    now: DateTime,
) -> eyre::Result<GenerationRequest> {
    let spec = config.template(&args.template)?;
    let mut values = collect_values(args.values.as_deref(), &args.sets)?;
    let date = args.date.unwrap_or(now.date());

    let client_name = values
        .get(&spec.client_field)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| eyre::eyre!("'{}' is required", spec.client_field))?;

    let image = match &args.image {
        None => None,
        Some(path) => {
            let placeholder = spec.image_placeholder.clone().ok_or_else(|| {
                eyre::eyre!("template '{}' has no image placeholder", spec.id)
            })?;
            let bytes = std::fs::read(path)
                .map_err(|e| eyre::eyre!("failed to read image {}: {e}", path.display()))?;
            Some(ImageRequest {
                placeholder,
                bytes,
                size: ImageSize::signature(),
            })
        }
    };

    // Validate input before consuming a serial number.
    build_placeholder_map(&spec.fields, spec.token_style, &values, date)?;
    issue_reference(config, spec, &mut values, now)?;
    let placeholders = build_placeholder_map(&spec.fields, spec.token_style, &values, date)?;

    Ok(GenerationRequest {
        template_path: config.template_path(spec),
        title: spec.title.clone(),
        client_name,
        date,
        placeholders,
        strategy: spec.strategy,
        image,
        out_dir: args.out_dir.clone().unwrap_or_else(|| config.output_dir.clone()),
        converter: if args.no_pdf {
            None
        } else {
            config.converter.clone()
        },
    })
}

pub fn run_generate(config: &PaperworkConfig, args: &GenerateArgs) -> eyre::Result<()> {
    let now = jiff::Zoned::now().datetime();
    let request = build_request(config, args, now)?;
    let report = generate(&request)?;

    println!("{}", report.document_path.display());
    match report.pdf {
        PdfOutcome::Skipped => Ok(()),
        PdfOutcome::Converted(path) => {
            println!("{}", path.display());
            Ok(())
        }
        PdfOutcome::Failed(e) => Err(eyre::eyre!(
            "PDF conversion failed: {e}. The DOCX was kept at {}",
            report.document_path.display()
        )),
    }
}

pub fn list_templates(config: &PaperworkConfig) {
    for spec in &config.templates {
        let path = config.template_path(spec);
        let status = if path.is_file() { "" } else { "  (missing)" };
        println!("{:<20} {}{status}", spec.id, spec.title);
        println!("{:<20} {}", "", path.display());
    }
}

pub fn next_reference(config: &PaperworkConfig, prefix: &str) -> eyre::Result<String> {
    let allocator = SerialAllocator::open(&config.serial_path)?;
    let serial = allocator.allocate_next()?;
    Ok(format_business_reference(
        prefix,
        serial,
        jiff::Zoned::now().datetime(),
    ))
}

pub fn unique_reference() -> String {
    format_unique_reference(jiff::Zoned::now().datetime())
}

pub fn serial_init(config: &PaperworkConfig, base: u64) -> eyre::Result<()> {
    let allocator = SerialAllocator::init(&config.serial_path, base)?;
    println!("initialised {} at {base}", allocator.path().display());
    Ok(())
}

pub fn serial_show(config: &PaperworkConfig) -> eyre::Result<()> {
    let allocator = SerialAllocator::open(&config.serial_path)?;
    let state = allocator.peek()?;
    println!("file:   {}", allocator.path().display());
    println!("state:  {state}");
    match state.current() {
        Some(next) => println!("next:   {next}"),
        None => println!("next:   (exhausted)"),
    }
    Ok(())
}

/// Write `config` to `path`, refusing to clobber an existing file unless `force`.
pub fn config_init(path: &Path, config: &PaperworkConfig, force: bool) -> eyre::Result<()> {
    if path.exists() && !force {
        return Err(eyre::eyre!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ));
    }
    save_config(path, config)?;
    println!("{}", path.display());
    Ok(())
}

pub fn config_show(config: &PaperworkConfig) -> eyre::Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
