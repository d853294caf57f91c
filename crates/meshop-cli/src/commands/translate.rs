//! Translate command - convert a legacy values file into a spec

use console::style;
use meshop_core::Values;
use meshop_translate::ReverseTranslator;
use std::path::Path;

use crate::config::{CliConfig, OutputFormat};
use crate::display;
use crate::error::{CliError, Result};

pub fn run(
    values_path: &Path,
    version: Option<&str>,
    output: Option<OutputFormat>,
    out_file: Option<&Path>,
    verbose: bool,
    config: &CliConfig,
) -> Result<()> {
    let version = super::resolve_version(version, config)?;
    let format = output.unwrap_or(config.output);

    let values = Values::from_file(values_path)?;
    tracing::debug!(path = %values_path.display(), version = %version, "values loaded");

    let translator = ReverseTranslator::new(version)?;
    let report = translator.translate_with_report(&values)?;

    if verbose {
        display::print_enablement(&report.areas);
        eprintln!(
            "  {} {} rule(s) applied, {} skipped",
            style("→").blue(),
            report.applied.len(),
            report.skipped.len()
        );
    }

    let rendered = match format {
        OutputFormat::Yaml => report
            .spec
            .to_yaml()
            .map_err(|e| CliError::internal(e.to_string()))?,
        OutputFormat::Json => {
            let mut json = report
                .spec
                .to_json()
                .map_err(|e| CliError::internal(e.to_string()))?;
            json.push('\n');
            json
        }
    };

    match out_file {
        Some(path) => {
            std::fs::write(path, &rendered).map_err(|e| CliError::Io {
                message: format!("{}: {}", path.display(), e),
            })?;
            println!(
                "{} Wrote {} spec to {}",
                style("✓").green().bold(),
                version,
                path.display()
            );
        }
        None => print!("{}", rendered),
    }

    Ok(())
}
