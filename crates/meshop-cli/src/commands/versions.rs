//! Versions command - list registered mapping tables

use console::style;
use meshop_translate::{RuleSet, supported_versions};

use crate::config::CliConfig;
use crate::error::Result;

pub fn run(config: &CliConfig) -> Result<()> {
    let default = super::resolve_version(None, config)?;

    println!("{}", style("Supported versions").bold());
    for version in supported_versions() {
        let rules = RuleSet::for_version(version)?;
        let marker = if version == default {
            style("*").green().bold().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "{} {:<6} {} rules, {} components",
            marker,
            version,
            rules.len(),
            rules.components().len()
        );
    }

    Ok(())
}
