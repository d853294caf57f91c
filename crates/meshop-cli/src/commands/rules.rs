//! Rules command - print the mapping table of one version

use console::style;
use meshop_core::FeatureArea;
use meshop_translate::RuleSet;

use crate::config::CliConfig;
use crate::error::Result;

pub fn run(version: Option<&str>, config: &CliConfig) -> Result<()> {
    let version = super::resolve_version(version, config)?;
    let rules = RuleSet::for_version(version)?;

    println!("{} {}", style("Mapping rules for").bold(), style(version).cyan().bold());
    println!();

    for rule in rules.rules() {
        println!(
            "  {} {} {} {}",
            rule.source,
            style("→").dim(),
            rule.destination,
            style(format!("({})", rule.transform)).dim()
        );
    }

    println!();
    println!("{}", style("Components").bold());
    for area in FeatureArea::ALL {
        let components: Vec<String> = rules
            .components_in(area)
            .map(|slot| match slot.default_enabled {
                Some(default) => format!("{} (default {})", slot.name, default),
                None => slot.name.to_string(),
            })
            .collect();

        let overrides = rules
            .area_override(area)
            .map(|path| format!(" {}", style(format!("[override: {}]", path)).yellow()))
            .unwrap_or_default();

        println!("  {}: {}{}", area, components.join(", "), overrides);
    }

    Ok(())
}
