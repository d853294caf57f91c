//! Display formatting for CLI output

use console::style;
use meshop_translate::{AreaEnablement, AreaState};

/// Print how each area's `enabled` was decided, to stderr
pub fn print_enablement(areas: &[AreaEnablement]) {
    eprintln!("{}", style("Feature areas").bold());

    for area in areas {
        let state = match area.state {
            AreaState::Unset => style("unset".to_string()).dim(),
            AreaState::Computed { enabled, origin } => {
                let word = if enabled { "enabled" } else { "disabled" };
                let label = format!("{} ({})", word, origin);
                if enabled {
                    style(label).green()
                } else {
                    style(label).red()
                }
            }
        };
        eprintln!("  {:<18} {}", area.area.key(), state);

        for component in &area.components {
            let suffix = if component.defaulted { " [default]" } else { "" };
            eprintln!(
                "    {} {}{}",
                if component.enabled {
                    style("✓").green()
                } else {
                    style("✗").red()
                },
                component.name,
                style(suffix).dim()
            );
        }
    }
}
