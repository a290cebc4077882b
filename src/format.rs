//! Output formatting for the command-line tool.

use crate::types::{ConfigurationSet, Definition, DefinitionKind, Definitions};
use crate::validate::UnresolvedReference;
use anyhow::Result;
use clap::ValueEnum;
use std::collections::BTreeMap;

/// Output format for printed definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Markdown,
}

/// Render one kind's definitions.
///
/// JSON and YAML output wrap the mapping in its section key, so the YAML form
/// is itself a loadable source document.
pub fn format_definitions<T: Definition>(
    definitions: &Definitions<T>,
    format: OutputFormat,
) -> Result<String> {
    let section = T::KIND.section();
    match format {
        OutputFormat::Json => {
            let document = BTreeMap::from([(section, definitions)]);
            Ok(serde_json::to_string_pretty(&document)?)
        }
        OutputFormat::Yaml => {
            let document = BTreeMap::from([(section, definitions)]);
            Ok(serde_yaml::to_string(&document)?)
        }
        OutputFormat::Markdown => Ok(format_definitions_markdown(definitions)),
    }
}

/// Format definitions as a markdown list with their origins.
pub fn format_definitions_markdown<T: Definition>(definitions: &Definitions<T>) -> String {
    let mut md = String::new();

    md.push_str(&format!(
        "# {} ({})\n\n",
        title(T::KIND),
        definitions.len()
    ));

    for entry in definitions.entries() {
        md.push_str(&format!(
            "- **{}**: {} _from {}_\n",
            entry.name,
            entry.definition.summary(),
            entry.origin
        ));
    }

    md
}

/// Per-kind counts and any unresolved references, as markdown.
pub fn format_check_markdown(set: &ConfigurationSet, unresolved: &[UnresolvedReference]) -> String {
    let mut md = String::from("# Configuration\n\n");

    for kind in DefinitionKind::ALL {
        md.push_str(&format!("- **{}**: {}\n", kind.section(), set.count(kind)));
    }

    if !unresolved.is_empty() {
        md.push_str(&format!("\n## Unresolved references ({})\n", unresolved.len()));
        for reference in unresolved {
            md.push_str(&format!("- {}\n", reference));
        }
    }

    md
}

fn title(kind: DefinitionKind) -> &'static str {
    match kind {
        DefinitionKind::Database => "Databases",
        DefinitionKind::Query => "Queries",
        DefinitionKind::Endpoint => "Endpoints",
    }
}
