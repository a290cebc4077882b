//! Cross-reference checks over a merged configuration set.
//!
//! Queries name a database, endpoints name a query and optionally a count
//! query. References that point at nothing are reported, never fatal.

use crate::types::{ConfigurationSet, DefinitionKind};
use serde::Serialize;
use std::fmt;

/// A definition field naming another definition that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedReference {
    pub kind: DefinitionKind,
    pub name: String,
    /// Field holding the reference, as spelled in YAML.
    pub field: &'static str,
    pub target_kind: DefinitionKind,
    pub target: String,
}

impl fmt::Display for UnresolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}' references unknown {} '{}' ({})",
            self.kind, self.name, self.target_kind, self.target, self.field
        )
    }
}

impl ConfigurationSet {
    /// All dangling references, queries first, each kind in definition order.
    pub fn unresolved_references(&self) -> Vec<UnresolvedReference> {
        let mut unresolved = Vec::new();

        for (name, query) in self.queries.iter() {
            if !self.databases.contains(&query.database) {
                unresolved.push(UnresolvedReference {
                    kind: DefinitionKind::Query,
                    name: name.to_string(),
                    field: "database",
                    target_kind: DefinitionKind::Database,
                    target: query.database.clone(),
                });
            }
        }

        for (name, endpoint) in self.endpoints.iter() {
            let references = std::iter::once(("query", Some(&endpoint.query)))
                .chain(std::iter::once(("countQuery", endpoint.count_query.as_ref())));
            for (field, target) in references {
                if let Some(target) = target
                    && !self.queries.contains(target)
                {
                    unresolved.push(UnresolvedReference {
                        kind: DefinitionKind::Endpoint,
                        name: name.to_string(),
                        field,
                        target_kind: DefinitionKind::Query,
                        target: target.clone(),
                    });
                }
            }
        }

        unresolved
    }
}
