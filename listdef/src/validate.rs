use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::Write as _;

use crate::key::KeyMap;
use crate::tree::DefinitionTree;
use crate::{IndexPath, ReuseIdentifier, ViewType};

/// A defect in a list definition. These are programming errors, not runtime conditions.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("section {section}: header view type `{view_type}` has no reuse identifier")]
    HeaderIdentifierMissing {
        section: usize,
        view_type: &'static str,
    },

    #[error("section {section}: header reuse identifier `{identifier}` has no view type")]
    HeaderTypeMissing { section: usize, identifier: String },

    #[error("row {index_path}: empty reuse identifier")]
    EmptyRowIdentifier { index_path: IndexPath },

    #[error("section {section}: empty header reuse identifier")]
    EmptyHeaderIdentifier { section: usize },

    #[error(
        "reuse identifier `{identifier}` maps to both `{first}` and `{second}` (first seen at {at})"
    )]
    ConflictingViewTypes {
        identifier: String,
        first: &'static str,
        second: &'static str,
        at: String,
    },
}

/// Every defect found in one validation pass.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid list definition: {}", join(.0))]
pub struct ConfigErrors(pub Vec<ConfigError>);

impl ConfigErrors {
    pub fn errors(&self) -> &[ConfigError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn join(errors: &[ConfigError]) -> String {
    let mut out = String::new();
    for (i, e) in errors.iter().enumerate() {
        if i > 0 {
            out.push_str("; ");
        }
        let _ = write!(out, "{e}");
    }
    out
}

struct SeenTypes {
    types: KeyMap<ReuseIdentifier, (ViewType, String)>,
}

impl SeenTypes {
    fn new() -> Self {
        Self {
            types: KeyMap::new(),
        }
    }

    fn check(
        &mut self,
        identifier: &ReuseIdentifier,
        view_type: ViewType,
        at: impl FnOnce() -> String,
        errors: &mut Vec<ConfigError>,
    ) {
        match self.types.get(identifier) {
            Some((first, first_at)) if *first != view_type => {
                errors.push(ConfigError::ConflictingViewTypes {
                    identifier: identifier.as_str().to_string(),
                    first: first.name(),
                    second: view_type.name(),
                    at: first_at.clone(),
                });
            }
            Some(_) => {}
            None => {
                self.types.insert(identifier.clone(), (view_type, at()));
            }
        }
    }
}

/// Checks `tree` for configuration defects, collecting all of them.
///
/// Checked: header type/identifier pairing, empty identifiers, and one identifier being used
/// for two different view types (rows and headers are separate namespaces).
pub fn validate<V>(tree: &DefinitionTree<V>) -> Result<(), ConfigErrors> {
    let mut errors = Vec::new();
    let mut row_types = SeenTypes::new();
    let mut header_types = SeenTypes::new();

    for (section_index, (section_key, section)) in tree.sections().enumerate() {
        match (section.header_view_type(), section.header_identifier()) {
            (Some(view_type), None) => errors.push(ConfigError::HeaderIdentifierMissing {
                section: section_index,
                view_type: view_type.name(),
            }),
            (None, Some(identifier)) => errors.push(ConfigError::HeaderTypeMissing {
                section: section_index,
                identifier: identifier.as_str().to_string(),
            }),
            (Some(_), Some(identifier)) if identifier.is_empty() => {
                errors.push(ConfigError::EmptyHeaderIdentifier {
                    section: section_index,
                })
            }
            (Some(view_type), Some(identifier)) => header_types.check(
                identifier,
                view_type,
                || alloc::format!("section {section_index}"),
                &mut errors,
            ),
            (None, None) => {}
        }

        for (row_index, (_, row)) in tree.rows_in(section_key).enumerate() {
            let index_path = IndexPath::new(section_index, row_index);
            let identifier = row.reuse_identifier();
            if identifier.is_empty() {
                errors.push(ConfigError::EmptyRowIdentifier { index_path });
                continue;
            }
            row_types.check(
                &identifier,
                row.view_type(),
                || alloc::format!("row {index_path}"),
                &mut errors,
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigErrors(errors))
    }
}

/// Aborts on any configuration defect in `tree`.
///
/// # Panics
///
/// Panics listing every defect found.
pub(crate) fn enforce<V>(tree: &DefinitionTree<V>) {
    if let Err(errors) = validate(tree) {
        lwarn!(count = errors.len(), "list definition failed validation");
        panic!("{errors}");
    }
}
