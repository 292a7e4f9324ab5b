/*!
Component kind shared by every subcommand.

Variants:
  modules      (single-process components)
  subworkflows (chains of modules)

Helpers:
  - variants()
  - dir_name() / singular() / title()
  - test_tag()
*/

use serde::Serialize;
use std::fmt;

/// The two kinds of reusable pipeline components.
#[derive(clap::ValueEnum, Serialize, Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    /// Modules (one tool, one process)
    Modules,
    /// Subworkflows (composition of modules)
    Subworkflows,
}

impl ComponentKind {
    /// Return a static slice of all variants (order matters for help display).
    pub const fn variants() -> &'static [ComponentKind] {
        &[ComponentKind::Modules, ComponentKind::Subworkflows]
    }

    /// Directory holding components of this kind (also the CLI command group).
    pub fn dir_name(&self) -> &'static str {
        match self {
            ComponentKind::Modules => "modules",
            ComponentKind::Subworkflows => "subworkflows",
        }
    }

    /// Lowercase singular label used in prompts and messages.
    pub fn singular(&self) -> &'static str {
        match self {
            ComponentKind::Modules => "module",
            ComponentKind::Subworkflows => "subworkflow",
        }
    }

    /// Capitalised singular label used in panel titles.
    pub fn title(&self) -> &'static str {
        match self {
            ComponentKind::Modules => "Module",
            ComponentKind::Subworkflows => "Subworkflow",
        }
    }

    /// nf-test tag selecting the tests of a component.
    pub fn test_tag(&self, name: &str) -> String {
        match self {
            ComponentKind::Modules => name.to_string(),
            ComponentKind::Subworkflows => format!("subworkflows/{name}"),
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/* --------------------------------- Tests ---------------------------------- */

#[cfg(test)]
mod tests {
    use super::ComponentKind;

    #[test]
    fn parses_as_cli_value() {
        use clap::ValueEnum;
        assert_eq!(
            ComponentKind::from_str("MODULES", true),
            Ok(ComponentKind::Modules)
        );
        assert!(ComponentKind::from_str("pipelines", true).is_err());
    }

    #[test]
    fn test_tags_differ_per_kind() {
        assert_eq!(ComponentKind::Modules.test_tag("bwa/mem"), "bwa/mem");
        assert_eq!(
            ComponentKind::Subworkflows.test_tag("bam_sort_stats_samtools"),
            "subworkflows/bam_sort_stats_samtools"
        );
    }

    #[test]
    fn display_output() {
        assert_eq!(ComponentKind::Modules.to_string(), "modules");
        assert_eq!(ComponentKind::Subworkflows.to_string(), "subworkflows");
        assert_eq!(ComponentKind::variants().len(), 2);
    }
}
