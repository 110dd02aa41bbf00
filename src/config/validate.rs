//! Loadout linting: hard errors plus warnings about configurations that are
//! legal but will not behave the way they look.

use std::fmt;

use serde::Serialize;

use crate::config::chain::ChainMode;
use crate::config::loadout::{config_errors, Loadout};
use crate::data::catalog::Catalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }
}

pub fn validate_loadout(loadout: &Loadout, catalog: &Catalog) -> ValidationReport {
    let mut report = ValidationReport::default();

    if catalog.job(&loadout.server, &loadout.job).is_none() {
        report.push(
            ValidationSeverity::Error,
            "loadout",
            format!(
                "catalog has no job '{}' on server '{}'",
                loadout.job, loadout.server
            ),
        );
    }

    for err in config_errors(loadout, catalog) {
        report.push(ValidationSeverity::Error, "loadout", err.to_string());
    }

    for (index, chain) in loadout.chains.iter().enumerate() {
        let context = format!("chains[{index}]");
        for req in chain.requirements() {
            let Some(ability) = loadout.ability_in(catalog, req.slot) else {
                continue;
            };
            if req.count > ability.max_charges {
                report.push(
                    ValidationSeverity::Warning,
                    context.clone(),
                    format!(
                        "needs {} casts of slot {} but '{}' holds {} charges; the chain will never fire",
                        req.count, req.slot, ability.id, ability.max_charges
                    ),
                );
            }
        }
        if chain.mode == ChainMode::Manual {
            report.push(
                ValidationSeverity::Info,
                context,
                "manual chain only fires on its trigger",
            );
        }
    }

    for equip in &loadout.equipped {
        if !equip.enabled && loadout.automatic_chain_of(equip.slot).is_none() {
            report.push(
                ValidationSeverity::Info,
                format!("equipped[slot {}]", equip.slot),
                format!("'{}' is disabled and in no chain; it never fires", equip.ability),
            );
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::chain::{Chain, ChainMember};
    use crate::config::loadout::EquippedAbility;
    use crate::data::ability::{Ability, AbilityId, AbilityLevel};

    fn catalog() -> Catalog {
        Catalog::single_job(
            "s",
            "j",
            vec![Ability {
                id: AbilityId::from("a"),
                name: String::new(),
                cooldown: 3.0,
                max_charges: 1,
                casting: false,
                levels: vec![AbilityLevel::default()],
            }],
        )
    }

    #[test]
    fn overdrawn_chain_is_a_warning_not_an_error() {
        let mut loadout = Loadout::new("s", "j");
        loadout.equipped = vec![EquippedAbility::new(0, "a")];
        loadout.chains = vec![Chain::automatic(vec![ChainMember::new(0, 3)])];
        let report = validate_loadout(&loadout, &catalog());
        assert!(!report.has_errors());
        assert_eq!(report.count(ValidationSeverity::Warning), 1);
    }

    #[test]
    fn errors_are_collected_not_short_circuited() {
        let mut loadout = Loadout::new("s", "j");
        loadout.cooldown_reduction = 99.0;
        loadout.equipped = vec![EquippedAbility::new(0, "missing")];
        let report = validate_loadout(&loadout, &catalog());
        assert_eq!(report.count(ValidationSeverity::Error), 2);
    }

    #[test]
    fn unknown_job_is_reported() {
        let loadout = Loadout::new("s", "nobody");
        let report = validate_loadout(&loadout, &catalog());
        assert!(report.has_errors());
        assert!(report.diagnostics[0].message.contains("nobody"));
    }

    #[test]
    fn disabled_standalone_slot_is_noted() {
        let mut loadout = Loadout::new("s", "j");
        loadout.equipped = vec![EquippedAbility {
            enabled: false,
            ..EquippedAbility::new(0, "a")
        }];
        let report = validate_loadout(&loadout, &catalog());
        assert_eq!(report.count(ValidationSeverity::Info), 1);
    }
}
