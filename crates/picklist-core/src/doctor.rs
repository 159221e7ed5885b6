use std::fmt;
use std::path::Path;

use crate::config::{PersistFailurePolicy, load_config, resolve_config_path};
use crate::title_store::{JsonTitleStore, TitleStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Pass,
    Fail,
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorCheck {
    pub name: String,
    pub state: CheckState,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorReport {
    pub checks: Vec<DoctorCheck>,
}

impl DoctorReport {
    pub fn has_failures(&self) -> bool {
        self.checks
            .iter()
            .any(|check| check.state == CheckState::Fail)
    }

    pub fn summary(&self) -> String {
        let passed = self
            .checks
            .iter()
            .filter(|check| check.state == CheckState::Pass)
            .count();
        let failed = self.checks.len().saturating_sub(passed);
        format!("{passed} passed, {failed} failed")
    }
}

pub fn run_doctor() -> DoctorReport {
    match resolve_config_path() {
        Ok(config_path) => run_doctor_at(&config_path),
        Err(error) => {
            let mut checks = vec![fail_check("config path resolves", error.to_string())];
            push_skipped_checks(
                &mut checks,
                &[
                    "config file exists",
                    "config parses and validates",
                    "title store readable",
                    "persist failure policy",
                ],
                "config path could not be resolved",
            );
            DoctorReport { checks }
        }
    }
}

pub fn run_doctor_at(config_path: &Path) -> DoctorReport {
    let mut checks = Vec::new();

    if !config_path.exists() {
        checks.push(fail_check(
            "config file exists",
            format!("expected at {}", config_path.display()),
        ));
        push_skipped_checks(
            &mut checks,
            &[
                "config parses and validates",
                "title store readable",
                "persist failure policy",
            ],
            "config file is missing",
        );
        return DoctorReport { checks };
    }

    checks.push(pass_check(
        "config file exists",
        format!("found at {}", config_path.display()),
    ));

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(error) => {
            checks.push(fail_check("config parses and validates", error.to_string()));
            push_skipped_checks(
                &mut checks,
                &["title store readable", "persist failure policy"],
                "config is invalid",
            );
            return DoctorReport { checks };
        }
    };

    checks.push(pass_check(
        "config parses and validates",
        format!("config version {}", config.version),
    ));

    checks.push(check_title_store(&config.store.path));

    let policy = match config.sync.on_persist_failure {
        PersistFailurePolicy::Keep => "keep optimistic value on persist failure",
        PersistFailurePolicy::Revert => "revert local value on persist failure",
    };
    checks.push(pass_check("persist failure policy", policy));

    DoctorReport { checks }
}

fn check_title_store(path: &str) -> DoctorCheck {
    let store_path = Path::new(path);
    if !store_path.exists() {
        return fail_check(
            "title store readable",
            format!("no title store file at {path}"),
        );
    }

    match JsonTitleStore::new(store_path).fetch_titles() {
        Ok(records) => pass_check(
            "title store readable",
            format!("{} title records at {path}", records.len()),
        ),
        Err(error) => fail_check("title store readable", format!("{error:#}")),
    }
}

fn pass_check(name: &str, details: impl Into<String>) -> DoctorCheck {
    DoctorCheck {
        name: name.to_string(),
        state: CheckState::Pass,
        details: details.into(),
    }
}

fn fail_check(name: &str, details: impl Into<String>) -> DoctorCheck {
    DoctorCheck {
        name: name.to_string(),
        state: CheckState::Fail,
        details: details.into(),
    }
}

fn push_skipped_checks(checks: &mut Vec<DoctorCheck>, names: &[&str], reason: &str) {
    checks.extend(names.iter().copied().map(|name| DoctorCheck {
        name: name.to_string(),
        state: CheckState::Fail,
        details: format!("skipped because {reason}"),
    }));
}
