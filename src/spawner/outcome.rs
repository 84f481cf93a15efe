use std::process::ExitCode;

use super::notifier::LaunchReport;
use crate::error::SpawnError;

/// How a run ended, as seen by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Launched,
    /// Instance is up but nobody knows its address.
    Unresolved,
    Interrupted,
    Fatal,
}

impl RunOutcome {
    pub fn from_result(result: &Result<LaunchReport, SpawnError>) -> Self {
        match result {
            Ok(report) if report.public_ip.is_some() => RunOutcome::Launched,
            Ok(_) => RunOutcome::Unresolved,
            Err(_) => RunOutcome::Fatal,
        }
    }

    pub const fn code(self) -> u8 {
        match self {
            RunOutcome::Launched | RunOutcome::Interrupted => 0,
            RunOutcome::Fatal => 1,
            RunOutcome::Unresolved => 2,
        }
    }
}

impl From<RunOutcome> for ExitCode {
    fn from(outcome: RunOutcome) -> Self {
        ExitCode::from(outcome.code())
    }
}
