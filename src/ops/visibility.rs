// src/ops/visibility.rs

//! Showing and hiding suspension components and markers.

use std::fmt;
use std::path::PathBuf;

use tracing::warn;

use crate::errors::{Result, SwBridgeError};
use crate::exec::{Invocation, RunContext};
use crate::types::{MarkerTarget, OperationKind, SuspensionTarget, Visibility};

use super::profiles::Profile;
use super::{Operation, OperationFuture};

/// One `vis` or `marker vis` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibilityCommand {
    Suspension {
        target: SuspensionTarget,
        visibility: Visibility,
        filter: Option<String>,
    },
    Marker {
        target: MarkerTarget,
        visibility: Visibility,
        filter: Option<String>,
    },
}

impl VisibilityCommand {
    pub fn validate(&self) -> Result<()> {
        let missing_filter = match self {
            VisibilityCommand::Suspension { target, filter, .. } => {
                target.requires_filter() && filter_is_empty(filter)
            }
            VisibilityCommand::Marker { target, filter, .. } => {
                *target == MarkerTarget::Name && filter_is_empty(filter)
            }
        };
        if missing_filter {
            return Err(SwBridgeError::InvalidInput(format!(
                "'{self}' needs filter text"
            )));
        }
        Ok(())
    }

    pub fn invocation(&self, executable: impl Into<PathBuf>) -> Invocation {
        let (inv, filter) = match self {
            VisibilityCommand::Suspension {
                target,
                visibility,
                filter,
            } => (
                Invocation::new(executable)
                    .arg("vis")
                    .arg(target.as_arg())
                    .arg(visibility.as_arg()),
                filter,
            ),
            VisibilityCommand::Marker {
                target,
                visibility,
                filter,
            } => (
                Invocation::new(executable)
                    .arg("marker")
                    .arg("vis")
                    .arg(target.as_arg())
                    .arg(visibility.as_arg()),
                filter,
            ),
        };

        match filter.as_deref().map(str::trim) {
            Some(f) if !f.is_empty() => inv.arg(f),
            _ => inv,
        }
    }
}

fn filter_is_empty(filter: &Option<String>) -> bool {
    filter.as_deref().is_none_or(|f| f.trim().is_empty())
}

impl fmt::Display for VisibilityCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisibilityCommand::Suspension {
                target, visibility, ..
            } => write!(f, "vis {} {}", target.as_arg(), visibility.as_arg()),
            VisibilityCommand::Marker {
                target, visibility, ..
            } => write!(f, "marker vis {} {}", target.as_arg(), visibility.as_arg()),
        }
    }
}

/// A single visibility change.
#[derive(Debug, Clone)]
pub struct SetVisibility {
    pub executable: PathBuf,
    pub command: VisibilityCommand,
}

impl Operation for SetVisibility {
    fn kind(&self) -> OperationKind {
        OperationKind::Visualization
    }

    fn run<'a>(&'a self, ctx: &'a mut RunContext) -> OperationFuture<'a> {
        Box::pin(async move {
            self.command.validate()?;
            let inv = self.command.invocation(&self.executable);
            Ok(ctx.run_process(&inv).await?)
        })
    }

    fn plan(&self) -> Result<Vec<Invocation>> {
        self.command.validate()?;
        Ok(vec![self.command.invocation(&self.executable)])
    }
}

/// Apply every entry of a saved profile, one command per entry.
///
/// Progress counts finished commands. A failing command is logged and the
/// rest still run; the operation fails if any command failed.
#[derive(Debug, Clone)]
pub struct ApplyProfile {
    pub executable: PathBuf,
    pub profile: Profile,
}

impl Operation for ApplyProfile {
    fn kind(&self) -> OperationKind {
        OperationKind::ProfileApplication
    }

    fn run<'a>(&'a self, ctx: &'a mut RunContext) -> OperationFuture<'a> {
        Box::pin(async move {
            let commands = self.profile.commands()?;
            ctx.log(format!("Applying profile '{}'", self.profile.name));
            ctx.set_total(commands.len() as u64);

            let mut failed = 0usize;
            for command in &commands {
                if ctx.is_aborted() {
                    return Ok(-1);
                }
                let code = ctx.run_process(&command.invocation(&self.executable)).await?;
                if ctx.is_aborted() {
                    return Ok(-1);
                }
                if code != 0 {
                    failed += 1;
                    warn!(%command, exit_code = code, "profile entry failed");
                    ctx.log(format!("'{command}' failed with exit code {code}"));
                }
                ctx.advance();
            }

            if failed > 0 {
                return Err(SwBridgeError::Other(anyhow::anyhow!(
                    "{failed} of {} visibility commands failed",
                    commands.len()
                )));
            }
            Ok(0)
        })
    }

    fn plan(&self) -> Result<Vec<Invocation>> {
        Ok(self
            .profile
            .commands()?
            .iter()
            .map(|c| c.invocation(&self.executable))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suspension_command_with_filter() {
        let cmd = VisibilityCommand::Suspension {
            target: SuspensionTarget::Substring,
            visibility: Visibility::Hide,
            filter: Some("CHAS_".into()),
        };
        assert!(cmd.validate().is_ok());
        assert_eq!(
            cmd.invocation("tool").to_string(),
            "tool vis substring hide CHAS_"
        );
    }

    #[test]
    fn marker_command_without_filter() {
        let cmd = VisibilityCommand::Marker {
            target: MarkerTarget::Front,
            visibility: Visibility::Show,
            filter: Some("  ".into()),
        };
        assert_eq!(cmd.invocation("tool").to_string(), "tool marker vis front show");
    }

    #[test]
    fn filter_required_for_name_and_substring() {
        let cmd = VisibilityCommand::Marker {
            target: MarkerTarget::Name,
            visibility: Visibility::Show,
            filter: None,
        };
        assert!(matches!(cmd.validate(), Err(SwBridgeError::InvalidInput(_))));

        let cmd = VisibilityCommand::Suspension {
            target: SuspensionTarget::Feature,
            visibility: Visibility::Show,
            filter: None,
        };
        assert!(cmd.validate().is_err());
    }
}
