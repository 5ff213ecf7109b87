// src/ops/release.rs

//! `release`: drop references the host application still holds for the
//! automation tools.

use std::path::PathBuf;

use crate::errors::Result;
use crate::exec::{Invocation, RunContext};
use crate::types::OperationKind;

use super::{Operation, OperationFuture};

#[derive(Debug, Clone)]
pub struct ReleaseHostState {
    pub executable: PathBuf,
}

impl ReleaseHostState {
    fn invocation(&self) -> Invocation {
        Invocation::new(&self.executable).arg("release")
    }
}

impl Operation for ReleaseHostState {
    fn kind(&self) -> OperationKind {
        OperationKind::Release
    }

    fn run<'a>(&'a self, ctx: &'a mut RunContext) -> OperationFuture<'a> {
        Box::pin(async move { Ok(ctx.run_process(&self.invocation()).await?) })
    }

    fn plan(&self) -> Result<Vec<Invocation>> {
        Ok(vec![self.invocation()])
    }
}
