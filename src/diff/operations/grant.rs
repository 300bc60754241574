//! Grant operations

use crate::catalog::grant::Grant;
use crate::diff::operations::OperationKind;

#[derive(Debug, Clone)]
pub enum GrantOperation {
    Grant { grant: Grant },
    Revoke { grant: Grant },
}

impl GrantOperation {
    pub fn operation_kind(&self) -> OperationKind {
        match self {
            Self::Grant { .. } => OperationKind::Create,
            Self::Revoke { .. } => OperationKind::Drop,
        }
    }
}
