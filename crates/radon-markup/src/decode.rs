//! Split one compact operator into its code and raw arguments.

use radon_core::error::{Error, Result};
use radon_core::id::OperatorCode;
use radon_core::mir::{MirArgument, MirOperator};

/// `(code, None)` for a bare code, `(code, Some(args))` for a call.
pub fn decode(operator: &MirOperator) -> Result<(OperatorCode, Option<&[MirArgument]>)> {
    match operator {
        MirOperator::Bare(code) => Ok((*code, None)),
        MirOperator::Call(items) => {
            let (head, args) = items
                .split_first()
                .ok_or_else(|| Error::MalformedOperator("empty operator sequence".into()))?;
            let code = head
                .as_u64()
                .map(OperatorCode::new)
                .ok_or_else(|| {
                    Error::MalformedOperator(format!("operator head `{head}` is not a code"))
                })?;
            Ok((code, Some(args)))
        }
    }
}
