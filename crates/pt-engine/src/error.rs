// crates/pt-engine/src/error.rs
//
// Error types. Plugin load failures are true exceptional paths and get
// a hand-written `PtError` implementing `std::error::Error` directly
// (no `thiserror`). Everything on the hot dispatch path uses the two
// small result enums below instead, which the public API narrows to a
// `0`/`1`/`-1` integer contract.

use std::fmt;

#[derive(Debug)]
pub enum PtError {
    PluginLoadFailed { path: std::path::PathBuf },
    SymbolResolutionFailed { plugin: String, symbol: String },
    IntrospectionFailed { path: std::path::PathBuf },
}

impl fmt::Display for PtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PtError::PluginLoadFailed { path } => {
                write!(f, "failed to load plugin library at {}", path.display())
            }
            PtError::SymbolResolutionFailed { plugin, symbol } => {
                write!(f, "plugin {plugin} does not export symbol {symbol}")
            }
            PtError::IntrospectionFailed { path } => {
                write!(f, "plugin introspection failed for {}", path.display())
            }
        }
    }
}

impl std::error::Error for PtError {}

/// Outcome of one rule-dispatch pass. Internal: the public
/// `TransferPointer`/`CallPlugin` entry points narrow this to an
/// integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Dispatched { success_count: usize },
    NoMatch,
    Rejected(RejectReason),
}

impl DispatchOutcome {
    /// Maps onto the public `0` (at least one success) / `-1` (nothing
    /// matched or succeeded) contract.
    pub fn as_raw(&self) -> i32 {
        match self {
            DispatchOutcome::Dispatched { success_count } if *success_count > 0 => 0,
            _ => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    CycleDetected,
    InvalidArgument,
}

/// Outcome of preparing and invoking a single target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrepareError {
    PluginUnavailable,
    ConditionNotMet,
    ParamIndexOutOfRange,
    ParameterGap,
    ReadinessMiss,
    VariadicEnvelopeTooSmall,
    MissingReturnSize,
    CallFailed,
    CycleDetected,
    LiteralParseFailed,
}
