//! Error taxonomy (C12, ambient). Mirrors the teacher's `uci::UciError`
//! pattern of small enums with manual `Display`/`Error` impls and `From`
//! glue, extended to cover FEN parsing, move parsing, and weight loading.
//! None of these are used for search control flow; they surface at the UCI
//! boundary or at startup.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenErrorKind {
    WrongFieldCount,
    BadBoardField,
    BadSideToMove,
    BadCastlingRights,
    BadEnPassantSquare,
    BadHalfmoveClock,
    BadFullmoveNumber,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenError {
    pub kind: FenErrorKind,
    pub field: String,
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid FEN field '{}': {:?}", self.field, self.kind)
    }
}

impl std::error::Error for FenError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveParseError {
    pub reason: String,
}

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid move: {}", self.reason)
    }
}

impl std::error::Error for MoveParseError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciError {
    InvalidFen(FenError),
    InvalidMove { move_str: String, error: MoveParseError },
    MissingParts,
    UnknownCommand(String),
}

impl fmt::Display for UciError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UciError::InvalidFen(e) => write!(f, "{e}"),
            UciError::InvalidMove { move_str, error } => {
                write!(f, "could not parse move '{move_str}': {error}")
            }
            UciError::MissingParts => write!(f, "command missing required parts"),
            UciError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
        }
    }
}

impl std::error::Error for UciError {}

impl From<FenError> for UciError {
    fn from(e: FenError) -> Self {
        UciError::InvalidFen(e)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightLoadError {
    pub reason: String,
}

impl fmt::Display for WeightLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to load NNUE weights: {}", self.reason)
    }
}

impl std::error::Error for WeightLoadError {}

/// Raised when an internal invariant is violated (e.g. make/unmake
/// desynchronization detected under `debug_assertions`). Distinct from the
/// parse-error family: these indicate an engine bug, not bad input, and are
/// only ever constructed behind `debug_assert!`/`panic!` call sites, never
/// propagated through `Result`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    pub what: String,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "internal invariant violated: {}", self.what)
    }
}

impl std::error::Error for InvariantViolation {}
