use std::error;
use std::fmt;
use std::result;

pub type Result<T> = result::Result<T, Error>;

/// An error surfaced by any public operation of this crate.
///
/// Nothing is retried or recovered internally; a failed operation leaves the
/// encoder in its pre-call state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The pattern is malformed: unbalanced parentheses, a dangling escape,
    /// a postfix operator with no operand, or an empty pattern/group.
    InvalidRegex(String),
    /// The FST text could not be parsed, or the automaton it describes
    /// violates a structural constraint (duplicate transition, unreachable
    /// final state, empty language under the length bound).
    InvalidAutomaton(String),
    /// The index passed to `unrank` is at least the language size.
    RankOutOfRange,
    /// The word passed to `rank` is not accepted by the automaton or
    /// exceeds the length bound.
    NotInLanguage,
    /// A length bound outside `0..=n` was requested.
    LengthBound { requested: u32, bound: u32 },
    /// A big integer crossing the external boundary failed to parse.
    Arithmetic(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidRegex(msg) => write!(f, "invalid regex: {}", msg),
            Error::InvalidAutomaton(msg) => write!(f, "invalid automaton: {}", msg),
            Error::RankOutOfRange => write!(f, "rank index is outside the language"),
            Error::NotInLanguage => write!(f, "word is not in the language slice"),
            Error::LengthBound { requested, bound } => {
                write!(f, "length {} is outside the fixed slice 0..={}", requested, bound)
            }
            Error::Arithmetic(msg) => write!(f, "arithmetic error: {}", msg),
        }
    }
}

impl error::Error for Error {}
