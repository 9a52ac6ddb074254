use thiserror::Error;

use crate::diff::Side;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

pub(crate) use malformed_error;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Structural mismatches between two images are never errors: a comparison that fails simply
/// reports "not equal", and dangling references into the symbol, trait or method tables are
/// treated the same way because sparse tables are normal in obfuscated binaries. The variants
/// below cover the remaining failure modes.
///
/// # Error Categories
///
/// ## Input Errors
/// - [`Error::Malformed`] - An image violates a structural requirement the caller must uphold
/// - [`Error::OutOfBounds`] - A position handed to the public API lies outside its table
/// - [`Error::Disassembly`] - The external disassembler rejected a method body
///
/// ## Contract Errors
/// - [`Error::PredicateContract`] - An alignment predicate was asked to compare two elements
///   taken from the same sequence
///
/// # Examples
///
/// ```rust
/// use abcscope::{diff::Side, Error};
///
/// let err = Error::PredicateContract(Side::Baseline);
/// assert!(err.to_string().contains("baseline"));
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The image is damaged in a way that prevents analysis.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A caller-supplied position lies outside the table it addresses.
    #[error("Out of Bound access would have occurred!")]
    OutOfBounds,

    /// The external disassembler failed to decode a method body.
    ///
    /// During index construction this error is absorbed (the body is treated as empty); it
    /// only surfaces when a caller decodes a body directly.
    #[error("Failed to disassemble body of method {method} - {message}")]
    Disassembly {
        /// Method index of the body that failed to decode
        method: u32,
        /// Message reported by the disassembler
        message: String,
    },

    /// The alignment predicate was asked to compare two elements of the same sequence.
    ///
    /// This is a caller bug. Alignment aborts immediately because no meaningful partial
    /// edit script exists.
    #[error("Alignment predicate compared two {0} elements")]
    PredicateContract(Side),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),
}
