use thiserror::Error;

macro_rules! corrupt_data {
    // Single string version
    ($msg:expr) => {
        crate::Error::CorruptData {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::CorruptData {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers every failure that can occur while decoding or encoding game assets,
/// tracking their changes, and patching them back into a ROM image. Each variant carries
/// enough context to tell the user which asset or region is affected.
///
/// # Error Categories
///
/// ## Codec Errors
/// - [`Error::CorruptData`] - Malformed or truncated compressed input
/// - [`Error::CapacityExceeded`] - Encoded output does not fit the provided buffer or region
/// - [`Error::InvalidInput`] - A value the target format cannot represent
///
/// ## ROM and Source Errors
/// - [`Error::OutOfBounds`] - Access outside the ROM image or buffer
/// - [`Error::SectionNotFound`] - A label resolves neither to a section nor an address
/// - [`Error::DisplacementOutOfRange`] - A PC-relative pointer cannot reach its target
/// - [`Error::FileError`] - Filesystem I/O errors
///
/// ## Session Errors
/// - [`Error::NotReady`] - Operation requires loaded game data
/// - [`Error::AlreadyLoaded`] - A second load was attempted on a ready session
/// - [`Error::Busy`] - Another load, save or injection is already running
/// - [`Error::LockError`] - Thread synchronization failure
///
/// # Examples
///
/// ```rust,ignore
/// use romkit::{codec::BlockCodec, Error};
///
/// match BlockCodec::decode(&data) {
///     Ok((blocks, consumed)) => println!("{} blocks in {} bytes", blocks.len(), consumed),
///     Err(Error::CorruptData { message, file, line }) => {
///         eprintln!("Corrupt blockset: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The input data is malformed or truncated.
    ///
    /// Raised by every decoder when a stream ends early, a command references an
    /// unset register, an index falls outside its legal range, or a run overruns
    /// the declared element count. The error captures where in this crate the
    /// problem was detected.
    ///
    /// # Fields
    ///
    /// * `message` - Description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Corrupt data - {file}:{line}: {message}")]
    CorruptData {
        /// The message to be printed for the corrupt data error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Encoded output is larger than the space available for it.
    ///
    /// Raised when an encoder writes into a caller-provided buffer that is too
    /// small, or when a count exceeds the width of the field that stores it.
    #[error("Capacity exceeded - {required} bytes required, {available} available")]
    CapacityExceeded {
        /// Number of bytes (or elements) the operation needed
        required: usize,
        /// Number of bytes (or elements) that were available
        available: usize,
    },

    /// A value was handed to an encoder that its format cannot represent.
    #[error("Invalid input - {0}")]
    InvalidInput(String),

    /// An access fell outside the ROM image or a buffer.
    #[error("Out of Bounds - attempted to access data beyond the available range")]
    OutOfBounds,

    /// The named label is neither a ROM section nor a ROM address, or is not
    /// defined by the assembly source tree.
    #[error("Label not found - {0}")]
    SectionNotFound(String),

    /// A PC-relative 16-bit displacement cannot reach its target.
    #[error("Displacement from 0x{from:06X} to 0x{to:06X} does not fit in 16 bits")]
    DisplacementOutOfRange {
        /// Address of the referencing instruction
        from: u32,
        /// Address being referenced
        to: u32,
    },

    /// The session has no loaded game data.
    #[error("Game data is not loaded")]
    NotReady,

    /// Game data was already loaded into this session.
    #[error("Game data is already loaded")]
    AlreadyLoaded,

    /// Another load, save or injection is still in progress.
    ///
    /// Re-entrant calls are rejected rather than queued.
    #[error("Another operation is already in progress")]
    Busy,

    /// Failed to acquire a lock.
    #[error("Failed to lock target")]
    LockError,

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur while reading assets, saving
    /// them to a source tree, or writing a ROM image.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),
}
