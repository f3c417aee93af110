//! IoReturn - status codes at the host boundary

use std::fmt::{self, Display, Formatter};

/// Status returned through host entry points such as property actions
///
/// Raw values follow the IOKit common error space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoReturn {
    /// Operation completed
    Success,

    /// General error
    Error,

    /// Memory allocation failed
    NoMemory,

    /// Internal inconsistency
    InternalError,
}

impl IoReturn {
    const ERROR: u32 = 0xE000_02BC;
    const NO_MEMORY: u32 = 0xE000_02BD;
    const INTERNAL_ERROR: u32 = 0xE000_02C9;

    /// Raw integer code
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        let raw = match self {
            Self::Success => 0,
            Self::Error => Self::ERROR,
            Self::NoMemory => Self::NO_MEMORY,
            Self::InternalError => Self::INTERNAL_ERROR,
        };
        raw as i32
    }

    /// Decode a raw integer code; unknown codes map to [`IoReturn::Error`]
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        match raw as u32 {
            0 => Self::Success,
            Self::NO_MEMORY => Self::NoMemory,
            Self::INTERNAL_ERROR => Self::InternalError,
            _ => Self::Error,
        }
    }

    /// True for [`IoReturn::Success`]
    #[inline]
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl Display for IoReturn {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Success => "success",
            Self::Error => "general error",
            Self::NoMemory => "cannot allocate memory",
            Self::InternalError => "internal error",
        };
        write!(f, "{text} (0x{:08x})", self.as_raw() as u32)
    }
}
