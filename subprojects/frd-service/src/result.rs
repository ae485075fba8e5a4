//! Result codes returned to IPC callers.
//!
//! Every response starts with a 32-bit result word. Zero means success; any other value is an
//! error that can be split into its constituent fields.
//!
//! # Structure
//!
//! - **Bits 0-9:** Description
//! - **Bits 10-17:** Module
//! - **Bits 18-20:** Reserved
//! - **Bits 21-26:** Summary
//! - **Bits 27-31:** Level
//!
//! # References
//! - [3dbrew Error codes](https://www.3dbrew.org/wiki/Error_codes)

/// Mask for the description field (10 bits)
const DESCRIPTION_MASK: u32 = 0x3FF;
/// Mask for the module field (8 bits)
const MODULE_MASK: u32 = 0xFF;
/// Shift amount for the module field
const MODULE_SHIFT: u32 = 10;
/// Mask for the summary field (6 bits)
const SUMMARY_MASK: u32 = 0x3F;
/// Shift amount for the summary field
const SUMMARY_SHIFT: u32 = 21;
/// Mask for the level field (5 bits)
const LEVEL_MASK: u32 = 0x1F;
/// Shift amount for the level field
const LEVEL_SHIFT: u32 = 27;

/// Module that raised an error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorModule {
    Common = 0,
    Friends = 49,
}

/// What went wrong.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorDescription {
    Success = 0,
    InvalidEnumValue = 1005,
    NoData = 1007,
    NotImplemented = 1012,
}

/// Broad category of an error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorSummary {
    Success = 0,
    InvalidState = 5,
    NotSupported = 6,
    InvalidArgument = 7,
}

/// How the caller is expected to react.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorLevel {
    Success = 0,
    Status = 25,
    Permanent = 27,
}

/// A result word as sent on the wire.
///
/// # Formatting
///
/// Errors are displayed as `MMM-DDDD`, where `MMM` is the module number and `DDDD` the
/// description:
///
/// ```text
/// 049-1007
/// ```
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct ResultCode(u32);

impl ResultCode {
    pub const SUCCESS: Self = Self(0);

    /// Requested data is not available, e.g. the account has no credentials.
    pub const FRIENDS_NO_DATA: Self = Self::from_parts(
        ErrorDescription::NoData,
        ErrorModule::Friends,
        ErrorSummary::InvalidState,
        ErrorLevel::Status,
    );

    /// Command is not implemented by this service.
    pub const FRIENDS_NOT_IMPLEMENTED: Self = Self::from_parts(
        ErrorDescription::NotImplemented,
        ErrorModule::Friends,
        ErrorSummary::NotSupported,
        ErrorLevel::Permanent,
    );

    /// An enumerated argument is out of range.
    pub const FRIENDS_INVALID_ENUM_VALUE: Self = Self::from_parts(
        ErrorDescription::InvalidEnumValue,
        ErrorModule::Friends,
        ErrorSummary::InvalidArgument,
        ErrorLevel::Permanent,
    );

    /// Creates a new [`ResultCode`] from a raw value
    #[inline]
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw value of the [`ResultCode`]
    #[inline]
    pub const fn to_raw(self) -> u32 {
        self.0
    }

    /// Creates a new [`ResultCode`] from its fields
    #[inline]
    pub const fn from_parts(
        description: ErrorDescription,
        module: ErrorModule,
        summary: ErrorSummary,
        level: ErrorLevel,
    ) -> Self {
        let description = (description as u32) & DESCRIPTION_MASK;
        let module = ((module as u32) & MODULE_MASK) << MODULE_SHIFT;
        let summary = ((summary as u32) & SUMMARY_MASK) << SUMMARY_SHIFT;
        let level = ((level as u32) & LEVEL_MASK) << LEVEL_SHIFT;
        Self(description | module | summary | level)
    }

    /// Returns true if the [`ResultCode`] represents a success
    #[inline]
    pub const fn is_success(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_error(&self) -> bool {
        !self.is_success()
    }

    #[inline]
    pub const fn description(&self) -> u32 {
        self.0 & DESCRIPTION_MASK
    }

    #[inline]
    pub const fn module(&self) -> u32 {
        (self.0 >> MODULE_SHIFT) & MODULE_MASK
    }

    #[inline]
    pub const fn summary(&self) -> u32 {
        (self.0 >> SUMMARY_SHIFT) & SUMMARY_MASK
    }

    #[inline]
    pub const fn level(&self) -> u32 {
        (self.0 >> LEVEL_SHIFT) & LEVEL_MASK
    }
}

impl Default for ResultCode {
    fn default() -> Self {
        Self::SUCCESS
    }
}

impl core::fmt::Display for ResultCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:03}-{:04}", self.module(), self.description())
    }
}

impl core::fmt::Debug for ResultCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResultCode")
            .field("code", &format_args!("{}", self))
            .field("summary", &self.summary())
            .field("level", &self.level())
            .field("raw", &format_args!("{:#x}", self.0))
            .finish()
    }
}

impl core::error::Error for ResultCode {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_friends_codes_match_console_values() {
        assert_eq!(ResultCode::FRIENDS_NO_DATA.to_raw(), 0xC8A0_C7EF);
        assert_eq!(ResultCode::FRIENDS_NOT_IMPLEMENTED.to_raw(), 0xD8C0_C7F4);
    }

    #[test]
    fn test_fields_split_back_out() {
        let code = ResultCode::FRIENDS_NO_DATA;
        assert_eq!(code.description(), ErrorDescription::NoData as u32);
        assert_eq!(code.module(), ErrorModule::Friends as u32);
        assert_eq!(code.summary(), ErrorSummary::InvalidState as u32);
        assert_eq!(code.level(), ErrorLevel::Status as u32);
        assert!(code.is_error());
        assert!(ResultCode::SUCCESS.is_success());
    }

    #[test]
    fn test_formatting() {
        let code = ResultCode::FRIENDS_NO_DATA;
        assert_eq!(code.to_string(), "049-1007");
        assert_eq!(
            format!("{code:?}"),
            "ResultCode { code: 049-1007, summary: 5, level: 25, raw: 0xc8a0c7ef }"
        );
    }
}
