// Copyright 2025 the Plotfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Configuration errors.
//!
//! Layout itself never fails: degenerate inputs give empty output and
//! unresolvable overlap gives flagged best-effort output. Errors are reserved
//! for configuration that would make layout meaningless, and they are raised by
//! constructors before any layout work happens.

/// A configuration error raised while constructing a layout component.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum LayoutError {
    /// The injected text measurer produced an unusable extent for a probe string.
    #[error("text measurer returned an invalid extent for {probe:?}: {width} x {height}")]
    InvalidTextMeasurer {
        /// The probe text that was measured.
        probe: &'static str,
        /// The reported width.
        width: f64,
        /// The reported height.
        height: f64,
    },
    /// A numeric option is out of its valid range.
    #[error("invalid option `{name}`: {reason}")]
    InvalidOption {
        /// The option name.
        name: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

/// Result alias for fallible constructors.
pub type Result<T> = core::result::Result<T, LayoutError>;

/// Rejects values that are non-finite or not strictly positive.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LayoutError::InvalidOption {
            name,
            reason: "must be finite and greater than zero",
        })
    }
}

/// Rejects values that are non-finite or negative.
pub(crate) fn require_non_negative(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LayoutError::InvalidOption {
            name,
            reason: "must be finite and non-negative",
        })
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::string::ToString;

    use super::*;

    #[test]
    fn option_errors_name_the_option() {
        let err = require_positive("grid_size", 0.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid option `grid_size`: must be finite and greater than zero"
        );
        assert!(require_non_negative("padding", 0.0).is_ok(), "zero is allowed");
        assert!(
            require_non_negative("padding", f64::INFINITY).is_err(),
            "infinity is rejected"
        );
    }
}
