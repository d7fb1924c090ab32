/*!
    Error types for the ffmpeg sync crates.
*/

use thiserror::Error;

use crate::ScanMode;

/**
    Error type for the ffmpeg sync crates.
*/
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid data (malformed or mismatched input)
    #[error("invalid data: {message}")]
    InvalidData { message: String },
    /// Unsupported format (valid but not handled)
    #[error("unsupported format: {message}")]
    UnsupportedFormat { message: String },
    /// A picture transform failed
    #[error("filter error: {message}")]
    Filter { message: String },
    /**
        No cadence conversion exists between the source and the target.

        This is a configuration fault: the muxer was asked to combine frames
        under a policy that cannot produce output.
    */
    #[error(
        "invalid cadence: cannot convert {source_scan} at {source_fps:.3} fps \
         to {target_scan} at {target_fps:.3} fps"
    )]
    InvalidCadence {
        source_scan: ScanMode,
        source_fps: f64,
        target_scan: ScanMode,
        target_fps: f64,
    },
}

impl Error {
    /**
        Create an invalid data error with the given message.
    */
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /**
        Create an unsupported format error with the given message.
    */
    pub fn unsupported_format(message: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            message: message.into(),
        }
    }

    /**
        Create a filter error with the given message.
    */
    pub fn filter(message: impl Into<String>) -> Self {
        Self::Filter {
            message: message.into(),
        }
    }

    /**
        Returns true if this error reports an impossible cadence conversion.
    */
    pub fn is_invalid_cadence(&self) -> bool {
        matches!(self, Self::InvalidCadence { .. })
    }
}

/**
    Result type alias for the ffmpeg sync crates.
*/
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let e = Error::invalid_data("corrupted picture");
        assert_eq!(format!("{e}"), "invalid data: corrupted picture");

        let e = Error::unsupported_format("unknown preset");
        assert_eq!(format!("{e}"), "unsupported format: unknown preset");

        let e = Error::filter("yadif failed");
        assert_eq!(format!("{e}"), "filter error: yadif failed");
    }

    #[test]
    fn invalid_cadence_display() {
        let e = Error::InvalidCadence {
            source_scan: ScanMode::UpperFieldFirst,
            source_fps: 50.0,
            target_scan: ScanMode::Progressive,
            target_fps: 25.0,
        };
        assert_eq!(
            format!("{e}"),
            "invalid cadence: cannot convert upper-field-first at 50.000 fps \
             to progressive at 25.000 fps"
        );
    }

    #[test]
    fn error_is_invalid_cadence() {
        let e = Error::InvalidCadence {
            source_scan: ScanMode::Progressive,
            source_fps: 24.0,
            target_scan: ScanMode::Progressive,
            target_fps: 60.0,
        };
        assert!(e.is_invalid_cadence());
        assert!(!Error::filter("test").is_invalid_cadence());
    }
}
