/*!
    Muxer configuration types.
*/

/**
    Configuration for the frame muxer.
*/
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MuxerConfig {
    /**
        Detect the cadence from source and target formats.

        When disabled, every picture is paired with one output frame
        regardless of frame rates and scan modes.
    */
    pub auto_mode: bool,
}

impl MuxerConfig {
    /**
        Create a new config with default settings (auto mode off).
    */
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Create a config with automatic cadence detection.
    */
    pub fn auto() -> Self {
        Self { auto_mode: true }
    }

    /**
        Enable or disable automatic cadence detection.
    */
    pub fn with_auto_mode(mut self, enabled: bool) -> Self {
        self.auto_mode = enabled;
        self
    }
}
