//! Audio HAL for the tone generator.

/// A single beep request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beep {
    pub frequency_hz: u32,
    /// Linear volume, 0.0 to 1.0.
    pub volume: f32,
    pub duration_ms: u32,
}

/// Acknowledgement tone for "save to flash".
pub const SAVE_BEEP: Beep = Beep {
    frequency_hz: 440,
    volume: 0.3,
    duration_ms: 1000,
};

/// Tone generator facade.
pub trait Audio {
    /// Start audio output. Called once at boot.
    fn start(&self);

    /// Queue a tone; returns immediately.
    fn beep(&self, beep: Beep);
}
