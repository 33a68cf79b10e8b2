//! Collision sound cues
//!
//! In the browser the "boing" is synthesized with the Web Audio API, so there
//! is no asset to go missing. Native runs log cues instead of playing them.

use thiserror::Error;

use crate::driver::SoundCue;
use crate::sim::CollisionEvent;

/// Sound cue identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Any bounce, wall or ball
    Boing,
}

impl Cue {
    /// Every collision uses the same cue
    pub fn for_event(_event: &CollisionEvent) -> Self {
        Cue::Boing
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    #[error("audio unavailable: {0}")]
    Unavailable(String),
    #[error("failed to play {cue:?}: {reason}")]
    Playback { cue: Cue, reason: String },
}

/// Logs each cue at debug level; used where there is no audio device
#[derive(Debug, Default)]
pub struct LogCue {
    pub played: u64,
}

impl SoundCue for LogCue {
    fn play(&mut self, cue: Cue) -> Result<(), AudioError> {
        self.played += 1;
        log::debug!("cue {:?} (#{})", cue, self.played);
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioError, Cue};
    use crate::driver::SoundCue;

    /// Web Audio output for collision cues
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self { ctx, volume: 0.8 }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Boing - pitch drops quickly with a short wobble
        fn play_boing(&self, ctx: &AudioContext) -> Result<(), AudioError> {
            let (osc, gain) = Self::create_osc(ctx, 520.0, OscillatorType::Sine).ok_or_else(|| {
                AudioError::Playback {
                    cue: Cue::Boing,
                    reason: "could not build oscillator".into(),
                }
            })?;
            let t = ctx.current_time();

            gain.gain().set_value_at_time(self.volume * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.18)
                .ok();
            osc.frequency().set_value_at_time(520.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(180.0, t + 0.12)
                .ok();
            osc.frequency().set_value_at_time(220.0, t + 0.13).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(160.0, t + 0.18)
                .ok();

            osc.start().map_err(|e| AudioError::Playback {
                cue: Cue::Boing,
                reason: format!("{:?}", e),
            })?;
            osc.stop_with_when(t + 0.2).ok();
            Ok(())
        }
    }

    impl SoundCue for AudioManager {
        fn play(&mut self, cue: Cue) -> Result<(), AudioError> {
            let Some(ctx) = &self.ctx else {
                return Err(AudioError::Unavailable("no AudioContext".into()));
            };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match cue {
                Cue::Boing => self.play_boing(ctx),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_event_is_a_boing() {
        assert_eq!(Cue::for_event(&CollisionEvent::Wall { ball: 0 }), Cue::Boing);
        assert_eq!(Cue::for_event(&CollisionEvent::Pair { a: 1, b: 4 }), Cue::Boing);
    }

    #[test]
    fn test_log_cue_counts() {
        let mut cue = LogCue::default();
        assert!(cue.play(Cue::Boing).is_ok());
        assert!(cue.play(Cue::Boing).is_ok());
        assert_eq!(cue.played, 2);
    }

    #[test]
    fn test_error_messages() {
        let err = AudioError::Unavailable("no AudioContext".into());
        assert_eq!(err.to_string(), "audio unavailable: no AudioContext");
        let err = AudioError::Playback {
            cue: Cue::Boing,
            reason: "boom".into(),
        };
        assert_eq!(err.to_string(), "failed to play Boing: boom");
    }
}
