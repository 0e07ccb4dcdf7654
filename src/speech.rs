//! Pronunciation playback.
//!
//! The core only needs "say this at that rate, don't tell me if it fails".
//! Real playback belongs to whatever front end hosts the core; the remote
//! dictionary voice URL is provided for hosts without a speech engine.

use crate::config;

/// Fire-and-forget speech output.
pub trait Speaker {
    fn speak(&self, text: &str, rate: f32);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSpeaker;

impl Speaker for NullSpeaker {
    fn speak(&self, _text: &str, _rate: f32) {}
}

/// Logs the request with the remote voice URL a host could fetch.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSpeaker;

impl Speaker for LogSpeaker {
    fn speak(&self, text: &str, rate: f32) {
        if text.trim().is_empty() {
            tracing::debug!("Nothing to speak");
            return;
        }
        tracing::info!("speak {:?} at {}x via {}", text, rate, remote_voice_url(text));
    }
}

/// US-English voice from the Youdao dictionary service.
pub fn remote_voice_url(text: &str) -> String {
    format!(
        "https://dict.youdao.com/dictvoice?audio={}&type=1",
        urlencoding::encode(text)
    )
}

/// Say a headword at normal or slow speed.
pub fn speak_word(speaker: &dyn Speaker, word: &str, slow: bool) {
    let rate = if slow {
        config::TTS_SLOW_RATE
    } else {
        config::TTS_NORMAL_RATE
    };
    speaker.speak(word, rate);
}

/// Say an example sentence at one of the slowed-down rates (`level` 1 is
/// the slowest), or at `rate` when no valid level is given. Returns the
/// expected playback time.
pub fn speak_sentence(speaker: &dyn Speaker, sentence: &str, level: Option<usize>, rate: f32) -> u64 {
    let rate = level
        .and_then(|l| l.checked_sub(1))
        .and_then(|i| config::SENTENCE_RATES.get(i).copied())
        .unwrap_or(rate);
    speaker.speak(sentence, rate);
    estimated_duration_ms(sentence, rate)
}

/// Rough playback time of a sentence, used to reset "playing" indicators.
pub fn estimated_duration_ms(text: &str, rate: f32) -> u64 {
    let rate = rate.max(config::TTS_MIN_RATE);
    let estimate = (text.chars().count() as f32 * 100.0) / rate;
    (estimate as u64).max(3000)
}
