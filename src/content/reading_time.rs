//! Reading time estimation

use serde::Serialize;

use crate::config::ReadingTimeConfig;

/// Average adult reading speed used when none is configured
pub const DEFAULT_WORDS_PER_MINUTE: u32 = 200;

const DEFAULT_LABEL: &str = "{minutes} min read";

/// Reading time of a post, computed once at load time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadingTime {
    pub words: usize,
    pub minutes: u32,
    pub text: String,
}

/// Turns body text into a [`ReadingTime`]
#[derive(Debug, Clone)]
pub struct ReadingTimeEstimator {
    words_per_minute: u32,
    label: String,
}

impl ReadingTimeEstimator {
    pub fn new() -> Self {
        Self {
            words_per_minute: DEFAULT_WORDS_PER_MINUTE,
            label: DEFAULT_LABEL.to_string(),
        }
    }

    /// Build from config, falling back to defaults for unusable values
    pub fn from_config(config: &ReadingTimeConfig) -> Self {
        let mut estimator = Self::new();

        match config.words_per_minute {
            Some(0) => tracing::warn!(
                "reading_time.words_per_minute is 0, using {}",
                DEFAULT_WORDS_PER_MINUTE
            ),
            Some(wpm) => estimator.words_per_minute = wpm,
            None => {}
        }

        match config.label.as_deref() {
            Some(label) if label.contains("{minutes}") => estimator.label = label.to_string(),
            Some(label) => tracing::warn!(
                "reading_time.label '{}' has no {{minutes}} placeholder, using default",
                label
            ),
            None => {}
        }

        estimator
    }

    pub fn estimate(&self, text: &str) -> ReadingTime {
        let words = count_words(text);
        let minutes = words
            .div_ceil(self.words_per_minute as usize)
            .max(1)
            .try_into()
            .unwrap_or(u32::MAX);
        let text = self
            .label
            .replace("{minutes}", &minutes.to_string())
            .replace("{words}", &words.to_string());
        ReadingTime {
            words,
            minutes,
            text,
        }
    }
}

impl Default for ReadingTimeEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Count words: alphanumeric runs, plus one per CJK ideograph
pub fn count_words(text: &str) -> usize {
    let mut count = 0;
    let mut in_word = false;

    for c in text.chars() {
        if is_cjk(c) {
            count += 1;
            in_word = false;
        } else if c.is_alphanumeric() || (in_word && (c == '\'' || c == '’')) {
            if !in_word {
                in_word = true;
                count += 1;
            }
        } else {
            in_word = false;
        }
    }

    count
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{3040}'..='\u{30FF}'
        | '\u{AC00}'..='\u{D7AF}')
}
