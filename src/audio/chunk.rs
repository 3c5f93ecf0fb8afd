use std::time::Duration;

use crate::config::LanguageMode;

use super::AudioWindow;

/// Limits that decide when lecture audio is transcribed in one request
/// and when it is split into fixed windows first.
#[derive(Debug, Clone)]
pub struct ChunkPolicy {
    /// Largest audio file sent to the speech API whole.
    pub max_file_size: u64,

    /// Longest clip transcribed in one request in standard mode.
    pub max_duration: Duration,

    /// Stricter limit for hinglish audio, where the transcription output
    /// is token capped and long clips come back truncated.
    pub hinglish_max_duration: Duration,

    /// Length of each exported window when chunking.
    pub window_duration: Duration,
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        Self::openai()
    }
}

impl ChunkPolicy {
    /// Limits for the OpenAI speech endpoints. A 7 minute window at
    /// 192 kbps is roughly 10 MB, well under the upload cap.
    pub fn openai() -> Self {
        Self {
            max_file_size: 20 * 1024 * 1024,
            max_duration: Duration::from_secs(840),
            hinglish_max_duration: Duration::from_secs(420),
            window_duration: Duration::from_secs(420),
        }
    }

    /// Duration above which a clip must be chunked in the given mode.
    pub fn max_duration_for(&self, mode: LanguageMode) -> Duration {
        match mode {
            LanguageMode::Standard => self.max_duration,
            LanguageMode::Hinglish => self.hinglish_max_duration,
        }
    }

    /// Decide whether an audio file needs chunked transcription.
    pub fn needs_chunking(&self, file_size: u64, duration: Duration, mode: LanguageMode) -> bool {
        file_size > self.max_file_size || duration > self.max_duration_for(mode)
    }
}

/// Plan fixed-duration windows covering the whole clip. Windows are
/// contiguous and the last one is shorter when the total duration is not
/// an exact multiple.
pub fn plan_windows(total_duration: Duration, window_duration: Duration) -> Vec<AudioWindow> {
    let mut windows = Vec::new();
    let mut current = Duration::ZERO;

    while current < total_duration {
        let end = (current + window_duration).min(total_duration);
        windows.push(AudioWindow {
            index: windows.len(),
            start: current,
            end,
        });
        current = end;
    }

    windows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_default() {
        let policy = ChunkPolicy::default();
        assert_eq!(policy.max_file_size, 20 * 1024 * 1024);
        assert!(policy.hinglish_max_duration < policy.max_duration);
        assert!(policy.window_duration <= policy.hinglish_max_duration);
    }

    #[test]
    fn test_needs_chunking_by_size() {
        let policy = ChunkPolicy::default();
        let short = Duration::from_secs(60);

        assert!(!policy.needs_chunking(1024, short, LanguageMode::Standard));
        assert!(policy.needs_chunking(
            policy.max_file_size + 1,
            short,
            LanguageMode::Standard
        ));
    }

    #[test]
    fn test_needs_chunking_hinglish_is_stricter() {
        let policy = ChunkPolicy::default();
        let between = policy.hinglish_max_duration + Duration::from_secs(1);

        assert!(!policy.needs_chunking(1024, between, LanguageMode::Standard));
        assert!(policy.needs_chunking(1024, between, LanguageMode::Hinglish));
    }

    #[test]
    fn test_plan_windows_exact_multiple() {
        let windows = plan_windows(Duration::from_secs(90), Duration::from_secs(30));

        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].start, Duration::ZERO);
        assert_eq!(windows[0].end, Duration::from_secs(30));
        assert_eq!(windows[2].start, Duration::from_secs(60));
        assert_eq!(windows[2].end, Duration::from_secs(90));
    }

    #[test]
    fn test_plan_windows_short_tail() {
        let windows = plan_windows(Duration::from_secs(100), Duration::from_secs(30));

        assert_eq!(windows.len(), 4);
        assert_eq!(windows[3].start, Duration::from_secs(90));
        assert_eq!(windows[3].end, Duration::from_secs(100));
        assert_eq!(windows[3].duration(), Duration::from_secs(10));
    }

    #[test]
    fn test_plan_windows_contiguous_and_indexed() {
        let windows = plan_windows(Duration::from_secs(125), Duration::from_secs(40));

        for (i, window) in windows.iter().enumerate() {
            assert_eq!(window.index, i);
            if i > 0 {
                assert_eq!(window.start, windows[i - 1].end);
            }
        }
    }

    #[test]
    fn test_plan_windows_zero_duration() {
        let windows = plan_windows(Duration::ZERO, Duration::from_secs(30));
        assert!(windows.is_empty());
    }
}
