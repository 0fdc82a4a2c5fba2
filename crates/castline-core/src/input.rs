//! Text input seam.
//!
//! Speech recognition lives in the host. The core only sees the finalized
//! transcript, or nothing when the user cancelled or nothing was recognized.

/// Produces zero or one finalized text per capture request.
pub trait TextInputSource {
    fn capture(&mut self) -> Option<String>;
}

/// Pick the transcript to send from a recognizer's ranked matches.
///
/// The best (first) match wins; a missing or blank match yields nothing so
/// that empty text never reaches the channel.
pub fn select_transcript<S: AsRef<str>>(matches: &[S]) -> Option<&str> {
    matches
        .first()
        .map(AsRef::as_ref)
        .filter(|text| !text.trim().is_empty())
}

/// Replays a fixed list of transcripts, one per capture.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    pending: std::collections::VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(transcripts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pending: transcripts.into_iter().map(Into::into).collect(),
        }
    }
}

impl TextInputSource for ScriptedInput {
    fn capture(&mut self) -> Option<String> {
        self.pending.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_match_wins() {
        let matches = vec!["hello world".to_string(), "yellow world".to_string()];
        assert_eq!(select_transcript(&matches), Some("hello world"));
    }

    #[test]
    fn no_matches_yields_nothing() {
        let matches: Vec<String> = Vec::new();
        assert_eq!(select_transcript(&matches), None);
    }

    #[test]
    fn blank_first_match_yields_nothing() {
        assert_eq!(select_transcript(&["  ", "fallback"]), None);
    }

    #[test]
    fn scripted_input_replays_in_order() {
        let mut source = ScriptedInput::new(["first", "second"]);
        assert_eq!(source.capture(), Some("first".to_string()));
        assert_eq!(source.capture(), Some("second".to_string()));
        assert_eq!(source.capture(), None);
    }
}
