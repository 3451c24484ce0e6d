//! Response-stream classification for thinking models.
//!
//! This module decides, fragment by fragment, which generated text stays
//! hidden and which is rendered. Output before the closing `</think>` tag is
//! thinking and never shown; after the tag, leading blank lines are stripped;
//! everything else streams to the terminal as it arrives. The tag and the
//! blank-line run can straddle fragment boundaries, so classification works
//! on accumulated buffered text rather than on single fragments.

use std::borrow::Cow;

/// The tag that ends the hidden thinking segment of a response.
pub const THINK_CLOSE_TAG: &str = "</think>";

/// Undecodable units arrive as U+FFFD; they are rendered as `?`.
const REPLACEMENT_CHAR: char = '\u{FFFD}';
const PLACEHOLDER: &str = "?";

/// Phase of a single response, in order. The phase never regresses within a
/// turn.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ClassifierState {
    /// Inside the thinking segment, waiting for the closing tag.
    #[default]
    Thinking,

    /// Past the tag, discarding the leading run of blank lines.
    StrippingLeadingBlankLines,

    /// Rendering everything as it arrives.
    Streaming,
}

/// What one fragment produced: text to render, and whether the progress
/// indicator must be stopped before that text is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Emission {
    /// Text to write to the screen, if any.
    pub visible: Option<String>,

    /// Set exactly once per turn, when the closing tag is found.
    pub stop_indicator: bool,
}

/// How the stream ended, from the classifier's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
    /// Visible text was rendered; the turn needs only a trailing newline.
    Answered,

    /// The stream ended before the closing tag; nothing was shown.
    NoAnswer,

    /// The stream ended after the tag having produced only blank lines.
    OnlyBlankLines,

    /// The stream ended mid-strip with unflushed text; render it once, as is.
    Unflushed(String),
}

/// Classifier for one response stream. Create a fresh one per turn.
#[derive(Debug, Default)]
pub struct ResponseClassifier {
    state: ClassifierState,
    pending: String,
    raw: String,
}

impl ResponseClassifier {
    /// Creates a classifier in the `Thinking` state with empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current phase.
    pub fn state(&self) -> ClassifierState {
        self.state
    }

    /// The concatenation of every fragment fed so far, thinking included.
    /// This is what belongs in the conversation history.
    pub fn raw_response(&self) -> &str {
        &self.raw
    }

    /// Feeds one fragment and returns what it produced. Pure with respect to
    /// I/O: the caller writes any visible text and stops the indicator when
    /// told to, in that order.
    pub fn push(&mut self, fragment: &str) -> Emission {
        let fragment = sanitize(fragment);
        self.raw.push_str(&fragment);

        match self.state {
            ClassifierState::Thinking => {
                self.pending.push_str(&fragment);
                let Some(tag_at) = self.pending.find(THINK_CLOSE_TAG) else {
                    return Emission::default();
                };
                // Everything through the tag is thinking; only the remainder
                // survives into the next phase.
                self.pending.drain(..tag_at + THINK_CLOSE_TAG.len());
                self.state = ClassifierState::StrippingLeadingBlankLines;
                let mut emission = self.drain_blank_prefix();
                emission.stop_indicator = true;
                emission
            }
            ClassifierState::StrippingLeadingBlankLines => {
                self.pending.push_str(&fragment);
                self.drain_blank_prefix()
            }
            ClassifierState::Streaming => {
                if fragment.is_empty() {
                    Emission::default()
                } else {
                    Emission {
                        visible: Some(fragment.into_owned()),
                        stop_indicator: false,
                    }
                }
            }
        }
    }

    /// Resolves the end of the stream. Call after the source is exhausted.
    pub fn finish(self) -> StreamEnd {
        match self.state {
            ClassifierState::Streaming => StreamEnd::Answered,
            ClassifierState::Thinking => StreamEnd::NoAnswer,
            ClassifierState::StrippingLeadingBlankLines => {
                if self.pending.is_empty() {
                    StreamEnd::OnlyBlankLines
                } else {
                    StreamEnd::Unflushed(self.pending)
                }
            }
        }
    }

    /// Removes the whole leading run of line breaks from the pending buffer.
    /// If anything remains it all becomes visible and the classifier moves to
    /// `Streaming`; consuming the full run at once keeps the emitted text
    /// independent of how the run was split across fragments.
    fn drain_blank_prefix(&mut self) -> Emission {
        let remainder = self.pending.trim_start_matches('\n');
        if remainder.is_empty() {
            self.pending.clear();
            Emission::default()
        } else {
            let visible = remainder.to_string();
            self.pending.clear();
            self.state = ClassifierState::Streaming;
            Emission {
                visible: Some(visible),
                stop_indicator: false,
            }
        }
    }
}

/// Substitutes the Unicode replacement character so decoding damage shows up
/// as a literal `?` instead of propagating as an error.
fn sanitize(fragment: &str) -> Cow<'_, str> {
    if fragment.contains(REPLACEMENT_CHAR) {
        Cow::Owned(fragment.replace(REPLACEMENT_CHAR, PLACEHOLDER))
    } else {
        Cow::Borrowed(fragment)
    }
}
