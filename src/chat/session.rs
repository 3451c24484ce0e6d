//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the conversation
//! history and drives one turn at a time: format the history into a prompt,
//! stream the response through the classifier, and record the outcome.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;

use crate::classify::{ResponseClassifier, StreamEnd};
use crate::client::Generator;
use crate::error::Result;
use crate::message::Message;
use crate::observability;
use crate::progress::ProgressIndicator;

/// History entry recorded when the source fails mid-stream.
const ERROR_SENTINEL: &str = "[Error during generation]";

/// Notice printed when the stream ended before the closing think tag.
const NO_ANSWER_NOTICE: &str = "[Model stopped before </think> tag or generated empty response]";

/// Notice printed when everything after the tag was blank lines.
const ONLY_BLANK_LINES_NOTICE: &str = "[Model stopped after </think> tag, ended with newlines]";

/// Label shown on the progress indicator while the model thinks.
const INDICATOR_LABEL: &str = "Thinking...";

/// Best-effort cleanup for the interrupt handler: stop the spinner if it is
/// running and hand the terminal back. Safe to race against a stop from the
/// main turn logic.
pub fn interrupt_cleanup(indicator: &ProgressIndicator) {
    observability::INTERRUPTS.click();
    indicator.stop();
    let _ = crate::screen::restore_terminal();
}

/// A chat session: the conversation history plus the generator and the
/// shared progress indicator. Only the primary thread touches the history;
/// the indicator is shared with the interrupt handler.
pub struct ChatSession<G> {
    generator: G,
    history: Vec<Message>,
    indicator: Arc<ProgressIndicator>,
}

impl<G: Generator> ChatSession<G> {
    /// Creates a session with an empty history.
    pub fn new(generator: G, indicator: Arc<ProgressIndicator>) -> Self {
        Self {
            generator,
            history: Vec::new(),
            indicator,
        }
    }

    /// The conversation so far.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Returns the number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        self.history.len()
    }

    /// Clears the conversation history.
    pub fn clear(&mut self) {
        observability::CLEARS.click();
        self.history.clear();
    }

    /// Runs one turn: append the user message, format, stream, record.
    ///
    /// Visible text is written to `out` as it is classified. Template and
    /// stream faults are reported on `out` and absorbed so the REPL
    /// continues; only terminal write failures propagate.
    pub async fn run_turn<W: Write>(&mut self, input: &str, out: &mut W) -> Result<()> {
        observability::TURNS_STARTED.click();
        let start = Instant::now();

        let previous_len = self.history.len();
        self.history.push(Message::user(input));

        let prompt = match self.generator.format_prompt(&self.history).await {
            Ok(prompt) => prompt,
            Err(err) => {
                // The turn never started; put the history back.
                self.history.truncate(previous_len);
                observability::FORMAT_FAULTS.click();
                writeln!(out, "{err}")?;
                writeln!(
                    out,
                    "The model might lack a configured chat template. Skipping this turn."
                )?;
                out.flush()?;
                return Ok(());
            }
        };

        self.indicator.start(INDICATOR_LABEL);
        let mut classifier = ResponseClassifier::new();
        let outcome = self.stream_response(&prompt, &mut classifier, out).await;
        // Normally stopped at the Thinking->Stripping transition; this covers
        // streams that end or fail while still thinking.
        self.indicator.stop();

        match outcome {
            Ok(()) => {
                self.history
                    .push(Message::assistant(classifier.raw_response()));
                write_stream_end(classifier.finish(), out)?;
                out.flush()?;
                observability::TURNS_COMPLETED.click();
                observability::TURN_DURATION.add(start.elapsed().as_secs_f64());
            }
            Err(err) => {
                observability::STREAM_FAULTS.click();
                // Leading newline so the notice never glues onto a partially
                // streamed answer.
                writeln!(out, "\n{err}")?;
                self.history.push(Message::assistant(ERROR_SENTINEL));
                out.flush()?;
            }
        }
        Ok(())
    }

    /// Feeds every fragment of one response through the classifier, writing
    /// visible text as it resolves. The indicator is stopped before the first
    /// visible character so spinner redraws never interleave with the answer.
    async fn stream_response<W: Write>(
        &self,
        prompt: &str,
        classifier: &mut ResponseClassifier,
        out: &mut W,
    ) -> Result<()> {
        let mut stream = self.generator.open_stream(prompt).await?;
        while let Some(fragment) = stream.next().await {
            let fragment = fragment?;
            observability::FRAGMENTS.click();
            let emission = classifier.push(&fragment);
            if emission.stop_indicator {
                self.indicator.stop();
            }
            if let Some(text) = emission.visible {
                write!(out, "{text}")?;
                out.flush()?;
            }
        }
        Ok(())
    }
}

/// Writes the end-of-turn text for a resolved stream: a trailing newline
/// after an answer, a notice when nothing visible was emitted, or the
/// unflushed remainder exactly once.
fn write_stream_end<W: Write>(end: StreamEnd, out: &mut W) -> std::io::Result<()> {
    match end {
        StreamEnd::Answered => writeln!(out),
        StreamEnd::NoAnswer => writeln!(out, "{NO_ANSWER_NOTICE}"),
        StreamEnd::OnlyBlankLines => writeln!(out, "{ONLY_BLANK_LINES_NOTICE}"),
        StreamEnd::Unflushed(text) => writeln!(out, "{text}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FragmentStream;
    use crate::error::Error;
    use async_trait::async_trait;
    use futures::stream;
    use std::sync::Mutex;

    /// Generator that replays a fixed script and records every formatted
    /// history length.
    struct Scripted {
        fragments: Vec<Result<String>>,
        fail_format: bool,
        formatted_lens: Mutex<Vec<usize>>,
    }

    impl Scripted {
        fn ok(fragments: &[&str]) -> Self {
            Self {
                fragments: fragments.iter().map(|f| Ok(f.to_string())).collect(),
                fail_format: false,
                formatted_lens: Mutex::new(Vec::new()),
            }
        }

        fn failing_format() -> Self {
            Self {
                fragments: Vec::new(),
                fail_format: true,
                formatted_lens: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Generator for Scripted {
        async fn format_prompt(&self, history: &[Message]) -> Result<String> {
            self.formatted_lens.lock().unwrap().push(history.len());
            if self.fail_format {
                return Err(Error::format("no chat template configured"));
            }
            Ok(history
                .iter()
                .map(|m| m.content.as_str())
                .collect::<Vec<_>>()
                .join("\n"))
        }

        async fn open_stream(&self, _prompt: &str) -> Result<FragmentStream> {
            Ok(Box::pin(stream::iter(self.fragments.clone())))
        }
    }

    fn session(generator: Scripted) -> ChatSession<Scripted> {
        ChatSession::new(generator, Arc::new(ProgressIndicator::new()))
    }

    #[tokio::test]
    async fn successful_turn_streams_the_answer_and_records_raw_text() {
        let fragments = [
            "<think>I w",
            "ill answ",
            "er</thin",
            "k>",
            "\n\n",
            "Hello",
            " world",
        ];
        let mut session = session(Scripted::ok(&fragments));
        let mut out = Vec::new();

        session.run_turn("hi", &mut out).await.unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "Hello world\n");
        assert_eq!(session.message_count(), 2);
        assert_eq!(session.history()[0], Message::user("hi"));
        assert_eq!(session.history()[1], Message::assistant(fragments.concat()));
        assert!(!session.indicator.is_running());
    }

    #[tokio::test]
    async fn format_fault_rolls_back_the_user_turn() {
        let mut session = session(Scripted::failing_format());
        let mut out = Vec::new();

        session.run_turn("hi", &mut out).await.unwrap();

        assert_eq!(session.message_count(), 0);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("no chat template configured"));
        assert!(text.contains("Skipping this turn."));
    }

    #[tokio::test]
    async fn stream_fault_records_the_sentinel_and_continues() {
        let mut generator = Scripted::ok(&["<think>a"]);
        generator
            .fragments
            .push(Err(Error::stream("connection reset", None)));
        let mut session = session(generator);
        let mut out = Vec::new();

        session.run_turn("hi", &mut out).await.unwrap();

        assert_eq!(session.message_count(), 2);
        assert_eq!(
            session.history()[1],
            Message::assistant("[Error during generation]")
        );
        assert!(String::from_utf8(out).unwrap().contains("connection reset"));
        assert!(!session.indicator.is_running());
    }

    #[tokio::test]
    async fn stream_without_the_tag_prints_the_no_answer_notice() {
        let mut session = session(Scripted::ok(&["never", " closes"]));
        let mut out = Vec::new();

        session.run_turn("hi", &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[Model stopped before </think> tag"));
        // The raw response is still recorded.
        assert_eq!(session.history()[1], Message::assistant("never closes"));
    }

    #[tokio::test]
    async fn stream_ending_in_blank_lines_prints_its_notice() {
        let mut session = session(Scripted::ok(&["<think>a</think>", "\n\n"]));
        let mut out = Vec::new();

        session.run_turn("hi", &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[Model stopped after </think> tag, ended with newlines]"));
    }

    #[test]
    fn unflushed_remainder_is_written_once_with_a_trailing_newline() {
        let mut out = Vec::new();
        write_stream_end(StreamEnd::Unflushed("\nlast words".to_string()), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\nlast words\n");
    }

    #[test]
    fn empty_stream_is_a_no_answer() {
        tokio_test::block_on(async {
            let mut session = session(Scripted::ok(&[]));
            let mut out = Vec::new();
            session.run_turn("hi", &mut out).await.unwrap();
            let text = String::from_utf8(out).unwrap();
            assert!(text.contains("[Model stopped before </think> tag"));
            assert_eq!(session.history()[1], Message::assistant(""));
        });
    }

    #[tokio::test]
    async fn clear_empties_history_and_the_next_prompt_starts_fresh() {
        let fragments = ["<think></think>ok"];
        let mut session = session(Scripted::ok(&fragments));
        let mut out = Vec::new();

        session.run_turn("first", &mut out).await.unwrap();
        assert_eq!(session.message_count(), 2);

        session.clear();
        assert_eq!(session.message_count(), 0);

        session.run_turn("second", &mut out).await.unwrap();
        let lens = session.generator.formatted_lens.lock().unwrap().clone();
        // First turn formatted one message; after /clear the next turn also
        // formatted exactly one.
        assert_eq!(lens, vec![1, 1]);
    }
}
