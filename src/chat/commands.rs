//! Input classification for the chat REPL.
//!
//! Every line the user types is either a session control word, the `/clear`
//! command, blank, or a prompt for the model. Classification happens before
//! anything touches the conversation history.

/// What one line of user input asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatInput<'a> {
    /// End the session (`q` or `quit`, case-insensitive).
    Quit,

    /// Wipe the conversation history and replay the start screen.
    Clear,

    /// Nothing but whitespace; ignored, the prompt is shown again.
    Empty,

    /// A regular turn to send to the model.
    Prompt(&'a str),
}

/// Classifies one line of input.
///
/// Surrounding whitespace is ignored for classification and trimmed from
/// prompts. Anything that is not a recognized command is a prompt, including
/// unrecognized `/`-prefixed text.
///
/// # Examples
///
/// ```
/// # use thinker::chat::{ChatInput, classify_input};
/// assert_eq!(classify_input("QUIT"), ChatInput::Quit);
/// assert_eq!(classify_input(" /clear "), ChatInput::Clear);
/// assert_eq!(classify_input("hello"), ChatInput::Prompt("hello"));
/// ```
pub fn classify_input(line: &str) -> ChatInput<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ChatInput::Empty;
    }
    if trimmed.eq_ignore_ascii_case("q") || trimmed.eq_ignore_ascii_case("quit") {
        return ChatInput::Quit;
    }
    if trimmed.eq_ignore_ascii_case("/clear") {
        return ChatInput::Clear;
    }
    ChatInput::Prompt(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_is_case_insensitive() {
        assert_eq!(classify_input("q"), ChatInput::Quit);
        assert_eq!(classify_input("Q"), ChatInput::Quit);
        assert_eq!(classify_input("quit"), ChatInput::Quit);
        assert_eq!(classify_input("QuIt"), ChatInput::Quit);
    }

    #[test]
    fn clear_ignores_case_and_whitespace() {
        assert_eq!(classify_input("/clear"), ChatInput::Clear);
        assert_eq!(classify_input("  /CLEAR  "), ChatInput::Clear);
    }

    #[test]
    fn blank_lines_are_empty() {
        assert_eq!(classify_input(""), ChatInput::Empty);
        assert_eq!(classify_input("   \t"), ChatInput::Empty);
    }

    #[test]
    fn everything_else_is_a_prompt() {
        assert_eq!(classify_input("hello"), ChatInput::Prompt("hello"));
        assert_eq!(
            classify_input("  what is quittance?  "),
            ChatInput::Prompt("what is quittance?")
        );
        // Only /clear is special; unknown commands go to the model.
        assert_eq!(classify_input("/help"), ChatInput::Prompt("/help"));
    }

    #[test]
    fn quit_must_be_the_whole_line() {
        assert_eq!(
            classify_input("quit smoking"),
            ChatInput::Prompt("quit smoking")
        );
        assert_eq!(classify_input("qq"), ChatInput::Prompt("qq"));
    }
}
