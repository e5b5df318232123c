//! Words that end the chat loop.

/// Tokens that end the session when typed on their own.
pub const EXIT_COMMANDS: &[&str] = &["exit", "quit"];

/// Returns true if `line` asks to leave the session.
///
/// Surrounding whitespace is ignored and matching is case-insensitive.
pub fn is_exit_command(line: &str) -> bool {
    let line = line.trim();
    EXIT_COMMANDS
        .iter()
        .any(|command| line.eq_ignore_ascii_case(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_tokens() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("quit"));
        assert!(is_exit_command("  QUIT \n"));
        assert!(is_exit_command("Exit"));
    }

    #[test]
    fn not_exit_tokens() {
        assert!(!is_exit_command(""));
        assert!(!is_exit_command("exit now"));
        assert!(!is_exit_command("/quit"));
        assert!(!is_exit_command("quitter"));
    }
}
