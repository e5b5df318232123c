//! Output rendering for streamed chat responses.
//!
//! This module provides the renderer trait used by the chat session and
//! plugins, a plain-text implementation with optional ANSI styling, and the
//! word-wrap state machine that re-flows streamed fragments to the terminal
//! width.

use std::io::{self, Stdout, Write};

use unicode_width::UnicodeWidthStr;

/// ANSI escape code for bright blue text (used for assistant responses).
const ANSI_BLUE: &str = "\x1b[94m";

/// ANSI escape code for green text (used for startup notices).
const ANSI_GREEN: &str = "\x1b[92m";

/// ANSI escape code for yellow text (used for the model name).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// Widest line a response is wrapped to, regardless of terminal size.
pub const MAX_WRAP_WIDTH: usize = 100;

/// Width assumed when the terminal size cannot be determined.
pub const DEFAULT_TERMINAL_WIDTH: usize = 100;

///////////////////////////////////////// Width /////////////////////////////////////////

/// Source of the current terminal width in columns.
pub trait WidthProvider {
    /// Returns the width in columns; implementations fall back to a sane default.
    fn width(&self) -> usize;
}

impl<F: Fn() -> usize> WidthProvider for F {
    fn width(&self) -> usize {
        self()
    }
}

/// Reads the width of the controlling terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalWidth;

impl WidthProvider for TerminalWidth {
    fn width(&self) -> usize {
        match crossterm::terminal::size() {
            Ok((columns, _)) if columns > 0 => columns as usize,
            _ => DEFAULT_TERMINAL_WIDTH,
        }
    }
}

///////////////////////////////////////// Wrapping /////////////////////////////////////////

/// Incremental word wrapper for streamed text.
///
/// Fragments may split words, spaces, or newlines anywhere; the wrapper keeps
/// the running column between calls so the visual layout is the same as if the
/// whole response had arrived at once up to fragment-boundary word splits.
/// Only display output is affected: callers store the raw fragments.
#[derive(Debug, Clone)]
pub struct WordWrap {
    width: usize,
    column: usize,
}

impl WordWrap {
    /// Creates a wrapper for `terminal_width` columns, capped at [`MAX_WRAP_WIDTH`].
    pub fn new(terminal_width: usize) -> Self {
        Self {
            width: terminal_width.clamp(1, MAX_WRAP_WIDTH),
            column: 0,
        }
    }

    /// Creates a wrapper sized from a width provider.
    pub fn from_provider(provider: &dyn WidthProvider) -> Self {
        Self::new(provider.width())
    }

    /// The effective wrap width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The column the next character will be written at.
    pub fn column(&self) -> usize {
        self.column
    }

    /// Returns `fragment` with display line breaks inserted.
    ///
    /// Embedded newlines always break and reset the column.  Between words a
    /// space is emitted unless `column + 1 + len(word)` exceeds the width, in
    /// which case a line break replaces it.  A word that would overflow a
    /// non-empty line on its own is also moved to a fresh line.
    pub fn wrap(&mut self, fragment: &str) -> String {
        let mut out = String::with_capacity(fragment.len() + 8);
        for (line_index, line) in fragment.split('\n').enumerate() {
            if line_index > 0 {
                out.push('\n');
                self.column = 0;
            }
            for (word_index, word) in line.split(' ').enumerate() {
                let len = word.width();
                if word_index > 0 {
                    if self.column + 1 + len > self.width {
                        out.push('\n');
                        self.column = 0;
                    } else {
                        out.push(' ');
                        self.column += 1;
                    }
                }
                if self.column != 0 && self.column + len > self.width {
                    out.push('\n');
                    self.column = 0;
                }
                out.push_str(word);
                self.column += len;
            }
        }
        out
    }
}

///////////////////////////////////////// Renderer /////////////////////////////////////////

/// Trait for rendering chat output.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
/// - Recording renderers in tests
pub trait Renderer: Send {
    /// Called before the first fragment of a response.
    fn start_response(&mut self) {}

    /// Print a chunk of already-wrapped response text.
    ///
    /// This is called incrementally as fragments are streamed from the API.
    fn print_text(&mut self, text: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Called when a response is complete.
    ///
    /// Used to ensure proper newlines and cleanup after streaming.
    fn finish_response(&mut self);

    /// Called when the stream is interrupted by the user.
    fn print_interrupted(&mut self) {}
}

/// Plain text renderer with optional ANSI styling.
///
/// This renderer outputs text directly to stdout, colouring assistant output
/// when colour is enabled.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
    in_response: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
            in_response: false,
        }
    }

    /// Prints the startup banner naming the model.
    pub fn print_banner(&mut self, model: &str) {
        if self.use_color {
            println!("\na0 assistant powered by {ANSI_YELLOW}{model}{ANSI_RESET}\n");
        } else {
            println!("\na0 assistant powered by {model}\n");
        }
        self.flush();
    }

    /// Prints the number of loaded plugins followed by one line per command.
    pub fn print_plugins(&mut self, commands: &[(String, String)]) {
        let count = commands.len();
        let noun = if count == 1 { "plugin" } else { "plugins" };
        if self.use_color {
            println!("{ANSI_GREEN}Loaded {count} {noun}{ANSI_RESET}");
        } else {
            println!("Loaded {count} {noun}");
        }
        for (command, description) in commands {
            println!("  {command:<10} {description}");
        }
        println!();
        self.flush();
    }

    /// Flushes stdout to ensure immediate display of streamed content.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    fn reset_styles(&mut self) {
        if self.in_response {
            if self.use_color {
                print!("{ANSI_RESET}");
            }
            self.in_response = false;
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn start_response(&mut self) {
        if self.use_color {
            print!("{ANSI_BLUE}");
        }
        self.in_response = true;
        self.flush();
    }

    fn print_text(&mut self, text: &str) {
        print!("{text}");
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        self.reset_styles();
        eprintln!("Error: {error}");
    }

    fn print_info(&mut self, info: &str) {
        self.reset_styles();
        println!("{info}");
        self.flush();
    }

    fn finish_response(&mut self) {
        self.reset_styles();
        println!();
        println!();
        self.flush();
    }

    fn print_interrupted(&mut self) {
        self.reset_styles();
        println!("\n[interrupted]");
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap_all(width: usize, fragments: &[&str]) -> String {
        let mut wrap = WordWrap::new(width);
        fragments.iter().map(|f| wrap.wrap(f)).collect()
    }

    fn widest_line(text: &str) -> usize {
        text.split('\n').map(|line| line.width()).max().unwrap_or(0)
    }

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color);
    }

    #[test]
    fn width_is_capped() {
        assert_eq!(WordWrap::new(250).width(), MAX_WRAP_WIDTH);
        assert_eq!(WordWrap::new(40).width(), 40);
        assert_eq!(WordWrap::new(0).width(), 1);
    }

    #[test]
    fn width_from_closure() {
        let provider = || 72_usize;
        assert_eq!(WordWrap::from_provider(&provider).width(), 72);
    }

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(wrap_all(80, &["Hello, ", "world!"]), "Hello, world!");
    }

    #[test]
    fn fragments_across_word_boundaries() {
        let out = wrap_all(10, &["Hello ", "wo", "rld this is long "]);
        assert_eq!(out, "Hello wo\nrld this\nis long ");
        assert!(widest_line(&out) <= 10);
    }

    #[test]
    fn break_replaces_space() {
        let out = wrap_all(11, &["hello world again"]);
        assert_eq!(out, "hello world\nagain");
    }

    #[test]
    fn word_that_would_overflow_gets_a_break() {
        // column 5, word of 6: 5 + 1 + 6 > 10
        let mut wrap = WordWrap::new(10);
        assert_eq!(wrap.wrap("abcde"), "abcde");
        assert_eq!(wrap.column(), 5);
        assert_eq!(wrap.wrap(" abcdef"), "\nabcdef");
        assert_eq!(wrap.column(), 6);
    }

    #[test]
    fn continuation_that_overflows_starts_new_line() {
        let mut wrap = WordWrap::new(8);
        assert_eq!(wrap.wrap("abcdef"), "abcdef");
        assert_eq!(wrap.wrap("ghi"), "\nghi");
    }

    #[test]
    fn newlines_reset_the_column() {
        let mut wrap = WordWrap::new(10);
        assert_eq!(wrap.wrap("one\ntwo"), "one\ntwo");
        assert_eq!(wrap.column(), 3);
        assert_eq!(wrap.wrap("\n"), "\n");
        assert_eq!(wrap.column(), 0);
    }

    #[test]
    fn overlong_word_at_line_start_is_emitted_whole() {
        let out = wrap_all(5, &["abcdefghij"]);
        assert_eq!(out, "abcdefghij");
    }

    #[test]
    fn stripping_breaks_recovers_words() {
        let fragments = ["The quick brown ", "fox jumps over the lazy dog ", "again and again"];
        let out = wrap_all(12, &fragments);
        let words = out.split_whitespace().collect::<Vec<_>>();
        let raw = fragments.concat();
        assert_eq!(words, raw.split_whitespace().collect::<Vec<_>>());
        assert!(widest_line(&out) <= 12);
    }

    #[test]
    fn every_three_way_split_keeps_text_and_width() {
        let text = "The quick brown fox jumps\nover the lazy dog and keeps  running far";
        let bounds = text
            .char_indices()
            .map(|(i, _)| i)
            .chain([text.len()])
            .collect::<Vec<_>>();
        let squeeze = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
        for width in 1..=30 {
            for (a, &i) in bounds.iter().enumerate() {
                for &j in &bounds[a..] {
                    let out = wrap_all(width, &[&text[..i], &text[i..j], &text[j..]]);
                    assert_eq!(squeeze(&out), squeeze(text), "width {width} split {i}/{j}");
                    for line in out.split('\n') {
                        assert!(
                            line.width() <= width || !line.contains(' '),
                            "width {width} split {i}/{j}: {line:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn wide_characters_use_display_width() {
        let mut wrap = WordWrap::new(6);
        assert_eq!(wrap.wrap("日本"), "日本");
        assert_eq!(wrap.column(), 4);
        assert_eq!(wrap.wrap(" 語"), "\n語");
    }
}
