//! Output tones
//!
//! Every line the CLI prints carries a [`Tone`]. Color is applied only when
//! the stream that tone is written to allows it (`console` honors
//! `NO_COLOR`/`CLICOLOR` and tty detection per stream).

use owo_colors::{OwoColorize, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Heading,
    Label,
    Success,
    Caution,
    Failure,
}

impl Tone {
    pub fn style(self) -> Style {
        match self {
            Tone::Heading => Style::new().cyan().bold(),
            Tone::Label => Style::new().dimmed(),
            Tone::Success => Style::new().green().bold(),
            Tone::Caution => Style::new().yellow(),
            Tone::Failure => Style::new().red().bold(),
        }
    }

    /// Cautions and failures go to stderr, everything else to stdout.
    pub fn on_stderr(self) -> bool {
        matches!(self, Tone::Caution | Tone::Failure)
    }

    /// Style `text` if the tone's stream accepts colors.
    pub fn paint(self, text: &str) -> String {
        let colored = if self.on_stderr() {
            console::colors_enabled_stderr()
        } else {
            console::colors_enabled()
        };
        self.paint_with(text, colored)
    }

    fn paint_with(self, text: &str, colored: bool) -> String {
        if colored {
            text.style(self.style()).to_string()
        } else {
            text.to_string()
        }
    }
}
