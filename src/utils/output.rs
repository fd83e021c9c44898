use colored::*;

pub struct OutputStyle;

impl OutputStyle {
    pub fn header(text: &str) -> ColoredString {
        text.bold()
    }

    pub fn label(text: &str) -> ColoredString {
        text.cyan()
    }

    pub fn success(text: &str) -> ColoredString {
        text.green()
    }

    pub fn warning(text: &str) -> ColoredString {
        text.yellow()
    }

    pub fn error(text: &str) -> ColoredString {
        text.red()
    }

    pub fn muted(text: &str) -> ColoredString {
        text.bright_black()
    }

    pub fn info(text: &str) -> ColoredString {
        text.bright_cyan()
    }
}

pub fn print_warning(message: &str) {
    println!("⚠️  {}", OutputStyle::warning(message));
}

pub fn print_success(message: &str) {
    println!("✅ {}", OutputStyle::success(message));
}
