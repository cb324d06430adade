use crate::diagnostics::Diagnostic;
use crate::ui::{Icons, Tone};

pub fn header(text: &str) {
    println!("{} {}", Icons::ROCKET, Tone::Heading.paint(text));
}

pub fn status(icon: &str, label: &str, value: &str) {
    println!("{} {}: {}", icon, Tone::Label.paint(label), value);
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, Tone::Success.paint(label));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, Tone::Caution.paint(label));
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", Tone::Heading.paint(title));
}

/// One diagnostic line; configuration problems are shown as errors.
pub fn diagnostic(diagnostic: &Diagnostic) {
    let text = diagnostic.to_string();
    if diagnostic.is_configuration() {
        eprintln!("  {} {}", Icons::CROSS, Tone::Failure.paint(&text));
    } else {
        eprintln!("  {} {}", Icons::WARN, Tone::Caution.paint(&text));
    }
}
