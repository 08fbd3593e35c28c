use colored::{ColoredString, Colorize};

/// Color a response time by how painful it is to wait for.
#[must_use]
pub fn colorize_millis(value: f64) -> ColoredString {
    let text = format!("{value:.1} ms");
    if value >= 5000.0 {
        text.red().bold()
    } else if value >= 1000.0 {
        text.yellow()
    } else {
        text.green()
    }
}

/// Color a success rate: green when healthy, red when the process is
/// mostly down.
#[must_use]
pub fn colorize_rate(value: f64) -> ColoredString {
    let text = format!("{value:.1}%");
    if value >= 99.0 {
        text.green()
    } else if value >= 90.0 {
        text.yellow()
    } else {
        text.red().bold()
    }
}

pub fn print_section_header(title: &str) {
    println!("{}", title.bold().cyan());
    let display_width = title.chars().count();
    println!("{}", "─".repeat(display_width).cyan());
}
