//! Console output utilities.

use std::path::Path;

use console::style;

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("OK").green().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════════════════╗
║     Schoology Photos                                  ║
║     Mirror section albums to a local photo tree       ║
╚═══════════════════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// Print configuration summary.
pub fn print_config_summary(photos_dir: &Path, state_file: &Path, api_base: &str) {
    println!();
    println!("{}", style("Configuration:").bold());
    println!("  Photos:    {}", photos_dir.display());
    println!("  State:     {}", state_file.display());
    println!("  API:       {}", api_base);
    println!();
}
