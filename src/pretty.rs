use std::io::{self, Write};
use std::path::Path;

use crate::backend::Availability;
use crate::store::SummaryRow;
use crate::types::{ScanCommand, ScanOutcome, ScanRequest};

const SEPARATOR_WIDTH: usize = 70;
const PROMPT: &str = "osint > ";

pub fn prompt() {
    print!("{PROMPT}");
    let _ = io::stdout().flush();
}

pub fn clear_screen() {
    print!("\x1b[2J\x1b[H");
    let _ = io::stdout().flush();
}

pub fn print_banner() {
    println!(
        r"
╔══════════════════════════════════════════════════════════════╗
║                                                              ║
║                      OSINT TERMINAL                          ║
║                 Advanced Reconnaissance Tool                 ║
║                                                              ║
╚══════════════════════════════════════════════════════════════╝"
    );
    println!(
        "System: {} {} | Session: {}",
        std::env::consts::OS,
        std::env::consts::ARCH,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    println!();
}

pub fn clear_and_banner() {
    clear_screen();
    print_banner();
}

fn separator() {
    println!("{}", "─".repeat(SEPARATOR_WIDTH));
}

pub fn print_scan_started(request: &ScanRequest) {
    println!(
        "▶ started {} scan: {} {}",
        request.backend_kind().label().to_lowercase(),
        request.command.keyword(),
        request.target
    );
}

pub fn print_composite_started(class: &str, target: &str, steps: usize) {
    println!("▶ comprehensive {class} scan: {target} ({steps} steps)");
}

pub fn print_step_result(label: &str, succeeded: bool) {
    if succeeded {
        println!("  ✅ {label}");
    } else {
        println!("  ❌ {label}");
    }
}

/// Success or failure panel for one completed scan.
pub fn print_outcome(outcome: &ScanOutcome) {
    println!();
    if outcome.succeeded() {
        println!(
            "✅ {} scan complete: {} {}",
            outcome.backend.label(),
            outcome.command,
            outcome.target
        );
        separator();
        if outcome.output.is_empty() {
            println!("(no output)");
        } else {
            println!("{}", outcome.output);
        }
    } else {
        println!(
            "❌ {} scan failed ({}): {} {}",
            outcome.backend.label(),
            outcome.status.label(),
            outcome.command,
            outcome.target
        );
        separator();
        if let Some(detail) = &outcome.error {
            println!("{detail}");
        }
    }
    separator();
}

pub fn print_saved(path: &Path) {
    println!("results saved to: {}", path.display());
}

pub fn print_warning(message: &str) {
    println!("warning: {message}");
}

pub fn print_session(rows: &[SummaryRow]) {
    if rows.is_empty() {
        println!("No scan results in current session.");
        return;
    }
    println!("{:8} {:8} {:28} {:10} status", "type", "command", "target", "time");
    for row in rows {
        println!(
            "{:8} {:8} {:28} {:10} {}",
            row.backend, row.command, row.target, row.time, row.status
        );
    }
}

pub fn print_availability(availability: &Availability) {
    println!("Checking scanner availability...");
    let line = |name: &str, ok: bool| {
        if ok {
            println!("  ✅ {name}: ready");
        } else {
            println!("  ❌ {name}: not found");
        }
    };
    line("native scanner", availability.native);
    line("advanced scanner", availability.script);
}

pub fn print_help() {
    println!("commands:");
    println!("{:26} {:8} description", "usage", "type");
    separator();
    for command in ScanCommand::ALL {
        println!(
            "{:26} {:8} {}",
            command.usage(),
            command.backend_kind().label(),
            command.description()
        );
    }
    separator();
    println!("{:26} {:8} show current session results", "session", "");
    println!("{:26} {:8} export session results to one document", "export", "");
    println!("{:26} {:8} clear terminal and redraw banner", "clear", "");
    println!("{:26} {:8} show this command reference", "help", "");
    println!("{:26} {:8} exit the terminal", "exit", "");
    println!();
    println!("examples:");
    println!("  adv john_doe           advanced scan for one username");
    println!("  fscn example.com       full domain reconnaissance");
    println!("  iplc 8.8.8.8           IP geolocation lookup");
}
