use colored::Colorize;
use krmgen_core::{MergeRecord, Severity};

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Result records go to stderr; stdout carries the ResourceList.
pub fn print_record(record: &MergeRecord) {
    let tag = match record.severity {
        Severity::Info => "info".green(),
        Severity::Error => "error".red(),
    };
    eprintln!("[{tag}] {}", record.message);
}
