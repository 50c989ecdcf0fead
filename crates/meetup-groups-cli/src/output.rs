//! Terminal output: colors, symbols, and a compact group table.

use meetup_groups::GroupRecord;
use serde::Serialize;
use std::io::IsTerminal;

/// Color is on for a terminal unless `NO_COLOR` or `MEETUP_NO_COLOR` is set.
pub fn color_enabled() -> bool {
    if std::env::var_os("NO_COLOR").is_some() || std::env::var_os("MEETUP_NO_COLOR").is_some() {
        return false;
    }
    std::io::stderr().is_terminal()
}

const CYAN: &str = "\x1b[36m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Colored string builder.
pub struct Styled {
    use_color: bool,
}

impl Default for Styled {
    fn default() -> Self {
        Self::new()
    }
}

impl Styled {
    pub fn new() -> Self {
        Self {
            use_color: color_enabled(),
        }
    }

    pub fn plain() -> Self {
        Self { use_color: false }
    }

    pub fn ok_sym(&self) -> &'static str {
        if self.use_color {
            "\x1b[32m\u{2713}\x1b[0m"
        } else {
            "OK"
        }
    }

    pub fn warn_sym(&self) -> &'static str {
        if self.use_color {
            "\x1b[33m\u{26a0}\x1b[0m"
        } else {
            "??"
        }
    }

    fn paint(&self, code: &str, s: &str) -> String {
        if self.use_color {
            format!("{code}{s}{RESET}")
        } else {
            s.to_string()
        }
    }

    pub fn cyan(&self, s: &str) -> String {
        self.paint(CYAN, s)
    }

    pub fn dim(&self, s: &str) -> String {
        self.paint(DIM, s)
    }

    pub fn bold(&self, s: &str) -> String {
        self.paint(BOLD, s)
    }
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) {
    if let Ok(s) = serde_json::to_string_pretty(value) {
        println!("{s}");
    }
}

/// One-line summary of a group.
pub fn group_line(s: &Styled, group: &GroupRecord) -> String {
    let location = match (group.latitude, group.longitude) {
        (Some(lat), Some(lon)) => format!("{lat:.4}, {lon:.4}"),
        _ => "-".to_string(),
    };
    let traits = if group.top_traits.is_empty() {
        "-".to_string()
    } else {
        group.top_traits.join(", ")
    };
    format!(
        "{:>4}  {:>2} users  {:<36}  {}",
        s.bold(&format!("#{}", group.group_id)),
        group.users.len(),
        traits,
        s.dim(&location)
    )
}

/// Print at most `limit` groups, then a count of the rest.
pub fn print_groups(s: &Styled, groups: &[GroupRecord], limit: usize) {
    for group in groups.iter().take(limit) {
        eprintln!("  {}", group_line(s, group));
    }
    if groups.len() > limit {
        eprintln!("  {}", s.dim(&format!("... {} more", groups.len() - limit)));
    }
}
