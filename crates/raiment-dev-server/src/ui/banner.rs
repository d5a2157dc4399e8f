//! Startup banner.

use owo_colors::{OwoColorize, Stream::Stderr};
use std::path::Path;

/// Everything the startup banner reports.
#[derive(Debug, Clone, Copy)]
pub struct Banner<'a> {
    pub title: &'a str,
    pub url: &'a str,
    pub out_dir: &'a Path,
    pub timestamp_file: &'a Path,
}

impl Banner<'_> {
    /// Platform string shown in the banner, e.g. `linux-x86_64`.
    pub fn platform() -> String {
        format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Render the banner as plain lines, without colour.
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("{} running at {}", self.title, self.url),
            format!("platform: {}", Self::platform()),
            format!("serving:  {}", self.out_dir.display()),
            format!("watching: {}", self.timestamp_file.display()),
        ]
    }
}

/// Print the banner and the production warning to stderr.
pub fn print_banner(banner: &Banner<'_>) {
    eprintln!();
    for (i, line) in banner.lines().iter().enumerate() {
        if i == 0 {
            eprintln!("  {}", line.if_supports_color(Stderr, |t| t.bold()));
        } else {
            eprintln!("  {}", line.if_supports_color(Stderr, |t| t.dimmed()));
        }
    }
    eprintln!();
    super::warning("This is a development server. It is not hardened for production use.");
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_lines() {
        let banner = Banner {
            title: "raiment-dev-server",
            url: "http://127.0.0.1:7000",
            out_dir: Path::new("dist"),
            timestamp_file: Path::new("dist/.build-timestamp"),
        };

        let lines = banner.lines();
        assert_eq!(lines[0], "raiment-dev-server running at http://127.0.0.1:7000");
        assert!(lines[1].contains(std::env::consts::OS));
        assert!(lines[2].ends_with("dist"));
        assert!(lines[3].ends_with(".build-timestamp"));
    }
}
