//! Interactive prompts for the two binaries. Plain `std::io::stdin()`
//! only — the teacher's own `zrc-demo` has no CLI-argument crate either
//! (it parses `std::env::args()` by hand), so this matches rather than
//! reaching for `clap`/`dialoguer` for a CLI surface spec.md §1 places out
//! of scope. There is no password masking for the same reason: that needs
//! `rpassword`, a dependency the corpus never reaches for.

use std::io::{self, Write};

pub fn prompt(label: &str, default: Option<&str>) -> io::Result<String> {
    match default {
        Some(d) => print!("{label} [{d}]: "),
        None => print!("{label}: "),
    }
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let trimmed = line.trim();

    if trimmed.is_empty() {
        Ok(default.unwrap_or("").to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn prompt_port(label: &str) -> anyhow::Result<u16> {
    loop {
        let raw = prompt(label, None)?;
        match raw.parse::<u16>() {
            Ok(0) => eprintln!("port must be between 1 and 65535"),
            Ok(port) => return Ok(port),
            Err(_) => eprintln!("'{raw}' is not a valid port number"),
        }
    }
}

pub fn prompt_password(label: &str) -> io::Result<Vec<u8>> {
    let line = prompt(label, None)?;
    Ok(line.into_bytes())
}
