//! `tapestry validate-url <url>`: print "valid" or fail with the rejection.

use anyhow::Result;
use std::io::Write;
use tapestry_core::url_guard;

pub fn run_validate_url(out: &mut impl Write, url: &str) -> Result<()> {
    let validated = url_guard::validate(url)?;
    for warning in validated.warnings() {
        eprintln!("Warning: {warning}");
    }
    writeln!(out, "valid")?;
    Ok(())
}
