use anyhow::Result;
use std::io::Write;
use tapestry_core::sanitize::sanitize_filename;

pub fn run_sanitize_filename(out: &mut impl Write, name: &str, max_length: usize) -> Result<()> {
    writeln!(out, "{}", sanitize_filename(name, max_length))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_sanitized_name() {
        let mut out = Vec::new();
        run_sanitize_filename(&mut out, "My Video: Part 1/2?", 100).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "My Video- Part 1_2\n");
    }

    #[test]
    fn respects_max_length() {
        let mut out = Vec::new();
        run_sanitize_filename(&mut out, &"A".repeat(200), 50).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim_end().len(), 50);
    }
}
