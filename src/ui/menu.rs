//! Single-key choice menus.

use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};

/// Prompts until the user enters one of the option keys.
///
/// Input is matched case-insensitively on its first character, so `accept`
/// selects `a`. End of input is an error.
pub fn prompt_choice<R, W>(
    reader: &mut R,
    writer: &mut W,
    title: &str,
    options: &[(char, &str)],
) -> Result<char>
where
    R: BufRead + ?Sized,
    W: Write + ?Sized,
{
    if options.is_empty() {
        bail!("No menu options to choose from");
    }

    let keys: Vec<String> = options.iter().map(|(key, _)| key.to_string()).collect();
    loop {
        writeln!(writer, "{title}")?;
        for (key, label) in options {
            writeln!(writer, "  [{key}] {label}")?;
        }
        write!(writer, "Choice [{}]: ", keys.join("/"))?;
        writer.flush()?;

        let mut input = String::new();
        let bytes = reader
            .read_line(&mut input)
            .context("Failed to read menu choice")?;
        if bytes == 0 {
            bail!("Input closed before a choice was made");
        }

        let choice = input.trim().chars().next().map(|c| c.to_ascii_lowercase());
        if let Some(key) = choice.filter(|c| options.iter().any(|(k, _)| k == c)) {
            return Ok(key);
        }

        writeln!(writer, "Invalid choice. Please enter one of: {}", keys.join(", "))?;
    }
}
