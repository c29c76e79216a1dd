//! User confirmation prompt for rename operations.
//!
//! Displays a plan of what will be changed and waits for confirmation.
//! Skipped with `--force` or `--dry-run`.

use crate::error::Result;
use crate::steps::rename::RenameArgs;
use colored::Colorize;
use std::io::{BufRead, Write};

/// Prompts for confirmation before executing the rename.
///
/// `plan` is the list of staged operations, one line each.
///
/// # Returns
///
/// - `Ok(true)` if the answer is `y` (any case) or the prompt is skipped
/// - `Ok(false)` on any other answer, including end of input
///
/// # Errors
///
/// Returns `Err` only on I/O errors.
pub fn confirm_operation<R: BufRead, W: Write>(
    args: &RenameArgs,
    plan: &[String],
    input: &mut R,
    output: &mut W,
) -> Result<bool> {
    if args.force || args.dry_run {
        return Ok(true);
    }

    writeln!(output, "\n{}", "Rename Plan:".bold().cyan())?;
    writeln!(
        output,
        "  {} {} → {}",
        "Submodule:".bold(),
        args.old_name.yellow(),
        args.new_name.green()
    )?;
    for step in plan {
        writeln!(output, "  {} {}", "✓".green(), step)?;
    }
    writeln!(
        output,
        "\n  {} No rollback: an interruption part-way leaves the submodule partially renamed.",
        "⚠".yellow().bold()
    )?;
    writeln!(output)?;

    write!(output, "{} {} ", "Continue?".bold(), "(y/N)".dimmed())?;
    output.flush()?;

    let mut response = String::new();
    input.read_line(&mut response)?;

    let confirmed = response.trim().eq_ignore_ascii_case("y");
    if !confirmed {
        log::info!("Rename cancelled by user");
    }

    Ok(confirmed)
}
