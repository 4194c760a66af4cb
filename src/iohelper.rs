/**
 * Output helpers. Writes to standard output go through `my_println!` and `my_print!` so
 * that a closed pipe surfaces as a `PracticeError` instead of a panic.
 */
use std::io::Write;

use weakest_link::common::{PracticeError, Result};

#[macro_export]
macro_rules! my_println {
    ($($arg:tt)*) => (
        writeln!(std::io::stdout(), $($arg)*).map_err(PracticeError::Io)
    );
}

#[macro_export]
macro_rules! my_print {
    ($($arg:tt)*) => (
        write!(std::io::stdout(), $($arg)*).map_err(PracticeError::Io)
    );
}

/// Print `text` wrapped to the width of the terminal, with every line starting with
/// `indent`.
pub fn print_indented(text: &str, indent: &str) -> Result<()> {
    let width = textwrap::termwidth().saturating_sub(indent.len()).max(20);
    for line in textwrap::wrap_iter(text, width) {
        my_println!("{}{}", indent, line)?;
    }
    Ok(())
}
