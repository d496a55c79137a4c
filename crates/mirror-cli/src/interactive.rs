//! Waiting for the operator to stop the scheduler

use std::io::BufRead;

/// Why [`wait_for_exit`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitSignal {
    /// The operator pressed Enter or typed an exit word
    Requested,
    /// Standard input reached end of file or failed
    InputClosed,
}

/// Block until the operator asks to exit.
///
/// An empty line, `exit`, `quit` or `q` (any case) requests exit. Other
/// input is ignored.
pub fn wait_for_exit(mut input: impl BufRead) -> ExitSignal {
    let mut line = String::new();
    loop {
        line.clear();
        match input.read_line(&mut line) {
            Ok(0) => return ExitSignal::InputClosed,
            Ok(_) => {
                let word = line.trim().to_ascii_lowercase();
                if matches!(word.as_str(), "" | "exit" | "quit" | "q") {
                    return ExitSignal::Requested;
                }
                tracing::debug!(input = %word, "Ignoring input; press Enter to exit");
            }
            Err(e) => {
                tracing::debug!(error = %e, "Could not read standard input");
                return ExitSignal::InputClosed;
            }
        }
    }
}
