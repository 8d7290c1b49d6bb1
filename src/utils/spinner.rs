//! Terminal activity indicator shown while a model request is in flight.

use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Frames cycled by the steady tick; the last one is shown once finished.
const TICK_CHARS: &str = "|/-\\ ";

/// Handle to a running spinner.
///
/// The steady tick is shut down by [`Spinner::stop`] or on drop, and the
/// spinner line is cleared before either returns.
pub struct Spinner {
    bar: Option<ProgressBar>,
}

impl Spinner {
    /// Starts a spinner on stderr.
    ///
    /// Only animates when stderr is a terminal that is not `TERM=dumb`;
    /// otherwise prints `text...` once.
    pub fn start(text: &str, interval: Duration) -> Self {
        let stderr = io::stderr();
        let dumb = std::env::var("TERM").is_ok_and(|term| term == "dumb");
        if stderr.is_terminal() && !dumb {
            Self::with_target(ProgressDrawTarget::stderr(), text, interval)
        } else {
            announce(&mut stderr.lock(), text);
            Self { bar: None }
        }
    }

    /// Starts a spinner drawing to `target`.
    pub fn with_target(target: ProgressDrawTarget, text: &str, interval: Duration) -> Self {
        let bar = ProgressBar::with_draw_target(None, target);
        bar.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars(TICK_CHARS),
        );
        bar.set_message(text.to_string());
        bar.enable_steady_tick(interval);
        Self { bar: Some(bar) }
    }

    /// Stops the spinner and clears its line.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// One-line notice used instead of an animation.
fn announce<W: Write>(writer: &mut W, text: &str) {
    let _ = writeln!(writer, "{text}...");
    let _ = writer.flush();
}
