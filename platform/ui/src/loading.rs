use std::{
    future::Future,
    io::{self, IsTerminal},
    time::Duration,
};

use indicatif::{ProgressBar, ProgressStyle};

const TICK: Duration = Duration::from_millis(80);

/// Spinner on stderr while a page waits on data. Hidden when stderr is not a
/// terminal so piped output stays clean. Cleared on drop.
pub struct LoadingState {
    bar: ProgressBar,
}

impl LoadingState {
    pub fn start(message: impl Into<String>) -> Self {
        let bar = if io::stderr().is_terminal() {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        Self::with_bar(bar, message.into())
    }

    pub fn hidden(message: impl Into<String>) -> Self {
        Self::with_bar(ProgressBar::hidden(), message.into())
    }

    fn with_bar(bar: ProgressBar, message: String) -> Self {
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(message);
        if !bar.is_hidden() {
            bar.enable_steady_tick(TICK);
        }
        Self { bar }
    }

    pub fn message(&self) -> String {
        self.bar.message()
    }

    pub fn set_message(&self, message: impl Into<String>) {
        self.bar.set_message(message.into());
    }

    /// Show a spinner for as long as `work` is pending.
    pub async fn wrap<F>(message: impl Into<String>, work: F) -> F::Output
    where
        F: Future,
    {
        let _loading = Self::start(message);
        work.await
    }
}

impl Drop for LoadingState {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_can_change_while_loading() {
        let loading = LoadingState::hidden("Loading team");
        assert_eq!(loading.message(), "Loading team");
        loading.set_message("Loading team (slow network)");
        assert_eq!(loading.message(), "Loading team (slow network)");
    }

    #[tokio::test(start_paused = true)]
    async fn wrap_returns_the_output() {
        let value = LoadingState::wrap("Loading dashboard", async {
            tokio::time::sleep(Duration::from_millis(250)).await;
            42
        })
        .await;
        assert_eq!(value, 42);
    }
}
