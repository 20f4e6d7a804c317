use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaughtError {
    pub message: String,
    pub panicked: bool,
}

/// Guards one subtree of the screen. A render that returns an error or panics
/// trips the boundary; from then on only the fallback is shown, until
/// [`ErrorBoundary::reload`].
#[derive(Debug)]
pub struct ErrorBoundary {
    label: &'static str,
    show_details: bool,
    caught: Option<CaughtError>,
}

impl ErrorBoundary {
    /// `show_details` puts the raw error text on the fallback screen.
    pub fn new(label: &'static str, show_details: bool) -> Self {
        Self {
            label,
            show_details,
            caught: None,
        }
    }

    pub fn render<F>(&mut self, view: F) -> String
    where
        F: FnOnce() -> anyhow::Result<String>,
    {
        if self.caught.is_none() {
            let caught = match catch_unwind(AssertUnwindSafe(view)) {
                Ok(Ok(output)) => return output,
                Ok(Err(err)) => CaughtError {
                    message: format!("{err:#}"),
                    panicked: false,
                },
                Err(payload) => CaughtError {
                    message: panic_message(payload.as_ref()),
                    panicked: true,
                },
            };
            error!(
                boundary = self.label,
                panicked = caught.panicked,
                error = %caught.message,
                "render failed; showing fallback"
            );
            self.caught = Some(caught);
        }
        self.fallback()
    }

    pub fn is_tripped(&self) -> bool {
        self.caught.is_some()
    }

    pub fn caught(&self) -> Option<&CaughtError> {
        self.caught.as_ref()
    }

    /// Reset the boundary, the equivalent of a full page reload.
    pub fn reload(&mut self) {
        self.caught = None;
    }

    fn fallback(&self) -> String {
        let mut out = String::from(
            "Something went wrong\n\
             An unexpected error stopped this page from rendering.\n\
             Reload the page, or go back to the homepage if it keeps happening.\n\
             \n  [r] Reload page    [h] Go to homepage\n",
        );
        if let Some(caught) = self.caught.as_ref().filter(|_| self.show_details) {
            out.push_str("\nError details (development only):\n  ");
            out.push_str(&caught.message);
            out.push('\n');
        }
        out
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
