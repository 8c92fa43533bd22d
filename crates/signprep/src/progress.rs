use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Builds the progress bars shown on stderr while processing search
/// trials.
pub(crate) struct ProgressBarBuilder {
    template: &'static str,
    len: u64,
    quiet: bool,
}

impl ProgressBarBuilder {
    pub(crate) fn new(template: &'static str, len: u64, quiet: bool) -> Self {
        Self {
            template,
            len,
            quiet,
        }
    }

    pub(crate) fn build(self) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }

        let style = ProgressStyle::with_template(self.template)
            .unwrap_or_else(|_| ProgressStyle::default_bar());

        let pbar = ProgressBar::new(self.len);
        pbar.set_draw_target(ProgressDrawTarget::stderr_with_hz(4));
        pbar.with_style(style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_with_length() {
        let pbar = ProgressBarBuilder::new("{pos}/{len}", 42, false).build();
        assert_eq!(pbar.length(), Some(42));
        assert_eq!(pbar.position(), 0);
    }

    #[test]
    fn build_quiet() {
        let pbar = ProgressBarBuilder::new("{pos}/{len}", 42, true).build();
        assert!(pbar.is_hidden());
    }
}
