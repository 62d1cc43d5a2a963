use std::future::Future;
use std::time::{Duration, Instant};

use dayline_core::progress::CosmeticProgress;
use indicatif::{ProgressBar, ProgressStyle};

pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["-", "\\", "|", "/"])
        .template("{msg} {spinner}")
    {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

pub fn create_progress_bar(message: String) -> ProgressBar {
    let bar = ProgressBar::new(u64::from(CosmeticProgress::COMPLETE));
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{msg} [{bar:30}] {pos:>3}%")
        .map(|style| style.progress_chars("#>-"))
    {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar
}

/// Await `future` behind a progress bar that advances with waiting time.
pub async fn with_progress<F: Future>(message: &str, future: F) -> F::Output {
    let progress = CosmeticProgress::default();
    let bar = create_progress_bar(message.to_string());
    let started = Instant::now();
    let mut ticker = tokio::time::interval(progress.step());

    tokio::pin!(future);
    let output = loop {
        tokio::select! {
            output = &mut future => break output,
            _ = ticker.tick() => {
                bar.set_position(u64::from(progress.percent_at(started.elapsed())));
            }
        }
    };

    bar.set_position(u64::from(CosmeticProgress::COMPLETE));
    bar.finish_and_clear();
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_the_future_output() {
        let value = with_progress("Loading", async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            42
        })
        .await;
        assert_eq!(value, 42);
    }
}
