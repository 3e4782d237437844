use anyhow::{Result, anyhow};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use crate::app_config::Config;
use crate::capability::{CapabilityProbe, HostProbe};
use crate::engine::ollama::OllamaLoader;
use crate::engine::{LoadProgress, ProgressCallback};
use crate::language_utils;
use crate::translation::{TranslationEvent, TranslationService};

// @module: Application controller for the translation workflow

/// Main application controller for streaming translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Host capability predicate, injected by the shell
    probe: Box<dyn CapabilityProbe>,
    // @field: Translation service with the lazily loaded engine
    service: Arc<TranslationService>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let loader = Arc::new(OllamaLoader::new(&config.engine));
        let service = Arc::new(TranslationService::new(loader));
        Ok(Self {
            config,
            probe: Box::new(HostProbe),
            service,
        })
    }

    /// Create a controller from explicit parts, for tests and embedding hosts
    pub fn with_parts(
        config: Config,
        probe: Box<dyn CapabilityProbe>,
        service: Arc<TranslationService>,
    ) -> Self {
        Self {
            config,
            probe,
            service,
        }
    }

    /// Check if the controller is properly initialized with configuration
    pub fn is_initialized(&self) -> bool {
        !self.config.engine.model.is_empty() && !self.config.engine.endpoint.is_empty()
    }

    /// Translate a text and stream the result to stdout
    pub async fn run_text(&self, text: &str) -> Result<()> {
        // The capability gate runs once, before any load attempt
        let report = self.probe.check()?;
        debug!(
            "Host environment: {}/{}, {} logical cores",
            report.os,
            report.arch,
            report.cpu_count.unwrap_or(0)
        );

        let direction = self.config.direction;
        let source = language_utils::get_language_name(direction.source_code())?;
        let target = language_utils::get_language_name(direction.target_code())?;
        info!("Translating {} to {}", source, target);

        if !self.service.is_loaded() {
            match self.service.is_model_cached().await {
                Ok(true) => info!("Model found in the local store"),
                Ok(false) => info!("Model not in the local store yet, weights will be fetched"),
                Err(e) => debug!("Could not query the model store: {}", e),
            }
        }

        let progress_bar = self.create_load_progress_bar();
        let progress = Self::progress_callback(&progress_bar);

        // Ctrl-C while the stream is in flight becomes an advisory interrupt
        let interrupt_service = Arc::clone(&self.service);
        let ctrl_c = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                interrupt_service.interrupt();
            }
        });

        let start_time = Instant::now();
        let mut stream = self
            .service
            .translate_streaming(text, direction, progress)
            .await;
        progress_bar.finish_and_clear();

        let mut stdout = std::io::stdout();
        let mut failed = None;

        while let Some(event) = stream.next().await {
            match event {
                Ok(TranslationEvent::Fragment(fragment)) => {
                    stdout.write_all(fragment.as_bytes())?;
                    stdout.flush()?;
                }
                Ok(TranslationEvent::Completed { text }) => {
                    if !text.ends_with('\n') {
                        stdout.write_all(b"\n")?;
                    }
                    debug!("Translated {} characters", text.chars().count());
                }
                Err(e) => {
                    // The request is over; from the caller's perspective the
                    // error text replaces whatever was already printed.
                    stdout.write_all(b"\n")?;
                    failed = Some(e);
                    break;
                }
            }
        }
        ctrl_c.abort();

        if let Some(error) = failed {
            return Err(anyhow!("{}", error));
        }

        info!(
            "Translation completed in {}",
            Self::format_duration(start_time.elapsed())
        );
        if let Some(stats) = self.service.runtime_stats() {
            info!("Performance: {}", stats);
        }
        Ok(())
    }

    /// Report the host environment and the engine state
    pub async fn run_status(&self) -> Result<()> {
        let report = self.probe.probe();

        println!("Host: {}/{}", report.os, report.arch);
        if let Some(cores) = report.cpu_count {
            println!("Logical cores: {}", cores);
        }
        match &report.reason {
            None => println!("Local inference: supported"),
            Some(reason) => println!("Local inference: unsupported ({})", reason),
        }

        println!("Engine endpoint: {}", self.config.engine.endpoint);
        println!("Model: {}", self.config.engine.model);
        match self.service.is_model_cached().await {
            Ok(true) => println!("Model in local store: yes"),
            Ok(false) => println!("Model in local store: no (first translation will fetch it)"),
            Err(e) => {
                warn!("Engine server not reachable: {}", e);
                println!("Engine server: unreachable");
            }
        }

        Ok(())
    }

    // @returns: Hidden-until-used progress bar for the engine load
    fn create_load_progress_bar(&self) -> ProgressBar {
        let progress_bar = ProgressBar::new(100);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{bar:40.cyan/blue} {percent:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        progress_bar
    }

    // @returns: Callback mapping load reports onto the progress bar
    fn progress_callback(progress_bar: &ProgressBar) -> ProgressCallback {
        let progress_bar = progress_bar.clone();
        Arc::new(move |report: LoadProgress| {
            progress_bar.set_position((report.fraction * 100.0) as u64);
            progress_bar.set_message(report.status);
        })
    }

    // @returns: Duration formatted as h/m/s
    fn format_duration(duration: std::time::Duration) -> String {
        let total_secs = duration.as_secs();
        let hours = total_secs / 3600;
        let minutes = (total_secs % 3600) / 60;
        let seconds = total_secs % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
