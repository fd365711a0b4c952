//! dstat: print a system status line every tick.
//!
//! The line goes to standard output and, unless disabled, into the
//! terminal window title.

use anyhow::Result;
use clap::Parser;

use dstat::args::{Args, version_banner};
use dstat::config::DstatConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.wants_version() {
        println!("{}", version_banner());
        return Ok(());
    }

    let mut config = DstatConfig::load(args.config.as_deref())?;
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    dstat_common::init_tracing(&config.logging)?;

    run(args.interface, config).await
}

#[cfg(target_os = "linux")]
async fn run(interface: String, config: DstatConfig) -> Result<()> {
    use anyhow::Context;
    use dstat::battery::AlertDisplay;
    use dstat::config::AlertBackend;
    use dstat::display::{LineOutput, LogAlert, TerminalTitle, TtyAlert};
    use dstat::linux;
    use dstat::poller::PollLoop;
    use tracing::warn;

    if let Err(e) = linux::lower_priority(config.nice) {
        warn!(nice = config.nice, error = %e, "Failed to lower priority");
    }

    let sources =
        linux::sources(&config.audio.control).context("Failed to open metric sources")?;

    let alert: Box<dyn AlertDisplay> = match config.battery.alert {
        AlertBackend::Tty => match TtyAlert::open() {
            Ok(tty) => Box::new(tty),
            Err(e) => {
                warn!(error = %e, "No terminal for battery alerts, logging them instead");
                Box::new(LogAlert)
            }
        },
        AlertBackend::Log => Box::new(LogAlert),
    };

    let mut output = LineOutput::new(std::io::stdout(), config.output.format);
    if config.output.title {
        let title = TerminalTitle::open().context("Failed to open terminal for title")?;
        output = output.with_title(Box::new(title));
    }

    let poll = PollLoop::new(interface, &config, sources, alert);
    poll.run(output).await?;

    Ok(())
}

#[cfg(not(target_os = "linux"))]
async fn run(_interface: String, _config: DstatConfig) -> Result<()> {
    anyhow::bail!("no metric sources available for this platform")
}
