mod build;
mod cli;
mod render;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub fn run(args: Vec<String>) -> anyhow::Result<()> {
    init_tracing();
    let cmd = cli::parse_args(&args)?;
    let output = match cmd {
        cli::Command::Help(topic) => {
            cli::print_help(topic);
            return Ok(());
        }
        cli::Command::Render(args) => render::run(&args)?,
        cli::Command::Build(args) => build::run(&args)?,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable.
/// `SQLROW_LOG=sqlrow_cli=debug` shows each generated statement.
fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("SQLROW_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
