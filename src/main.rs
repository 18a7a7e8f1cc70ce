mod cli;

use stash_haptics::{
    cache::PatternCache,
    config, convert,
    host::HostClient,
    plugin::{self, Mode},
    processor::Processor,
    provider,
};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick a default based on the
    // verbose flag. Logs go to stderr; stdout belongs to the host protocol.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "stash_haptics=debug".to_string()
        } else {
            "stash_haptics=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Convert {
            pattern,
            output,
            title,
            duration,
        }) => convert_file(&pattern, output.as_deref(), &title, duration),
        None => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_plugin())
        }
    }
}

/// Plugin mode: read the invocation payload from stdin, run the requested
/// task, reply on stdout.
async fn run_plugin() -> Result<()> {
    let input =
        plugin::read_input(std::io::stdin().lock()).context("Failed to read plugin input")?;

    match input.args.mode()? {
        Mode::Disable => {
            tracing::info!("Plugin disabled, nothing to do");
            plugin::write_output(std::io::stdout().lock(), serde_json::json!("disabled"))?;
            return Ok(());
        }
        Mode::Download => {}
    }

    if let Some(ref hook) = input.args.hook_context {
        tracing::debug!(
            hook_type = hook.hook_type.as_deref().unwrap_or("unknown"),
            "Invoked from hook, running full pass"
        );
    }

    let plugin_dir = &input.server_connection.plugin_dir;
    tracing::info!(plugin_dir = %plugin_dir.display(), "Plugin starting");

    let config = config::load_config_or_default(plugin_dir)?;
    let cache = PatternCache::new(plugin_dir);
    cache.ensure().context("Failed to create cache directory")?;

    let host = HostClient::new(&input.server_connection);
    let processor = Processor::new(&config, host, cache)?;

    match processor.run(plugin::log_progress).await {
        Ok(summary) => {
            plugin::write_output(std::io::stdout().lock(), serde_json::to_value(&summary)?)?;
            Ok(())
        }
        Err(e) => {
            plugin::write_error(std::io::stdout().lock(), &e.to_string())?;
            Err(e.into())
        }
    }
}

/// Standalone mode: convert a single raw pattern file to a funscript.
fn convert_file(
    pattern: &std::path::Path,
    output: Option<&std::path::Path>,
    title: &str,
    duration_secs: f64,
) -> Result<()> {
    let raw = std::fs::read_to_string(pattern)
        .with_context(|| format!("Failed to read pattern file: {:?}", pattern))?;
    let events = provider::parse_events(&raw)?;

    let script = convert::convert(
        title,
        convert::duration_ms_from_secs(duration_secs),
        &events,
    );

    let output = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| pattern.with_extension("funscript"));
    std::fs::write(&output, serde_json::to_string(&script)?)
        .with_context(|| format!("Failed to write funscript: {:?}", output))?;

    println!(
        "Wrote {} actions to {}",
        script.actions.len(),
        output.display()
    );
    Ok(())
}
