//! Argbind CLI
//!
//! Binary name: `argbind`

use std::{process, sync::Arc};

use argbind::{cli, dispatch::EchoDispatcher};
use argbind_core::{config, Engine};

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays machine-readable
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let engine = match config::load_config().and_then(Engine::load) {
        Ok(engine) => Arc::new(engine),
        Err(err) => {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("Error: {err}");
                if let Some(hint) = err.suggestion() {
                    eprintln!("Hint: {hint}");
                }
            }
            #[allow(clippy::exit)]
            process::exit(err.exit_code());
        }
    };

    let matches = cli::build_cli(engine.registry()).get_matches();
    let code = match cli::handlers::dispatch(&matches, engine, Arc::new(EchoDispatcher)).await {
        Ok(code) => code,
        Err(err) => {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("Error: {}", cli::handlers::format_error(&err));
            }
            cli::handlers::get_exit_code(&err)
        }
    };

    #[allow(clippy::exit)]
    process::exit(code);
}
