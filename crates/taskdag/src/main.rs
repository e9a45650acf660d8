//! taskdag CLI entry point

// CLI binary needs to output to stdout/stderr
#![allow(clippy::print_stdout, clippy::print_stderr)]

use taskdag::cli;
use taskdag::errors::{EXIT_OK, exit_code_for, render_error};
use taskdag::tracing::{TracingConfig, TracingFormat, init_tracing};

fn main() {
    // NOTE: eprintln! in the panic hook is intentional, the subscriber may be
    // unusable while panicking.
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();
    let json = cli.json;

    let tracing_config = TracingConfig {
        format: if json {
            TracingFormat::Json
        } else {
            TracingFormat::Compact
        },
        level: cli.level.into(),
        filter: cli.log_filter.clone(),
    };
    if let Err(e) = init_tracing(&tracing_config) {
        eprintln!("{e}");
    }

    let exit_code = match taskdag::run(cli) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            EXIT_OK
        }
        Err(err) => {
            let code = exit_code_for(&err);
            render_error(err, json);
            code
        }
    };
    std::process::exit(exit_code);
}
