use bus_connector_cli::run_cli;
use tracing::error;

fn main() {
    // Run CLI and handle errors
    if let Err(e) = run_cli() {
        error!("CLI error: {}", e);
        eprintln!("error: {}", e);

        std::process::exit(e.exit_code());
    }
}
