use eyre::Result;
use std::sync::Arc;
use std::time::Duration;

use osint_term::dispatch::{Dispatcher, DispatcherConfig};
use osint_term::repl::Repl;
use osint_term::store::ResultStore;
use osint_term::{backend, cli, pretty};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::parse();

    // Initialize logging first
    if let Err(e) = osint_term::init_logging(args.verbose) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    log::info!("================================================================================");
    log::info!("NEW OSINT SESSION STARTING");
    log::info!("================================================================================");

    pretty::clear_and_banner();

    // Probe both backends before accepting commands
    let availability = backend::probe(
        &args.scanner,
        &args.interpreter,
        &args.script,
        Duration::from_secs(10),
    )
    .await?;
    pretty::print_availability(&availability);

    if !availability.any() {
        println!("No scanners found! Ensure at least one backend is available.");
        println!(
            "Expected: {} (native) or {} (script)",
            args.scanner.display(),
            args.script.display()
        );
        return Ok(());
    }

    println!();
    println!("OSINT terminal ready.");
    println!("Type 'help' for commands, 'exit' to quit.");
    println!();

    let store = Arc::new(ResultStore::new(args.results_dir.clone()));
    let dispatcher = Dispatcher::new(
        DispatcherConfig {
            scanner: args.scanner.clone(),
            script: args.script.clone(),
            interpreter: args.interpreter.clone(),
            native_timeout: Duration::from_secs(args.native_timeout),
            script_timeout: Duration::from_secs(args.script_timeout),
            max_scans: args.max_scans,
            step_pause: Duration::from_secs(1),
        },
        Arc::clone(&store),
    );

    Repl::new(dispatcher, store, Duration::from_secs(args.drain_grace))
        .run()
        .await
}
