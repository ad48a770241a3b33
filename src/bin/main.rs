use logger::Logger;

use std::process;
use clap::Parser;

#[macro_use]
extern crate log;

/// Parse command line arguments and run `enrichment::run()`
fn main() {
    // ----------------------------- Run CLI Parser
    let cli = parser::Cli::parse();

    // ----------------------------- Init logger (teeing to <out>/log.txt)
    let verbosity = cli.verbose + u8::from(!cli.quiet);
    if let Err(e) = Logger::init(verbosity, Some(&cli.out.join(enrichment::report::LOG_FILE))) {
        eprintln!("Error: {e:?}");
        process::exit(1);
    }

    // ----------------------------- Serialize command line arguments
    if let Err(e) = cli.serialize() {
        warn!("{e}");
    }

    // ----------------------------- Run the enrichment analysis.
    match enrichment::run(&cli) {
        Ok(()) => (),
        Err(e) => {
            error!("{e:?}");
            process::exit(1);
        }
    };
}
