//! jsondoc command line
//!
//! ```text
//! jsondoc [OPTIONS] <TEMPLATE>
//! ```

mod docs;

use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // JSONDOC_LOG controls verbosity, warnings only by default
    let filter = EnvFilter::try_from_env("JSONDOC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match docs::run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            docs::report_error(&err, docs::color_requested(&args));
            ExitCode::FAILURE
        }
    }
}
