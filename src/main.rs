use clap::Parser;
use foliostat::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
