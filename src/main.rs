//
// main.rs
// DicomDir-Tools-rs
//
// Binary entry point: hands the command line over to the CLI layer.
//
// Thales Matheus Mendonça Santos - November 2025

use dicomdir_tools::cli;

fn main() -> anyhow::Result<()> {
    cli::run()
}
