//! Launch the tracegym example.

use std::io;

use anyhow::Result;
use clap::Parser;
use itembind_examples::tracegym::{Widget, run};
use tracing::Level;

/// CLI flags for the tracegym example.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Widget to drive.
    #[clap(short, long, value_enum, default_value_t = Widget::Hierbox)]
    widget: Widget,

    /// Log pick and dispatch decisions to stderr.
    #[clap(short, long)]
    verbose: bool,
}

/// Run the tracegym example.
fn main() -> Result<()> {
    let args = Args::parse();
    if args.verbose {
        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_max_level(Level::TRACE)
            .without_time()
            .compact()
            .init();
    }
    for line in run(args.widget)? {
        println!("{line}");
    }
    Ok(())
}
