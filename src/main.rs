// src/main.rs

use u_flowline::{cli, logging};

fn main() {
    if let Err(err) = run_main() {
        eprintln!("u-flowline error: {err:?}");
        std::process::exit(1);
    }
}

fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    cli::run(args)
}
