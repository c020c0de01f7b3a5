// src/bin/cli.rs
use color_eyre::eyre::{eyre, Result, WrapErr};

use feed_archive::cli::{self, Command, ConsoleProgress};
use feed_archive::core::net::HttpFetcher;
use feed_archive::logging::init_logging;
use feed_archive::progress::Progress;

fn main() {
    if let Err(e) = try_main() {
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    color_eyre::install()?;

    let args = match cli::parse_args(std::env::args().skip(1))? {
        Command::Help => {
            eprintln!("{}", cli::HELP);
            return Ok(());
        }
        Command::Run(args) => args,
    };

    init_logging(args.log_level, args.log_dir.as_deref()).map_err(|e| eyre!(e))?;

    let fetcher = HttpFetcher::new(args.options.timeout).wrap_err("failed to build HTTP client")?;

    let mut console = ConsoleProgress::stdout();
    let progress: Option<&mut dyn Progress> = if args.quiet { None } else { Some(&mut console) };

    let summary = feed_archive::run(&args.options, &fetcher, progress)?;
    log::info!("{} ({})", summary.outcome, summary.archive_path.display());
    Ok(())
}
