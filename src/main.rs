use clap::{Arg, ArgAction, Command}; // Command-line argument parsing
use std::io; // For writing the operator report to stdout
use std::path::PathBuf;

use regutrack_mailer::email::LettreConnector;
use regutrack_mailer::utils::initialize_logging;
use regutrack_mailer::{Notifier, CONFIG_FILE};

fn main() {
    // Define the command-line interface using clap
    let matches = Command::new("regutrack-mailer")
        .about("Send the ReguTrack test notification through the Office 365 SMTP relay")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to the JSON configuration file")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .default_value(CONFIG_FILE),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log every SMTP step at debug level")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Append log records to this file instead of stderr")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("exit-status")
                .long("exit-status")
                .help("Exit with status 1 when the email was not delivered")
                .action(ArgAction::SetTrue),
        )
        .get_matches(); // Parse the command-line arguments

    let verbose = matches.get_flag("verbose");
    let log_file = matches.get_one::<PathBuf>("log-file");

    // Logging is optional; the report on stdout is what the operator reads
    if let Err(e) = initialize_logging(verbose, log_file.map(PathBuf::as_path)) {
        eprintln!("Warning: logging could not be initialized: {}", e);
    }

    let config_path = matches
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_default();

    let notifier = Notifier::new(config_path, LettreConnector::default());
    let outcome = notifier.run(&mut io::stdout().lock());

    // Exit status stays 0 unless explicitly requested
    if matches.get_flag("exit-status") && !outcome.is_delivered() {
        std::process::exit(1);
    }
}
