use anyhow::{Context, Result};
use articlepress::build::build_site;
use articlepress::config::Config;
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use log::{error, LevelFilter};
use simple_logger::SimpleLogger;
use std::path::PathBuf;

fn main() {
    let matches = App::new("articlepress")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Builds the tutorial site from its Markdown articles")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("build")
                .about("Renders every article and updates the index page")
                .arg(
                    Arg::with_name("project")
                        .long("project")
                        .short("p")
                        .takes_value(true)
                        .value_name("DIR")
                        .help("The project directory (defaults to the current directory)"),
                )
                .arg(
                    Arg::with_name("verbose")
                        .long("verbose")
                        .short("v")
                        .help("Logs every page as it is written"),
                ),
        )
        .get_matches();

    if let ("build", Some(matches)) = matches.subcommand() {
        let level = match matches.is_present("verbose") {
            true => LevelFilter::Debug,
            false => LevelFilter::Info,
        };
        if let Err(e) = SimpleLogger::new().with_level(level).init() {
            eprintln!("Initializing logging: {}", e);
            std::process::exit(1);
        }

        if let Err(e) = build(matches) {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

fn build(matches: &ArgMatches) -> Result<()> {
    let project = match matches.value_of("project") {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir().context("Finding the current directory")?,
    };
    let config = Config::from_directory(&project)?;
    build_site(&config).context("Building site")?;
    Ok(())
}
