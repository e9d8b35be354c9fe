use clap::Parser;
use anyhow::Result;

use reload_runner::{
    cli::{Cli, Command, LogAction, OutputFormat},
    init_folders, BuildErrorLog, PathClassifier, Role, RolePalette, Settings, SettingsError,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.setup_logging();

    let settings = match Settings::resolve(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(err @ SettingsError::ConfigNotFound { .. }) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    };

    tracing::debug!("Resolved settings rooted at {}", settings.root_path().display());

    match &cli.command {
        Command::Show => show(&settings, &cli.output)?,
        Command::Check { paths } => {
            let classifier = PathClassifier::new(&settings);
            for path in paths {
                println!(
                    "{}\ttmp={}\tignored={}\twatched={}",
                    path.display(),
                    classifier.is_tmp_dir(path),
                    classifier.is_ignored_folder(path),
                    classifier.is_watched_file(path),
                );
            }
        }
        Command::Event { events } => {
            let classifier = PathClassifier::new(&settings);
            for event in events {
                let verdict = if classifier.should_rebuild(event) { "rebuild" } else { "reload" };
                println!("{}\t{}", verdict, event);
            }
        }
        Command::Color { role } => {
            let role: Role = role.parse()?;
            let palette = RolePalette::from_settings(&settings);
            println!("{}", palette.code(role));
        }
        // A missing tmp folder is already logged and does not stop the supervisor.
        Command::Init => {
            if let Ok(path) = init_folders(&settings) {
                println!("{}", path.display());
            }
        }
        Command::Log { action } => {
            let log = BuildErrorLog::from_settings(&settings);
            match action {
                LogAction::Append { message } => {
                    if !log.append(message) {
                        anyhow::bail!("Failed to write build log {}", log.path().display());
                    }
                }
                LogAction::Clear => log.clear()?,
            }
        }
    }

    Ok(())
}

fn show(settings: &Settings, output: &OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(settings)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(settings)?),
    }
    Ok(())
}
