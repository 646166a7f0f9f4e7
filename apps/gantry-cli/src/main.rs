use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use gantry_parts::{ProviderRegistry, Registry};
use gantry_topology::{LoadError, Loaded, Loader};

#[derive(Parser)]
#[command(name = "gantry-cli")]
#[command(about = "Gantry CLI - machine topology configuration tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration and report every diagnostic
    Validate {
        /// Path to the configuration file
        config_path: PathBuf,
    },
    /// Print the assembled topology tree
    Show {
        /// Path to the configuration file
        config_path: PathBuf,
    },
    /// Dump the topology as JSON
    Dump {
        /// Path to the configuration file
        config_path: PathBuf,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Show { config_path } => cmd_show(&config_path),
        Commands::Dump {
            config_path,
            pretty,
        } => cmd_dump(&config_path, pretty),
    }
}

fn load(path: &Path) -> Result<Loaded, ExitCode> {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: cannot read {}: {}", path.display(), err);
            return Err(ExitCode::from(2));
        }
    };

    let registry = Registry::builtin();
    let providers = ProviderRegistry::with_builtin();
    match Loader::new(&registry, &providers).load(&source) {
        Ok(loaded) => {
            for warning in &loaded.warnings {
                eprintln!("{warning}");
            }
            Ok(loaded)
        }
        Err(LoadError::Parse(err)) => {
            eprintln!("{err}");
            Err(ExitCode::FAILURE)
        }
        Err(err @ LoadError::Invalid { .. }) => {
            for diag in err.diagnostics() {
                eprintln!("{diag}");
            }
            eprintln!("{err}");
            Err(ExitCode::FAILURE)
        }
    }
}

fn cmd_validate(path: &Path) -> ExitCode {
    match load(path) {
        Ok(loaded) => {
            println!(
                "ok: {} part(s), {} controller(s), {} toolhead(s), {} warning(s)",
                loaded.topology.parts().len(),
                loaded.topology.controllers().count(),
                loaded.topology.toolheads().count(),
                loaded.warnings.len()
            );
            ExitCode::SUCCESS
        }
        Err(code) => code,
    }
}

fn cmd_show(path: &Path) -> ExitCode {
    match load(path) {
        Ok(loaded) => {
            print!("{}", loaded.topology.render_tree());
            ExitCode::SUCCESS
        }
        Err(code) => code,
    }
}

fn cmd_dump(path: &Path, pretty: bool) -> ExitCode {
    match load(path) {
        Ok(loaded) => {
            let json = if pretty {
                serde_json::to_string_pretty(&loaded.topology)
            } else {
                serde_json::to_string(&loaded.topology)
            };
            match json {
                Ok(json) => {
                    println!("{json}");
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    eprintln!("error: serialization failed: {err}");
                    ExitCode::FAILURE
                }
            }
        }
        Err(code) => code,
    }
}
