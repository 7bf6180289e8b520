use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ini::{Git, Ini};

#[derive(Debug, Parser)]
#[command(name = "ini", version, about = "Query and edit INI files in place")]
struct Cli {
    /// INI file to read. Missing files are treated as empty.
    file: PathBuf,

    /// Resolve `[section "subsection"]` headers as `section.subsection`
    #[arg(long, global = true)]
    git: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the value of a qualified key
    Get { key: String },
    /// Set a qualified key and save the file
    Set { key: String, value: String },
    /// Remove a qualified key and save the file
    Rm { key: String },
    /// Append an empty section and save the file
    AddSection { name: String },
    /// Remove a section with all its keys and save the file
    RmSection { name: String },
    /// Rename a section and save the file
    RenameSection { old: String, new: String },
    /// List section names
    Sections {
        /// Print names exactly as written between the brackets
        #[arg(long)]
        raw: bool,
    },
    /// Print every key as `qualified.key = value`
    Dump,
    /// Print the document as it would be saved
    Fmt,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ini=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    let builder = if cli.git {
        Ini::builder().dialect(Git)
    } else {
        Ini::builder()
    };
    let mut ini = builder
        .open(&cli.file)
        .with_context(|| format!("failed to load {}", cli.file.display()))?;

    match cli.command {
        Command::Get { key } => match ini.get(&key) {
            Some(value) => println!("{value}"),
            None => bail!("key not found: {key}"),
        },
        Command::Set { key, value } => {
            ini.set_key(&key, &value);
            ini.save()?;
        }
        Command::Rm { key } => {
            ini.remove_key(&key);
            ini.save()?;
        }
        Command::AddSection { name } => {
            ini.add_section(&name);
            ini.save()?;
        }
        Command::RmSection { name } => {
            ini.remove_section(&name);
            ini.save()?;
        }
        Command::RenameSection { old, new } => {
            if ini.section(&old).is_none() {
                bail!("section not found: {old}");
            }
            ini.rename_section(&old, &new);
            ini.save()?;
        }
        Command::Sections { raw } => {
            let names = if raw {
                ini.raw_section_names()
                    .into_iter()
                    .map(str::to_owned)
                    .collect()
            } else {
                ini.section_names()
            };

            for name in names.iter().filter(|name| !name.is_empty()) {
                println!("{name}");
            }
        }
        Command::Dump => {
            for section in ini.sections() {
                let name = section.name();
                for (key, value) in section.entries() {
                    println!("{} = {value}", ini.dialect().join_key(&name, key));
                }
            }
        }
        Command::Fmt => print!("{ini}"),
    }

    Ok(())
}
