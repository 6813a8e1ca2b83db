//! Command-line parsing.

use std::path::PathBuf;

use anyhow::{bail, Context};
use simfm_core::Mode;

pub const USAGE: &str = "\
usage: simfm [options] <command> [arguments]

options:
  --config <file>   read settings from <file>
  --live            operate on the real file system
  --simulated       operate on the simulated tree
  --scan <dir>      import <dir> when no simulated snapshot exists

commands:
  ls [folder]                 list a folder (the start folder by default)
  info <path>                 show size, dates and attributes
  cat <file>                  print a file's content
  mkdir <folder> <name>       create a subfolder
  copy <path> <folder>        copy an object into a folder
  move <path> <folder>        move an object into a folder
  rm <path>                   delete an object
  help                        show this text";

/// One invocation of the binary.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub config: Option<PathBuf>,
    pub mode: Option<Mode>,
    pub scan_root: Option<PathBuf>,
    pub command: CliCommand,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    List(Option<String>),
    Info(String),
    Cat(String),
    MakeDirectory { folder: String, name: String },
    Copy { source: String, destination: String },
    Move { source: String, destination: String },
    Remove(String),
    Help,
}

impl Args {
    /// Parses arguments, not including the program name.
    pub fn parse<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = None;
        let mut mode = None;
        let mut scan_root = None;
        let mut positional = Vec::new();

        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--config" => {
                    let value = iter.next().context("--config needs a file")?;
                    config = Some(PathBuf::from(value));
                }
                "--scan" => {
                    let value = iter.next().context("--scan needs a folder")?;
                    scan_root = Some(PathBuf::from(value));
                }
                "--live" => mode = Some(Mode::Live),
                "--simulated" => mode = Some(Mode::Simulated),
                "-h" | "--help" => positional.push("help".to_string()),
                flag if flag.starts_with("--") => bail!("unknown option {flag}"),
                _ => positional.push(arg),
            }
        }

        let command = parse_command(positional)?;
        Ok(Self {
            config,
            mode,
            scan_root,
            command,
        })
    }
}

fn parse_command(positional: Vec<String>) -> anyhow::Result<CliCommand> {
    let mut words = positional.into_iter();
    let Some(name) = words.next() else {
        return Ok(CliCommand::Help);
    };
    let rest: Vec<String> = words.collect();

    let command = match (name.as_str(), rest.as_slice()) {
        ("ls", []) => CliCommand::List(None),
        ("ls", [folder]) => CliCommand::List(Some(folder.clone())),
        ("info", [path]) => CliCommand::Info(path.clone()),
        ("cat", [path]) => CliCommand::Cat(path.clone()),
        ("mkdir", [folder, name]) => CliCommand::MakeDirectory {
            folder: folder.clone(),
            name: name.clone(),
        },
        ("copy" | "cp", [source, destination]) => CliCommand::Copy {
            source: source.clone(),
            destination: destination.clone(),
        },
        ("move" | "mv", [source, destination]) => CliCommand::Move {
            source: source.clone(),
            destination: destination.clone(),
        },
        ("rm", [path]) => CliCommand::Remove(path.clone()),
        ("help", _) => CliCommand::Help,
        ("ls" | "info" | "cat" | "mkdir" | "copy" | "cp" | "move" | "mv" | "rm", _) => {
            bail!("wrong number of arguments for {name}\n\n{USAGE}")
        }
        _ => bail!("unknown command {name}\n\n{USAGE}"),
    };
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<Args> {
        Args::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn no_arguments_shows_help() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.command, CliCommand::Help);
        assert!(args.mode.is_none());
    }

    #[test]
    fn options_and_command() {
        let args = parse(&["--simulated", "--config", "c.toml", "copy", "a/b.txt", "a/c"]).unwrap();
        assert_eq!(args.mode, Some(Mode::Simulated));
        assert_eq!(args.config, Some(PathBuf::from("c.toml")));
        assert_eq!(
            args.command,
            CliCommand::Copy {
                source: "a/b.txt".into(),
                destination: "a/c".into()
            }
        );
    }

    #[test]
    fn ls_folder_is_optional() {
        assert_eq!(parse(&["ls"]).unwrap().command, CliCommand::List(None));
        assert_eq!(
            parse(&["ls", "root"]).unwrap().command,
            CliCommand::List(Some("root".into()))
        );
    }

    #[test]
    fn scan_takes_a_folder() {
        let args = parse(&["--scan", "/data", "ls"]).unwrap();
        assert_eq!(args.scan_root, Some(PathBuf::from("/data")));
        assert!(parse(&["ls", "--scan"]).is_err());
    }

    #[test]
    fn wrong_arity_is_rejected() {
        assert!(parse(&["rm"]).is_err());
        assert!(parse(&["mkdir", "only-folder"]).is_err());
        assert!(parse(&["info", "a", "b"]).is_err());
    }

    #[test]
    fn unknown_command_and_option_are_rejected() {
        assert!(parse(&["frobnicate"]).is_err());
        assert!(parse(&["--verbose", "ls"]).is_err());
    }
}
