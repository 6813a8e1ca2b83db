//! Translates one command line into core commands and prints the events.

use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Context};
use simfm_core::{
    format_date, format_size, Command, CoreResult, Event, FileManager, FileSystem, InfoMessage,
    LiveFs, ObjectKind, SimFs, SimObject, DEFAULT_DATE_FORMAT,
};

use crate::args::CliCommand;

const INFO_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Backends whose objects can be named on the command line.
pub trait Resolve: FileSystem {
    fn resolve_arg(&self, arg: &str) -> CoreResult<Self::Object>;
}

impl Resolve for LiveFs {
    fn resolve_arg(&self, arg: &str) -> CoreResult<Self::Object> {
        self.open(Path::new(arg))
    }
}

impl Resolve for SimFs {
    /// Accepts `root/a/b`, or `a/b` relative to the root.
    fn resolve_arg(&self, arg: &str) -> CoreResult<SimObject> {
        let trimmed = arg.trim_matches('/');
        if trimmed.is_empty() || trimmed == "." {
            return Ok(self.root());
        }
        self.resolve(trimmed)
            .or_else(|_| self.resolve(&format!("{}/{trimmed}", self.root_name())))
    }
}

/// What happened, for the exit status and the message listing.
#[derive(Debug, Default)]
pub struct Report {
    pub failed: bool,
    pub messages: Vec<InfoMessage>,
}

/// Runs `command` against `fm`, writing regular output to `out`.
pub fn run<F, W>(fm: &mut FileManager<F>, command: &CliCommand, out: &mut W) -> anyhow::Result<Report>
where
    F: Resolve,
    W: Write,
{
    let events = match command {
        CliCommand::Help => {
            writeln!(out, "{}", crate::args::USAGE)?;
            return Ok(Report::default());
        }
        CliCommand::List(folder) => {
            if let Some(folder) = folder {
                let object = resolve(fm, folder)?;
                if fm.fs().is_file(&object) {
                    print_entry(fm.fs(), &object, out)?;
                    return Ok(Report::default());
                }
                fm.execute(Command::Open(object));
            }
            vec![fm.execute(Command::List)]
        }
        CliCommand::Info(path) => {
            let object = resolve(fm, path)?;
            vec![
                fm.execute(Command::Select(object)),
                fm.execute(Command::Info),
            ]
        }
        CliCommand::Cat(path) => {
            let file = resolve(fm, path)?;
            vec![
                fm.execute(Command::Select(file)),
                fm.execute(Command::Read),
            ]
        }
        CliCommand::MakeDirectory { folder, name } => {
            let folder = resolve(fm, folder)?;
            vec![
                fm.execute(Command::Open(folder)),
                fm.execute(Command::MakeDirectory(name.clone())),
            ]
        }
        CliCommand::Copy {
            source,
            destination,
        } => {
            let source = resolve(fm, source)?;
            let destination = resolve(fm, destination)?;
            vec![
                fm.execute(Command::Copy(source)),
                fm.execute(Command::Open(destination)),
                fm.execute(Command::Paste),
            ]
        }
        CliCommand::Move {
            source,
            destination,
        } => {
            let source = resolve(fm, source)?;
            let destination = resolve(fm, destination)?;
            vec![
                fm.execute(Command::Cut(source)),
                fm.execute(Command::Open(destination)),
                fm.execute(Command::Paste),
            ]
        }
        CliCommand::Remove(path) => {
            let object = resolve(fm, path)?;
            let shown = fm.fs().path(&object);
            let event = fm.execute(Command::Select(object));
            match fm.execute(Command::Delete) {
                Event::Deleted => {
                    writeln!(out, "deleted {}", shown.display())?;
                    vec![event]
                }
                failure => vec![event, failure],
            }
        }
    };

    let mut report = Report::default();
    for event in events {
        print_event(fm, event, out, &mut report)?;
    }
    Ok(report)
}

fn resolve<F: Resolve>(fm: &FileManager<F>, arg: &str) -> anyhow::Result<F::Object> {
    fm.fs().resolve_arg(arg).map_err(|e| {
        let message = InfoMessage::from(&e);
        anyhow!(e).context(format!("cannot open {arg}: {}", message.text()))
    })
}

fn print_event<F, W>(
    fm: &FileManager<F>,
    event: Event<F::Object>,
    out: &mut W,
    report: &mut Report,
) -> anyhow::Result<()>
where
    F: Resolve,
    W: Write,
{
    let fs = fm.fs();
    match event {
        Event::ContentListed { entries, .. } => {
            for entry in &entries {
                print_entry(fs, entry, out)?;
            }
        }
        Event::InfoGathered { object, info } => {
            let attributes = info.attributes.labels();
            writeln!(out, "path:       {}", fs.path(&object).display())?;
            writeln!(out, "kind:       {}", kind_label(fs.kind(&object)))?;
            if fs.is_file(&object) {
                writeln!(out, "extension:  {}", fs.extension(&object))?;
            }
            writeln!(out, "size:       {} ({} bytes)", format_size(info.size), info.size)?;
            writeln!(out, "created:    {}", format_date(info.created, INFO_DATE_FORMAT))?;
            writeln!(out, "modified:   {}", format_date(info.modified, INFO_DATE_FORMAT))?;
            writeln!(
                out,
                "attributes: {}",
                if attributes.is_empty() {
                    "-".to_string()
                } else {
                    attributes.join(", ")
                }
            )?;
        }
        Event::ContentRead { content, .. } => {
            out.write_all(&content).context("write file content")?;
        }
        Event::Pasted { object, messages } => {
            writeln!(out, "pasted {}", fs.path(&object).display())?;
            report.messages.extend(messages);
        }
        Event::DirectoryCreated(folder) => {
            writeln!(out, "created {}", fs.path(&folder).display())?;
        }
        Event::OperationFailed {
            operation,
            messages,
        } => {
            tracing::warn!("{operation} failed");
            report.failed = true;
            report.messages.extend(messages);
        }
        Event::FolderOpened(_)
        | Event::Selected(_)
        | Event::ClipboardSet { .. }
        | Event::Deleted => {}
    }
    Ok(())
}

fn print_entry<F: FileSystem, W: Write>(fs: &F, entry: &F::Object, out: &mut W) -> anyhow::Result<()> {
    let (marker, size) = match fs.kind(entry) {
        ObjectKind::Folder => ('d', "-".to_string()),
        ObjectKind::File => (
            '-',
            fs.size_in_bytes(entry)
                .map(format_size)
                .unwrap_or_else(|_| "?".to_string()),
        ),
    };
    let modified = fs
        .last_modified_time(entry)
        .map(|t| format_date(t, DEFAULT_DATE_FORMAT))
        .unwrap_or_else(|_| "?".to_string());
    writeln!(out, "{marker} {size:>10}  {modified}  {}", fs.name(entry))?;
    Ok(())
}

fn kind_label(kind: ObjectKind) -> &'static str {
    match kind {
        ObjectKind::File => "file",
        ObjectKind::Folder => "folder",
    }
}
