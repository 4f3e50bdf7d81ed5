use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use docstore_core::{DocumentId, DocumentService};
use docstore_server::{build_service, DocstoreServer, RegistryBackend, ServerConfig};
use serde_json::json;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = ServerConfig::load(cli.config.as_deref())?;
    match cli.command {
        Command::Serve(args) => cmd_serve(config, args),
        Command::Put(args) => {
            let service = offline_service(config, args.root.as_deref())?;
            cmd_put(&service, args, &cli.format, &mut io::stdout().lock())
        }
        Command::Get(args) => {
            let service = offline_service(config, args.root.as_deref())?;
            cmd_get(&service, args, &mut io::stdout().lock())
        }
        Command::List(args) => {
            let service = offline_service(config, args.root.as_deref())?;
            cmd_list(&service, &cli.format, &mut io::stdout().lock())
        }
    }
}

fn cmd_serve(mut config: ServerConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(root) = args.root {
        config.root_dir = root;
    }
    if let Some(registry) = args.registry {
        config.registry = match registry {
            RegistryArg::Memory => RegistryBackend::Memory,
            RegistryArg::Log => RegistryBackend::Log,
        };
    }

    println!(
        "docstore server on {} (root: {})",
        config.bind_addr.to_string().bold(),
        config.root_dir.display()
    );
    let server = DocstoreServer::new(config)?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(server.serve())?;
    Ok(())
}

/// Direct access to a root directory. Always uses the durable registry;
/// an in-memory one would be empty on every invocation.
fn offline_service(mut config: ServerConfig, root: Option<&Path>) -> anyhow::Result<DocumentService> {
    if let Some(root) = root {
        config.root_dir = root.to_path_buf();
    }
    config.registry = RegistryBackend::Log;
    build_service(&config)
        .with_context(|| format!("failed to open docstore at {}", config.root_dir.display()))
}

fn cmd_put(
    service: &DocumentService,
    args: PutArgs,
    format: &OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let name = match args.name {
        Some(name) => name,
        None => file_name_of(&args.file)?,
    };
    let mut file = File::open(&args.file)
        .with_context(|| format!("failed to open {}", args.file.display()))?;

    let id = DocumentId::new(args.id);
    let location = service.upload(id, &name, &mut file)?;

    match format {
        OutputFormat::Text => writeln!(
            out,
            "{} Stored {} as {}",
            "✓".green().bold(),
            name.bold(),
            id.to_string().yellow()
        )?,
        OutputFormat::Json => writeln!(
            out,
            "{}",
            json!({ "id": id.get(), "filename": name, "location": location.as_str() })
        )?,
    }
    Ok(())
}

fn cmd_get(service: &DocumentService, args: GetArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let mut document = service.get(DocumentId::new(args.id))?;

    match args.output {
        Some(path) => {
            let mut file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let bytes = io::copy(&mut document.stream, &mut file)?;
            eprintln!(
                "{} Wrote {} ({}, {} bytes) to {}",
                "✓".green().bold(),
                document.filename.bold(),
                document.content_type.cyan(),
                bytes,
                path.display()
            );
        }
        None => {
            io::copy(&mut document.stream, &mut *out)?;
            out.flush()?;
        }
    }
    Ok(())
}

fn cmd_list(service: &DocumentService, format: &OutputFormat, out: &mut dyn Write) -> anyhow::Result<()> {
    let ids = service.ids()?;
    let mut entries = Vec::with_capacity(ids.len());
    for id in ids {
        let location = service.registry().get_path(id)?;
        entries.push((id, location));
    }

    match format {
        OutputFormat::Text => {
            if entries.is_empty() {
                writeln!(out, "No documents stored.")?;
            }
            for (id, location) in &entries {
                writeln!(out, "{}  {}", id.to_string().yellow(), location)?;
            }
        }
        OutputFormat::Json => {
            let rows: Vec<_> = entries
                .iter()
                .map(|(id, location)| json!({ "id": id.get(), "location": location.as_str() }))
                .collect();
            writeln!(out, "{}", serde_json::Value::Array(rows))?;
        }
    }
    Ok(())
}

fn file_name_of(path: &Path) -> anyhow::Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_owned)
        .with_context(|| format!("cannot derive a filename from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn setup() -> (TempDir, DocumentService) {
        let dir = TempDir::new().unwrap();
        let service = offline_service(ServerConfig::default(), Some(dir.path())).unwrap();
        (dir, service)
    }

    fn put_args(id: i64, file: PathBuf) -> PutArgs {
        PutArgs { id, file, name: None, root: None }
    }

    #[test]
    fn put_then_get_to_writer() {
        let (dir, service) = setup();
        let source = dir.path().join("notes.txt");
        std::fs::write(&source, b"remember the milk").unwrap();

        let mut out = Vec::new();
        cmd_put(&service, put_args(1, source), &OutputFormat::Json, &mut out).unwrap();
        let printed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(printed["id"], 1);
        assert_eq!(printed["filename"], "notes.txt");

        let mut content = Vec::new();
        cmd_get(&service, GetArgs { id: 1, output: None, root: None }, &mut content).unwrap();
        assert_eq!(content, b"remember the milk");
    }

    #[test]
    fn get_to_output_file() {
        let (dir, service) = setup();
        let source = dir.path().join("a.bin");
        std::fs::write(&source, [1u8, 2, 3]).unwrap();
        cmd_put(&service, put_args(2, source), &OutputFormat::Text, &mut Vec::new()).unwrap();

        let target = dir.path().join("copy.bin");
        let args = GetArgs { id: 2, output: Some(target.clone()), root: None };
        cmd_get(&service, args, &mut Vec::new()).unwrap();
        assert_eq!(std::fs::read(target).unwrap(), [1, 2, 3]);
    }

    #[test]
    fn put_with_explicit_name() {
        let (dir, service) = setup();
        let source = dir.path().join("tmp123");
        std::fs::write(&source, b"x").unwrap();
        let args = PutArgs { name: Some("final.txt".into()), ..put_args(3, source) };
        cmd_put(&service, args, &OutputFormat::Text, &mut Vec::new()).unwrap();
        assert_eq!(service.get(DocumentId::new(3)).unwrap().filename, "final.txt");
    }

    #[test]
    fn duplicate_put_fails() {
        let (dir, service) = setup();
        let source = dir.path().join("a.txt");
        std::fs::write(&source, b"x").unwrap();
        cmd_put(&service, put_args(4, source.clone()), &OutputFormat::Text, &mut Vec::new()).unwrap();
        let err = cmd_put(&service, put_args(4, source), &OutputFormat::Text, &mut Vec::new())
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn list_json_and_persistence() {
        let (dir, service) = setup();
        let source = dir.path().join("a.txt");
        std::fs::write(&source, b"x").unwrap();
        cmd_put(&service, put_args(9, source.clone()), &OutputFormat::Text, &mut Vec::new()).unwrap();
        cmd_put(&service, put_args(5, source), &OutputFormat::Text, &mut Vec::new()).unwrap();
        drop(service);

        let service = offline_service(ServerConfig::default(), Some(dir.path())).unwrap();
        let mut out = Vec::new();
        cmd_list(&service, &OutputFormat::Json, &mut out).unwrap();
        let rows: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(rows[0]["id"], 5);
        assert_eq!(rows[1]["id"], 9);
    }

    #[test]
    fn list_empty_text() {
        let (_dir, service) = setup();
        let mut out = Vec::new();
        cmd_list(&service, &OutputFormat::Text, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No documents stored.\n");
    }
}
