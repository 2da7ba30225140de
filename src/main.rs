//! Flow Architect CLI
//!
//! Usage:
//!   flow-architect render <PROJECT> [--flow <ID>] [--config <FILE>]
//!   flow-architect export <PROJECT> [-o <FILE>]
//!   flow-architect import <EXPORT> --store <DIR> [--project-id <ID>]
//!   flow-architect summary <PROJECT>
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

use flow_architect::model::lint;
use flow_architect::persistence::export_json;
use flow_architect::{
    render_project, Document, EditorConfig, EditorSession, JsonFileStorage, NullRenderer,
    SvgConfig,
};

#[derive(Parser)]
#[command(name = "flow-architect")]
#[command(about = "Plan personas, sitemaps and user flows")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render one flow of a stored project as SVG on stdout
    Render {
        project: PathBuf,

        /// Flow to draw (defaults to the active flow)
        #[arg(short, long)]
        flow: Option<String>,

        /// Editor configuration (TOML format)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the shareable export of a stored project
    Export {
        project: PathBuf,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import an exported file into a project store
    Import {
        file: PathBuf,

        /// Directory holding the stored projects
        #[arg(short, long)]
        store: PathBuf,

        #[arg(long)]
        project_id: Option<String>,
    },

    /// Print counts and dangling references of a stored project
    Summary { project: PathBuf },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Render {
            project,
            flow,
            config,
        } => render(&project, flow.as_deref(), config.as_deref()),
        Command::Export { project, output } => export(&project, output),
        Command::Import {
            file,
            store,
            project_id,
        } => import(&file, store, project_id),
        Command::Summary { project } => summary(&project),
    }
}

fn render(project: &Path, flow: Option<&str>, config: Option<&Path>) {
    let editor_config = match config {
        Some(path) => match EditorConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => EditorConfig::default(),
    };
    let source = read_file(project);
    let svg_config = SvgConfig::new()
        .with_standalone(true)
        .with_metrics(editor_config.metrics);
    match render_project(&source, flow, &svg_config) {
        Ok(svg) => println!("{}", svg),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn export(project: &Path, output: Option<PathBuf>) {
    let doc = read_document(project);
    let json = match export_json(&doc, OffsetDateTime::now_utc()) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    match output {
        Some(path) => {
            if let Err(e) = fs::write(&path, json) {
                eprintln!("Error writing file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        }
        None => println!("{}", json),
    }
}

fn import(file: &Path, store: PathBuf, project_id: Option<String>) {
    let mut config = EditorConfig::default();
    if let Some(id) = project_id {
        config = config.with_project_id(id);
    }
    let storage = JsonFileStorage::new(store, config.project_id.clone());
    let source = read_file(file);

    let mut session = EditorSession::open(config, storage, NullRenderer);
    if let Err(e) = session.import_json(&source) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    if let Err(e) = session.flush() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    println!("{}", session.storage().path().display());
}

fn summary(project: &Path) {
    let doc = read_document(project);
    println!("Project: {}", doc.project_name);
    println!("  personas: {}", doc.personas.len());
    println!("  pages:    {}", doc.sitemap.len());
    println!("  flows:    {}", doc.user_flows.len());
    for flow in &doc.user_flows {
        let layout = &flow.visual_layout;
        println!(
            "    {} \"{}\": {} nodes, {} hubs, {} connections",
            flow.id,
            flow.name,
            layout.nodes.len(),
            layout.hubs.len(),
            layout.connections.len()
        );
    }

    let warnings = lint::check(&doc);
    if !warnings.is_empty() {
        println!("Dangling references:");
        for w in &warnings {
            println!("  {}", w);
        }
    }
}

fn read_file(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

fn read_document(path: &Path) -> Document {
    match serde_json::from_str(&read_file(path)) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("Error: invalid project file '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    }
}
