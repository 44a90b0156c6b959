//! Memegen CLI - local front end for the meme engine
//!
//! Commands: templates, generate
//! Outputs JSON to stdout
//! Returns non-zero on generation failure

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use memegen_core::{
    EngineConfig, MemeGenerator, MemeHandler, RenderRequest, TemplateRegistry, ENGINE_VERSION,
};

#[derive(Parser)]
#[command(name = "memegen-cli", version = ENGINE_VERSION)]
#[command(about = "Memegen CLI - render memes from templates")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory of JSON template descriptors; built-in templates when omitted
    #[arg(long)]
    registry_dir: Option<PathBuf>,

    /// JSON engine config; environment variables are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available templates
    Templates {
        /// Only templates in this category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Render a meme
    Generate {
        /// Template ID
        #[arg(short, long)]
        template: String,

        #[arg(long, default_value = "")]
        top: String,

        #[arg(long, default_value = "")]
        bottom: String,

        /// Extra text fields, in order (repeatable)
        #[arg(long)]
        additional: Vec<String>,

        /// Fill empty top text with a generated caption
        #[arg(long)]
        ai_caption: bool,

        /// Write the image here instead of printing base64 JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            let output = serde_json::json!({ "success": false, "error": format!("{e:#}") });
            println!("{output}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load_from_file(path)?,
        None => EngineConfig::from_env(),
    };
    let registry = match &cli.registry_dir {
        Some(dir) => TemplateRegistry::load_from_dir(dir).context("loading templates")?,
        None => TemplateRegistry::builtin(),
    };
    let handler = MemeHandler::new(MemeGenerator::from_config(registry, config));

    match cli.command {
        Commands::Templates { category } => {
            let templates = handler.list_templates(category.as_deref());
            println!("{}", serde_json::to_string_pretty(&templates)?);
            Ok(ExitCode::SUCCESS)
        }

        Commands::Generate { template, top, bottom, additional, ai_caption, output } => {
            let request = RenderRequest {
                template_id: template,
                top_text: top,
                bottom_text: bottom,
                additional_text: additional,
                use_generated_caption: ai_caption,
                caption_prompt: None,
            };
            let result = handler.generate_meme(request);
            if !result.is_success() {
                println!("{}", serde_json::json!({ "success": false, "error": result.error }));
                return Ok(ExitCode::from(2));
            }

            match output {
                Some(path) => {
                    std::fs::write(&path, &result.image_data)
                        .with_context(|| format!("writing {}", path.display()))?;
                    let summary = serde_json::json!({
                        "success": true,
                        "path": path,
                        "mime_type": result.mime_type,
                        "generated_captions": result.generated_captions,
                    });
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                }
                None => println!("{}", serde_json::to_string_pretty(&result)?),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
