use std::fs;
use std::path::PathBuf;
use std::process::exit;

use clap::{Args, Parser, Subcommand};
use log::error;

use ragviz::config::Config;
use ragviz::editor::{CheckApplied, Editor};
use ragviz::gateway::HttpTransport;
use ragviz::layout::Viewport;
use ragviz::scenario::Scenario;
use ragviz::Result;

const EXIT_FAILURE: i32 = 1;

/// Draw resource-allocation graphs and ask a Banker's/deadlock service for a verdict.
#[derive(Parser, Debug)]
#[command(name = "ragviz", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Derive Need and the graph locally and write it as SVG
    Draw {
        #[command(flatten)]
        model: ModelArgs,
    },
    /// Send the model to the backend, print its verdict, and draw the graph it returns
    Check {
        #[command(flatten)]
        model: ModelArgs,
        /// Check endpoint; overrides RAGVIZ_BACKEND_URL
        #[arg(long)]
        url: Option<String>,
    },
}

#[derive(Args, Debug)]
struct ModelArgs {
    /// Use the built-in 3×3 example
    #[arg(long, conflicts_with = "input")]
    example: bool,
    /// JSON file shaped like a check request: {"P", "R", "alloc", "maxd", "avail"}
    #[arg(long, short)]
    input: Option<PathBuf>,
    /// SVG output path; stdout if omitted
    #[arg(long, short)]
    output: Option<PathBuf>,
    #[arg(long)]
    width: Option<f64>,
    #[arg(long)]
    height: Option<f64>,
}

impl ModelArgs {
    fn editor(&self, config: &mut Config) -> Result<Editor> {
        if self.width.is_some() || self.height.is_some() {
            config.viewport = Viewport::new(
                self.width.unwrap_or(Viewport::DEFAULT_WIDTH),
                self.height.unwrap_or(Viewport::DEFAULT_HEIGHT),
            );
        }
        let mut editor = Editor::new(config);
        match &self.input {
            Some(path) => editor.load_scenario(Scenario::load(path)?)?,
            None => {
                if !self.example {
                    log::info!("no --input given; using the built-in example");
                }
                editor.load_example();
            }
        }
        Ok(editor)
    }

    fn write_svg(&self, editor: &Editor) -> Result<()> {
        let svg = match editor.scene() {
            Some(scene) => scene.to_svg(),
            None => return Ok(()),
        };
        match &self.output {
            Some(path) => fs::write(path, svg)?,
            None => println!("{}", svg),
        }
        Ok(())
    }
}

fn run(cli: Cli) -> Result<bool> {
    let mut config = Config::from_env();
    match cli.command {
        Command::Draw { model } => {
            let mut editor = model.editor(&mut config)?;
            editor.draw_graph();
            model.write_svg(&editor)?;
            Ok(true)
        }
        Command::Check { model, url } => {
            if let Some(url) = url {
                config.gateway.url = url;
            }
            let mut editor = model.editor(&mut config)?;
            // replaced if the backend sends its own graph
            editor.draw_graph();
            let transport = HttpTransport::new(&config.gateway);
            if editor.check(&transport) != Some(CheckApplied::Applied) {
                return Ok(false);
            }
            let status = editor.status();
            eprintln!("safety:   {}", status.safety.badge().text);
            eprintln!("deadlock: {}", status.deadlock.badge().text);
            eprintln!("{}", status.summary());
            if status.is_error() {
                return Ok(false);
            }
            model.write_svg(&editor)?;
            Ok(true)
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => {}
        Ok(false) => exit(EXIT_FAILURE),
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            exit(EXIT_FAILURE);
        }
    }
}
