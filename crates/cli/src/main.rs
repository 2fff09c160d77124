use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use proplab_core::{has_errors, validate, Model, Value};
use proplab_eval::Laboratory;
use proplab_solve::{apply_solution, compile, SolverReply};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Propositional laboratory toolchain.
#[derive(Parser)]
#[command(name = "proplab", version, about = "Propositional laboratory toolchain")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the structural checks over a laboratory bundle
    Validate {
        /// Path to the laboratory bundle JSON
        bundle: PathBuf,
    },

    /// Show givens, tweakables, disable state, and raised concerns
    Show {
        /// Path to the laboratory bundle JSON
        bundle: PathBuf,
        /// Assign a tweakable before rendering (repeatable)
        #[arg(long = "set", value_name = "NAME=VALUE")]
        assignments: Vec<String>,
    },

    /// Compile the bundle into a 0/1 integer linear program
    Compile {
        /// Path to the laboratory bundle JSON
        bundle: PathBuf,
        /// Path to a JSON map of concern name to weight
        #[arg(long)]
        weights: Option<PathBuf>,
    },

    /// Apply a solver reply to the bundle's tweakables
    Apply {
        /// Path to the laboratory bundle JSON
        bundle: PathBuf,
        /// Path to the solver reply JSON
        #[arg(long)]
        solution: PathBuf,
        /// Assign a tweakable before decoding (repeatable)
        #[arg(long = "set", value_name = "NAME=VALUE")]
        assignments: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Validate { bundle } => cmd_validate(bundle, cli.output),
        Commands::Show {
            bundle,
            assignments,
        } => cmd_show(bundle, assignments, cli.output),
        Commands::Compile { bundle, weights } => {
            cmd_compile(bundle, weights.as_deref(), cli.output)
        }
        Commands::Apply {
            bundle,
            solution,
            assignments,
        } => cmd_apply(bundle, solution, assignments, cli.output),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(message) => {
            eprintln!("error: {}", message);
            process::exit(1);
        }
    }
}

fn load_model(path: &Path) -> Result<Model, String> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    Model::from_json(&source).map_err(|e| e.to_string())
}

fn load_laboratory(path: &Path, assignments: &[String]) -> Result<Laboratory, String> {
    let model = load_model(path)?;
    let mut lab = Laboratory::new(model).map_err(|e| e.to_string())?;
    for assignment in assignments {
        let (name, raw) = assignment
            .split_once('=')
            .ok_or_else(|| format!("invalid assignment '{}', expected NAME=VALUE", assignment))?;
        lab.set_value(name, parse_value(raw))
            .map_err(|e| e.to_string())?;
    }
    Ok(lab)
}

/// `true`/`false` are booleans, everything else is text.
fn parse_value(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        other => Value::text(other),
    }
}

fn cmd_validate(bundle: &Path, output: OutputFormat) -> Result<i32, String> {
    let model = load_model(bundle)?;
    let diagnostics = validate(&model);

    match output {
        OutputFormat::Json => {
            let rendered = serde_json::to_string_pretty(&diagnostics)
                .map_err(|e| e.to_string())?;
            println!("{}", rendered);
        }
        OutputFormat::Text => {
            for diag in &diagnostics {
                println!(
                    "{:?}: {} '{}': {}",
                    diag.severity, diag.construct_kind, diag.construct_id, diag.message
                );
            }
            if diagnostics.is_empty() {
                println!("no findings");
            }
        }
    }

    Ok(if has_errors(&diagnostics) { 1 } else { 0 })
}

fn cmd_show(bundle: &Path, assignments: &[String], output: OutputFormat) -> Result<i32, String> {
    let lab = load_laboratory(bundle, assignments)?;
    print_laboratory(&lab, output)?;
    Ok(0)
}

fn print_laboratory(lab: &Laboratory, output: OutputFormat) -> Result<(), String> {
    match output {
        OutputFormat::Json => {
            let tweakables: Vec<serde_json::Value> = lab
                .tweakables()
                .iter()
                .map(|t| {
                    let info = lab.disable_info(&t.name);
                    serde_json::json!({
                        "name": t.name,
                        "expression": t.expression,
                        "value": lab.value(&t.name),
                        "disabled": info.disabled,
                        "message": info.message,
                        "raised": lab.raised_concerns(&t.name),
                    })
                })
                .collect();
            let givens: Vec<serde_json::Value> = lab
                .givens()
                .iter()
                .map(|g| {
                    serde_json::json!({
                        "name": g.name,
                        "expression": g.expression,
                        "value": g.value,
                    })
                })
                .collect();
            let doc = serde_json::json!({
                "title": lab.model().laboratory.title(),
                "givens": givens,
                "tweakables": tweakables,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&doc).map_err(|e| e.to_string())?
            );
        }
        OutputFormat::Text => {
            if let Some(title) = lab.model().laboratory.title() {
                println!("{}", title);
            }
            for given in lab.givens() {
                println!("given {} = {}", given.name, given.value);
            }
            for tweakable in lab.tweakables() {
                let value = lab
                    .value(&tweakable.name)
                    .map(|v| v.to_string())
                    .unwrap_or_default();
                let info = lab.disable_info(&tweakable.name);
                let raised = lab.raised_concerns(&tweakable.name);
                let mut line = format!("tweakable {} = {}", tweakable.name, value);
                if info.disabled {
                    line.push_str(&format!(" (disabled: {})", info.message));
                }
                if !raised.is_empty() {
                    line.push_str(&format!(" raises: {}", raised.join(", ")));
                }
                println!("{}", line);
            }
        }
    }
    Ok(())
}

fn load_weights(path: Option<&Path>) -> Result<BTreeMap<String, f64>, String> {
    let Some(path) = path else {
        return Ok(BTreeMap::new());
    };
    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    serde_json::from_str(&source).map_err(|e| format!("invalid weights file: {}", e))
}

fn cmd_compile(
    bundle: &Path,
    weights: Option<&Path>,
    output: OutputFormat,
) -> Result<i32, String> {
    let model = load_model(bundle)?;
    let weights = load_weights(weights)?;
    let program = compile(&model, &weights).map_err(|e| e.to_string())?;

    match output {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&program).map_err(|e| e.to_string())?
            );
        }
        OutputFormat::Text => {
            println!("objective: {}", program.input.objective);
            println!("variables: {}", program.input.variables.join(" "));
            for constraint in &program.input.constraints {
                println!("{}", constraint);
            }
        }
    }
    Ok(0)
}

fn cmd_apply(
    bundle: &Path,
    solution: &Path,
    assignments: &[String],
    output: OutputFormat,
) -> Result<i32, String> {
    let mut lab = load_laboratory(bundle, assignments)?;
    let program = compile(lab.model(), &BTreeMap::new()).map_err(|e| e.to_string())?;

    let source = std::fs::read_to_string(solution)
        .map_err(|e| format!("cannot read {}: {}", solution.display(), e))?;
    let reply: SolverReply =
        serde_json::from_str(&source).map_err(|e| format!("invalid solver reply: {}", e))?;

    apply_solution(&mut lab, &program.map, &reply).map_err(|e| e.to_string())?;
    print_laboratory(&lab, output)?;
    Ok(0)
}
