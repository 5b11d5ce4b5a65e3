use clap::{Parser, Subcommand, ValueEnum};
use mealopt_diet::{CompiledDiet, Diet, MealReport};
use mealopt_solver::Solver;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mealopt")]
#[command(about = "Least-cost meal planning with integer servings", long_about = None)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a diet file for errors
    Check {
        /// The diet file to check
        file: PathBuf,
    },
    /// Write the compiled model in LP format
    Export {
        /// The diet file to export
        file: PathBuf,
        /// Output path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Solve a diet and print the cheapest meal
    Solve {
        /// The diet file to solve
        file: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
        /// Stop after exploring this many nodes
        #[arg(long)]
        node_limit: Option<usize>,
        /// Stop after this many seconds
        #[arg(long)]
        time_limit: Option<f64>,
        /// Ignore integrality and solve the continuous relaxation
        #[arg(long)]
        relaxation: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Pretty,
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Check { file } => {
            let compiled = load(&file);
            println!("Diet: {}", compiled.diet.name);
            println!("Ingredients: {}", compiled.model.num_variables());
            println!("Requirements: {}", compiled.diet.requirements.len());
            println!("Constraints: {}", compiled.model.num_constraints());
            println!("OK");
        }
        Commands::Export { file, output } => {
            let compiled = load(&file);
            let result = match output {
                Some(path) => std::fs::write(&path, compiled.model.to_lp_string()),
                None => compiled.model.write_lp(io::stdout().lock()),
            };
            if let Err(e) = result {
                eprintln!("Error writing LP file: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Solve {
            file,
            format,
            node_limit,
            time_limit,
            relaxation,
        } => {
            let compiled = load(&file);

            let mut solver = Solver::new();
            if let Some(nodes) = node_limit {
                solver = solver.with_node_limit(nodes);
            }
            if let Some(secs) = time_limit {
                match Duration::try_from_secs_f64(secs) {
                    Ok(limit) => solver = solver.with_time_limit(limit),
                    Err(e) => {
                        eprintln!("Invalid time limit: {}", e);
                        std::process::exit(1);
                    }
                }
            }

            let solution = if relaxation {
                solver.solve_relaxation(&compiled.model)
            } else {
                solver.solve(&compiled.model)
            };
            tracing::info!(
                component = "cli",
                operation = "solve",
                status = %solution.status,
                nodes = solution.stats.nodes,
                "Solved {}",
                file.display()
            );

            let report = MealReport::new(&compiled, &solution);
            match format {
                Format::Json => match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error serializing report: {}", e);
                        std::process::exit(1);
                    }
                },
                Format::Pretty => println!("{}", report),
            }

            if !solution.status.has_solution() {
                std::process::exit(1);
            }
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_env("MEALOPT_LOG").unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load(file: &Path) -> CompiledDiet {
    let diet = match Diet::load(file) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error reading {}: {}", file.display(), e);
            std::process::exit(1);
        }
    };

    match diet.compile() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Compile error: {}", e);
            std::process::exit(1);
        }
    }
}
