use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser};
use hbtree::{build_tree, evaluate_tree, write_tree, BalanceMode, EvalStatus, Evaluation, HbtConfig};
use hbtree::{KeyBounds, HBT_MAX, HBT_MIN};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hbtree", about = "Build and evaluate height-balanced binary search trees")]
#[command(group(ArgGroup::new("mode").required(true).args(["build", "evaluate"])))]
struct Cli {
    /// Apply an operations file to an empty tree and write the tree stream.
    #[arg(short = 'b', num_args = 2, value_names = ["OPERATIONS", "TREE_OUT"])]
    build: Option<Vec<PathBuf>>,

    /// Decode a tree stream and report BST and balance checks.
    #[arg(short = 'e', value_name = "TREE_IN")]
    evaluate: Option<PathBuf>,

    /// Balance factor bookkeeping: height (true subtree heights) or proxy,
    /// which reproduces the reference tool's factor arithmetic.
    #[arg(long, default_value_t = BalanceMode::Height)]
    balance: BalanceMode,

    /// Smallest key accepted by the BST check.
    #[arg(long, default_value_t = HBT_MIN, allow_negative_numbers = true)]
    min_key: i32,

    /// Largest key accepted by the BST check.
    #[arg(long, default_value_t = HBT_MAX, allow_negative_numbers = true)]
    max_key: i32,

    /// Reject tree streams nested deeper than this (no limit by default).
    #[arg(long)]
    max_depth: Option<usize>,

    /// Do not echo pre-order keys after a build.
    #[arg(short, long)]
    quiet: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = HbtConfig {
        balance_mode: cli.balance,
        key_bounds: KeyBounds {
            min: cli.min_key,
            max: cli.max_key,
        },
        max_decode_depth: cli.max_depth,
        echo_keys: !cli.quiet,
    };
    config.validate()?;

    match (cli.build, cli.evaluate) {
        (Some(paths), None) => match paths.as_slice() {
            [operations, output] => run_build(operations, output, &config),
            _ => bail!("-b expects an operations file and a tree output file"),
        },
        (None, Some(input)) => run_evaluate(&input, &config),
        _ => bail!("exactly one of -b or -e is required"),
    }
}

fn run_build(operations_path: &Path, output_path: &Path, config: &HbtConfig) -> Result<()> {
    let reader = BufReader::new(File::open(operations_path).with_context(|| {
        format!(
            "failed to open operations file {}",
            operations_path.display()
        )
    })?);

    let tree = build_tree(reader, config).with_context(|| {
        format!(
            "failed to build height-balanced BST from {}",
            operations_path.display()
        )
    })?;

    // Output is only created once the whole stream has applied cleanly.
    let writer = BufWriter::new(File::create(output_path).with_context(|| {
        format!("failed to open tree output file {}", output_path.display())
    })?);
    write_tree(&tree, writer)
        .with_context(|| format!("failed to write tree to {}", output_path.display()))?;

    if config.echo_keys {
        let keys: Vec<String> = tree.pre_order().map(|n| n.key.to_string()).collect();
        println!("{}", keys.join(" "));
    }
    println!("Successfully built height-balanced BST");

    Ok(())
}

fn run_evaluate(input_path: &Path, config: &HbtConfig) -> Result<()> {
    let evaluation = match File::open(input_path) {
        Ok(file) => evaluate_tree(BufReader::new(file), config)
            .with_context(|| format!("failed to read tree from {}", input_path.display()))?,
        Err(err) => {
            eprintln!("failed to open tree input file {}: {}", input_path.display(), err);
            Evaluation::unreadable()
        }
    };

    println!("{evaluation}");
    println!("{}", evaluation.machine_line());

    match evaluation.status {
        EvalStatus::Valid => Ok(()),
        EvalStatus::Malformed => bail!("{} is not a well-formed tree stream", input_path.display()),
        EvalStatus::Unreadable => bail!("{} could not be opened", input_path.display()),
    }
}
