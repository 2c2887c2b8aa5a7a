//! Cloudgen
//!
//! Launches the external point-cloud generation program with named
//! hyperparameter presets, and evaluates generated shapes.
//!
//! Commands:
//! - `train` / `test`: run a preset through `train.py` / `test.py`
//! - `presets`: list known presets
//! - `script`: print a preset as a standalone bash script
//! - `eval`: MMD, coverage and 1-NN accuracy against the ShapeNet test split

use clap::{Args, Parser, Subcommand};
use cloudgen_app::{EvalConfig, LoggingConfig, Result, evaluate, load_registry, resolve_run};
use cloudgen_data::Category;
use cloudgen_launch::{
    Dims, ExitPolicy, LaunchOutcome, Launcher, RunMode, RunOverrides, to_shell_script,
};
use std::path::PathBuf;

/// Cloudgen - point cloud generation runs and evaluation
#[derive(Parser, Debug)]
#[command(name = "cloudgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train a model with a preset
    Train(RunArgs),
    /// Test a trained model with a preset
    Test(RunArgs),
    /// List the available presets
    Presets {
        /// Additional presets in TOML
        #[arg(long)]
        presets_file: Option<PathBuf>,
    },
    /// Print a preset as a bash script
    Script {
        #[arg(long)]
        preset: String,
        #[arg(long)]
        presets_file: Option<PathBuf>,
    },
    /// Evaluate generated shapes against the test split
    Eval(EvalArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Preset to start from
    #[arg(long)]
    preset: Option<String>,
    /// Additional presets in TOML
    #[arg(long)]
    presets_file: Option<PathBuf>,
    /// Checkpoint to resume from or test
    #[arg(long)]
    checkpoint: Option<PathBuf>,
    /// Print the command instead of running it
    #[arg(long)]
    dry_run: bool,
    /// Directory to run the program in
    #[arg(long)]
    working_dir: Option<PathBuf>,
    /// Fail when the program fails
    #[arg(long)]
    strict: bool,

    #[arg(long)]
    cates: Option<String>,
    #[arg(long)]
    dims: Option<Dims>,
    #[arg(long)]
    latent_dims: Option<Dims>,
    #[arg(long)]
    num_blocks: Option<u32>,
    #[arg(long)]
    latent_num_blocks: Option<u32>,
    #[arg(long)]
    zdim: Option<u32>,
    #[arg(long)]
    batch_size: Option<u32>,
    #[arg(long)]
    lr: Option<f64>,
    #[arg(long)]
    epochs: Option<u32>,
    #[arg(long)]
    save_freq: Option<u32>,
    #[arg(long)]
    viz_freq: Option<u32>,
    #[arg(long)]
    log_freq: Option<u32>,
    #[arg(long)]
    val_freq: Option<u32>,
    #[arg(long)]
    distributed: Option<bool>,
    #[arg(long)]
    use_latent_flow: Option<bool>,
    #[arg(long)]
    train_t: Option<bool>,
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[arg(long)]
    log_name: Option<String>,
    #[arg(long)]
    dataset_type: Option<String>,
    /// Program that runs the script
    #[arg(long)]
    interpreter: Option<String>,
    #[arg(long)]
    script: Option<PathBuf>,
}

impl RunArgs {
    fn overrides(&self) -> RunOverrides {
        RunOverrides {
            cates: self.cates.clone(),
            dims: self.dims.clone(),
            latent_dims: self.latent_dims.clone(),
            num_blocks: self.num_blocks,
            latent_num_blocks: self.latent_num_blocks,
            zdim: self.zdim,
            batch_size: self.batch_size,
            lr: self.lr,
            epochs: self.epochs,
            save_freq: self.save_freq,
            viz_freq: self.viz_freq,
            log_freq: self.log_freq,
            val_freq: self.val_freq,
            distributed: self.distributed,
            use_latent_flow: self.use_latent_flow,
            train_t: self.train_t,
            resume_checkpoint: self.checkpoint.clone(),
            data_dir: self.data_dir.clone(),
            log_name: self.log_name.clone(),
            dataset_type: self.dataset_type.clone(),
            interpreter: self.interpreter.clone(),
            script: self.script.clone(),
        }
    }
}

#[derive(Args, Debug)]
struct EvalArgs {
    /// Root of the preprocessed ShapeNet dataset
    #[arg(long)]
    dataset_path: PathBuf,
    /// Generated models, in a directory named after the method (pointflow or ours)
    #[arg(long)]
    gen_path: PathBuf,
    /// Category to evaluate
    #[arg(long)]
    category: Category,
    /// Number of points per shape
    #[arg(long, default_value_t = 2048)]
    n_points: usize,
    #[arg(long, default_value_t = 50)]
    batch_size: usize,
    /// Negative leaves sampling unseeded
    #[arg(long, default_value_t = 41, allow_negative_numbers = true)]
    seed: i64,
    /// Also compute EMD based metrics
    #[arg(long)]
    emd: bool,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    LoggingConfig::with_level(&cli.log_level).init();

    if let Err(e) = run(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Train(args) => launch(RunMode::Train, &args),
        Command::Test(args) => launch(RunMode::Test, &args),
        Command::Presets { presets_file } => {
            let registry = load_registry(presets_file.as_deref())?;
            for (name, config) in registry.iter() {
                println!("{name}\t{} {}", config.mode, config.cates);
            }
            Ok(())
        }
        Command::Script {
            preset,
            presets_file,
        } => {
            let registry = load_registry(presets_file.as_deref())?;
            print!("{}", to_shell_script(registry.get(&preset)?));
            Ok(())
        }
        Command::Eval(args) => {
            let mut config = EvalConfig::new(args.dataset_path, args.gen_path, args.category);
            config.n_points = args.n_points;
            config.batch_size = args.batch_size;
            config.seed = args.seed;
            config.compute_emd = args.emd;

            let report = evaluate(&config)?;
            if args.json {
                println!("{}", report.to_json()?);
            } else {
                print!("{report}");
            }
            Ok(())
        }
    }
}

fn launch(mode: RunMode, args: &RunArgs) -> Result<()> {
    let registry = load_registry(args.presets_file.as_deref())?;
    let config = resolve_run(&registry, mode, args.preset.as_deref(), &args.overrides())?;
    let policy = if args.strict {
        ExitPolicy::Propagate
    } else {
        ExitPolicy::Mask
    };

    let mut launcher = Launcher::new().with_dry_run(args.dry_run);
    if let Some(dir) = &args.working_dir {
        launcher = launcher.with_working_dir(dir);
    }

    match launcher.run(&config)? {
        LaunchOutcome::DryRun(line) => println!("{line}"),
        LaunchOutcome::Finished(status) => {
            println!("Done");
            policy.check(status)?;
        }
    }
    Ok(())
}
