//! Stance controller CLI.
//!
//! Provides two modes of operation:
//! - `inspect`: Construct a controller context from files and print what it resolved
//! - `info`: Print workspace crate versions

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::error;

use stance_core::{ConfigError, KinematicTree, Side};
use stance_qp::{ConstructArgs, ControllerContext, ControllerError, SolverMethod, SolverOptions};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Whole-body QP controller configuration tool.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Construct a controller context and print a summary.
    Inspect(InspectArgs),

    /// Print crate information.
    Info,
}

#[derive(Args)]
struct InspectArgs {
    /// TOML file with all construction arguments.
    #[arg(long, conflicts_with_all = ["model", "config", "hardware"])]
    args: Option<PathBuf>,

    /// Robot URDF.
    #[arg(long, required_unless_present = "args")]
    model: Option<PathBuf>,

    /// Controller YAML document.
    #[arg(long, required_unless_present = "args")]
    config: Option<PathBuf>,

    /// Hardware joint-names YAML document.
    #[arg(long, required_unless_present = "args")]
    hardware: Option<PathBuf>,

    /// Opaque solver mode stored on the context.
    #[arg(long, default_value_t = 0)]
    solver_mode: i32,

    /// Solver method code (-1 automatic, 2 barrier, ...).
    #[arg(long, default_value_t = SolverMethod::Barrier.code(), allow_negative_numbers = true)]
    method: i32,

    /// Expected number of tracked bodies per parameter set.
    #[arg(long)]
    tracked_bodies: Option<usize>,
}

impl InspectArgs {
    fn into_construct_args(self) -> Result<ConstructArgs, ControllerError> {
        if let Some(path) = self.args {
            return ConstructArgs::from_file(path);
        }
        Ok(ConstructArgs {
            model_path: required(self.model, "--model")?,
            config_path: required(self.config, "--config")?,
            solver_mode: self.solver_mode,
            solver_options: SolverOptions {
                method: self.method,
            },
            hardware_joint_names_path: required(self.hardware, "--hardware")?,
            num_tracked_bodies: self.tracked_bodies,
        })
    }
}

fn required(path: Option<PathBuf>, flag: &str) -> Result<PathBuf, ControllerError> {
    path.ok_or_else(|| ConfigError::MissingField(flag.to_owned()).into())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn run_inspect(args: InspectArgs) -> Result<(), ControllerError> {
    let construct_args = args.into_construct_args()?;
    let ctx = ControllerContext::construct(&construct_args)?;
    print_summary(&ctx);
    ctx.teardown();
    Ok(())
}

fn print_summary(ctx: &ControllerContext) {
    let dofs = ctx.dofs();
    println!("robot: {}", ctx.robot.name());
    println!("nq={}, nv={}, nu={}", dofs.nq, dofs.nv, dofs.nu);
    println!();

    println!("parameter sets:");
    for name in ctx.param_sets.names() {
        if let Some(set) = ctx.param_sets.get(name) {
            println!("  {name:<16} tracked_bodies={}", set.body_motion.len());
        }
    }
    println!();

    let idx = &ctx.rpc.position_indices;
    println!("robot parts:");
    for side in Side::ALL {
        let code = side.code();
        println!("  foot.{code}   link {}", ctx.rpc.foot_ids[side]);
        println!("  legs.{code}   {:?}", idx.legs[side]);
        println!("  knee.{code}   {}", idx.knees[side]);
        println!("  ankles.{code} {:?}", idx.ankles[side]);
        println!("  arms.{code}   {:?}", idx.arms[side]);
    }
    println!("  neck     {:?}", idx.neck);
    println!("  back_bkz {}", idx.back_bkz);
    println!("  back_bky {}", idx.back_bky);
    println!();

    println!("actuators:");
    for (i, actuator) in ctx.robot.actuators().iter().enumerate() {
        println!(
            "  {:<16} [{:>8.1}, {:>8.1}]",
            actuator.joint, ctx.umin[i], ctx.umax[i]
        );
    }
    match ctx.input_joint_names.controller_to_robot() {
        Ok(_) => println!("hardware joint names: all {} resolved", dofs.nu),
        Err(e) => println!("hardware joint names: {e}"),
    }
    println!();

    let params = ctx.env.params();
    println!(
        "solver: method={:?} presolve={} max_iter={} tol={}",
        params.method,
        params.presolve,
        params.barrier.iteration_limit,
        params.barrier.convergence_tolerance
    );
}

fn run_info() {
    println!("stance v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("crates:");
    println!("  stance-core {}", env!("CARGO_PKG_VERSION"));
    println!("  stance-urdf {}", env!("CARGO_PKG_VERSION"));
    println!("  stance-qp   {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("edition: 2024");
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Inspect(args)) => match run_inspect(args) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!(kind = ?e.kind(), "{e}");
                ExitCode::FAILURE
            }
        },
        Some(Commands::Info) | None => {
            run_info();
            ExitCode::SUCCESS
        }
    }
}
