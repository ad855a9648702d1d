use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use kernel::{BufferConsole, Kernel};
use storage::{Disk, FormatMode};
use types::{Config, DiskGeometry, SchedulingAlgorithm};

use os::report::{DiskRow, RunSummary};
use os::{logger, program};

/// Educational operating-system simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load hex program files as processes and run them to completion
    Run(RunArgs),
    /// Inspect or modify a persisted disk image
    Disk(DiskArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Program files holding hex-pair opcode text
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Priority of each program, in file order
    #[arg(long)]
    priority: Vec<u32>,

    #[command(flatten)]
    machine: MachineArgs,

    /// Stop the clock after this many ticks
    #[arg(long, default_value_t = 100_000)]
    max_ticks: u64,

    /// Disk image to boot from and save back to
    #[arg(long)]
    disk: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Print every executed instruction
    #[arg(long)]
    trace: bool,
}

#[derive(Args, Debug)]
struct MachineArgs {
    /// Bytes per memory partition
    #[arg(long, default_value_t = Config::DEFAULT_PARTITION_SIZE)]
    partition_size: usize,

    /// Number of memory partitions
    #[arg(long, default_value_t = Config::DEFAULT_PARTITION_COUNT)]
    partitions: usize,

    /// Round-robin quantum in cycles
    #[arg(long, default_value_t = Config::DEFAULT_QUANTUM)]
    quantum: u32,

    /// Scheduling algorithm (rr, fcfs, priority)
    #[arg(long, default_value_t = SchedulingAlgorithm::RoundRobin)]
    schedule: SchedulingAlgorithm,

    /// Priority of programs submitted without one
    #[arg(long, default_value_t = Config::DEFAULT_PRIORITY)]
    default_priority: u32,

    #[command(flatten)]
    geometry: GeometryArgs,
}

#[derive(Args, Debug)]
struct GeometryArgs {
    #[arg(long, default_value_t = Config::DEFAULT_TRACKS)]
    tracks: u8,

    #[arg(long, default_value_t = Config::DEFAULT_SECTORS)]
    sectors: u8,

    #[arg(long, default_value_t = Config::DEFAULT_BLOCKS)]
    blocks: u8,

    /// Bytes per block, four of which are header
    #[arg(long, default_value_t = Config::DEFAULT_BLOCK_SIZE)]
    block_size: usize,
}

#[derive(Args, Debug)]
struct DiskArgs {
    /// Disk image file; created when missing
    #[arg(long)]
    disk: PathBuf,

    #[command(flatten)]
    geometry: GeometryArgs,

    #[command(subcommand)]
    action: DiskCommand,
}

#[derive(Subcommand, Debug)]
enum DiskCommand {
    /// List files
    Ls {
        /// Include hidden files
        #[arg(short, long)]
        all: bool,
    },
    /// Create an empty file
    Create { name: String },
    /// Replace a file's contents with text
    Write { name: String, text: String },
    /// Print a file as text
    Cat { name: String },
    /// Delete a file
    Rm { name: String },
    /// Format the whole disk
    Format {
        /// Keep payload bytes, reset only the block headers
        #[arg(long)]
        quick: bool,
    },
    /// Dump the block table
    Table {
        /// Only show blocks in use
        #[arg(long)]
        used: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl GeometryArgs {
    fn geometry(&self) -> DiskGeometry {
        DiskGeometry {
            tracks: self.tracks,
            sectors: self.sectors,
            blocks: self.blocks,
            block_size: self.block_size,
        }
    }
}

impl MachineArgs {
    fn config(&self) -> Result<Config> {
        let config = Config {
            partition_size: self.partition_size,
            partition_count: self.partitions,
            quantum: self.quantum,
            algorithm: self.schedule,
            default_priority: self.default_priority,
            disk: self.geometry.geometry(),
        };
        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose).context("Failed to install logger")?;

    match cli.command {
        Command::Run(args) => run_programs(args),
        Command::Disk(args) => disk_command(args),
    }
}

fn run_programs(args: RunArgs) -> Result<()> {
    let config = args.machine.config()?;
    let mut kernel = Kernel::new(config.clone(), BufferConsole::new())?;
    if let Some(path) = &args.disk {
        if path.exists() {
            let disk = Disk::load(path, config.disk)
                .with_context(|| format!("Failed to load disk {}", path.display()))?;
            kernel = kernel.with_disk(disk)?;
        }
    }
    kernel.set_verbose(args.trace);

    for (i, file) in args.files.iter().enumerate() {
        let image = program::load_program(file)?;
        let pid = kernel
            .create(&image, args.priority.get(i).copied())
            .with_context(|| format!("Failed to create a process from {}", file.display()))?;
        log::info!("{} loaded as pid {}", file.display(), pid);
    }
    kernel.run_all()?;

    let ticks = kernel.run_until_idle(args.max_ticks);
    if !kernel.is_idle() {
        log::warn!("stopped after {} ticks with work remaining", ticks);
    }

    if let Some(path) = &args.disk {
        kernel
            .disk()
            .save(path)
            .with_context(|| format!("Failed to save disk {}", path.display()))?;
    }

    let output = kernel.console_mut().take_output();
    let summary = RunSummary::collect(&kernel, ticks, output);
    match args.format {
        OutputFormat::Text => summary.print_text(),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}

fn open_disk(path: &Path, geometry: DiskGeometry) -> Result<Disk> {
    if path.exists() {
        Disk::load(path, geometry).with_context(|| format!("Failed to load disk {}", path.display()))
    } else {
        Ok(Disk::new(geometry)?)
    }
}

fn disk_command(args: DiskArgs) -> Result<()> {
    let geometry = args.geometry.geometry();
    Config {
        disk: geometry,
        ..Config::default()
    }
    .validate()
    .map_err(anyhow::Error::msg)?;
    let mut disk = open_disk(&args.disk, geometry)?;

    let dirty = match args.action {
        DiskCommand::Ls { all } => {
            let files = if all { disk.list_all() } else { disk.list() };
            for name in files {
                let size = disk.file_size(&name)?;
                println!("{:>6}  {}", size, name);
            }
            false
        }
        DiskCommand::Create { name } => {
            disk.create(&name)?;
            println!("{} {}", "created".green(), name);
            true
        }
        DiskCommand::Write { name, text } => {
            disk.write_text(&name, &text)?;
            println!("{} {} bytes to {}", "wrote".green(), text.len(), name);
            true
        }
        DiskCommand::Cat { name } => {
            println!("{}", disk.read_text(&name)?);
            false
        }
        DiskCommand::Rm { name } => {
            disk.delete(&name)?;
            println!("{} {}", "deleted".green(), name);
            true
        }
        DiskCommand::Format { quick } => {
            let mode = if quick { FormatMode::Quick } else { FormatMode::Full };
            disk.format(mode);
            println!("{} ({:?})", "formatted".green(), mode);
            true
        }
        DiskCommand::Table { used } => {
            print_block_table(&disk, used);
            false
        }
    };

    if dirty {
        disk.save(&args.disk)
            .with_context(|| format!("Failed to save disk {}", args.disk.display()))?;
    }
    Ok(())
}

fn print_block_table(disk: &Disk, used_only: bool) {
    println!("{}", "T:S:B  USE  NEXT    DATA".bold());
    for (tsb, block) in disk.block_table() {
        if used_only && !block.in_use {
            continue;
        }
        let next = block
            .successor
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        let data = hex::encode_upper(&block.data);
        let in_use = if block.in_use { "1".green() } else { "0".normal() };
        println!("{:<6} {:>3}  {:<7} {}", tsb.to_string(), in_use, next, data);
    }

    let row = DiskRow::from_disk(disk);
    if row.files.is_empty() {
        println!("{}", "(no visible files)".dimmed());
    }
    println!(
        "{} blocks in use, {} data blocks free",
        row.used_blocks, row.free_data_blocks
    );
}
