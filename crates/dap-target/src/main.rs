use clap::{Parser, Subcommand, ValueEnum};
use dap_target_core::TargetIter;
use env_logger::Env;
use log::*;

use std::io::Write;

use crate::{
    detect::detect,
    export::{export, inspect},
    report::{check, image, list, memory_map, show},
};

mod detect;
mod export;
mod report;

#[derive(Subcommand, Debug)]
enum Command {
    /// List every known target
    List,
    /// Print the record of a target
    #[command(arg_required_else_help = true)]
    Show {
        /// Target name or board id (atsam4e-home-gateway, 0240, etc.)
        #[clap(value_parser = target_parser)]
        target: String,
    },
    /// Validate every target record
    Check,
    /// Print the GDB memory map of a target
    #[command(arg_required_else_help = true)]
    MemoryMap {
        /// Target name or board id
        #[clap(value_parser = target_parser)]
        target: String,
    },
    /// Write the firmware record of a target
    #[command(arg_required_else_help = true)]
    Export {
        /// Target name or board id
        #[clap(value_parser = target_parser)]
        target: String,

        /// Output record file
        output: String,

        /// Provisioned secret replacing the placeholder
        #[clap(short, long, env = "DAP_TARGET_SECRET", hide_env_values = true)]
        secret: Option<String>,
    },
    /// Decode a firmware record file
    #[command(arg_required_else_help = true)]
    Inspect {
        /// Input record file
        input: String,
    },
    /// Check that an ELF image fits a target
    #[command(arg_required_else_help = true)]
    Image {
        /// Target name or board id
        #[clap(value_parser = target_parser)]
        target: String,

        /// Input ELF file
        input: String,
    },
    /// Find mounted DAPLink drives and name their target
    Detect,
}

fn target_parser(s: &str) -> Result<String, String> {
    if let Some(target) = TargetIter::lookup(s) {
        Ok(target.board_name().to_string())
    } else {
        Err(format!("Unknown target '{}'", s))
    }
}

#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Set the logging verbosity
    #[clap(short, long, value_enum, global = true, default_value_t = LogLevel::Info)]
    verbose: LogLevel,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Off => LevelFilter::Off,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(Env::default())
        .filter_level(cli.verbose.into())
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            let level = record.level();
            if level == Level::Info {
                writeln!(buf, "{}", record.args())
            } else {
                writeln!(buf, "{}: {}", record.level(), record.args())
            }
        })
        .init();

    let command = match cli.command {
        Some(command) => command,
        None => return Ok(()),
    };

    // Target names have already been verified by target_parser
    let find = |name: &str| {
        TargetIter::lookup(name).ok_or_else(|| format!("Unknown target '{}'", name))
    };

    match command {
        Command::List => {
            list();
            Ok(())
        }
        Command::Show { target } => {
            show(find(&target)?.as_ref());
            Ok(())
        }
        Command::Check => check(),
        Command::MemoryMap { target } => {
            memory_map(find(&target)?.as_ref());
            Ok(())
        }
        Command::Export {
            target,
            output,
            secret,
        } => export(&output, find(&target)?.as_ref(), secret.as_deref()),
        Command::Inspect { input } => inspect(&input),
        Command::Image { target, input } => image(&input, find(&target)?.as_ref()),
        Command::Detect => detect(),
    }
}
