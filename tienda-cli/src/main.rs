use std::io::Write;

use anyhow::Result;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use colored::Colorize;
use compile::Compile;
use log::{error, Level, LevelFilter};
use schema::Schema;

mod compile;
mod config;
mod macros;
mod schema;

/// Tienda cli
#[derive(Parser)]
#[clap(version)]
struct Opts {
    #[clap(subcommand)]
    pub subcmd: SubCommand,
}

#[derive(Subcommand)]
enum SubCommand {
    Compile(Compile),
    Schema(Schema),
}

#[tokio::main]
async fn main() {
    let opts: Opts = Opts::parse();

    let mut cmd = match opts.subcmd {
        SubCommand::Compile(compile) => match compile.subcmd {
            Some(compile::SubCommand::Database(database)) => runnable_cmd!(database),
            None => runnable_cmd!(compile),
        },
        SubCommand::Schema(schema) => runnable_cmd!(schema),
    };

    let log_level = if cmd.is_verbose() {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format(|buf, record| {
            let prefix = match record.level() {
                Level::Error => "error".red(),
                Level::Warn => "warn".yellow(),
                Level::Info => "info".blue(),
                Level::Debug => "debug".purple(),
                Level::Trace => "trace".cyan(),
            }
            .bold();
            writeln!(buf, "{} {}", prefix, record.args())
        })
        .init();

    if let Err(err) = cmd.run().await {
        error!("{}", err);
        if cmd.is_verbose() {
            let err_chain = err.chain().skip(1);
            if err_chain.clone().next().is_some() {
                eprintln!("{}", "\nCaused by:".italic().truecolor(190, 190, 190));
            }
            err_chain
                .for_each(|cause| eprintln!(" - {}", cause.to_string().truecolor(190, 190, 190)));
        }
        std::process::exit(1);
    }
}

#[async_trait]
pub trait Runnable {
    async fn run(&mut self) -> Result<()>;

    fn is_verbose(&self) -> bool {
        false
    }
}
