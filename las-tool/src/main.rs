mod convert;
mod dump;
mod info;
mod io;
mod opts;
mod show;
mod types;
mod utils;

use clap::Parser;
use log::{debug, error};
use opts::{AppOptions, Command};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = AppOptions::parse();

    // logger
    simple_logger::init_with_level(args.log_level).ok();

    let result = match args.command {
        Command::Info(args) => crate::info::info(args),
        Command::Dump(args) => crate::dump::dump(args),
        Command::Convert(args) => crate::convert::convert(args),
        Command::Show(args) => crate::show::show(args),
    };

    if let Err(err) = result {
        error!("{err:#}");
        debug!("{err:?}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
