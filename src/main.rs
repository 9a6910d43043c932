use clap::Parser;

mod app;
mod audio;
mod catalog;
mod cli;
mod config;
mod identity;
mod player;
mod playlist;
mod runtime;
mod storage;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run(cli::Cli::parse())
}
