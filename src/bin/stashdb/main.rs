use anyhow::Result;
use clap::Parser;

mod cli;
mod cmd_exists;
mod cmd_get;
mod cmd_init;
mod cmd_put;
mod cmd_status;
mod cmd_verify;
mod util;

fn main() {
    // Логи по RUST_LOG (по умолчанию молчим)
    let _ = env_logger::try_init();

    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    match cli.cmd {
        cli::Cmd::Init {
            path,
            key_size,
            segments,
            bloom_fp,
            capacity,
        } => cmd_init::exec(path, key_size, segments, bloom_fp, capacity),

        cli::Cmd::Put {
            path,
            key,
            value,
            value_file,
        } => cmd_put::exec(path, key, value, value_file),

        cli::Cmd::Get { path, key, out } => cmd_get::exec(path, key, out),

        cli::Cmd::Exists { path, key } => cmd_exists::exec(path, key),

        cli::Cmd::Status { path, json } => cmd_status::exec(path, json),

        cli::Cmd::Verify { path, json } => cmd_verify::exec(path, json),
    }
}
