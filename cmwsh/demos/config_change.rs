//! Config change example
//!
//! Stages a merge or replace candidate, shows the diff, and commits it when
//! `--commit` is given. With `--rollback` the commit is undone right away.
//!
//! # Usage
//!
//! ```bash
//! # merge two lines
//! cargo run --example config_change -- sw1 admin secret --merge "vlan 10" " name users"
//!
//! # replace the whole configuration from a file
//! cargo run --example config_change -- sw1 admin secret --replace sw1.cfg --commit
//! ```

use std::env;
use std::path::PathBuf;

use cmwsh::{CandidateSource, DriverBuilder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 5 {
        eprintln!(
            "Usage: config_change <host> <user> <password> (--merge <line>... | --replace <file>) [--commit] [--rollback]"
        );
        std::process::exit(1);
    }

    let commit = args.iter().any(|a| a == "--commit");
    let rollback = args.iter().any(|a| a == "--rollback");
    let rest: Vec<&String> = args[4..]
        .iter()
        .filter(|a| *a != "--commit" && *a != "--rollback")
        .collect();

    let mut device = DriverBuilder::new(&args[0])
        .username(&args[1])
        .password(&args[2])
        .build()?;
    device.open().await?;

    match args[3].as_str() {
        "--merge" => device.load_merge_candidate(rest.iter().map(|l| l.as_str()))?,
        "--replace" => {
            let Some(path) = rest.first() else {
                eprintln!("--replace needs a file");
                std::process::exit(1);
            };
            device
                .load_replace_candidate(CandidateSource::File(PathBuf::from(path.as_str())))
                .await?;
        }
        other => {
            eprintln!("Unknown mode: {other}");
            std::process::exit(1);
        }
    }

    println!("=== diff ===\n{}", device.compare_config().await?);

    if commit {
        match device.commit_config().await {
            Ok(()) => println!("committed"),
            Err(e) => {
                eprintln!("{e}");
                device.discard_config().await?;
            }
        }
        if rollback {
            device.rollback().await?;
            println!("rolled back");
        }
    } else {
        device.discard_config().await?;
        println!("discarded");
    }

    device.close().await?;
    Ok(())
}
