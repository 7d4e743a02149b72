//! Facts example
//!
//! Connects to a Comware switch and prints its facts, interfaces and
//! neighbor tables as JSON.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example facts -- --host sw1 --user admin --password secret
//! ```

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use cmwsh::DriverBuilder;
use cmwsh::facts::PingOptions;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    println!("Connecting to {}:{}...", args.host, args.port);

    let mut builder = DriverBuilder::new(&args.host)
        .port(args.port)
        .username(&args.user)
        .timeout(Duration::from_secs(args.timeout));

    if let Some(password) = &args.password {
        builder = builder.password(password);
    } else if let Some(key_path) = &args.key {
        builder = builder.private_key(key_path);
    } else {
        eprintln!("Error: Must provide either --password or --key");
        std::process::exit(1);
    }

    let mut device = builder.build()?;
    device.open().await?;

    let facts = device.get_facts().await?;
    println!("{}", serde_json::to_string_pretty(&facts)?);

    let interfaces = device.get_interfaces().await?;
    println!("{}", serde_json::to_string_pretty(&interfaces)?);

    let addresses = device.get_interfaces_ip().await?;
    println!("{}", serde_json::to_string_pretty(&addresses)?);

    let neighbors = device.get_lldp_neighbors().await?;
    println!("{}", serde_json::to_string_pretty(&neighbors)?);

    let arp = device.get_arp_table().await?;
    println!("{} ARP entries", arp.len());

    if let Some(target) = &args.ping {
        let result = device.ping(target, &PingOptions::default()).await?;
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    device.close().await?;
    Ok(())
}

struct Args {
    host: String,
    port: u16,
    user: String,
    password: Option<String>,
    key: Option<PathBuf>,
    timeout: u64,
    ping: Option<String>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut parsed = Self {
            host: "localhost".to_string(),
            port: 22,
            user: env::var("USER").unwrap_or_else(|_| "admin".to_string()),
            password: None,
            key: None,
            timeout: 30,
            ping: None,
        };

        let mut i = 1;
        while i < args.len() {
            let value = args.get(i + 1).cloned();
            match args[i].as_str() {
                "--host" | "-h" => parsed.host = value.unwrap_or(parsed.host),
                "--port" | "-p" => {
                    parsed.port = value.and_then(|v| v.parse().ok()).unwrap_or(22)
                }
                "--user" | "-u" => parsed.user = value.unwrap_or(parsed.user),
                "--password" | "-P" => parsed.password = value,
                "--key" | "-k" => parsed.key = value.map(PathBuf::from),
                "--timeout" | "-t" => {
                    parsed.timeout = value.and_then(|v| v.parse().ok()).unwrap_or(30)
                }
                "--ping" => parsed.ping = value,
                other => {
                    eprintln!("Unknown argument: {other}");
                    std::process::exit(1);
                }
            }
            i += 2;
        }

        parsed
    }
}
