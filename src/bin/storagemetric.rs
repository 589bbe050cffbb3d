/**
* Copyright 2019 Comcast Cable Communications Management, LLC
*
* Licensed under the Apache License, Version 2.0 (the "License");
* you may not use this file except in compliance with the License.
* You may obtain a copy of the License at
*
* http://www.apache.org/licenses/LICENSE-2.0
*
* Unless required by applicable law or agreed to in writing, software
* distributed under the License is distributed on an "AS IS" BASIS,
* WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
* See the License for the specific language governing permissions and
* limitations under the License.
*
* SPDX-License-Identifier: Apache-2.0
*/

// Connects to an array and dumps its performance metrics as json.
// Log verbosity comes from STORAGEMETRIC_LOGLEVEL.

use std::fmt::Debug;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use log::error;
use serde::Serialize;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use storagemetric::error::{MetricsResult, StorageError};
use storagemetric::powermax::{PowerMax, PowerMaxConfig};
use storagemetric::rest::HttpOptions;
use storagemetric::unity::{Unity, UnityConfig};

const MAX_WINDOW_SECS: i64 = 365 * 24 * 3600;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Array management address
    #[arg(long, global = true, default_value = "")]
    server: String,

    #[arg(long, global = true, default_value = "admin")]
    username: String,

    #[arg(long, global = true, default_value = "")]
    password: String,

    /// Accept self-signed management certificates
    #[arg(long, global = true)]
    insecure: bool,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Powermax(PowerMaxArgs),
    Unity(UnityArgs),
}

#[derive(Args, Debug)]
struct PowerMaxArgs {
    #[arg(long, default_value_t = 8443)]
    port: u16,

    #[arg(long)]
    symmid: String,

    /// How far back to look for samples, in seconds (at most one year)
    #[arg(long, default_value_t = 360, value_parser = clap::value_parser!(i64).range(1..=MAX_WINDOW_SECS))]
    window: i64,

    #[arg(long)]
    storage_group: Option<String>,

    #[arg(long)]
    director: Option<String>,
}

#[derive(Args, Debug)]
struct UnityArgs {
    /// Real time query interval in seconds
    #[arg(long, default_value_t = 10)]
    interval: u64,

    /// Metric paths for the real time query
    #[arg(long = "path", default_values_t = vec![
        "sp.*.cpu.summary.busyTicks".to_string(),
        "sp.*.cpu.summary.idleTicks".to_string(),
    ])]
    paths: Vec<String>,

    /// Metric path to pull history for
    #[arg(long, default_value = "sp.*.cpu.summary.utilization")]
    history: String,
}

fn pretty_print<T: Serialize + Debug>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(s) => println!("{}", s),
        Err(_) => println!(
            "Data cannot be reformatted, the original data is:\n {:#?}",
            data
        ),
    }
}

fn http_options(cli: &Cli) -> HttpOptions {
    HttpOptions {
        accept_invalid_certs: cli.insecure,
        timeout_secs: cli.timeout,
        ..HttpOptions::default()
    }
}

fn powermax(cli: &Cli, args: &PowerMaxArgs) -> MetricsResult<()> {
    let config = PowerMaxConfig {
        endpoint: cli.server.clone(),
        port: Some(args.port),
        user: cli.username.clone(),
        password: cli.password.clone(),
        symmetrix_id: args.symmid.clone(),
        http: http_options(cli),
    };
    let pmax = PowerMax::connect(&config)?;

    let dirs = pmax.list_fe_directors()?;
    pretty_print(&dirs);

    let director = match args.director {
        Some(ref d) => Some(d.clone()),
        None => dirs.first().cloned(),
    };
    if let Some(ref d) = director {
        pretty_print(&pmax.list_director_ports(d)?);
    }

    let groups = pmax.list_storage_groups()?;
    pretty_print(&groups);

    let window = chrono::Duration::try_seconds(args.window).ok_or_else(|| {
        StorageError::ValidationError(format!("window of {} seconds is out of range", args.window))
    })?;
    let to = Utc::now();
    let from = to - window;

    let group = match args.storage_group {
        Some(ref g) => Some(g.clone()),
        None => groups.first().cloned(),
    };
    if let Some(ref g) = group {
        pretty_print(&pmax.storage_group_metric(g, &from, &to)?);
    }
    if let Some(ref d) = director {
        pretty_print(&pmax.fe_director_metric(d, &from, &to)?);
    }
    pretty_print(&pmax.array_metric(&from, &to)?);
    Ok(())
}

fn unity(cli: &Cli, args: &UnityArgs) -> MetricsResult<()> {
    let config = UnityConfig {
        endpoint: cli.server.clone(),
        port: None,
        user: cli.username.clone(),
        password: cli.password.clone(),
        http: http_options(cli),
    };
    let array = Unity::connect(&config)?;

    let id = array.create_real_time_query(&args.paths, args.interval)?;
    pretty_print(&array.real_time_query(id)?);

    // The first interval has to pass before anything is sampled
    thread::sleep(Duration::from_secs(args.interval));
    let fetched = array.fetch_result(id);
    let deleted = array.delete_real_time_query(id);
    pretty_print(&fetched?);
    deleted?;

    pretty_print(&array.historical_metric(&args.history)?);
    array.disconnect()
}

fn main() {
    let level = std::env::var("STORAGEMETRIC_LOGLEVEL")
        .ok()
        .and_then(|l| LevelFilter::from_str(&l).ok())
        .unwrap_or(LevelFilter::Warn);
    if let Err(e) = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Unable to initialize logging: {}", e);
    }

    let cli = Cli::parse();
    let res = match cli.command {
        Commands::Powermax(ref args) => powermax(&cli, args),
        Commands::Unity(ref args) => unity(&cli, args),
    };
    if let Err(e) = res {
        error!("{}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

#[test]
fn test_window_is_bounded() {
    let cli = Cli::try_parse_from(["storagemetric", "powermax", "--symmid", "000197900151"]).unwrap();
    match cli.command {
        Commands::Powermax(ref args) => assert_eq!(args.window, 360),
        _ => panic!("expected the powermax subcommand"),
    }

    let max = MAX_WINDOW_SECS.to_string();
    assert!(
        Cli::try_parse_from(["storagemetric", "powermax", "--symmid", "1", "--window", max.as_str()]).is_ok()
    );
    for bad in &["0", "-5", "9223372036854775807"] {
        assert!(
            Cli::try_parse_from(["storagemetric", "powermax", "--symmid", "1", "--window", *bad]).is_err(),
            "window {} accepted",
            bad
        );
    }
}
