//! jeonyu: exclusive floor area (전유면적) of a Korean building unit.
//!
//! Writes one JSON payload to stdout per invocation; logs go to stderr.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use jeonyu_client::{ClientConfig, JusoClient, RegistryClient};
use jeonyu_core::{
    AreaResult, CandidatePolicy, FloorDescriptor, FloorOrder, ResolveError, Resolver,
    ResolverConfig, SubUnitPolicy,
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod display;
mod payload;

use payload::{
    AddressPart, Envelope, Failure, FloorDetail, FloorLabel, FloorList, UnitArea, UnitAreaMissing,
    max_floor,
};

const BUILD: &str = env!("JEONYU_BUILD");

#[derive(Parser, Debug)]
#[command(name = "jeonyu")]
#[command(about = "Resolve a building unit's exclusive area from its address")]
#[command(version = BUILD)]
struct Cli {
    #[command(flatten)]
    opts: GlobalOpts,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalOpts {
    /// juso.go.kr search API key
    #[arg(long, env = "JUSO_KEY", hide_env_values = true, global = true)]
    juso_key: Option<String>,

    /// Building registry hub service key (decoded form)
    #[arg(long, env = "BLD_KEY", hide_env_values = true, global = true)]
    bld_key: Option<String>,

    #[arg(long, env = "JEONYU_JUSO_URL", global = true)]
    juso_url: Option<String>,

    #[arg(long, env = "JEONYU_REGISTRY_URL", global = true)]
    registry_url: Option<String>,

    /// Per-call deadline for each upstream request, in seconds
    #[arg(long, env = "JEONYU_TIMEOUT_SECS", default_value_t = 10.0, allow_negative_numbers = true, global = true)]
    timeout_secs: f64,

    /// Keep or drop sub-unit suffixes ("1209-1") when comparing unit labels
    #[arg(long, env = "JEONYU_SUB_UNIT", value_enum, default_value_t = SubUnitArg::Preserve, global = true)]
    sub_unit: SubUnitArg,

    #[arg(long, env = "JEONYU_FLOOR_ORDER", value_enum, default_value_t = FloorOrderArg::BelowFirst, global = true)]
    floor_order: FloorOrderArg,

    #[arg(long, env = "JEONYU_CANDIDATE", value_enum, default_value_t = CandidateArg::First, global = true)]
    candidate: CandidateArg,

    /// Print a human-readable card instead of JSON
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the floors of a building
    Floors { address: String },
    /// Show one floor: segments, representative area and units
    Floor {
        address: String,
        #[arg(long, allow_hyphen_values = true)]
        floor: String,
    },
    /// Resolve the exclusive area of one unit
    Area {
        address: String,
        #[arg(long, allow_hyphen_values = true)]
        floor: String,
        #[arg(long)]
        unit: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SubUnitArg {
    Preserve,
    Discard,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FloorOrderArg {
    BelowFirst,
    AboveFirst,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CandidateArg {
    First,
    BestLotMatch,
}

impl GlobalOpts {
    fn resolver_config(&self) -> Result<ResolverConfig> {
        if self.timeout_secs <= 0.0 {
            bail!("--timeout-secs must be a positive number");
        }
        let Ok(call_timeout) = Duration::try_from_secs_f64(self.timeout_secs) else {
            bail!("--timeout-secs {} is out of range", self.timeout_secs);
        };
        Ok(ResolverConfig {
            sub_unit_policy: match self.sub_unit {
                SubUnitArg::Preserve => SubUnitPolicy::Preserve,
                SubUnitArg::Discard => SubUnitPolicy::Discard,
            },
            floor_order: match self.floor_order {
                FloorOrderArg::BelowFirst => FloorOrder::BelowFirst,
                FloorOrderArg::AboveFirst => FloorOrder::AboveFirst,
            },
            candidate_policy: match self.candidate {
                CandidateArg::First => CandidatePolicy::First,
                CandidateArg::BestLotMatch => CandidatePolicy::BestLotMatch,
            },
            call_timeout,
            ..ResolverConfig::default()
        })
    }

    fn client_config(&self) -> Result<ClientConfig> {
        let juso_key = self.juso_key.clone().filter(|k| !k.trim().is_empty());
        let bld_key = self.bld_key.clone().filter(|k| !k.trim().is_empty());
        let (Some(juso_key), Some(bld_key)) = (juso_key, bld_key) else {
            bail!("JUSO_KEY and BLD_KEY must both be set");
        };
        let mut config = ClientConfig::with_keys(juso_key, bld_key);
        if let Some(url) = &self.juso_url {
            config.juso_base_url = url.clone();
        }
        if let Some(url) = &self.registry_url {
            config.registry_base_url = url.clone();
        }
        Ok(config)
    }
}

/// Payload plus the exit code it implies.
struct Report {
    payload: serde_json::Value,
    exit: ExitCode,
}

impl Report {
    fn new<T: Serialize>(ok: bool, body: T, exit: ExitCode) -> Result<Self> {
        let payload = serde_json::to_value(Envelope::new(ok, BUILD, body))?;
        Ok(Self { payload, exit })
    }
}

fn parse_floor(input: &str) -> Result<FloorDescriptor, ResolveError> {
    FloorDescriptor::parse_input(input).ok_or_else(|| ResolveError::InputInvalid {
        field: "floor",
        reason: format!("{input:?} is not a floor (expected e.g. 3, B1, 지하2)"),
    })
}

async fn run(cli: &Cli) -> Result<Report> {
    let resolver_config = cli.opts.resolver_config()?;
    let client_config = cli.opts.client_config()?;
    let resolver = Resolver::new(
        JusoClient::new(&client_config).context("building address client")?,
        RegistryClient::new(&client_config).context("building registry client")?,
        resolver_config,
    );

    match &cli.command {
        Command::Floors { address } => {
            let resolved = resolver.resolve_address(address).await?;
            let floors = resolver.resolve_floors_only(&resolved.lot).await?;
            let body = FloorList::new(AddressPart::new(address, &resolved), floors.floors);
            Report::new(true, body, ExitCode::SUCCESS)
        }
        Command::Floor { address, floor } => {
            let floor = parse_floor(floor)?;
            let resolved = resolver.resolve_address(address).await?;
            let detail = resolver.resolve_floor_and_units(&resolved.lot, floor).await?;
            let body = FloorDetail {
                mode: "floor-detail",
                address: AddressPart::new(address, &resolved),
                max_floor: max_floor(&detail.floors),
                floors: detail.floors.into_iter().map(FloorLabel::from).collect(),
                floor: detail.floor.into(),
                floor_items: detail.floor_items,
                floor_pick: detail.pick,
                units: detail.units.units,
                note: detail.units.note,
            };
            Report::new(true, body, ExitCode::SUCCESS)
        }
        Command::Area {
            address,
            floor,
            unit,
        } => {
            let floor = parse_floor(floor)?;
            let resolved = resolver.resolve_address(address).await?;
            let result = resolver
                .resolve_unit_area(&resolved.lot, floor, unit)
                .await?;
            let address = AddressPart::new(address, &resolved);
            match result {
                AreaResult::Found(area) => {
                    let body = UnitArea {
                        mode: "unit-area",
                        address,
                        floor: floor.into(),
                        unit: unit.clone(),
                        area,
                    };
                    Report::new(true, body, ExitCode::SUCCESS)
                }
                AreaResult::NotFound(miss) => {
                    let body = UnitAreaMissing {
                        mode: "unit-area",
                        status: 404,
                        message: format!("no exclusive area for unit {unit:?} on floor {floor}"),
                        address,
                        floor: floor.into(),
                        unit: unit.clone(),
                        miss,
                    };
                    Report::new(false, body, ExitCode::from(2))
                }
            }
        }
    }
}

fn emit(payload: &serde_json::Value, pretty: bool) {
    if pretty {
        print!("{}", display::render_card(payload));
    } else {
        println!("{payload}");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jeonyu=info,jeonyu_core=info,jeonyu_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    info!(build = BUILD, "jeonyu starting");

    match run(&cli).await {
        Ok(report) => {
            emit(&report.payload, cli.opts.pretty);
            report.exit
        }
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "request failed");
            let failure = Failure::from_error(&err);
            match serde_json::to_value(Envelope::new(false, BUILD, failure)) {
                Ok(payload) => emit(&payload, cli.opts.pretty),
                Err(e) => eprintln!("failed to encode error payload: {e}"),
            }
            ExitCode::FAILURE
        }
    }
}
