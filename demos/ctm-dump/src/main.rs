//! ctm-dump — read freeway CTM reports from a report database, print them as
//! JSON and export the flat rows to CSV.
//!
//! ```text
//! ctm-dump <store.json> <network> <run> <start_ms> <end_ms> [--debug | --ensemble] [--seed] [--out DIR]
//! ```
//!
//! `--seed` first writes a few synthetic reports for the requested network
//! and run so the tool can be tried against an empty database.  Set
//! `RUST_LOG=debug` to see store timings.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ctm_core::{LinkId, NetworkId, RunId, TimeInterval, Timestamp};
use ctm_output::{CsvRowWriter, ReportExporter};
use ctm_report::{Fd, FreewayCtmEnsembleReport, FreewayCtmReport, FreewayCtmState, FreewayLinkFlowState, FreewayLinkState};
use ctm_store::{ReportFilter, ReportStore, SqliteSession, StoreConfig};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED_REPORTS:     i64   = 5;
const SEED_STEP_MS:     i64   = 60_000; // one report per minute
const SEED_MEMBERS:     usize = 3;
const SEED_ORIGIN_LINK: LinkId = LinkId(1);
const SEED_LINKS:       [LinkId; 3] = [LinkId(2), LinkId(3), LinkId(4)];

// ── Arguments ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq)]
enum Mode {
    Standard,
    Debug,
    Ensemble,
}

struct Args {
    config:   PathBuf,
    filter:   ReportFilter,
    mode:     Mode,
    seed:     bool,
    out_dir:  Option<PathBuf>,
}

const USAGE: &str =
    "usage: ctm-dump <store.json> <network> <run> <start_ms> <end_ms> [--debug | --ensemble] [--seed] [--out DIR]";

fn parse_args() -> Result<Args> {
    let mut positional = Vec::new();
    let mut mode = Mode::Standard;
    let mut seed = false;
    let mut out_dir = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--debug"    => mode = Mode::Debug,
            "--ensemble" => mode = Mode::Ensemble,
            "--seed"     => seed = true,
            "--out"      => out_dir = Some(PathBuf::from(args.next().context("--out needs a directory")?)),
            "-h" | "--help" => bail!(USAGE),
            _            => positional.push(arg),
        }
    }
    let [config, network, run, start, end] = <[String; 5]>::try_from(positional)
        .map_err(|_| anyhow::anyhow!(USAGE))?;

    let interval = TimeInterval::new(
        Timestamp(start.parse().context("start_ms")?),
        Timestamp(end.parse().context("end_ms")?),
    )?;
    let filter = ReportFilter::new(
        NetworkId(network.parse().context("network")?),
        RunId(run.parse().context("run")?),
        interval,
    )
    .debug(mode == Mode::Debug);

    Ok(Args { config: PathBuf::from(config), filter, mode, seed, out_dir })
}

// ── Synthetic data ────────────────────────────────────────────────────────────

fn synthetic_state(t: i64, spread: f64) -> FreewayCtmState {
    let mut state = FreewayCtmState::default();
    state.set_queue_length(SEED_ORIGIN_LINK, 2.0 + spread * t as f64);
    for (i, &link) in SEED_LINKS.iter().enumerate() {
        let density = 20.0 + 5.0 * i as f64 + spread;
        state.merge_link_state(link, FreewayLinkState::new(density, 100.0 - density));
        state.merge_link_flow_state(link, FreewayLinkFlowState::new(1_800.0 - density, 1_790.0 - density));
    }
    state
}

fn seed(store: &ReportStore<'_, SqliteSession>, filter: &ReportFilter) -> Result<()> {
    let times = (0..SEED_REPORTS).map(|i| filter.interval.start.offset_ms(i * SEED_STEP_MS));

    let mut reports = Vec::new();
    let mut ensembles = Vec::new();
    for (i, time) in times.enumerate() {
        let mut report = FreewayCtmReport::new(filter.network_id, filter.run_id, time);
        report.mean = Some(synthetic_state(i as i64, 0.0));
        report.std_dev = Some(synthetic_state(0, 0.5));
        report.fd = Some(
            SEED_LINKS
                .iter()
                .map(|&l| (l, Fd { free_flow_speed: Some(105.0), capacity: Some(2_000.0), ..Fd::default() }))
                .collect::<BTreeMap<_, _>>(),
        );
        reports.push(report);

        let mut ensemble = FreewayCtmEnsembleReport::new(filter.network_id, filter.run_id, time);
        for k in 0..SEED_MEMBERS {
            ensemble.ensemble_state.states.push(synthetic_state(i as i64, k as f64));
        }
        ensembles.push(ensemble);
    }

    let rows = store.write_reports(&reports, false)? + store.write_ensembles(&ensembles)?;
    info!(reports = reports.len(), ensembles = ensembles.len(), rows, "seeded report database");
    Ok(())
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;
    let config = StoreConfig::from_json_path(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    let session = SqliteSession::open(&config)?;
    let store = ReportStore::new(&session, config.aggregation);
    if args.seed {
        seed(&store, &args.filter)?;
    }

    let t0 = Instant::now();
    let exporter = match &args.out_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            Some(ReportExporter::new(CsvRowWriter::new(dir)?, config.aggregation))
        }
        None => None,
    };

    let (count, exporter) = if args.mode == Mode::Ensemble {
        let reports = store.read_ensembles(&args.filter)?;
        println!("{}", serde_json::to_string_pretty(&reports)?);
        let exporter = exporter.map(|mut e| e.export_ensembles(&reports).map(|_| e)).transpose()?;
        (reports.len(), exporter)
    } else {
        let reports = store.read_reports(&args.filter)?;
        println!("{}", serde_json::to_string_pretty(&reports)?);
        let exporter = exporter.map(|mut e| e.export_reports(&reports).map(|_| e)).transpose()?;
        (reports.len(), exporter)
    };

    if let Some(mut exporter) = exporter {
        exporter.finish()?;
        info!(rows = exporter.rows_written(), "exported report rows");
    }
    info!(
        reports = count,
        elapsed_ms = t0.elapsed().as_secs_f64() * 1_000.0,
        "done"
    );
    Ok(())
}
