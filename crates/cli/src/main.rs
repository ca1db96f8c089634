mod render;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use barcode_bridge_core::{
    BarcodeApi, InstallOutcome, ItemCodes, MemoryStore, PriceMode, RecordStore, ResolverConfig,
    SettingsStore, Snapshot,
};
use barcode_bridge_settings::{DEFAULT_PRICE_LIST, load_settings_from_str};
use barcode_bridge_sqlite::SqliteStore;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::render::Format;

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "barcode-bridge",
    version,
    about = "Resolve item barcodes, selling prices, and label settings for barcode label printing"
)]
struct Cli {
    /// SQLite database laid out like the host platform's tables. Ignored by
    /// record queries when `--snapshot` is given.
    #[arg(long, global = true, env = "BARCODE_BRIDGE_DB")]
    db: Option<PathBuf>,

    /// JSON snapshot of host records, loaded into memory.
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Output mode: "pretty" for terminal text, "json" for machine-readable
    /// JSON. Defaults to "pretty" when stdout is a TTY, "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    /// Price list used when neither the command nor stored settings name one.
    #[arg(
        long,
        global = true,
        env = "BARCODE_BRIDGE_PRICE_LIST",
        default_value = DEFAULT_PRICE_LIST
    )]
    default_price_list: String,

    /// How selling prices are looked up.
    #[arg(
        long,
        global = true,
        value_enum,
        env = "BARCODE_BRIDGE_PRICE_MODE",
        default_value_t = PriceModeArg::PriceList
    )]
    price_mode: PriceModeArg,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    // ── Queries ─────────────────────────────────────────────────────
    /// First barcode of each item that has one.
    Barcodes {
        /// Item codes: several arguments, or one JSON array / single code.
        #[arg(required = true)]
        codes: Vec<String>,
    },

    /// Barcode and selling price for each item.
    Details {
        /// Item codes: several arguments, or one JSON array / single code.
        #[arg(required = true)]
        codes: Vec<String>,
        /// Price list to price against.
        #[arg(long)]
        price_list: Option<String>,
    },

    /// Normalized barcode print settings.
    Settings,

    /// Enabled selling price lists.
    PriceLists,

    /// Label items for every line of a purchase invoice.
    InvoiceItems {
        /// Purchase invoice id.
        invoice: String,
        /// Price list to price against.
        #[arg(long)]
        price_list: Option<String>,
    },

    // ── Administration ──────────────────────────────────────────────
    /// Seed the default label size if no label sizes are configured.
    Install,

    /// Validate a settings JSON file and store it as the settings singleton.
    ImportSettings { file: PathBuf },

    /// Create the database schema, optionally loading a snapshot into it.
    InitDb {
        /// Snapshot JSON to import after creating the schema.
        #[arg(long)]
        import: Option<PathBuf>,
    },
}

/// CLI spelling of [`PriceMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PriceModeArg {
    /// Latest selling price on the price list, then standard rate.
    PriceList,
    /// Standard rate only.
    StandardRate,
}

impl From<PriceModeArg> for PriceMode {
    fn from(arg: PriceModeArg) -> Self {
        match arg {
            PriceModeArg::PriceList => PriceMode::PriceList,
            PriceModeArg::StandardRate => PriceMode::StandardRate,
        }
    }
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let format = Format::resolve_or_detect(cli.output.as_deref());

    match run(&cli, format) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match format {
                Format::Json => render::print_error_envelope(&err),
                Format::Pretty => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the `warn` default.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli, format: Format) -> Result<()> {
    let config = ResolverConfig::default()
        .with_price_list(cli.default_price_list.trim())
        .with_price_mode(cli.price_mode.into());

    if let Cmd::InitDb { import } = &cli.cmd {
        let Some(db) = &cli.db else {
            bail!("init-db needs --db <PATH>");
        };
        return cmd_init_db(db, import.as_deref(), format);
    }

    match (&cli.snapshot, &cli.db) {
        (Some(path), _) => {
            tracing::debug!(snapshot = %path.display(), "using in-memory snapshot");
            let store = MemoryStore::from_snapshot(read_snapshot(path)?);
            let api = BarcodeApi::new(store, config);
            let dirty = dispatch(&api, &cli.cmd, format)?;
            if dirty {
                tracing::info!(snapshot = %path.display(), "writing settings back to snapshot");
                write_snapshot(path, &api.store().snapshot()?)?;
            }
        }
        (None, Some(db)) => {
            tracing::debug!(db = %db.display(), "using sqlite store");
            let store = SqliteStore::open(db)
                .with_context(|| format!("failed to open database '{}'", db.display()))?;
            dispatch(&BarcodeApi::new(store, config), &cli.cmd, format)?;
        }
        (None, None) => bail!("no record source: pass --db <PATH> or --snapshot <PATH>"),
    }
    Ok(())
}

/// Run one command against a store. Returns whether settings were written.
fn dispatch<S>(api: &BarcodeApi<S>, cmd: &Cmd, format: Format) -> Result<bool>
where
    S: RecordStore + SettingsStore,
{
    match cmd {
        Cmd::Barcodes { codes } => {
            let map = api.get_item_barcodes(&item_codes(codes))?;
            emit(format, &map, render::barcodes)?;
        }
        Cmd::Details { codes, price_list } => {
            let map = api.get_item_details(&item_codes(codes), price_list.as_deref())?;
            emit(format, &map, render::details)?;
        }
        Cmd::Settings => {
            let settings = api.get_barcode_print_settings();
            emit(format, &settings, render::settings)?;
        }
        Cmd::PriceLists => {
            let names = api.get_price_lists()?;
            emit(format, &names, |n| render::price_lists(n))?;
        }
        Cmd::InvoiceItems {
            invoice,
            price_list,
        } => {
            let items = api
                .get_purchase_invoice_items(invoice, price_list.as_deref())
                .with_context(|| format!("failed to load purchase invoice '{invoice}'"))?;
            emit(format, &items, |i| render::label_items(i))?;
        }
        Cmd::Install => {
            let outcome = api.install_default_settings()?;
            emit(format, &serde_json::json!({ "outcome": outcome }), |_| {
                render::install(outcome);
            })?;
            return Ok(outcome == InstallOutcome::Seeded);
        }
        Cmd::ImportSettings { file } => {
            let text = fs::read_to_string(file)
                .with_context(|| format!("failed to read settings file '{}'", file.display()))?;
            let settings = load_settings_from_str(&text)
                .with_context(|| format!("failed to load settings file '{}'", file.display()))?;
            api.store().save_singleton_settings(&settings)?;
            render::status(
                format,
                "imported",
                &format!("{} label size(s)", settings.label_sizes.len()),
            )?;
            return Ok(true);
        }
        Cmd::InitDb { .. } => bail!("init-db needs --db <PATH>"),
    }
    Ok(false)
}

fn cmd_init_db(db: &Path, import: Option<&Path>, format: Format) -> Result<()> {
    let store = SqliteStore::open(db)
        .with_context(|| format!("failed to create database '{}'", db.display()))?;
    if let Some(path) = import {
        store
            .import_snapshot(&read_snapshot(path)?)
            .with_context(|| format!("failed to import snapshot '{}'", path.display()))?;
    }
    render::status(format, "initialized", &db.display().to_string())
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// One argument is parsed as raw input (JSON array or single code); several
/// are taken as a list.
fn item_codes(args: &[String]) -> ItemCodes {
    match args {
        [raw] => ItemCodes::parse(raw),
        many => ItemCodes::from(many.to_vec()),
    }
}

fn emit<T, F>(format: Format, value: &T, pretty: F) -> Result<()>
where
    T: serde::Serialize + ?Sized,
    F: FnOnce(&T),
{
    match format {
        Format::Json => render::print_json(value),
        Format::Pretty => {
            pretty(value);
            Ok(())
        }
    }
}

fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot '{}'", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse snapshot '{}'", path.display()))
}

fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let text = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, text + "\n")
        .with_context(|| format!("failed to write snapshot '{}'", path.display()))
}
