// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

/// obfuscator command-line entry point.
///
/// Wires flags into the library: a filesystem object store rooted at
/// `--root`, one engine built from `--mask-token`, and either a single
/// locator streamed to stdout or a batch of locators written back into a
/// destination container.  Protocol and format logic live in the library.
use anyhow::{Context, Result};
use clap::error::ErrorKind as ClapErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command};
use pii_obfuscator::config::MASK_TOKEN_ENV;
use pii_obfuscator::{
    FsObjectStore, ObfuscationError, ObfuscationReport, Obfuscator, ObfuscatorConfig,
    ObjectStore, SourceLocator, parse_field_list,
};
use rayon::prelude::*;
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

/// Build-time version information.  CI may bake a tag in via
/// `OBFUSCATOR_VERSION`; otherwise Cargo's package version is used.
const VERSION: &str = match option_env!("OBFUSCATOR_VERSION") {
    Some(tag) => tag,
    None => env!("CARGO_PKG_VERSION"),
};

const DEFAULT_PREFIX: &str = "obfuscated/";

fn branch() -> &'static str {
    option_env!("OBFUSCATOR_BRANCH").unwrap_or("main")
}

/// Short Git commit captured by `build.rs`, or a recognisable placeholder.
fn sha() -> &'static str {
    option_env!("OBFUSCATOR_COMMIT").unwrap_or("0000000")
}

fn rust_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

fn version_string() -> String {
    format!(
        "obfuscator {VERSION} (branch:{}, commit:{}) [rust:{}]",
        branch(),
        sha(),
        rust_version()
    )
}

/// Cached version string with a 'static lifetime for clap metadata.
fn version_str() -> &'static str {
    static VERSION_STR: OnceLock<String> = OnceLock::new();
    VERSION_STR.get_or_init(version_string).as_str()
}

fn main() {
    std::process::exit(match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            1
        }
    });
}

fn run() -> Result<i32> {
    let matches = match build_cli().try_get_matches() {
        Ok(m) => m,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
                err.print()?;
                return Ok(0);
            }
            _ => err.exit(),
        },
    };

    let opts = CliOptions::from_matches(&matches);
    if opts.show_version {
        println!("{}", version_string());
        return Ok(0);
    }

    init_tracing();

    let config = match ObfuscatorConfig::new(opts.mask_token.clone()) {
        Ok(config) => config,
        Err(err) => usage_error(ClapErrorKind::InvalidValue, err),
    };
    let engine = Obfuscator::new(config);
    let store = FsObjectStore::new(&opts.root);

    if opts.detect {
        return Ok(detect_all(&engine, &store, &opts));
    }

    match opts.dest.as_deref() {
        Some(dest) => {
            if let Some((first, second, key)) = shared_destination(&opts.prefix, &opts.locators) {
                usage_error(
                    ClapErrorKind::ArgumentConflict,
                    format!("LOCATORs {first} and {second} would both be written to {dest}/{key}"),
                )
            }
            Ok(obfuscate_into(&engine, &store, dest, &opts))
        }
        None => {
            let [locator] = opts.locators.as_slice() else {
                usage_error(
                    ClapErrorKind::TooManyValues,
                    "exactly one LOCATOR is required unless --dest is given",
                )
            };
            obfuscate_to_stdout(&engine, &store, locator, &opts)
        }
    }
}

/// Construct the `clap` command.  Flags that name a list accept both
/// repetition and comma-separated values.
fn build_cli() -> Command {
    Command::new("obfuscator")
        .about("Mask PII columns in csv, json and parquet files while keeping the primary key")
        .disable_version_flag(true)
        .version(version_str())
        .arg(
            Arg::new("pii-fields")
                .long("pii-fields")
                .value_name("LIST")
                .action(ArgAction::Append)
                .env("PII_FIELDS")
                .help("Comma-separated column names to mask (repeatable)"),
        )
        .arg(
            Arg::new("primary-key")
                .long("primary-key")
                .value_name("KEY")
                .env("PRIMARY_KEY")
                .help("Column to keep intact; detected from the data when omitted"),
        )
        .arg(
            Arg::new("mask-token")
                .long("mask-token")
                .value_name("TOKEN")
                .env(MASK_TOKEN_ENV)
                .default_value(pii_obfuscator::config::DEFAULT_MASK_TOKEN)
                .help("Replacement written into every masked cell"),
        )
        .arg(
            Arg::new("root")
                .long("root")
                .value_name("DIR")
                .env("OBFUSCATOR_STORE_ROOT")
                .default_value(".")
                .help("Directory holding one sub-directory per container"),
        )
        .arg(
            Arg::new("dest")
                .long("dest")
                .value_name("CONTAINER")
                .help("Write results into CONTAINER instead of stdout"),
        )
        .arg(
            Arg::new("prefix")
                .long("prefix")
                .value_name("PREFIX")
                .default_value(DEFAULT_PREFIX)
                .help("Key prefix for results written with --dest"),
        )
        .arg(
            Arg::new("detect")
                .long("detect")
                .action(ArgAction::SetTrue)
                .help("Print the primary key that would be kept and exit"),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .action(ArgAction::SetTrue)
                .help("Print version information and exit"),
        )
        .arg(
            Arg::new("locators")
                .value_name("LOCATOR")
                .num_args(1..)
                .action(ArgAction::Append)
                .required_unless_present("version"),
        )
}

/// Typed view of the parsed flags.
struct CliOptions {
    locators: Vec<String>,
    pii_fields: Vec<String>,
    primary_key: Option<String>,
    mask_token: String,
    root: String,
    dest: Option<String>,
    prefix: String,
    detect: bool,
    show_version: bool,
}

impl CliOptions {
    fn from_matches(matches: &ArgMatches) -> Self {
        let locators = matches
            .get_many::<String>("locators")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default();
        let pii_fields = matches
            .get_many::<String>("pii-fields")
            .map(|vals| vals.flat_map(|v| parse_field_list(v)).collect())
            .unwrap_or_default();

        Self {
            locators,
            pii_fields,
            primary_key: matches
                .get_one::<String>("primary-key")
                .filter(|key| !key.is_empty())
                .cloned(),
            mask_token: matches
                .get_one::<String>("mask-token")
                .cloned()
                .unwrap_or_default(),
            root: matches
                .get_one::<String>("root")
                .cloned()
                .unwrap_or_else(|| ".".to_string()),
            dest: matches.get_one::<String>("dest").cloned(),
            prefix: matches
                .get_one::<String>("prefix")
                .cloned()
                .unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            detect: matches.get_flag("detect"),
            show_version: matches.get_flag("version"),
        }
    }
}

/// Report a usage problem the way clap reports its own, exiting with 2.
fn usage_error(kind: ClapErrorKind, message: impl std::fmt::Display) -> ! {
    build_cli().error(kind, message).exit()
}

/// Logs go to stderr so stdout stays clean for data.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn obfuscate_to_stdout(
    engine: &Obfuscator,
    store: &FsObjectStore,
    locator: &str,
    opts: &CliOptions,
) -> Result<i32> {
    let bytes = match engine.obfuscate(
        store,
        locator,
        &opts.pii_fields,
        opts.primary_key.as_deref(),
    ) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("{locator}: {err}");
            return Ok(err.kind().exit_code());
        }
    };
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(&bytes)
        .and_then(|_| stdout.flush())
        .context("failed to write obfuscated output")?;
    Ok(0)
}

/// Each locator is independent, so they run in parallel; results are
/// reported in input order and the first failure decides the exit code.
fn obfuscate_into(
    engine: &Obfuscator,
    store: &FsObjectStore,
    dest: &str,
    opts: &CliOptions,
) -> i32 {
    let outcomes: Vec<Result<(ObfuscationReport, String), ObfuscationError>> = opts
        .locators
        .par_iter()
        .map(|locator| -> Result<(ObfuscationReport, String), ObfuscationError> {
            let done = engine.obfuscate_with_report(
                store,
                locator,
                &opts.pii_fields,
                opts.primary_key.as_deref(),
            )?;
            let key = destination_key(&opts.prefix, locator)?;
            store
                .put(dest, &key, &done.bytes)
                .map_err(|err| ObfuscationError::Storage {
                    locator: format!("{dest}/{key}"),
                    detail: err.to_string(),
                })?;
            Ok((done.report, format!("{dest}/{key}")))
        })
        .collect();

    let mut stdout = io::stdout().lock();
    for (locator, outcome) in opts.locators.iter().zip(&outcomes) {
        let line = match outcome {
            Ok((report, written)) => format!(
                "ok {locator} -> {written} (primary key: {}, masked: {})",
                report.primary_key,
                report.masked_columns.join(",")
            ),
            Err(err) => format!("failed {locator}: {err}"),
        };
        let _ = writeln!(stdout, "{line}");
    }
    first_failure_code(&outcomes)
}

fn detect_all(engine: &Obfuscator, store: &FsObjectStore, opts: &CliOptions) -> i32 {
    let outcomes: Vec<Result<String, ObfuscationError>> = opts
        .locators
        .par_iter()
        .map(|locator| engine.detect(store, locator, &opts.pii_fields))
        .collect();

    let mut stdout = io::stdout().lock();
    for (locator, outcome) in opts.locators.iter().zip(&outcomes) {
        let line = match outcome {
            Ok(key) => format!("{locator}\t{key}"),
            Err(err) => format!("{locator}\terror: {err}"),
        };
        let _ = writeln!(stdout, "{line}");
    }
    first_failure_code(&outcomes)
}

/// Where a source object's result lands inside the destination container.
fn destination_key(prefix: &str, locator: &str) -> Result<String, ObfuscationError> {
    let locator = SourceLocator::parse(locator)?;
    Ok(format!("{prefix}{}", locator.key()))
}

/// First pair of locators whose results would land on the same destination
/// key.  Locators that do not parse are left for the per-locator run to
/// report.
fn shared_destination<'a>(
    prefix: &str,
    locators: &'a [String],
) -> Option<(&'a str, &'a str, String)> {
    let mut claimed: HashMap<String, &'a str> = HashMap::new();
    for locator in locators {
        let Ok(key) = destination_key(prefix, locator) else {
            continue;
        };
        if let Some(first) = claimed.get(&key) {
            return Some((*first, locator.as_str(), key));
        }
        claimed.insert(key, locator.as_str());
    }
    None
}

fn first_failure_code<T>(outcomes: &[Result<T, ObfuscationError>]) -> i32 {
    outcomes
        .iter()
        .find_map(|outcome| outcome.as_ref().err())
        .map_or(0, |err| err.kind().exit_code())
}
