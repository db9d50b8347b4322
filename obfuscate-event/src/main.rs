// SPDX-License-Identifier: AGPL-3.0-only
// Event handler: reads one invocation or storage notification event, runs the
// obfuscator on the object it names and stores the result under
// `obfuscated/<key>` in the destination container.

mod event;

use anyhow::{Context, Result};
use clap::Parser;
use event::{Event, EventError, Fallbacks, Request, Response};
use pii_obfuscator::{
    parse_field_list, FsObjectStore, ObfuscationError, Obfuscator, ObfuscatorConfig, ObjectStore,
    SourceLocator,
};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DESTINATION_PREFIX: &str = "obfuscated/";

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Event JSON file, or "-" for stdin
    #[arg(short, long, default_value = "-")]
    event: String,
    /// Container receiving the obfuscated objects
    #[arg(long, env = "DESTINATION_BUCKET")]
    destination_bucket: Option<String>,
    /// Comma-separated PII fields used when a notification event carries none
    #[arg(long, env = "PII_FIELDS", default_value = "")]
    pii_fields: String,
    /// Primary key used when a notification event carries none
    #[arg(long, env = "PRIMARY_KEY")]
    primary_key: Option<String>,
    /// Directory holding one sub-directory per container
    #[arg(long, env = "OBFUSCATOR_STORE_ROOT", default_value = ".")]
    root: PathBuf,
}

#[derive(Error, Debug)]
enum HandlerError {
    #[error(transparent)]
    Event(#[from] EventError),
    #[error("DESTINATION_BUCKET is not configured")]
    MissingDestination,
    #[error(transparent)]
    Obfuscation(#[from] ObfuscationError),
}

impl HandlerError {
    /// Engine failures keep the engine's exit codes; a bad event or missing
    /// configuration is a usage error.
    fn exit_code(&self) -> i32 {
        match self {
            HandlerError::Obfuscation(err) => err.kind().exit_code(),
            HandlerError::Event(_) | HandlerError::MissingDestination => 2,
        }
    }
}

fn main() {
    std::process::exit(match run(Args::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            1
        }
    });
}

fn run(args: Args) -> Result<i32> {
    init_tracing();

    let text = read_event(&args.event)?;
    let config = ObfuscatorConfig::from_env().context("invalid obfuscator configuration")?;
    let engine = Obfuscator::new(config);
    let store = FsObjectStore::new(&args.root);
    let fallbacks = Fallbacks {
        pii_fields: parse_field_list(&args.pii_fields),
        primary_key: args.primary_key.filter(|key| !key.is_empty()),
    };

    match handle(
        &text,
        &fallbacks,
        args.destination_bucket.as_deref(),
        &engine,
        &store,
    ) {
        Ok(response) => {
            println!("{}", serde_json::to_string(&response)?);
            Ok(0)
        }
        Err(err) => {
            error!("obfuscation handler failed: {err}");
            Ok(err.exit_code())
        }
    }
}

fn handle<S: ObjectStore + ?Sized>(
    text: &str,
    fallbacks: &Fallbacks,
    destination: Option<&str>,
    engine: &Obfuscator,
    store: &S,
) -> Result<Response, HandlerError> {
    let Request {
        locator,
        pii_fields,
        primary_key,
    } = Event::from_json(text)?.resolve(fallbacks)?;

    let source = SourceLocator::parse(&locator)?;
    info!(
        container = source.container(),
        key = source.key(),
        file_name = source.file_name(),
        "processing event"
    );
    let destination = destination
        .filter(|d| !d.is_empty())
        .ok_or(HandlerError::MissingDestination)?;
    info!(destination, ?pii_fields, "obfuscating");

    let bytes = engine.obfuscate(store, &locator, &pii_fields, primary_key.as_deref())?;

    let key = format!("{DESTINATION_PREFIX}{}", source.key());
    store
        .put(destination, &key, &bytes)
        .map_err(|err| ObfuscationError::Storage {
            locator: format!("{destination}/{key}"),
            detail: err.to_string(),
        })?;
    info!(destination, key = %key, "obfuscated and saved");

    Ok(Response::saved(source.key()))
}

fn read_event(path: &str) -> Result<String> {
    if path == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read event from stdin")?;
        Ok(text)
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read event {path}"))
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use pii_obfuscator::MemoryObjectStore;

    const STUDENTS: &str =
        "student_id,name,course,graduation_date,email_address\n\
         1234,John Smith,Software,2024-03-31,j.smith@email.com\n";

    fn store() -> MemoryObjectStore {
        let store = MemoryObjectStore::new();
        store.insert("ingest", "new_data/students.csv", STUDENTS);
        store
    }

    #[test]
    fn direct_event_is_saved_under_obfuscated_prefix() {
        let store = store();
        let response = handle(
            r#"{"file_to_obfuscate": "s3://ingest/new_data/students.csv",
                "pii_fields": ["name", "email_address"]}"#,
            &Fallbacks::default(),
            Some("processed"),
            &Obfuscator::default(),
            &store,
        )
        .expect("handled");
        assert_eq!(response, Response::saved("new_data/students.csv"));
        let saved = store
            .get("processed", "obfuscated/new_data/students.csv")
            .expect("saved");
        assert_eq!(
            String::from_utf8(saved).expect("utf8"),
            "student_id,name,course,graduation_date,email_address\n\
             1234,***,Software,2024-03-31,***\n"
        );
    }

    #[test]
    fn supplied_primary_key_is_honoured() {
        let store = store();
        handle(
            r#"{"file_to_obfuscate": "s3://ingest/new_data/students.csv",
                "pii_fields": ["student_id", "name"], "primary_key": "student_id"}"#,
            &Fallbacks::default(),
            Some("processed"),
            &Obfuscator::default(),
            &store,
        )
        .expect("handled");
        let saved = store
            .get("processed", "obfuscated/new_data/students.csv")
            .expect("saved");
        assert!(String::from_utf8(saved).expect("utf8").contains("1234,***,Software"));
    }

    #[test]
    fn missing_destination_is_a_usage_error() {
        let err = handle(
            r#"{"file_to_obfuscate": "s3://ingest/new_data/students.csv", "pii_fields": ["name"]}"#,
            &Fallbacks::default(),
            None,
            &Obfuscator::default(),
            &store(),
        )
        .unwrap_err();
        assert!(matches!(err, HandlerError::MissingDestination));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn engine_failures_keep_engine_exit_codes() {
        let err = handle(
            r#"{"file_to_obfuscate": "s3://ingest/new_data/missing.csv", "pii_fields": ["name"]}"#,
            &Fallbacks::default(),
            Some("processed"),
            &Obfuscator::default(),
            &store(),
        )
        .unwrap_err();
        assert_eq!(
            err.exit_code(),
            pii_obfuscator::ErrorKind::SourceNotFound.exit_code()
        );
    }
}
