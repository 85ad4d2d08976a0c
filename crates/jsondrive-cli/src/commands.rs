use std::io::Read;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use jsondrive_store::{LogLevel, Store, StoreConfig, StoreOptions};

use crate::cli::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Address {
    pub city: String,
    pub state: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    pub name: String,
    pub age: u32,
    pub contact: String,
    pub company: String,
    pub address: Address,
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let store = Store::with_options(&cli.root, store_options(config))
        .with_context(|| format!("opening store at {}", cli.root.display()))?;
    debug!(root = %store.root().display(), indent = ?store.config().indent, "store opened");

    match cli.command {
        Command::Write(args) => cmd_write(&store, args),
        Command::Read(args) => cmd_read(&store, args, cli.format),
        Command::ReadAll(args) => cmd_read_all(&store, args, cli.format),
        Command::Delete(args) => cmd_delete(&store, args),
        Command::Seed(args) => cmd_seed(&store, args, cli.format),
    }
}

/// The installed subscriber decides what is shown (`RUST_LOG`, `-v`), so the
/// store's own threshold is opened fully.
fn store_options(mut config: StoreConfig) -> StoreOptions {
    config.log_level = LogLevel::Trace;
    StoreOptions::default().with_config(config)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<StoreConfig> {
    let Some(path) = path else {
        return Ok(StoreConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn cmd_write(store: &Store, args: WriteArgs) -> anyhow::Result<()> {
    let text = if args.value == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading document from stdin")?;
        buf
    } else {
        args.value
    };
    let value: Value = serde_json::from_str(&text).context("document is not valid JSON")?;
    store.write(&args.collection, &args.resource, &value)?;
    println!(
        "{} Wrote {}/{}",
        "✓".green().bold(),
        args.collection.bold(),
        args.resource.yellow()
    );
    Ok(())
}

fn cmd_read(store: &Store, args: RecordArgs, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => print!("{}", store.read_raw(&args.collection, &args.resource)?),
        OutputFormat::Json => {
            let value: Value = store.read(&args.collection, &args.resource)?;
            println!("{}", serde_json::to_string(&value)?);
        }
    }
    Ok(())
}

fn cmd_read_all(store: &Store, args: CollectionArgs, format: OutputFormat) -> anyhow::Result<()> {
    let records = store.read_all(&args.collection)?;
    match format {
        OutputFormat::Text => {
            for record in &records {
                print!("{record}");
            }
            println!("{} record(s) in {}", records.len().to_string().bold(), args.collection.bold());
        }
        OutputFormat::Json => {
            let values = decode_all::<Value>(&records)?;
            println!("{}", serde_json::to_string(&values)?);
        }
    }
    Ok(())
}

fn cmd_delete(store: &Store, args: RecordArgs) -> anyhow::Result<()> {
    store.delete(&args.collection, &args.resource)?;
    println!(
        "{} Deleted {}/{}",
        "✓".green().bold(),
        args.collection.bold(),
        args.resource.yellow()
    );
    Ok(())
}

fn cmd_seed(store: &Store, args: SeedArgs, format: OutputFormat) -> anyhow::Result<()> {
    let users = seed_users(store, &args.collection)?;
    info!(collection = %args.collection, count = users.len(), "seeded sample users");
    match format {
        OutputFormat::Text => {
            for user in &users {
                println!(
                    "  {} {} ({}, {})",
                    user.name.yellow(),
                    user.age,
                    user.company,
                    user.address.city
                );
            }
            println!("{} Seeded {} users into {}", "✓".green().bold(), users.len(), args.collection.bold());
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(&users)?),
    }
    Ok(())
}

/// Write the sample users into `collection` and read them all back.
pub(crate) fn seed_users(store: &Store, collection: &str) -> anyhow::Result<Vec<User>> {
    for user in sample_users() {
        store
            .write(collection, &user.name, &user)
            .with_context(|| format!("writing {}", user.name))?;
    }
    let records = store.read_all(collection)?;
    decode_all(&records)
}

fn decode_all<T: serde::de::DeserializeOwned>(records: &[String]) -> anyhow::Result<Vec<T>> {
    records
        .iter()
        .map(|r| serde_json::from_str(r).context("decoding record"))
        .collect()
}

fn sample_users() -> Vec<User> {
    [
        ("Rohan", 18, "9016765337"),
        ("Ansh", 20, "832023232"),
        ("Jhankar", 19, "2323225337"),
        ("Shruti", 25, "2223444337"),
        ("Aviral", 19, "987654337"),
        ("Rohit", 150, "90135535337"),
        ("Sonu", 11, "2242424244"),
        ("Monu", 12, "982646462"),
    ]
    .into_iter()
    .map(|(name, age, contact)| User {
        name: name.into(),
        age,
        contact: contact.into(),
        company: "Vit".into(),
        address: Address {
            city: "bhopal".into(),
            state: "MadhyaPradesh".into(),
        },
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_writes_and_reads_back_every_user() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path()).unwrap();

        let mut users = seed_users(&store, "users").unwrap();
        users.sort_by(|a, b| a.name.cmp(&b.name));

        let mut expected = sample_users();
        expected.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(users, expected);
        assert!(dir.path().join("users").join("Rohan.json").is_file());
    }

    #[test]
    fn seed_twice_overwrites_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path()).unwrap();
        seed_users(&store, "users").unwrap();
        let users = seed_users(&store, "users").unwrap();
        assert_eq!(users.len(), 8);
    }

    #[test]
    fn store_options_defer_filtering_to_subscriber() {
        let config = StoreConfig {
            log_level: LogLevel::Warn,
            sync_writes: true,
            ..StoreConfig::default()
        };
        let opts = store_options(config);
        assert_eq!(opts.config.log_level, LogLevel::Trace);
        assert!(opts.config.sync_writes);
        assert!(opts.logger.is_none());
    }

    #[test]
    fn load_config_defaults_without_path() {
        assert_eq!(load_config(None).unwrap(), StoreConfig::default());
    }

    #[test]
    fn load_config_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jsondrive.toml");
        std::fs::write(&path, "indent = \"  \"\nsync_writes = true\nlog_level = \"warn\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.indent, "  ");
        assert!(config.sync_writes);
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.dir_mode, 0o755);
    }

    #[test]
    fn load_config_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "sync_writes = \"maybe\"").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }
}
