use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

use receiving_docs_api::*;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn print_body(body: &Value) -> serde_json::Result<()> {
    match body {
        Value::String(s) => println!("{}", s),
        other => println!("{}", serde_json::to_string_pretty(other)?),
    }
    Ok(())
}

fn values_of<'a>(
    matches: &'a clap::ArgMatches,
    arg_name: &str,
) -> Box<dyn Iterator<Item = &'a str> + 'a> {
    match matches.values_of(arg_name) {
        Some(i) => Box::new(i),
        None => Box::new(std::iter::empty()),
    }
}

// Flag/env wins, then the saved config file, then the built-in default.
fn resolve_config(
    endpoint: Option<&str>,
    config_path: &Path,
) -> Result<ClientConfig> {
    if let Some(endpoint) = endpoint {
        return ClientConfig::new(endpoint);
    }
    let mut config = ClientConfig::default();
    if config_path.exists() {
        config.load_from_path(config_path)?;
    }
    Ok(config)
}

fn get_client(config: ClientConfig) -> Result<Client> {
    let client = Client::new(
        config,
        reqwest::Client::builder()
            .user_agent("receiving-docs")
            .build()?,
    );
    tracing::debug!(endpoint = client.config().endpoint(), "using document service");
    Ok(client)
}

/// A client call failure. The library has already logged it.
#[derive(Debug)]
struct Logged(Error);

impl fmt::Display for Logged {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl StdError for Logged {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.0)
    }
}

fn needs_report(err: &(dyn StdError + 'static)) -> bool {
    !err.is::<Logged>()
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if needs_report(&*err) {
                tracing::error!(error = %err, "receiving-docs failed");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> std::result::Result<(), Box<dyn StdError>> {
    let matches = clap::App::new("receiving document service cli")
        .arg(clap::Arg::with_name("endpoint")
             .long("endpoint")
             .takes_value(true)
             .env(ENDPOINT_ENV_VAR)
             .global(true)
             .help("Base URL of the document API"))
        .subcommand(
            clap::SubCommand::with_name("ls")
                .about("Lists documents.")
                .arg(clap::Arg::with_name("order")
                     .short("o")
                     .long("order")
                     .takes_value(true)
                     .help("Only list documents attached to this order")),
        )
        .subcommand(
            clap::SubCommand::with_name("info")
                .about("Describes a document in detail.")
                .arg(clap::Arg::with_name("ids")
                     .index(1)
                     .multiple(true)
                     .required(true)),
        )
        .subcommand(
            clap::SubCommand::with_name("push")
                .about("Uploads files.")
                .arg(clap::Arg::with_name("content-type")
                     .long("content-type")
                     .takes_value(true)
                     .help("MIME type to send with each file"))
                .arg(clap::Arg::with_name("filenames")
                     .index(1)
                     .multiple(true)
                     .required(true)),
        )
        .subcommand(
            clap::SubCommand::with_name("rm")
                .about("Deletes documents.")
                .arg(clap::Arg::with_name("ids")
                     .index(1)
                     .multiple(true)
                     .required(true)),
        )
        .subcommand(
            clap::SubCommand::with_name("config")
                .about("Saves the API endpoint to the config file.")
                .arg(clap::Arg::with_name("url")
                     .index(1)
                     .required(true)),
        )
        .get_matches();

    let project_dirs =
        match ProjectDirs::from("com", "receiving", "receiving-docs") {
            Some(x) => x,
            None => return Err("Could not determine settings directory.".into()),
        };
    let config_dir = project_dirs.config_dir();
    let config_path = config_dir.join("config.json");

    let endpoint_of = |sub_m: &clap::ArgMatches| -> Option<String> {
        sub_m
            .value_of("endpoint")
            .or_else(|| matches.value_of("endpoint"))
            .map(str::to_owned)
    };

    match matches.subcommand() {
        ("ls", Some(sub_m)) => {
            let client = get_client(resolve_config(endpoint_of(sub_m).as_deref(), &config_path)?)?;
            let body = match sub_m.value_of("order") {
                Some(order_id) => client.get_documents_for_order(order_id).await.map_err(Logged)?,
                None => client.get_documents().await.map_err(Logged)?,
            };
            print_body(&body)?;
        }
        ("info", Some(sub_m)) => {
            let client = get_client(resolve_config(endpoint_of(sub_m).as_deref(), &config_path)?)?;
            for id in values_of(sub_m, "ids") {
                print_body(&client.get_document(id).await.map_err(Logged)?)?;
            }
        }
        ("push", Some(sub_m)) => {
            let client = get_client(resolve_config(endpoint_of(sub_m).as_deref(), &config_path)?)?;
            for filepath in values_of(sub_m, "filenames") {
                let mut file = DocumentFile::from_path(Path::new(filepath))?;
                if let Some(ct) = sub_m.value_of("content-type") {
                    file = file.with_content_type(ct);
                }
                tracing::info!(file = filepath, size = file.len(), "uploading");
                print_body(&client.upload_document(file).await.map_err(Logged)?)?;
            }
        }
        ("rm", Some(sub_m)) => {
            let client = get_client(resolve_config(endpoint_of(sub_m).as_deref(), &config_path)?)?;
            for id in values_of(sub_m, "ids") {
                print_body(&client.delete_document(id).await.map_err(Logged)?)?;
            }
        }
        ("config", Some(sub_m)) => {
            let config = ClientConfig::new(sub_m.value_of("url").unwrap_or_default())?;
            if !config_dir.exists() {
                fs::create_dir_all(&config_dir)?;
            }
            config.save_to_path(&config_path)?;
            tracing::info!(endpoint = config.endpoint(), path = ?config_path, "saved config");
        }
        _ => {
            // No subcommand: behave like `ls`.
            let client = get_client(resolve_config(endpoint_of(&matches).as_deref(), &config_path)?)?;
            print_body(&client.get_documents().await.map_err(Logged)?)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!(
            "receiving-docs-cli-{}-{}.json",
            std::process::id(),
            name
        ))
    }

    #[test]
    fn resolve_prefers_flag() {
        let config = resolve_config(
            Some("http://localhost:3000/dev"),
            Path::new("/nonexistent/config.json"),
        )
        .unwrap();
        assert_eq!(config.endpoint(), "http://localhost:3000/dev");
    }

    #[test]
    fn resolve_reads_saved_file() {
        let path = temp_config_path("saved");
        ClientConfig::new("https://api.example.com/prod")
            .unwrap()
            .save_to_path(&path)
            .unwrap();

        let config = resolve_config(None, &path).unwrap();
        assert_eq!(config.endpoint(), "https://api.example.com/prod");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn client_keeps_resolved_endpoint() {
        let config = resolve_config(Some("http://localhost:3000/dev/"), Path::new("/nonexistent"))
            .unwrap();
        let client = get_client(config).unwrap();
        assert_eq!(client.config().endpoint(), "http://localhost:3000/dev");
    }

    #[test]
    fn client_failures_are_not_reported_twice() {
        let logged: Box<dyn StdError> = Box::new(Logged(Error::MissingFileName));
        assert!(!needs_report(&*logged));
        assert_eq!(logged.to_string(), Error::MissingFileName.to_string());

        let other: Box<dyn StdError> = Box::new(Error::MissingFileName);
        assert!(needs_report(&*other));
        let plain: Box<dyn StdError> = "Could not determine settings directory.".into();
        assert!(needs_report(&*plain));
    }

    #[test]
    fn resolve_rejects_bad_flag() {
        assert!(resolve_config(Some("not a url"), Path::new("/nonexistent")).is_err());
    }

    #[test]
    fn resolve_falls_back_to_default() {
        let config = resolve_config(None, &temp_config_path("missing")).unwrap();
        assert_eq!(config.endpoint(), DEFAULT_API_ENDPOINT);
    }
}
