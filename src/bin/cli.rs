//! keyrotate CLI
//!
//! Drives a Rotator against an index file from the command line.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use keyrotate::rotation::Scheme;
use keyrotate::{Config, CredentialHeaders, KeyScope, Rotation, Rotator};
use tracing_subscriber::{fmt, EnvFilter};

/// keyrotate CLI
#[derive(Parser, Debug)]
#[command(name = "keyrotate")]
#[command(about = "Round-robin credential rotation with a persisted index")]
#[command(version)]
struct Args {
    /// Index snapshot file
    #[arg(short, long, default_value = keyrotate::config::DEFAULT_INDEX_PATH)]
    index_file: String,

    /// How counters are shared between Authorization and API key rotation
    /// (shared | per-scheme)
    #[arg(long, default_value = "shared")]
    scope: KeyScope,

    /// Keep candidates exactly as split (no per-candidate trimming)
    #[arg(long)]
    raw_candidates: bool,

    /// Seconds between background flushes
    #[arg(short, long, default_value = "30")]
    flush_secs: u64,

    /// API key header name
    #[arg(long, default_value = keyrotate::config::DEFAULT_API_KEY_HEADER)]
    api_key_header: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rotate the credentials of one request and print the headers to send
    Select {
        /// Logical key (request path or URL)
        #[arg(short, long)]
        key: String,

        /// Authorization header value, e.g. "Bearer a,b,c"
        #[arg(short, long)]
        authorization: Option<String>,

        /// API key header value, e.g. "k1,k2"
        #[arg(short = 'p', long)]
        api_key: Option<String>,
    },

    /// Show the position the next request for a key will use
    Peek {
        /// Logical key (request path or URL)
        #[arg(short, long)]
        key: String,

        /// Scheme whose counter to show
        #[arg(short, long, value_enum, default_value_t = SchemeArg::Authorization)]
        scheme: SchemeArg,
    },

    /// Print every stored position
    Dump,

    /// Rotate requests read from stdin as `key<TAB>authorization<TAB>api-key`
    Stream,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SchemeArg {
    Authorization,
    ApiKey,
}

impl From<SchemeArg> for Scheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Authorization => Scheme::Authorization,
            SchemeArg::ApiKey => Scheme::ApiKey,
        }
    }
}

fn main() {
    // Logs go to stderr so stdout stays machine readable
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,keyrotate=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> keyrotate::Result<()> {
    tracing::debug!("keyrotate v{}", keyrotate::VERSION);
    tracing::debug!("Index file: {}", args.index_file);

    // Build config from args
    let config = Config::builder()
        .index_path(&args.index_file)
        .flush_interval(Duration::from_secs(args.flush_secs))
        .key_scope(args.scope)
        .trim_candidates(!args.raw_candidates)
        .api_key_header(&args.api_key_header)
        .build();

    let rotator = Rotator::open(config)?;

    match args.command {
        Commands::Select {
            key,
            authorization,
            api_key,
        } => {
            let headers = CredentialHeaders {
                authorization: authorization.as_deref(),
                api_key: api_key.as_deref(),
            };
            let rotation = rotator.rotate(&key, &headers);
            print_rotation(&rotator, &rotation);
        }
        Commands::Peek { key, scheme } => {
            println!("{}", rotator.peek(&key, scheme.into()));
        }
        Commands::Dump => {
            for (key, position) in rotator.table() {
                println!("{}\t{}", key, position);
            }
        }
        Commands::Stream => stream(&rotator)?,
    }

    rotator.close()?;
    Ok(())
}

fn stream(rotator: &Rotator) -> keyrotate::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let mut fields = line.split('\t');
        let key = fields.next().unwrap_or_default();
        let headers = CredentialHeaders {
            authorization: fields.next().filter(|f| !f.is_empty()),
            api_key: fields.next().filter(|f| !f.is_empty()),
        };

        let rotation = rotator.rotate(key, &headers);
        let updates = rotation.header_updates(rotator.api_key_header());
        if updates.is_empty() {
            writeln!(stdout, "{}\t(unchanged)", key)?;
        } else {
            let rendered: Vec<String> = updates
                .iter()
                .map(|(name, value)| format!("{}: {}", name, value))
                .collect();
            writeln!(stdout, "{}\t{}", key, rendered.join("\t"))?;
        }
        stdout.flush()?;
    }

    Ok(())
}

fn print_rotation(rotator: &Rotator, rotation: &Rotation) {
    if rotation.is_unchanged() {
        println!("(unchanged)");
        return;
    }
    for (name, value) in rotation.header_updates(rotator.api_key_header()) {
        println!("{}: {}", name, value);
    }
}
