//! Tryte CLI
//!
//! A command-line tool for ternary digests, proof-of-work and one-time
//! signatures.
//!
//! # Commands
//!
//! - `digest` - Curl-P-81 digest of a tryte string
//! - `checksum` - Trailing trytes of the digest
//! - `pow` - Find a nonce for one transaction (multi-threaded)
//! - `attach` - Chain and prove a whole bundle
//! - `address` - Derive addresses from a seed
//! - `sign` / `verify` - One-time signatures over a bundle hash
//! - `new-seed` - Generate a random seed
//! - `benchmark` - Run performance benchmark

use clap::{Parser, Subcommand};
use log::{debug, LevelFilter};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tryte::algorithm::{
    add_checksum, attach_bundle_trytes, checksum, digest, generate_addresses, generate_signature,
    transform, transform_bct, validate_signature, CancelToken, Error as EngineError, PearlDiver,
    SecurityLevel, Transaction, FRAGMENT_TRYTES, HASH_TRYTES, LANES, STATE_LENGTH,
};
use tryte::config::{default_config_path, EngineConfig};
use tryte::seed::{default_seed_path, Seed};

#[derive(Parser)]
#[command(name = "tryte")]
#[command(author = "Tryte Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Ternary digest, proof-of-work and one-time signature toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Custom config file path (default: ~/.tryte/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Number of worker threads (default: number of CPU cores)
    #[arg(short, long, global = true)]
    threads: Option<usize>,

    /// Custom seed file path (default: ~/.tryte/seed.txt)
    #[arg(long, global = true)]
    seed_file: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Curl-P-81 digest of a tryte string
    Digest {
        /// Input trytes
        trytes: String,
    },

    /// Last trytes of the digest of a tryte string
    Checksum {
        /// Input trytes
        trytes: String,

        /// Checksum length in trytes (1 to 81)
        #[arg(short, long, default_value = "9")]
        length: usize,
    },

    /// Find a nonce for a 2673-tryte transaction
    Pow {
        /// Transaction trytes
        #[arg(long, conflicts_with = "file")]
        transaction: Option<String>,

        /// Read the transaction trytes from a file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Minimum weight magnitude (default: from config)
        #[arg(short, long)]
        mwm: Option<usize>,

        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Chain, timestamp and prove a bundle (one transaction per line, index 0 first)
    Attach {
        /// File with one transaction per line
        #[arg(long)]
        file: PathBuf,

        /// Trunk transaction hash
        #[arg(long)]
        trunk: String,

        /// Branch transaction hash
        #[arg(long)]
        branch: String,

        /// Minimum weight magnitude (default: from config)
        #[arg(short, long)]
        mwm: Option<usize>,
    },

    /// Derive addresses from the seed
    Address {
        /// First key index
        #[arg(short, long, default_value = "0")]
        index: u64,

        /// Number of consecutive addresses
        #[arg(short = 'n', long, default_value = "1")]
        count: u64,

        /// Security level 1-3 (default: from config)
        #[arg(short, long)]
        security: Option<u8>,

        /// Append the 9-tryte checksum
        #[arg(long)]
        checksum: bool,
    },

    /// Sign a bundle hash with the key at an index
    Sign {
        /// Bundle hash (81 trytes)
        #[arg(long)]
        bundle: String,

        /// Key index
        #[arg(short, long, default_value = "0")]
        index: u64,

        /// Security level 1-3 (default: from config)
        #[arg(short, long)]
        security: Option<u8>,
    },

    /// Verify a signature against an address
    Verify {
        /// Address (81 trytes, or 90 with checksum)
        #[arg(long)]
        address: String,

        /// Bundle hash (81 trytes)
        #[arg(long)]
        bundle: String,

        /// Signature trytes (fragments concatenated)
        #[arg(long, conflicts_with = "signature_file")]
        signature: Option<String>,

        /// Read the signature from a file (fragments on separate lines allowed)
        #[arg(long)]
        signature_file: Option<PathBuf>,
    },

    /// Generate a new random seed and print it
    NewSeed,

    /// Run performance benchmark
    Benchmark {
        /// Number of transforms to time
        #[arg(short, long, default_value = "200")]
        count: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = load_config(&cli).and_then(|config| {
        init_logging(&config, cli.verbose);
        run(cli, config)
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Load the config file and apply command-line overrides
fn load_config(cli: &Cli) -> anyhow::Result<EngineConfig> {
    let path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = EngineConfig::load(&path)?;
    if let Some(threads) = cli.threads {
        config.threads = Some(threads);
    }
    config.validate()?;
    Ok(config)
}

fn init_logging(config: &EngineConfig, verbose: u8) {
    let level = match verbose {
        0 => config.log_filter().unwrap_or(LevelFilter::Info),
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: Cli, config: EngineConfig) -> anyhow::Result<()> {
    let seed_path = cli.seed_file.unwrap_or_else(default_seed_path);

    match cli.command {
        Commands::Digest { trytes } => cmd_digest(&trytes),
        Commands::Checksum { trytes, length } => cmd_checksum(&trytes, length),
        Commands::Pow {
            transaction,
            file,
            mwm,
            timeout,
        } => {
            let transaction = read_trytes(transaction, file.as_deref())?;
            cmd_pow(&transaction, mwm, timeout, &config)
        }
        Commands::Attach {
            file,
            trunk,
            branch,
            mwm,
        } => cmd_attach(&file, &trunk, &branch, mwm, &config),
        Commands::Address {
            index,
            count,
            security,
            checksum,
        } => cmd_address(&seed_path, index, count, security, checksum, &config),
        Commands::Sign {
            bundle,
            index,
            security,
        } => cmd_sign(&seed_path, &bundle, index, security, &config),
        Commands::Verify {
            address,
            bundle,
            signature,
            signature_file,
        } => {
            let signature = read_trytes(signature, signature_file.as_deref())?;
            cmd_verify(&address, &bundle, &signature)
        }
        Commands::NewSeed => cmd_new_seed(&seed_path),
        Commands::Benchmark { count } => cmd_benchmark(count, &config),
    }
}

/// Tryte input given inline or as a file (whitespace and line breaks dropped)
fn read_trytes(inline: Option<String>, file: Option<&Path>) -> anyhow::Result<String> {
    let raw = match (inline, file) {
        (Some(trytes), _) => trytes,
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => anyhow::bail!("Provide the trytes inline or with a file"),
    };
    Ok(raw.split_whitespace().collect())
}

fn load_seed(path: &Path) -> anyhow::Result<Seed> {
    if !path.exists() {
        anyhow::bail!(
            "No seed found at {}. Create one with 'tryte new-seed' and save it there",
            path.display()
        );
    }
    Ok(Seed::load_from_file(path)?)
}

fn security_level(flag: Option<u8>, config: &EngineConfig) -> anyhow::Result<SecurityLevel> {
    match flag {
        Some(level) => Ok(SecurityLevel::try_from(level)?),
        None => Ok(config.security()?),
    }
}

fn cmd_digest(trytes: &str) -> anyhow::Result<()> {
    println!("{}", digest(trytes)?);
    Ok(())
}

fn cmd_checksum(trytes: &str, length: usize) -> anyhow::Result<()> {
    println!("{}", checksum(trytes, length)?);
    Ok(())
}

fn cmd_pow(
    transaction: &str,
    mwm: Option<usize>,
    timeout: Option<u64>,
    config: &EngineConfig,
) -> anyhow::Result<()> {
    let mwm = mwm.unwrap_or(config.min_weight_magnitude);
    let threads = config.thread_count();
    let cancel = CancelToken::new();
    let diver = PearlDiver::with_cancel_token(threads, cancel.clone());
    let deadline = timeout.map(Duration::from_secs);

    println!("\n=== PearlDiver ===");
    println!("MWM:     {}", mwm);
    println!("Threads: {}", threads);
    if let Some(limit) = deadline {
        println!("Timeout: {}s", limit.as_secs());
    }
    println!("==================\n");

    let start = Instant::now();
    let result = std::thread::scope(|scope| {
        let search = scope.spawn(|| diver.search_trytes(transaction, mwm));

        // Monitor progress while workers search
        let mut last_report = Instant::now();
        while !search.is_finished() {
            std::thread::sleep(Duration::from_millis(100));
            let elapsed = start.elapsed();

            if deadline.is_some_and(|limit| elapsed >= limit) && !cancel.is_cancelled() {
                debug!("pow: timeout reached, cancelling");
                cancel.cancel();
            }

            if last_report.elapsed() >= Duration::from_secs(2) {
                last_report = Instant::now();
                let candidates = diver.candidates();
                print!(
                    "\rHashrate: {:.0} candidates/s | Candidates: {} | Time: {:.0}s",
                    candidates as f64 / elapsed.as_secs_f64().max(1e-9),
                    candidates,
                    elapsed.as_secs_f64()
                );
                use std::io::Write;
                std::io::stdout().flush().ok();
            }
        }
        search
            .join()
            .unwrap_or(Err(EngineError::Internal("search thread panicked")))
    });

    let attached = match result {
        Ok(trytes) => trytes,
        Err(EngineError::Cancelled) => anyhow::bail!(
            "No nonce found within {}s",
            deadline.map(|d| d.as_secs()).unwrap_or(0)
        ),
        Err(e) => return Err(e.into()),
    };

    let elapsed = start.elapsed().as_secs_f64();
    let candidates = diver.candidates();
    let tx = Transaction::from_trytes(&attached)?;

    println!("\n\nFound valid nonce!");
    println!("  Hash:       {}", tx.hash_trytes()?);
    println!(
        "  Candidates: {} ({:.0}/s)",
        candidates,
        candidates as f64 / elapsed.max(1e-9)
    );
    println!("  Time:       {:.2}s", elapsed);
    println!("\n{}", attached);

    Ok(())
}

fn cmd_attach(
    file: &Path,
    trunk: &str,
    branch: &str,
    mwm: Option<usize>,
    config: &EngineConfig,
) -> anyhow::Result<()> {
    let transactions: Vec<String> = std::fs::read_to_string(file)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    if transactions.is_empty() {
        anyhow::bail!("No transactions found in {}", file.display());
    }

    let mwm = mwm.unwrap_or(config.min_weight_magnitude);
    let diver = PearlDiver::new(config.thread_count());

    let start = Instant::now();
    let attached = attach_bundle_trytes(&diver, &transactions, trunk, branch, mwm)?;
    eprintln!(
        "Attached {} transactions in {:.2}s ({} candidates)",
        attached.len(),
        start.elapsed().as_secs_f64(),
        diver.candidates()
    );

    for trytes in attached {
        println!("{}", trytes);
    }
    Ok(())
}

fn cmd_address(
    seed_path: &Path,
    index: u64,
    count: u64,
    security: Option<u8>,
    with_checksum: bool,
    config: &EngineConfig,
) -> anyhow::Result<()> {
    let seed = load_seed(seed_path)?;
    let level = security_level(security, config)?;

    let addresses = generate_addresses(seed.as_trytes(), index, count, level)?;
    for (offset, address) in addresses.into_iter().enumerate() {
        let address = if with_checksum {
            add_checksum(&address)?
        } else {
            address
        };
        println!("{:>6}  {}", index + offset as u64, address);
    }
    Ok(())
}

fn cmd_sign(
    seed_path: &Path,
    bundle: &str,
    index: u64,
    security: Option<u8>,
    config: &EngineConfig,
) -> anyhow::Result<()> {
    let seed = load_seed(seed_path)?;
    let level = security_level(security, config)?;

    let signature = generate_signature(seed.as_trytes(), index, level, bundle)?;
    // one fragment per line, as they go into consecutive transactions
    for fragment in signature.as_bytes().chunks(FRAGMENT_TRYTES) {
        println!("{}", String::from_utf8_lossy(fragment));
    }
    Ok(())
}

fn cmd_verify(address: &str, bundle: &str, signature: &str) -> anyhow::Result<()> {
    if validate_signature(address, signature, bundle)? {
        println!("Signature valid");
        Ok(())
    } else {
        anyhow::bail!("Signature does not match address {}", address)
    }
}

fn cmd_new_seed(seed_path: &Path) -> anyhow::Result<()> {
    let seed = Seed::new()?;

    println!("WARNING: Keep this seed secret and secure!");
    println!("\n{}\n", seed.as_trytes());
    println!("To use it with 'address' and 'sign', save it to:");
    println!("  {}", seed_path.display());

    Ok(())
}

fn cmd_benchmark(count: u32, config: &EngineConfig) -> anyhow::Result<()> {
    println!("Running benchmark with {} transforms...", count);

    let mut state = [0i8; STATE_LENGTH];
    for (i, t) in state.iter_mut().enumerate() {
        *t = (i % 3) as i8 - 1;
    }
    let start = Instant::now();
    for _ in 0..count {
        transform(&mut state, 81);
    }
    let scalar = start.elapsed();

    let mut low = [0u64; STATE_LENGTH];
    let mut high = [u64::MAX; STATE_LENGTH];
    let start = Instant::now();
    for _ in 0..count {
        transform_bct(&mut low, &mut high, 81);
    }
    let sliced = start.elapsed();

    let per_thread = (count as u64 * LANES) as f64 / sliced.as_secs_f64().max(1e-9);

    println!("\nResults:");
    println!(
        "  Scalar Curl-P-81:     {:.2} transforms/s",
        count as f64 / scalar.as_secs_f64().max(1e-9)
    );
    println!("  Bit-sliced Curl-P-81: {:.0} candidates/s per thread", per_thread);
    println!(
        "  Estimated PoW rate:   {:.0} candidates/s on {} threads",
        per_thread * config.thread_count() as f64,
        config.thread_count()
    );

    println!("\nAlgorithm parameters:");
    println!("  State: {} trits", STATE_LENGTH);
    println!("  Hash:  {} trytes", HASH_TRYTES);
    println!("  Lanes: {} candidates per transform", LANES);

    Ok(())
}
