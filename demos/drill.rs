use drillsched::config::DrillConfig;
use drillsched::item::Algorithm;
use drillsched::session::DrillSession;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Run a simulated drill session over a set of keys, printing every review.
#[derive(Parser, Debug)]
#[clap(long_about = None)]
struct Args {
    /// Yaml file with session settings, flags override its values.
    #[clap(short, long)]
    config: Option<String>,

    /// Interval algorithm: sm2, sm5 or simple8.
    #[clap(short, long)]
    algorithm: Option<Algorithm>,

    /// Number of reviews to perform.
    #[clap(short, long)]
    iterations: Option<usize>,

    /// Seed for a reproducible session.
    #[clap(short, long)]
    seed: Option<u64>,

    /// Fail every item once before starting.
    #[clap(long)]
    prime: Option<bool>,

    /// Print reviews as json lines.
    #[clap(long)]
    json: bool,

    /// Number of generated keys if none are given.
    #[clap(long, default_value_t = 8)]
    items: usize,

    /// The keys to drill.
    keys: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut config = match &args.config {
        Some(filename) => DrillConfig::load(filename)
            .map_err(|e| format!("failed to load {filename}: {e}"))?,
        None => DrillConfig::default(),
    };
    if let Some(algorithm) = args.algorithm {
        config.algorithm = algorithm;
    }
    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(prime) = args.prime {
        config.prime = prime;
    }

    let keys = if args.keys.is_empty() {
        (0..args.items).map(|i| format!("item-{i}")).collect()
    } else {
        args.keys
    };

    let mut session = DrillSession::new(keys, &config);
    if config.prime {
        session.prime(0.0)?;
    }

    let mut output_error = None;
    session.run(|review| {
        if args.json {
            match serde_json::to_string(review) {
                Ok(line) => println!("{line}"),
                Err(e) => {
                    output_error.get_or_insert(e);
                }
            }
        } else {
            let r = &review.result;
            println!(
                "\"{}\" [{}, {}, {}]",
                review.key,
                r.last_interval,
                r.ease.map(|e| e.to_string()).unwrap_or_else(|| "-".to_owned()),
                r.mean_quality
            );
        }
    })?;
    if let Some(e) = output_error {
        return Err(Box::new(e));
    }
    Ok(())
}
