use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::FleetIndex;
use ml_client::connect_or_unavailable;
use pipeline::{FilterPipeline, Recommendation, RecommendationGenerator};
use server::{ConfigOverrides, ServerConfig, init_tracing, serve};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// RouteSaathi - bus fleet reallocation dashboard
#[derive(Parser)]
#[command(name = "routesaathi")]
#[command(about = "Bus fleet dashboard backend with demand-based reallocation", long_about = None)]
struct Cli {
    /// Directory holding user.json, stats.json and fleet.json
    /// [env: ROUTESAATHI_DATA_DIR, default: data]
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// gRPC address of the demand model service, empty to disable
    /// [env: ROUTESAATHI_CLASSIFIER_ADDR, default: http://127.0.0.1:50051]
    #[arg(long)]
    classifier_addr: Option<String>,

    /// Default log filter when RUST_LOG is not set
    /// [env: ROUTESAATHI_LOG_LEVEL, default: info]
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP dashboard backend
    Serve {
        /// [env: ROUTESAATHI_HOST, default: 127.0.0.1]
        #[arg(long)]
        host: Option<String>,

        /// [env: ROUTESAATHI_PORT, default: 8000]
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print reallocation recommendations for every route
    Recommend {
        /// Hour of day (0-23) to classify for; defaults to the local clock
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..24))]
        hour: Option<u32>,

        /// Show reason and expected impact
        #[arg(long)]
        explain: bool,
    },

    /// Apply the recommendation for one route
    Apply {
        #[arg(long)]
        route_id: String,
    },

    /// List buses, optionally filtered by route and status
    Buses {
        #[arg(long)]
        route: Option<String>,

        /// ontime, delay or congestion
        #[arg(long)]
        status: Option<String>,
    },

    /// Check a username, password and role against user.json
    Login {
        #[arg(long)]
        username: String,

        #[arg(long)]
        password: String,

        #[arg(long)]
        role: String,
    },

    /// Generate recommendations repeatedly and report latency
    Benchmark {
        /// Number of generation runs
        #[arg(long, default_value = "100")]
        requests: usize,
    },
}

impl Cli {
    /// Flags the user actually passed; everything else comes from the environment
    fn overrides(&self) -> ConfigOverrides {
        let (host, port) = match &self.command {
            Commands::Serve { host, port } => (host.clone(), *port),
            _ => (None, None),
        };
        ConfigOverrides {
            host,
            port,
            data_dir: self.data_dir.clone(),
            classifier_addr: self.classifier_addr.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ServerConfig::from_env()
        .and_then(|env| env.with_overrides(cli.overrides()))
        .context("Invalid configuration")?;
    init_tracing(&config.log_level)?;

    match cli.command {
        Commands::Serve { .. } => serve(config).await,
        command => run_offline(&config.data_dir, &config.classifier_addr, command).await,
    }
}

/// Run a one-shot command against the snapshots without starting the server
async fn run_offline(data_dir: &Path, classifier_addr: &str, command: Commands) -> Result<()> {
    println!("Loading snapshots from {}...", data_dir.display());
    let start = Instant::now();
    let index = Arc::new(
        FleetIndex::load_from_dir(data_dir).context("Failed to load dashboard snapshots")?,
    );
    println!("{} Loaded snapshots in {:?}", "✓".green(), start.elapsed());

    match command {
        Commands::Recommend { hour, explain } => {
            let generator = build_generator(index, classifier_addr).await;
            let recs = match hour {
                Some(hour) => generator.generate_at(hour).await,
                None => generator.generate().await,
            };
            print_recommendations(&recs, explain);
        }
        Commands::Apply { route_id } => {
            let generator = build_generator(index, classifier_addr).await;
            let rec = generator.apply_by_route_id(&route_id).await?;
            println!(
                "{} Recommendation for Route {} applied: {} buses reallocated.",
                "✓".green(),
                route_id,
                rec.change
            );
        }
        Commands::Buses { route, status } => handle_buses(&index, route, status),
        Commands::Login {
            username,
            password,
            role,
        } => handle_login(&index, &username, &password, &role)?,
        Commands::Benchmark { requests } => {
            let generator = build_generator(index, classifier_addr).await;
            handle_benchmark(generator, requests).await?;
        }
        Commands::Serve { .. } => return Err(anyhow!("serve is not an offline command")),
    }

    Ok(())
}

async fn build_generator(index: Arc<FleetIndex>, classifier_addr: &str) -> RecommendationGenerator {
    let classifier = if classifier_addr.trim().is_empty() {
        Arc::new(ml_client::UnavailableClassifier) as Arc<dyn ml_client::DemandClassifier>
    } else {
        connect_or_unavailable(classifier_addr).await
    };
    RecommendationGenerator::new(index, classifier)
}

fn handle_buses(index: &FleetIndex, route: Option<String>, status: Option<String>) {
    let pipeline = FilterPipeline::from_query(route.as_deref(), status.as_deref());
    let buses = pipeline.apply(index.buses().to_vec());

    println!("{}", format!("{} buses", buses.len()).bold().blue());
    for bus in &buses {
        let status = match bus.status {
            data_loader::BusStatus::OnTime => bus.status_text.green(),
            data_loader::BusStatus::Delay => bus.status_text.yellow(),
            data_loader::BusStatus::Congestion => bus.status_text.red(),
        };
        println!(
            "{:<14} {:<6} {:<24} {:<12} load {:>4}  {}",
            bus.number, bus.route, bus.location, status, bus.load, bus.conductor
        );
    }
}

fn handle_login(index: &FleetIndex, username: &str, password: &str, role: &str) -> Result<()> {
    let user = index
        .authenticate(username, password, role)
        .ok_or_else(|| anyhow!("Invalid credentials or role mismatch"))?;

    println!(
        "{} Logged in as {} ({}), token mock_token_{}",
        "✓".green(),
        user.username.bold(),
        user.role.as_str(),
        user.role.as_str()
    );
    Ok(())
}

async fn handle_benchmark(generator: RecommendationGenerator, requests: usize) -> Result<()> {
    if requests == 0 {
        return Err(anyhow!("--requests must be at least 1"));
    }

    let wall = Instant::now();
    let mut handles = Vec::with_capacity(requests);
    for _ in 0..requests {
        let generator = generator.clone();
        let hour = rand::random_range(0..24);
        handles.push(tokio::spawn(async move {
            let start = Instant::now();
            let run = generator.run_at(hour).await;
            (start.elapsed(), run.recommendations.len(), run.fallback_routes)
        }));
    }

    let mut timings: Vec<Duration> = Vec::with_capacity(requests);
    let mut routes = 0;
    let mut fallbacks = 0;
    for handle in handles {
        let (elapsed, count, fell_back) = handle.await?;
        timings.push(elapsed);
        routes += count;
        fallbacks += fell_back;
    }

    let total = wall.elapsed();
    timings.sort();
    let percentile = |p: f64| timings[((timings.len() - 1) as f64 * p) as usize];
    let avg = timings.iter().sum::<Duration>() / timings.len() as u32;

    println!("{}", "Benchmark results:".bold().blue());
    println!("Model: {}", generator.classifier_name());
    println!("Runs: {} ({} route recommendations, {} random fallbacks)", requests, routes, fallbacks);
    println!("Total time: {:?}", total);
    println!("Average latency: {:?}", avg);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} runs/second", requests as f64 / total.as_secs_f64());
    Ok(())
}

fn print_recommendations(recommendations: &[Recommendation], explain: bool) {
    println!("{}", "Reallocation Recommendations:".bold().blue());
    for (i, rec) in recommendations.iter().enumerate() {
        let priority = match rec.priority.as_str() {
            "HIGH" => rec.priority.red(),
            "LOW" => rec.priority.cyan(),
            _ => rec.priority.yellow(),
        };
        println!(
            "{}. [{}] {} - {} -> {} buses ({})",
            (i + 1).to_string().green(),
            priority,
            rec.route,
            rec.current_buses,
            rec.recommended_buses,
            rec.change
        );
        if explain {
            println!("   Reason: {}", rec.reason);
            println!("   Impact: {}", rec.impact);
        }
    }
}
