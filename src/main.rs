//! Command-line entry point for the chemical space dashboard.

use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use chemspace::assets::{resolve_demo, DemoKey, DemoStore};
use chemspace::cli::{format_duration, Cli, PlotParams};
use chemspace::model::{estimate_seconds, ReductionAlgo, SimilarityType};
use chemspace::server::{run_server, ServerState};
use chemspace::weblog::WebLog;

fn main() {
    let args = Cli::parse();

    let log_level = match args.log_level.as_str() {
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let params = match args.to_params() {
        Ok(p) => p,
        Err(msg) => {
            eprintln!("error: {}", msg);
            std::process::exit(2);
        }
    };

    if args.serve {
        let state = ServerState {
            demos: DemoStore::new(&args.demo_dir),
            log: WebLog::new(&args.log_file),
        };
        run_server(&state, args.port);
        return;
    }

    if args.table {
        run_table(&args);
        return;
    }

    run_report(&args, params);
}

fn run_report(args: &Cli, params: PlotParams) {
    let n_samples = args.report_samples(&params);

    println!("=== Chemical Space Visualization ===\n");

    println!("Configuration:");
    println!("  Dataset:       {} ({})", params.dataset.name(), params.dataset.description());
    println!("  Molecules:     {}", n_samples);
    println!("  Similarity:    {}", params.similarity.name());
    println!("  Algorithm:     {}", params.algorithm.name());
    println!("  Plot type:     {}", params.plot.name());
    println!();

    let eta = estimate_seconds(n_samples, params.similarity, params.algorithm);
    println!("--- Estimated Live Runtime ---");
    println!("  {} ({} s)", format_duration(eta), eta);
    println!();

    println!("--- All Configurations at {} molecules ---", n_samples);
    for sim in SimilarityType::ALL {
        for algo in ReductionAlgo::ALL {
            let t = estimate_seconds(n_samples, sim, algo);
            let marker = if sim == params.similarity && algo == params.algorithm {
                "  <-- selected"
            } else {
                ""
            };
            println!("  {:<11} {:<6} {:>10}{}", sim.name(), algo.name(), format_duration(t), marker);
        }
    }
    println!();

    let asset = resolve_demo(DemoKey {
        dataset: params.dataset,
        similarity: params.similarity,
        algo: params.algorithm,
        plot: params.plot,
    });
    println!("--- Demo Plot ---");
    println!("  Asset:         {}", asset);
    println!("  Location:      {}/{}", args.demo_dir, asset);
}

fn run_table(args: &Cli) {
    let sizes = args.parse_table_samples();

    // Output as CSV
    println!("samples,similarity,algorithm,seconds");
    for &n in &sizes {
        for sim in SimilarityType::ALL {
            for algo in ReductionAlgo::ALL {
                println!(
                    "{},{},{},{}",
                    n,
                    sim.name(),
                    algo.token(),
                    estimate_seconds(n, sim, algo)
                );
            }
        }
    }
}
