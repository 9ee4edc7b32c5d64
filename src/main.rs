use anyhow::Result;
use clap::Parser;
use epivigil::backend::HttpBackend;
use epivigil::clock::ReportingClock;
use epivigil::comparison::ComparisonMode;
use epivigil::coordinator::ComparisonEngine;
use epivigil::period::EpiPeriod;
use epivigil::query::MetricQuery;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "epivigil")]
#[command(about = "Period comparison for epidemiological surveillance metrics")]
struct Args {
    /// Measure to query (e.g. casos_notificados)
    measure: String,

    /// Dimensions to group by, comma separated (e.g. provincia,grupo_etario)
    #[arg(short, long, value_delimiter = ',')]
    dimensions: Vec<String>,

    /// Primary period start year (requires the other three period args)
    #[arg(long)]
    year_from: Option<i32>,

    /// Primary period start week (1-52)
    #[arg(long)]
    week_from: Option<u32>,

    /// Primary period end year
    #[arg(long)]
    year_to: Option<i32>,

    /// Primary period end week (1-52)
    #[arg(long)]
    week_to: Option<u32>,

    /// Default window size in weeks when no explicit period is given
    #[arg(long, default_value_t = 4)]
    window: u32,

    /// Comparison mode: none, year_over_year, previous_period
    #[arg(short, long, default_value = "previous_period")]
    comparison: String,

    /// Aggregation service URL (or set EPIVIGIL_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Extra filters as field=value pairs
    #[arg(short, long)]
    filter: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let comparison: ComparisonMode = args.comparison.parse()?;

    let period = match (args.year_from, args.week_from, args.year_to, args.week_to) {
        (Some(year_from), Some(week_from), Some(year_to), Some(week_to)) => {
            EpiPeriod::new(year_from, week_from, year_to, week_to)?
        }
        _ => {
            let clock = ReportingClock::from_date(chrono::Utc::now().date_naive());
            clock.window(args.window)?
        }
    };

    info!("Measure: {} period: {}", args.measure, period);

    let backend = match args.api_url {
        Some(url) => HttpBackend::new(url)?,
        None => HttpBackend::from_env()?,
    };

    let mut query = MetricQuery::new(&args.measure, period)
        .with_dimensions(args.dimensions)
        .with_comparison(comparison);
    for pair in &args.filter {
        let (field, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Invalid filter '{}', expected field=value", pair))?;
        query = query.with_filter(field, value);
    }

    let engine = ComparisonEngine::new(Arc::new(backend));
    let result = engine.run(&query).await?;

    println!("\n=== {} for {} ===", args.measure, period);
    if let Some(previous_period) = result.previous_period {
        println!("Compared against {}", previous_period);
    }
    if let Some(err) = &result.current_error {
        println!("Current period fetch failed: {}", err);
    }
    if let Some(err) = &result.previous_error {
        println!("Comparison period fetch failed: {}", err);
    }

    for row in &result.current {
        let key = result.key_of(row);
        let current = result.measure_value(row).unwrap_or(0.0);
        match result.previous_value(row) {
            Some(previous) => {
                let delta = result.delta(current, previous);
                let percentage = delta
                    .percentage
                    .map(|p| format!("{:+.1}%", p))
                    .unwrap_or_else(|| "n/a".to_string());
                println!(
                    "{} | {} -> {} | {:+} ({}) {}",
                    key,
                    previous,
                    current,
                    delta.difference,
                    percentage,
                    delta.trend.as_str()
                );
            }
            None => println!("{} | {} (no comparison row)", key, current),
        }
    }

    Ok(())
}
