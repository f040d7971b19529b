//! rowexpr demo - runs generated order rows through an expression pipeline

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rowexpr::access::{Lookup, Row, Value};
use rowexpr::executor::{Executor, FilterExecutor, MemorySource, ProjectionExecutor};
use rowexpr::expression::{function, Expr};
use std::sync::Arc;

const SKUS: [&str; 4] = ["Apple-01", "Pear-07", "Fig-13", "Plum-22"];

/// rowexpr - evaluate filter and projection expressions over rows
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of rows to generate
    #[arg(short = 'n', long, default_value = "20")]
    rows: usize,

    /// Seed for the row generator
    #[arg(short, long, default_value = "7")]
    seed: u64,

    /// Minimum order total kept by the pipeline
    #[arg(short, long, default_value = "50")]
    threshold: f64,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let lookup = Arc::new(Lookup::with_keys([
        "sku",
        "price",
        "quantity",
        "discount",
        "total",
        "has_discount",
        "label",
    ]));
    let rows = generate_rows(&lookup, args.rows, args.seed)?;
    info!("Generated {} rows (seed {})", rows.len(), args.seed);

    let mut pipeline = build_pipeline(lookup.clone(), rows, args.threshold)?;
    pipeline.init().context("Failed to initialize pipeline")?;

    let mut emitted = 0;
    while let Some(row) = pipeline.next()? {
        println!("{}", lookup.describe(&row));
        emitted += 1;
    }
    info!("{} of {} rows passed", emitted, args.rows);

    Ok(())
}

/// Generates order rows; roughly a third carry no discount field
fn generate_rows(lookup: &Lookup, count: usize, seed: u64) -> Result<Vec<Row>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(count);

    for _ in 0..count {
        let sku = SKUS[rng.gen_range(0..SKUS.len())];
        let price = (rng.gen_range(100..5000) as f64) / 100.0;
        let quantity = rng.gen_range(0..6) as f64;

        let mut fields = vec![
            ("sku", Value::string(sku)),
            ("price", Value::number(price)),
            ("quantity", Value::number(quantity)),
        ];
        if rng.gen_bool(0.66) {
            fields.push(("discount", Value::number(rng.gen_range(1..30) as f64)));
        }
        rows.push(lookup.row_from(fields)?);
    }

    Ok(rows)
}

/// Builds: source -> quantity > 0 -> total -> total >= threshold -> has_discount -> label
fn build_pipeline(
    lookup: Arc<Lookup>,
    rows: Vec<Row>,
    threshold: f64,
) -> Result<Box<dyn Executor>> {
    let key = |name: &str| {
        lookup
            .get_key(name)
            .with_context(|| format!("Missing lookup key '{}'", name))
    };

    let source = Box::new(MemorySource::new(rows));

    let in_stock = Box::new(FilterExecutor::new(
        source,
        Expr::gt(Expr::property("quantity"), Expr::number(0.0)),
        lookup.clone(),
    ));

    let total = Box::new(ProjectionExecutor::new(
        in_stock,
        Expr::mul_expr(Expr::property("price"), Expr::property("quantity")),
        lookup.clone(),
        key("total")?,
    ));

    let large = Box::new(FilterExecutor::new(
        total,
        Expr::ge(Expr::property("total"), Expr::number(threshold)),
        lookup.clone(),
    ));

    let has_discount = Box::new(ProjectionExecutor::new(
        large,
        Expr::call(function::EXISTS, vec![Expr::property("discount")]),
        lookup.clone(),
        key("has_discount")?,
    ));

    let label = Box::new(ProjectionExecutor::new(
        has_discount,
        Expr::call(
            function::CONCAT,
            vec![
                Expr::call(function::LOWER, vec![Expr::property("sku")]),
                Expr::string(" x"),
                Expr::property("quantity"),
            ],
        ),
        lookup.clone(),
        key("label")?,
    ));

    Ok(label)
}
