use std::error::Error;

use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use irmetrics::flat::csv::{read_flat, read_labels, FlatColumns};
use irmetrics::flat::{flat, FlatMeasure};
use irmetrics::metrics::{coverage, mean, Evaluator, Scores};
use irmetrics::relevance::{Multilabel, Relevance, Unilabel};
use irmetrics::{Label, Padding};

const BATCH_MEASURES: [&str; 7] = ["rr", "recall", "precision", "ap", "ndcg", "iou", "coverage"];

fn cli() -> Command {
    let k = Arg::new("k")
        .long("k")
        .short('k')
        .value_name("N")
        .help("Only score the first N positions of each ranking (\"all\" for every position)");

    Command::new("irmetrics")
        .version("0.1.0")
        .about("Scores rankings with information retrieval metrics")
        .subcommand_required(true)
        .subcommand(
            Command::new("flat")
                .about("Scores a table with one row per (query, judged result)")
                .arg(
                    Arg::new("input")
                        .long("input")
                        .short('i')
                        .value_name("FILE")
                        .help("CSV file with a header row")
                        .required(true),
                )
                .arg(
                    Arg::new("query_col")
                        .long("query-col")
                        .value_name("COLUMN")
                        .default_value("query"),
                )
                .arg(
                    Arg::new("relevance_col")
                        .long("relevance-col")
                        .value_name("COLUMN")
                        .default_value("relevance"),
                )
                .arg(
                    Arg::new("weights_col")
                        .long("weights-col")
                        .value_name("COLUMN")
                        .help("Per-row weights, used by wdcg"),
                )
                .arg(
                    Arg::new("measure")
                        .long("measure")
                        .short('m')
                        .value_parser(FlatMeasure::ALL.map(|measure| measure.name()))
                        .default_value("ndcg"),
                )
                .arg(k.clone().default_value("all"))
                .arg(
                    Arg::new("skip_nan")
                        .long("skip-nan")
                        .help("Leave queries without relevant results out of the mean")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("batch")
                .about("Scores predicted label rows against true label rows")
                .arg(
                    Arg::new("truth")
                        .long("truth")
                        .short('t')
                        .value_name("FILE")
                        .help("Header-less CSV of true labels, one sample per line")
                        .required(true),
                )
                .arg(
                    Arg::new("pred")
                        .long("pred")
                        .short('p')
                        .value_name("FILE")
                        .help("Header-less CSV of ranked predictions, one sample per line")
                        .required(true),
                )
                .arg(
                    Arg::new("measure")
                        .long("measure")
                        .short('m')
                        .value_parser(BATCH_MEASURES)
                        .default_value("ndcg"),
                )
                // matches DEFAULT_K
                .arg(k.default_value("20"))
                .arg(
                    Arg::new("unilabel")
                        .long("unilabel")
                        .help("Each sample has exactly one true label")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("padding")
                        .long("padding")
                        .value_name("VALUE")
                        .help("Label that marks an empty position (default: empty cells)"),
                ),
        )
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> Result<&'a str, Box<dyn Error>> {
    matches
        .get_one::<String>(id)
        .map(String::as_str)
        .ok_or_else(|| format!("missing argument {id}").into())
}

fn depth(matches: &ArgMatches) -> Result<Option<usize>, Box<dyn Error>> {
    match required(matches, "k")? {
        "all" => Ok(None),
        n => Ok(Some(n.parse()?)),
    }
}

fn run_flat(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let columns = FlatColumns {
        query: required(matches, "query_col")?,
        relevance: required(matches, "relevance_col")?,
        weights: matches.get_one::<String>("weights_col").map(String::as_str),
    };
    let measure: FlatMeasure = required(matches, "measure")?.parse()?;
    let k = depth(matches)?;

    let records = read_flat(required(matches, "input")?, &columns)?;
    let scores = flat(records, measure, k)?;
    info!(queries = scores.len(), %measure, ?k, "scored flat table");

    println!("query,{measure}");
    for (query, score) in &scores {
        println!("{query},{score}");
    }
    let skip_nan = matches.get_flag("skip_nan");
    println!("mean,{}", mean(scores.iter().map(|(_, score)| *score), skip_nan));
    Ok(())
}

fn run_batch(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let measure = required(matches, "measure")?;
    let k = depth(matches)?;
    let truth = read_labels(required(matches, "truth")?)?;
    let pred = read_labels(required(matches, "pred")?)?;

    let sentinel = matches.get_one::<String>("padding").map(|cell| Label::from_cell(cell));
    let padding = match &sentinel {
        Some(value) => Padding::Value(value),
        None => Padding::Natural,
    };
    let policy: &dyn Relevance<Label> = if matches.get_flag("unilabel") {
        &Unilabel
    } else {
        &Multilabel
    };
    let evaluator = Evaluator::new().k(k).padding(padding).relevance(policy);

    let scores: Scores = match measure {
        "rr" => evaluator.rr(truth, pred)?,
        "recall" => evaluator.recall(truth, pred)?,
        "precision" => evaluator.precision(truth, pred)?,
        "ap" => evaluator.ap(truth, pred)?,
        "ndcg" => evaluator.ndcg(truth, pred)?,
        "iou" => evaluator.iou(truth, pred)?,
        "coverage" => coverage(pred, padding),
        other => return Err(format!("unknown measure {other:?}").into()),
    };
    info!(samples = scores.len(), measure, ?k, "scored label batch");

    println!("sample,{measure}");
    for (i, score) in scores.iter().enumerate() {
        println!("{i},{score}");
    }
    println!("mean,{}", scores.mean(false));
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "irmetrics=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let matches = cli().get_matches();
    match matches.subcommand() {
        Some(("flat", matches)) => run_flat(matches),
        Some(("batch", matches)) => run_batch(matches),
        _ => Err("expected a subcommand".into()),
    }
}
