use std::env;
use std::process;

use log::LevelFilter;
use simulscore::sim::run_simulation;
use simulscore::{open_session, BlockId, EndingMode, SyncConfig, SyncEngine};

const USAGE: &str = "\
Usage: simulscore <data-dir> <music-id> <command> [options]

Commands:
  labels [--omit-endings]    Print the measure label of every mapped block
  resolve <seconds>          Print the position shown at a playback time
  seek <block-id>            Print the seek time for a block or movement marker
  simulate [--until <s>]     Play through the video and log every block change

Options:
  --video <id>               Video to use (default: first listed)
  --score <id>               Score edition to use (default: first listed)
  --config <file.yaml>       Synchronizer configuration
  --width <px>               Score view width for simulate (default: 800)";

const DEFAULT_WIDTH: f64 = 800.0;

struct Options {
    data_dir: String,
    music_id: String,
    command: String,
    operand: Option<String>,
    video: Option<String>,
    score: Option<String>,
    config: Option<String>,
    omit_endings: bool,
    until: Option<f64>,
    width: f64,
}

fn main() {
    let mut log_builder = env_logger::builder();
    if env::var("RUST_LOG").is_err() {
        log_builder.filter_level(LevelFilter::Info);
    }
    log_builder.init();

    let args: Vec<String> = env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}", message);
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    };

    let config = match &options.config {
        Some(path) => match SyncConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        None => SyncConfig::default(),
    };

    let engine = match open_session(
        &options.data_dir,
        &options.music_id,
        options.video.as_deref(),
        options.score.as_deref(),
        &config,
    ) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let result = match options.command.as_str() {
        "labels" => {
            print_labels(&engine, EndingMode::from_omit_flag(options.omit_endings));
            Ok(())
        }
        "resolve" => resolve(&engine, &options),
        "seek" => seek(&engine, &options),
        "simulate" => {
            let report = run_simulation(engine, &config, options.width, options.until);
            println!(
                "{} ticks, {} block changes, {} scrolls",
                report.ticks,
                report.changes.len(),
                report.scrolls
            );
            Ok(())
        }
        other => Err(format!("Unknown command '{}'", other)),
    };

    if let Err(message) = result {
        eprintln!("Error: {}", message);
        process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut positional = Vec::new();
    let mut options = Options {
        data_dir: String::new(),
        music_id: String::new(),
        command: String::new(),
        operand: None,
        video: None,
        score: None,
        config: None,
        omit_endings: false,
        until: None,
        width: DEFAULT_WIDTH,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--video" => options.video = Some(value_of(arg, iter.next())?),
            "--score" => options.score = Some(value_of(arg, iter.next())?),
            "--config" => options.config = Some(value_of(arg, iter.next())?),
            "--omit-endings" => options.omit_endings = true,
            "--until" => options.until = Some(number_of(arg, iter.next())?),
            "--width" => options.width = number_of(arg, iter.next())?,
            "-h" | "--help" => return Err(String::new()),
            flag if flag.starts_with("--") => return Err(format!("Unknown option '{}'", flag)),
            _ => positional.push(arg.clone()),
        }
    }

    let mut positional = positional.into_iter();
    match (positional.next(), positional.next(), positional.next()) {
        (Some(data_dir), Some(music_id), Some(command)) => {
            options.data_dir = data_dir;
            options.music_id = music_id;
            options.command = command;
        }
        _ => return Err("Missing arguments".to_string()),
    }
    options.operand = positional.next();
    if let Some(extra) = positional.next() {
        return Err(format!("Unexpected argument '{}'", extra));
    }
    Ok(options)
}

fn value_of(flag: &str, value: Option<&String>) -> Result<String, String> {
    value
        .cloned()
        .ok_or_else(|| format!("Option '{}' needs a value", flag))
}

fn number_of(flag: &str, value: Option<&String>) -> Result<f64, String> {
    let value = value_of(flag, value)?;
    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0)
        .ok_or_else(|| format!("Option '{}' expects a non-negative number, got '{}'", flag, value))
}

fn print_labels(engine: &SyncEngine, mode: EndingMode) {
    for movement in &engine.music().movements {
        for passage in movement.passages() {
            for id in passage.first.0..=passage.last.0 {
                let block = BlockId(id);
                println!(
                    "{:>4}  {:>2}  {}",
                    block,
                    movement.number,
                    engine.measure_label(block, mode)
                );
            }
        }
    }
}

fn resolve(engine: &SyncEngine, options: &Options) -> Result<(), String> {
    let operand = options.operand.as_deref().ok_or("resolve needs <seconds>")?;
    let time: f64 = operand
        .parse()
        .map_err(|_| format!("Invalid time '{}'", operand))?;
    let block = engine.resolve(time);
    if block.is_none() {
        println!("{:.3}s: before the first mapped block", time);
        return Ok(());
    }
    let position = engine.position(block, EndingMode::from_omit_flag(options.omit_endings));
    println!(
        "{:.3}s: block {}, movement {}, measure {} ({})",
        time,
        position.block,
        position.movement.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string()),
        if position.measure.is_empty() { "-" } else { &position.measure },
        engine.movement_title(block)
    );
    Ok(())
}

fn seek(engine: &SyncEngine, options: &Options) -> Result<(), String> {
    let operand = options.operand.as_deref().ok_or("seek needs <block-id>")?;
    let block: BlockId = operand
        .parse::<u32>()
        .map(BlockId)
        .map_err(|_| format!("Invalid block id '{}'", operand))?;
    match engine.seek_time(block) {
        Some(time) => {
            println!("block {}: {:.3}s", block, time);
            Ok(())
        }
        None => Err(format!("block {} never appears in video {}", block, engine.video_id())),
    }
}
