use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgGroup, ArgMatches, Command, value_parser};
use log::{error, info};
use std::path::PathBuf;
use std::time::SystemTime;

use tsumego_rs::config::DEFAULT_CONFIG_PATH;
use tsumego_rs::{BoardRenderer, Config, ProblemStore, Puzzle, daily_problem};

fn cli() -> Command {
    let problems_arg = Arg::new("problems")
        .long("problems")
        .value_name("PATH")
        .help("Problem file, one record per line (overrides config)")
        .value_parser(value_parser!(PathBuf));

    Command::new("Tsumego-RS")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Renders Go problem records as board diagrams")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("JSON config file")
                .default_value(DEFAULT_CONFIG_PATH)
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug messages")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("list")
                .about("List the problems in a file")
                .arg(problems_arg.clone()),
        )
        .subcommand(
            Command::new("render")
                .about("Render problems to PNG images")
                .arg(problems_arg)
                .arg(
                    Arg::new("out")
                        .long("out")
                        .value_name("DIR")
                        .help("Output directory (overrides config)")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("size")
                        .long("size")
                        .value_name("PX")
                        .help("Image width and height in pixels")
                        .value_parser(value_parser!(u32)),
                )
                .arg(
                    Arg::new("margin")
                        .long("margin")
                        .value_name("PX")
                        .help("Space around the outer grid lines in pixels")
                        .value_parser(value_parser!(u32)),
                )
                .arg(
                    Arg::new("font")
                        .long("font")
                        .value_name("PATH")
                        .help("TTF/OTF font for the caption")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("index")
                        .long("index")
                        .value_name("N")
                        .help("Render the problem at this 0-based index")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("daily")
                        .long("daily")
                        .help("Render today's problem")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("all")
                        .long("all")
                        .help("Render every problem")
                        .action(ArgAction::SetTrue),
                )
                .group(
                    ArgGroup::new("selection")
                        .args(["index", "daily", "all"])
                        .required(true),
                ),
        )
}

fn main() -> Result<()> {
    let matches = cli().get_matches();

    let mut logger = env_logger::Builder::from_default_env();
    if matches.get_flag("debug") {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    let config_path = matches
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let mut config = Config::load(&config_path).context("Failed to load configuration")?;

    match matches.subcommand() {
        Some(("list", sub)) => {
            apply_overrides(&mut config, sub);
            let store = load_store(&config)?;
            for (i, puzzle) in store.problems().iter().enumerate() {
                println!(
                    "{}: {} (B {}, W {})",
                    i,
                    puzzle.title,
                    puzzle.black.len(),
                    puzzle.white.len()
                );
            }
            Ok(())
        }
        Some(("render", sub)) => {
            apply_overrides(&mut config, sub);
            run_render(&config, sub)
        }
        _ => unreachable!("subcommand is required"),
    }
}

/// Command-line values win over the config file.
fn apply_overrides(config: &mut Config, sub: &ArgMatches) {
    if let Some(path) = sub.get_one::<PathBuf>("problems") {
        config.problems_path = path.clone();
    }
    // `list` does not define the render flags
    if sub.try_contains_id("out").is_err() {
        return;
    }
    if let Some(dir) = sub.get_one::<PathBuf>("out") {
        config.output_dir = dir.clone();
    }
    if let Some(&size) = sub.get_one::<u32>("size") {
        config.canvas_size = size;
    }
    if let Some(&margin) = sub.get_one::<u32>("margin") {
        config.margin = margin;
    }
    if let Some(font) = sub.get_one::<PathBuf>("font") {
        config.font_path = font.clone();
    }
}

fn load_store(config: &Config) -> Result<ProblemStore> {
    let mut store = ProblemStore::new();
    store
        .load(&config.problems_path)
        .context("Failed to load problems")?;
    Ok(store)
}

fn run_render(config: &Config, sub: &ArgMatches) -> Result<()> {
    let store = load_store(config)?;
    if store.is_empty() {
        bail!("no problems available in {}", config.problems_path.display());
    }

    let selected = select_problems(store.problems(), sub, SystemTime::now())?;

    let renderer = BoardRenderer::new(config.render_options());
    let mut failures = 0usize;
    for puzzle in selected {
        match renderer.render(puzzle, &config.output_dir) {
            Ok(path) => println!("{}", path.display()),
            Err(e) => {
                error!("Failed to render problem {:?}: {}", puzzle.title, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} problem(s) failed to render", failures);
    }
    info!("Done");
    Ok(())
}

/// Resolves `--all`, `--daily` or `--index N` against the loaded problems.
fn select_problems<'a>(
    problems: &'a [Puzzle],
    sub: &ArgMatches,
    now: SystemTime,
) -> Result<Vec<&'a Puzzle>> {
    if sub.get_flag("all") {
        return Ok(problems.iter().collect());
    }
    if sub.get_flag("daily") {
        let puzzle = daily_problem(problems, now).context("no problems available")?;
        return Ok(vec![puzzle]);
    }
    let index = *sub
        .get_one::<usize>("index")
        .context("one of --index, --daily or --all is required")?;
    match problems.get(index) {
        Some(puzzle) => Ok(vec![puzzle]),
        None => bail!("index {} out of range ({} problems loaded)", index, problems.len()),
    }
}
