use std::path::{Path, PathBuf};

use clap::{value_parser, ArgAction::*};

use crate::app::*;

// inputs
const FRAMES_DIR: &str = "Frames directory";
const CFG_FILE: &str = "Config file";

// pipeline settings
const HISTORY: &str = "History";
const SENSITIVITY: &str = "Sensitivity";
const MIN_AREA: &str = "Minimum area";
const MAX_AREA: &str = "Maximum area";
const BLUR_PASSES: &str = "Blur passes";
const OPEN_RADIUS: &str = "Opening radius";
const CLOSE_RADIUS: &str = "Closing radius";

//output settings
const OUTPUT_FORMAT: &str = "Format";
const DEBUG_DIR: &str = "Debug image directory";

//Verbosity
const VERBOSITY_QUIET: &str = "Quiet";
const VERBOSITY_VERBOSE: &str = "Verbose";

const DISPLAY_ORDERING: [&str; 13] = [
    //
    // inputs
    FRAMES_DIR,
    CFG_FILE,
    //
    //background model
    HISTORY,
    SENSITIVITY,
    //
    //noise removal
    BLUR_PASSES,
    OPEN_RADIUS,
    CLOSE_RADIUS,
    //
    //counting
    MIN_AREA,
    MAX_AREA,
    //
    //outputs
    OUTPUT_FORMAT,
    DEBUG_DIR,
    //
    //verbosity
    VERBOSITY_QUIET,
    VERBOSITY_VERBOSE,
];

fn build_app() -> clap::Command {
    let get_ordering = |arg_name: &str| -> usize {
        match DISPLAY_ORDERING.iter().position(|x| *x == arg_name) {
            Some(idx) => idx,
            None => {
                panic!("argument not assigned a display order: {arg_name:?}");
            }
        }
    };

    //args are not added through method chaining because rustfmt struggles with very long expressions.
    let mut clap_app = clap::Command::new("gobees")
        .version(clap::crate_version!())
        .about("Count the bees crossing a hive entrance");

    clap_app = clap_app.arg(
        clap::Arg::new(FRAMES_DIR)
            .long("frames")
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help("Directory of frame images, in capture order when sorted by file name. Subdirectories are not searched.")
            .display_order(get_ordering(FRAMES_DIR)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(CFG_FILE)
            .long("config")
            .value_parser(value_parser!(PathBuf))
            .help("JSON file of pipeline settings. Settings that are missing take their default value. Any setting given on the command line takes priority.")
            .display_order(get_ordering(CFG_FILE)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(HISTORY)
            .long("history")
            .value_parser(value_parser!(u32))
            .help(format!("Number of frames the background model averages over [default: {}]", gobees_vision::DEFAULT_HISTORY))
            .display_order(get_ordering(HISTORY)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(SENSITIVITY)
            .long("sensitivity")
            .value_parser(value_parser!(f64))
            .help(format!("Squared difference from the background, in units of background variance, above which a pixel is foreground [default: {}]", gobees_vision::DEFAULT_SENSITIVITY))
            .display_order(get_ordering(SENSITIVITY)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(BLUR_PASSES)
            .long("blur-passes")
            .value_parser(value_parser!(u32))
            .help(format!("Number of 3x3 smoothing passes [default: {}]", gobees_vision::DEFAULT_BLUR_PASSES))
            .display_order(get_ordering(BLUR_PASSES)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(OPEN_RADIUS)
            .long("open-radius")
            .value_parser(value_parser!(u8))
            .help(format!("Radius of the opening that removes foreground specks [default: {}]", gobees_vision::DEFAULT_OPEN_RADIUS))
            .display_order(get_ordering(OPEN_RADIUS)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(CLOSE_RADIUS)
            .long("close-radius")
            .value_parser(value_parser!(u8))
            .help(format!("Radius of the closing that rejoins fragments of a bee. 0 disables it [default: {}]", gobees_vision::DEFAULT_CLOSE_RADIUS))
            .display_order(get_ordering(CLOSE_RADIUS)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(MIN_AREA)
            .long("min-area")
            .value_parser(value_parser!(u32))
            .help(format!("Smallest region, in pixels, counted as a bee [default: {}]", gobees_vision::DEFAULT_MIN_AREA))
            .display_order(get_ordering(MIN_AREA)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(MAX_AREA)
            .long("max-area")
            .value_parser(value_parser!(u32))
            .help(format!("Regions this size or larger are not counted [default: {}]", gobees_vision::DEFAULT_MAX_AREA))
            .display_order(get_ordering(MAX_AREA)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(OUTPUT_FORMAT)
            .long("output-format")
            .value_parser(value_parser!(OutputFormat))
            .default_value("normal")
            .help("Print a line per frame, or a single JSON document")
            .display_order(get_ordering(OUTPUT_FORMAT)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(DEBUG_DIR)
            .long("debug-dir")
            .value_parser(value_parser!(PathBuf))
            .help("Write an image of each stage of the pipeline for every frame to this directory")
            .display_order(get_ordering(DEBUG_DIR)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(VERBOSITY_QUIET)
            .long("quiet")
            .help("Reduced verbosity")
            .conflicts_with(VERBOSITY_VERBOSE)
            .action(SetTrue)
            .display_order(get_ordering(VERBOSITY_QUIET)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(VERBOSITY_VERBOSE)
            .long("verbose")
            .help("Increased verbosity")
            .conflicts_with(VERBOSITY_QUIET)
            .action(SetTrue)
            .display_order(get_ordering(VERBOSITY_VERBOSE)),
    );

    clap_app
}

pub fn parse_args() -> AppCfg {
    //capture the cwd once, to minimize the risk of working with two values if it is changed by the OS at runtime.
    let cwd = std::env::current_dir()
        .map_err(|e| eyre::Report::new(e).wrap_err("Failed to read the working directory"))
        .unwrap_or_else(|e| print_error_and_quit(e));

    let args = build_app().get_matches();
    cfg_from_matches(&args, &cwd)
}

fn cfg_from_matches(args: &clap::ArgMatches, cwd: &Path) -> AppCfg {
    let frames_dir = args
        .get_one::<PathBuf>(FRAMES_DIR)
        .map(|p| absolutify_path(cwd, p))
        .expect("This argument is required");

    let overrides = PipelineOverrides {
        history: args.get_one::<u32>(HISTORY).copied(),
        sensitivity: args.get_one::<f64>(SENSITIVITY).copied(),
        min_area: args.get_one::<u32>(MIN_AREA).copied(),
        max_area: args.get_one::<u32>(MAX_AREA).copied(),
        blur_passes: args.get_one::<u32>(BLUR_PASSES).copied(),
        open_radius: args.get_one::<u8>(OPEN_RADIUS).copied(),
        close_radius: args.get_one::<u8>(CLOSE_RADIUS).copied(),
    };

    let verbosity = if args.get_flag(VERBOSITY_QUIET) {
        ReportVerbosity::Quiet
    } else if args.get_flag(VERBOSITY_VERBOSE) {
        ReportVerbosity::Verbose
    } else {
        ReportVerbosity::Default
    };

    let output_cfg = OutputCfg {
        format: *args
            .get_one::<OutputFormat>(OUTPUT_FORMAT)
            .expect("This argument has a default value"),
        debug_dir: args
            .get_one::<PathBuf>(DEBUG_DIR)
            .map(|p| absolutify_path(cwd, p)),
        verbosity,
    };

    let ret = AppCfg {
        frames_dir,
        cfg_path: args
            .get_one::<PathBuf>(CFG_FILE)
            .map(|p| absolutify_path(cwd, p)),
        overrides,
        output_cfg,
    };

    ret
}

fn absolutify_path(cwd: &Path, path: &Path) -> PathBuf {
    //get the absolute path if it is not absolute, by prepending the cwd.
    let path = if path.is_relative() {
        cwd.join(path)
    } else {
        path.to_path_buf()
    };

    //now try canonicalizing the path. If that fails then carry on with the joined path,
    //the file will be reported as missing when it is opened.
    let p = path.canonicalize().unwrap_or(path);

    p
}
