use std::{
    error::Error,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use gobees_vision::{render_debug, BeesCounter, PipelineConfig};

use crate::app::frame_loading::{frame_paths, load_batch, LOAD_BATCH_SIZE};
use crate::app::*;

// * read cfg
// * list frames
// * load frames in batches
// * count bees in each frame, in order
// * output results

pub fn run_app() -> i32 {
    let cfg = arg_parse::parse_args();
    configure_logs(cfg.output_cfg.verbosity);

    let ret = match run_app_inner(&cfg) {
        Ok(()) => 0,
        Err(fatal_error) => {
            print_fatal_err(fatal_error, cfg.output_cfg.verbosity);
            1
        }
    };

    ret
}

fn run_app_inner(cfg: &AppCfg) -> eyre::Result<()> {
    let pipeline_cfg = load_pipeline_cfg(cfg)?;
    debug!("Pipeline configuration: {pipeline_cfg:?}");

    let mut counter = BeesCounter::from_config(pipeline_cfg).map_err(AppError::from)?;

    let paths = frame_paths(&cfg.frames_dir)?;
    info!(
        target: "frame_load",
        "Counting bees in {} frames from {}",
        paths.len(),
        cfg.frames_dir.display()
    );

    if let Some(debug_dir) = &cfg.output_cfg.debug_dir {
        std::fs::create_dir_all(debug_dir).map_err(AppError::from)?;
    }

    let mut output = CountOutput::default();

    //frames are decoded in parallel but must reach the counter in file order,
    //because the background model depends on the order it sees frames in.
    for batch in paths.chunks(LOAD_BATCH_SIZE) {
        for (path, frame) in batch.iter().zip(load_batch(batch)) {
            let frame = match frame {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(target: "frame_load", "{e}. Skipping");
                    output.push_skipped(path);
                    continue;
                }
            };

            let report = match &cfg.output_cfg.debug_dir {
                None => counter.process(&frame),
                Some(debug_dir) => {
                    let (report, stages) = counter.process_debug(&frame);
                    if let Some(stages) = stages {
                        if let Some(img) = render_debug(&frame, &stages, &report.blobs) {
                            let img_path = debug_img_path(debug_dir, path, report.frame_index);
                            if let Err(e) = save_debug_img(&img, img_path) {
                                warn!("{e}");
                            }
                        }
                    }
                    report
                }
            };

            trace!(
                target: "bee_count",
                "{}: {} bees",
                path.display(),
                report.num_bees
            );
            output.push(path, report);
        }
    }

    info!(target: "bee_count", "Counted bees in {} frames", output.len());

    let stdout = std::io::stdout();
    let mut stdout = BufWriter::new(stdout.lock());
    output
        .write(cfg.output_cfg.format, &mut stdout)
        .map_err(AppError::from)?;
    stdout.flush().map_err(AppError::from)?;

    Ok(())
}

fn load_pipeline_cfg(cfg: &AppCfg) -> Result<PipelineConfig, AppError> {
    let mut pipeline_cfg = match &cfg.cfg_path {
        Some(cfg_path) => {
            let text = std::fs::read_to_string(cfg_path).map_err(|src| AppError::CfgReadError {
                path: cfg_path.clone(),
                src,
            })?;
            parse_pipeline_cfg(&text, cfg_path)?
        }
        None => PipelineConfig::default(),
    };

    cfg.overrides.apply(&mut pipeline_cfg);
    pipeline_cfg.validate()?;

    Ok(pipeline_cfg)
}

fn parse_pipeline_cfg(text: &str, cfg_path: &Path) -> Result<PipelineConfig, AppError> {
    serde_json::from_str(text).map_err(|src| AppError::CfgParseError {
        path: cfg_path.to_path_buf(),
        src,
    })
}

//frames that differ only by extension must not share a debug image, so the
//frame index leads the name.
fn debug_img_path(debug_dir: &Path, frame_path: &Path, frame_index: u64) -> PathBuf {
    let stem = frame_path
        .file_stem()
        .map_or_else(|| "frame".into(), |stem| stem.to_string_lossy());
    debug_dir.join(format!("{frame_index:06}_{stem}.png"))
}

fn save_debug_img(img: &image::RgbImage, output_path: PathBuf) -> Result<(), AppError> {
    debug!(
        target: "write_image",
        "Writing debug image to {}", output_path.display()
    );

    img.save(&output_path)
        .map_err(|src| AppError::DebugImageError {
            path: output_path,
            src,
        })
}

fn print_fatal_err(fatal_err: eyre::Report, verbosity: ReportVerbosity) {
    error!(target: "app-errorlog", "{}", fatal_err);

    if verbosity == ReportVerbosity::Verbose {
        let mut source: Option<&(dyn Error + 'static)> = fatal_err.source();
        while let Some(e) = source {
            error!(target: "app-errorlog", "    caused by: {}", e);
            source = e.source();
        }
    }
}

pub fn configure_logs(verbosity: ReportVerbosity) {
    use simplelog::*;

    let mut cfg = simplelog::ConfigBuilder::new();
    cfg.set_target_level(LevelFilter::Error);

    let min_loglevel = match verbosity {
        ReportVerbosity::Quiet => LevelFilter::Warn,
        ReportVerbosity::Default => LevelFilter::Info,
        ReportVerbosity::Verbose => LevelFilter::Trace,
    };

    TermLogger::init(
        min_loglevel,
        cfg.build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .expect("TermLogger failed to initialize");
}

#[cfg(test)]
mod test {
    use super::*;

    fn app_cfg(overrides: PipelineOverrides) -> AppCfg {
        AppCfg {
            frames_dir: "/hive".into(),
            cfg_path: None,
            overrides,
            output_cfg: OutputCfg {
                format: OutputFormat::Normal,
                debug_dir: None,
                verbosity: ReportVerbosity::Default,
            },
        }
    }

    #[test]
    fn test_parse_pipeline_cfg() {
        let text = r#"{ "background": { "history": 30, "sensitivity": 9.0 }, "contours": { "max_area": 1000 } }"#;
        let cfg = parse_pipeline_cfg(text, Path::new("cfg.json")).unwrap();

        assert_eq!(cfg.background.history, 30);
        assert_eq!(cfg.background.sensitivity, 9.0);
        assert_eq!(cfg.contours.max_area, 1000);
        assert_eq!(cfg.contours.min_area, gobees_vision::DEFAULT_MIN_AREA);
        assert_eq!(cfg.blur.passes, gobees_vision::DEFAULT_BLUR_PASSES);

        let err = parse_pipeline_cfg("{ not json", Path::new("cfg.json")).unwrap_err();
        assert!(matches!(err, AppError::CfgParseError { .. }));
    }

    #[test]
    fn test_overrides_are_validated() {
        let cfg = app_cfg(PipelineOverrides::default());
        assert_eq!(load_pipeline_cfg(&cfg).unwrap(), PipelineConfig::default());

        let cfg = app_cfg(PipelineOverrides {
            min_area: Some(700),
            ..Default::default()
        });
        assert!(matches!(
            load_pipeline_cfg(&cfg),
            Err(AppError::PipelineCfgError(_))
        ));
    }

    #[test]
    fn test_debug_img_paths_are_unique() {
        let dir = Path::new("/debug");

        let png = debug_img_path(dir, Path::new("/hive/frame_001.png"), 4);
        let bmp = debug_img_path(dir, Path::new("/hive/frame_001.bmp"), 5);

        assert_eq!(png, PathBuf::from("/debug/000004_frame_001.png"));
        assert_eq!(bmp, PathBuf::from("/debug/000005_frame_001.png"));
    }

    #[test]
    fn test_missing_cfg_file() {
        let mut cfg = app_cfg(PipelineOverrides::default());
        cfg.cfg_path = Some("/nonexistent/gobees.json".into());
        assert!(matches!(
            load_pipeline_cfg(&cfg),
            Err(AppError::CfgReadError { .. })
        ));
    }
}
