use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /////////////////////////////////
    //configuration problems
    #[error("Invalid pipeline configuration: {0}")]
    PipelineCfgError(#[from] gobees_vision::Error),

    #[error("Failed to read config file {}: {src}", .path.display())]
    CfgReadError {
        path: PathBuf,
        #[source]
        src: std::io::Error,
    },

    #[error("Failed to parse config file {}: {src}", .path.display())]
    CfgParseError {
        path: PathBuf,
        #[source]
        src: serde_json::Error,
    },

    /////////////////////////////////
    //frame loading
    #[error("Frames directory not found: {}", .0.display())]
    FramesDirNotFound(PathBuf),

    #[error("No image files found in {}", .0.display())]
    NoFrames(PathBuf),

    #[error("Failed to list frames: {0}")]
    ListFramesError(#[from] walkdir::Error),

    #[error("Failed to decode frame {}: {src}", .path.display())]
    FrameDecodeError {
        path: PathBuf,
        #[source]
        src: image::ImageError,
    },

    /////////////////////////////////
    //output
    #[error("Failed to write debug image {}: {src}", .path.display())]
    DebugImageError {
        path: PathBuf,
        #[source]
        src: image::ImageError,
    },

    #[error("Failed to write output: {0}")]
    OutputError(#[from] std::io::Error),
}

pub fn print_error_and_quit(e: eyre::Report) -> ! {
    #[allow(clippy::print_stderr)]
    let () = eprintln!("{:?}", e);
    std::process::exit(1);
}
