use std::path::PathBuf;

use gobees_vision::PipelineConfig;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReportVerbosity {
    Quiet,
    Default,
    Verbose,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputFormat {
    Normal,
    Json,
}

#[derive(Debug, Clone)]
pub struct OutputCfg {
    pub format: OutputFormat,
    pub debug_dir: Option<PathBuf>,
    pub verbosity: ReportVerbosity,
}

/// Pipeline settings given on the command line. These take priority over
/// the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PipelineOverrides {
    pub history: Option<u32>,
    pub sensitivity: Option<f64>,
    pub min_area: Option<u32>,
    pub max_area: Option<u32>,
    pub blur_passes: Option<u32>,
    pub open_radius: Option<u8>,
    pub close_radius: Option<u8>,
}

impl PipelineOverrides {
    pub fn apply(&self, cfg: &mut PipelineConfig) {
        if let Some(history) = self.history {
            cfg.background.history = history;
        }
        if let Some(sensitivity) = self.sensitivity {
            cfg.background.sensitivity = sensitivity;
        }
        if let Some(min_area) = self.min_area {
            cfg.contours.min_area = min_area;
        }
        if let Some(max_area) = self.max_area {
            cfg.contours.max_area = max_area;
        }
        if let Some(passes) = self.blur_passes {
            cfg.blur.passes = passes;
        }
        if let Some(open_radius) = self.open_radius {
            cfg.morphology.open_radius = open_radius;
        }
        if let Some(close_radius) = self.close_radius {
            cfg.morphology.close_radius = close_radius;
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppCfg {
    pub frames_dir: PathBuf,
    pub cfg_path: Option<PathBuf>,
    pub overrides: PipelineOverrides,
    pub output_cfg: OutputCfg,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_empty_overrides_change_nothing() {
        let mut cfg = PipelineConfig::default();
        PipelineOverrides::default().apply(&mut cfg);
        assert_eq!(cfg, PipelineConfig::default());
    }

    #[test]
    fn test_overrides_replace_values() {
        let mut cfg = PipelineConfig::default();
        let overrides = PipelineOverrides {
            history: Some(10),
            max_area: Some(900),
            close_radius: Some(0),
            ..Default::default()
        };
        overrides.apply(&mut cfg);

        assert_eq!(cfg.background.history, 10);
        assert_eq!(cfg.contours.max_area, 900);
        assert_eq!(cfg.morphology.close_radius, 0);

        assert_eq!(cfg.background.sensitivity, PipelineConfig::default().background.sensitivity);
        assert_eq!(cfg.contours.min_area, PipelineConfig::default().contours.min_area);
    }
}
