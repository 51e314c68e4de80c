//! Where baseline states come from.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use contracts::{BaselineSourceKind, BaselineState};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum BaselineError {
    #[error("no baseline available for region {0}")]
    NotFound(String),
    #[error("baseline for region {region} covers {found}, not {requested}")]
    YearUnavailable {
        region: String,
        requested: i32,
        found: i32,
    },
    #[error("failed to read baseline {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse baseline {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub trait BaselineSource: Send + Sync {
    fn load(&self, region: &str, baseline_year: i32) -> Result<BaselineState, BaselineError>;

    /// Recorded in result metadata as `baseline_source`.
    fn kind(&self) -> BaselineSourceKind;
}

/// Fixed stand-in baseline served for every region.
#[derive(Debug, Clone)]
pub struct FixtureBaselineSource {
    template: BaselineState,
}

impl Default for FixtureBaselineSource {
    fn default() -> Self {
        let counts = [
            ("1", 500.0),
            ("2", 300.0),
            ("4", 700.0),
            ("5", 200.0),
            ("6", 200.0),
            ("7", 100.0),
        ];
        Self {
            template: BaselineState {
                region: String::new(),
                baseline_year: 0,
                bounding_box: [77.0, 10.0, 80.0, 13.0],
                land_cover_counts: counts
                    .into_iter()
                    .map(|(class_id, count)| (class_id.to_string(), count))
                    .collect::<BTreeMap<_, _>>(),
                rainfall_mm: 1000.0,
                temperature_c: 25.0,
                ndvi: 0.55,
            },
        }
    }
}

impl BaselineSource for FixtureBaselineSource {
    fn load(&self, region: &str, baseline_year: i32) -> Result<BaselineState, BaselineError> {
        let mut state = self.template.clone();
        state.region = region.to_string();
        state.baseline_year = baseline_year;
        Ok(state)
    }

    fn kind(&self) -> BaselineSourceKind {
        BaselineSourceKind::Fixture
    }
}

/// Reads `<dir>/<region_slug>.json`.
#[derive(Debug, Clone)]
pub struct JsonBaselineSource {
    dir: PathBuf,
}

impl JsonBaselineSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, region: &str) -> Option<PathBuf> {
        let slug = region_slug(region);
        if slug.trim_matches('_').is_empty() {
            return None;
        }
        Some(self.dir.join(format!("{slug}.json")))
    }
}

impl BaselineSource for JsonBaselineSource {
    fn load(&self, region: &str, baseline_year: i32) -> Result<BaselineState, BaselineError> {
        let Some(path) = self.path_for(region) else {
            return Err(BaselineError::NotFound(region.to_string()));
        };

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(BaselineError::NotFound(region.to_string()));
            }
            Err(source) => return Err(BaselineError::Io { path, source }),
        };

        let mut state: BaselineState = serde_json::from_str(&raw)
            .map_err(|source| BaselineError::Parse {
                path: path.clone(),
                source,
            })?;
        if state.baseline_year != baseline_year {
            return Err(BaselineError::YearUnavailable {
                region: region.to_string(),
                requested: baseline_year,
                found: state.baseline_year,
            });
        }
        // The file name already identifies the region; keep the caller's spelling.
        state.region = region.to_string();

        debug!(region, path = %path.display(), "baseline loaded from file");
        Ok(state)
    }

    fn kind(&self) -> BaselineSourceKind {
        BaselineSourceKind::File
    }
}

/// Lowercase, with every non-alphanumeric character replaced by `_`.
pub fn region_slug(region: &str) -> String {
    region
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
