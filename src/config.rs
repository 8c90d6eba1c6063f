//! Run configuration: column aliases, grouping thresholds, and output layout.

use std::path::{Path, PathBuf};

pub const DEFAULT_CSV_PATH: &str = "EVALUATION_SCORES.csv";
pub const DEFAULT_FIGURES_DIR: &str = "figures_evals";
pub const DEFAULT_OUTPUTS_DIR: &str = "outputs";

/// Names of the six logical input columns as they appear in the CSV header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnAliases {
    pub date: String,
    pub score: String,
    pub school_year: String,
    pub observer: String,
    /// Accepted for symmetry with the other columns; nothing downstream reads it.
    pub observee: String,
    pub eval_type: String,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self {
            date: "ObservationDateTime".into(),
            score: "ObservationScore".into(),
            school_year: "SchoolYear".into(),
            observer: "ObserverLastFirstName".into(),
            observee: "ObserveeLastFirstName".into(),
            eval_type: "EvaluationType".into(),
        }
    }
}

/// Minimum observation counts a group must reach to be charted and tabulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub min_group_n: usize,
    pub min_observer_n: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_group_n: 10,
            min_observer_n: 5,
        }
    }
}

/// Where every artifact of a run lands.
///
/// File names carry a tag derived from the school-year filter so runs for
/// different years can share the same directories.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub figures_dir: PathBuf,
    pub outputs_dir: PathBuf,
    pub tag: String,
}

impl OutputLayout {
    pub fn new(
        figures_dir: impl Into<PathBuf>,
        outputs_dir: impl Into<PathBuf>,
        school_year: Option<&str>,
    ) -> Self {
        Self {
            figures_dir: figures_dir.into(),
            outputs_dir: outputs_dir.into(),
            tag: school_year.map(school_year_tag).unwrap_or_default(),
        }
    }

    fn figure(&self, stem: &str) -> PathBuf {
        self.figures_dir.join(format!("{stem}{}.png", self.tag))
    }

    fn table(&self, stem: &str) -> PathBuf {
        self.outputs_dir.join(format!("{stem}{}.csv", self.tag))
    }

    pub fn histogram_png(&self) -> PathBuf {
        self.figure("01_hist_scores")
    }

    pub fn boxplot_png(&self) -> PathBuf {
        self.figure("02_box_by_type")
    }

    pub fn trend_png(&self) -> PathBuf {
        self.figure("03_monthly_trend")
    }

    pub fn observer_png(&self) -> PathBuf {
        self.figure("05_observer_mean_bar")
    }

    pub fn grouped_csv(&self) -> PathBuf {
        self.table("type_means_grouped")
    }

    pub fn type_means_csv(&self) -> PathBuf {
        self.table("type_means")
    }

    pub fn monthly_csv(&self) -> PathBuf {
        self.table("monthly_means")
    }

    pub fn observer_csv(&self) -> PathBuf {
        self.table("evaluator_stats")
    }

    /// Creates both output directories.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.figures_dir)?;
        std::fs::create_dir_all(&self.outputs_dir)?;
        Ok(())
    }

    /// Human-readable suffix for chart titles, e.g. ` (2023-2024)`.
    pub fn title_suffix(&self) -> String {
        match self.tag.strip_prefix('_') {
            Some(t) => format!(" ({t})"),
            None => String::new(),
        }
    }
}

/// Builds the file-name tag for a school-year filter: `2023/2024` becomes `_2023-2024`.
pub fn school_year_tag(school_year: &str) -> String {
    if school_year.is_empty() {
        return String::new();
    }
    format!("_{}", school_year.replace('/', "-").replace(' ', "_"))
}

/// Resolves a path against the current directory for display.
pub fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
