use crate::{
    constants::TOWER_CSV_HEADER,
    coverage::CoverageSummary,
    error::{CoverageError, Result},
    tower::Tower,
};
use chrono::{DateTime, Local};
use csv::WriterBuilder;
use serde::Serialize;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Everything worth keeping from one planning run
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub generated_at: DateTime<Local>,
    pub rows: usize,
    pub cols: usize,
    pub block_coverage: Option<f64>, // None when the grid came from a map file
    pub seed: Option<u64>,
    pub radius: u32,
    pub towers: Vec<Tower>,
    pub summary: CoverageSummary,
}

/// Creates `dir` (and parents) if needed.
pub(crate) fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| CoverageError::CreateDir {
        path: dir.to_path_buf(),
        source: e,
    })
}

fn create_output_file(output_dir: Option<&Path>, filename: &str) -> Result<(PathBuf, File)> {
    let file_path = match output_dir {
        Some(dir) => {
            ensure_dir(dir)?;
            dir.join(filename)
        }
        None => PathBuf::from(filename),
    };

    let file = File::create(&file_path).map_err(|e| CoverageError::CreateFile {
        path: file_path.clone(),
        source: e,
    })?;
    Ok((file_path, file))
}

/// Writes towers as `Row,Col,Radius` rows in placement order.
pub fn write_towers_csv<W: Write>(towers: &[Tower], writer: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);

    wtr.write_record(TOWER_CSV_HEADER)?;
    for tower in towers {
        wtr.write_record([
            tower.row().to_string(),
            tower.col().to_string(),
            tower.radius().to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn export_towers_csv(towers: &[Tower], output_dir: Option<&Path>) -> Result<PathBuf> {
    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let filename = format!("towers_{timestamp}.csv");

    let (file_path, file) = create_output_file(output_dir, &filename)?;
    write_towers_csv(towers, BufWriter::new(file))?;
    Ok(file_path)
}

pub fn export_report_json(report: &PlanReport, output_dir: Option<&Path>) -> Result<PathBuf> {
    let timestamp = report.generated_at.format("%Y-%m-%d_%H-%M-%S");
    let filename = format!("plan_{timestamp}.json");

    let (file_path, file) = create_output_file(output_dir, &filename)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush()?;
    Ok(file_path)
}
