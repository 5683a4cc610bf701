//! Pedestrian OSRM dataset preparation (download + preprocess).
//!
//! Produces the files `osrm-routed` needs to serve walking routes for a
//! Geofabrik extract. Every step is skipped when its output already exists.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;

use crate::error::DatasetError;

const OSRM_IMAGE: &str = "osrm/osrm-backend";

#[derive(Debug, Clone)]
pub struct GeofabrikExtract {
    /// Geofabrik path, e.g. "europe/monaco".
    pub path: String,
}

impl GeofabrikExtract {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or("extract")
    }

    pub fn url(&self) -> String {
        format!("https://download.geofabrik.de/{}-latest.osm.pbf", self.path)
    }
}

#[derive(Debug, Clone)]
pub struct WalkingDatasetConfig {
    pub extract: GeofabrikExtract,
    pub data_root: PathBuf,
    /// Lua profile shipped inside the OSRM image.
    pub profile_script: String,
}

impl WalkingDatasetConfig {
    pub fn new(extract: GeofabrikExtract, data_root: impl Into<PathBuf>) -> Self {
        Self {
            extract,
            data_root: data_root.into(),
            profile_script: "/opt/foot.lua".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WalkingDataset {
    pub data_dir: PathBuf,
    pub osrm_base: PathBuf,
}

impl WalkingDataset {
    /// File name of the `.osrm` base, as seen from inside the container.
    pub fn container_path(&self) -> String {
        format!("/data/{}", file_name(&self.osrm_base))
    }

    pub fn ensure(config: &WalkingDatasetConfig) -> Result<Self, DatasetError> {
        let data_root = if config.data_root.is_absolute() {
            config.data_root.clone()
        } else {
            std::env::current_dir()?.join(&config.data_root)
        };
        let name = config.extract.name();
        let data_dir = data_root.join(format!("{}-foot", name));
        fs::create_dir_all(&data_dir)?;

        let pbf_path = data_dir.join(format!("{}-latest.osm.pbf", name));
        if !pbf_path.exists() {
            info!(url = %config.extract.url(), "downloading extract");
            download(&config.extract.url(), &pbf_path)?;
        }

        let osrm_base = data_dir.join(format!("{}-latest.osrm", name));
        let base = format!("/data/{}", file_name(&osrm_base));
        if !osrm_base.exists() {
            info!(profile = %config.profile_script, "extracting walking graph");
            run_osrm(
                &[
                    "osrm-extract",
                    "-p",
                    &config.profile_script,
                    &format!("/data/{}", file_name(&pbf_path)),
                ],
                &data_dir,
            )?;
        }

        if !partitioned(&osrm_base) {
            info!("partitioning walking graph");
            run_osrm(&["osrm-partition", &base], &data_dir)?;
            run_osrm(&["osrm-customize", &base], &data_dir)?;
        }

        Ok(Self { data_dir, osrm_base })
    }
}

fn download(url: &str, dest: &Path) -> Result<(), DatasetError> {
    let bytes = reqwest::blocking::get(url)?.error_for_status()?.bytes()?;
    let tmp_path = dest.with_extension("tmp");
    let mut writer = BufWriter::new(File::create(&tmp_path)?);
    writer.write_all(&bytes)?;
    writer.flush()?;
    fs::rename(tmp_path, dest)?;
    Ok(())
}

fn partitioned(osrm_base: &Path) -> bool {
    ["osrm.partition", "osrm.mldgr", "osrm.cells"]
        .iter()
        .all(|ext| osrm_base.with_extension(ext).exists())
}

fn run_osrm(args: &[&str], data_dir: &Path) -> Result<(), DatasetError> {
    let status = Command::new("docker")
        .args(["run", "--rm", "-t", "-v"])
        .arg(format!("{}:/data", data_dir.display()))
        .arg(OSRM_IMAGE)
        .args(args)
        .status()?;

    if status.success() {
        Ok(())
    } else {
        Err(DatasetError::ProcessFailure(format!(
            "{} exited with status {}",
            args.first().copied().unwrap_or("docker"),
            status
        )))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string()
}
