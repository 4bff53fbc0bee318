use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{PipelineError, Result};

pub const PART_FILE_NAME: &str = "part-00000.csv";
pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// Writes `df` as a header-bearing CSV inside the directory `output_dir`,
/// replacing whatever was there before.
///
/// The directory is assembled under a sibling staging name and only moved into
/// place once the part file and marker are fully written. Any previous output is
/// set aside first and restored if the final move fails.
pub fn write_table(df: &DataFrame, output_dir: &Path) -> Result<PathBuf> {
    let sink_error = |message: String| PipelineError::DataSink {
        path: output_dir.to_path_buf(),
        message,
    };

    let parent = match output_dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let dir_name = output_dir
        .file_name()
        .ok_or_else(|| sink_error("output path has no directory name".to_string()))?
        .to_string_lossy()
        .into_owned();

    fs::create_dir_all(&parent).map_err(|err| sink_error(err.to_string()))?;

    let staging = parent.join(format!(".{dir_name}.staging-{}", Uuid::new_v4()));
    if let Err(err) = write_part(df, &staging) {
        let _ = fs::remove_dir_all(&staging);
        return Err(sink_error(err));
    }

    let previous = parent.join(format!(".{dir_name}.previous-{}", Uuid::new_v4()));
    replace_dir(&staging, output_dir, &previous).map_err(|err| {
        let _ = fs::remove_dir_all(&staging);
        sink_error(err.to_string())
    })?;

    let part_path = output_dir.join(PART_FILE_NAME);
    info!(
        path = %part_path.display(),
        rows = df.height(),
        columns = df.width(),
        "wrote output table"
    );
    Ok(part_path)
}

fn write_part(df: &DataFrame, staging: &Path) -> std::result::Result<(), String> {
    fs::create_dir_all(staging).map_err(|err| err.to_string())?;

    let mut file = File::create(staging.join(PART_FILE_NAME)).map_err(|err| err.to_string())?;
    let mut frame = df.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut frame)
        .map_err(|err| err.to_string())?;
    file.sync_all().map_err(|err| err.to_string())?;

    File::create(staging.join(SUCCESS_MARKER)).map_err(|err| err.to_string())?;
    debug!(path = %staging.display(), "staged output directory");
    Ok(())
}

fn replace_dir(staging: &Path, target: &Path, previous: &Path) -> std::io::Result<()> {
    let had_previous = target.exists();
    if had_previous {
        fs::rename(target, previous)?;
    }

    if let Err(err) = fs::rename(staging, target) {
        if had_previous {
            fs::rename(previous, target)?;
        }
        return Err(err);
    }

    if had_previous {
        let removed = if previous.is_dir() {
            fs::remove_dir_all(previous)
        } else {
            fs::remove_file(previous)
        };
        if let Err(err) = removed {
            warn!(path = %previous.display(), error = %err, "failed to remove previous output");
        }
    }
    Ok(())
}
