use crate::{
    constants::{CHARTS_SUBDIR, CHART_FILE},
    error::{ChartNotFound, ChartYamlParse, ReadingDirectoryContents, ReadingFile, Result},
};
use semver::Version;
use serde::Deserialize;
use snafu::{OptionExt, ResultExt};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::trace;

/// This struct is used to deserialize helm charts' Chart.yaml file.
#[derive(Deserialize)]
struct ChartMetadata {
    name: String,
    version: Version,
    #[serde(default)]
    description: Option<String>,
}

/// A Helm chart found in the chart filesystem.
#[derive(Clone, Debug, PartialEq)]
pub struct Chart {
    name: String,
    version: Version,
    description: Option<String>,
    path: PathBuf,
}

impl Chart {
    /// This is a getter for the helm chart name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// This is a getter for the helm chart version.
    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The chart directory.
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }
}

/// Read-only view of a directory holding the installer's charts and its default configuration.
#[derive(Clone, Debug)]
pub struct ChartFS {
    base_dir: PathBuf,
}

impl ChartFS {
    /// The base directory is not checked here, errors surface when it is read.
    pub fn new<P>(base_dir: P) -> Self
    where
        P: AsRef<Path>,
    {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        self.base_dir.as_path()
    }

    /// Read a file, the path is relative to the base directory.
    pub fn read_file<P>(&self, path: P) -> Result<Vec<u8>>
    where
        P: AsRef<Path>,
    {
        let filepath = self.base_dir.join(path);
        fs::read(filepath.as_path()).context(ReadingFile { filepath })
    }

    /// Load the chart in the directory, relative to the base directory.
    pub fn chart_at<P>(&self, dir: P) -> Result<Chart>
    where
        P: AsRef<Path>,
    {
        load_chart(self.base_dir.join(dir).as_path())
    }

    /// Find a chart by its name.
    pub fn get_chart(&self, name: &str) -> Result<Chart> {
        self.walk_charts()?
            .into_iter()
            .find(|chart| chart.name() == name)
            .context(ChartNotFound {
                name,
                path: self.base_dir.join(CHARTS_SUBDIR),
            })
    }

    /// Every chart below the charts directory, sorted by name. The sub-charts of a chart are not
    /// included.
    pub fn walk_charts(&self) -> Result<Vec<Chart>> {
        let mut charts = Vec::new();
        collect_charts(self.base_dir.join(CHARTS_SUBDIR).as_path(), &mut charts)?;
        charts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(charts)
    }
}

fn collect_charts(dir: &Path, charts: &mut Vec<Chart>) -> Result<()> {
    if dir.join(CHART_FILE).is_file() {
        charts.push(load_chart(dir)?);
        return Ok(());
    }

    let mut entries = fs::read_dir(dir)
        .and_then(|entries| {
            entries
                .map(|res| res.map(|e| e.path()))
                .collect::<Result<Vec<_>, std::io::Error>>()
        })
        .context(ReadingDirectoryContents { path: dir })?;
    entries.sort();

    for entry in entries.iter().filter(|entry| entry.is_dir()) {
        collect_charts(entry, charts)?;
    }
    Ok(())
}

fn load_chart(dir: &Path) -> Result<Chart> {
    let filepath = dir.join(CHART_FILE);
    trace!(chart = %filepath.display(), "Loading Helm chart");

    let buf = fs::read(filepath.as_path()).context(ReadingFile {
        filepath: filepath.as_path(),
    })?;
    let metadata: ChartMetadata =
        serde_yaml::from_slice(buf.as_slice()).context(ChartYamlParse { filepath })?;

    Ok(Chart {
        name: metadata.name,
        version: metadata.version,
        description: metadata.description,
        path: dir.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::ChartFS;
    use crate::error::Error;
    use std::{fs, path::Path};
    use tempfile::TempDir;

    fn write_chart(base: &Path, dir: &str, name: &str, version: &str) {
        let dir = base.join(dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("Chart.yaml"),
            format!("apiVersion: v2\nname: {name}\nversion: {version}\n"),
        )
        .unwrap();
    }

    #[test]
    fn test_walk_charts() {
        let tmp = TempDir::new().unwrap();
        write_chart(tmp.path(), "charts/tssc-subscriptions", "tssc-subscriptions", "0.1.0");
        write_chart(tmp.path(), "charts/nested/tssc-dh", "tssc-dh", "1.2.3");
        // Sub-charts belong to their parent chart.
        write_chart(tmp.path(), "charts/tssc-dh-deps/charts/inner", "inner", "0.0.1");
        write_chart(tmp.path(), "charts/tssc-dh-deps", "tssc-dh-deps", "1.0.0");
        fs::create_dir_all(tmp.path().join("charts/empty")).unwrap();

        let chart_fs = ChartFS::new(tmp.path());
        let names: Vec<String> = chart_fs
            .walk_charts()
            .unwrap()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, vec!["tssc-dh", "tssc-dh-deps", "tssc-subscriptions"]);

        let chart = chart_fs.get_chart("tssc-dh").unwrap();
        assert_eq!(chart.version().to_string(), "1.2.3");
        assert_eq!(chart.path(), tmp.path().join("charts/nested/tssc-dh"));
        assert_eq!(chart_fs.chart_at("charts/nested/tssc-dh").unwrap(), chart);

        assert!(matches!(
            chart_fs.get_chart("inner"),
            Err(Error::ChartNotFound { .. })
        ));
    }

    #[test]
    fn test_read_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.yaml"), "installer: {}\n").unwrap();

        let chart_fs = ChartFS::new(tmp.path());
        assert_eq!(chart_fs.read_file("config.yaml").unwrap(), b"installer: {}\n");
        assert!(matches!(
            chart_fs.read_file("values.yaml"),
            Err(Error::ReadingFile { filepath, .. }) if filepath == tmp.path().join("values.yaml")
        ));
    }

    #[test]
    fn test_invalid_charts() {
        let tmp = TempDir::new().unwrap();
        let chart_fs = ChartFS::new(tmp.path());
        assert!(matches!(
            chart_fs.walk_charts(),
            Err(Error::ReadingDirectoryContents { .. })
        ));

        write_chart(tmp.path(), "charts/broken", "broken", "not-a-version");
        assert!(matches!(
            chart_fs.walk_charts(),
            Err(Error::ChartYamlParse { .. })
        ));
    }
}
