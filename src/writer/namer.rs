//! Output file naming for per-country extracts

use std::path::PathBuf;

/// Identity of one written run of rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupKey<'a> {
    /// Source area code of the run. The default namer ignores it since run
    /// numbering is per ISO3; custom namers can use it to keep codes apart.
    pub country_code: &'a str,
    pub iso3: &'a str,
    /// Zero for the first run of an ISO3 code, incremented for each later run
    pub run_index: usize,
}

/// Chooses the file path an extract is written to
pub trait OutputNamer {
    fn path_for(&self, key: &GroupKey<'_>) -> PathBuf;
}

impl<F> OutputNamer for F
where
    F: Fn(&GroupKey<'_>) -> PathBuf,
{
    fn path_for(&self, key: &GroupKey<'_>) -> PathBuf {
        self(key)
    }
}

/// Names files `<dir>/<prefix>_<ISO3>.csv`, with `_<n>` appended for repeated runs
#[derive(Debug, Clone)]
pub struct TemplateNamer {
    dir: PathBuf,
    prefix: String,
}

impl TemplateNamer {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }
}

impl OutputNamer for TemplateNamer {
    fn path_for(&self, key: &GroupKey<'_>) -> PathBuf {
        let stem = if self.prefix.is_empty() {
            key.iso3.to_string()
        } else {
            format!("{}_{}", self.prefix, key.iso3)
        };
        let name = match key.run_index {
            0 => format!("{}.csv", stem),
            n => format!("{}_{}.csv", stem, n + 1),
        };
        self.dir.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_namer() {
        let namer = TemplateNamer::new("/out", "Prices");
        let key = GroupKey {
            country_code: "2",
            iso3: "AFG",
            run_index: 0,
        };
        assert_eq!(namer.path_for(&key), PathBuf::from("/out/Prices_AFG.csv"));
        let key = GroupKey { run_index: 1, ..key };
        assert_eq!(namer.path_for(&key), PathBuf::from("/out/Prices_AFG_2.csv"));
        assert_eq!(
            TemplateNamer::new("/out", "").path_for(&key),
            PathBuf::from("/out/AFG_2.csv")
        );
    }
}
