use std::path::Path;

use crate::error::Result;
use crate::exam::Exam;

#[derive(Clone, Copy, Debug, Default)]
pub struct DumpOpts {
    pub pretty: bool,
}

impl DumpOpts {
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

/// Loads the archive at `path` and renders its content record as it would be
/// saved, except that ids and display numbers are left as found.
pub fn dump_file_json(path: &Path, opts: DumpOpts) -> Result<String> {
    let exam = Exam::load(path)?;
    let value = exam.export()?;
    let s = if opts.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    Ok(s)
}
