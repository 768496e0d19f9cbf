use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

/// Position of the next address to check, stored next to the output as
/// `<output>.cursor`. An explicit index keeps resumption unambiguous when the
/// same address appears several times in the input.
pub struct Cursor {
    path: PathBuf,
}

impl Cursor {
    pub fn for_output(output: &Path) -> Self {
        let mut name = output.as_os_str().to_os_string();
        name.push(".cursor");
        Self {
            path: PathBuf::from(name),
        }
    }

    pub fn load(&self) -> Result<usize> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("corrupt cursor file {}", self.path.display())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(err) => {
                Err(err).with_context(|| format!("read cursor {}", self.path.display()))
            }
        }
    }

    pub fn store(&self, next: usize) -> Result<()> {
        write_all_atomically(&self.path, format!("{next}\n").as_bytes())
            .with_context(|| format!("write cursor {}", self.path.display()))
    }
}

/// Non-empty, trimmed lines of `input`.
pub fn read_addresses(input: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(input)
        .with_context(|| format!("read input {}", input.display()))?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub checked: usize,
    pub accepted: usize,
}

/// Check `addresses[start..]` in order. Every accepted address is appended to
/// `output` before the cursor moves past it, so a crash loses no result.
pub fn run_batch<F, W>(
    addresses: &[String],
    start: usize,
    output: &Path,
    cursor: &Cursor,
    mut verify: F,
    progress: &mut W,
) -> Result<BatchSummary>
where
    F: FnMut(&str) -> bool,
    W: Write,
{
    let start = start.min(addresses.len());
    if start > 0 {
        info!(start, total = addresses.len(), "resuming batch");
    }
    let pending = &addresses[start..];
    let mut summary = BatchSummary::default();

    for (offset, email) in pending.iter().enumerate() {
        writeln!(progress, "{}/{} Checking: {email}", offset + 1, pending.len())?;
        if verify(email) {
            append_line(output, email)?;
            writeln!(progress, "{email} -> valid")?;
            summary.accepted += 1;
        } else {
            writeln!(progress, "{email} -> invalid or uncertain")?;
        }
        summary.checked += 1;
        cursor.store(start + offset + 1)?;
    }

    if pending.is_empty() {
        warn!(output = %output.display(), "nothing left to check");
    }
    Ok(summary)
}

fn append_line(path: &Path, line: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open output {}", path.display()))?;
    writeln!(file, "{line}")?;
    file.flush()?;
    Ok(())
}

fn write_all_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}
