use crate::error::{Error, ErrorRepr};
use crate::{Config, Entropy, Generator, Nesting};
use log::{debug, info};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes numbered test-case files into a directory.
///
/// Files are named by a 1-based index zero-padded to `width` digits, e.g.
/// `data/0001.in`. Indices too large for the width are written in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    dir: PathBuf,
    width: usize,
    extension: String,
}

impl Corpus {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            width: 4,
            extension: String::from("in"),
        }
    }

    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the `index`th test case.
    pub fn path(&self, index: u32) -> PathBuf {
        let mut name = format!("{:0width$}", index, width = self.width);
        if !self.extension.is_empty() {
            name.push('.');
            name.push_str(&self.extension);
        }
        self.dir.join(name)
    }

    /// Generates `config.testcases` cases and writes each to its own file.
    ///
    /// Every file is flushed and closed before the next case is generated.
    /// Returns the written paths in order.
    pub fn write<E: Entropy>(&self, config: &Config, entropy: E) -> Result<Vec<PathBuf>, Error> {
        fs::create_dir_all(&self.dir).map_err(|source| io_error(&self.dir, source))?;
        info!(
            "writing {} test cases to {} (max depth {})",
            config.testcases,
            self.dir.display(),
            config.max_depth
        );

        let mut generator = Generator::new(config, entropy);
        let mut written = Vec::with_capacity(config.testcases as usize);
        for index in 1..=config.testcases {
            let path = self.path(index);
            let (text, id, nesting): (Vec<u8>, u64, Nesting) = generator.case();
            debug!(
                "{}: {} bytes, shape {:016x}, nesting {}",
                path.display(),
                text.len(),
                id,
                nesting.max()
            );
            write_file(&path, &text)?;
            written.push(path);
        }
        Ok(written)
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), Error> {
    let file = File::create(path).map_err(|source| io_error(path, source))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(contents)
        .and_then(|()| writer.flush())
        .map_err(|source| io_error(path, source))
}

fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error(ErrorRepr::Io {
        path: path.to_path_buf(),
        source,
    })
}
