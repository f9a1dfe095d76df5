use clap::Parser;
use std::path::{Path, PathBuf};

use crate::zar::ZarError;

#[derive(Parser, Debug)]
#[command(name = "unzar")]
#[command(version)]
#[command(about = "Extract files from Zip-Archiv (ZAR) archives", long_about = None)]
#[command(after_help = "Examples:\n  \
  unzar -e INSTALL.ZAR            extract all files into the current directory\n  \
  unzar -e INSTALL.ZAR -d out     extract all files into ./out (must exist)\n  \
  unzar -e INSTALL.ZAR -l         list archive contents")]
pub struct Cli {
    /// The ZAR file to extract
    #[arg(short = 'e', value_name = "FILE")]
    pub archive: Option<PathBuf>,

    /// Optional output directory to extract to
    #[arg(short = 'd', value_name = "DIR")]
    pub extract_dir: Option<PathBuf>,

    /// List files instead of extracting them
    #[arg(short = 'l')]
    pub list: bool,

    /// Quiet mode, no progress messages
    #[arg(short = 'q')]
    pub quiet: bool,
}

impl Cli {
    /// The destination directory, checked to exist before anything is parsed
    pub fn destination(&self) -> Result<Option<&Path>, ZarError> {
        match self.extract_dir.as_deref() {
            Some(dir) if !dir.is_dir() => Err(ZarError::DestinationMissing {
                path: dir.to_path_buf(),
            }),
            dir => Ok(dir),
        }
    }
}
