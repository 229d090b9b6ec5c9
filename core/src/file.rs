use std::{
    fmt::Debug,
    fs,
    io::{self, BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

/// Where descriptors and tile payloads are read from and written to.
pub trait FileSystem: Debug {
    type File: Read;
    type Writer: Write;

    fn read(&self, path: &Path) -> io::Result<Self::File>;

    /// Creates (or truncates) a file, creating missing parent directories.
    fn create(&self, path: &Path) -> io::Result<Self::Writer>;

    fn file_path(&self, directory: &Path, file_name: &str) -> PathBuf;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct OsFs;

impl FileSystem for OsFs {
    type File = BufReader<fs::File>;
    type Writer = BufWriter<fs::File>;

    fn read(&self, path: &Path) -> io::Result<Self::File> {
        fs::File::open(path).map(BufReader::new)
    }

    fn create(&self, path: &Path) -> io::Result<Self::Writer> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::File::create(path).map(BufWriter::new)
    }

    fn file_path(&self, directory: &Path, file_name: &str) -> PathBuf {
        directory.join(file_name)
    }
}
