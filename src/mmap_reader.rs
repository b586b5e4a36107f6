use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Read-only view of an uploaded file. Empty files are not mapped.
pub struct MmapFileReader {
    _file: File,
    mmap: Option<Mmap>,
}

impl MmapFileReader {
    pub fn new<P: AsRef<Path>>(file_path: P) -> std::io::Result<Self> {
        let file = File::open(file_path)?;
        let mmap = if file.metadata()?.len() == 0 {
            None
        } else {
            // The file is only read, and lives as long as the mapping.
            Some(unsafe { Mmap::map(&file)? })
        };

        Ok(MmapFileReader { _file: file, mmap })
    }

    pub fn as_slice(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}
