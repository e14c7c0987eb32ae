/// A read-only, memory-mapped view of a file on disk.
///
/// Used only for the *initial* load of a document: the bytes are copied
/// once into the gap buffer's own allocation, after which this mapping can
/// be dropped. Mapping first avoids reading the whole file through a
/// buffered reader just to immediately copy it again.
#[derive(Debug)]
pub struct MmapFile {
    _file: std::fs::File,
    mmap: Option<memmap2::Mmap>,
    path: std::path::PathBuf,
}

impl MmapFile {
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or mapped.
    pub fn open(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let file = std::fs::File::open(&path_buf)?;
        let len = file.metadata()?.len();

        // mmap of a zero-length file is an error on some platforms; there is
        // nothing to map anyway.
        let mmap = if len == 0 {
            None
        } else {
            // SAFETY: the file is opened read-only and not modified by us for
            // the lifetime of this mapping; callers only observe `&[u8]`.
            Some(unsafe { memmap2::Mmap::map(&file)? })
        };

        Ok(Self {
            _file: file,
            mmap,
            path: path_buf,
        })
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

/// Writes `chunks` to `path` atomically: a sibling temp file is written,
/// flushed, and renamed over the target. The temp file must live in the
/// same directory as `path` for the rename to be atomic across filesystems.
///
/// # Errors
///
/// Returns an error if the temp file cannot be created or written, or if
/// the rename fails.
pub fn write_atomic(
    path: &std::path::Path,
    chunks: impl Iterator<Item = impl AsRef<[u8]>>,
) -> std::io::Result<()> {
    use std::io::Write;

    let parent = path.parent().unwrap_or_else(|| std::path::Path::new("."));
    let mut tmp = tempfile::Builder::new()
        .prefix(".save_tmp_")
        .tempfile_in(parent)?;

    for chunk in chunks {
        tmp.write_all(chunk.as_ref())?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn open_reads_contents() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"hello from disk").unwrap();
        tmp.as_file().sync_all().unwrap();

        let mapped = MmapFile::open(tmp.path()).unwrap();
        assert_eq!(mapped.as_slice(), b"hello from disk");
        assert_eq!(mapped.len(), 15);
    }

    #[test]
    fn open_empty_file_is_empty_slice() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let mapped = MmapFile::open(tmp.path()).unwrap();
        assert!(mapped.is_empty());
        assert_eq!(mapped.as_slice(), b"");
    }

    #[test]
    fn write_atomic_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, b"old").unwrap();

        write_atomic(&path, [b"new ".as_slice(), b"contents".as_slice()].into_iter()).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"new contents");
    }
}
