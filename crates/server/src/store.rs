//! Append-only submission log.
//!
//! A single UTF-8 text file, one record per line. The open append handle
//! lives behind a mutex so concurrent submissions cannot interleave bytes
//! within a line. The file is created lazily on the first append; reads go
//! straight to disk on every request.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub struct SubmissionLog {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl SubmissionLog {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            file: Mutex::new(None),
        }
    }

    /// Append one formatted line. Exactly one write per successful call.
    pub fn append_line(&self, line: &str) -> io::Result<()> {
        let mut guard = self.file.lock().expect("submission log lock poisoned");

        if guard.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            *guard = Some(file);
        }

        let file = guard.as_mut().expect("append handle just initialized");
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
        file.flush()
    }

    /// Full contents of the log, or `None` when nothing has been recorded.
    pub fn read_all(&self) -> io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_created_on_first_append_only() {
        let dir = tempdir().expect("tempdir");
        let log = SubmissionLog::new(dir.path().join("submissions.txt"));

        assert!(!log.path().exists());
        assert_eq!(log.read_all().expect("read"), None);

        log.append_line("first").expect("append");
        assert!(log.path().exists());
    }

    #[test]
    fn appends_accumulate_one_line_per_record() {
        let dir = tempdir().expect("tempdir");
        let log = SubmissionLog::new(dir.path().join("submissions.txt"));

        log.append_line("alpha").expect("append");
        log.append_line("beta").expect("append");

        let contents = log.read_all().expect("read").expect("file exists");
        assert_eq!(contents, "alpha\nbeta\n");
    }

    #[test]
    fn read_does_not_create_the_file() {
        let dir = tempdir().expect("tempdir");
        let log = SubmissionLog::new(dir.path().join("submissions.txt"));

        assert_eq!(log.read_all().expect("read"), None);
        assert!(!log.path().exists());
    }
}
