use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use crate::CliError;

/// Write generated text to `out`, or to stdout when no path was given.
pub fn emit(out: Option<&Path>, text: &str) -> Result<(), CliError> {
    match out {
        Some(path) => replace_file(path, text.as_bytes()),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}

/// Stage `data` in a hidden sibling of `path`, then rename it over `path`.
///
/// The output file either keeps its old content or holds all of `data`.
pub fn replace_file(path: &Path, data: &[u8]) -> Result<(), CliError> {
    let name = path.file_name().ok_or_else(|| {
        CliError::InvalidConfig(format!("output path has no file name: {}", path.display()))
    })?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let staging = dir.join(format!(
        ".{}.{}.partial",
        name.to_string_lossy(),
        std::process::id()
    ));
    let staged = File::create(&staging).and_then(|mut file| {
        file.write_all(data)?;
        file.sync_all()
    });
    if let Err(err) = staged.and_then(|()| fs::rename(&staging, path)) {
        let _ = fs::remove_file(&staging);
        return Err(err.into());
    }

    File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TempDir;

    #[test]
    fn replaces_existing_file_and_creates_parents() {
        let dir = TempDir::new("out");
        let path = dir.join("nested").join("schema.sql");

        replace_file(&path, b"drop table A;\n").expect("first write");
        replace_file(&path, b"drop table B;\n").expect("second write");

        assert_eq!(
            fs::read_to_string(&path).expect("read output"),
            "drop table B;\n"
        );
        let entries = fs::read_dir(dir.join("nested"))
            .expect("list output dir")
            .count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn rejects_paths_without_a_file_name() {
        assert!(matches!(
            replace_file(Path::new("/"), b""),
            Err(CliError::InvalidConfig(_))
        ));
    }
}
