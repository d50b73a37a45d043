//! Staging of the exported input into the working directory.
//!
//! Accepts either the ZIP archive Notion produces or the bare HTML file from
//! an unpacked export. Either way the working directory ends up holding
//! exactly one top-level HTML file plus whatever asset directory came with
//! it; zero or several HTML files is a hard error.

use crate::error::{Error, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Extract or copy the export into `workdir` and return the path of its
/// single HTML file.
pub fn stage(input: &Path, workdir: &Path) -> Result<PathBuf> {
    let extension = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();

    if extension.eq_ignore_ascii_case("zip") {
        log::debug!("extracting {} to {}", input.display(), workdir.display());
        let file = File::open(input)?;
        let mut archive = ZipArchive::new(file)?;
        archive.extract(workdir)?;
    } else if extension.eq_ignore_ascii_case("html") {
        log::debug!("copying {} to {}", input.display(), workdir.display());
        let file_name = input
            .file_name()
            .ok_or_else(|| Error::InvalidInput(format!("bad input path {}", input.display())))?;
        std::fs::copy(input, workdir.join(file_name))?;

        // Notion puts page assets in a directory named like the HTML file
        let assets = input.with_extension("");
        if assets.is_dir() {
            let target = workdir.join(assets.file_name().unwrap_or_default());
            copy_dir(&assets, &target)?;
        }
    } else {
        return Err(Error::InvalidInput(format!(
            "unsupported input file format: {}",
            input.display()
        )));
    }

    find_single_html(workdir)
}

/// The one top-level HTML file in `dir`.
fn find_single_html(dir: &Path) -> Result<PathBuf> {
    let mut html_files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_html = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html"));
        if path.is_file() && is_html {
            html_files.push(path);
        }
    }

    match html_files.len() {
        1 => Ok(html_files.remove(0)),
        n => Err(Error::InvalidInput(format!(
            "expected exactly one HTML file in the export, found {}",
            n
        ))),
    }
}

fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    std::fs::create_dir_all(to)?;
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    fn write_zip(path: &Path, files: &[(&str, &str)]) {
        let file = File::create(path).expect("can create zip");
        let mut writer = ZipWriter::new(file);
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, contents) in files {
            writer.start_file(*name, options).expect("can start file");
            writer
                .write_all(contents.as_bytes())
                .expect("can write file");
        }
        writer.finish().expect("can finish zip");
    }

    #[test]
    fn stages_an_archive_with_one_html_file() {
        let dir = tempfile::tempdir().expect("can create tempdir");
        let work = tempfile::tempdir().expect("can create workdir");
        let archive = dir.path().join("export.zip");
        write_zip(&archive, &[("Report.html", "<html></html>")]);

        let staged = stage(&archive, work.path()).expect("staging succeeds");
        assert_eq!(staged.file_name().unwrap(), "Report.html");
        assert!(staged.is_file());
    }

    #[test]
    fn rejects_an_archive_with_multiple_html_files() {
        let dir = tempfile::tempdir().expect("can create tempdir");
        let work = tempfile::tempdir().expect("can create workdir");
        let archive = dir.path().join("export.zip");
        write_zip(
            &archive,
            &[("a.html", "<html></html>"), ("b.html", "<html></html>")],
        );

        let err = stage(&archive, work.path()).expect_err("must reject");
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn rejects_an_archive_with_no_html_file() {
        let dir = tempfile::tempdir().expect("can create tempdir");
        let work = tempfile::tempdir().expect("can create workdir");
        let archive = dir.path().join("export.zip");
        write_zip(&archive, &[("notes.txt", "hello")]);

        let err = stage(&archive, work.path()).expect_err("must reject");
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn stages_a_bare_html_file_with_its_asset_directory() {
        let dir = tempfile::tempdir().expect("can create tempdir");
        let work = tempfile::tempdir().expect("can create workdir");
        let html = dir.path().join("Report.html");
        std::fs::write(&html, "<html></html>").expect("can write html");
        let assets = dir.path().join("Report");
        std::fs::create_dir(&assets).expect("can create assets dir");
        std::fs::write(assets.join("image.png"), b"png").expect("can write asset");

        let staged = stage(&html, work.path()).expect("staging succeeds");
        assert_eq!(staged.file_name().unwrap(), "Report.html");
        assert!(work.path().join("Report/image.png").is_file());
    }

    #[test]
    fn rejects_unsupported_extensions() {
        let dir = tempfile::tempdir().expect("can create tempdir");
        let work = tempfile::tempdir().expect("can create workdir");
        let input = dir.path().join("export.docx");
        std::fs::write(&input, b"nope").expect("can write file");

        let err = stage(&input, work.path()).expect_err("must reject");
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
