//! The external HTML-to-pages rendering capability.
//!
//! The composer only needs one operation: turn an HTML file into a PDF file.
//! Production uses a headless Chromium; tests swap in a fake that writes
//! blank documents and records what it was asked to render.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Renders one HTML file into one PDF file.
pub trait PageRenderer {
    fn render(&self, html: &Path, output: &Path) -> Result<()>;
}

/// Headless Chromium/Chrome driving `--print-to-pdf`.
///
/// CSS page geometry is honoured (`@page` rules in the injected stylesheets
/// control size and margins); the browser's own header/footer bars are
/// disabled since the underlay template replaces them.
pub struct ChromiumRenderer {
    binary: PathBuf,
}

impl ChromiumRenderer {
    /// Locate a usable browser binary: `$BROWSER` if set, else well-known
    /// names on `$PATH`.
    pub fn discover() -> Result<ChromiumRenderer> {
        Self::discover_from(std::env::var_os("BROWSER"), std::env::var_os("PATH"))
    }

    fn discover_from(
        browser: Option<std::ffi::OsString>,
        path: Option<std::ffi::OsString>,
    ) -> Result<ChromiumRenderer> {
        if let Some(binary) = browser {
            return Ok(ChromiumRenderer {
                binary: PathBuf::from(binary),
            });
        }

        const CANDIDATES: &[&str] = &[
            "chromium",
            "chromium-browser",
            "google-chrome",
            "google-chrome-stable",
            "chrome",
        ];
        for candidate in CANDIDATES {
            if let Some(binary) = find_in_path(path.as_deref(), candidate) {
                log::debug!("using browser {}", binary.display());
                return Ok(ChromiumRenderer { binary });
            }
        }

        Err(Error::RendererUnavailable(
            "no Chromium/Chrome binary found; install one or set $BROWSER".to_string(),
        ))
    }
}

impl PageRenderer for ChromiumRenderer {
    fn render(&self, html: &Path, output: &Path) -> Result<()> {
        let url = format!("file://{}", html.display());
        log::debug!("rendering {} -> {}", url, output.display());

        let result = Command::new(&self.binary)
            .arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-pdf-header-footer")
            .arg(format!("--print-to-pdf={}", output.display()))
            .arg(&url)
            .output()
            .map_err(|e| Error::Render {
                input: html.to_path_buf(),
                message: format!("failed to launch {}: {}", self.binary.display(), e),
            })?;

        if !result.status.success() {
            return Err(Error::Render {
                input: html.to_path_buf(),
                message: String::from_utf8_lossy(&result.stderr).into_owned(),
            });
        }
        if !output.is_file() {
            return Err(Error::Render {
                input: html.to_path_buf(),
                message: "browser exited cleanly but produced no PDF".to_string(),
            });
        }
        Ok(())
    }
}

fn find_in_path(path: Option<&std::ffi::OsStr>, name: &str) -> Option<PathBuf> {
    std::env::split_paths(path?)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}


/// Test renderer: writes blank single-page documents and keeps the HTML it
/// was given, so tests can assert on per-page substitutions.
#[cfg(test)]
pub struct FakeRenderer {
    pub rendered: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl FakeRenderer {
    pub fn new() -> FakeRenderer {
        FakeRenderer {
            rendered: std::cell::RefCell::new(Vec::new()),
        }
    }
}

#[cfg(test)]
impl PageRenderer for FakeRenderer {
    fn render(&self, html: &Path, output: &Path) -> Result<()> {
        let contents = std::fs::read_to_string(html)?;
        self.rendered.borrow_mut().push(contents);
        let mut blank = super::artifact::blank_document(1);
        blank.save(output)?;
        Ok(())
    }
}
