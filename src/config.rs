//! Template-bundle configuration and CLI merge.
//!
//! A template bundle is a directory of optional resources plus a
//! `template.toml` carrying `[metadata]` and `[options]` defaults. The
//! `--template` argument names either the bundle directory, the config file
//! itself, or a bare bundle name resolved under `templates/` next to the
//! executable. Command-line arguments always win over the config file.

use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::metadata::Metadata;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The `template.toml` schema. Every field is optional; a bundle with no
/// config file at all is valid.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub metadata: MetadataSection,
    pub options: OptionsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MetadataSection {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub project: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OptionsSection {
    pub cover_page: Option<bool>,
    pub heading_numbers: Option<bool>,
    pub strip_internal_info: Option<bool>,
    pub table_of_contents: Option<bool>,
}

/// Which pipeline steps run. All default to on.
#[derive(Clone, Debug)]
pub struct Flags {
    pub cover_page: bool,
    pub heading_numbers: bool,
    pub strip_internal_info: bool,
    pub table_of_contents: bool,
}

/// The fully resolved settings for one run.
#[derive(Debug)]
pub struct Settings {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub resource_dir: Option<PathBuf>,
    pub metadata: Metadata,
    pub flags: Flags,
}

impl Settings {
    /// Merge the CLI arguments with the template bundle's config file.
    pub fn resolve(cli: &Cli) -> Result<Settings> {
        let bundle = match &cli.template {
            Some(template) => Some(locate_bundle(template, &builtin_templates_dir())?),
            None => None,
        };

        let file = match bundle.as_ref().and_then(|b| b.config.as_deref()) {
            Some(path) => load(path)?,
            None => ConfigFile::default(),
        };

        let pick = |cli_value: &Option<String>, file_value: &Option<String>| {
            cli_value
                .clone()
                .or_else(|| file_value.clone())
                .unwrap_or_default()
        };
        let metadata = Metadata {
            title: pick(&cli.title, &file.metadata.title),
            subtitle: pick(&cli.subtitle, &file.metadata.subtitle),
            project: pick(&cli.project, &file.metadata.project),
            author: pick(&cli.author, &file.metadata.author),
            date: pick(&cli.date, &file.metadata.date),
        };

        let enabled = |disabled_on_cli: bool, file_value: Option<bool>| {
            !disabled_on_cli && file_value.unwrap_or(true)
        };
        let flags = Flags {
            cover_page: enabled(cli.no_cover_page, file.options.cover_page),
            heading_numbers: enabled(cli.no_heading_numbers, file.options.heading_numbers),
            strip_internal_info: enabled(
                cli.no_strip_internal_info,
                file.options.strip_internal_info,
            ),
            table_of_contents: enabled(cli.no_table_of_contents, file.options.table_of_contents),
        };

        Ok(Settings {
            input: cli.input.clone(),
            output: cli.output.clone(),
            resource_dir: bundle.map(|b| b.dir),
            metadata,
            flags,
        })
    }
}

#[derive(Debug)]
struct Bundle {
    dir: PathBuf,
    config: Option<PathBuf>,
}

/// Resolve the `--template` argument to a bundle directory and its config
/// file: a config file directly, a bundle directory (config optional inside),
/// or a bare name under `fallback_dir`.
fn locate_bundle(template: &Path, fallback_dir: &Path) -> Result<Bundle> {
    if template.is_file() {
        let dir = template
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        return Ok(Bundle {
            dir,
            config: Some(template.to_path_buf()),
        });
    }

    let dir = if template.is_dir() {
        template.to_path_buf()
    } else {
        let bundled = fallback_dir.join(template);
        if !bundled.is_dir() {
            return Err(Error::InvalidInput(format!(
                "template {} not found",
                template.display()
            )));
        }
        log::debug!("using bundled template {}", bundled.display());
        bundled
    };

    let config = dir.join("template.toml");
    Ok(Bundle {
        config: config.is_file().then_some(config),
        dir,
    })
}

/// The `templates/` directory shipped next to the executable.
fn builtin_templates_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("templates")
}

fn load(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)?;
    toml::from_str(&contents)
        .map_err(|e| Error::InvalidInput(format!("bad config file {}: {}", path.display(), e)))
}
