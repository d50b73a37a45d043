use clap::Parser;
use std::path::PathBuf;

/// Turns a Notion wiki export into a styled, paginated PDF
#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Cli {
    /// The exported page: a Notion .zip export or a bare .html file
    pub input: PathBuf,

    /// Template bundle: a directory containing template.toml and the bundle
    /// resources, or the config file itself. A bare name is looked up under
    /// the templates/ directory next to the executable.
    #[clap(short, long)]
    pub template: Option<PathBuf>,

    /// Where to write the PDF; defaults to the document title next to the input
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    /// Document title; defaults to the exported page's own heading
    #[clap(long)]
    pub title: Option<String>,

    /// Document subtitle, shown by templates that use it
    #[clap(long)]
    pub subtitle: Option<String>,

    /// Project name; also prefixes the default output filename
    #[clap(long)]
    pub project: Option<String>,

    /// Document author, stamped into the PDF metadata
    #[clap(long)]
    pub author: Option<String>,

    /// Date string passed to templates verbatim
    #[clap(long)]
    pub date: Option<String>,

    /// Don't build a cover page even when the bundle provides one
    #[clap(long)]
    pub no_cover_page: bool,

    /// Don't number headings or rebuild the PDF outline
    #[clap(long)]
    pub no_heading_numbers: bool,

    /// Keep internal callouts and database property tables
    #[clap(long)]
    pub no_strip_internal_info: bool,

    /// Drop the table of contents instead of relocating it
    #[clap(long)]
    pub no_table_of_contents: bool,
}
