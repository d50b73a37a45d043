//! The run orchestrator: staging, document transforms, render, merges, save.
//!
//! Every step is conditional on the resolved flags and on the presence of the
//! template bundle resource it needs; skipped steps announce themselves so a
//! half-configured bundle is visible at a glance instead of failing the run.

use crate::config::Settings;
use crate::document::NotionDocument;
use crate::error::Error;
use crate::metadata::Metadata;
use crate::pdf::renderer::PageRenderer;
use crate::pdf::{Composer, PAGE_NUMBER_TOKEN};
use crate::resources::Resources;
use crate::{input, templating};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Run the whole pipeline and return the path of the written PDF.
pub fn run<R: PageRenderer>(settings: &Settings, renderer: &R) -> Result<PathBuf> {
    let resources = Resources::new(settings.resource_dir.clone());
    let workdir = tempfile::tempdir().context("Failed to create working directory")?;

    let staged = input::stage(&settings.input, workdir.path())
        .with_context(|| format!("Failed to stage {}", settings.input.display()))?;
    let markup = std::fs::read_to_string(&staged)
        .with_context(|| format!("Failed to read {}", staged.display()))?;
    let mut document =
        NotionDocument::parse(&markup).context("Failed to parse the exported page")?;

    let mut metadata = settings.metadata.clone();
    if metadata.title.is_empty() {
        metadata.title = document.title().unwrap_or_default();
    }
    if metadata.title.is_empty() {
        return Err(Error::InvalidInput(
            "no title given and the document has none".to_string(),
        )
        .into());
    }

    // decided once; the header removal below and the cover merge later must agree
    let has_cover = settings.flags.cover_page
        && (resources.has("cover.html") || resources.has("cover.pdf"));
    status(has_cover, "cover page");

    transform(&mut document, &resources, settings, &metadata, has_cover)?;
    let anchors = if settings.flags.heading_numbers {
        status(true, "heading numbers");
        Some(document.number_headings())
    } else {
        status(false, "heading numbers");
        None
    };
    document.relocate_toc(settings.flags.table_of_contents);
    status(settings.flags.table_of_contents, "table of contents");

    let html_path = workdir.path().join("updated_doc.html");
    std::fs::write(&html_path, document.serialize()?)
        .context("Failed to write the transformed document")?;

    let mut composer = Composer::new(renderer, workdir.path());
    composer
        .render(&html_path)
        .context("Failed to render the document")?;
    log::info!("rendered {} pages", composer.page_count());

    merge(&mut composer, &resources, &metadata, has_cover)?;
    composer.delete_stale_links()?;
    if let Some(anchors) = &anchors {
        if !anchors.is_empty() {
            composer.rebuild_outline(anchors);
        }
    }
    composer.set_metadata(&metadata);

    let output = output_path(settings, &metadata);
    composer
        .save(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(output)
}

/// The pre-render document rewrites.
fn transform(
    document: &mut NotionDocument,
    resources: &Resources,
    settings: &Settings,
    metadata: &Metadata,
    has_cover: bool,
) -> Result<()> {
    for name in ["page.css", "overwrites.css"] {
        match resources.read(name) {
            Some(css) => {
                status(true, name);
                document.inject_css(&css);
            }
            None => status(false, name),
        }
    }

    status(settings.flags.strip_internal_info, "internal info removal");
    if settings.flags.strip_internal_info {
        document.strip_internal_callouts();
        document.strip_header_tables();
    }

    if has_cover {
        document.remove_header();
    } else if let Some(template) = resources.read("header.html") {
        status(true, "header.html");
        let block = templating::render("header.html", &template, metadata, &[])?;
        document.inject_title_block(&block);
    } else {
        status(false, "header.html");
    }
    Ok(())
}

/// The post-render artifact merges, in their fixed order.
fn merge<R: PageRenderer>(
    composer: &mut Composer<R>,
    resources: &Resources,
    metadata: &Metadata,
    has_cover: bool,
) -> Result<()> {
    let underlay = resources
        .read("background.html")
        .or_else(|| resources.read("footer.html"));
    match underlay {
        Some(template) => {
            status(true, "page underlay");
            let template = with_page_css(template, resources);
            let html = templating::render(
                "background.html",
                &template,
                metadata,
                &[
                    ("pageNumber", PAGE_NUMBER_TOKEN),
                    // empty string so `{% if hasCoverPage %}` is falsy without a cover
                    ("hasCoverPage", if has_cover { "true" } else { "" }),
                ],
            )?;
            composer.merge_underlay(&html)?;
        }
        None => status(false, "page underlay"),
    }

    match resources.path("background.pdf") {
        Some(background) => {
            status(true, "background.pdf");
            composer.merge_background(&background)?;
        }
        None => status(false, "background.pdf"),
    }

    if has_cover {
        let cover_html = match resources.read("cover.html") {
            Some(template) => {
                let template = with_page_css(template, resources);
                Some(templating::render("cover.html", &template, metadata, &[])?)
            }
            None => None,
        };
        composer.prepend_cover(resources.path("cover.pdf").as_deref(), cover_html.as_deref())?;
    }
    Ok(())
}

/// Standalone snippets (underlay, cover) are rendered outside the document,
/// so the bundle's page geometry must ride along.
fn with_page_css(template: String, resources: &Resources) -> String {
    match resources.read("page.css") {
        Some(css) => templating::add_css(&template, &css),
        None => template,
    }
}

fn output_path(settings: &Settings, metadata: &Metadata) -> PathBuf {
    match &settings.output {
        Some(output) => output.clone(),
        None => settings
            .input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .join(metadata.output_filename()),
    }
}

fn status(enabled: bool, what: &str) {
    if enabled {
        println!("{} {}", console::style("[PROC]").green(), what);
    } else {
        println!("{} {}", console::style("[SKIP]").yellow(), what);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Flags;
    use crate::pdf::renderer::FakeRenderer;
    use std::fs::File;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    const EXPORT: &str = r#"<html><head><title>t</title></head><body>
        <header><h1>Report</h1></header>
        <div class="page-body"><h1 id="intro">Intro</h1><p>hello</p></div>
    </body></html>"#;

    fn settings(input: PathBuf) -> Settings {
        Settings {
            input,
            output: None,
            resource_dir: None,
            metadata: Metadata::default(),
            flags: Flags {
                cover_page: true,
                heading_numbers: true,
                strip_internal_info: true,
                table_of_contents: true,
            },
        }
    }

    #[test]
    fn an_archive_becomes_a_pdf_named_after_its_title() {
        let dir = tempfile::tempdir().expect("can create tempdir");
        let archive = dir.path().join("export.zip");
        let file = File::create(&archive).expect("can create zip");
        let mut writer = ZipWriter::new(file);
        writer
            .start_file(
                "doc.html",
                SimpleFileOptions::default().compression_method(CompressionMethod::Stored),
            )
            .expect("can start file");
        writer.write_all(EXPORT.as_bytes()).expect("can write file");
        writer.finish().expect("can finish zip");

        let renderer = FakeRenderer::new();
        let output = run(&settings(archive), &renderer).expect("pipeline runs");

        assert_eq!(output, dir.path().join("Report.pdf"));
        assert!(output.is_file());
    }

    #[test]
    fn an_explicit_output_path_wins() {
        let dir = tempfile::tempdir().expect("can create tempdir");
        let html = dir.path().join("doc.html");
        std::fs::write(&html, EXPORT).expect("can write export");

        let mut settings = settings(html);
        settings.output = Some(dir.path().join("custom.pdf"));

        let renderer = FakeRenderer::new();
        let output = run(&settings, &renderer).expect("pipeline runs");
        assert_eq!(output, dir.path().join("custom.pdf"));
        assert!(output.is_file());
    }

    #[test]
    fn a_bundle_with_a_cover_and_footer_drives_the_merges() {
        let dir = tempfile::tempdir().expect("can create tempdir");
        let html = dir.path().join("doc.html");
        std::fs::write(&html, EXPORT).expect("can write export");

        let bundle = tempfile::tempdir().expect("can create bundle");
        std::fs::write(
            bundle.path().join("footer.html"),
            "<footer>{{ title }} p{{ pageNumber }}</footer>",
        )
        .expect("can write footer");
        std::fs::write(bundle.path().join("cover.html"), "<h1>{{ title }}</h1>")
            .expect("can write cover");

        let mut settings = settings(html);
        settings.resource_dir = Some(bundle.path().to_path_buf());
        settings.output = Some(dir.path().join("out.pdf"));

        let renderer = FakeRenderer::new();
        run(&settings, &renderer).expect("pipeline runs");

        let rendered = renderer.rendered.borrow();
        // main document, one underlay per page, cover
        assert!(rendered.iter().any(|html| html.contains("page-body")));
        assert!(rendered.iter().any(|html| html.contains("Report p1")));
        assert!(rendered.iter().any(|html| html == "<h1>Report</h1>"));
    }

    #[test]
    fn the_underlay_sees_whether_a_cover_exists() {
        let dir = tempfile::tempdir().expect("can create tempdir");
        let html = dir.path().join("doc.html");
        std::fs::write(&html, EXPORT).expect("can write export");

        let bundle = tempfile::tempdir().expect("can create bundle");
        std::fs::write(
            bundle.path().join("footer.html"),
            "{% if hasCoverPage %}COVER{% endif %}p{{ pageNumber }}",
        )
        .expect("can write footer");

        let mut settings = settings(html);
        settings.resource_dir = Some(bundle.path().to_path_buf());
        settings.output = Some(dir.path().join("out.pdf"));

        let renderer = FakeRenderer::new();
        run(&settings, &renderer).expect("pipeline runs");
        let rendered = renderer.rendered.borrow();
        assert!(rendered.iter().any(|html| html == "p1"));
        assert!(!rendered.iter().any(|html| html.contains("COVER")));
        drop(rendered);

        std::fs::write(bundle.path().join("cover.html"), "<h1>{{ title }}</h1>")
            .expect("can write cover");
        let renderer = FakeRenderer::new();
        run(&settings, &renderer).expect("pipeline runs");
        let rendered = renderer.rendered.borrow();
        assert!(rendered.iter().any(|html| html == "COVERp1"));
    }

    #[test]
    fn cover_flag_off_keeps_the_header_and_skips_the_cover() {
        let dir = tempfile::tempdir().expect("can create tempdir");
        let html = dir.path().join("doc.html");
        std::fs::write(&html, EXPORT).expect("can write export");

        let bundle = tempfile::tempdir().expect("can create bundle");
        std::fs::write(bundle.path().join("cover.html"), "<h1>{{ title }}</h1>")
            .expect("can write cover");

        let mut settings = settings(html);
        settings.resource_dir = Some(bundle.path().to_path_buf());
        settings.output = Some(dir.path().join("out.pdf"));
        settings.flags.cover_page = false;

        let renderer = FakeRenderer::new();
        run(&settings, &renderer).expect("pipeline runs");

        let rendered = renderer.rendered.borrow();
        assert_eq!(rendered.len(), 1, "only the main document is rendered");
        assert!(rendered[0].contains("<header"));
    }

    #[test]
    fn an_untitled_document_without_an_override_is_rejected() {
        let dir = tempfile::tempdir().expect("can create tempdir");
        let html = dir.path().join("doc.html");
        std::fs::write(
            &html,
            r#"<html><body><div class="page-body"><p>hi</p></div></body></html>"#,
        )
        .expect("can write export");

        let renderer = FakeRenderer::new();
        let err = run(&settings(html), &renderer).expect_err("must reject untitled input");
        assert!(err.to_string().contains("no title"));
    }
}
