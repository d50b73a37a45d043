//! The paged-artifact composer.
//!
//! Drives the external renderer over one or more markup sources and merges
//! the results into a single document: a per-page header/footer underlay, a
//! branding background, a prepended cover page, and an outline rebuilt from
//! the anchor links that survived rendering. Merge order is fixed — underlay,
//! then background, then cover — because prepending the cover shifts page
//! indices and must come after anything indexed per page.

pub mod artifact;
pub mod renderer;

use crate::document::AnchorMap;
use crate::error::{Error, Result};
use artifact::{Artifact, LinkKind, OutlineEntry, PageLabel};
use indicatif::{ProgressBar, ProgressStyle};
use renderer::PageRenderer;
use std::path::{Path, PathBuf};

/// Literal token replaced per page in the underlay template. The substitution
/// is purely textual — the token is ours, not user data, so no escaping.
pub const PAGE_NUMBER_TOKEN: &str = "__PAGENUMBER__";

/// Composes rendered artifacts inside one working directory.
///
/// Lifecycle per run: `render` exactly once, any number of merges, `save`
/// once. Merge operations before `render` are a programming error.
pub struct Composer<'a, R: PageRenderer> {
    renderer: &'a R,
    workdir: PathBuf,
    artifact: Option<Artifact>,
}

impl<'a, R: PageRenderer> Composer<'a, R> {
    pub fn new(renderer: &'a R, workdir: &Path) -> Composer<'a, R> {
        Composer {
            renderer,
            workdir: workdir.to_path_buf(),
            artifact: None,
        }
    }

    /// Render the main document from an HTML file already on disk.
    pub fn render(&mut self, html: &Path) -> Result<()> {
        let output = self.workdir.join("updated_doc.pdf");
        self.renderer.render(html, &output)?;
        self.artifact = Some(Artifact::load(&output)?);
        Ok(())
    }

    pub fn page_count(&self) -> usize {
        self.artifact.as_ref().map_or(0, Artifact::page_count)
    }

    /// Merge a header/footer underlay beneath every page.
    ///
    /// For page i (0-based) the template's page-number token is replaced with
    /// `i + 1`, the result is rendered into its own one-page document, and
    /// that page is composited beneath the existing content. One render per
    /// page; the page count never changes.
    pub fn merge_underlay(&mut self, template: &str) -> Result<()> {
        let mut main = self.take_artifact();
        let count = main.page_count();

        let progress = ProgressBar::new(count as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("can parse progress style")
                .progress_chars("#>-"),
        );
        progress.set_message("Rendering page underlays...");

        let result = (|| {
            for index in 0..count {
                let page_html = template.replace(PAGE_NUMBER_TOKEN, &(index + 1).to_string());
                let underlay = self.render_snippet(&format!("underlay_{}", index), &page_html)?;
                main.underlay_page(index, &underlay)?;
                progress.inc(1);
            }
            Ok(())
        })();
        progress.finish_and_clear();

        self.artifact = Some(main);
        result
    }

    /// Composite a single-page background PDF beneath every page.
    pub fn merge_background(&mut self, background: &Path) -> Result<()> {
        let background = Artifact::load(background)?;
        let mut main = self.take_artifact();
        let result = main.underlay_all(&background);
        self.artifact = Some(main);
        result
    }

    /// Build a one-page cover and insert it at page index 0.
    ///
    /// With markup, the markup is rendered and any cover PDF is merged
    /// beneath it as its background; without markup the cover PDF is used
    /// verbatim. After insertion the page-label table (if any) is repaired so
    /// the cover displays no page number.
    pub fn prepend_cover(
        &mut self,
        cover_pdf: Option<&Path>,
        cover_html: Option<&str>,
    ) -> Result<()> {
        let cover = match (cover_html, cover_pdf) {
            (Some(html), pdf) => {
                let mut cover = self.render_snippet("titlepage", html)?;
                if let Some(pdf) = pdf {
                    cover.underlay_all(&Artifact::load(pdf)?)?;
                }
                cover
            }
            (None, Some(pdf)) => Artifact::load(pdf)?,
            (None, None) => return Err(Error::MissingCover),
        };

        let mut main = self.take_artifact();
        let result = (|| {
            main.insert_front_page(&cover)?;

            let mut labels = main.page_labels()?;
            if !labels.is_empty() {
                for label in &mut labels {
                    label.start += 1;
                }
                labels.insert(0, PageLabel::unstyled(0));
                main.set_page_labels(labels)?;
            }
            Ok(())
        })();
        self.artifact = Some(main);
        result
    }

    /// Rebuild the document outline from the anchor links on each page.
    ///
    /// Best-effort: any failure here is logged and swallowed, leaving the
    /// outline in whatever partial state was reached — a thin outline is
    /// cosmetic, an aborted run is not.
    pub fn rebuild_outline(&mut self, anchors: &AnchorMap) {
        if let Err(e) = self.try_rebuild_outline(anchors) {
            log::error!("{}", Error::Outline(e.to_string()));
        }
    }

    fn try_rebuild_outline(&mut self, anchors: &AnchorMap) -> Result<()> {
        let main = self.artifact_mut();
        let destinations = main.destinations()?;

        let mut draft: Vec<OutlineEntry> = Vec::new();
        for (page_index, link) in main.links()? {
            match link {
                LinkKind::Named(name) => {
                    let Some(target) = destinations.get(&name) else {
                        log::debug!("link to unknown destination #{} ignored", name);
                        continue;
                    };
                    if let Some(anchor) = anchors.get(&name) {
                        log::debug!(
                            "link '{}' to #{} -> page {}",
                            anchor.text,
                            name,
                            target
                        );
                        draft.push(OutlineEntry {
                            level: anchor.level,
                            title: anchor.text.clone(),
                            page: target + 1,
                        });
                    }
                }
                LinkKind::Uri(uri) => {
                    log::debug!("external link on page {} -> {}", page_index, uri);
                }
                LinkKind::Launch(file) => {
                    log::debug!("stale file link on page {} -> {}", page_index, file);
                }
                LinkKind::Other => {}
            }
        }

        // several links can target the same heading (TOC entry plus the
        // heading's own anchor); adjacent identical entries collapse to one
        draft.dedup();
        main.set_outline(&draft)
    }

    /// Delete the file-launch links the browser emits for links into the
    /// working directory. They dangle in every configuration once the output
    /// leaves the working directory.
    pub fn delete_stale_links(&mut self) -> Result<()> {
        let deleted = self.artifact_mut().delete_launch_links()?;
        if deleted > 0 {
            log::debug!("deleted {} stale file-launch links", deleted);
        }
        Ok(())
    }

    /// Stamp document metadata into the artifact's info dictionary.
    pub fn set_metadata(&mut self, metadata: &crate::metadata::Metadata) {
        self.artifact_mut().set_info(&metadata.title, &metadata.author);
    }

    /// Terminal: write the composed artifact.
    pub fn save(&mut self, output: &Path) -> Result<()> {
        self.artifact_mut().save(output)
    }

    /// Render an HTML snippet from memory into its own artifact.
    fn render_snippet(&self, name: &str, html: &str) -> Result<Artifact> {
        let html_path = self.workdir.join(format!("{}.html", name));
        let pdf_path = self.workdir.join(format!("{}.pdf", name));
        std::fs::write(&html_path, html)?;
        self.renderer.render(&html_path, &pdf_path)?;
        Artifact::load(&pdf_path)
    }

    fn take_artifact(&mut self) -> Artifact {
        self.artifact
            .take()
            .expect("composer is rendered before merging")
    }

    fn artifact_mut(&mut self) -> &mut Artifact {
        self.artifact
            .as_mut()
            .expect("composer is rendered before merging")
    }

    #[cfg(test)]
    fn with_artifact(renderer: &'a R, workdir: &Path, artifact: Artifact) -> Composer<'a, R> {
        Composer {
            renderer,
            workdir: workdir.to_path_buf(),
            artifact: Some(artifact),
        }
    }
}
