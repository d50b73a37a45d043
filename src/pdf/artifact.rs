//! Paged-artifact editing primitives on top of `lopdf`.
//!
//! An [`Artifact`] wraps one PDF document and exposes the page-graph surgery
//! the composer needs: compositing a page *beneath* another (never as an
//! overlay), inserting a page at the front, page-label repair, link-annotation
//! inspection, and outline construction. Page indices are 0-based here;
//! anything user-facing is 1-based and converted at the call site.

use crate::error::{Error, Result};
use lopdf::{dictionary, Bookmark, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;
use std::path::Path;

/// One PDF document owned by the composer for the duration of a run.
pub struct Artifact {
    doc: Document,
}

/// A link annotation found on a page.
#[derive(Clone, Debug, PartialEq)]
pub enum LinkKind {
    /// Internal link to a named destination (an HTML anchor id).
    Named(String),
    /// External URI link; left untouched.
    Uri(String),
    /// File-launch link; points at a path in the working directory and is
    /// stale the moment the output is saved.
    Launch(String),
    /// Anything else (direct destinations, unsupported actions).
    Other,
}

/// One `/PageLabels` number-tree entry.
#[derive(Clone, Debug, PartialEq)]
pub struct PageLabel {
    /// First page index (0-based) this label range applies to.
    pub start: u32,
    /// Numbering style (`D`, `r`, `R`, `a`, `A`); `None` renders no number.
    pub style: Option<String>,
    pub prefix: Option<String>,
    pub first: Option<i64>,
}

impl PageLabel {
    /// An entry with no numbering style, used for the inserted cover page so
    /// two pages never both display "1".
    pub fn unstyled(start: u32) -> PageLabel {
        PageLabel {
            start,
            style: None,
            prefix: None,
            first: None,
        }
    }
}

/// One draft outline entry: `(level, title, 1-based page number)`.
#[derive(Clone, Debug, PartialEq)]
pub struct OutlineEntry {
    pub level: u32,
    pub title: String,
    pub page: usize,
}

impl Artifact {
    pub fn load(path: &Path) -> Result<Artifact> {
        let doc = Document::load(path)?;
        Ok(Artifact { doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Page object ids in page order.
    fn page_ids(&self) -> Vec<ObjectId> {
        self.doc.get_pages().into_values().collect()
    }

    /// Composite the first page of `source` beneath page `index` of this
    /// artifact, replicating the full page rectangle.
    pub fn underlay_page(&mut self, index: usize, source: &Artifact) -> Result<()> {
        let page_id = self.page_id_at(index)?;
        let (xobject_id, bbox) = import_page_as_xobject(&mut self.doc, &source.doc)?;
        draw_beneath(&mut self.doc, page_id, xobject_id, bbox)
    }

    /// Composite the first page of `source` beneath every page, reusing one
    /// imported copy of the source page for all of them.
    pub fn underlay_all(&mut self, source: &Artifact) -> Result<()> {
        let (xobject_id, bbox) = import_page_as_xobject(&mut self.doc, &source.doc)?;
        for page_id in self.page_ids() {
            draw_beneath(&mut self.doc, page_id, xobject_id, bbox)?;
        }
        Ok(())
    }

    /// Clone the first page of `source` and insert it at page index 0.
    pub fn insert_front_page(&mut self, source: &Artifact) -> Result<()> {
        let source_page = *source.page_ids().first().ok_or_else(|| {
            Error::InvalidInput("cover PDF has no pages".to_string())
        })?;

        let page_object = source.doc.get_object(source_page)?.clone();
        let cloned = deep_clone_object(&source.doc, &mut self.doc, &page_object)?;
        let new_id = self.doc.add_object(cloned);

        let pages_id = self.root_pages_id()?;
        if let Ok(Object::Dictionary(pages)) = self.doc.get_object_mut(pages_id) {
            if let Ok(Object::Array(kids)) = pages.get_mut(b"Kids") {
                kids.insert(0, Object::Reference(new_id));
            }
            if let Ok(Object::Integer(count)) = pages.get_mut(b"Count") {
                *count += 1;
            }
        }
        if let Ok(Object::Dictionary(page)) = self.doc.get_object_mut(new_id) {
            page.set("Parent", Object::Reference(pages_id));
        }

        Ok(())
    }

    /// The document's page-label table, empty when it carries none.
    pub fn page_labels(&self) -> Result<Vec<PageLabel>> {
        let catalog = self.doc.catalog()?;
        let labels = match catalog.get(b"PageLabels") {
            Ok(labels) => labels,
            Err(_) => return Ok(Vec::new()),
        };
        let Some(dict) = resolve(&self.doc, labels).as_dict().ok() else {
            return Ok(Vec::new());
        };
        let nums = match dict.get(b"Nums") {
            Ok(nums) => resolve(&self.doc, nums),
            Err(_) => return Ok(Vec::new()),
        };
        let Ok(nums) = nums.as_array() else {
            return Ok(Vec::new());
        };

        let mut entries = Vec::new();
        for pair in nums.chunks(2) {
            let [start, value] = pair else { continue };
            let Object::Integer(start) = resolve(&self.doc, start) else {
                continue;
            };
            let Ok(value) = resolve(&self.doc, value).as_dict() else {
                continue;
            };
            entries.push(PageLabel {
                start: *start as u32,
                style: name_value(value.get(b"S").ok()),
                prefix: string_value(value.get(b"P").ok()),
                first: match value.get(b"St") {
                    Ok(Object::Integer(n)) => Some(*n),
                    _ => None,
                },
            });
        }
        Ok(entries)
    }

    /// Replace the document's page-label table.
    pub fn set_page_labels(&mut self, labels: Vec<PageLabel>) -> Result<()> {
        let mut nums = Vec::with_capacity(labels.len() * 2);
        for label in labels {
            nums.push(Object::Integer(label.start as i64));
            let mut dict = Dictionary::new();
            if let Some(style) = label.style {
                dict.set("S", Object::Name(style.into_bytes()));
            }
            if let Some(prefix) = label.prefix {
                dict.set("P", Object::string_literal(prefix));
            }
            if let Some(first) = label.first {
                dict.set("St", Object::Integer(first));
            }
            nums.push(Object::Dictionary(dict));
        }

        let catalog_id = self.catalog_id()?;
        if let Ok(Object::Dictionary(catalog)) = self.doc.get_object_mut(catalog_id) {
            catalog.set(
                "PageLabels",
                Object::Dictionary(dictionary! { "Nums" => Object::Array(nums) }),
            );
        }
        Ok(())
    }

    /// Every link annotation in the document, in page order: `(page index, kind)`.
    pub fn links(&self) -> Result<Vec<(usize, LinkKind)>> {
        let mut links = Vec::new();
        for (index, page_id) in self.page_ids().into_iter().enumerate() {
            for annot in self.page_annotations(page_id)? {
                let Ok(annot) = resolve(&self.doc, &annot).as_dict() else {
                    continue;
                };
                if name_value(annot.get(b"Subtype").ok()).as_deref() != Some("Link") {
                    continue;
                }
                links.push((index, self.classify_link(annot)));
            }
        }
        Ok(links)
    }

    /// Remove every file-launch link annotation; returns how many went.
    pub fn delete_launch_links(&mut self) -> Result<usize> {
        let mut deleted = 0;
        for page_id in self.page_ids() {
            let annots = self.page_annotations(page_id)?;
            if annots.is_empty() {
                continue;
            }

            let kept: Vec<Object> = annots
                .iter()
                .filter(|annot| {
                    let Ok(dict) = resolve(&self.doc, annot).as_dict() else {
                        return true;
                    };
                    !matches!(self.classify_link(dict), LinkKind::Launch(_))
                })
                .cloned()
                .collect();
            if kept.len() == annots.len() {
                continue;
            }
            deleted += annots.len() - kept.len();

            // write back, into the referenced array or inline
            let location = {
                let page = self.doc.get_object(page_id)?.as_dict()?;
                match page.get(b"Annots") {
                    Ok(Object::Reference(id)) => Some(*id),
                    _ => None,
                }
            };
            match location {
                Some(id) => {
                    if let Ok(Object::Array(array)) = self.doc.get_object_mut(id) {
                        *array = kept;
                    }
                }
                None => {
                    if let Ok(Object::Dictionary(page)) = self.doc.get_object_mut(page_id) {
                        page.set("Annots", Object::Array(kept));
                    }
                }
            }
        }
        Ok(deleted)
    }

    /// Named destination → 0-based target page index, from both the old-style
    /// `/Dests` dictionary and the `/Names` destination name tree.
    pub fn destinations(&self) -> Result<HashMap<String, usize>> {
        let page_positions: HashMap<ObjectId, usize> = self
            .page_ids()
            .into_iter()
            .enumerate()
            .map(|(index, id)| (id, index))
            .collect();

        let mut raw = Vec::new();
        let catalog = self.doc.catalog()?;

        if let Ok(dests) = catalog.get(b"Dests") {
            if let Ok(dests) = resolve(&self.doc, dests).as_dict() {
                for (name, value) in dests.iter() {
                    raw.push((String::from_utf8_lossy(name).into_owned(), value.clone()));
                }
            }
        }

        if let Ok(names) = catalog.get(b"Names") {
            if let Ok(names) = resolve(&self.doc, names).as_dict() {
                if let Ok(tree) = names.get(b"Dests") {
                    collect_name_tree(&self.doc, resolve(&self.doc, tree), &mut raw);
                }
            }
        }

        let mut map = HashMap::new();
        for (name, dest) in raw {
            if let Some(index) = self.destination_page(&dest, &page_positions) {
                map.insert(name, index);
            }
        }
        Ok(map)
    }

    /// Replace the document outline with the given draft entries.
    ///
    /// Entries nest by level: an entry becomes a child of the nearest
    /// preceding entry with a shallower level. Entries pointing past the end
    /// of the document are skipped.
    pub fn set_outline(&mut self, entries: &[OutlineEntry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let pages = self.page_ids();
        let mut stack: Vec<(u32, u32)> = Vec::new();
        for entry in entries {
            let Some(page_id) = entry.page.checked_sub(1).and_then(|i| pages.get(i)) else {
                log::warn!("outline entry '{}' points past the last page", entry.title);
                continue;
            };

            while stack
                .last()
                .is_some_and(|(level, _)| *level >= entry.level)
            {
                stack.pop();
            }
            let parent = stack.last().map(|(_, id)| *id);
            let id = self.doc.add_bookmark(
                Bookmark::new(entry.title.clone(), [0.0, 0.0, 0.0], 0, *page_id),
                parent,
            );
            stack.push((entry.level, id));
        }

        let catalog_id = self.catalog_id()?;
        if let Some(outline_id) = self.doc.build_outline() {
            if let Ok(Object::Dictionary(catalog)) = self.doc.get_object_mut(catalog_id) {
                catalog.set("Outlines", Object::Reference(outline_id));
            }
        }
        Ok(())
    }

    /// Stamp title and author into the PDF info dictionary.
    pub fn set_info(&mut self, title: &str, author: &str) {
        let mut info = Dictionary::new();
        if !title.is_empty() {
            info.set("Title", Object::string_literal(title));
        }
        if !author.is_empty() {
            info.set("Author", Object::string_literal(author));
        }
        if info.is_empty() {
            return;
        }
        let info_id = self.doc.add_object(Object::Dictionary(info));
        self.doc.trailer.set("Info", Object::Reference(info_id));
    }

    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.doc.save(path)?;
        Ok(())
    }

    fn page_id_at(&self, index: usize) -> Result<ObjectId> {
        self.page_ids().get(index).copied().ok_or_else(|| {
            Error::InvalidInput(format!("page index {} out of range", index))
        })
    }

    fn catalog_id(&self) -> Result<ObjectId> {
        Ok(self.doc.trailer.get(b"Root")?.as_reference()?)
    }

    fn root_pages_id(&self) -> Result<ObjectId> {
        let catalog = self.doc.catalog()?;
        match catalog.get(b"Pages") {
            Ok(Object::Reference(id)) => Ok(*id),
            _ => Err(Error::InvalidInput(
                "PDF catalog has no /Pages reference".to_string(),
            )),
        }
    }

    /// The page's `/Annots` entries (resolved to a flat list, possibly empty).
    fn page_annotations(&self, page_id: ObjectId) -> Result<Vec<Object>> {
        let page = self.doc.get_object(page_id)?.as_dict()?;
        let annots = match page.get(b"Annots") {
            Ok(annots) => resolve(&self.doc, annots),
            Err(_) => return Ok(Vec::new()),
        };
        Ok(annots.as_array().cloned().unwrap_or_default())
    }

    fn classify_link(&self, annot: &Dictionary) -> LinkKind {
        if let Ok(dest) = annot.get(b"Dest") {
            if let Some(name) = destination_name(resolve(&self.doc, dest)) {
                return LinkKind::Named(name);
            }
            return LinkKind::Other;
        }

        let Ok(action) = annot.get(b"A") else {
            return LinkKind::Other;
        };
        let Ok(action) = resolve(&self.doc, action).as_dict() else {
            return LinkKind::Other;
        };
        match name_value(action.get(b"S").ok()).as_deref() {
            Some("URI") => LinkKind::Uri(
                string_value(action.get(b"URI").ok()).unwrap_or_default(),
            ),
            Some("Launch") => LinkKind::Launch(
                string_value(action.get(b"F").ok()).unwrap_or_default(),
            ),
            Some("GoTo") => match action.get(b"D") {
                Ok(dest) => match destination_name(resolve(&self.doc, dest)) {
                    Some(name) => LinkKind::Named(name),
                    None => LinkKind::Other,
                },
                Err(_) => LinkKind::Other,
            },
            _ => LinkKind::Other,
        }
    }

    fn destination_page(
        &self,
        dest: &Object,
        page_positions: &HashMap<ObjectId, usize>,
    ) -> Option<usize> {
        let dest = resolve(&self.doc, dest);
        let array = match dest {
            Object::Array(array) => array,
            Object::Dictionary(dict) => resolve(&self.doc, dict.get(b"D").ok()?)
                .as_array()
                .ok()?,
            _ => return None,
        };
        match array.first()? {
            Object::Reference(page_id) => page_positions.get(page_id).copied(),
            _ => None,
        }
    }
}

/// Copy the first page of `source` into `target` as a Form XObject whose
/// bounding box replicates the source page rectangle.
fn import_page_as_xobject(
    target: &mut Document,
    source: &Document,
) -> Result<(ObjectId, [f32; 4])> {
    let source_page = *source
        .get_pages()
        .values()
        .next()
        .ok_or_else(|| Error::InvalidInput("source PDF has no pages".to_string()))?;

    let content = source.get_page_content(source_page)?;
    let bbox = page_media_box(source, source_page);
    let resources = page_resources(source, source_page);
    let resources = deep_clone_object(source, target, &Object::Dictionary(resources))?;

    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Form",
        "BBox" => Object::Array(bbox.iter().map(|v| Object::Real(*v)).collect()),
    };
    dict.set("Resources", resources);

    let id = target.add_object(Object::Stream(Stream::new(dict, content)));
    Ok((id, bbox))
}

/// Prepend a draw of `xobject_id` to the page's content so it renders beneath
/// everything already on the page, scaled from `bbox` to the page rectangle.
fn draw_beneath(
    doc: &mut Document,
    page_id: ObjectId,
    xobject_id: ObjectId,
    bbox: [f32; 4],
) -> Result<()> {
    let target_box = page_media_box(doc, page_id);
    let source_width = bbox[2] - bbox[0];
    let source_height = bbox[3] - bbox[1];
    let sx = if source_width > 0.0 {
        (target_box[2] - target_box[0]) / source_width
    } else {
        1.0
    };
    let sy = if source_height > 0.0 {
        (target_box[3] - target_box[1]) / source_height
    } else {
        1.0
    };
    let tx = target_box[0] - bbox[0] * sx;
    let ty = target_box[1] - bbox[1] * sy;

    let name = format!("U{}", xobject_id.0);
    let mut content =
        format!("q\n{} 0 0 {} {} {} cm\n/{} Do\nQ\n", sx, sy, tx, ty, name).into_bytes();
    content.extend_from_slice(&doc.get_page_content(page_id)?);

    // materialise the effective resources inline so the new XObject entry
    // never shadows anything inherited from the page tree
    let mut resources = page_resources(doc, page_id);
    let mut xobjects = match resources.get(b"XObject") {
        Ok(Object::Dictionary(dict)) => dict.clone(),
        Ok(Object::Reference(id)) => doc
            .get_object(*id)
            .ok()
            .and_then(|obj| obj.as_dict().ok())
            .cloned()
            .unwrap_or_else(Dictionary::new),
        _ => Dictionary::new(),
    };
    xobjects.set(name, Object::Reference(xobject_id));
    resources.set("XObject", Object::Dictionary(xobjects));
    if let Ok(Object::Dictionary(page)) = doc.get_object_mut(page_id) {
        page.set("Resources", Object::Dictionary(resources));
    }

    doc.change_page_content(page_id, content)?;
    Ok(())
}

/// The page's media box, following `/Parent` inheritance; US Letter when the
/// document never declares one.
fn page_media_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    let mut current = page_id;
    loop {
        let Ok(dict) = doc.get_object(current).and_then(|obj| obj.as_dict()) else {
            break;
        };
        if let Ok(media_box) = dict.get(b"MediaBox") {
            if let Some(rect) = rect_values(doc, media_box) {
                return rect;
            }
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(id)) => current = *id,
            _ => break,
        }
    }
    [0.0, 0.0, 612.0, 792.0]
}

/// The page's effective `/Resources` dictionary (resolved, owned), following
/// `/Parent` inheritance; empty when none is declared anywhere.
fn page_resources(doc: &Document, page_id: ObjectId) -> Dictionary {
    let mut current = page_id;
    loop {
        let Ok(dict) = doc.get_object(current).and_then(|obj| obj.as_dict()) else {
            break;
        };
        if let Ok(resources) = dict.get(b"Resources") {
            if let Ok(resources) = resolve(doc, resources).as_dict() {
                return resources.clone();
            }
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(id)) => current = *id,
            _ => break,
        }
    }
    Dictionary::new()
}

fn rect_values(doc: &Document, obj: &Object) -> Option<[f32; 4]> {
    let array = resolve(doc, obj).as_array().ok()?;
    if array.len() != 4 {
        return None;
    }
    let mut rect = [0.0f32; 4];
    for (slot, value) in rect.iter_mut().zip(array) {
        *slot = match resolve(doc, value) {
            Object::Integer(n) => *n as f32,
            Object::Real(r) => *r,
            _ => return None,
        };
    }
    Some(rect)
}

/// Follow reference chains to the pointed-at object.
fn resolve<'a>(doc: &'a Document, mut obj: &'a Object) -> &'a Object {
    while let Object::Reference(id) = obj {
        match doc.get_object(*id) {
            Ok(next) => obj = next,
            Err(_) => break,
        }
    }
    obj
}

fn name_value(obj: Option<&Object>) -> Option<String> {
    match obj? {
        Object::Name(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}

fn string_value(obj: Option<&Object>) -> Option<String> {
    match obj? {
        Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}

fn destination_name(obj: &Object) -> Option<String> {
    match obj {
        Object::Name(bytes) | Object::String(bytes, _) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
        _ => None,
    }
}

/// Flatten a destination name tree (leaf `/Names` arrays plus intermediate
/// `/Kids` nodes) into `(name, destination)` pairs.
fn collect_name_tree(doc: &Document, node: &Object, out: &mut Vec<(String, Object)>) {
    let Ok(node) = node.as_dict() else { return };

    if let Ok(names) = node.get(b"Names") {
        if let Ok(names) = resolve(doc, names).as_array() {
            for pair in names.chunks(2) {
                let [key, value] = pair else { continue };
                if let Some(name) = destination_name(resolve(doc, key)) {
                    out.push((name, value.clone()));
                }
            }
        }
    }

    if let Ok(kids) = node.get(b"Kids") {
        if let Ok(kids) = resolve(doc, kids).as_array() {
            for kid in kids {
                collect_name_tree(doc, resolve(doc, kid), out);
            }
        }
    }
}

/// Deep-clone an object from `source` into `target`, following references
/// except the `/Parent` back-reference (patched by the caller where needed).
fn deep_clone_object(source: &Document, target: &mut Document, object: &Object) -> Result<Object> {
    match object {
        Object::Dictionary(dict) => {
            let mut new_dict = Dictionary::new();
            for (key, value) in dict.iter() {
                if key == b"Parent" {
                    continue;
                }
                new_dict.set(key.clone(), deep_clone_object(source, target, value)?);
            }
            Ok(Object::Dictionary(new_dict))
        }
        Object::Array(array) => {
            let mut new_array = Vec::with_capacity(array.len());
            for item in array {
                new_array.push(deep_clone_object(source, target, item)?);
            }
            Ok(Object::Array(new_array))
        }
        Object::Reference(id) => match source.get_object(*id) {
            Ok(referenced) => {
                let cloned = deep_clone_object(source, target, referenced)?;
                let new_id = target.add_object(cloned);
                Ok(Object::Reference(new_id))
            }
            Err(e) => {
                log::warn!("cannot resolve reference {:?} while cloning: {}", id, e);
                Ok(Object::Null)
            }
        },
        Object::Stream(stream) => {
            let mut new_dict = Dictionary::new();
            for (key, value) in stream.dict.iter() {
                if key == b"Parent" {
                    continue;
                }
                new_dict.set(key.clone(), deep_clone_object(source, target, value)?);
            }
            Ok(Object::Stream(Stream::new(new_dict, stream.content.clone())))
        }
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
pub(crate) fn blank_document(pages: usize) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::with_capacity(pages);
    for _ in 0..pages {
        let content_id = doc.add_object(Object::Stream(Stream::new(Dictionary::new(), Vec::new())));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ]),
            "Contents" => Object::Reference(content_id),
        });
        kids.push(Object::Reference(page_id));
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => Object::Array(kids),
            "Count" => Object::Integer(pages as i64),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc
}

#[cfg(test)]
pub(crate) fn artifact_from(doc: Document) -> Artifact {
    Artifact { doc }
}


#[cfg(test)]
mod test {
    use super::testing::*;
    use super::*;

    #[test]
    fn underlay_keeps_the_page_count_and_draws_first() {
        let mut main = artifact_from(blank_document(3));
        let underlay = artifact_from(blank_document(1));

        main.underlay_page(1, &underlay).expect("underlay merges");

        assert_eq!(main.page_count(), 3);
        let content = page_content(&main, 1);
        assert!(content.starts_with(b"q\n"), "underlay draw must come first");
        assert!(content.windows(3).any(|w| w == b" Do"));
    }

    #[test]
    fn broadcast_underlay_reaches_every_page() {
        let mut main = artifact_from(blank_document(2));
        let background = artifact_from(blank_document(1));

        main.underlay_all(&background).expect("background merges");

        for index in 0..2 {
            assert!(page_content(&main, index).starts_with(b"q\n"));
        }
    }

    #[test]
    fn front_insertion_adds_exactly_one_page_at_index_zero() {
        let mut main = artifact_from(blank_document(2));
        let cover = artifact_from(blank_document(1));

        main.insert_front_page(&cover).expect("cover inserts");

        assert_eq!(main.page_count(), 3);
    }

    #[test]
    fn page_labels_round_trip() {
        let mut artifact = artifact_from(blank_document(2));
        artifact
            .set_page_labels(vec![
                PageLabel {
                    start: 0,
                    style: Some("D".to_string()),
                    prefix: None,
                    first: None,
                },
                PageLabel {
                    start: 1,
                    style: Some("D".to_string()),
                    prefix: None,
                    first: None,
                },
            ])
            .expect("labels set");

        let labels = artifact.page_labels().expect("labels read");
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].style.as_deref(), Some("D"));
    }

    #[test]
    fn missing_label_table_reads_as_empty() {
        let artifact = artifact_from(blank_document(1));
        assert!(artifact.page_labels().expect("labels read").is_empty());
    }

    #[test]
    fn links_are_classified_by_kind() {
        let mut artifact = artifact_from(blank_document(2));
        add_link(&mut artifact, 0, named_link("intro"));
        add_link(&mut artifact, 1, uri_link("https://example.com"));
        add_link(&mut artifact, 1, launch_link("/tmp/img.png"));

        let links = artifact.links().expect("links walk");
        assert_eq!(
            links,
            vec![
                (0, LinkKind::Named("intro".to_string())),
                (1, LinkKind::Uri("https://example.com".to_string())),
                (1, LinkKind::Launch("/tmp/img.png".to_string())),
            ]
        );
    }

    #[test]
    fn launch_links_are_deleted_and_others_kept() {
        let mut artifact = artifact_from(blank_document(1));
        add_link(&mut artifact, 0, launch_link("/tmp/a.png"));
        add_link(&mut artifact, 0, uri_link("https://example.com"));

        let deleted = artifact.delete_launch_links().expect("deletion runs");
        assert_eq!(deleted, 1);

        let links = artifact.links().expect("links walk");
        assert_eq!(links, vec![(0, LinkKind::Uri("https://example.com".to_string()))]);
    }

    #[test]
    fn destinations_resolve_to_page_indices() {
        let mut artifact = artifact_from(blank_document(3));
        add_destination(&mut artifact, "intro", 2);

        let destinations = artifact.destinations().expect("destinations build");
        assert_eq!(destinations.get("intro"), Some(&2));
        assert!(destinations.get("unknown").is_none());
    }

    #[test]
    fn outline_entries_nest_by_level() {
        let mut artifact = artifact_from(blank_document(3));
        artifact
            .set_outline(&[
                OutlineEntry {
                    level: 1,
                    title: "1. Intro".to_string(),
                    page: 1,
                },
                OutlineEntry {
                    level: 2,
                    title: "1.1. Scope".to_string(),
                    page: 2,
                },
                OutlineEntry {
                    level: 1,
                    title: "2. Body".to_string(),
                    page: 3,
                },
            ])
            .expect("outline sets");

        assert_eq!(
            outline_titles(&artifact),
            vec!["1. Intro", "1.1. Scope", "2. Body"]
        );
    }

    #[test]
    fn out_of_range_outline_entries_are_skipped() {
        let mut artifact = artifact_from(blank_document(1));
        artifact
            .set_outline(&[OutlineEntry {
                level: 1,
                title: "ghost".to_string(),
                page: 9,
            }])
            .expect("outline sets");
        assert!(outline_titles(&artifact).is_empty());
    }
}
