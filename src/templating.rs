//! Rendering of header, footer, and cover templates.
//!
//! Templates use Tera syntax (substitution, conditionals, loops) and are
//! rendered against the document [`Metadata`](crate::metadata::Metadata),
//! optionally extended with ad-hoc keys such as the literal page-number
//! placeholder token used by the underlay template. Values are HTML-escaped
//! on insertion unless the template marks them `| safe`.

use crate::error::{Error, Result};
use crate::metadata::Metadata;

/// Render `template` against the metadata plus any extra key/value pairs.
///
/// `name` identifies the template in error messages only. Fails on template
/// syntax errors and on references to variables that are neither metadata
/// fields nor extra keys.
pub fn render(
    name: &str,
    template: &str,
    metadata: &Metadata,
    extra: &[(&str, &str)],
) -> Result<String> {
    let mut context = metadata.to_context();
    for (key, value) in extra {
        context.insert(*key, value);
    }

    tera::Tera::one_off(template, &context, true).map_err(|source| Error::Template {
        name: name.to_string(),
        source,
    })
}

/// Insert an inline `<style>` block at the start of the document head.
///
/// The block is prepended (right after the opening `<head>` tag) so that
/// document-level CSS can still be overridden by styles injected later.
/// Calling this twice inserts two blocks; deduplication is the caller's
/// problem. Documents without a head get the block prefixed verbatim.
pub fn add_css(html: &str, css: &str) -> String {
    let block = format!("<style type=\"text/css\">{}</style>", css);

    if let Some(start) = html.find("<head") {
        if let Some(end) = html[start..].find('>') {
            let at = start + end + 1;
            let mut out = String::with_capacity(html.len() + block.len());
            out.push_str(&html[..at]);
            out.push_str(&block);
            out.push_str(&html[at..]);
            return out;
        }
    }

    format!("{}{}", block, html)
}

#[cfg(test)]
mod test {
    use super::*;

    fn metadata() -> Metadata {
        Metadata {
            title: "Quarterly Report".to_string(),
            author: "Ada".to_string(),
            ..Metadata::default()
        }
    }

    #[test]
    fn substitutes_metadata_fields() {
        let html = render(
            "header.html",
            "<h1>{{ title }}</h1><p>{{ author }}</p>",
            &metadata(),
            &[],
        )
        .expect("template renders");
        assert_eq!(html, "<h1>Quarterly Report</h1><p>Ada</p>");
    }

    #[test]
    fn extra_keys_layer_over_the_metadata_context() {
        let html = render(
            "background.html",
            "<span>{{ pageNumber }}</span>",
            &metadata(),
            &[("pageNumber", "__PAGENUMBER__")],
        )
        .expect("template renders");
        assert_eq!(html, "<span>__PAGENUMBER__</span>");
    }

    #[test]
    fn values_are_escaped_in_markup_context() {
        let meta = Metadata {
            title: "Tom & Jerry <LLC>".to_string(),
            ..Metadata::default()
        };
        let html = render("header.html", "{{ title }}", &meta, &[]).expect("template renders");
        assert_eq!(html, "Tom &amp; Jerry &lt;LLC&gt;");
    }

    #[test]
    fn undefined_variable_is_a_template_error() {
        let err = render("cover.html", "{{ nonsense }}", &metadata(), &[])
            .expect_err("undefined variable must fail");
        assert!(matches!(err, crate::error::Error::Template { ref name, .. } if name == "cover.html"));
    }

    #[test]
    fn css_lands_right_after_the_opening_head_tag() {
        let html = add_css("<html><head><title>t</title></head></html>", "b{}");
        assert_eq!(
            html,
            "<html><head><style type=\"text/css\">b{}</style><title>t</title></head></html>"
        );
    }

    #[test]
    fn css_is_prefixed_when_there_is_no_head() {
        let html = add_css("<body></body>", "b{}");
        assert!(html.starts_with("<style type=\"text/css\">b{}</style>"));
    }

    #[test]
    fn add_css_twice_inserts_two_blocks() {
        let html = add_css(&add_css("<head></head>", "a{}"), "b{}");
        assert_eq!(html.matches("<style").count(), 2);
    }
}
