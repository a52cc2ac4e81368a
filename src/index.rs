//! Portal index listings
//!
//! The portal exposes two flat listing views: every date in ascending order,
//! and every resolution link for one date. Both render their payload as text
//! inside `font` nodes with a fixed size/face pair, capped by a `Count`
//! query parameter with no pagination behind it.

use crate::error::Result;
use crate::extract::compile;
use scraper::Html;
use url::Url;

// Listing payloads live in text nodes directly under these fonts
const LISTING_FONT: &str = r#"font[size="2"][face="Arial"]"#;
const LISTING_LINK: &str = r#"font[size="2"][face="Arial"] > a"#;

/// URL of the full ascending date listing
pub(crate) fn dates_url(base: &str, count: u32) -> String {
    format!("{base}/BetaWebFechaApAsc?OpenView&Start=1&Count={count}")
}

/// URL of the resolution listing for one date
pub(crate) fn day_url(base: &str, date: &str, count: u32) -> String {
    format!("{base}/BetaWebFechaAp?OpenView&RestrictToCategory={date}&ExpandView&Count={count}")
}

/// Extract date tokens from the date-listing document, in document order
pub(crate) fn parse_dates(html: &str) -> Result<Vec<String>> {
    let doc = Html::parse_document(html);
    let font = compile(LISTING_FONT)?;

    let mut dates = Vec::new();
    for element in doc.select(&font) {
        for child in element.children() {
            if let Some(text) = child.value().as_text() {
                dates.push(text.to_string());
            }
        }
    }
    Ok(dates)
}

/// Extract resolution URLs from a per-date listing document
///
/// Hrefs are resolved against the portal base; one that does not resolve is
/// skipped with a warning rather than failing the listing.
pub(crate) fn parse_resolution_links(html: &str, base: &Url) -> Result<Vec<String>> {
    let doc = Html::parse_document(html);
    let link = compile(LISTING_LINK)?;

    let mut urls = Vec::new();
    for anchor in doc.select(&link) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        match base.join(href) {
            Ok(url) => urls.push(url.to_string()),
            Err(e) => tracing::warn!(href, error = %e, "skipping unresolvable link"),
        }
    }
    Ok(urls)
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BASE_URL;

    const DATE_LISTING: &str = r#"<html><body><table>
      <tr><td><font size="2" face="Arial">01.02.2023</font></td></tr>
      <tr><td><font size="2" face="Arial">02.02.2023</font></td></tr>
      <tr><td><font size="3" face="Arial">not a date</font></td></tr>
      <tr><td><font size="2" face="Times">neither</font></td></tr>
      <tr><td><font size="2" face="Arial">03.02.2023</font></td></tr>
    </table></body></html>"#;

    const DAY_LISTING: &str = r#"<html><body><table>
      <tr><td><font size="2" face="Arial"><a href="/asl/sistemas/Gestar/resoluci.nsf/res/1?OpenDocument">1/23</a></font></td></tr>
      <tr><td><font size="2" face="Arial"><a href="/asl/sistemas/Gestar/resoluci.nsf/res/2?OpenDocument">2/23</a></font></td></tr>
      <tr><td><font size="2" face="Arial">no link here</font></td></tr>
      <tr><td><font size="3" face="Arial"><a href="/ignored">nav</a></font></td></tr>
    </table></body></html>"#;

    #[test]
    fn dates_url_carries_the_count_cap() {
        assert_eq!(
            dates_url(DEFAULT_BASE_URL, 30_000),
            "http://www.montevideo.gub.uy/asl/sistemas/Gestar/resoluci.nsf/BetaWebFechaApAsc?OpenView&Start=1&Count=30000"
        );
    }

    #[test]
    fn day_url_filters_by_date() {
        assert_eq!(
            day_url(DEFAULT_BASE_URL, "01.02.2023", 500),
            "http://www.montevideo.gub.uy/asl/sistemas/Gestar/resoluci.nsf/BetaWebFechaAp?OpenView&RestrictToCategory=01.02.2023&ExpandView&Count=500"
        );
    }

    #[test]
    fn parse_dates_keeps_document_order_and_skips_other_fonts() {
        let dates = parse_dates(DATE_LISTING).unwrap();
        assert_eq!(dates, vec!["01.02.2023", "02.02.2023", "03.02.2023"]);
    }

    #[test]
    fn parse_dates_of_an_empty_document_is_empty() {
        assert!(parse_dates("<html><body></body></html>").unwrap().is_empty());
    }

    #[test]
    fn parse_links_resolves_against_the_base() {
        let base = Url::parse(DEFAULT_BASE_URL).unwrap();
        let urls = parse_resolution_links(DAY_LISTING, &base).unwrap();
        assert_eq!(
            urls,
            vec![
                "http://www.montevideo.gub.uy/asl/sistemas/Gestar/resoluci.nsf/res/1?OpenDocument",
                "http://www.montevideo.gub.uy/asl/sistemas/Gestar/resoluci.nsf/res/2?OpenDocument",
            ]
        );
    }

    #[test]
    fn root_relative_href_resolves_to_the_base_host() {
        let base = Url::parse(DEFAULT_BASE_URL).unwrap();
        let listing = r#"<font size="2" face="Arial"><a href="/foo?x=1">x</a></font>"#;
        let urls = parse_resolution_links(listing, &base).unwrap();
        assert_eq!(urls, vec!["http://www.montevideo.gub.uy/foo?x=1"]);
    }

    #[test]
    fn absolute_href_passes_through_unchanged() {
        let base = Url::parse(DEFAULT_BASE_URL).unwrap();
        let listing =
            r#"<font size="2" face="Arial"><a href="http://other.example/res">x</a></font>"#;
        let urls = parse_resolution_links(listing, &base).unwrap();
        assert_eq!(urls, vec!["http://other.example/res"]);
    }
}
