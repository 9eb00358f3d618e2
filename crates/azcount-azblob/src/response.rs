//! `List Containers` response bodies.

use azcount_core::{ContainerItem, Page};
use serde::Deserialize;

use crate::error::Result;

/// Root element of a `List Containers` response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename = "EnumerationResults")]
pub(crate) struct EnumerationResults {
    #[serde(rename = "Containers", default)]
    containers: Containers,
    #[serde(rename = "NextMarker", default)]
    next_marker: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Containers {
    #[serde(rename = "Container", default)]
    entries: Vec<ContainerEntry>,
}

#[derive(Debug, Deserialize)]
struct ContainerEntry {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Deleted", default)]
    deleted: bool,
    #[serde(rename = "Version", default)]
    version: Option<String>,
}

impl EnumerationResults {
    /// Decodes a response body.
    pub fn from_xml(body: &str) -> Result<Self> {
        let body = body.trim_start_matches('\u{feff}');
        Ok(quick_xml::de::from_str(body)?)
    }

    /// Continuation marker, `None` once the listing is exhausted.
    pub fn next_marker(&self) -> Option<&str> {
        self.next_marker
            .as_deref()
            .map(str::trim)
            .filter(|marker| !marker.is_empty())
    }

    /// Splits the response into its page and continuation marker.
    pub fn into_page(self) -> (Page, Option<String>) {
        let next_marker = self.next_marker().map(str::to_owned);
        let page = self
            .containers
            .entries
            .into_iter()
            .map(|entry| ContainerItem {
                name: entry.name,
                deleted: entry.deleted,
                version: entry.version,
            })
            .collect();

        (page, next_marker)
    }
}

/// Error body returned with non-success statuses.
#[derive(Debug, Default, Deserialize)]
#[serde(rename = "Error")]
pub(crate) struct ErrorResponse {
    #[serde(rename = "Code", default)]
    pub code: Option<String>,
    #[serde(rename = "Message", default)]
    pub message: Option<String>,
}

impl ErrorResponse {
    /// Decodes an error body, yielding `None` when it is not the usual XML.
    pub fn from_xml(body: &str) -> Option<Self> {
        quick_xml::de::from_str(body.trim_start_matches('\u{feff}')).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIRST_PAGE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<EnumerationResults ServiceEndpoint="https://myaccount.blob.core.windows.net/">
  <MaxResults>2</MaxResults>
  <Containers>
    <Container>
      <Name>images</Name>
      <Properties>
        <Last-Modified>Mon, 19 Oct 2026 10:00:00 GMT</Last-Modified>
        <Etag>"0x8D9B3C1A2B3C4D5"</Etag>
        <LeaseStatus>unlocked</LeaseStatus>
        <LeaseState>available</LeaseState>
      </Properties>
    </Container>
    <Container>
      <Name>logs</Name>
      <Properties>
        <Last-Modified>Mon, 19 Oct 2026 11:00:00 GMT</Last-Modified>
      </Properties>
    </Container>
  </Containers>
  <NextMarker>/myaccount/logs</NextMarker>
</EnumerationResults>"#;

    const LAST_PAGE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<EnumerationResults ServiceEndpoint="https://myaccount.blob.core.windows.net/">
  <Marker>/myaccount/logs</Marker>
  <MaxResults>2</MaxResults>
  <Containers>
    <Container>
      <Name>videos</Name>
      <Deleted>true</Deleted>
      <Version>01D60F8BB59A4652</Version>
    </Container>
  </Containers>
  <NextMarker />
</EnumerationResults>"#;

    #[test]
    fn decodes_page_with_marker() {
        let (page, marker) = EnumerationResults::from_xml(FIRST_PAGE)
            .unwrap()
            .into_page();
        assert_eq!(page.len(), 2);
        assert_eq!(page.items()[0].name, "images");
        assert_eq!(page.items()[1].name, "logs");
        assert_eq!(marker.as_deref(), Some("/myaccount/logs"));
    }

    #[test]
    fn empty_marker_ends_listing() {
        let (page, marker) = EnumerationResults::from_xml(LAST_PAGE)
            .unwrap()
            .into_page();
        assert_eq!(page.len(), 1);
        assert!(page.items()[0].deleted);
        assert_eq!(page.items()[0].version.as_deref(), Some("01D60F8BB59A4652"));
        assert_eq!(marker, None);
    }

    #[test]
    fn empty_container_list() {
        let body = "\u{feff}<?xml version=\"1.0\" encoding=\"utf-8\"?>\
            <EnumerationResults ServiceEndpoint=\"https://myaccount.blob.core.windows.net/\">\
            <MaxResults>100</MaxResults><Containers /><NextMarker /></EnumerationResults>";
        let (page, marker) = EnumerationResults::from_xml(body).unwrap().into_page();
        assert!(page.is_empty());
        assert_eq!(marker, None);
    }

    #[test]
    fn rejects_malformed_body() {
        assert!(EnumerationResults::from_xml("<EnumerationResults><Containers>").is_err());
    }

    #[test]
    fn decodes_error_body() {
        let body = r#"<?xml version="1.0" encoding="utf-8"?>
<Error>
  <Code>AuthorizationPermissionMismatch</Code>
  <Message>This request is not authorized to perform this operation using this permission.</Message>
</Error>"#;
        let error = ErrorResponse::from_xml(body).unwrap();
        assert_eq!(
            error.code.as_deref(),
            Some("AuthorizationPermissionMismatch")
        );
        assert!(error.message.unwrap().starts_with("This request"));
    }
}
