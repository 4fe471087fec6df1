//! Parsing of WebDAV `207 Multi-Status` PROPFIND responses.

use super::{ShareEntry, file_name, normalize_path};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::Event;

/// Property currently being read
#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Href,
    ContentLength,
    LastModified,
    Other,
}

#[derive(Default)]
struct ResponseBuilder {
    href: Option<String>,
    size: u64,
    is_directory: bool,
    last_modified: Option<DateTime<Utc>>,
}

/// Parse a multistatus document into share entries
///
/// `base_path` is the path component of the share's base URL; it is stripped from hrefs
/// so that entry paths are relative to the share root. Namespace prefixes are ignored.
pub fn parse(xml: &str, base_path: &str) -> Result<Vec<ShareEntry>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<ResponseBuilder> = None;
    let mut field = Field::Other;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"response" => current = Some(ResponseBuilder::default()),
                b"href" => field = Field::Href,
                b"getcontentlength" => field = Field::ContentLength,
                b"getlastmodified" => field = Field::LastModified,
                b"collection" => mark_collection(&mut current),
                _ => field = Field::Other,
            },
            Ok(Event::Empty(ref e)) => {
                if e.local_name().as_ref() == b"collection" {
                    mark_collection(&mut current);
                }
            }
            Ok(Event::Text(ref t)) => {
                let Some(builder) = current.as_mut() else {
                    continue;
                };
                let text = t
                    .unescape()
                    .map_err(|e| Error::Share(format!("invalid multistatus text: {e}")))?;
                match field {
                    Field::Href => builder.href = Some(text.into_owned()),
                    Field::ContentLength => builder.size = text.trim().parse().unwrap_or(0),
                    Field::LastModified => {
                        builder.last_modified = DateTime::parse_from_rfc2822(text.trim())
                            .ok()
                            .map(|t| t.with_timezone(&Utc));
                    }
                    Field::Other => {}
                }
            }
            Ok(Event::End(ref e)) => {
                if e.local_name().as_ref() == b"response"
                    && let Some(builder) = current.take()
                    && let Some(entry) = builder.build(base_path)
                {
                    entries.push(entry);
                }
                field = Field::Other;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Share(format!(
                    "malformed multistatus at position {}: {e}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
    }

    Ok(entries)
}

fn mark_collection(current: &mut Option<ResponseBuilder>) {
    if let Some(builder) = current.as_mut() {
        builder.is_directory = true;
    }
}

impl ResponseBuilder {
    fn build(self, base_path: &str) -> Option<ShareEntry> {
        let href = self.href?;
        let path = href_to_path(&href, base_path);
        Some(ShareEntry {
            name: file_name(&path).to_string(),
            path,
            is_directory: self.is_directory,
            size: if self.is_directory { 0 } else { self.size },
            last_modified: self.last_modified,
        })
    }
}

/// Turn an href (absolute URL or absolute path, percent-encoded) into a share path
fn href_to_path(href: &str, base_path: &str) -> String {
    let raw_path = match url::Url::parse(href) {
        Ok(url) => url.path().to_string(),
        Err(_) => href.to_string(),
    };
    let decoded = urlencoding::decode(&raw_path)
        .map(|d| d.into_owned())
        .unwrap_or(raw_path);

    let path = normalize_path(&decoded);
    let base = normalize_path(base_path);
    if base == "/" {
        return path;
    }
    match path.strip_prefix(&base) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => normalize_path(rest),
        _ => path,
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/content/Movies/My.Movie.2024/</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype><D:collection/></D:resourcetype>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/content/Movies/My.Movie.2024/My.Movie.2024.mkv</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype/>
        <D:getcontentlength>4200000000</D:getcontentlength>
        <D:getlastmodified>Tue, 02 Jan 2024 10:00:00 GMT</D:getlastmodified>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/content/Movies/My.Movie.2024/Sub%20Folder/</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype><D:collection></D:collection></D:resourcetype>
      </D:prop>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    #[test]
    fn test_parse_listing() {
        let entries = parse(LISTING, "/").unwrap();
        assert_eq!(entries.len(), 3);

        assert!(entries[0].is_directory);
        assert_eq!(entries[0].path, "/content/Movies/My.Movie.2024");

        let file = &entries[1];
        assert!(!file.is_directory);
        assert_eq!(file.name, "My.Movie.2024.mkv");
        assert_eq!(file.size, 4_200_000_000);
        assert!(file.last_modified.is_some());

        assert!(entries[2].is_directory);
        assert_eq!(entries[2].name, "Sub Folder");
    }

    #[test]
    fn test_href_with_base_path_and_absolute_url() {
        assert_eq!(
            href_to_path("http://dav:3000/dav/content/TV/a.mkv", "/dav"),
            "/content/TV/a.mkv"
        );
        assert_eq!(href_to_path("/dav/", "/dav"), "/");
        assert_eq!(href_to_path("/davx/a.mkv", "/dav"), "/davx/a.mkv");
        assert_eq!(href_to_path("/a%26b/c.mkv", "/"), "/a&b/c.mkv");
    }

    #[test]
    fn test_unprefixed_namespace() {
        let xml = r#"<multistatus xmlns="DAV:"><response><href>/x/y.mp4</href>
            <propstat><prop><getcontentlength>12</getcontentlength></prop></propstat>
            </response></multistatus>"#;
        let entries = parse(xml, "/").unwrap();
        assert_eq!(entries, vec![ShareEntry::file("/x/y.mp4", 12)]);
    }

    #[test]
    fn test_malformed_document() {
        let result = parse("<D:multistatus><D:response></D:multistatus>", "/");
        assert!(matches!(result, Err(Error::Share(_))));
    }
}
