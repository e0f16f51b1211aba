// ordfix-core/src/infrastructure/xml.rs

use xmltree::{Element, EmitterConfig};

use crate::domain::document::Document;
use crate::infrastructure::error::InfrastructureError;

/// Parses raw bytes into a document. The declared encoding is honoured.
pub fn parse_document(id: &str, content: &[u8]) -> Result<Document, InfrastructureError> {
    Element::parse(content)
        .map(|root| Document::new(id, root))
        .map_err(|e| InfrastructureError::XmlParse {
            document: id.to_string(),
            message: e.to_string(),
        })
}

/// Serializes a document as indented UTF-8 XML with a declaration.
///
/// Whitespace-only text is not kept by the parser, so rendering a parsed
/// document and parsing it again yields the same tree.
pub fn render_document(document: &Document) -> Result<String, InfrastructureError> {
    let write_error = |message: String| InfrastructureError::XmlWrite {
        document: document.id().to_string(),
        message,
    };

    let config = EmitterConfig::new()
        .perform_indent(true)
        .indent_string("  ");

    let mut buffer = Vec::new();
    document
        .root()
        .write_with_config(&mut buffer, config)
        .map_err(|e| write_error(e.to_string()))?;

    String::from_utf8(buffer).map_err(|e| write_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rules::TargetPath;
    use anyhow::Result;

    #[test]
    fn test_parse_failure_is_reported() {
        let result = parse_document("broken.xml", b"<Order><Open></Order>");
        assert!(matches!(
            result,
            Err(InfrastructureError::XmlParse { ref document, .. }) if document == "broken.xml"
        ));
    }

    #[test]
    fn test_render_then_parse_is_stable() -> Result<()> {
        let source = br#"<?xml version="1.0" encoding="UTF-8"?>
<Order xmlns="http://ns.hr-xml.org/2004-08-02">
  <ReferenceInformation>
    <OrderId><IdValue>FU70001236</IdValue></OrderId>
  </ReferenceInformation>
  <!-- kept -->
</Order>"#;

        let document = parse_document("a.xml", source)?;
        let rendered = render_document(&document)?;
        let reparsed = parse_document("a.xml", rendered.as_bytes())?;

        assert_eq!(render_document(&reparsed)?, rendered);
        assert!(rendered.contains("<!-- kept -->"));
        assert_eq!(
            reparsed
                .text_at(&TargetPath::parse("OrderId/IdValue")?)
                .as_deref(),
            Some("FU70001236")
        );
        Ok(())
    }
}
