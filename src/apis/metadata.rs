use crate::constants::{PUBLISH_DATE_COLUMN, RETRIEVED_AT_COLUMN, RETRIEVED_AT_FORMAT};
use crate::error::{Result, RosterError};
use crate::parser::{XmlDocument, XmlNode};
use crate::types::{Chamber, MetadataRecord};
use chrono::NaiveDateTime;

/// Flatten the feed's publication details into a single record.
///
/// House: the scalar fields of `MemberData/title-info`, the root
/// `publish-date` attribute, then the retrieval time. Senate: the scalar
/// fields of `senators/lastUpdate`, then the retrieval time.
pub fn flatten_metadata(
    doc: &XmlDocument,
    chamber: Chamber,
    retrieved_at: NaiveDateTime,
) -> Result<MetadataRecord> {
    let root = doc.root_element(chamber.root_tag())?;
    let mut record = MetadataRecord::new();

    match chamber {
        Chamber::House => {
            let info = root
                .child("title-info")
                .ok_or_else(|| RosterError::MissingField("MemberData/title-info".into()))?;
            push_scalar_fields(&mut record, "title-info", info);
            let published = root
                .require_attr(PUBLISH_DATE_COLUMN)
                .map_err(|e| e.in_context("MemberData"))?;
            record.insert(PUBLISH_DATE_COLUMN, published);
        }
        Chamber::Senate => {
            let update = root
                .child("lastUpdate")
                .ok_or_else(|| RosterError::MissingField("senators/lastUpdate".into()))?;
            push_scalar_fields(&mut record, "lastUpdate", update);
        }
    }

    record.insert(
        RETRIEVED_AT_COLUMN,
        retrieved_at.format(RETRIEVED_AT_FORMAT).to_string(),
    );
    Ok(record)
}

/// Attributes first, then one column per child element holding its text.
fn push_scalar_fields(record: &mut MetadataRecord, name: &str, node: &XmlNode) {
    match node {
        XmlNode::Element(el) => {
            for (key, value) in el.attributes() {
                record.insert(key, value);
            }
            for (key, child) in el.children() {
                record.insert(key, child.text());
            }
            if !el.text().is_empty() {
                record.insert(name, el.text());
            }
        }
        XmlNode::Text(text) => record.insert(name, text.as_str()),
        XmlNode::List(items) => {
            if let Some(first) = items.first() {
                push_scalar_fields(record, name, first);
            }
        }
    }
}
