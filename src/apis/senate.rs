use crate::apis::flatten_metadata;
use crate::error::Result;
use crate::parser::{elements, XmlDocument, XmlElement};
use crate::types::{Chamber, SenateAssignment, Senator, SenateTables};
use chrono::NaiveDateTime;
use tracing::{info, instrument};

/// Flatten a whole `senators` document.
#[instrument(skip_all)]
pub fn flatten_document(doc: &XmlDocument, retrieved_at: NaiveDateTime) -> Result<SenateTables> {
    let root = doc.root_element(Chamber::Senate.root_tag())?;
    let metadata = flatten_metadata(doc, Chamber::Senate, retrieved_at)?;

    let mut senators = Vec::new();
    let mut assignments = Vec::new();
    for (i, senator) in elements(root.child("senator"), "senator").enumerate() {
        let context = format!("senator[{i}]");
        senators.push(flatten_senator(senator).map_err(|e| e.in_context(&context))?);
        assignments
            .extend(flatten_senator_assignments(senator).map_err(|e| e.in_context(&context))?);
    }

    info!(
        senators = senators.len(),
        assignments = assignments.len(),
        "Flattened Senate roster"
    );

    Ok(SenateTables {
        metadata,
        senators,
        assignments,
    })
}

pub fn flatten_senator(senator: &XmlElement) -> Result<Senator> {
    let name = senator.require_element("name")?;
    let name_part = |part: &str| name.require_text(part).map_err(|e| e.in_context("name"));

    Ok(Senator {
        state: senator.require_text("state")?,
        bioguideid: senator.require_text("bioguideId")?,
        member_id: senator.require_attr("lis_member_id")?,
        first_name: name_part("first")?,
        last_name: name_part("last")?,
        suffix: name_part("suffix")?,
        party: senator.require_text("party")?,
        town: senator.require_text("homeTown")?,
        office: senator.require_text("office")?,
        state_rank: senator.require_text("stateRank")?,
    })
}

/// One record per `committees/committee` entry of a senator.
///
/// The committee name is the entry's text content. `position` is `None`
/// unless the entry carries a non-empty `position` attribute.
pub fn flatten_senator_assignments(senator: &XmlElement) -> Result<Vec<SenateAssignment>> {
    let bioguideid = senator.require_text("bioguideId")?;
    let name = senator.require_element("name")?;
    let first_name = name.require_text("first").map_err(|e| e.in_context("name"))?;
    let last_name = name.require_text("last").map_err(|e| e.in_context("name"))?;

    let Some(committees) = elements(senator.child("committees"), "committees").next() else {
        return Ok(Vec::new());
    };

    elements(committees.child("committee"), "committee")
        .map(|entry| {
            Ok(SenateAssignment {
                bioguideid: bioguideid.clone(),
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                comcode: entry
                    .require_attr("code")
                    .map_err(|e| e.in_context("committees/committee"))?,
                comname: entry.text().to_string(),
                position: entry.optional_attr("position"),
            })
        })
        .collect()
}
