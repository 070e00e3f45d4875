use crate::apis::flatten_metadata;
use crate::error::Result;
use crate::parser::{elements, XmlDocument, XmlElement};
use crate::types::{
    AssignmentKind, Chamber, Committee, HouseAssignment, HouseMember, HouseTables, Subcommittee,
};
use chrono::NaiveDateTime;
use tracing::{debug, info, instrument};

/// Flatten a whole `MemberData` document.
///
/// Any missing required field aborts the flatten; nothing is returned for a
/// partially readable feed.
#[instrument(skip_all)]
pub fn flatten_document(doc: &XmlDocument, retrieved_at: NaiveDateTime) -> Result<HouseTables> {
    let root = doc.root_element(Chamber::House.root_tag())?;
    let metadata = flatten_metadata(doc, Chamber::House, retrieved_at)?;

    let members_node = root
        .require_element("members")
        .map_err(|e| e.in_context("MemberData"))?;
    let mut members = Vec::new();
    let mut assignments = Vec::new();
    for (i, member) in elements(members_node.child("member"), "member").enumerate() {
        let context = format!("members/member[{i}]");
        members.push(flatten_member(member).map_err(|e| e.in_context(&context))?);
        assignments
            .extend(flatten_member_assignments(member).map_err(|e| e.in_context(&context))?);
    }

    let committees_node = root
        .require_element("committees")
        .map_err(|e| e.in_context("MemberData"))?;
    let mut committees = Vec::new();
    let mut subcommittees = Vec::new();
    for (i, committee) in elements(committees_node.child("committee"), "committee").enumerate() {
        let context = format!("committees/committee[{i}]");
        committees.push(flatten_committee(committee).map_err(|e| e.in_context(&context))?);
        for sub in flatten_subcommittees(committee).map_err(|e| e.in_context(&context))? {
            subcommittees.push(sub.map_err(|e| e.in_context(&context))?);
        }
    }

    info!(
        members = members.len(),
        committees = committees.len(),
        subcommittees = subcommittees.len(),
        assignments = assignments.len(),
        "Flattened House roster"
    );

    Ok(HouseTables {
        metadata,
        members,
        committees,
        subcommittees,
        assignments,
    })
}

/// Project one `<member>` onto a [`HouseMember`].
pub fn flatten_member(member: &XmlElement) -> Result<HouseMember> {
    let mi = member.require_element("member-info")?;
    let state = mi
        .require_element("state")
        .map_err(|e| e.in_context("member-info"))?;
    let elected = mi
        .require_element("elected-date")
        .map_err(|e| e.in_context("member-info"))?;
    let sworn = mi
        .require_element("sworn-date")
        .map_err(|e| e.in_context("member-info"))?;
    let text = |name: &str| mi.require_text(name).map_err(|e| e.in_context("member-info"));

    Ok(HouseMember {
        state_district: member.require_text("statedistrict")?,
        bioguide_id: text("bioguideID")?,
        sortable_name: text("sort-name")?,
        full_name: text("namelist")?,
        title: text("courtesy")?,
        first_name: text("firstname")?,
        middle_name: text("middlename")?,
        last_name: text("lastname")?,
        suffix: text("suffix")?,
        official_name: text("official-name")?,
        formal_name: text("formal-name")?,
        prior_congress: text("prior-congress")?,
        party: text("party")?,
        caucus: text("caucus")?,
        state_code: state
            .require_attr("postal-code")
            .map_err(|e| e.in_context("member-info/state"))?,
        state: state
            .require_text("state-fullname")
            .map_err(|e| e.in_context("member-info/state"))?,
        district: text("district")?,
        town: text("townname")?,
        office_building: text("office-building")?,
        office_room: text("office-room")?,
        office_zip: text("office-zip")?,
        office_zip_suffix: text("office-zip-suffix")?,
        phone: text("phone")?,
        last_elected_date: elected
            .require_attr("date")
            .map_err(|e| e.in_context("member-info/elected-date"))?,
        sworn_date: sworn
            .require_attr("date")
            .map_err(|e| e.in_context("member-info/sworn-date"))?,
    })
}

/// Project one `<committee>` onto a [`Committee`]. Subcommittees are read
/// separately by [`flatten_subcommittees`].
pub fn flatten_committee(committee: &XmlElement) -> Result<Committee> {
    let ratio = committee.require_element("ratio")?;
    Ok(Committee {
        comcode: committee.require_attr("comcode")?,
        comtype: committee.require_attr("type")?,
        comname: committee.require_text("committee-fullname")?,
        majority: ratio
            .require_text("majority")
            .map_err(|e| e.in_context("ratio"))?,
        minority: ratio
            .require_text("minority")
            .map_err(|e| e.in_context("ratio"))?,
        building: committee.require_attr("com-building-code")?,
        room: committee.require_attr("com-room")?,
        phone: committee.require_attr("com-phone")?,
    })
}

/// Lazily flatten the subcommittees of one `<committee>`.
///
/// The `subcommittee` child is a single element when the committee has one
/// subcommittee and a list otherwise; both read as a sequence here.
/// Non-element entries are skipped.
pub fn flatten_subcommittees(
    committee: &XmlElement,
) -> Result<impl Iterator<Item = Result<Subcommittee>> + '_> {
    let parent_com = committee.require_text("committee-fullname")?;
    let parent_com_code = committee.require_attr("comcode")?;

    Ok(
        elements(committee.child("subcommittee"), "subcommittee").map(move |sub| {
            flatten_subcommittee(sub, &parent_com, &parent_com_code)
                .map_err(|e| e.in_context("subcommittee"))
        }),
    )
}

fn flatten_subcommittee(
    sub: &XmlElement,
    parent_com: &str,
    parent_com_code: &str,
) -> Result<Subcommittee> {
    let ratio = sub.require_element("ratio")?;
    Ok(Subcommittee {
        subcode: sub.require_attr("subcomcode")?,
        subcomname: sub.require_text("subcommittee-fullname")?,
        parent_com: parent_com.to_string(),
        parent_com_code: parent_com_code.to_string(),
        building: sub.require_attr("subcom-building-code")?,
        room: sub.require_attr("subcom-room")?,
        phone: sub.require_attr("subcom-phone")?,
        majority: ratio
            .require_text("majority")
            .map_err(|e| e.in_context("ratio"))?,
        minority: ratio
            .require_text("minority")
            .map_err(|e| e.in_context("ratio"))?,
    })
}

/// Flatten a member's `committee-assignments` into one record per seat.
///
/// Committee seats come first, then subcommittee seats, each in document
/// order. Entries without a code attribute are placeholders and are
/// skipped. `leadership` is `None` unless the feed gives a non-empty label.
pub fn flatten_member_assignments(member: &XmlElement) -> Result<Vec<HouseAssignment>> {
    let state_district = member.require_text("statedistrict")?;
    let mi = member.require_element("member-info")?;
    let bioguide_id = mi
        .require_text("bioguideID")
        .map_err(|e| e.in_context("member-info"))?;
    let sortable_name = mi
        .require_text("sort-name")
        .map_err(|e| e.in_context("member-info"))?;

    // Vacant seats carry an empty <committee-assignments/>
    let Some(seats) = elements(member.child("committee-assignments"), "committee-assignments").next()
    else {
        return Ok(Vec::new());
    };

    let mut assignments = Vec::new();
    for (kind, tag, code_attr) in [
        (AssignmentKind::Committee, "committee", "comcode"),
        (AssignmentKind::Subcommittee, "subcommittee", "subcomcode"),
    ] {
        for seat in elements(seats.child(tag), tag) {
            let Some(comcode) = seat.optional_attr(code_attr) else {
                debug!(bioguide_id = %bioguide_id, tag, "skipping assignment without code");
                continue;
            };
            let comrank = seat
                .require_attr("rank")
                .map_err(|e| e.in_context(format!("committee-assignments/{tag}[{comcode}]")))?;
            assignments.push(HouseAssignment {
                state_district: state_district.clone(),
                bioguide_id: bioguide_id.clone(),
                sortable_name: sortable_name.clone(),
                comtype: kind,
                comcode,
                comrank,
                leadership: seat.optional_attr("leadership"),
            });
        }
    }

    Ok(assignments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RosterError;
    use crate::parser::{one_or_many, parse_document};

    fn element(xml: &str) -> XmlElement {
        let doc = parse_document(xml.as_bytes()).unwrap();
        let name = doc.root_name().to_string();
        doc.root_element(&name).unwrap().clone()
    }

    const MEMBER: &str = r#"
        <member>
          <statedistrict>AK00</statedistrict>
          <member-info>
            <namelist>Peltola, Mary</namelist>
            <bioguideID>P000619</bioguideID>
            <lastname>Peltola</lastname>
            <firstname>Mary</firstname>
            <middlename/>
            <sort-name>PELTOLA,MARY</sort-name>
            <suffix/>
            <courtesy>Mrs.</courtesy>
            <prior-congress>117</prior-congress>
            <official-name>Mary Sattler Peltola</official-name>
            <formal-name>Mrs. Peltola</formal-name>
            <party>D</party>
            <caucus>D</caucus>
            <state postal-code="AK"><state-fullname>Alaska</state-fullname></state>
            <district>At Large</district>
            <townname>Bethel</townname>
            <office-building>CHOB</office-building>
            <office-room>153</office-room>
            <office-zip>20515</office-zip>
            <office-zip-suffix>0200</office-zip-suffix>
            <phone>(202) 225-5765</phone>
            <elected-date date="20221108">November  8, 2022</elected-date>
            <sworn-date date="20230103">January  3, 2023</sworn-date>
          </member-info>
          <committee-assignments>
            <committee comcode="II00" rank="14"/>
            <committee comcode="AG00" rank="20" leadership="Ranking Member"/>
            <subcommittee subcomcode="II13" rank="4"/>
          </committee-assignments>
        </member>"#;

    const COMMITTEE: &str = r#"
        <committee type="standing" comcode="AG00" com-room="1301" com-header-text="" com-zip="6001" com-building-code="LHOB" com-phone="(202) 225-2171">
          <committee-fullname>Committee on Agriculture</committee-fullname>
          <ratio><majority>29</majority><minority>25</minority></ratio>
          <subcommittee subcomcode="AG03" subcom-building-code="LHOB" subcom-room="1301" subcom-zip="6001" subcom-phone="(202) 225-2171">
            <subcommittee-fullname>Conservation, Research, and Biotechnology</subcommittee-fullname>
            <ratio><majority>8</majority><minority>6</minority></ratio>
          </subcommittee>
        </committee>"#;

    #[test]
    fn member_fields_are_projected() {
        let member = flatten_member(&element(MEMBER)).unwrap();
        assert_eq!(member.state_district, "AK00");
        assert_eq!(member.bioguide_id, "P000619");
        assert_eq!(member.sortable_name, "PELTOLA,MARY");
        assert_eq!(member.middle_name, "");
        assert_eq!(member.state_code, "AK");
        assert_eq!(member.state, "Alaska");
        assert_eq!(member.last_elected_date, "20221108");
        assert_eq!(member.sworn_date, "20230103");
    }

    #[test]
    fn member_missing_field_names_the_path() {
        let xml = MEMBER.replace("<caucus>D</caucus>", "");
        let err = flatten_member(&element(&xml)).unwrap_err();
        assert!(matches!(err, RosterError::MissingField(f) if f == "member-info/caucus"));
    }

    #[test]
    fn committee_fields_are_projected() {
        let committee = flatten_committee(&element(COMMITTEE)).unwrap();
        assert_eq!(committee.comcode, "AG00");
        assert_eq!(committee.comtype, "standing");
        assert_eq!(committee.comname, "Committee on Agriculture");
        assert_eq!(committee.majority, "29");
        assert_eq!(committee.minority, "25");
        assert_eq!(committee.building, "LHOB");
    }

    #[test]
    fn single_subcommittee_yields_one_record_with_parent_code() {
        let committee = element(COMMITTEE);
        assert_eq!(one_or_many(committee.child("subcommittee")).count(), 1);

        let subs: Vec<_> = flatten_subcommittees(&committee)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].subcode, "AG03");
        assert_eq!(subs[0].parent_com_code, "AG00");
        assert_eq!(subs[0].parent_com, "Committee on Agriculture");
        assert_eq!(subs[0].majority, "8");
    }

    #[test]
    fn subcommittee_list_and_placeholders() {
        let xml = r#"
            <committee type="standing" comcode="II00" com-room="1324" com-building-code="LHOB" com-phone="(202) 225-2761">
              <committee-fullname>Committee on Natural Resources</committee-fullname>
              <ratio><majority>25</majority><minority>20</minority></ratio>
              <subcommittee subcomcode="II06" subcom-building-code="LHOB" subcom-room="1324" subcom-phone="(202) 225-2761">
                <subcommittee-fullname>Water, Wildlife and Fisheries</subcommittee-fullname>
                <ratio><majority>9</majority><minority>7</minority></ratio>
              </subcommittee>
              <subcommittee/>
              <subcommittee subcomcode="II13" subcom-building-code="LHOB" subcom-room="1324" subcom-phone="(202) 225-2761">
                <subcommittee-fullname>Indian and Insular Affairs</subcommittee-fullname>
                <ratio><majority>6</majority><minority>5</minority></ratio>
              </subcommittee>
            </committee>"#;
        let committee = element(xml);
        let subs: Vec<_> = flatten_subcommittees(&committee)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        let codes: Vec<_> = subs.iter().map(|s| s.subcode.as_str()).collect();
        assert_eq!(codes, vec!["II06", "II13"]);
        assert!(subs.iter().all(|s| s.parent_com_code == "II00"));
    }

    #[test]
    fn committee_without_subcommittees_yields_none() {
        let xml = COMMITTEE.split("<subcommittee ").next().unwrap().to_string() + "</committee>";
        let committee = element(&xml);
        assert_eq!(flatten_subcommittees(&committee).unwrap().count(), 0);
    }

    #[test]
    fn assignments_cover_committees_then_subcommittees() {
        let assignments = flatten_member_assignments(&element(MEMBER)).unwrap();
        assert_eq!(assignments.len(), 3);

        assert_eq!(assignments[0].comtype, AssignmentKind::Committee);
        assert_eq!(assignments[0].comcode, "II00");
        assert_eq!(assignments[0].comrank, "14");
        assert_eq!(assignments[0].leadership, None);

        assert_eq!(assignments[1].leadership.as_deref(), Some("Ranking Member"));

        assert_eq!(assignments[2].comtype, AssignmentKind::Subcommittee);
        assert_eq!(assignments[2].comcode, "II13");
        assert!(assignments
            .iter()
            .all(|a| a.bioguide_id == "P000619" && a.state_district == "AK00"));
    }

    #[test]
    fn member_without_subcommittee_key_has_only_committee_seats() {
        let xml = MEMBER.replace(r#"<subcommittee subcomcode="II13" rank="4"/>"#, "");
        let assignments = flatten_member_assignments(&element(&xml)).unwrap();
        assert_eq!(assignments.len(), 2);
        assert!(assignments
            .iter()
            .all(|a| a.comtype == AssignmentKind::Committee));
    }

    #[test]
    fn single_committee_seat_is_read_as_sequence() {
        let xml = MEMBER
            .replace(r#"<committee comcode="II00" rank="14"/>"#, "")
            .replace(r#"<subcommittee subcomcode="II13" rank="4"/>"#, "");
        let assignments = flatten_member_assignments(&element(&xml)).unwrap();
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].comcode, "AG00");
    }

    #[test]
    fn seats_without_code_are_skipped() {
        let xml = MEMBER.replace(
            r#"<committee comcode="II00" rank="14"/>"#,
            r#"<committee rank="1"/><committee/>"#,
        );
        let assignments = flatten_member_assignments(&element(&xml)).unwrap();
        let codes: Vec<_> = assignments.iter().map(|a| a.comcode.as_str()).collect();
        assert_eq!(codes, vec!["AG00", "II13"]);
    }

    #[test]
    fn empty_leadership_is_absent() {
        let xml = MEMBER.replace(
            r#"<committee comcode="II00" rank="14"/>"#,
            r#"<committee comcode="II00" rank="14" leadership=""/>"#,
        );
        let assignments = flatten_member_assignments(&element(&xml)).unwrap();
        assert!(assignments
            .iter()
            .all(|a| a.leadership.as_deref().map_or(true, |l| !l.is_empty())));
        assert_eq!(assignments[0].leadership, None);
    }

    #[test]
    fn vacant_seat_has_no_assignments() {
        let start = MEMBER.find("<committee-assignments>").unwrap();
        let end = MEMBER.find("</committee-assignments>").unwrap() + "</committee-assignments>".len();
        let xml = format!("{}<committee-assignments/>{}", &MEMBER[..start], &MEMBER[end..]);
        assert!(flatten_member_assignments(&element(&xml)).unwrap().is_empty());
    }

    #[test]
    fn seat_without_rank_is_an_error() {
        let xml = MEMBER.replace(r#"rank="14""#, "");
        let err = flatten_member_assignments(&element(&xml)).unwrap_err();
        assert!(matches!(
            err,
            RosterError::MissingField(f) if f == "committee-assignments/committee[II00]/@rank"
        ));
    }
}
