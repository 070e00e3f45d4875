use serde::Serialize;
use std::fmt;

/// The two legislative bodies whose rosters are ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chamber {
    House,
    Senate,
}

impl Chamber {
    pub fn as_str(&self) -> &'static str {
        match self {
            Chamber::House => "house",
            Chamber::Senate => "senate",
        }
    }

    /// Root tag of the chamber's feed.
    pub fn root_tag(&self) -> &'static str {
        match self {
            Chamber::House => "MemberData",
            Chamber::Senate => "senators",
        }
    }
}

impl fmt::Display for Chamber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flat record with a fixed column order.
///
/// `COLUMNS` must list the serialized field names in declaration order; it
/// is used for the header row so empty tables still get one.
pub trait TableRecord: Serialize {
    const COLUMNS: &'static [&'static str];
}

/// Per-run feed metadata. Columns depend on what the feed publishes, so the
/// record keeps its own ordered keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRecord {
    fields: Vec<(String, String)>,
}

impl MetadataRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column, replacing an earlier value under the same name in place.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A member of the House, one per seat listed in the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HouseMember {
    pub state_district: String,
    pub bioguide_id: String,
    pub sortable_name: String,
    pub full_name: String,
    pub title: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub suffix: String,
    pub official_name: String,
    pub formal_name: String,
    pub prior_congress: String,
    pub party: String,
    pub caucus: String,
    pub state_code: String,
    pub state: String,
    pub district: String,
    pub town: String,
    pub office_building: String,
    pub office_room: String,
    pub office_zip: String,
    pub office_zip_suffix: String,
    pub phone: String,
    pub last_elected_date: String,
    pub sworn_date: String,
}

impl TableRecord for HouseMember {
    const COLUMNS: &'static [&'static str] = &[
        "state_district",
        "bioguide_id",
        "sortable_name",
        "full_name",
        "title",
        "first_name",
        "middle_name",
        "last_name",
        "suffix",
        "official_name",
        "formal_name",
        "prior_congress",
        "party",
        "caucus",
        "state_code",
        "state",
        "district",
        "town",
        "office_building",
        "office_room",
        "office_zip",
        "office_zip_suffix",
        "phone",
        "last_elected_date",
        "sworn_date",
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Senator {
    pub state: String,
    pub bioguideid: String,
    pub member_id: String,
    pub first_name: String,
    pub last_name: String,
    pub suffix: String,
    pub party: String,
    pub town: String,
    pub office: String,
    pub state_rank: String,
}

impl TableRecord for Senator {
    const COLUMNS: &'static [&'static str] = &[
        "state",
        "bioguideid",
        "member_id",
        "first_name",
        "last_name",
        "suffix",
        "party",
        "town",
        "office",
        "state_rank",
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Committee {
    pub comcode: String,
    pub comtype: String,
    pub comname: String,
    pub majority: String,
    pub minority: String,
    pub building: String,
    pub room: String,
    pub phone: String,
}

impl TableRecord for Committee {
    const COLUMNS: &'static [&'static str] = &[
        "comcode", "comtype", "comname", "majority", "minority", "building", "room", "phone",
    ];
}

/// A subcommittee; `parent_com_code` refers to a [`Committee`] by code only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subcommittee {
    pub subcode: String,
    pub subcomname: String,
    pub parent_com: String,
    pub parent_com_code: String,
    pub building: String,
    pub room: String,
    pub phone: String,
    pub majority: String,
    pub minority: String,
}

impl TableRecord for Subcommittee {
    const COLUMNS: &'static [&'static str] = &[
        "subcode",
        "subcomname",
        "parent_com",
        "parent_com_code",
        "building",
        "room",
        "phone",
        "majority",
        "minority",
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentKind {
    Committee,
    Subcommittee,
}

/// A House member's seat on a committee or subcommittee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HouseAssignment {
    pub state_district: String,
    pub bioguide_id: String,
    pub sortable_name: String,
    pub comtype: AssignmentKind,
    pub comcode: String,
    pub comrank: String,
    pub leadership: Option<String>,
}

impl TableRecord for HouseAssignment {
    const COLUMNS: &'static [&'static str] = &[
        "state_district",
        "bioguide_id",
        "sortable_name",
        "comtype",
        "comcode",
        "comrank",
        "leadership",
    ];
}

/// A senator's seat on a committee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SenateAssignment {
    pub bioguideid: String,
    pub first_name: String,
    pub last_name: String,
    pub comcode: String,
    pub comname: String,
    pub position: Option<String>,
}

impl TableRecord for SenateAssignment {
    const COLUMNS: &'static [&'static str] = &[
        "bioguideid",
        "first_name",
        "last_name",
        "comcode",
        "comname",
        "position",
    ];
}

/// Everything flattened from one House feed.
#[derive(Debug, Clone, Default)]
pub struct HouseTables {
    pub metadata: MetadataRecord,
    pub members: Vec<HouseMember>,
    pub committees: Vec<Committee>,
    pub subcommittees: Vec<Subcommittee>,
    pub assignments: Vec<HouseAssignment>,
}

/// Everything flattened from one Senate feed.
#[derive(Debug, Clone, Default)]
pub struct SenateTables {
    pub metadata: MetadataRecord,
    pub senators: Vec<Senator>,
    pub assignments: Vec<SenateAssignment>,
}
