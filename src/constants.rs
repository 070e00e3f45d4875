//! Feed locations and output naming shared across the crate.

// Published roster feeds
pub const HOUSE_FEED_URL: &str = "https://clerk.house.gov/xml/lists/MemberData.xml";
pub const SENATE_FEED_URL: &str = "https://www.senate.gov/legislative/LIS_MEMBER/cvc_member_data.xml";

// Environment overrides for the feed URLs
pub const HOUSE_URL_ENV: &str = "CONGRESS_HOUSE_URL";
pub const SENATE_URL_ENV: &str = "CONGRESS_SENATE_URL";

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

// HTTP defaults
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;
pub const DEFAULT_USER_AGENT: &str = concat!("congress_roster/", env!("CARGO_PKG_VERSION"));

/// Format of the `data-retrieve-datetime` metadata column.
pub const RETRIEVED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const RETRIEVED_AT_COLUMN: &str = "data-retrieve-datetime";
pub const PUBLISH_DATE_COLUMN: &str = "publish-date";

// Output files, relative to the chamber directory
pub const METADATA_FILE: &str = "metadata.csv";
pub const HOUSE_MEMBERS_FILE: &str = "house_members.csv";
pub const HOUSE_COMMITTEES_FILE: &str = "house_coms.csv";
pub const HOUSE_SUBCOMMITTEES_FILE: &str = "house_sub_coms.csv";
pub const HOUSE_ASSIGNMENTS_FILE: &str = "house_com_assignments.csv";
pub const SENATORS_FILE: &str = "senators.csv";
pub const SENATE_ASSIGNMENTS_FILE: &str = "senators_com_assignments.csv";
