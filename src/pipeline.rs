use crate::apis::{house, senate};
use crate::app::ports::HttpClientPort;
use crate::error::Result;
use crate::idempotency::payload_sha256;
use crate::parser::parse_document;
use crate::storage::{self, WrittenTable};
use crate::types::Chamber;
use chrono::NaiveDateTime;
use metrics::counter;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Where a chamber's feed comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    /// Published feed, fetched over HTTP.
    Remote(String),
    /// Previously saved copy of the feed.
    File(PathBuf),
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedSource::Remote(url) => f.write_str(url),
            FeedSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Which chambers to run, and from where.
#[derive(Debug, Clone, Default)]
pub struct RunPlan {
    pub house: Option<FeedSource>,
    pub senate: Option<FeedSource>,
}

/// Result of one chamber's pipeline run
#[derive(Debug, Serialize)]
pub struct PipelineResult {
    pub chamber: String,
    pub source: String,
    pub payload_sha256: String,
    pub payload_bytes: usize,
    pub tables: Vec<WrittenTable>,
}

impl PipelineResult {
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }
}

pub struct Pipeline;

impl Pipeline {
    /// Run every chamber in `plan`. Fetches for the two chambers proceed
    /// concurrently; each chamber is flattened in full before its files are
    /// written, so a failing chamber leaves no output of its own.
    pub async fn run(
        plan: &RunPlan,
        http: &dyn HttpClientPort,
        output_dir: &Path,
        retrieved_at: NaiveDateTime,
    ) -> Result<Vec<PipelineResult>> {
        let house = async {
            match &plan.house {
                Some(source) => Some(
                    Self::run_for_chamber(Chamber::House, source, http, output_dir, retrieved_at)
                        .await,
                ),
                None => None,
            }
        };
        let senate = async {
            match &plan.senate {
                Some(source) => Some(
                    Self::run_for_chamber(Chamber::Senate, source, http, output_dir, retrieved_at)
                        .await,
                ),
                None => None,
            }
        };

        let (house, senate) = tokio::join!(house, senate);
        let mut results = Vec::new();
        results.extend(house.transpose()?);
        results.extend(senate.transpose()?);
        Ok(results)
    }

    /// Fetch, flatten and write one chamber.
    #[instrument(skip_all, fields(chamber = %chamber, source = %source))]
    pub async fn run_for_chamber(
        chamber: Chamber,
        source: &FeedSource,
        http: &dyn HttpClientPort,
        output_dir: &Path,
        retrieved_at: NaiveDateTime,
    ) -> Result<PipelineResult> {
        info!("📡 Loading {} feed from {}", chamber, source);
        let payload = Self::load(source, http).await?;
        let mut result = Self::process_payload(chamber, &payload, output_dir, retrieved_at)?;
        result.source = source.to_string();
        Ok(result)
    }

    /// Raw feed bytes, from the network or from disk.
    pub async fn load(source: &FeedSource, http: &dyn HttpClientPort) -> Result<Vec<u8>> {
        match source {
            FeedSource::Remote(url) => {
                let response = http.get(url).await?;
                debug!(
                    content_type = %response.content_type,
                    etag = ?response.etag,
                    last_modified = ?response.last_modified,
                    "Fetched feed"
                );
                Ok(response.bytes)
            }
            FeedSource::File(path) => Ok(tokio::fs::read(path).await?),
        }
    }

    /// Parse, flatten and write a chamber's payload.
    pub fn process_payload(
        chamber: Chamber,
        payload: &[u8],
        output_dir: &Path,
        retrieved_at: NaiveDateTime,
    ) -> Result<PipelineResult> {
        let sha = payload_sha256(payload);
        info!(bytes = payload.len(), sha256 = %sha, "✅ Loaded {} feed", chamber);

        let document = parse_document(payload)?;

        info!("🔧 Flattening {} roster...", chamber);
        let tables = match chamber {
            Chamber::House => {
                let tables = house::flatten_document(&document, retrieved_at)?;
                storage::write_house_tables(output_dir, &tables)?
            }
            Chamber::Senate => {
                let tables = senate::flatten_document(&document, retrieved_at)?;
                storage::write_senate_tables(output_dir, &tables)?
            }
        };

        for table in &tables {
            counter!("roster_rows_written_total", "chamber" => chamber.as_str())
                .increment(table.rows as u64);
        }
        info!(
            files = tables.len(),
            "💾 Wrote {} tables to {}",
            chamber,
            storage::chamber_dir(output_dir, chamber).display()
        );

        Ok(PipelineResult {
            chamber: chamber.to_string(),
            source: String::new(),
            payload_sha256: sha,
            payload_bytes: payload.len(),
            tables,
        })
    }
}
