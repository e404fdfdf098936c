//! The enrichment orchestrator.
//!
//! `enrich_route` is the single idempotent unit of work an external
//! scheduler invokes: load the route, build its geometry, query the
//! provider chain for the buffered bounding box, upsert every candidate
//! into the property cache, and associate the ones that survive precise
//! proximity matching. Every degraded path (missing route, unusable
//! geometry, exhausted providers) returns a zero report, not an error, so
//! a retry later is always safe.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{info, warn};
use serde::Serialize;
use sqlx::SqlitePool;
use tokio::sync::Semaphore;

use crate::config::Config;
use crate::geometry::{RouteGeometry, SampleCoord};
use crate::matcher::{match_candidate, MatchDecision};
use crate::providers::{query_provider_chain, BboxQuery, PropertyProvider};
use crate::storage::{
    get_route, list_route_ids, load_route_points, upsert_property, AssociationWrite,
    PropertyUpsert,
};

/// How an enrichment run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentOutcome {
    /// Candidates were fetched and processed.
    Completed,
    /// The route id does not exist; a legitimate no-op.
    RouteMissing,
    /// The route has no point with usable coordinates; a legitimate no-op.
    NoUsableGeometry,
    /// Every configured provider was unavailable; retry later.
    ProvidersUnavailable,
}

/// Summary of one enrichment run.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentReport {
    pub route_id: i64,
    pub outcome: EnrichmentOutcome,
    /// Provider that served the candidates, when any did.
    pub provider: Option<&'static str>,
    /// Properties associated this run (created + updated).
    pub associated: usize,
    pub created: usize,
    pub updated: usize,
    /// Cache writes: new or refreshed-stale records.
    pub refreshed_properties: usize,
    /// Cache hits left untouched.
    pub fresh_properties: usize,
    /// Candidates inside the bounding box but outside the true buffer.
    pub outside_buffer: usize,
    /// Malformed provider records skipped during normalization.
    pub skipped_malformed: usize,
}

impl EnrichmentReport {
    fn empty(route_id: i64, outcome: EnrichmentOutcome) -> Self {
        Self {
            route_id,
            outcome,
            provider: None,
            associated: 0,
            created: 0,
            updated: 0,
            refreshed_properties: 0,
            fresh_properties: 0,
            outside_buffer: 0,
            skipped_malformed: 0,
        }
    }
}

/// Enriches one route: discovers nearby properties and associates them.
///
/// Re-running with identical provider responses is idempotent: no duplicate
/// associations, `discovered_at` untouched, only distances and stale cache
/// entries rewritten. No lock or transaction spans the provider call; every
/// upsert commits individually.
///
/// # Errors
///
/// Only database failures surface as errors. Missing routes, unusable
/// geometry and provider unavailability all degrade to a zero report.
pub async fn enrich_route(
    pool: &SqlitePool,
    providers: &[Arc<dyn PropertyProvider>],
    config: &Config,
    route_id: i64,
) -> Result<EnrichmentReport> {
    if get_route(pool, route_id)
        .await
        .context("Failed to load route")?
        .is_none()
    {
        info!("route {route_id} not found, nothing to enrich");
        return Ok(EnrichmentReport::empty(
            route_id,
            EnrichmentOutcome::RouteMissing,
        ));
    }

    let points = load_route_points(pool, route_id)
        .await
        .context("Failed to load route points")?;
    let samples: Vec<SampleCoord> = points
        .iter()
        .map(|p| SampleCoord {
            latitude: p.latitude,
            longitude: p.longitude,
        })
        .collect();
    let geometry = match RouteGeometry::from_samples(&samples) {
        Ok(g) => g,
        Err(e) => {
            warn!("route {route_id}: {e}, skipping enrichment");
            return Ok(EnrichmentReport::empty(
                route_id,
                EnrichmentOutcome::NoUsableGeometry,
            ));
        }
    };

    let query = BboxQuery {
        bbox: geometry.buffered_bbox(config.buffer_meters),
        property_type: config.property_type.clone(),
        listing_status: config.listing_status.clone(),
    };

    let Some((provider, batch)) = query_provider_chain(providers, &query).await else {
        warn!("route {route_id}: no provider available, enrichment will be retried later");
        return Ok(EnrichmentReport::empty(
            route_id,
            EnrichmentOutcome::ProvidersUnavailable,
        ));
    };

    let mut report = EnrichmentReport::empty(route_id, EnrichmentOutcome::Completed);
    report.provider = Some(provider);
    report.skipped_malformed = batch.skipped;

    let ttl_ms = config.cache_ttl_millis();
    for candidate in &batch.candidates {
        let now_ms = Utc::now().timestamp_millis();

        let upsert = upsert_property(pool, candidate, now_ms, ttl_ms)
            .await
            .with_context(|| format!("Failed to upsert property {}", candidate.external_id))?;
        match upsert {
            PropertyUpsert::Stored { .. } => report.refreshed_properties += 1,
            PropertyUpsert::Unchanged { .. } => report.fresh_properties += 1,
        }

        let decision = match_candidate(
            pool,
            &geometry,
            route_id,
            upsert.property_id(),
            candidate.longitude,
            candidate.latitude,
            config.buffer_meters,
            now_ms,
        )
        .await
        .with_context(|| format!("Failed to match property {}", candidate.external_id))?;

        match decision {
            MatchDecision::Associated { write, .. } => {
                report.associated += 1;
                match write {
                    AssociationWrite::Created => report.created += 1,
                    AssociationWrite::Updated => report.updated += 1,
                }
            }
            MatchDecision::OutsideBuffer { .. } => report.outside_buffer += 1,
        }
    }

    info!(
        "route {route_id}: {} associated ({} new, {} updated), {} outside buffer, {} malformed skipped via {}",
        report.associated,
        report.created,
        report.updated,
        report.outside_buffer,
        report.skipped_malformed,
        provider
    );
    Ok(report)
}

/// Enriches every stored route with bounded concurrency.
///
/// Routes are independent units of work, so they run in parallel up to
/// `config.max_concurrency`. A route whose enrichment fails is logged and
/// skipped; the sweep continues.
pub async fn enrich_all_routes(
    pool: &SqlitePool,
    providers: &[Arc<dyn PropertyProvider>],
    config: &Config,
) -> Result<Vec<EnrichmentReport>> {
    let route_ids = list_route_ids(pool).await.context("Failed to list routes")?;
    info!("enriching {} routes", route_ids.len());

    let semaphore = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
    let mut tasks = FuturesUnordered::new();
    for route_id in route_ids {
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .context("Semaphore closed")?;
        let pool = pool.clone();
        let providers = providers.to_vec();
        let config = config.clone();
        tasks.push(tokio::spawn(async move {
            let _permit = permit;
            enrich_route(&pool, &providers, &config, route_id).await
        }));
    }

    let mut reports = Vec::new();
    while let Some(task_result) = tasks.next().await {
        match task_result {
            Ok(Ok(report)) => reports.push(report),
            Ok(Err(e)) => warn!("route enrichment failed: {e:#}"),
            Err(join_error) => warn!("enrichment task panicked: {join_error:?}"),
        }
    }
    reports.sort_by_key(|r| r.route_id);
    Ok(reports)
}
