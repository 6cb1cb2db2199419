use rocket_prometheus::prometheus::{IntCounterVec, Opts, Registry};
use shared::Platform;

use crate::error::StatsError;

#[derive(Clone)]
pub struct StatsMetrics {
    cache_lookups: IntCounterVec,
    upstream_errors: IntCounterVec,
}

impl StatsMetrics {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            cache_lookups: IntCounterVec::new(
                Opts::new("stats_cache_lookups_total", "Stats cache lookups by outcome"),
                &["platform", "outcome"],
            )?,
            upstream_errors: IntCounterVec::new(
                Opts::new("stats_upstream_errors_total", "Failed stats lookups by error kind"),
                &["platform", "kind"],
            )?,
        })
    }

    pub fn register(&self, registry: &Registry) -> anyhow::Result<()> {
        registry.register(Box::new(self.cache_lookups.clone()))?;
        registry.register(Box::new(self.upstream_errors.clone()))?;
        Ok(())
    }

    pub fn cache_hit(&self, platform: Platform) {
        self.cache_lookups
            .with_label_values(&[platform.as_ref(), "hit"])
            .inc();
    }

    pub fn cache_miss(&self, platform: Platform) {
        self.cache_lookups
            .with_label_values(&[platform.as_ref(), "miss"])
            .inc();
    }

    pub fn lookup_failed(&self, platform: Platform, error: &StatsError) {
        self.upstream_errors
            .with_label_values(&[platform.as_ref(), error.kind()])
            .inc();
    }

    #[cfg(test)]
    pub fn cache_hits(&self, platform: Platform) -> u64 {
        self.cache_lookups
            .with_label_values(&[platform.as_ref(), "hit"])
            .get()
    }
}
