use serde::{Deserialize, Serialize};

/// Subscription plan tier, ordered from most to least restricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Starter,
    Pro,
    Agency,
}

impl PlanTier {
    /// Parse a tier from its stored string form. Unknown values map to
    /// `Free`, the most restricted tier.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "starter" => PlanTier::Starter,
            "pro" => PlanTier::Pro,
            "agency" => PlanTier::Agency,
            _ => PlanTier::Free,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Starter => "starter",
            PlanTier::Pro => "pro",
            PlanTier::Agency => "agency",
        }
    }

    /// Scan limits for this tier.
    #[must_use]
    pub fn limits(self) -> PlanLimits {
        match self {
            PlanTier::Free => PlanLimits {
                max_queries: 5,
                max_providers: 1,
                provider_concurrency: 1,
            },
            PlanTier::Starter => PlanLimits {
                max_queries: 10,
                max_providers: 2,
                provider_concurrency: 2,
            },
            PlanTier::Pro => PlanLimits {
                max_queries: 20,
                max_providers: 3,
                provider_concurrency: 4,
            },
            PlanTier::Agency => PlanLimits {
                max_queries: 30,
                max_providers: 3,
                provider_concurrency: 6,
            },
        }
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-tier resource caps applied by the scan orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanLimits {
    /// Maximum queries in one scan's QuerySet.
    pub max_queries: usize,
    /// How many AI providers the scan fans out to.
    pub max_providers: usize,
    /// Bound on concurrent in-flight provider calls.
    pub provider_concurrency: usize,
}

/// Snapshot of a user's quota counters, read from the subscription row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaState {
    pub tier: PlanTier,
    pub whitelisted: bool,
    pub free_scan_used: bool,
    pub scans_used: i32,
    pub scans_limit: i32,
}

/// Outcome of a quota check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    Allowed,
    /// Free tier's single scan is spent.
    FreeScanUsed,
    /// Metered tier is at or above its scan limit.
    LimitReached,
}

impl QuotaState {
    /// Decide whether this user may start a scan.
    ///
    /// Whitelisted users are always allowed. Free tier is allowed exactly
    /// once. Starter is metered against `scans_limit`. Pro and agency are
    /// unmetered.
    #[must_use]
    pub fn check(&self) -> QuotaDecision {
        if self.whitelisted {
            return QuotaDecision::Allowed;
        }
        match self.tier {
            PlanTier::Free => {
                if self.free_scan_used {
                    QuotaDecision::FreeScanUsed
                } else {
                    QuotaDecision::Allowed
                }
            }
            PlanTier::Starter => {
                if self.scans_used < self.scans_limit {
                    QuotaDecision::Allowed
                } else {
                    QuotaDecision::LimitReached
                }
            }
            PlanTier::Pro | PlanTier::Agency => QuotaDecision::Allowed,
        }
    }

    #[must_use]
    pub fn is_allowed(&self) -> bool {
        self.check() == QuotaDecision::Allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quota(tier: PlanTier) -> QuotaState {
        QuotaState {
            tier,
            whitelisted: false,
            free_scan_used: false,
            scans_used: 0,
            scans_limit: 10,
        }
    }

    #[test]
    fn whitelisted_always_allowed() {
        let mut q = quota(PlanTier::Free);
        q.whitelisted = true;
        q.free_scan_used = true;
        q.scans_used = 999;
        assert_eq!(q.check(), QuotaDecision::Allowed);
    }

    #[test]
    fn free_tier_allowed_exactly_once() {
        let mut q = quota(PlanTier::Free);
        assert_eq!(q.check(), QuotaDecision::Allowed);
        q.free_scan_used = true;
        assert_eq!(q.check(), QuotaDecision::FreeScanUsed);
    }

    #[test]
    fn starter_allowed_while_under_limit() {
        let mut q = quota(PlanTier::Starter);
        q.scans_used = 9;
        assert_eq!(q.check(), QuotaDecision::Allowed);
    }

    #[test]
    fn starter_blocked_at_limit() {
        let mut q = quota(PlanTier::Starter);
        q.scans_used = 10;
        assert_eq!(q.check(), QuotaDecision::LimitReached);
        q.scans_used = 11;
        assert_eq!(q.check(), QuotaDecision::LimitReached);
    }

    #[test]
    fn pro_and_agency_always_allowed() {
        let mut q = quota(PlanTier::Pro);
        q.scans_used = 1_000;
        assert_eq!(q.check(), QuotaDecision::Allowed);
        let mut q = quota(PlanTier::Agency);
        q.scans_used = 1_000;
        assert_eq!(q.check(), QuotaDecision::Allowed);
    }

    #[test]
    fn tier_parse_round_trips() {
        for tier in [
            PlanTier::Free,
            PlanTier::Starter,
            PlanTier::Pro,
            PlanTier::Agency,
        ] {
            assert_eq!(PlanTier::parse(tier.as_str()), tier);
        }
    }

    #[test]
    fn unknown_tier_parses_as_free() {
        assert_eq!(PlanTier::parse("enterprise"), PlanTier::Free);
    }

    #[test]
    fn limits_grow_with_tier() {
        assert!(PlanTier::Free.limits().max_queries < PlanTier::Starter.limits().max_queries);
        assert!(PlanTier::Starter.limits().max_queries < PlanTier::Pro.limits().max_queries);
        assert!(
            PlanTier::Pro.limits().provider_concurrency
                < PlanTier::Agency.limits().provider_concurrency
        );
    }
}
