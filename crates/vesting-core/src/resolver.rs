//! Schedule resolution
//!
//! Picks the effective schedule parameters for a grant from, in order:
//! the grant's own schedule, a schedule passed to the call, the plan's
//! template, the plan's inline fallback, and finally hard defaults.

use serde::Serialize;
use vesting_api::{
    DistributionMode, Frequency, Grant, Plan, PlanFallback, ScheduleDefinition, ScheduleKind,
};
use vesting_util::{Result, ScheduleId, VestingError};

/// Duration used when no schedule is found at any tier
pub const DEFAULT_DURATION_MONTHS: u32 = 48;

/// Cliff used when no schedule is found at any tier
pub const DEFAULT_CLIFF_MONTHS: u32 = 12;

/// Frequency used when no schedule is found at any tier
pub const DEFAULT_FREQUENCY: Frequency = Frequency::Annually;

/// Where the effective schedule came from, highest priority first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ScheduleSource {
    /// Schedule attached to the grant itself
    Grant(ScheduleDefinition),
    /// Schedule passed explicitly to the computation
    Explicit(ScheduleDefinition),
    /// The plan's linked template
    PlanTemplate(ScheduleDefinition),
    /// The plan's inline fallback configuration
    PlanFallback(PlanFallback),
    /// Built-in defaults
    Defaults,
}

impl ScheduleSource {
    /// Template schedule behind this source, if any
    pub fn schedule(&self) -> Option<&ScheduleDefinition> {
        match self {
            ScheduleSource::Grant(s)
            | ScheduleSource::Explicit(s)
            | ScheduleSource::PlanTemplate(s) => Some(s),
            ScheduleSource::PlanFallback(_) | ScheduleSource::Defaults => None,
        }
    }

    pub fn schedule_id(&self) -> Option<&ScheduleId> {
        self.schedule().map(|s| &s.id)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScheduleSource::Grant(_) => "grant",
            ScheduleSource::Explicit(_) => "explicit",
            ScheduleSource::PlanTemplate(_) => "plan_template",
            ScheduleSource::PlanFallback(_) => "plan_fallback",
            ScheduleSource::Defaults => "defaults",
        }
    }
}

/// Effective schedule parameters for one computation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSchedule {
    pub source: ScheduleSource,
    pub total_duration_months: u32,
    pub cliff_months: u32,
    pub frequency: Frequency,
    pub distribution_mode: DistributionMode,
    /// Kind that decides the type of non-cliff events
    pub event_kind: ScheduleKind,
}

/// Everything the resolver may draw from. Lookups happen before this
/// point; the resolver itself touches no storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleContext<'a> {
    pub grant: Option<&'a Grant>,
    pub plan: Option<&'a Plan>,
    pub grant_schedule: Option<&'a ScheduleDefinition>,
    pub explicit_schedule: Option<&'a ScheduleDefinition>,
    pub plan_template: Option<&'a ScheduleDefinition>,
}

impl<'a> ScheduleContext<'a> {
    pub fn for_grant(grant: &'a Grant) -> Self {
        Self {
            grant: Some(grant),
            ..Self::default()
        }
    }

    pub fn with_plan(mut self, plan: Option<&'a Plan>) -> Self {
        self.plan = plan;
        self
    }

    pub fn with_grant_schedule(mut self, schedule: Option<&'a ScheduleDefinition>) -> Self {
        self.grant_schedule = schedule;
        self
    }

    pub fn with_explicit_schedule(mut self, schedule: Option<&'a ScheduleDefinition>) -> Self {
        self.explicit_schedule = schedule;
        self
    }

    pub fn with_plan_template(mut self, schedule: Option<&'a ScheduleDefinition>) -> Self {
        self.plan_template = schedule;
        self
    }

    fn source(&self) -> ScheduleSource {
        if let Some(s) = self.grant_schedule {
            ScheduleSource::Grant(s.clone())
        } else if let Some(s) = self.explicit_schedule {
            ScheduleSource::Explicit(s.clone())
        } else if let Some(s) = self.plan_template {
            ScheduleSource::PlanTemplate(s.clone())
        } else if let Some(fallback) = self.plan.and_then(|p| p.fallback) {
            ScheduleSource::PlanFallback(fallback)
        } else {
            ScheduleSource::Defaults
        }
    }
}

/// Resolve the effective schedule.
///
/// Fails only when there is neither a grant nor a plan to resolve for.
pub fn resolve(ctx: &ScheduleContext<'_>) -> Result<ResolvedSchedule> {
    if ctx.grant.is_none() && ctx.plan.is_none() {
        return Err(VestingError::not_found("Grant or plan context", "none"));
    }

    let source = ctx.source();

    let (total_duration_months, cliff_months, frequency) = match &source {
        ScheduleSource::Grant(s) | ScheduleSource::Explicit(s) | ScheduleSource::PlanTemplate(s) => {
            (s.total_duration_months, s.cliff_months, s.frequency)
        }
        ScheduleSource::PlanFallback(f) => (f.years.saturating_mul(12), f.cliff_months, f.frequency),
        ScheduleSource::Defaults => (DEFAULT_DURATION_MONTHS, DEFAULT_CLIFF_MONTHS, DEFAULT_FREQUENCY),
    };

    let distribution_mode = ctx
        .grant
        .and_then(|g| g.distribution_mode)
        .or_else(|| source.schedule().map(|s| s.distribution_mode))
        .unwrap_or_default();

    let event_kind = ctx
        .plan
        .and_then(|p| p.schedule_kind)
        .or_else(|| source.schedule().map(|s| s.schedule_kind))
        .unwrap_or_default();

    Ok(ResolvedSchedule {
        source,
        total_duration_months,
        cliff_months,
        frequency,
        distribution_mode,
        event_kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use vesting_util::{GrantId, PlanId};

    fn schedule(id: &str, duration: u32, cliff: u32, frequency: Frequency) -> ScheduleDefinition {
        ScheduleDefinition {
            id: ScheduleId::new(id),
            total_duration_months: duration,
            cliff_months: cliff,
            frequency,
            distribution_mode: DistributionMode::Percentage,
            schedule_kind: ScheduleKind::TimeBased,
        }
    }

    fn grant() -> Grant {
        Grant {
            id: GrantId::new("g-1"),
            plan_id: Some(PlanId::new("p-1")),
            schedule_id: None,
            total_shares: 1000,
            vesting_start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            distribution_mode: None,
        }
    }

    fn plan(fallback: Option<PlanFallback>) -> Plan {
        Plan {
            id: PlanId::new("p-1"),
            name: "Plan".into(),
            schedule_id: None,
            schedule_kind: None,
            fallback,
        }
    }

    #[test]
    fn test_priority_order() {
        let g = grant();
        let p = plan(Some(PlanFallback {
            years: 3,
            cliff_months: 6,
            frequency: Frequency::Quarterly,
        }));
        let own = schedule("own", 24, 0, Frequency::Monthly);
        let explicit = schedule("explicit", 36, 12, Frequency::Monthly);
        let template = schedule("template", 60, 12, Frequency::Annually);

        let full = ScheduleContext::for_grant(&g)
            .with_plan(Some(&p))
            .with_grant_schedule(Some(&own))
            .with_explicit_schedule(Some(&explicit))
            .with_plan_template(Some(&template));
        let resolved = resolve(&full).unwrap();
        assert_eq!(resolved.source.schedule_id(), Some(&ScheduleId::new("own")));
        assert_eq!(resolved.total_duration_months, 24);

        let resolved = resolve(&full.with_grant_schedule(None)).unwrap();
        assert_eq!(resolved.source.name(), "explicit");

        let resolved = resolve(&full.with_grant_schedule(None).with_explicit_schedule(None)).unwrap();
        assert_eq!(resolved.source.name(), "plan_template");
        assert_eq!(resolved.total_duration_months, 60);

        let fallback_only = ScheduleContext::for_grant(&g).with_plan(Some(&p));
        let resolved = resolve(&fallback_only).unwrap();
        assert_eq!(resolved.source.name(), "plan_fallback");
        assert_eq!(resolved.total_duration_months, 36);
        assert_eq!(resolved.cliff_months, 6);
        assert_eq!(resolved.frequency, Frequency::Quarterly);
        assert!(resolved.source.schedule().is_none());
    }

    #[test]
    fn test_defaults_when_nothing_is_linked() {
        let g = grant();
        let p = plan(None);
        let resolved = resolve(&ScheduleContext::for_grant(&g).with_plan(Some(&p))).unwrap();

        assert_eq!(resolved.source, ScheduleSource::Defaults);
        assert_eq!(resolved.total_duration_months, 48);
        assert_eq!(resolved.cliff_months, 12);
        assert_eq!(resolved.frequency, Frequency::Annually);
        assert_eq!(resolved.distribution_mode, DistributionMode::Percentage);
        assert_eq!(resolved.event_kind, ScheduleKind::TimeBased);
    }

    #[test]
    fn test_plan_only_context_resolves() {
        let p = plan(None);
        let ctx = ScheduleContext {
            plan: Some(&p),
            ..ScheduleContext::default()
        };
        assert!(resolve(&ctx).is_ok());
    }

    #[test]
    fn test_missing_context_is_not_found() {
        let err = resolve(&ScheduleContext::default()).unwrap_err();
        assert!(matches!(err, VestingError::NotFound { .. }));
    }

    #[test]
    fn test_grant_mode_overrides_schedule_mode() {
        let mut g = grant();
        let mut s = schedule("s", 48, 12, Frequency::Annually);
        s.distribution_mode = DistributionMode::Even;

        let resolved = resolve(&ScheduleContext::for_grant(&g).with_grant_schedule(Some(&s))).unwrap();
        assert_eq!(resolved.distribution_mode, DistributionMode::Even);

        g.distribution_mode = Some(DistributionMode::Percentage);
        let resolved = resolve(&ScheduleContext::for_grant(&g).with_grant_schedule(Some(&s))).unwrap();
        assert_eq!(resolved.distribution_mode, DistributionMode::Percentage);
    }

    #[test]
    fn test_plan_kind_drives_event_kind() {
        let g = grant();
        let p = plan(None);
        let mut template = schedule("t", 48, 12, Frequency::Annually);
        template.schedule_kind = ScheduleKind::PerformanceBased;

        let ctx = ScheduleContext::for_grant(&g)
            .with_plan(Some(&p))
            .with_plan_template(Some(&template));
        assert_eq!(resolve(&ctx).unwrap().event_kind, ScheduleKind::PerformanceBased);

        let hybrid = Plan {
            schedule_kind: Some(ScheduleKind::Hybrid),
            ..plan(None)
        };
        let ctx = ctx.with_plan(Some(&hybrid));
        assert_eq!(resolve(&ctx).unwrap().event_kind, ScheduleKind::Hybrid);
    }
}
