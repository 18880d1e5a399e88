// SPDX-License-Identifier: Apache-2.0 OR MIT

//! EnergyControl: the control-state machine and per-zone limit/setpoint
//! resolver (§4.9).

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use ciborium::value::Value;
use parking_lot::RwLock;

use crate::device_model::{Access, Attribute, AttributeReader, Command, Feature, RequestContext};
use crate::error::Result;
use crate::wire::StatusCode;
use crate::zone::{MultiZoneValue, ResolutionRule, ZoneType};

pub const FEATURE_TYPE: u8 = 0x01;

pub const ATTR_MY_CONSUMPTION_LIMIT: u16 = 1;
pub const ATTR_MY_PRODUCTION_LIMIT: u16 = 2;
pub const ATTR_EFFECTIVE_CONSUMPTION_LIMIT: u16 = 3;
pub const ATTR_EFFECTIVE_PRODUCTION_LIMIT: u16 = 4;
pub const ATTR_MY_SETPOINT: u16 = 5;
pub const ATTR_EFFECTIVE_SETPOINT: u16 = 6;
pub const ATTR_CONTROL_STATE: u16 = 7;

pub const CMD_SET_LIMIT: u8 = 1;
pub const CMD_CLEAR_LIMIT: u8 = 2;
pub const CMD_SET_CURRENT_LIMITS: u8 = 3;
pub const CMD_CLEAR_CURRENT_LIMITS: u8 = 4;
pub const CMD_SET_SETPOINT: u8 = 5;
pub const CMD_CLEAR_SETPOINT: u8 = 6;
pub const CMD_PAUSE: u8 = 7;
pub const CMD_RESUME: u8 = 8;
pub const CMD_STOP: u8 = 9;

/// Which limit kind a `SetLimit`/`ClearLimit` call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    Consumption,
    Production,
}

/// Control-state machine (§4.9). `Override` remembers the state it
/// preempted so clearing it restores the prior state exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Autonomous,
    Controlled,
    Limited,
    Failsafe,
    Override(ControlStatePrior),
}

/// The subset of [`ControlState`] an override can preempt — excludes
/// `Override` itself, since overrides don't nest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlStatePrior {
    Autonomous,
    Controlled,
    Limited,
    Failsafe,
}

impl From<ControlStatePrior> for ControlState {
    fn from(prior: ControlStatePrior) -> Self {
        match prior {
            ControlStatePrior::Autonomous => ControlState::Autonomous,
            ControlStatePrior::Controlled => ControlState::Controlled,
            ControlStatePrior::Limited => ControlState::Limited,
            ControlStatePrior::Failsafe => ControlState::Failsafe,
        }
    }
}

struct ResolverState {
    consumption_limit: MultiZoneValue,
    production_limit: MultiZoneValue,
    current_consumption_limit: MultiZoneValue,
    current_production_limit: MultiZoneValue,
    setpoint: MultiZoneValue,
    state: ControlState,
    failsafe_consumption_limit: i64,
    failsafe_production_limit: i64,
    /// Last value [`LimitResolver::tick`] observed for each effective
    /// attribute, so the next tick can tell whether expiry (or a
    /// failsafe transition) actually changed it.
    last_effective_consumption: Option<i64>,
    last_effective_production: Option<i64>,
    last_effective_setpoint: Option<i64>,
}

/// Owns every zone's limit/setpoint values plus the control state. Acts
/// as the feature's [`AttributeReader`] hook so a `myConsumptionLimit`
/// read returns the caller zone's own value while
/// `effectiveConsumptionLimit` returns the resolved value across zones
/// (§4.9 "LimitResolver").
pub struct LimitResolver {
    state: RwLock<ResolverState>,
    consumption_attr_id: u16,
    production_attr_id: u16,
}

impl LimitResolver {
    pub fn new(failsafe_consumption_limit: i64, failsafe_production_limit: i64) -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(ResolverState {
                consumption_limit: MultiZoneValue::new(),
                production_limit: MultiZoneValue::new(),
                current_consumption_limit: MultiZoneValue::new(),
                current_production_limit: MultiZoneValue::new(),
                setpoint: MultiZoneValue::new(),
                state: ControlState::Autonomous,
                failsafe_consumption_limit,
                failsafe_production_limit,
                last_effective_consumption: None,
                last_effective_production: None,
                last_effective_setpoint: None,
            }),
            consumption_attr_id: ATTR_MY_CONSUMPTION_LIMIT,
            production_attr_id: ATTR_MY_PRODUCTION_LIMIT,
        })
    }

    pub fn control_state(&self) -> ControlState {
        self.state.read().state
    }

    fn has_any_active_value(state: &ResolverState, now: SystemTime) -> bool {
        state.consumption_limit.resolve(ResolutionRule::MinWins, now).is_some()
            || state.production_limit.resolve(ResolutionRule::MinWins, now).is_some()
            || state.setpoint.resolve(ResolutionRule::PriorityWins, now).is_some()
    }

    /// Advance AUTONOMOUS → CONTROLLED on the first active limit or
    /// setpoint (§4.9 table, row 1). Called after every `SetLimit` /
    /// `SetSetpoint`.
    fn on_value_set(&self) {
        let mut state = self.state.write();
        if matches!(state.state, ControlState::Autonomous) {
            state.state = ControlState::Controlled;
        }
    }

    /// `ClearAll`: if no limits or setpoints remain active anywhere,
    /// fall back to AUTONOMOUS (§4.9 table, row 2).
    pub fn clear_all(&self) {
        let mut state = self.state.write();
        state.consumption_limit = MultiZoneValue::new();
        state.production_limit = MultiZoneValue::new();
        state.current_consumption_limit = MultiZoneValue::new();
        state.current_production_limit = MultiZoneValue::new();
        state.setpoint = MultiZoneValue::new();
        if matches!(state.state, ControlState::Controlled | ControlState::Limited) {
            state.state = ControlState::Autonomous;
        }
    }

    pub fn set_limit(&self, kind: LimitKind, ctx: &RequestContext, value: i64, duration: Option<Duration>) {
        let expires_at = duration.map(|d| SystemTime::now() + d);
        {
            let mut state = self.state.write();
            let mzv = match kind {
                LimitKind::Consumption => &mut state.consumption_limit,
                LimitKind::Production => &mut state.production_limit,
            };
            mzv.set(ctx.zone_id.clone(), ctx.zone_type, value, duration, expires_at);
        }
        self.on_value_set();
    }

    pub fn clear_limit(&self, kind: LimitKind, ctx: &RequestContext) {
        let mut state = self.state.write();
        let mzv = match kind {
            LimitKind::Consumption => &mut state.consumption_limit,
            LimitKind::Production => &mut state.production_limit,
        };
        mzv.clear(&ctx.zone_id);
        let now = SystemTime::now();
        if !Self::has_any_active_value(&state, now) && matches!(state.state, ControlState::Controlled) {
            state.state = ControlState::Autonomous;
        }
    }

    /// `SetCurrentLimits` enters LIMITED when only current-limit values
    /// are configured and no full consumption/production limit or
    /// setpoint is active (§4.9 table, row 6 "current-limit-only").
    pub fn set_current_limits(&self, kind: LimitKind, ctx: &RequestContext, value: i64, duration: Option<Duration>) {
        let expires_at = duration.map(|d| SystemTime::now() + d);
        let mut state = self.state.write();
        let mzv = match kind {
            LimitKind::Consumption => &mut state.current_consumption_limit,
            LimitKind::Production => &mut state.current_production_limit,
        };
        mzv.set(ctx.zone_id.clone(), ctx.zone_type, value, duration, expires_at);

        let now = SystemTime::now();
        let only_current_limits_active = state.consumption_limit.resolve(ResolutionRule::MinWins, now).is_none()
            && state.production_limit.resolve(ResolutionRule::MinWins, now).is_none()
            && state.setpoint.resolve(ResolutionRule::PriorityWins, now).is_none();

        if only_current_limits_active && matches!(state.state, ControlState::Autonomous) {
            state.state = ControlState::Limited;
        }
    }

    pub fn clear_current_limits(&self, kind: LimitKind, ctx: &RequestContext) {
        let mut state = self.state.write();
        let mzv = match kind {
            LimitKind::Consumption => &mut state.current_consumption_limit,
            LimitKind::Production => &mut state.current_production_limit,
        };
        mzv.clear(&ctx.zone_id);
        let now = SystemTime::now();
        if !Self::has_any_active_value(&state, now) && matches!(state.state, ControlState::Limited) {
            state.state = ControlState::Autonomous;
        }
    }

    pub fn set_setpoint(&self, ctx: &RequestContext, value: i64, duration: Option<Duration>) {
        let expires_at = duration.map(|d| SystemTime::now() + d);
        {
            let mut state = self.state.write();
            state.setpoint.set(ctx.zone_id.clone(), ctx.zone_type, value, duration, expires_at);
        }
        self.on_value_set();
    }

    pub fn clear_setpoint(&self, ctx: &RequestContext) {
        let mut state = self.state.write();
        state.setpoint.clear(&ctx.zone_id);
        let now = SystemTime::now();
        if !Self::has_any_active_value(&state, now) && matches!(state.state, ControlState::Controlled) {
            state.state = ControlState::Autonomous;
        }
    }

    /// Manual override: preempts whatever state was active, remembering
    /// it so `clear_override` restores exactly that state (§4.9 table,
    /// rows "Any → OVERRIDE" / "OVERRIDE → previous state").
    pub fn set_override(&self) {
        let mut state = self.state.write();
        let prior = match state.state {
            ControlState::Autonomous => ControlStatePrior::Autonomous,
            ControlState::Controlled => ControlStatePrior::Controlled,
            ControlState::Limited => ControlStatePrior::Limited,
            ControlState::Failsafe => ControlStatePrior::Failsafe,
            ControlState::Override(prior) => prior,
        };
        state.state = ControlState::Override(prior);
    }

    pub fn clear_override(&self) {
        let mut state = self.state.write();
        if let ControlState::Override(prior) = state.state {
            state.state = prior.into();
        }
    }

    /// A zone's failsafe timer fired (§4.9 table, row "CONTROLLED → peer
    /// disconnect+timeout → FAILSAFE"). Limits revert to the configured
    /// failsafe defaults.
    pub fn enter_failsafe(&self) {
        let mut state = self.state.write();
        state.state = ControlState::Failsafe;
    }

    /// The failsafe-owning zone reconnected and refreshed (§4.9
    /// "Failsafe behavior"): restore CONTROLLED.
    pub fn exit_failsafe(&self) {
        let mut state = self.state.write();
        if matches!(state.state, ControlState::Failsafe) {
            state.state = ControlState::Controlled;
        }
    }

    fn effective_consumption_limit(&self, now: SystemTime) -> Option<i64> {
        let state = self.state.read();
        if matches!(state.state, ControlState::Failsafe) {
            return Some(state.failsafe_consumption_limit);
        }
        state
            .consumption_limit
            .resolve(ResolutionRule::MinWins, now)
            .map(|(v, _)| v)
    }

    fn effective_production_limit(&self, now: SystemTime) -> Option<i64> {
        let state = self.state.read();
        if matches!(state.state, ControlState::Failsafe) {
            return Some(state.failsafe_production_limit);
        }
        state
            .production_limit
            .resolve(ResolutionRule::MinWins, now)
            .map(|(v, _)| v)
    }

    fn effective_setpoint(&self, now: SystemTime) -> Option<i64> {
        self.state.read().setpoint.resolve(ResolutionRule::PriorityWins, now).map(|(v, _)| v)
    }

    /// Recompute every effective value and compare it against the
    /// snapshot taken on the previous call, returning the attribute ids
    /// that changed — whether from expiry of a duration-bound limit or
    /// setpoint, or from an `enter_failsafe`/`exit_failsafe` transition
    /// (§4.9 "duration timers... mark the relevant attributes dirty").
    /// The caller marks the returned ids' attributes dirty so
    /// subscriptions notify.
    pub fn tick(&self, now: SystemTime) -> Vec<u16> {
        let consumption = self.effective_consumption_limit(now);
        let production = self.effective_production_limit(now);
        let setpoint = self.effective_setpoint(now);

        let mut state = self.state.write();
        let mut changed = Vec::new();
        if state.last_effective_consumption != consumption {
            changed.push(ATTR_EFFECTIVE_CONSUMPTION_LIMIT);
        }
        if state.last_effective_production != production {
            changed.push(ATTR_EFFECTIVE_PRODUCTION_LIMIT);
        }
        if state.last_effective_setpoint != setpoint {
            changed.push(ATTR_EFFECTIVE_SETPOINT);
        }
        state.last_effective_consumption = consumption;
        state.last_effective_production = production;
        state.last_effective_setpoint = setpoint;
        changed
    }
}

impl AttributeReader for LimitResolver {
    fn read(&self, ctx: &RequestContext, attr_id: u16) -> Result<Option<Value>> {
        let now = SystemTime::now();
        let value = match attr_id {
            id if id == self.consumption_attr_id => {
                self.state.read().consumption_limit.get(&ctx.zone_id).map(|v| v.value)
            }
            id if id == self.production_attr_id => {
                self.state.read().production_limit.get(&ctx.zone_id).map(|v| v.value)
            }
            ATTR_EFFECTIVE_CONSUMPTION_LIMIT => self.effective_consumption_limit(now),
            ATTR_EFFECTIVE_PRODUCTION_LIMIT => self.effective_production_limit(now),
            ATTR_MY_SETPOINT => self.state.read().setpoint.get(&ctx.zone_id).map(|v| v.value),
            ATTR_EFFECTIVE_SETPOINT => self.effective_setpoint(now),
            _ => return Ok(None),
        };
        Ok(value.map(|v| Value::Integer(v.into())).or(Some(Value::Null)))
    }
}

fn int_param(entries: &[(Value, Value)], key: &str) -> Option<i64> {
    entries.iter().find_map(|(k, v)| (k.as_text() == Some(key)).then(|| v.as_integer()).flatten())
}

fn duration_param(entries: &[(Value, Value)]) -> Option<Duration> {
    int_param(entries, "durationMs").map(|ms| Duration::from_millis(ms.max(0) as u64))
}

/// Build the `EnergyControl` feature, wiring commands to the given
/// resolver (§4.9 "Key commands").
pub fn build_energy_control_feature(resolver: Arc<LimitResolver>) -> Feature {
    let mut feature = Feature::new(FEATURE_TYPE, 1, 0)
        .with_attribute(Attribute::new(ATTR_MY_CONSUMPTION_LIMIT, "myConsumptionLimit", Access::READ_ONLY, Value::Null))
        .with_attribute(Attribute::new(ATTR_MY_PRODUCTION_LIMIT, "myProductionLimit", Access::READ_ONLY, Value::Null))
        .with_attribute(Attribute::new(
            ATTR_EFFECTIVE_CONSUMPTION_LIMIT,
            "effectiveConsumptionLimit",
            Access::READ_ONLY,
            Value::Null,
        ))
        .with_attribute(Attribute::new(
            ATTR_EFFECTIVE_PRODUCTION_LIMIT,
            "effectiveProductionLimit",
            Access::READ_ONLY,
            Value::Null,
        ))
        .with_attribute(Attribute::new(ATTR_MY_SETPOINT, "mySetpoint", Access::READ_ONLY, Value::Null))
        .with_attribute(Attribute::new(
            ATTR_EFFECTIVE_SETPOINT,
            "effectiveSetpoint",
            Access::READ_ONLY,
            Value::Null,
        ))
        .with_attribute(Attribute::new(ATTR_CONTROL_STATE, "controlState", Access::READ_ONLY, Value::Null));

    {
        let resolver = Arc::clone(&resolver);
        feature = feature.with_command(Command::new(CMD_SET_LIMIT, "SetLimit", move |ctx, params| {
            let Some(Value::Map(entries)) = params else {
                return Err(StatusCode::InvalidParameter);
            };
            let kind = match int_param(&entries, "kind") {
                Some(0) => LimitKind::Consumption,
                Some(1) => LimitKind::Production,
                _ => return Err(StatusCode::InvalidParameter),
            };
            let value = int_param(&entries, "value").ok_or(StatusCode::InvalidParameter)?;
            resolver.set_limit(kind, ctx, value, duration_param(&entries));
            Ok(Value::Null)
        }));
    }
    {
        let resolver = Arc::clone(&resolver);
        feature = feature.with_command(Command::new(CMD_CLEAR_LIMIT, "ClearLimit", move |ctx, params| {
            let Some(Value::Map(entries)) = params else {
                return Err(StatusCode::InvalidParameter);
            };
            let kind = match int_param(&entries, "kind") {
                Some(0) => LimitKind::Consumption,
                Some(1) => LimitKind::Production,
                _ => return Err(StatusCode::InvalidParameter),
            };
            resolver.clear_limit(kind, ctx);
            Ok(Value::Null)
        }));
    }
    {
        let resolver = Arc::clone(&resolver);
        feature = feature.with_command(Command::new(CMD_SET_CURRENT_LIMITS, "SetCurrentLimits", move |ctx, params| {
            let Some(Value::Map(entries)) = params else {
                return Err(StatusCode::InvalidParameter);
            };
            let kind = match int_param(&entries, "kind") {
                Some(0) => LimitKind::Consumption,
                Some(1) => LimitKind::Production,
                _ => return Err(StatusCode::InvalidParameter),
            };
            let value = int_param(&entries, "value").ok_or(StatusCode::InvalidParameter)?;
            resolver.set_current_limits(kind, ctx, value, duration_param(&entries));
            Ok(Value::Null)
        }));
    }
    {
        let resolver = Arc::clone(&resolver);
        feature = feature.with_command(Command::new(CMD_CLEAR_CURRENT_LIMITS, "ClearCurrentLimits", move |ctx, params| {
            let Some(Value::Map(entries)) = params else {
                return Err(StatusCode::InvalidParameter);
            };
            let kind = match int_param(&entries, "kind") {
                Some(0) => LimitKind::Consumption,
                Some(1) => LimitKind::Production,
                _ => return Err(StatusCode::InvalidParameter),
            };
            resolver.clear_current_limits(kind, ctx);
            Ok(Value::Null)
        }));
    }
    {
        let resolver = Arc::clone(&resolver);
        feature = feature.with_command(Command::new(CMD_SET_SETPOINT, "SetSetpoint", move |ctx, params| {
            let Some(Value::Map(entries)) = params else {
                return Err(StatusCode::InvalidParameter);
            };
            let value = int_param(&entries, "value").ok_or(StatusCode::InvalidParameter)?;
            resolver.set_setpoint(ctx, value, duration_param(&entries));
            Ok(Value::Null)
        }));
    }
    {
        let resolver = Arc::clone(&resolver);
        feature = feature.with_command(Command::new(CMD_CLEAR_SETPOINT, "ClearSetpoint", move |ctx, _params| {
            resolver.clear_setpoint(ctx);
            Ok(Value::Null)
        }));
    }
    {
        let resolver = Arc::clone(&resolver);
        feature = feature.with_command(Command::new(CMD_PAUSE, "Pause", move |_ctx, _params| {
            resolver.set_override();
            Ok(Value::Null)
        }));
    }
    {
        let resolver = Arc::clone(&resolver);
        feature = feature.with_command(Command::new(CMD_RESUME, "Resume", move |_ctx, _params| {
            resolver.clear_override();
            Ok(Value::Null)
        }));
    }
    {
        let resolver = Arc::clone(&resolver);
        feature = feature.with_command(Command::new(CMD_STOP, "Stop", move |_ctx, _params| {
            resolver.set_override();
            Ok(Value::Null)
        }));
    }

    feature.with_read_hook(resolver)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(zone_id: &str, zone_type: ZoneType) -> RequestContext {
        RequestContext::new(zone_id, zone_type)
    }

    #[test]
    fn autonomous_moves_to_controlled_on_set_limit() {
        let resolver = LimitResolver::new(1000, 1000);
        assert_eq!(resolver.control_state(), ControlState::Autonomous);
        resolver.set_limit(LimitKind::Consumption, &ctx("grid-1", ZoneType::Grid), 3000, None);
        assert_eq!(resolver.control_state(), ControlState::Controlled);
    }

    #[test]
    fn clear_all_returns_to_autonomous_when_nothing_remains() {
        let resolver = LimitResolver::new(1000, 1000);
        resolver.set_limit(LimitKind::Consumption, &ctx("grid-1", ZoneType::Grid), 3000, None);
        resolver.clear_all();
        assert_eq!(resolver.control_state(), ControlState::Autonomous);
    }

    #[test]
    fn current_limit_only_enters_limited() {
        let resolver = LimitResolver::new(1000, 1000);
        resolver.set_current_limits(LimitKind::Consumption, &ctx("grid-1", ZoneType::Grid), 16, None);
        assert_eq!(resolver.control_state(), ControlState::Limited);
    }

    #[test]
    fn override_preserves_and_restores_prior_state() {
        let resolver = LimitResolver::new(1000, 1000);
        resolver.set_limit(LimitKind::Consumption, &ctx("grid-1", ZoneType::Grid), 3000, None);
        assert_eq!(resolver.control_state(), ControlState::Controlled);
        resolver.set_override();
        assert_eq!(resolver.control_state(), ControlState::Override(ControlStatePrior::Controlled));
        resolver.clear_override();
        assert_eq!(resolver.control_state(), ControlState::Controlled);
    }

    #[test]
    fn failsafe_reports_configured_defaults() {
        let resolver = LimitResolver::new(500, 750);
        resolver.set_limit(LimitKind::Consumption, &ctx("grid-1", ZoneType::Grid), 3000, None);
        resolver.enter_failsafe();
        let now = SystemTime::now();
        assert_eq!(resolver.effective_consumption_limit(now), Some(500));
        assert_eq!(resolver.effective_production_limit(now), Some(750));
    }

    #[test]
    fn exit_failsafe_restores_controlled() {
        let resolver = LimitResolver::new(500, 750);
        resolver.set_limit(LimitKind::Consumption, &ctx("grid-1", ZoneType::Grid), 3000, None);
        resolver.enter_failsafe();
        resolver.exit_failsafe();
        assert_eq!(resolver.control_state(), ControlState::Controlled);
    }

    #[test]
    fn my_limit_read_hook_returns_callers_own_value() {
        let resolver = LimitResolver::new(1000, 1000);
        resolver.set_limit(LimitKind::Consumption, &ctx("grid-1", ZoneType::Grid), 3000, None);
        resolver.set_limit(LimitKind::Consumption, &ctx("local-1", ZoneType::Local), 5000, None);

        let grid_view = resolver.read(&ctx("grid-1", ZoneType::Grid), ATTR_MY_CONSUMPTION_LIMIT).unwrap();
        assert_eq!(grid_view, Some(Value::Integer(3000.into())));

        let effective = resolver.read(&ctx("grid-1", ZoneType::Grid), ATTR_EFFECTIVE_CONSUMPTION_LIMIT).unwrap();
        assert_eq!(effective, Some(Value::Integer(3000.into())));
    }

    #[test]
    fn setpoint_resolution_prefers_grid_over_local() {
        let resolver = LimitResolver::new(1000, 1000);
        resolver.set_setpoint(&ctx("local-1", ZoneType::Local), 10, None);
        resolver.set_setpoint(&ctx("grid-1", ZoneType::Grid), 20, None);
        let effective = resolver.read(&ctx("grid-1", ZoneType::Grid), ATTR_EFFECTIVE_SETPOINT).unwrap();
        assert_eq!(effective, Some(Value::Integer(20.into())));
    }

    #[test]
    fn tick_reports_nothing_changed_with_no_limits_set() {
        let resolver = LimitResolver::new(1000, 1000);
        let now = SystemTime::now();
        assert!(resolver.tick(now).is_empty());
        assert!(resolver.tick(now).is_empty());
    }

    #[test]
    fn tick_reports_change_once_a_duration_bound_limit_expires() {
        let resolver = LimitResolver::new(1000, 1000);
        let now = SystemTime::now();
        let expiry = now + std::time::Duration::from_secs(60);
        resolver.set_limit(LimitKind::Consumption, &ctx("grid-1", ZoneType::Grid), 3000, Some(expiry));

        let changed = resolver.tick(now);
        assert!(changed.contains(&ATTR_EFFECTIVE_CONSUMPTION_LIMIT));

        // Still within the window: nothing further changed since the last tick.
        let changed = resolver.tick(now);
        assert!(changed.is_empty());

        let after_expiry = expiry + std::time::Duration::from_secs(1);
        let changed = resolver.tick(after_expiry);
        assert!(changed.contains(&ATTR_EFFECTIVE_CONSUMPTION_LIMIT));

        // Expired value is now stable; a later tick reports no further change.
        let changed = resolver.tick(after_expiry + std::time::Duration::from_secs(1));
        assert!(changed.is_empty());
    }

    #[test]
    fn tick_reports_change_on_failsafe_entry_and_exit() {
        let resolver = LimitResolver::new(500, 750);
        resolver.set_limit(LimitKind::Consumption, &ctx("grid-1", ZoneType::Grid), 3000, None);
        let now = SystemTime::now();
        resolver.tick(now);

        resolver.enter_failsafe();
        let changed = resolver.tick(now);
        assert!(changed.contains(&ATTR_EFFECTIVE_CONSUMPTION_LIMIT));

        resolver.exit_failsafe();
        let changed = resolver.tick(now);
        assert!(changed.contains(&ATTR_EFFECTIVE_CONSUMPTION_LIMIT));
    }
}
