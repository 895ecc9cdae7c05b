//! Stream constraints and the ordered fallback plan.
//!
//! Each tier pairs a tag with the constraints it requests. The controller
//! walks the plan front to back and stops at the first tier the host accepts.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{ResolutionPreference, SessionPreferences};

/// An `ideal`/`max` pair for one numeric constraint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DimensionRange {
    pub ideal: f64,
    pub max: Option<f64>,
}

impl DimensionRange {
    fn ideal(ideal: f64) -> Self {
        Self { ideal, max: None }
    }

    fn capped(ideal: f64, max: f64) -> Self {
        Self {
            ideal,
            max: Some(max),
        }
    }
}

/// Video constraints passed to the host. All `None` means "video, anything".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StreamConstraints {
    /// Exact device identifier.
    pub device_id: Option<String>,
    pub width: Option<DimensionRange>,
    pub height: Option<DimensionRange>,
    pub frame_rate: Option<DimensionRange>,
}

impl StreamConstraints {
    /// Unconstrained request.
    pub fn minimal() -> Self {
        Self::default()
    }

    /// ~1280x720 @ 30.
    pub fn high(device_id: Option<String>) -> Self {
        Self {
            device_id,
            width: Some(DimensionRange::ideal(1280.0)),
            height: Some(DimensionRange::ideal(720.0)),
            frame_rate: Some(DimensionRange::capped(30.0, 30.0)),
        }
    }

    /// 640x480 @ 24 (max 30).
    pub fn low(device_id: Option<String>) -> Self {
        Self {
            device_id,
            width: Some(DimensionRange::capped(640.0, 640.0)),
            height: Some(DimensionRange::capped(480.0, 480.0)),
            frame_rate: Some(DimensionRange::capped(24.0, 30.0)),
        }
    }

    /// Fixed 320x240 @ 15 used by the one-shot safe-mode recovery.
    pub fn recovery() -> Self {
        Self {
            device_id: None,
            width: Some(DimensionRange::capped(320.0, 320.0)),
            height: Some(DimensionRange::capped(240.0, 240.0)),
            frame_rate: Some(DimensionRange::capped(15.0, 15.0)),
        }
    }

    pub fn is_minimal(&self) -> bool {
        *self == Self::minimal()
    }
}

/// Which combination of resolution and device usage produced a stream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../types/generated/")]
pub enum ConstraintTier {
    /// 1: high resolution, explicit device.
    HighWithDevice,
    /// 2: low resolution, explicit device.
    LowWithDevice,
    /// 3: high resolution, any device.
    HighAnyDevice,
    /// 4: low resolution, any device.
    LowAnyDevice,
    /// 5: unconstrained request (safe-mode entry point).
    Minimal,
    /// Automatic 320x240 recovery after a safe-mode track ended.
    SafeRecovery,
}

impl ConstraintTier {
    /// Position in the fallback order (recovery sits after the plan).
    pub fn number(&self) -> u8 {
        match self {
            ConstraintTier::HighWithDevice => 1,
            ConstraintTier::LowWithDevice => 2,
            ConstraintTier::HighAnyDevice => 3,
            ConstraintTier::LowAnyDevice => 4,
            ConstraintTier::Minimal => 5,
            ConstraintTier::SafeRecovery => 6,
        }
    }

    /// Short tag used in diagnostics.
    pub fn tag(&self) -> &'static str {
        match self {
            ConstraintTier::HighWithDevice => "hi-res device",
            ConstraintTier::LowWithDevice => "low-res device",
            ConstraintTier::HighAnyDevice => "hi-res no-device",
            ConstraintTier::LowAnyDevice => "low-res no-device",
            ConstraintTier::Minimal => "safe video:true",
            ConstraintTier::SafeRecovery => "safe 320x240@15",
        }
    }

    fn uses_device(&self) -> bool {
        matches!(
            self,
            ConstraintTier::HighWithDevice | ConstraintTier::LowWithDevice
        )
    }

    fn is_high(&self) -> bool {
        matches!(
            self,
            ConstraintTier::HighWithDevice | ConstraintTier::HighAnyDevice
        )
    }

    /// Constraints this tier requests for the given device.
    pub fn constraints(&self, device_id: Option<&str>) -> StreamConstraints {
        let device = if self.uses_device() {
            device_id.map(str::to_string)
        } else {
            None
        };
        match self {
            ConstraintTier::HighWithDevice | ConstraintTier::HighAnyDevice => {
                StreamConstraints::high(device)
            }
            ConstraintTier::LowWithDevice | ConstraintTier::LowAnyDevice => {
                StreamConstraints::low(device)
            }
            ConstraintTier::Minimal => StreamConstraints::minimal(),
            ConstraintTier::SafeRecovery => StreamConstraints::recovery(),
        }
    }
}

impl std::fmt::Display for ConstraintTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tier {} ({})", self.number(), self.tag())
    }
}

/// One entry of a fallback plan.
#[derive(Debug, Clone, PartialEq)]
pub struct TierAttempt {
    pub tier: ConstraintTier,
    pub constraints: StreamConstraints,
}

const FULL_ORDER: [ConstraintTier; 4] = [
    ConstraintTier::HighWithDevice,
    ConstraintTier::LowWithDevice,
    ConstraintTier::HighAnyDevice,
    ConstraintTier::LowAnyDevice,
];

/// Build the ordered fallback plan for a start request.
///
/// Safe mode and minimal constraints collapse to the single minimal tier.
/// Device tiers need a device id (and no ignore flag); a low resolution
/// preference drops the high tiers. Order is never changed.
pub fn build_plan(prefs: &SessionPreferences) -> Vec<TierAttempt> {
    if prefs.safe_mode || prefs.minimal_constraints {
        return vec![TierAttempt {
            tier: ConstraintTier::Minimal,
            constraints: StreamConstraints::minimal(),
        }];
    }

    let device_id = if prefs.ignore_device_id {
        None
    } else {
        prefs.device_id.as_deref().filter(|id| !id.is_empty())
    };

    FULL_ORDER
        .iter()
        .filter(|tier| !tier.uses_device() || device_id.is_some())
        .filter(|tier| prefs.resolution == ResolutionPreference::High || !tier.is_high())
        .map(|tier| TierAttempt {
            tier: *tier,
            constraints: tier.constraints(device_id),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiers(plan: &[TierAttempt]) -> Vec<ConstraintTier> {
        plan.iter().map(|a| a.tier).collect()
    }

    #[test]
    fn test_full_plan_with_device() {
        let prefs = SessionPreferences {
            device_id: Some("cam-1".to_string()),
            ..Default::default()
        };
        let plan = build_plan(&prefs);
        assert_eq!(
            tiers(&plan),
            vec![
                ConstraintTier::HighWithDevice,
                ConstraintTier::LowWithDevice,
                ConstraintTier::HighAnyDevice,
                ConstraintTier::LowAnyDevice,
            ]
        );
        assert_eq!(plan[0].constraints.device_id.as_deref(), Some("cam-1"));
        assert_eq!(plan[1].constraints.device_id.as_deref(), Some("cam-1"));
        assert_eq!(plan[2].constraints.device_id, None);
        assert_eq!(plan[3].constraints.device_id, None);
    }

    #[test]
    fn test_plan_without_device_skips_device_tiers() {
        let plan = build_plan(&SessionPreferences::default());
        assert_eq!(
            tiers(&plan),
            vec![ConstraintTier::HighAnyDevice, ConstraintTier::LowAnyDevice]
        );
    }

    #[test]
    fn test_ignore_device_id() {
        let prefs = SessionPreferences {
            device_id: Some("cam-1".to_string()),
            ignore_device_id: true,
            ..Default::default()
        };
        let plan = build_plan(&prefs);
        assert!(plan.iter().all(|a| a.constraints.device_id.is_none()));
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn test_low_preference_drops_high_tiers() {
        let prefs = SessionPreferences {
            device_id: Some("cam-1".to_string()),
            resolution: ResolutionPreference::Low,
            ..Default::default()
        };
        assert_eq!(
            tiers(&build_plan(&prefs)),
            vec![ConstraintTier::LowWithDevice, ConstraintTier::LowAnyDevice]
        );
    }

    #[test]
    fn test_safe_and_minimal_plans() {
        let safe = build_plan(&SessionPreferences::safe());
        assert_eq!(tiers(&safe), vec![ConstraintTier::Minimal]);
        assert!(safe[0].constraints.is_minimal());

        let minimal = SessionPreferences {
            device_id: Some("cam-1".to_string()),
            minimal_constraints: true,
            ..Default::default()
        };
        assert_eq!(tiers(&build_plan(&minimal)), vec![ConstraintTier::Minimal]);
    }

    #[test]
    fn test_constraint_values() {
        let high = StreamConstraints::high(None);
        assert_eq!(high.width.unwrap().ideal, 1280.0);
        assert_eq!(high.height.unwrap().ideal, 720.0);

        let low = StreamConstraints::low(None);
        assert_eq!(low.width.unwrap().max, Some(640.0));
        assert_eq!(low.frame_rate.unwrap().ideal, 24.0);

        let recovery = StreamConstraints::recovery();
        assert_eq!(recovery.width.unwrap().max, Some(320.0));
        assert_eq!(recovery.height.unwrap().max, Some(240.0));
        assert_eq!(recovery.frame_rate.unwrap().max, Some(15.0));
        assert!(recovery.device_id.is_none());
    }

    #[test]
    fn test_tier_numbers_follow_fallback_order() {
        let numbers: Vec<u8> = FULL_ORDER.iter().map(|t| t.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert_eq!(ConstraintTier::Minimal.number(), 5);
    }
}
