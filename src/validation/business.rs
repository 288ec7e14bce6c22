//! Cross-field business logic checks.
//!
//! These never reject input outright. Callers surface them as warnings that the
//! user confirms before a report is generated.

use crate::model::{to_fixed, OperationData, PeriodData, PromotionData};

/// Maximum gap (percentage points) between an entered rate and the computed one.
pub const RATE_TOLERANCE: f64 = 5.0;

/// Week-over-week change ratio above which a metric looks anomalous (500%).
const ANOMALOUS_CHANGE_RATIO: f64 = 5.0;

/// Visit conversion above this percentage is unusually high.
const HIGH_VISIT_CONVERSION: f64 = 50.0;

/// Order conversion above this percentage is unusually high.
const HIGH_ORDER_CONVERSION: f64 = 30.0;

/// Funnel ordering checks for one period: visits ≤ exposure, orders ≤ visits.
///
/// A zero denominator disables the matching check.
pub fn check_data_consistency(exposure_count: f64, visit_count: f64, order_count: f64) -> Vec<String> {
    let mut errors = Vec::new();

    if visit_count > exposure_count && exposure_count > 0.0 {
        errors.push("入店人数不应超过曝光人数".to_string());
    }

    if order_count > visit_count && visit_count > 0.0 {
        errors.push("下单人数不应超过入店人数".to_string());
    }

    errors
}

/// Whether `actual` lies within `tolerance` points of `expected`.
pub fn validate_conversion_rate(actual: f64, expected: f64, tolerance: f64) -> bool {
    (actual - expected).abs() <= tolerance
}

pub fn calculate_visit_conversion_rate(visit_count: f64, exposure_count: f64) -> f64 {
    if exposure_count > 0.0 {
        visit_count / exposure_count * 100.0
    } else {
        0.0
    }
}

pub fn calculate_order_conversion_rate(order_count: f64, visit_count: f64) -> f64 {
    if visit_count > 0.0 {
        order_count / visit_count * 100.0
    } else {
        0.0
    }
}

fn is_percentage(rate: f64) -> bool {
    (0.0..=100.0).contains(&rate)
}

/// Range predicates for the percentage fields.
pub mod ranges {
    use super::is_percentage;

    pub fn visit_conversion_rate(rate: f64) -> bool {
        is_percentage(rate)
    }

    pub fn order_conversion_rate(rate: f64) -> bool {
        is_percentage(rate)
    }

    pub fn repurchase_rate(rate: f64) -> bool {
        is_percentage(rate)
    }

    pub fn promotion_visit_rate(rate: f64) -> bool {
        is_percentage(rate)
    }
}

/// Kind of conversion rate checked by [`unusually_high_conversion_rate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionKind {
    Visit,
    Order,
}

/// A change of more than 500% either way. Never anomalous when last week is zero.
pub fn week_over_week_anomaly(this_week: f64, last_week: f64) -> bool {
    if last_week == 0.0 {
        return false;
    }
    ((this_week - last_week) / last_week).abs() > ANOMALOUS_CHANGE_RATIO
}

pub fn unusually_high_conversion_rate(rate: f64, kind: ConversionKind) -> bool {
    let threshold = match kind {
        ConversionKind::Visit => HIGH_VISIT_CONVERSION,
        ConversionKind::Order => HIGH_ORDER_CONVERSION,
    };
    rate > threshold
}

fn funnel_warnings(warnings: &mut Vec<String>, operation: &OperationData) {
    let weeks = [("本周", &operation.this_week), ("上周", &operation.last_week)];
    for (week, period) in weeks {
        if period.visit_count > period.exposure_count {
            warnings.push(format!("{}入店人数不应超过曝光人数", week));
        }
    }
    for (week, period) in weeks {
        if period.order_count > period.visit_count {
            warnings.push(format!("{}下单人数不应超过入店人数", week));
        }
    }
}

fn visit_rate_warning(warnings: &mut Vec<String>, week: &str, period: &PeriodData) {
    let computed = calculate_visit_conversion_rate(period.visit_count, period.exposure_count);
    if !validate_conversion_rate(period.visit_conversion_rate, computed, RATE_TOLERANCE) {
        warnings.push(format!(
            "{}入店转化率可能不准确。根据数据计算应为 {}%",
            week,
            to_fixed(computed, 2)
        ));
    }
}

/// Warnings shown before generation. An empty list means nothing to confirm.
pub fn business_warnings(operation: &OperationData, promotion: Option<&PromotionData>) -> Vec<String> {
    let mut warnings = Vec::new();

    funnel_warnings(&mut warnings, operation);

    visit_rate_warning(&mut warnings, "本周", &operation.this_week);
    visit_rate_warning(&mut warnings, "上周", &operation.last_week);

    if let Some(promo) = promotion {
        if promo.this_week.visit_count > promo.this_week.exposure_count {
            warnings.push("本周推广进店量不应超过推广曝光量".to_string());
        }
        if promo.last_week.visit_count > promo.last_week.exposure_count {
            warnings.push("上周推广进店量不应超过推广曝光量".to_string());
        }

        let computed = calculate_visit_conversion_rate(
            promo.this_week.visit_count,
            promo.this_week.exposure_count,
        );
        if !validate_conversion_rate(promo.this_week.visit_rate, computed, RATE_TOLERANCE) {
            warnings.push(format!(
                "本周推广进店率可能不准确。根据数据计算应为 {}%",
                to_fixed(computed, 2)
            ));
        }
    }

    warnings
}
