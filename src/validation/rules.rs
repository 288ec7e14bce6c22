//! Structural validation rules for form input.

use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::model::{
    AdjustmentData, OperationData, PeriodData, PromotionData, PromotionPeriod, ReportData,
    ShopInfo,
};

const SHOP_NAME_MAX: usize = 50;
const ADDRESS_MAX: usize = 200;

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Dotted JSON path, e.g. `thisWeek.exposureCount`.
    pub path: String,
    pub message: String,
}

impl FieldError {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// All rule violations found in one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// First message recorded for `path`, if any.
    pub fn message_for(&self, path: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.path == path)
            .map(|e| e.message.as_str())
    }

    /// Re-root every path under `prefix`.
    pub fn with_prefix(self, prefix: &str) -> Self {
        ValidationErrors(
            self.0
                .into_iter()
                .map(|e| FieldError::new(join(prefix, &e.path), e.message))
                .collect(),
        )
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

fn business_hours_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{2}):(\d{2})\s*-\s*(\d{2}):(\d{2})$").expect("valid business hours pattern")
    })
}

/// Accepts `HH:MM - HH:MM` (whitespace around the dash optional) with real clock values.
fn is_valid_business_hours(value: &str) -> bool {
    let Some(caps) = business_hours_pattern().captures(value) else {
        return false;
    };
    let field = |i: usize| caps[i].parse::<u32>().unwrap_or(u32::MAX);
    field(1) < 24 && field(2) < 60 && field(3) < 24 && field(4) < 60
}

fn join(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

/// Shop info rules. Lengths count characters, not bytes.
pub fn validate_shop_info(info: &ShopInfo) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    let name_len = info.shop_name.chars().count();
    if name_len == 0 {
        errors.push(FieldError::new("shopName", "店铺名称不能为空"));
    } else if name_len > SHOP_NAME_MAX {
        errors.push(FieldError::new("shopName", "店铺名称不能超过50个字符"));
    }

    if info.category.is_empty() {
        errors.push(FieldError::new("category", "经营品类不能为空"));
    }

    let address_len = info.address.chars().count();
    if address_len == 0 {
        errors.push(FieldError::new("address", "店铺地址不能为空"));
    } else if address_len > ADDRESS_MAX {
        errors.push(FieldError::new("address", "地址不能超过200个字符"));
    }

    if info.business_hours.is_empty() {
        errors.push(FieldError::new("businessHours", "营业时间不能为空"));
    } else if !is_valid_business_hours(&info.business_hours) {
        errors.push(FieldError::new(
            "businessHours",
            "营业时间格式错误，请使用\"06:30 - 15:30\"格式",
        ));
    }

    ValidationErrors(errors).into_result()
}

fn check_count(errors: &mut Vec<FieldError>, path: String, value: f64, negative_msg: &str) {
    if !value.is_finite() {
        errors.push(FieldError::new(path, "必须为有效数字"));
        return;
    }
    if value.fract() != 0.0 {
        errors.push(FieldError::new(path.clone(), "必须为整数"));
    }
    if value < 0.0 {
        errors.push(FieldError::new(path, negative_msg));
    }
}

fn check_rate(errors: &mut Vec<FieldError>, path: String, value: f64) {
    if !value.is_finite() {
        errors.push(FieldError::new(path, "必须为有效数字"));
    } else if value < 0.0 {
        errors.push(FieldError::new(path, "不能为负数"));
    } else if value > 100.0 {
        errors.push(FieldError::new(path, "不能超过100%"));
    }
}

fn check_non_negative(errors: &mut Vec<FieldError>, path: String, value: f64, msg: &str) {
    if !value.is_finite() {
        errors.push(FieldError::new(path, "必须为有效数字"));
    } else if value < 0.0 {
        errors.push(FieldError::new(path, msg));
    }
}

fn collect_period(errors: &mut Vec<FieldError>, prefix: &str, period: &PeriodData) {
    check_count(errors, join(prefix, "exposureCount"), period.exposure_count, "不能为负数");
    check_count(errors, join(prefix, "visitCount"), period.visit_count, "不能为负数");
    check_rate(errors, join(prefix, "visitConversionRate"), period.visit_conversion_rate);
    check_rate(errors, join(prefix, "orderConversionRate"), period.order_conversion_rate);
    check_count(errors, join(prefix, "orderCount"), period.order_count, "不能为负数");
    check_rate(errors, join(prefix, "repurchaseRate"), period.repurchase_rate);
}

/// Rules for a single week of operation data.
pub fn validate_period_data(period: &PeriodData) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    collect_period(&mut errors, "", period);
    ValidationErrors(errors).into_result()
}

/// Rules for both weeks of operation data.
pub fn validate_operation_data(data: &OperationData) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    collect_period(&mut errors, "thisWeek", &data.this_week);
    collect_period(&mut errors, "lastWeek", &data.last_week);
    ValidationErrors(errors).into_result()
}

fn collect_promotion(errors: &mut Vec<FieldError>, prefix: &str, period: &PromotionPeriod) {
    check_non_negative(errors, join(prefix, "cost"), period.cost, "费用不能为负数");
    check_count(errors, join(prefix, "exposureCount"), period.exposure_count, "曝光量不能为负数");
    check_count(errors, join(prefix, "visitCount"), period.visit_count, "进店量不能为负数");

    let rate_path = join(prefix, "visitRate");
    if !period.visit_rate.is_finite() {
        errors.push(FieldError::new(rate_path, "必须为有效数字"));
    } else if !(0.0..=100.0).contains(&period.visit_rate) {
        errors.push(FieldError::new(rate_path, "进店率应在0-100%之间"));
    }

    check_non_negative(
        errors,
        join(prefix, "costPerVisit"),
        period.cost_per_visit,
        "单次成本不能为负数",
    );
}

/// Rules for both weeks of promotion data.
pub fn validate_promotion_data(data: &PromotionData) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    collect_promotion(&mut errors, "thisWeek", &data.this_week);
    collect_promotion(&mut errors, "lastWeek", &data.last_week);
    ValidationErrors(errors).into_result()
}

/// Adjustment lists must not repeat an item.
pub fn validate_adjustment_data(data: &AdjustmentData) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    for (path, list) in [
        ("thisWeekAdjustments", &data.this_week_adjustments),
        ("lastWeekAdjustments", &data.last_week_adjustments),
    ] {
        let mut seen = HashSet::new();
        if list.iter().any(|item| !seen.insert(*item)) {
            errors.push(FieldError::new(path, "调整项目不能重复"));
        }
    }
    ValidationErrors(errors).into_result()
}

fn extend_prefixed(errors: &mut Vec<FieldError>, prefix: &str, result: Result<(), ValidationErrors>) {
    if let Err(found) = result {
        errors.extend(found.with_prefix(prefix).0);
    }
}

/// Validate a complete report submission. Paths are rooted at the report object.
pub fn validate_report(data: &ReportData) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    extend_prefixed(&mut errors, "shopInfo", validate_shop_info(&data.shop_info));
    extend_prefixed(
        &mut errors,
        "operationData",
        validate_operation_data(&data.operation_data),
    );
    if let Some(promotion) = &data.promotion_data {
        extend_prefixed(&mut errors, "promotionData", validate_promotion_data(promotion));
    }
    if let Some(adjustment) = &data.adjustment_data {
        extend_prefixed(&mut errors, "adjustmentData", validate_adjustment_data(adjustment));
    }
    ValidationErrors(errors).into_result()
}
