//! Shop, operation and promotion data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::adjustment::AdjustmentData;

/// Static descriptive fields of a shop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShopInfo {
    /// Display name of the shop.
    pub shop_name: String,
    /// Business category (e.g. "中式快餐").
    pub category: String,
    /// Street address.
    pub address: String,
    /// Opening hours in `HH:MM - HH:MM` form.
    pub business_hours: String,
}

/// One week of funnel metrics.
///
/// Counts arrive as JSON numbers; validation enforces that they are whole.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PeriodData {
    /// People who saw the shop.
    pub exposure_count: f64,
    /// People who entered the shop page.
    pub visit_count: f64,
    /// Visit conversion rate (%).
    pub visit_conversion_rate: f64,
    /// Order conversion rate (%).
    pub order_conversion_rate: f64,
    /// People who placed an order.
    pub order_count: f64,
    /// Repurchase rate (%).
    pub repurchase_rate: f64,
}

/// Operation data for the current and the previous week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OperationData {
    pub this_week: PeriodData,
    pub last_week: PeriodData,
}

/// Week-over-week growth entered instead of last week's raw values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeeklyGrowth {
    pub exposure_count: f64,
    pub visit_count: f64,
    pub visit_conversion_rate: f64,
    pub order_conversion_rate: f64,
    pub order_count: f64,
    /// Accepted for form compatibility; repurchase rate is always entered by hand.
    pub repurchase_rate: f64,
}

impl OperationData {
    /// Rebuild last week's figures from this week's values and the growth deltas.
    ///
    /// Each derived value is clamped at zero. The repurchase rate is left untouched.
    pub fn derive_last_week(&mut self, growth: &WeeklyGrowth) {
        let this = self.this_week;
        let last = &mut self.last_week;
        last.exposure_count = (this.exposure_count - growth.exposure_count).max(0.0);
        last.visit_count = (this.visit_count - growth.visit_count).max(0.0);
        last.visit_conversion_rate =
            (this.visit_conversion_rate - growth.visit_conversion_rate).max(0.0);
        last.order_conversion_rate =
            (this.order_conversion_rate - growth.order_conversion_rate).max(0.0);
        last.order_count = (this.order_count - growth.order_count).max(0.0);
    }
}

/// One week of paid promotion metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromotionPeriod {
    /// Spend in CNY.
    pub cost: f64,
    /// Promoted impressions.
    pub exposure_count: f64,
    /// Visits from promotion.
    pub visit_count: f64,
    /// Promotion visit rate (%).
    pub visit_rate: f64,
    /// Spend per visit in CNY.
    pub cost_per_visit: f64,
}

/// Promotion data for the current and the previous week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromotionData {
    pub this_week: PromotionPeriod,
    pub last_week: PromotionPeriod,
}

/// Everything the report prompt is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub shop_info: ShopInfo,
    pub operation_data: OperationData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion_data: Option<PromotionData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjustment_data: Option<AdjustmentData>,
    #[serde(default = "Utc::now")]
    pub generated_at: DateTime<Utc>,
}

impl ReportData {
    /// Assemble report data stamped with the current time.
    pub fn new(
        shop_info: ShopInfo,
        operation_data: OperationData,
        promotion_data: Option<PromotionData>,
        adjustment_data: Option<AdjustmentData>,
    ) -> Self {
        Self {
            shop_info,
            operation_data,
            promotion_data,
            adjustment_data,
            generated_at: Utc::now(),
        }
    }
}

/// Outcome envelope of a report generation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    /// Report HTML on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(data: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data.into()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_last_week_clamps_and_skips_repurchase() {
        let mut data = OperationData {
            this_week: PeriodData {
                exposure_count: 1000.0,
                visit_count: 150.0,
                visit_conversion_rate: 15.0,
                order_conversion_rate: 20.0,
                order_count: 30.0,
                repurchase_rate: 25.0,
            },
            last_week: PeriodData {
                repurchase_rate: 12.5,
                ..PeriodData::default()
            },
        };
        let growth = WeeklyGrowth {
            exposure_count: 200.0,
            visit_count: 500.0,
            visit_conversion_rate: 2.5,
            order_conversion_rate: 0.0,
            order_count: 10.0,
            repurchase_rate: 99.0,
        };

        data.derive_last_week(&growth);

        assert_eq!(data.last_week.exposure_count, 800.0);
        assert_eq!(data.last_week.visit_count, 0.0);
        assert_eq!(data.last_week.visit_conversion_rate, 12.5);
        assert_eq!(data.last_week.order_conversion_rate, 20.0);
        assert_eq!(data.last_week.order_count, 20.0);
        assert_eq!(data.last_week.repurchase_rate, 12.5);
    }

    #[test]
    fn test_report_data_camel_case_wire_format() {
        let json = serde_json::json!({
            "shopInfo": {
                "shopName": "测试餐厅",
                "category": "中式快餐",
                "address": "北京市朝阳区测试街道123号",
                "businessHours": "09:00-22:00"
            },
            "operationData": {
                "thisWeek": { "exposureCount": 1000, "visitCount": 150 },
                "lastWeek": {}
            },
            "generatedAt": "2024-01-01T00:00:00Z"
        });

        let data: ReportData = serde_json::from_value(json).unwrap();
        assert_eq!(data.shop_info.shop_name, "测试餐厅");
        assert_eq!(data.operation_data.this_week.visit_count, 150.0);
        assert_eq!(data.operation_data.last_week.exposure_count, 0.0);
        assert!(data.promotion_data.is_none());
        assert_eq!(data.generated_at.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_api_response_omits_empty_fields() {
        let value = serde_json::to_value(ApiResponse::failure("boom")).unwrap();
        assert_eq!(value, serde_json::json!({ "success": false, "error": "boom" }));
    }
}
