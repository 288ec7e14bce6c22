//! Shop adjustment checklist.

use serde::{Deserialize, Serialize};

/// Operational work items carried out on a shop during a week.
///
/// Serialized by their display label so stored drafts stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdjustmentOption {
    #[serde(rename = "商圈调研和店铺方案的制定")]
    MarketResearch,
    #[serde(rename = "店招海报头像的设计并上线")]
    StoreDesign,
    #[serde(rename = "分类栏优化并上线")]
    CategoryOptimization,
    #[serde(rename = "全店产品关键词优化并上线")]
    KeywordOptimization,
    #[serde(rename = "全店菜品描述并上线")]
    ProductDescription,
    #[serde(rename = "评价解释差评申诉维护")]
    ReviewManagement,
    #[serde(rename = "图片墙设计并上线")]
    ImageWall,
    #[serde(rename = "动图设计并上线")]
    AnimatedImages,
    #[serde(rename = "品牌故事设计并上线")]
    BrandStory,
    #[serde(rename = "全店图设计并上线")]
    StoreImages,
    #[serde(rename = "精准营销发券")]
    PrecisionMarketing,
    #[serde(rename = "每日群发简报")]
    DailyReports,
    #[serde(rename = "店铺数据周报分析")]
    WeeklyAnalysis,
    #[serde(rename = "店铺分解析")]
    StoreAnalysis,
    #[serde(rename = "新品上线和优化")]
    NewProducts,
    #[serde(rename = "点金推广的ROI调整")]
    RoiAdjustment,
    #[serde(rename = "视频店招的制作并上线")]
    VideoStoreSign,
}

impl AdjustmentOption {
    pub const ALL: [AdjustmentOption; 17] = [
        Self::MarketResearch,
        Self::StoreDesign,
        Self::CategoryOptimization,
        Self::KeywordOptimization,
        Self::ProductDescription,
        Self::ReviewManagement,
        Self::ImageWall,
        Self::AnimatedImages,
        Self::BrandStory,
        Self::StoreImages,
        Self::PrecisionMarketing,
        Self::DailyReports,
        Self::WeeklyAnalysis,
        Self::StoreAnalysis,
        Self::NewProducts,
        Self::RoiAdjustment,
        Self::VideoStoreSign,
    ];

    /// Human readable label, identical to the serialized form.
    pub fn label(self) -> &'static str {
        match self {
            Self::MarketResearch => "商圈调研和店铺方案的制定",
            Self::StoreDesign => "店招海报头像的设计并上线",
            Self::CategoryOptimization => "分类栏优化并上线",
            Self::KeywordOptimization => "全店产品关键词优化并上线",
            Self::ProductDescription => "全店菜品描述并上线",
            Self::ReviewManagement => "评价解释差评申诉维护",
            Self::ImageWall => "图片墙设计并上线",
            Self::AnimatedImages => "动图设计并上线",
            Self::BrandStory => "品牌故事设计并上线",
            Self::StoreImages => "全店图设计并上线",
            Self::PrecisionMarketing => "精准营销发券",
            Self::DailyReports => "每日群发简报",
            Self::WeeklyAnalysis => "店铺数据周报分析",
            Self::StoreAnalysis => "店铺分解析",
            Self::NewProducts => "新品上线和优化",
            Self::RoiAdjustment => "点金推广的ROI调整",
            Self::VideoStoreSign => "视频店招的制作并上线",
        }
    }
}

/// Adjustment items for the current and previous week.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdjustmentData {
    pub this_week_adjustments: Vec<AdjustmentOption>,
    pub last_week_adjustments: Vec<AdjustmentOption>,
}

impl AdjustmentData {
    /// Check or uncheck an item for one week. Checking twice keeps a single entry.
    pub fn toggle(&mut self, option: AdjustmentOption, this_week: bool, checked: bool) {
        let list = if this_week {
            &mut self.this_week_adjustments
        } else {
            &mut self.last_week_adjustments
        };
        if checked {
            if !list.contains(&option) {
                list.push(option);
            }
        } else {
            list.retain(|item| *item != option);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.this_week_adjustments.is_empty() && self.last_week_adjustments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_match_serialized_form() {
        for option in AdjustmentOption::ALL {
            let json = serde_json::to_value(option).unwrap();
            assert_eq!(json, serde_json::Value::String(option.label().to_string()));
        }
    }

    #[test]
    fn test_toggle() {
        let mut data = AdjustmentData::default();
        data.toggle(AdjustmentOption::ImageWall, true, true);
        data.toggle(AdjustmentOption::ImageWall, true, true);
        data.toggle(AdjustmentOption::BrandStory, false, true);
        assert_eq!(data.this_week_adjustments, vec![AdjustmentOption::ImageWall]);

        data.toggle(AdjustmentOption::ImageWall, true, false);
        assert!(data.this_week_adjustments.is_empty());
        assert!(!data.is_empty());
    }
}
