//! Wizard session state machine.
//!
//! ```text
//! ShopInfo ──submit_shop_info──▶ DataInput ──submit_data──▶ Generating ──complete──▶ Report
//!    ▲                            │   ▲                          │                     │
//!    └───────────back─────────────┘   └──────────fail────────────┘                     │
//!                                     ▲                                                │
//!                                     └─────────────────────back───────────────────────┘
//! ```
//! `restart` returns to `ShopInfo` from any step except `Generating`.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::model::{
    AdjustmentData, OperationData, PromotionData, ReportData, ShopInfo,
};
use crate::validation::{business_warnings, validate_report, validate_shop_info, ValidationErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Step {
    ShopInfo,
    DataInput,
    Generating,
    Report,
}

impl Step {
    /// Position in the three-step progress indicator.
    pub fn index(self) -> usize {
        match self {
            Step::ShopInfo => 0,
            Step::DataInput | Step::Generating => 1,
            Step::Report => 2,
        }
    }
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("当前步骤({step:?})不允许{action}")]
    InvalidTransition { step: Step, action: &'static str },

    #[error("表单验证失败: {0}")]
    Invalid(#[from] ValidationErrors),

    #[error("数据存在需要确认的警告")]
    UnacknowledgedWarnings(Vec<String>),

    #[error("报告尚未生成")]
    NoReport,
}

/// Second-step form submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataSubmission {
    pub operation_data: OperationData,
    pub promotion_data: Option<PromotionData>,
    pub adjustment_data: Option<AdjustmentData>,
    /// Proceed despite business-logic warnings.
    pub acknowledge_warnings: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSession {
    pub id: Uuid,
    pub step: Step,
    pub shop_info: Option<ShopInfo>,
    pub operation_data: Option<OperationData>,
    pub promotion_data: Option<PromotionData>,
    pub adjustment_data: Option<AdjustmentData>,
    pub report_html: Option<String>,
    pub last_error: Option<String>,
    pub warnings: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    last_active: Instant,
}

impl WizardSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            step: Step::ShopInfo,
            shop_info: None,
            operation_data: None,
            promotion_data: None,
            adjustment_data: None,
            report_html: None,
            last_error: None,
            warnings: Vec::new(),
            created_at: now,
            updated_at: now,
            last_active: Instant::now(),
        }
    }

    pub fn step_index(&self) -> usize {
        self.step.index()
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.last_active = Instant::now();
    }

    pub(crate) fn last_active(&self) -> Instant {
        self.last_active
    }

    fn ensure_not_generating(&self, action: &'static str) -> Result<(), WizardError> {
        if self.step == Step::Generating {
            return Err(WizardError::InvalidTransition {
                step: self.step,
                action,
            });
        }
        Ok(())
    }

    /// Accept validated shop info and move on to data entry.
    pub fn submit_shop_info(&mut self, info: ShopInfo) -> Result<(), WizardError> {
        self.ensure_not_generating("修改店铺信息")?;
        validate_shop_info(&info)?;
        self.shop_info = Some(info);
        self.last_error = None;
        self.step = Step::DataInput;
        Ok(())
    }

    /// Accept the data step and enter `Generating`.
    ///
    /// The submitted values are kept even when rejected, so the form can be
    /// redisplayed. Returns the report data to generate from.
    pub fn submit_data(&mut self, submission: DataSubmission) -> Result<ReportData, WizardError> {
        if self.step != Step::DataInput {
            return Err(WizardError::InvalidTransition {
                step: self.step,
                action: "提交数据",
            });
        }
        let shop_info = self.shop_info.clone().unwrap_or_default();

        self.operation_data = Some(submission.operation_data);
        self.promotion_data = submission.promotion_data;
        self.adjustment_data = submission.adjustment_data.clone();

        let data = ReportData::new(
            shop_info,
            submission.operation_data,
            submission.promotion_data,
            submission.adjustment_data,
        );
        validate_report(&data)?;

        self.warnings = business_warnings(&data.operation_data, data.promotion_data.as_ref());
        if !self.warnings.is_empty() && !submission.acknowledge_warnings {
            return Err(WizardError::UnacknowledgedWarnings(self.warnings.clone()));
        }

        self.last_error = None;
        self.step = Step::Generating;
        Ok(data)
    }

    pub fn complete(&mut self, html: String) -> Result<(), WizardError> {
        if self.step != Step::Generating {
            return Err(WizardError::InvalidTransition {
                step: self.step,
                action: "完成报告",
            });
        }
        self.report_html = Some(html);
        self.last_error = None;
        self.step = Step::Report;
        Ok(())
    }

    /// Record a generation failure and return to data entry.
    pub fn fail(&mut self, error: String) -> Result<(), WizardError> {
        if self.step != Step::Generating {
            return Err(WizardError::InvalidTransition {
                step: self.step,
                action: "记录失败",
            });
        }
        self.last_error = Some(error);
        self.step = Step::DataInput;
        Ok(())
    }

    pub fn back(&mut self) -> Result<(), WizardError> {
        self.step = match self.step {
            Step::DataInput => Step::ShopInfo,
            Step::Report => Step::DataInput,
            step => {
                return Err(WizardError::InvalidTransition {
                    step,
                    action: "返回上一步",
                })
            }
        };
        self.last_error = None;
        Ok(())
    }

    /// Clear all data and start over, keeping the session identity.
    pub fn restart(&mut self) -> Result<(), WizardError> {
        self.ensure_not_generating("重新开始")?;
        let id = self.id;
        let created_at = self.created_at;
        *self = Self::new();
        self.id = id;
        self.created_at = created_at;
        Ok(())
    }

    pub fn report(&self) -> Result<&str, WizardError> {
        match (&self.step, &self.report_html) {
            (Step::Report, Some(html)) => Ok(html),
            _ => Err(WizardError::NoReport),
        }
    }

    pub fn shop_name(&self) -> &str {
        self.shop_info
            .as_ref()
            .map(|info| info.shop_name.as_str())
            .unwrap_or("")
    }
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}
