//! Prompt template for the weekly operations report.

use crate::model::{to_fixed, AdjustmentData, AdjustmentOption, PromotionData, ReportData};

/// Style sheet the model is asked to reuse so reports look alike.
const REFERENCE_STYLE: &str = r#"<style>
.report-container { max-width: 1200px; margin: 0 auto; padding: 30px; font-family: 'Microsoft YaHei', 'Arial', sans-serif; background: #f8f9fa; color: #333; border-radius: 15px; box-shadow: 0 8px 16px rgba(0,0,0,0.1); }
.report-title { text-align: center; color: #2c3e50; margin-bottom: 30px; font-size: 28px; font-weight: bold; }
.info-card { background: white; border-radius: 12px; padding: 25px; margin: 20px 0; box-shadow: 0 4px 12px rgba(0,0,0,0.1); border: 1px solid #e3e8ee; }
.info-card h2 { color: #2c3e50; margin-bottom: 20px; font-size: 20px; border-bottom: 2px solid #3498db; padding-bottom: 10px; }
.data-table { width: 100%; border-collapse: collapse; margin: 20px 0; background: white; border-radius: 8px; overflow: hidden; box-shadow: 0 4px 12px rgba(0,0,0,0.1); }
.data-table th { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 15px; text-align: center; font-weight: bold; font-size: 14px; }
.data-table td { padding: 12px 15px; text-align: center; border-bottom: 1px solid #eee; font-size: 14px; }
.data-table tr:hover { background-color: #f8f9fa; }
.trend-up { color: #27ae60; font-weight: bold; background: rgba(39, 174, 96, 0.1); padding: 4px 8px; border-radius: 4px; }
.trend-down { color: #e74c3c; font-weight: bold; background: rgba(231, 76, 60, 0.1); padding: 4px 8px; border-radius: 4px; }
.analysis-section { margin: 25px 0; line-height: 1.8; }
.analysis-section h3 { color: #2c3e50; border-left: 4px solid #3498db; padding-left: 15px; margin: 20px 0 15px 0; font-size: 18px; }
.analysis-section p { margin: 12px 0; color: #555; }
.highlight-box { background: linear-gradient(135deg, #667eea20, #764ba220); border-left: 4px solid #667eea; padding: 15px; margin: 15px 0; border-radius: 0 8px 8px 0; }
</style>"#;

const CONTENT_REQUIREMENTS: &str = "\
**内容深度要求**：
- 数据趋势分析：每个核心指标至少2-3句专业分析，解释变化原因和影响
- 问题诊断：基于数据识别具体问题和机会点，提供根因分析
- 改进建议：提供至少8-10条具体可执行的建议，包含优先级和预期效果
- 行动计划：包含时间安排和执行步骤的详细计划，分为短期(1周)、中期(1月)、长期(3月)

**必须包含的分析维度**：
1. **运营效率分析**：转化漏斗分析，用户行为路径优化
2. **市场竞争分析**：行业对标，竞争优势识别
3. **用户体验分析**：基于转化率数据的用户体验问题诊断
4. **推广效果分析**：ROI计算，推广渠道优化建议
5. **复购策略分析**：客户留存和复购率提升方案
6. **成本控制分析**：单客获取成本优化建议

**报告结构必须包含**：
- 执行摘要（关键发现和建议概述）
- 详细数据分析（每个指标的深度解读）
- 问题识别与机会分析
- 具体改进方案（操作性强的建议）
- 风险评估与应对策略
- 下周具体行动清单
";

const FINAL_REMINDER: &str = "\
**重要提醒**：
- 直接输出HTML代码，不要使用```html标记
- 不要返回完整的HTML文档（不要包含DOCTYPE、html、head、body标签）
- 只返回上述格式的HTML代码片段
- 确保CSS样式完整且位于内容前面
- 不要使用markdown格式或代码块标记

现在请生成报告：
";

/// Week-over-week change as a signed percentage with one decimal.
///
/// A zero baseline yields `+100%` when there is any current value, `0%` otherwise.
pub fn calculate_change(current: f64, previous: f64) -> String {
    if previous == 0.0 {
        return if current > 0.0 { "+100%" } else { "0%" }.to_string();
    }
    let change = to_fixed((current - previous) / previous * 100.0, 1);
    let positive = change.parse::<f64>().map(|v| v > 0.0).unwrap_or(false);
    if positive {
        format!("+{}%", change)
    } else {
        format!("{}%", change)
    }
}

fn write_promotion_section(out: &mut String, promo: &PromotionData) {
    let this = &promo.this_week;
    let last = &promo.last_week;
    out.push_str("### 点金推广数据分析\n");
    out.push_str(&format!(
        "- 本周推广花费：¥{}（{}）\n",
        this.cost,
        calculate_change(this.cost, last.cost)
    ));
    out.push_str(&format!(
        "- 推广曝光量：{}（{}）\n",
        this.exposure_count,
        calculate_change(this.exposure_count, last.exposure_count)
    ));
    out.push_str(&format!("- 推广进店量：{}\n", this.visit_count));
    out.push_str(&format!("- 进店率：{}%\n", this.visit_rate));
    out.push_str(&format!("- 单次进店成本：¥{}\n", this.cost_per_visit));
    out.push('\n');
}

fn write_adjustment_list(out: &mut String, title: &str, items: &[AdjustmentOption]) {
    out.push_str(&format!("- {}：\n", title));
    if items.is_empty() {
        out.push_str("  - 无\n");
    }
    for item in items {
        out.push_str(&format!("  - {}\n", item.label()));
    }
}

fn write_adjustment_section(out: &mut String, adjustments: &AdjustmentData) {
    out.push_str("## 店铺调整项目\n");
    write_adjustment_list(out, "本周完成的调整", &adjustments.this_week_adjustments);
    write_adjustment_list(out, "上周完成的调整", &adjustments.last_week_adjustments);
    out.push_str("请结合上述调整项目评估其对本周数据变化的影响，并在建议中说明后续调整方向。\n");
    out.push('\n');
}

fn write_promotion_rows(out: &mut String, promo: &PromotionData) {
    let this = &promo.this_week;
    let last = &promo.last_week;
    out.push_str("**核心数据总览表格必须包含以下推广指标行**：\n");
    out.push_str(&format!("- 推广花费：本周¥{}，上周¥{}\n", this.cost, last.cost));
    out.push_str(&format!(
        "- 推广曝光量：本周{}，上周{}\n",
        this.exposure_count, last.exposure_count
    ));
    out.push_str(&format!(
        "- 推广进店量：本周{}，上周{}\n",
        this.visit_count, last.visit_count
    ));
    out.push_str(&format!(
        "- 推广进店率：本周{}%，上周{}%\n",
        this.visit_rate, last.visit_rate
    ));
    out.push_str(&format!(
        "- 单次进店成本：本周¥{}，上周¥{}\n",
        this.cost_per_visit, last.cost_per_visit
    ));
    out.push('\n');
}

/// Build the full report prompt.
pub fn build_report_prompt(data: &ReportData) -> String {
    let shop = &data.shop_info;
    let this = &data.operation_data.this_week;
    let last = &data.operation_data.last_week;
    let promo = data.promotion_data.as_ref();

    let mut out = String::with_capacity(8 * 1024);

    out.push_str("**重要输出格式要求：你必须严格返回HTML代码片段，不要使用markdown格式或代码块标记**\n\n");
    out.push_str("你是一名专业的美团外卖运营分析师，请为以下店铺生成一份详细的数据周报。报告需要包含数据分析、趋势判断和具体的运营建议。\n\n");

    out.push_str("## 店铺信息\n");
    out.push_str(&format!("- 店铺名称：{}\n", shop.shop_name));
    out.push_str(&format!("- 经营品类：{}\n", shop.category));
    out.push_str(&format!("- 店铺地址：{}\n", shop.address));
    out.push_str(&format!("- 营业时间：{}\n", shop.business_hours));
    out.push('\n');

    out.push_str("## 本周运营数据\n");
    out.push_str(&format!(
        "- 曝光人数：{}人（{}）\n",
        this.exposure_count,
        calculate_change(this.exposure_count, last.exposure_count)
    ));
    out.push_str(&format!(
        "- 入店人数：{}人（{}）\n",
        this.visit_count,
        calculate_change(this.visit_count, last.visit_count)
    ));
    out.push_str(&format!("- 入店转化率：{}%\n", this.visit_conversion_rate));
    out.push_str(&format!("- 下单转化率：{}%\n", this.order_conversion_rate));
    out.push_str(&format!(
        "- 下单人数：{}人（{}）\n",
        this.order_count,
        calculate_change(this.order_count, last.order_count)
    ));
    out.push_str(&format!("- 复购率：{}%\n", this.repurchase_rate));
    out.push('\n');

    out.push_str("## 上周对比数据\n");
    out.push_str(&format!("- 曝光人数：{}人\n", last.exposure_count));
    out.push_str(&format!("- 入店人数：{}人\n", last.visit_count));
    out.push_str(&format!("- 入店转化率：{}%\n", last.visit_conversion_rate));
    out.push_str(&format!("- 下单转化率：{}%\n", last.order_conversion_rate));
    out.push_str(&format!("- 下单人数：{}人\n", last.order_count));
    out.push_str(&format!("- 复购率：{}%\n", last.repurchase_rate));
    out.push('\n');

    if let Some(promo) = promo {
        write_promotion_section(&mut out, promo);
    }
    if let Some(adjustments) = data.adjustment_data.as_ref().filter(|a| !a.is_empty()) {
        write_adjustment_section(&mut out, adjustments);
    }

    out.push_str("**输出要求：直接返回HTML代码片段（不要包含```html或任何markdown标记）。**\n\n");
    out.push_str("请生成一份完整的HTML格式周报，要求：\n\n");
    out.push_str("1. **报告结构**：\n");
    out.push_str("   - 标题和店铺基本信息\n");
    out.push_str(&format!(
        "   - 核心数据总览（使用表格{}）\n",
        if promo.is_some() { "，必须包含点金推广相关指标" } else { "" }
    ));
    out.push_str("   - 数据趋势分析（包含变化百分比）\n");
    out.push_str("   - 关键指标分析\n");
    out.push_str("   - 问题诊断和改进建议\n");
    out.push_str("   - 下周行动计划\n\n");

    if let Some(promo) = promo {
        write_promotion_rows(&mut out, promo);
    }

    out.push_str("2. **数据可视化**：\n");
    out.push_str("   - 使用HTML表格展示核心数据对比\n");
    out.push_str("   - 用颜色区分增长（绿色）和下降（红色）趋势\n");
    out.push_str("   - 突出显示关键指标和重要变化\n");
    if promo.is_some() {
        out.push_str("   - **重要**：推广花费、推广曝光量、推广进店量、进店率、单次进店成本必须作为独立行添加到核心数据总览表格中\n");
        out.push_str("   - 表格结构：指标列 | 本周数据列 | 上周数据列 | 变化趋势列 | 变化百分比列，推广数据行必须位于基础运营数据行之后\n");
    }
    out.push('\n');

    out.push_str("3. **专业分析**：\n");
    out.push_str("   - 基于美团外卖运营经验提供深度分析\n");
    out.push_str("   - 识别数据异常和机会点\n");
    out.push_str("   - 提供具体可执行的改进措施\n");
    out.push_str("   - 给出ROI分析和效果预期\n\n");

    out.push_str("4. **HTML样式**：\n");
    out.push_str("   - 使用内联CSS样式，位于<style>标签中并放在内容前面\n");
    out.push_str("   - 现代化的卡片式布局，表格带边框、背景色和悬浮效果\n");
    out.push_str("   - 增长数据用绿色显示，下降数据用红色显示\n");
    out.push_str("   - 适合打印和分享，响应式适配不同屏幕尺寸\n\n");

    out.push_str(CONTENT_REQUIREMENTS);
    out.push('\n');

    out.push_str("**最终输出格式（重要）**：直接返回以下格式的HTML代码片段：\n");
    out.push_str(REFERENCE_STYLE);
    out.push_str("\n\n<div class=\"report-container\">\n");
    out.push_str(&format!(
        "  <h1 class=\"report-title\">{} - 周度运营数据分析报告</h1>\n",
        shop.shop_name
    ));
    out.push_str("  <div class=\"info-card\">\n    <h2>店铺基本信息</h2>\n");
    out.push_str(&format!("    <p><strong>店铺名称：</strong>{}</p>\n", shop.shop_name));
    out.push_str(&format!("    <p><strong>经营品类：</strong>{}</p>\n", shop.category));
    out.push_str(&format!("    <p><strong>店铺地址：</strong>{}</p>\n", shop.address));
    out.push_str(&format!("    <p><strong>营业时间：</strong>{}</p>\n", shop.business_hours));
    out.push_str("  </div>\n");
    out.push_str("  <div class=\"info-card\">\n    <h2>核心数据总览</h2>\n");
    out.push_str("    <table class=\"data-table\">\n      <thead>\n        <tr><th>指标</th><th>本周数据</th><th>上周数据</th><th>变化趋势</th><th>变化百分比</th></tr>\n      </thead>\n");
    out.push_str("      <tbody><!-- 在这里填入所有数据行，包括推广数据 --></tbody>\n    </table>\n  </div>\n");
    out.push_str("  <div class=\"info-card\">\n    <div class=\"analysis-section\">\n      <h3>数据趋势分析</h3>\n      <!-- 详细分析内容 -->\n    </div>\n  </div>\n");
    out.push_str("</div>\n\n");

    out.push_str(FINAL_REMINDER);
    out
}
