#![allow(clippy::format_push_string)]

use crate::order::OrderIntent;
use crate::reconcile::{MirrorPlan, RatioContext};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An intent the venue accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchedOrder {
    pub intent: OrderIntent,
    pub order_id: Option<String>,
    pub status: String,
}

/// Outcome of a completed mirror run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub ratio: RatioContext,
    pub cancelled_orders: usize,
    pub submitted: Vec<DispatchedOrder>,
}

impl RunReport {
    #[must_use]
    pub fn new(ratio: RatioContext) -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            ratio,
            cancelled_orders: 0,
            submitted: Vec::new(),
        }
    }
}

const RULE: &str = "───────────────────────────────────────────────────────────────\n";
const BANNER: &str = "═══════════════════════════════════════════════════════════════\n";

pub struct ReportFormatter;

impl ReportFormatter {
    /// Renders a plan that has not been submitted.
    #[must_use]
    pub fn format_plan(plan: &MirrorPlan) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str(BANNER);
        output.push_str("                      MIRROR PLAN (DRY RUN)                    \n");
        output.push_str(BANNER);
        output.push('\n');

        Self::push_ratio(&mut output, &plan.ratio);

        output.push_str("Intents\n");
        output.push_str(RULE);
        for (i, intent) in plan.intents.iter().enumerate() {
            output.push_str(&format!("{:>3}. {}\n", i + 1, intent));
        }
        output.push('\n');

        if plan.order_count() == 0 {
            output.push_str("Target already mirrors source; only resting orders are cancelled.\n\n");
        }

        output.push_str(BANNER);
        output
    }

    /// Renders the summary of a completed run.
    #[must_use]
    pub fn format_report(report: &RunReport) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str(BANNER);
        output.push_str("                        MIRROR RUN COMPLETE                    \n");
        output.push_str(BANNER);
        output.push('\n');

        output.push_str(&format!(
            "Started:               {}\n",
            report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output.push_str(&format!(
            "Finished:              {}\n",
            report.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output.push('\n');

        Self::push_ratio(&mut output, &report.ratio);

        output.push_str("Orders\n");
        output.push_str(RULE);
        output.push_str(&format!(
            "Cancelled resting:     {}\n",
            report.cancelled_orders
        ));
        output.push_str(&format!("Submitted:             {}\n", report.submitted.len()));
        for dispatched in &report.submitted {
            output.push_str(&format!(
                "  {} [{}{}]\n",
                dispatched.intent,
                dispatched.status,
                dispatched
                    .order_id
                    .as_deref()
                    .map(|id| format!(" {id}"))
                    .unwrap_or_default()
            ));
        }
        output.push('\n');
        output.push_str(BANNER);
        output
    }

    fn push_ratio(output: &mut String, ratio: &RatioContext) {
        output.push_str("Equity\n");
        output.push_str(RULE);
        output.push_str(&format!(
            "Source:                ${:.2}\n",
            ratio.source_equity
        ));
        output.push_str(&format!(
            "Target:                ${:.2}\n",
            ratio.target_equity
        ));
        output.push_str(&format!("Ratio:                 {:.6}\n", ratio.ratio));
        output.push('\n');
    }
}
