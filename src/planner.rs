//! Maps a free-text analysis request onto pipeline tasks.
//!
//! Matching is keyword based and case-insensitive. Keywords match as
//! substrings, so "returns" hits the roas family and "fallen" the decline
//! family.

use chrono::{Duration, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    IdentifyDecline,
    AnalyzeRoas,
    CreativeAnalysis,
    PlatformComparison,
    AudienceAnalysis,
    FullAnalysis,
}

/// Pipeline stage, declared in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Data,
    Hypotheses,
    Evaluation,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Data, Stage::Hypotheses, Stage::Evaluation];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub days: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisTask {
    pub kind: TaskKind,
    pub description: String,
    pub stages: Vec<Stage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_window: Option<TimeWindow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedTask {
    pub task: AnalysisTask,
    pub execution_order: Vec<Stage>,
}

struct KeywordFamily {
    kind: TaskKind,
    keywords: &'static [&'static str],
    description: &'static str,
    stages: &'static [Stage],
}

const FAMILIES: &[KeywordFamily] = &[
    KeywordFamily {
        kind: TaskKind::IdentifyDecline,
        keywords: &["drop", "decline", "decrease", "fall"],
        description: "Identify ROAS/CTR decline patterns",
        stages: &[Stage::Data, Stage::Hypotheses, Stage::Evaluation],
    },
    KeywordFamily {
        kind: TaskKind::AnalyzeRoas,
        keywords: &["roas", "roi", "return"],
        description: "Analyze ROAS fluctuations and drivers",
        stages: &[Stage::Data, Stage::Hypotheses, Stage::Evaluation],
    },
    KeywordFamily {
        kind: TaskKind::CreativeAnalysis,
        keywords: &["creative", "message", "ad copy", "ctr"],
        description: "Analyze creative performance",
        stages: &[Stage::Data],
    },
    KeywordFamily {
        kind: TaskKind::PlatformComparison,
        keywords: &["platform", "facebook", "instagram"],
        description: "Compare performance across platforms",
        stages: &[Stage::Data, Stage::Hypotheses],
    },
    KeywordFamily {
        kind: TaskKind::AudienceAnalysis,
        keywords: &["audience", "targeting", "segment"],
        description: "Analyze audience segment performance",
        stages: &[Stage::Data, Stage::Hypotheses, Stage::Evaluation],
    },
];

static DAYS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:last|past) (\d+) days?").expect("valid regex"));
static WEEK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:last|past) week").expect("valid regex"));
static MONTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:last|past) month").expect("valid regex"));

pub struct Planner;

impl Planner {
    /// Plan `query` with time windows anchored at today's UTC date.
    pub fn parse_query(query: &str) -> Vec<AnalysisTask> {
        Self::parse_query_at(query, Utc::now().date_naive())
    }

    pub fn parse_query_at(query: &str, today: NaiveDate) -> Vec<AnalysisTask> {
        let lowered = query.to_lowercase();
        let window = extract_time_window(&lowered, today);

        let mut tasks: Vec<AnalysisTask> = FAMILIES
            .iter()
            .filter(|f| f.keywords.iter().any(|k| lowered.contains(k)))
            .map(|f| AnalysisTask {
                kind: f.kind,
                description: f.description.to_string(),
                stages: f.stages.to_vec(),
                time_window: window.clone(),
            })
            .collect();

        if tasks.is_empty() {
            tasks.push(AnalysisTask {
                kind: TaskKind::FullAnalysis,
                description: "Complete performance analysis".to_string(),
                stages: Stage::ALL.to_vec(),
                time_window: window,
            });
        }

        tracing::info!("[planner] Planned {} tasks for '{}'", tasks.len(), query);
        tasks
    }

    /// Each task paired with its stages in canonical order.
    pub fn execution_plan(tasks: &[AnalysisTask]) -> Vec<PlannedTask> {
        tasks
            .iter()
            .map(|task| PlannedTask {
                task: task.clone(),
                execution_order: Stage::ALL
                    .into_iter()
                    .filter(|s| task.stages.contains(s))
                    .collect(),
            })
            .collect()
    }
}

fn extract_time_window(lowered: &str, today: NaiveDate) -> Option<TimeWindow> {
    let days = if let Some(caps) = DAYS_RE.captures(lowered) {
        caps[1].parse::<i64>().ok()?
    } else if WEEK_RE.is_match(lowered) {
        7
    } else if MONTH_RE.is_match(lowered) {
        30
    } else {
        return None;
    };
    let start_date = today.checked_sub_signed(Duration::try_days(days)?)?;
    Some(TimeWindow {
        days,
        start_date,
        end_date: today,
    })
}
