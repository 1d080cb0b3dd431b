#![allow(dead_code)]

use adlens::{AdRecord, Dataset};
use chrono::{Duration, NaiveDate};

pub struct RowSpec<'a> {
    pub campaign: &'a str,
    pub platform: &'a str,
    pub creative_type: &'a str,
    pub audience_type: &'a str,
    pub message: &'a str,
    pub ctr: f64,
    pub roas: f64,
}

impl Default for RowSpec<'_> {
    fn default() -> Self {
        Self {
            campaign: "Core",
            platform: "Facebook",
            creative_type: "Image",
            audience_type: "Broad",
            message: "Shop now",
            ctr: 0.02,
            roas: 3.0,
        }
    }
}

pub fn day(offset: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + Duration::days(offset)
}

pub fn record(date: NaiveDate, spec: RowSpec<'_>) -> AdRecord {
    let spend = 200.0;
    let impressions = 20_000;
    AdRecord {
        date,
        campaign_name: spec.campaign.to_string(),
        adset_name: format!("{} - {}", spec.campaign, spec.audience_type),
        platform: spec.platform.to_string(),
        country: "US".to_string(),
        creative_type: spec.creative_type.to_string(),
        creative_message: spec.message.to_string(),
        audience_type: spec.audience_type.to_string(),
        spend,
        revenue: spend * spec.roas,
        impressions,
        clicks: (impressions as f64 * spec.ctr).round() as u64,
        purchases: 4,
        ctr: spec.ctr,
        roas: spec.roas,
    }
}

/// One campaign whose roas falls linearly from 10.0 to 6.0 over ten days,
/// plus a flat companion campaign.
pub fn decaying_campaign() -> Dataset {
    let mut rows = Vec::new();
    for i in 0..10 {
        rows.push(record(
            day(i),
            RowSpec {
                campaign: "Fading",
                roas: 10.0 - 4.0 * i as f64 / 9.0,
                ..Default::default()
            },
        ));
        rows.push(record(
            day(i),
            RowSpec {
                campaign: "Steady",
                roas: 4.0,
                ..Default::default()
            },
        ));
    }
    Dataset::new(rows).unwrap()
}

/// Two platforms with identical roas distributions.
pub fn twin_platforms() -> Dataset {
    let mut rows = Vec::new();
    for (i, roas) in [2.1, 2.9, 3.4, 1.8, 2.6, 3.0].iter().enumerate() {
        for platform in ["Facebook", "Instagram"] {
            rows.push(record(
                day(i as i64),
                RowSpec {
                    platform,
                    roas: *roas,
                    ..Default::default()
                },
            ));
        }
    }
    Dataset::new(rows).unwrap()
}

/// Three creative types with clearly separated roas means.
pub fn separated_creatives() -> Dataset {
    let mut rows = Vec::new();
    for (creative_type, base) in [("Image", 1.5), ("Video", 3.5), ("Carousel", 5.5)] {
        for (i, jitter) in [-0.2, 0.1, 0.0, 0.2, -0.1].iter().enumerate() {
            rows.push(record(
                day(i as i64),
                RowSpec {
                    creative_type,
                    roas: base + jitter,
                    ..Default::default()
                },
            ));
        }
    }
    Dataset::new(rows).unwrap()
}

/// Every row at or above the default ctr threshold.
pub fn all_high_ctr() -> Dataset {
    let rows = (0..6)
        .map(|i| {
            record(
                day(i),
                RowSpec {
                    ctr: 0.015 + 0.001 * i as f64,
                    roas: 2.0 + 0.1 * i as f64,
                    ..Default::default()
                },
            )
        })
        .collect();
    Dataset::new(rows).unwrap()
}

/// A fortnight across two platforms, three creatives, three audiences and
/// mixed message lengths.
pub fn mixed_portfolio() -> Dataset {
    let campaigns = ["Spring Sale", "Evergreen", "Launch"];
    let creatives = ["Image", "Video", "Carousel"];
    let audiences = ["Broad", "Lookalike", "Retargeting"];
    let messages = [
        "Buy now",
        "Discover our handcrafted collection, made to last for years",
        "Free shipping today",
    ];

    let mut rows = Vec::new();
    for d in 0..14 {
        for (c, campaign) in campaigns.iter().enumerate() {
            let k = d as usize + c;
            let roas = match c {
                0 => 6.0 - 0.3 * d as f64,
                1 => 3.0 + 0.05 * ((k % 4) as f64 - 1.5),
                _ => 2.0 + 0.1 * d as f64,
            };
            rows.push(record(
                day(d),
                RowSpec {
                    campaign,
                    platform: if k % 2 == 0 { "Facebook" } else { "Instagram" },
                    creative_type: creatives[k % 3],
                    audience_type: audiences[(k / 2) % 3],
                    message: messages[k % 3],
                    ctr: 0.008 + 0.002 * (k % 5) as f64,
                    roas,
                },
            ));
        }
    }
    Dataset::new(rows).unwrap()
}

pub fn all_fixtures() -> Vec<(&'static str, Dataset)> {
    vec![
        ("decaying_campaign", decaying_campaign()),
        ("twin_platforms", twin_platforms()),
        ("separated_creatives", separated_creatives()),
        ("all_high_ctr", all_high_ctr()),
        ("mixed_portfolio", mixed_portfolio()),
    ]
}
