//! Completeness report: weighted coverage of the sections a resume should have.

use serde::{Deserialize, Serialize};

use crate::resumes::content::ResumeContent;
use crate::resumes::feedback::is_quantified;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    Strong,
    Moderate,
    Weak,
    Missing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionHealth {
    pub section: String,
    pub score: f64,
    pub item_count: usize,
    pub status: SectionStatus,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletenessReport {
    /// 0 – 100
    pub overall_score: u32,
    pub sections: Vec<SectionHealth>,
    pub missing_sections: Vec<String>,
}

const SECTION_WEIGHTS: &[(&str, f64)] = &[
    ("contact", 0.15),
    ("summary", 0.10),
    ("experience", 0.35),
    ("education", 0.15),
    ("skills", 0.15),
    ("projects", 0.10),
];

pub fn compute_completeness_report(content: &ResumeContent) -> CompletenessReport {
    let mut sections = Vec::new();
    let mut missing_sections = Vec::new();
    let mut weighted_score_sum = 0.0;

    for (section_key, weight) in SECTION_WEIGHTS {
        let (item_count, score, mut recommendations) = score_section(section_key, content);

        let status = match score {
            s if s >= 0.8 => SectionStatus::Strong,
            s if s >= 0.5 => SectionStatus::Moderate,
            s if s > 0.0 => SectionStatus::Weak,
            _ => SectionStatus::Missing,
        };
        if status == SectionStatus::Missing {
            missing_sections.push(section_key.to_string());
            if recommendations.is_empty() {
                recommendations.push(format!("Add a {section_key} section"));
            }
        }

        weighted_score_sum += score * weight;
        sections.push(SectionHealth {
            section: section_key.to_string(),
            score,
            item_count,
            status,
            recommendations,
        });
    }

    let total_weight: f64 = SECTION_WEIGHTS.iter().map(|(_, w)| w).sum();
    let overall = (weighted_score_sum / total_weight).clamp(0.0, 1.0);

    CompletenessReport {
        overall_score: (overall * 100.0).round() as u32,
        sections,
        missing_sections,
    }
}

/// Returns (item_count, score 0.0–1.0, recommendations) for one section.
fn score_section(section: &str, content: &ResumeContent) -> (usize, f64, Vec<String>) {
    let info = &content.personal_info;
    match section {
        "contact" => {
            let fields = [
                !info.full_name.is_empty(),
                info.email.contains('@'),
                info.phone.is_some(),
                info.location.is_some(),
                info.linkedin.is_some() || info.website.is_some(),
            ];
            let present = fields.iter().filter(|f| **f).count();
            let mut recs = Vec::new();
            if info.phone.is_none() {
                recs.push("Add a phone number".to_string());
            }
            if info.linkedin.is_none() && info.website.is_none() {
                recs.push("Add a LinkedIn profile or personal website".to_string());
            }
            (present, present as f64 / fields.len() as f64, recs)
        }
        "summary" => match info.summary.as_deref() {
            None => (0, 0.0, vec!["Add a 2–3 sentence professional summary".to_string()]),
            Some(s) if s.split_whitespace().count() < 15 => (
                1,
                0.5,
                vec!["Expand the summary to at least two full sentences".to_string()],
            ),
            Some(_) => (1, 1.0, vec![]),
        },
        "experience" => {
            let count = content.experience.len();
            if count == 0 {
                return (0, 0.0, vec!["Add at least one experience entry".to_string()]);
            }
            let highlights: Vec<&String> = content
                .experience
                .iter()
                .flat_map(|e| e.highlights.iter())
                .collect();
            let with_highlights = content
                .experience
                .iter()
                .filter(|e| !e.highlights.is_empty())
                .count();
            let quantified = highlights.iter().filter(|h| is_quantified(h)).count();

            let coverage = with_highlights as f64 / count as f64;
            let impact = if highlights.is_empty() {
                0.0
            } else {
                quantified as f64 / highlights.len() as f64
            };
            let score = (0.6 * coverage + 0.4 * impact).clamp(0.0, 1.0);

            let mut recs = Vec::new();
            if with_highlights < count {
                recs.push(format!(
                    "{} experience entries have no highlights",
                    count - with_highlights
                ));
            }
            let unquantified = highlights.len() - quantified;
            if unquantified > 0 {
                recs.push(format!(
                    "{unquantified} highlights lack quantified impact; add numbers, percentages or time saved"
                ));
            }
            (count, score, recs)
        }
        "education" => {
            let count = content.education.len();
            let score = if count > 0 { 1.0 } else { 0.0 };
            (count, score, vec![])
        }
        "skills" => {
            let count = content.skills.len();
            let score = (count as f64 / 8.0).min(1.0);
            let recs = if count > 0 && count < 5 {
                vec!["List at least 5 relevant skills".to_string()]
            } else {
                vec![]
            };
            (count, score, recs)
        }
        "projects" => {
            let count = content.projects.len();
            let score = (count as f64 / 2.0).min(1.0);
            (count, score, vec![])
        }
        _ => (0, 0.0, vec![]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resumes::content::fixtures::sample_content;
    use crate::resumes::content::PersonalInfo;

    #[test]
    fn test_empty_resume_scores_zero_sections_missing() {
        let content = ResumeContent {
            personal_info: PersonalInfo::default(),
            ..Default::default()
        };
        let report = compute_completeness_report(&content);
        assert_eq!(report.overall_score, 0);
        assert!(report.missing_sections.contains(&"experience".to_string()));
        assert!(report.missing_sections.contains(&"skills".to_string()));
    }

    #[test]
    fn test_sample_resume_is_partially_complete() {
        let report = compute_completeness_report(&sample_content());
        assert!(report.overall_score > 40, "got {}", report.overall_score);
        assert!(report.overall_score < 100);
        assert!(report.missing_sections.is_empty());
    }

    #[test]
    fn test_unquantified_highlight_is_flagged() {
        let report = compute_completeness_report(&sample_content());
        let experience = report
            .sections
            .iter()
            .find(|s| s.section == "experience")
            .unwrap();
        assert!(experience
            .recommendations
            .iter()
            .any(|r| r.contains("lack quantified impact")));
    }

    #[test]
    fn test_score_bounded() {
        let mut content = sample_content();
        content.skills = (0..30).map(|i| format!("skill-{i}")).collect();
        let report = compute_completeness_report(&content);
        assert!(report.overall_score <= 100);
    }
}
