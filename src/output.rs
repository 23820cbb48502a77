// SPDX-License-Identifier: MIT OR Apache-2.0

//! Result report shaping and terminal rendering.
//!
//! JSON output follows the established collection-output layout:
//! metadata, ranked `extracted_sections`, and a `subsection_analysis`
//! block carrying the leading text of each ranked section.

use colored::Colorize;
use serde::Serialize;

use crate::document::DocumentFailure;
use crate::pipeline::RunOutput;
use crate::rank::ScoredSection;

/// Character cutoff for refined text in the analysis block.
const REFINED_TEXT_CHARS: usize = 300;

/// Check if colors should be used (respects NO_COLOR env var)
pub fn use_colors() -> bool {
    std::env::var("NO_COLOR").is_err()
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub metadata: Metadata,
    pub extracted_sections: Vec<RankedSectionOut>,
    pub subsection_analysis: Vec<SubsectionOut>,
    pub per_document: Vec<PerDocumentOut>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub document_failures: Vec<DocumentFailure>,
}

#[derive(Debug, Serialize)]
pub struct Metadata {
    pub persona: String,
    pub job_to_be_done: String,
    pub input_documents: Vec<String>,
    pub model: String,
    pub sections_extracted: usize,
    pub sections_scored: usize,
    pub sections_ranked: usize,
}

#[derive(Debug, Serialize)]
pub struct RankedSectionOut {
    pub document: String,
    pub section_title: String,
    pub page_number: u32,
    pub importance_rank: usize,
    pub similarity_score: f32,
    pub section_type: String,
    pub section_id: String,
}

#[derive(Debug, Serialize)]
pub struct SubsectionOut {
    pub document: String,
    pub section_title: String,
    pub refined_text: String,
    pub page_number: u32,
}

#[derive(Debug, Serialize)]
pub struct PerDocumentOut {
    pub document: String,
    pub sections: Vec<RankedSectionOut>,
}

impl Report {
    pub fn from_run(output: &RunOutput, input_documents: Vec<String>) -> Self {
        let extracted_sections: Vec<RankedSectionOut> = output
            .consolidated
            .entries
            .iter()
            .map(ranked_out)
            .collect();

        let subsection_analysis = output
            .consolidated
            .entries
            .iter()
            .map(|entry| SubsectionOut {
                document: entry.section.document.clone(),
                section_title: entry.section.title.clone(),
                refined_text: refine_text(&entry.section.body),
                page_number: entry.section.page,
            })
            .collect();

        let per_document = output
            .per_document
            .iter()
            .map(|ranking| PerDocumentOut {
                document: ranking.document.clone(),
                sections: ranking.result.entries.iter().map(ranked_out).collect(),
            })
            .collect();

        Report {
            metadata: Metadata {
                persona: output.query.descriptor.persona.clone(),
                job_to_be_done: output.query.descriptor.job.clone(),
                input_documents,
                model: output.model_id.clone(),
                sections_extracted: output.sections_extracted,
                sections_scored: output.sections_scored,
                sections_ranked: output.consolidated.len(),
            },
            extracted_sections,
            subsection_analysis,
            per_document,
            document_failures: output.failures.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Renders the consolidated ranking for a terminal.
    pub fn render_text(&self) -> String {
        let color = use_colors();
        let mut out = String::new();

        out.push_str(&format!(
            "Ranked {} of {} sections for {} / {}\n\n",
            self.metadata.sections_ranked,
            self.metadata.sections_scored,
            emphasize(&self.metadata.persona, color),
            self.metadata.job_to_be_done,
        ));

        for section in &self.extracted_sections {
            out.push_str(&format!(
                "{:>3}. {} (score {:.3})\n     {}:{}\n",
                section.importance_rank,
                emphasize(&section.section_title, color),
                section.similarity_score,
                path_color(&section.document, color),
                page_color(section.page_number, color),
            ));
        }

        if !self.document_failures.is_empty() {
            out.push('\n');
            for failure in &self.document_failures {
                out.push_str(&format!(
                    "warning: skipped {}: {}\n",
                    failure.document, failure.error
                ));
            }
        }

        out
    }
}

fn ranked_out(entry: &ScoredSection) -> RankedSectionOut {
    RankedSectionOut {
        document: entry.section.document.clone(),
        section_title: entry.section.title.clone(),
        page_number: entry.section.page,
        importance_rank: entry.rank,
        similarity_score: entry.score,
        section_type: entry.section.kind.to_string(),
        section_id: entry.section.id(),
    }
}

/// Leading text of a section body, cut on a char boundary.
fn refine_text(body: &str) -> String {
    if body.chars().count() > REFINED_TEXT_CHARS {
        let head: String = body.chars().take(REFINED_TEXT_CHARS).collect();
        format!("{}...", head.trim_end())
    } else {
        body.trim().to_string()
    }
}

fn emphasize(text: &str, use_color: bool) -> String {
    if use_color {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

fn path_color(text: &str, use_color: bool) -> String {
    if use_color {
        text.cyan().to_string()
    } else {
        text.to_string()
    }
}

fn page_color(page: u32, use_color: bool) -> String {
    if use_color {
        format!("p{}", page).yellow().to_string()
    } else {
        format!("p{}", page)
    }
}
