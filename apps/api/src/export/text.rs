use crate::export::{contact_items, education_line, experience_heading, experience_meta};
use crate::resumes::content::ResumeContent;

/// Linear plain-text rendering of every section.
pub fn render_text(content: &ResumeContent) -> String {
    let mut out = Vec::new();
    let info = &content.personal_info;

    out.push(info.full_name.to_uppercase());
    let contact = contact_items(content);
    if !contact.is_empty() {
        out.push(contact.join(" | "));
    }

    if let Some(summary) = &info.summary {
        section(&mut out, "SUMMARY");
        out.push(summary.clone());
    }

    if !content.experience.is_empty() {
        section(&mut out, "EXPERIENCE");
        for (i, exp) in content.experience.iter().enumerate() {
            if i > 0 {
                out.push(String::new());
            }
            out.push(experience_heading(exp));
            if let Some(meta) = experience_meta(exp) {
                out.push(meta);
            }
            out.extend(exp.highlights.iter().map(|h| format!("- {h}")));
        }
    }

    if !content.education.is_empty() {
        section(&mut out, "EDUCATION");
        for edu in &content.education {
            out.push(education_line(edu));
        }
    }

    if !content.skills.is_empty() {
        section(&mut out, "SKILLS");
        out.push(content.skills.join(", "));
    }

    if !content.projects.is_empty() {
        section(&mut out, "PROJECTS");
        for project in &content.projects {
            let mut heading = project.name.clone();
            if let Some(link) = &project.link {
                heading.push_str(&format!(" ({link})"));
            }
            out.push(heading);
            if !project.description.is_empty() {
                out.push(project.description.clone());
            }
            if !project.technologies.is_empty() {
                out.push(format!("Technologies: {}", project.technologies.join(", ")));
            }
        }
    }

    let mut text = out.join("\n");
    text.push('\n');
    text
}

fn section(out: &mut Vec<String>, heading: &str) {
    out.push(String::new());
    out.push(heading.to_string());
}
