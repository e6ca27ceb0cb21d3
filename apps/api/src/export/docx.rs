//! `.docx` export as a single HTML document carrying the Word XML
//! namespaces. Word opens it as a regular document; no zip container.

use crate::export::{contact_items, education_line, experience_heading, experience_meta};
use crate::resumes::content::ResumeContent;

const STYLE: &str = "body{font-family:Calibri,Arial,sans-serif;font-size:11pt;}\
h1{font-size:20pt;margin:0;}\
h2{font-size:13pt;border-bottom:1px solid #444;margin:14pt 0 4pt 0;}\
h3{font-size:11pt;margin:8pt 0 0 0;}\
p{margin:2pt 0;}\
.meta{color:#555;}";

pub fn render_docx(content: &ResumeContent, title: &str) -> String {
    let info = &content.personal_info;
    let mut body = String::new();

    body.push_str(&format!("<h1>{}</h1>\n", escape(&info.full_name)));
    let contact = contact_items(content);
    if !contact.is_empty() {
        let joined: Vec<String> = contact.iter().map(|c| escape(c)).collect();
        body.push_str(&format!("<p class=\"meta\">{}</p>\n", joined.join(" | ")));
    }

    if let Some(summary) = &info.summary {
        body.push_str("<h2>Summary</h2>\n");
        body.push_str(&format!("<p>{}</p>\n", escape(summary)));
    }

    if !content.experience.is_empty() {
        body.push_str("<h2>Experience</h2>\n");
        for exp in &content.experience {
            body.push_str(&format!("<h3>{}</h3>\n", escape(&experience_heading(exp))));
            if let Some(meta) = experience_meta(exp) {
                body.push_str(&format!("<p class=\"meta\">{}</p>\n", escape(&meta)));
            }
            push_list(&mut body, &exp.highlights);
        }
    }

    if !content.education.is_empty() {
        body.push_str("<h2>Education</h2>\n");
        for edu in &content.education {
            body.push_str(&format!("<p>{}</p>\n", escape(&education_line(edu))));
        }
    }

    if !content.skills.is_empty() {
        body.push_str("<h2>Skills</h2>\n");
        body.push_str(&format!("<p>{}</p>\n", escape(&content.skills.join(", "))));
    }

    if !content.projects.is_empty() {
        body.push_str("<h2>Projects</h2>\n");
        for project in &content.projects {
            body.push_str(&format!("<h3>{}</h3>\n", escape(&project.name)));
            if let Some(link) = &project.link {
                body.push_str(&format!("<p class=\"meta\">{}</p>\n", escape(link)));
            }
            if !project.description.is_empty() {
                body.push_str(&format!("<p>{}</p>\n", escape(&project.description)));
            }
            if !project.technologies.is_empty() {
                body.push_str(&format!(
                    "<p class=\"meta\">Technologies: {}</p>\n",
                    escape(&project.technologies.join(", "))
                ));
            }
        }
    }

    format!(
        "<html xmlns:o=\"urn:schemas-microsoft-com:office:office\" \
xmlns:w=\"urn:schemas-microsoft-com:office:word\" \
xmlns=\"http://www.w3.org/TR/REC-html40\">\n\
<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
<!--[if gte mso 9]><xml><w:WordDocument><w:View>Print</w:View></w:WordDocument></xml><![endif]-->\n\
<style>{STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        escape(title)
    )
}

fn push_list(body: &mut String, items: &[String]) {
    if items.is_empty() {
        return;
    }
    body.push_str("<ul>\n");
    for item in items {
        body.push_str(&format!("<li>{}</li>\n", escape(item)));
    }
    body.push_str("</ul>\n");
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
