// LLM prompt constants for the analysis features.
// System prompts get the JSON-only rules appended via llm_client::prompts::json_system.

pub const ATS_ROLE: &str = "You are an expert Applicant Tracking System (ATS) analyst and \
    technical recruiter. You score resumes against job descriptions the way enterprise ATS \
    software and experienced screeners would.";

/// ATS analysis prompt. Replace `{resume_text}` and `{job_description}`.
pub const ATS_PROMPT_TEMPLATE: &str = r#"Analyze how well this resume would perform in an ATS screen for the job description below.

Return a JSON object with this EXACT schema:
{
  "ats_score": 0-100,
  "keyword_match_score": 0-100,
  "formatting_score": 0-100,
  "content_score": 0-100,
  "matched_keywords": ["keyword present in both"],
  "missing_keywords": ["important JD keyword absent from the resume"],
  "strengths": ["short strength statement"],
  "improvements": ["short, specific, actionable improvement"],
  "summary": "two or three sentence overall assessment"
}

Scoring rules:
- keyword_match_score: share of the JD's hard skills and tools the resume covers
- formatting_score: ATS parseability (standard section names, no tables/graphics, consistent dates)
- content_score: quantified impact, relevance and clarity of experience bullets
- ats_score: your overall estimate of passing the ATS screen
- At most 10 items per list

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}"#;

pub const OPTIMIZE_ROLE: &str = "You are an expert resume writer who tailors resumes to a \
    specific job description without misrepresenting the candidate.";

/// Optimization prompt. Replace `{no_fabrication}`, `{content_json}`, `{job_description}`.
pub const OPTIMIZE_PROMPT_TEMPLATE: &str = r#"{no_fabrication}

Rewrite the resume below so it is tailored to the job description. You may:
- rewrite personal_info.summary
- rephrase experience highlights to lead with impact and use the JD's terminology
- reorder and extend skills ONLY with skills evidenced elsewhere in the resume
- rephrase project descriptions

You may NOT change names, employers, positions, dates, institutions, degrees or contact details.

Return a JSON object with this EXACT schema:
{
  "content": { ...the full resume in the same structure as the input... },
  "changes": ["one line per meaningful change"],
  "added_keywords": ["JD keywords now present that were absent before"]
}

RESUME (JSON):
{content_json}

JOB DESCRIPTION:
{job_description}"#;

pub const GENERATE_ROLE: &str = "You are an expert resume writer who turns a candidate's \
    free-form description of their background into a structured, ATS-friendly resume.";

/// Generation prompt. Replace `{no_fabrication}`, `{background}`, `{target}`, `{job_description}`.
pub const GENERATE_PROMPT_TEMPLATE: &str = r#"{no_fabrication}

Draft a resume for the candidate described below, targeting: {target}

Return a JSON object with this EXACT schema:
{
  "summary": "2-3 sentence professional summary",
  "experience": [
    {"company": "", "position": "", "location": null, "start_date": "YYYY-MM", "end_date": "YYYY-MM or null", "current": false, "highlights": ["impact-led bullet"]}
  ],
  "education": [
    {"institution": "", "degree": "", "field": null, "start_date": null, "end_date": null, "gpa": null}
  ],
  "skills": ["skill"],
  "projects": [
    {"name": "", "description": "", "technologies": [""], "link": null}
  ]
}

Use empty arrays for sections the background does not mention. 3-5 highlights per role.

CANDIDATE BACKGROUND:
{background}

JOB DESCRIPTION (may be empty):
{job_description}"#;

pub const PARSE_ROLE: &str = "You are a precise resume parser that converts raw resume text \
    into structured data.";

/// Resume parsing prompt. Replace `{resume_text}`.
pub const PARSE_PROMPT_TEMPLATE: &str = r#"Convert the resume text below into this EXACT JSON schema. Copy facts verbatim; do not summarize or embellish.

{
  "personal_info": {"full_name": "", "email": "", "phone": null, "location": null, "linkedin": null, "website": null, "summary": null},
  "experience": [
    {"company": "", "position": "", "location": null, "start_date": null, "end_date": null, "current": false, "highlights": [""]}
  ],
  "education": [
    {"institution": "", "degree": "", "field": null, "start_date": null, "end_date": null, "gpa": null}
  ],
  "skills": [""],
  "projects": [
    {"name": "", "description": "", "technologies": [""], "link": null}
  ]
}

Use null for unknown scalar fields and empty arrays for absent sections.

RESUME TEXT:
{resume_text}"#;

pub const MATCH_ROLE: &str = "You are a senior technical recruiter screening candidates \
    against a role's requirements. You are strict and evidence-based.";

/// Candidate match prompt. Replace `{requirements}` and `{resume_text}`.
pub const MATCH_PROMPT_TEMPLATE: &str = r#"Score how well this candidate meets the job requirements. Only credit requirements with explicit evidence in the resume.

Return a JSON object with this EXACT schema:
{
  "score": 0-100,
  "matched_requirements": ["requirement with evidence"],
  "missing_requirements": ["requirement without evidence"],
  "summary": "one or two sentence screening note"
}

JOB REQUIREMENTS:
{requirements}

CANDIDATE RESUME:
{resume_text}"#;

/// Caps prompt inputs so a pasted novel cannot blow the context window.
pub const MAX_PROMPT_INPUT_CHARS: usize = 20_000;
