// Analysis: the keyword heuristic plus every feature backed by the hosted
// model (ATS scoring, optimize, generate, upload parsing, candidate matching).

pub mod ats;
pub mod generator;
pub mod handlers;
pub mod keywords;
pub mod matching;
pub mod optimizer;
pub mod parser;
pub mod prompts;
pub mod sanitize;
pub mod upload;
