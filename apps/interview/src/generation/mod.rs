// QA generation pipeline: prompt construction, response parsing, aggregation.
// All backend calls go through llm_client — no direct provider calls here.

pub mod aggregator;
pub mod parser;
pub mod prompts;
