//! Prompt Builder — maps interview parameters to a system instruction and a
//! task instruction. Pure string work apart from resolving `.txt`/`.pdf`
//! source documents through the content loader.

use crate::content;
use crate::errors::InterviewError;

/// System prompt skeleton. Replace `{position}`, `{candidate_resume}`, `{jd}`,
/// `{language}` and `{max_sentence}` before sending.
const SYSTEM_PROMPT_TEMPLATE: &str = "\
You are a helpful assistant acting as the interviewer for a candidate applying \
to the {position} position. Formulate questions based on the candidate resume \
below:

{candidate_resume}

and the job description below:

{jd}

Write in {language} and create answers containing at least {max_sentence} \
sentences each.";

/// Appended when the caller supplies the interviewer's own resume.
const INTERVIEWER_RESUME_TEMPLATE: &str = "\n\nGiven the interviewer's career \
background, craft sharp questions for the candidate based on the interviewer's \
experience and expertise.\n- Resume of interviewer:\n{interviewer_resume}";

/// Shared output-format contract: the model must answer with a mapping
/// literal whose keys pair `Q_<hex>` with `A_<hex>`.
const MAPPING_FORMAT_CONTRACT: &str = "\
Respond with a single flat JSON object mapping string keys to string values, \
and nothing else — no prose, no markdown code fences. Keys must always be \
quoted strings. Each question key is 'Q_' followed by an 8-digit hex code and \
its answer key is 'A_' followed by the identical hex code. For example, if a \
question key is \"Q_24838402\", its answer key must be \"A_24838402\". Ensure \
the response does not duplicate previously generated content.";

/// Kind of interview the system prompt steers toward. Unknown tags fall back
/// to `General` — a deliberate permissive default, not an error path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterviewType {
    #[default]
    General,
    TechFromResume,
    TechFromExperts,
    Personality,
    ReviewResume,
    AdviseResume,
}

impl InterviewType {
    /// Parses an interview-type tag. Anything unrecognized maps to `General`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "techQAsFromResume" => InterviewType::TechFromResume,
            "techQAsFromExperts" => InterviewType::TechFromExperts,
            "personalityQAs" => InterviewType::Personality,
            "reviewResume" => InterviewType::ReviewResume,
            "adviseResume" => InterviewType::AdviseResume,
            _ => InterviewType::General,
        }
    }

    /// The canned instruction fragment appended to the system prompt.
    fn instruction(&self) -> &'static str {
        match self {
            InterviewType::General => {
                "Inquire about both technical skills and personal qualities. \
                 Ask in-depth and professionally, pressing for truth about \
                 strengths and weaknesses, and ask sequentially to gauge depth \
                 of knowledge."
            }
            InterviewType::TechFromResume => {
                "Focus on the technical skills named in the given resume, \
                 e.g., Unet for brain tumor segmentation."
            }
            InterviewType::TechFromExperts => {
                "Create questions from your own expertise related to the \
                 position."
            }
            InterviewType::Personality => {
                "Inquire about personal qualities and competencies, such as \
                 teamwork."
            }
            InterviewType::ReviewResume => {
                "Point out specific shortcomings in the resume, providing \
                 guidance for improvement."
            }
            InterviewType::AdviseResume => {
                "Suggest concrete improvements to the resume, focusing on \
                 relevance to the target position."
            }
        }
    }
}

/// Task templates selecting what one generation round should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    GenerateQuestionsOnly,
    GenerateQuestionsAndAnswers,
    CritiqueResume,
    ReviseResume,
}

impl TaskKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "generateQuestionsOnly" => Some(TaskKind::GenerateQuestionsOnly),
            "generateQuestionsAndAnswers" => Some(TaskKind::GenerateQuestionsAndAnswers),
            "critiqueResume" => Some(TaskKind::CritiqueResume),
            "reviseResume" => Some(TaskKind::ReviseResume),
            _ => None,
        }
    }

    pub fn instruction(&self) -> String {
        let task = match self {
            TaskKind::GenerateQuestionsOnly => {
                "Generate interview questions only, one mapping entry per \
                 question, using 'Q_' keys."
            }
            TaskKind::GenerateQuestionsAndAnswers => {
                "Generate interview questions and model answers, creating \
                 answers containing at least 10 sentences."
            }
            TaskKind::CritiqueResume => {
                "Identify and point out improvable areas in the resume, \
                 providing the original sentence and an enhanced version."
            }
            TaskKind::ReviseResume => {
                "Edit the parts of the resume needing correction or \
                 strengthening, focusing on job relevance."
            }
        };
        format!("{task} {MAPPING_FORMAT_CONTRACT}")
    }
}

/// Inputs for system-prompt construction. `jd`, `candidate_resume` and
/// `interviewer_resume` may each be literal text or a `.txt`/`.pdf` path.
#[derive(Debug, Clone)]
pub struct PromptInputs {
    pub position: String,
    pub jd: String,
    pub candidate_resume: String,
    pub interview_type: InterviewType,
    pub language: String,
    pub max_sentence: u32,
    pub interviewer_resume: Option<String>,
    pub custom_instructions: Option<String>,
}

/// Builds the system instruction for one aggregation session.
pub fn build_system_prompt(inputs: &PromptInputs) -> Result<String, InterviewError> {
    let jd = content::resolve(&inputs.jd)?;
    let candidate_resume = content::resolve(&inputs.candidate_resume)?;

    let mut prompt = SYSTEM_PROMPT_TEMPLATE
        .replace("{position}", &inputs.position)
        .replace("{candidate_resume}", &candidate_resume)
        .replace("{jd}", &jd)
        .replace("{language}", &inputs.language)
        .replace("{max_sentence}", &inputs.max_sentence.to_string());

    if let Some(interviewer_resume) = &inputs.interviewer_resume {
        let interviewer_resume = content::resolve(interviewer_resume)?;
        prompt.push_str(
            &INTERVIEWER_RESUME_TEMPLATE.replace("{interviewer_resume}", &interviewer_resume),
        );
    }

    prompt.push_str("\n\n");
    prompt.push_str(inputs.interview_type.instruction());

    if let Some(custom) = &inputs.custom_instructions {
        prompt.push_str("\nAdditional Instructions: ");
        prompt.push_str(custom);
    }

    Ok(prompt)
}

/// Looks up the task instruction for a task tag. Unknown tags yield an empty
/// string; callers must treat empty as "no task instruction".
pub fn build_task_prompt(tag: &str) -> String {
    TaskKind::from_tag(tag)
        .map(|kind| kind.instruction())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> PromptInputs {
        PromptInputs {
            position: "AI researcher".to_string(),
            jd: "Research large language model training efficiency.".to_string(),
            candidate_resume: "PhD in CS, PyTorch experience.".to_string(),
            interview_type: InterviewType::General,
            language: "English".to_string(),
            max_sentence: 6,
            interviewer_resume: None,
            custom_instructions: None,
        }
    }

    #[test]
    fn test_system_prompt_embeds_all_parameters() {
        let prompt = build_system_prompt(&inputs()).unwrap();
        assert!(prompt.contains("AI researcher"));
        assert!(prompt.contains("Research large language model training efficiency."));
        assert!(prompt.contains("PhD in CS, PyTorch experience."));
        assert!(prompt.contains("Write in English"));
        assert!(prompt.contains("at least 6 sentences"));
    }

    #[test]
    fn test_unknown_interview_type_falls_back_to_general() {
        assert_eq!(InterviewType::from_tag("somethingElse"), InterviewType::General);
        assert_eq!(InterviewType::from_tag(""), InterviewType::General);
    }

    #[test]
    fn test_interviewer_resume_and_custom_instructions_are_appended() {
        let mut i = inputs();
        i.interviewer_resume = Some("15 years of ML systems research.".to_string());
        i.custom_instructions = Some("Ask one system design question.".to_string());

        let prompt = build_system_prompt(&i).unwrap();
        assert!(prompt.contains("15 years of ML systems research."));
        assert!(prompt.contains("Additional Instructions: Ask one system design question."));
    }

    #[test]
    fn test_task_prompt_carries_key_format_contract() {
        let prompt = build_task_prompt("generateQuestionsAndAnswers");
        assert!(prompt.contains("Q_24838402"));
        assert!(prompt.contains("A_24838402"));
        assert!(prompt.contains("8-digit hex code"));
    }

    #[test]
    fn test_unknown_task_kind_yields_empty_prompt() {
        assert_eq!(build_task_prompt("summonDragons"), "");
    }
}
