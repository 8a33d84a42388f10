//! Document Exporter — renders the Result Mapping as a paginated .docx.
//!
//! Entries are grouped by the identifier after the first underscore; each
//! group becomes one two-row table (question cell on black, answer cell
//! plain). A group missing its question or answer renders an explicit
//! placeholder so unpaired entries stay visible and auditable.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use docx_rs::{
    AlignmentType, BorderType, Docx, Paragraph, Run, RunFonts, Shading, ShdType, Table,
    TableBorder, TableBorderPosition, TableBorders, TableCell, TableRow, WidthType,
};
use tracing::info;

use crate::errors::InterviewError;
use crate::generation::parser::ResultMapping;

const QUESTION_PLACEHOLDER: &str = "No question provided.";
const ANSWER_PLACEHOLDER: &str = "No answer provided.";

const TITLE: &str = "Open Interview";
const DEFAULT_FONT: &str = "Calibri";
/// Half-points: 11pt body, 20pt title, 12pt cell text.
const BODY_SIZE: usize = 22;
const TITLE_SIZE: usize = 40;
const CELL_SIZE: usize = 24;

const BORDER_COLOR: &str = "D3D3D3";
const QUESTION_FILL: &str = "000000";
const QUESTION_TEXT_COLOR: &str = "FFFFFF";

/// One display unit: a question/answer pair sharing an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaUnit {
    pub identifier: String,
    pub question: Option<String>,
    pub answer: Option<String>,
}

impl QaUnit {
    pub fn question_display(&self) -> String {
        format!("Q: {}", self.question.as_deref().unwrap_or(QUESTION_PLACEHOLDER))
    }

    pub fn answer_display(&self) -> String {
        format!("A: {}", self.answer.as_deref().unwrap_or(ANSWER_PLACEHOLDER))
    }
}

/// Groups mapping entries into display units by the identifier suffix after
/// the first `_`. Keys with no underscore (e.g. unparsed-payload salvage
/// entries) have no identifier and are skipped here — they remain visible in
/// the cached round artifacts.
pub fn group_by_identifier(mapping: &ResultMapping) -> Vec<QaUnit> {
    let mut groups: BTreeMap<&str, (Option<&str>, Option<&str>)> = BTreeMap::new();
    for (key, value) in mapping {
        let Some((prefix, identifier)) = key.split_once('_') else {
            continue;
        };
        let slot = groups.entry(identifier).or_default();
        match prefix {
            "Q" => slot.0 = Some(value),
            "A" => slot.1 = Some(value),
            _ => {}
        }
    }

    groups
        .into_iter()
        .map(|(identifier, (question, answer))| QaUnit {
            identifier: identifier.to_string(),
            question: question.map(str::to_string),
            answer: answer.map(str::to_string),
        })
        .collect()
}

/// Renders the mapping into `OpenInterview_<timestamp>.docx` under
/// `document_dir` and returns the written path.
pub fn export_document(
    mapping: &ResultMapping,
    document_dir: &Path,
) -> Result<PathBuf, InterviewError> {
    std::fs::create_dir_all(document_dir)?;

    let mut docx = Docx::new()
        .default_fonts(RunFonts::new().ascii(DEFAULT_FONT))
        .default_size(BODY_SIZE)
        .add_paragraph(
            Paragraph::new()
                .add_run(Run::new().add_text(TITLE).size(TITLE_SIZE))
                .align(AlignmentType::Center),
        )
        .add_paragraph(
            Paragraph::new()
                .add_run(
                    Run::new()
                        .add_text(format!("Generated {}", Utc::now().format("%Y-%m-%d %H:%M UTC")))
                        .size(16),
                )
                .align(AlignmentType::Center),
        )
        .add_paragraph(Paragraph::new());

    let units = group_by_identifier(mapping);
    let unit_count = units.len();
    for unit in &units {
        docx = docx
            .add_table(qa_table(unit))
            .add_paragraph(Paragraph::new());
    }

    let timestamp = Utc::now().format("%Y%m%d%H%M%S%6f");
    let path = document_dir.join(format!("OpenInterview_{timestamp}.docx"));
    let file = std::fs::File::create(&path)?;
    docx.build()
        .pack(file)
        .map_err(|e| InterviewError::Document(e.to_string()))?;

    info!(units = unit_count, path = %path.display(), "document exported");
    Ok(path)
}

/// One two-row table: styled question cell over a plain answer cell.
fn qa_table(unit: &QaUnit) -> Table {
    let question_cell = TableCell::new()
        .width(9360, WidthType::Dxa)
        .shading(
            Shading::new()
                .shd_type(ShdType::Clear)
                .fill(QUESTION_FILL),
        )
        .add_paragraph(
            Paragraph::new()
                .add_run(
                    Run::new()
                        .add_text(unit.question_display())
                        .size(CELL_SIZE)
                        .color(QUESTION_TEXT_COLOR),
                )
                .align(AlignmentType::Left),
        );

    let answer_cell = TableCell::new()
        .width(9360, WidthType::Dxa)
        .add_paragraph(
            Paragraph::new()
                .add_run(Run::new().add_text(unit.answer_display()).size(CELL_SIZE))
                .align(AlignmentType::Left),
        );

    Table::new(vec![
        TableRow::new(vec![question_cell]),
        TableRow::new(vec![answer_cell]),
    ])
    .set_borders(light_gray_borders())
    .width(9360, WidthType::Dxa)
}

fn light_gray_borders() -> TableBorders {
    let positions = [
        TableBorderPosition::Top,
        TableBorderPosition::Bottom,
        TableBorderPosition::Left,
        TableBorderPosition::Right,
        TableBorderPosition::InsideH,
        TableBorderPosition::InsideV,
    ];
    let mut borders = TableBorders::new();
    for position in positions {
        borders = borders.set(
            TableBorder::new(position)
                .border_type(BorderType::Single)
                .size(7)
                .color(BORDER_COLOR),
        );
    }
    borders
}
