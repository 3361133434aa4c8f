use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use quinary_core::PipelineOutput;
use quinary_model::{TrialPhase, WeekSymbol};

use crate::types::{CheckResult, EncodeResult};

const PHASES: [TrialPhase; 3] = [TrialPhase::Baseline, TrialPhase::Phase1, TrialPhase::Phase2];

pub fn print_encode_summary(result: &EncodeResult) {
    println!("Study: {}", result.study_folder.display());
    if result.written.is_empty() {
        println!("Output: (dry run)");
    } else {
        println!("Output: {}", result.output_dir.display());
        for path in &result.written {
            println!("  {}", path.display());
        }
    }
    println!("{}", phase_table(&result.output));
    println!("{}", symbol_table(&result.output));
    if let Some(warning) = &result.output.warning {
        eprintln!("Warning: {warning}");
    }
}

pub fn print_check_summary(result: &CheckResult) {
    println!("Study: {}", result.study_folder.display());
    let mut table = Table::new();
    table.set_header(vec![header_cell("Table"), header_cell("Rows")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (kind, rows) in &result.table_rows {
        table.add_row(vec![label_cell(kind.label()), count_cell(*rows, Color::Reset)]);
    }
    println!("{table}");
    println!(
        "Subjects: {}  Drug tests: {} ({} positive)  Protocols: {}",
        result.subjects, result.observations, result.positive, result.protocols
    );
    if let Some(warning) = &result.warning {
        eprintln!("Warning: {warning}");
    }
}

/// Subjects and words per trial phase.
pub fn phase_table(output: &PipelineOutput) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Phase"),
        header_cell("Words"),
        header_cell("Weeks"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for phase in PHASES {
        let weeks: usize = output
            .words
            .iter()
            .filter(|word| word.phase == phase)
            .map(|word| word.len_weeks())
            .sum();
        table.add_row(vec![
            label_cell(phase.as_str()),
            count_cell(output.words_in(phase), Color::Reset),
            count_cell(weeks, Color::Reset),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(output.words.len()).add_attribute(Attribute::Bold),
        Cell::new(output.weeks.len()).add_attribute(Attribute::Bold),
    ]);
    table
}

/// How often each symbol appears across all words.
pub fn symbol_table(output: &PipelineOutput) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Symbol"),
        header_cell("Meaning"),
        header_cell("Weeks"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    align_column(&mut table, 2, CellAlignment::Right);
    for (symbol, count) in output.symbol_counts() {
        table.add_row(vec![
            Cell::new(symbol.as_char()).add_attribute(Attribute::Bold),
            Cell::new(symbol_meaning(symbol)),
            count_cell(count, symbol_color(symbol)),
        ]);
    }
    table
}

fn symbol_meaning(symbol: WeekSymbol) -> &'static str {
    match symbol {
        WeekSymbol::Positive => "positive only",
        WeekSymbol::Negative => "negative only",
        WeekSymbol::Mixed => "positive and negative",
        WeekSymbol::Missing => "missing",
        WeekSymbol::NotExpected => "not expected",
    }
}

fn symbol_color(symbol: WeekSymbol) -> Color {
    match symbol {
        WeekSymbol::Positive => Color::Red,
        WeekSymbol::Negative => Color::Green,
        WeekSymbol::Mixed => Color::Yellow,
        WeekSymbol::Missing | WeekSymbol::NotExpected => Color::Reset,
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn label_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count == 0 {
        dim_cell(count)
    } else {
        Cell::new(count).fg(color)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quinary_model::{SubjectId, UsePatternWord};

    fn output() -> PipelineOutput {
        PipelineOutput {
            words: vec![
                UsePatternWord {
                    subject: SubjectId(1),
                    phase: TrialPhase::Baseline,
                    start_week: 0,
                    end_week: 0,
                    rand_week_1: 0,
                    rand_week_2: None,
                    word: "o".to_string(),
                },
                UsePatternWord {
                    subject: SubjectId(1),
                    phase: TrialPhase::Phase1,
                    start_week: 1,
                    end_week: 3,
                    rand_week_1: 0,
                    rand_week_2: None,
                    word: "+*-".to_string(),
                },
            ],
            ..PipelineOutput::default()
        }
    }

    #[test]
    fn one_row_per_phase_plus_total() {
        assert_eq!(phase_table(&output()).row_count(), PHASES.len() + 1);
    }

    #[test]
    fn every_symbol_is_listed() {
        let table = symbol_table(&output());
        assert_eq!(table.row_count(), WeekSymbol::ALL.len());
        let rendered = table.to_string();
        assert!(rendered.contains("positive and negative"));
    }
}
