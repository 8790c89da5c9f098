//! CSV exchange of scoring rows
//!
//! The input must carry `Correct Answer, Guess 1, Guess 2, Guess 3` columns;
//! any other columns pass through untouched. The output is the input table
//! with `Distance_1..3` set, appended when absent and overwritten when
//! present. Unscored cells are left empty.

use crate::error::ScoreError;
use crate::scorer::{distance_column, ScoredRow, ScoringRow, GUESS_COUNT};
use std::io;
use std::path::Path;

/// Name columns every scoring table must have
pub const NAME_COLUMNS: [&str; GUESS_COUNT + 1] =
    ["Correct Answer", "Guess 1", "Guess 2", "Guess 3"];

/// Header plus rows of a scoring table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringTable {
    pub headers: Vec<String>,
    pub rows: Vec<ScoringRow>,
}

/// Read a scoring table from any CSV source
///
/// Cells are trimmed. Rows must have as many cells as the header.
pub fn read_rows_from<R: io::Read>(reader: R) -> Result<ScoringTable, ScoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut positions = [0usize; GUESS_COUNT + 1];
    for (slot, column) in positions.iter_mut().zip(NAME_COLUMNS) {
        *slot = headers
            .iter()
            .position(|header| header == column)
            .ok_or_else(|| ScoreError::MissingColumn(column.to_string()))?;
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let cells: Vec<String> = record.iter().map(str::to_string).collect();
        let [correct, guess_1, guess_2, guess_3] =
            positions.map(|i| cells.get(i).cloned().unwrap_or_default());
        rows.push(ScoringRow {
            correct,
            guess_1,
            guess_2,
            guess_3,
            cells,
        });
    }

    Ok(ScoringTable { headers, rows })
}

/// Read a scoring table from a CSV file
pub fn read_rows(path: &Path) -> Result<ScoringTable, ScoreError> {
    let file = std::fs::File::open(path)?;
    read_rows_from(file)
}

/// Write scored rows to any CSV sink
///
/// `headers` names the cells each row carries.
pub fn write_scored_to<W: io::Write>(
    writer: W,
    headers: &[String],
    rows: &[ScoredRow],
) -> Result<(), ScoreError> {
    let mut headers = headers.to_vec();
    let mut distance_positions = [0usize; GUESS_COUNT];
    for (index, slot) in distance_positions.iter_mut().enumerate() {
        let column = distance_column(index);
        *slot = match headers.iter().position(|header| *header == column) {
            Some(position) => position,
            None => {
                headers.push(column);
                headers.len() - 1
            }
        };
    }

    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(&headers)?;

    for scored in rows {
        let mut cells = scored.row.cells.clone();
        cells.resize(headers.len(), String::new());
        for (&position, distance) in distance_positions.iter().zip(scored.distances) {
            cells[position] = distance.map(|d| d.to_string()).unwrap_or_default();
        }
        writer.write_record(&cells)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write scored rows to a CSV file
pub fn write_scored(path: &Path, headers: &[String], rows: &[ScoredRow]) -> Result<(), ScoreError> {
    let file = std::fs::File::create(path)?;
    write_scored_to(file, headers, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_headers() -> Vec<String> {
        NAME_COLUMNS.map(String::from).to_vec()
    }

    #[test]
    fn test_read_rows_keeps_extra_columns() {
        let data = "\
Plant,Correct Answer,Guess 1,Guess 2,Guess 3
rose, Rosa rugosa ,Rosa rugosa,Rosa canina,Malus domestica
fern,Pteridium aquilinum,Pteridium aquilinum,,Athyrium filix-femina
";
        let table = read_rows_from(data.as_bytes()).unwrap();

        assert_eq!(
            table.headers,
            vec!["Plant", "Correct Answer", "Guess 1", "Guess 2", "Guess 3"]
        );
        assert_eq!(table.rows.len(), 2);
        let rose = &table.rows[0];
        assert_eq!(rose.correct, "Rosa rugosa");
        assert_eq!(rose.guesses(), ["Rosa rugosa", "Rosa canina", "Malus domestica"]);
        assert_eq!(rose.cells[0], "rose");
        assert_eq!(table.rows[1].guess_2, "");
    }

    #[test]
    fn test_missing_column_is_error() {
        let data = "Correct Answer,Guess 1,Guess 2\nA,B,C\n";
        match read_rows_from(data.as_bytes()) {
            Err(ScoreError::MissingColumn(column)) => assert_eq!(column, "Guess 3"),
            other => panic!("expected missing column, got {:?}", other),
        }
    }

    #[test]
    fn test_short_row_is_error() {
        let data = "Correct Answer,Guess 1,Guess 2,Guess 3\nA,B,C\n";
        assert!(matches!(
            read_rows_from(data.as_bytes()),
            Err(ScoreError::Csv(_))
        ));
    }

    #[test]
    fn test_write_scored_leaves_unscored_cells_empty() {
        let rows = vec![
            ScoredRow {
                row: ScoringRow::new("Rosa rugosa", "Rosa rugosa", "Rosa canina", "Malus domestica"),
                distances: [Some(0), Some(1), Some(2)],
            },
            ScoredRow {
                row: ScoringRow::new("Unknown", "Rosa rugosa", "Rosa canina", "Rosa canina"),
                distances: [None, None, None],
            },
        ];

        let mut out = Vec::new();
        write_scored_to(&mut out, &name_headers(), &rows).unwrap();
        let text = String::from_utf8(out).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Correct Answer,Guess 1,Guess 2,Guess 3,Distance_1,Distance_2,Distance_3"
        );
        assert_eq!(lines[1], "Rosa rugosa,Rosa rugosa,Rosa canina,Malus domestica,0,1,2");
        assert_eq!(lines[2], "Unknown,Rosa rugosa,Rosa canina,Rosa canina,,,");
    }

    #[test]
    fn test_existing_distance_columns_are_overwritten() {
        let data = "\
Sample,Correct Answer,Guess 1,Guess 2,Guess 3,Distance_2,Note
s1,A,B,C,D,9,keep me
";
        let table = read_rows_from(data.as_bytes()).unwrap();
        let rows: Vec<ScoredRow> = table
            .rows
            .into_iter()
            .map(|row| ScoredRow {
                row,
                distances: [Some(3), None, Some(1)],
            })
            .collect();

        let mut out = Vec::new();
        write_scored_to(&mut out, &table.headers, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "Sample,Correct Answer,Guess 1,Guess 2,Guess 3,Distance_2,Note,Distance_1,Distance_3"
        );
        assert_eq!(lines[1], "s1,A,B,C,D,,keep me,3,1");
    }
}
