/// Rows of a CSV file, header first. Rows may have different lengths.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedTable {
    rows: Vec<Vec<String>>,
}

impl ParsedTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Joins cells with commas and rows with newlines.
    pub fn to_csv(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.join(","))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Trims a cell and collapses every inner run of whitespace to one space.
pub fn normalize_cell(cell: &str) -> String {
    cell.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits `text` into rows and cells.
///
/// Blank lines are dropped. Cells are split on every comma: quoted fields
/// holding commas are not supported.
pub fn parse_rows(text: &str) -> ParsedTable {
    let rows = text
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split(',').map(normalize_cell).collect())
        .collect();
    ParsedTable::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_blank_lines_and_normalizes_cells() {
        let table = parse_rows("  Name , Price \r\n\n   \nBig   Red\tBox, 10 \r\n");
        assert_eq!(
            table.rows(),
            [
                vec!["Name".to_string(), "Price".to_string()],
                vec!["Big Red Box".to_string(), "10".to_string()],
            ]
        );
    }

    #[test]
    fn quoted_commas_are_split() {
        let table = parse_rows("A,B\n\"x,y\",z");
        assert_eq!(table.data_rows()[0], ["\"x", "y\"", "z"]);
    }

    #[test]
    fn ragged_rows_are_kept_as_is() {
        let table = parse_rows("A,B,C\n1\n1,2,3,4");
        assert_eq!(table.data_rows()[0].len(), 1);
        assert_eq!(table.data_rows()[1].len(), 4);
    }

    #[test]
    fn whitespace_only_text_is_empty() {
        assert!(parse_rows(" \n\r\n\t").is_empty());
        assert!(parse_rows("").data_rows().is_empty());
    }

    #[test]
    fn serializing_keeps_empty_cells() {
        let table = parse_rows("A, ,C\n1,,3");
        assert_eq!(table.to_csv(), "A,,C\n1,,3");
        assert_eq!(parse_rows(&table.to_csv()), table);
    }
}
