use anyhow::{Context, Result};
use resreport::inclusion::{CellEdit, RowEdit, ViewKind};
use resreport::record::RowId;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct EditLine {
    view: String,
    row: usize,
    field: String,
    #[serde(default)]
    value: String,
}

/// Edits read from a `view,row,field,value` file, split by the view they
/// came from
#[derive(Debug, Default, PartialEq)]
pub struct EditBatch {
    pub main: Vec<RowEdit>,
    pub missing_price: Vec<RowEdit>,
}

impl EditBatch {
    pub fn len(&self) -> usize {
        self.main.len() + self.missing_price.len()
    }
}

pub fn read_edits_file(path: &Path) -> Result<EditBatch> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open edits file {}", path.display()))?;
    read_edits(file).with_context(|| format!("Failed to read edits from {}", path.display()))
}

pub fn read_edits<R: Read>(reader: R) -> Result<EditBatch> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut batch = EditBatch::default();

    for (idx, line) in rdr.deserialize::<EditLine>().enumerate() {
        // header is line 1
        let line_no = idx + 2;
        let line = line.with_context(|| format!("Malformed edit on line {}", line_no))?;
        let view: ViewKind = line
            .view
            .parse()
            .with_context(|| format!("Line {}", line_no))?;
        let edit = CellEdit::parse(&line.field, &line.value)
            .with_context(|| format!("Line {}", line_no))?;
        let row_edit = RowEdit::new(RowId(line.row), edit);
        debug!("Edit for {} view: {:?}", view, row_edit);

        match view {
            ViewKind::Main => batch.main.push(row_edit),
            ViewKind::MissingPrice => batch.missing_price.push(row_edit),
        }
    }

    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn splits_edits_by_view_in_file_order() {
        let csv = "view,row,field,value\n\
                   main,1,net_price,80\n\
                   missing,2,agency_amount_to_pay,95.50\n\
                   main,1,include,true\n";
        let batch = read_edits(csv.as_bytes()).unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(
            batch.main,
            vec![
                RowEdit::new(RowId(1), CellEdit::NetPrice(Decimal::from(80))),
                RowEdit::new(RowId(1), CellEdit::Include(true)),
            ]
        );
        assert_eq!(
            batch.missing_price,
            vec![RowEdit::new(
                RowId(2),
                CellEdit::AgencyAmountToPay(Decimal::new(9550, 2))
            )]
        );
    }

    #[test]
    fn export_headers_are_accepted_as_field_names() {
        let csv = "view,row,field,value\nmain,0,Include in Analysis,no\nmain,0,Adult,3\n";
        let batch = read_edits(csv.as_bytes()).unwrap();
        assert_eq!(
            batch.main,
            vec![
                RowEdit::new(RowId(0), CellEdit::Include(false)),
                RowEdit::new(RowId(0), CellEdit::Adult(3)),
            ]
        );
    }

    #[test]
    fn unknown_view_names_the_line() {
        let csv = "view,row,field,value\nmain,0,adult,2\nsidebar,0,adult,2\n";
        let err = read_edits(csv.as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("Line 3"));
    }

    #[test]
    fn read_only_field_is_rejected() {
        let csv = "view,row,field,value\nmain,0,profit,10\n";
        assert!(read_edits(csv.as_bytes()).is_err());
    }

    #[test]
    fn negative_row_is_malformed() {
        let csv = "view,row,field,value\nmain,-1,adult,2\n";
        let err = read_edits(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
