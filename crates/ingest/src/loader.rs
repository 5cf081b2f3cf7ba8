use crate::error::IngestError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One line of the invoices CSV before validation.
///
/// Every field is optional so that incomplete rows reach the cleaner instead
/// of aborting the whole file. Extra columns in the file are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInvoice {
    pub userid: Option<String>,
    pub datepaid: Option<String>,
    pub event_id: Option<String>,
    pub amount: Option<String>,
    pub product_name: Option<String>,
}

/// One line of the experiment assignment CSV before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAssignment {
    pub userid: Option<String>,
    pub ui_change: Option<String>,
    pub desc_change: Option<String>,
}

pub fn read_invoices<R: Read>(reader: R) -> Result<Vec<RawInvoice>, IngestError> {
    read_rows(reader)
}

pub fn read_assignments<R: Read>(reader: R) -> Result<Vec<RawAssignment>, IngestError> {
    read_rows(reader)
}

/// Opens `path` for one of the `read_*` functions.
pub fn open(path: &Path) -> Result<File, IngestError> {
    File::open(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn read_rows<R: Read, T: DeserializeOwned>(reader: R) -> Result<Vec<T>, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in csv_reader.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_rows_and_keeps_blanks_as_missing() {
        let input = "userid,datepaid,event_id,amount,product_name,extra\n\
                     1,05/02/2020,7,19.99,Tickets,x\n\
                     2,,7,5.00,Merch,y\n";
        let rows = read_invoices(input.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].product_name.as_deref(), Some("Tickets"));
        assert_eq!(rows[1].datepaid, None);
    }

    #[test]
    fn reads_assignments() {
        let input = "userid,ui_change,desc_change\n10,1,0\n11,False,True\n";
        let rows = read_assignments(input.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].ui_change.as_deref(), Some("False"));
    }
}
