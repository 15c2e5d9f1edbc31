//! Generic CSV to JSON parser with encoding and delimiter auto-detection.
//!
//! Converts CSV rows into JSON objects of raw string fields. No chart
//! logic here; coercion to numbers happens in [`crate::normalize`].

use serde_json::{json, Map, Value};
use std::path::Path;

use crate::error::{ParseError, ParseOutcome};

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Raw rows as JSON objects of string fields, in source order.
    pub records: Vec<Value>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// Column headers
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> ParseOutcome<String> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => Ok(String::from_utf8(bytes.to_vec())
            .unwrap_or_else(|_| String::from_utf8_lossy(bytes).to_string())),
        "iso-8859-1" | "latin-1" | "latin1" => {
            Ok(encoding_rs::ISO_8859_15.decode(bytes).0.to_string())
        }
        "windows-1252" | "cp1252" => Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.to_string()),
        _ => {
            // Fallback: UTF-8 with lossy conversion
            Ok(String::from_utf8_lossy(bytes).to_string())
        }
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV content into JSON objects with explicit delimiter.
///
/// Each row becomes a JSON object where keys are column headers and
/// every value is the raw string from the file. Column names must
/// match the file exactly (case-sensitive); nothing is renamed here.
///
/// # Example
/// ```ignore
/// use comfortviz::parser::csv_to_rows;
///
/// let csv = "hour,mean\n9,23.5\n14,24.1";
/// let result = csv_to_rows(csv, ',').unwrap();
///
/// assert_eq!(result.records.len(), 2);
/// assert_eq!(result.records[0]["hour"], "9");
/// assert_eq!(result.records[0]["mean"], "23.5");
/// ```
pub fn csv_to_rows(content: &str, delimiter: char) -> ParseOutcome<ParseResult> {
    if content.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().trim_matches('"').to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(ParseError::NoHeaders);
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;

        if row.iter().all(|v| v.trim().is_empty()) {
            continue;
        }

        let mut obj = Map::new();
        for (i, header) in headers.iter().enumerate() {
            let raw_value = row.get(i).map(|s| s.trim().trim_matches('"')).unwrap_or("");
            obj.insert(header.clone(), json!(raw_value));
        }
        records.push(Value::Object(obj));
    }

    Ok(ParseResult {
        records,
        encoding: "utf-8".to_string(),
        delimiter,
        headers,
    })
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> ParseOutcome<ParseResult> {
    if bytes.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);

    let mut result = csv_to_rows(&content, delimiter)?;
    result.encoding = encoding;
    Ok(result)
}

/// Parse a CSV file with auto-detection of encoding and delimiter.
///
/// # Example
/// ```ignore
/// let result = parse_csv_file_auto("/data/thermal comfort/boxplot/month/may_zone26.csv")?;
/// println!("Encoding: {}, rows: {}", result.encoding, result.records.len());
/// ```
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> ParseOutcome<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let csv = "hour,mean\n9,23.5\n14,24.1";
        let result = csv_to_rows(csv, ',').unwrap();

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0]["hour"], "9");
        assert_eq!(result.records[0]["mean"], "23.5");
        assert_eq!(result.records[1]["hour"], "14");
    }

    #[test]
    fn test_headers_case_preserved() {
        let csv = "day_name,Hour\nMonday,14";
        let result = csv_to_rows(csv, ',').unwrap();

        assert_eq!(result.headers, vec!["day_name", "Hour"]);
        assert_eq!(result.records[0]["day_name"], "Monday");
        // No case folding: "hour" was not a column in this file.
        assert!(result.records[0].get("hour").is_none());
    }

    #[test]
    fn test_quoted_values() {
        let csv = "name,value\n\"Monday\",\"23.1\"";
        let result = csv_to_rows(csv, ',').unwrap();

        assert_eq!(result.records[0]["name"], "Monday");
        assert_eq!(result.records[0]["value"], "23.1");
    }

    #[test]
    fn test_empty_lines_skipped() {
        let csv = "a,b\n1,2\n\n3,4\n";
        let result = csv_to_rows(csv, ',').unwrap();
        assert_eq!(result.records.len(), 2);
    }

    #[test]
    fn test_missing_values_become_empty_strings() {
        let csv = "a,b,c\n1,,3";
        let result = csv_to_rows(csv, ',').unwrap();

        assert_eq!(result.records[0]["a"], "1");
        assert_eq!(result.records[0]["b"], "");
        assert_eq!(result.records[0]["c"], "3");
    }

    #[test]
    fn test_short_rows_padded() {
        let csv = "a,b,c\n1,2";
        let result = csv_to_rows(csv, ',').unwrap();
        assert_eq!(result.records[0]["c"], "");
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(csv_to_rows("", ','), Err(ParseError::EmptyInput)));
        assert!(matches!(
            parse_bytes_auto(b""),
            Err(ParseError::EmptyInput)
        ));
    }

    #[test]
    fn test_header_only_yields_no_records() {
        let result = csv_to_rows("hour,mean\n", ',').unwrap();
        assert!(result.records.is_empty());
    }

    #[test]
    fn test_detect_delimiter_comma() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
    }

    #[test]
    fn test_detect_delimiter_semicolon() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
    }

    #[test]
    fn test_detect_delimiter_tab() {
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
    }

    #[test]
    fn test_auto_parse() {
        let csv = "day_name,hour,ta\nMonday,14,23.1\nTuesday,9,22.8";
        let result = parse_bytes_auto(csv.as_bytes()).unwrap();

        assert_eq!(result.delimiter, ',');
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.headers, vec!["day_name", "hour", "ta"]);
    }

    #[test]
    fn test_latin1_decoding() {
        // "température" in ISO-8859-1
        let bytes: &[u8] = &[0x74, 0x65, 0x6D, 0x70, 0xE9, 0x72, 0x61, 0x74, 0x75, 0x72, 0x65];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert!(decoded.starts_with("temp"));
    }
}
