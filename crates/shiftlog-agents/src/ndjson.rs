use serde_json::Value;
use std::io::Read;

/// Read a reader's full contents as newline-delimited JSON, pairing each
/// successfully-parsed object with its exact source line. Blank lines and
/// lines that fail to parse are silently skipped — every agent's transcript
/// format evolves independently and one corrupt line must never fail the
/// whole parse.
pub fn read_json_lines(reader: &mut dyn Read) -> std::io::Result<Vec<(String, Value)>> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    Ok(buf
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str::<Value>(line).ok().map(|v| (line.to_string(), v)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blank_and_malformed_lines() {
        let input = "{\"a\":1}\n\nnot json\n{\"b\":2}\n";
        let mut reader = input.as_bytes();
        let parsed = read_json_lines(&mut reader).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].1["a"], 1);
        assert_eq!(parsed[1].1["b"], 2);
    }
}
