use godoctor_proto::SelectionSpec;

/// Parses `-pos=startLine,startCol:endLine,endCol` (§6). Both halves are required;
/// a selection with no `:` is rejected rather than guessing an empty end.
pub fn parse_selection(spec: &str) -> Result<SelectionSpec, String> {
    let (start, end) = spec
        .split_once(':')
        .ok_or_else(|| format!("-pos {spec:?} is missing the `:` separating start and end"))?;
    let (start_line, start_col) = parse_line_col(start)?;
    let (end_line, end_col) = parse_line_col(end)?;
    Ok(SelectionSpec { start_line, start_col, end_line, end_col })
}

fn parse_line_col(part: &str) -> Result<(u32, u32), String> {
    let (line, col) = part
        .split_once(',')
        .ok_or_else(|| format!("{part:?} is not a `line,col` pair"))?;
    let line: u32 = line.parse().map_err(|_| format!("{line:?} is not a valid line number"))?;
    let col: u32 = col.parse().map_err(|_| format!("{col:?} is not a valid column number"))?;
    Ok((line, col))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_selection() {
        let sel = parse_selection("3,5:3,9").unwrap();
        assert_eq!((sel.start_line, sel.start_col), (3, 5));
        assert_eq!((sel.end_line, sel.end_col), (3, 9));
    }

    #[test]
    fn rejects_a_selection_missing_the_separator() {
        assert!(parse_selection("3,5").is_err());
    }
}
