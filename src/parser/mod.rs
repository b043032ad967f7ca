use crate::ast::Span;
use crate::error::StepwiseError;
use crate::semantic::{Expr, Function, Stmt};
use pest::Parser;
use pest_derive::Parser;

pub mod expressions;

#[derive(Parser)]
#[grammar = "src/parser/stepwise.pest"]
pub struct StepwiseParser;

/// Python-style keywords; statements led by one of these are outside the
/// restricted grammar
const KEYWORDS: &[&str] = &[
    "if", "elif", "else", "for", "while", "with", "try", "except", "finally", "class", "def",
    "import", "from", "pass", "break", "continue", "global", "nonlocal", "assert", "del", "raise",
    "lambda", "yield", "match",
];

/// One statement after comment stripping and `;` splitting, with its source
/// line and indentation preserved for block tracking
#[derive(Debug, Clone)]
pub(crate) struct LogicalLine {
    pub line_no: usize,
    pub indent: usize,
    pub text: String,
}

/// Parse a single expression of the restricted grammar
pub fn parse_expression(text: &str) -> Result<Expr, StepwiseError> {
    parse_expression_at(text, 1, "<expression>")
}

/// Parse the textual body of a computation into classified statements.
///
/// Assignments to a bare identifier and return statements become structured
/// statements; anything else (control flow, chained/augmented/compound-target
/// assignment, foreign constructs) becomes `Stmt::Skipped` without error. A
/// statement that is assignment- or return-shaped but whose expression does
/// not parse fails the whole body with a parse error.
pub fn parse_body(source: &str) -> Result<Vec<Stmt>, StepwiseError> {
    classify(&logical_lines(source), "<input>")
}

/// Parse a full computation: a `def name(params):` header plus its body
pub fn parse_function(source: &str) -> Result<Function, StepwiseError> {
    let raw_lines: Vec<&str> = source.lines().collect();
    let def_idx = raw_lines
        .iter()
        .position(|line| is_def_line(line.trim_start()))
        .ok_or_else(|| {
            StepwiseError::parse(
                "Missing 'def' header",
                Span::at_line_col(1, 1),
                "<input>",
            )
        })?;
    let def_line_no = def_idx + 1;
    let (name, params, inline) = parse_def_header(raw_lines[def_idx].trim(), def_line_no)?;

    let mut lines: Vec<LogicalLine> = Vec::new();
    for (i, raw) in raw_lines[..def_idx].iter().enumerate() {
        make_logical(i + 1, raw, &mut lines);
    }
    // An inline body after the colon is indented one level relative to the header
    let inline_indent = indent_width(raw_lines[def_idx]) + 4;
    for segment in strip_comment(&inline).split(';') {
        let text = segment.trim();
        if !text.is_empty() {
            lines.push(LogicalLine {
                line_no: def_line_no,
                indent: inline_indent,
                text: text.to_string(),
            });
        }
    }
    for (i, raw) in raw_lines[def_idx + 1..].iter().enumerate() {
        make_logical(def_idx + 2 + i, raw, &mut lines);
    }

    let body = classify(&lines, "<input>")?;
    Ok(Function { name, params, body })
}

fn parse_def_header(
    line: &str,
    line_no: usize,
) -> Result<(String, Vec<String>, String), StepwiseError> {
    let mut pairs = StepwiseParser::parse(Rule::def_header, line)
        .map_err(|e| pest_error(e, line_no, "<input>"))?;
    let header = pairs
        .next()
        .ok_or_else(|| StepwiseError::Engine("Empty def header parse result".to_string()))?;

    let mut name = String::new();
    let mut params = Vec::new();
    let mut inline = String::new();
    for pair in header.into_inner() {
        match pair.as_rule() {
            Rule::identifier => name = pair.as_str().to_string(),
            Rule::param_list => {
                for param in pair.into_inner() {
                    params.push(param.as_str().to_string());
                }
            }
            Rule::inline_body => inline = pair.as_str().to_string(),
            _ => {}
        }
    }
    Ok((name, params, inline))
}

pub(crate) fn classify(
    lines: &[LogicalLine],
    source_id: &str,
) -> Result<Vec<Stmt>, StepwiseError> {
    let mut stmts = Vec::new();
    // Indents of enclosing skipped blocks (conditionals, loops, nested defs)
    let mut skip_indents: Vec<usize> = Vec::new();

    for line in lines {
        while skip_indents.last().is_some_and(|&top| line.indent <= top) {
            skip_indents.pop();
        }
        let inside_skipped_block = !skip_indents.is_empty();
        let text = line.text.as_str();

        // Returns are collected wherever they occur, including inside blocks
        // whose statements are otherwise skipped
        if let Some(rest) = strip_return_keyword(text) {
            let value = if rest.is_empty() {
                None
            } else {
                Some(parse_expression_at(rest, line.line_no, source_id)?)
            };
            stmts.push(Stmt::Return { value });
            continue;
        }

        if inside_skipped_block || is_block_opener(text) || starts_with_keyword(text) {
            stmts.push(Stmt::Skipped {
                text: text.to_string(),
            });
            if is_block_opener(text) {
                skip_indents.push(line.indent);
            }
            continue;
        }

        match find_top_level_assign(text) {
            Some(eq) => {
                let target = text[..eq].trim();
                let rhs = text[eq + 1..].trim();
                if !is_identifier(target)
                    || find_top_level_assign(rhs).is_some()
                    || starts_with_keyword(rhs)
                {
                    // Tuple/subscript/attribute targets, chained assignment
                    // and keyword-led right-hand sides are outside the grammar
                    stmts.push(Stmt::Skipped {
                        text: text.to_string(),
                    });
                } else if rhs.is_empty() {
                    return Err(StepwiseError::parse(
                        "Assignment without a right-hand side",
                        Span::at_line_col(line.line_no, eq + 1),
                        source_id,
                    ));
                } else {
                    let value = parse_expression_at(rhs, line.line_no, source_id)?;
                    stmts.push(Stmt::Assign {
                        target: target.to_string(),
                        value,
                    });
                }
            }
            None => stmts.push(Stmt::Skipped {
                text: text.to_string(),
            }),
        }
    }

    Ok(stmts)
}

fn parse_expression_at(
    text: &str,
    line_no: usize,
    source_id: &str,
) -> Result<Expr, StepwiseError> {
    match StepwiseParser::parse(Rule::expr_input, text) {
        Ok(mut pairs) => {
            let input = pairs
                .next()
                .ok_or_else(|| StepwiseError::Engine("Empty expression parse result".to_string()))?;
            let expr_pair = input
                .into_inner()
                .find(|p| p.as_rule() == Rule::expression)
                .ok_or_else(|| {
                    StepwiseError::Engine("Missing expression in parse result".to_string())
                })?;
            expressions::lower_expression(expr_pair)
        }
        Err(e) => Err(pest_error(e, line_no, source_id)),
    }
}

fn pest_error(
    error: pest::error::Error<Rule>,
    line_no: usize,
    source_id: &str,
) -> StepwiseError {
    let col = match error.line_col {
        pest::error::LineColLocation::Pos((_, col)) => col,
        pest::error::LineColLocation::Span((_, col), (_, _)) => col,
    };
    StepwiseError::parse(
        format!("{}", error.variant),
        Span::at_line_col(line_no, col),
        source_id,
    )
}

pub(crate) fn logical_lines(source: &str) -> Vec<LogicalLine> {
    let mut lines = Vec::new();
    for (i, raw) in source.lines().enumerate() {
        make_logical(i + 1, raw, &mut lines);
    }
    lines
}

fn make_logical(line_no: usize, raw: &str, out: &mut Vec<LogicalLine>) {
    let stripped = strip_comment(raw);
    if stripped.trim().is_empty() {
        return;
    }
    let indent = indent_width(&stripped);
    for segment in stripped.split(';') {
        let text = segment.trim();
        if !text.is_empty() {
            out.push(LogicalLine {
                line_no,
                indent,
                text: text.to_string(),
            });
        }
    }
}

fn strip_comment(line: &str) -> String {
    match line.find('#') {
        Some(pos) => line[..pos].to_string(),
        None => line.to_string(),
    }
}

fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += 4,
            _ => break,
        }
    }
    width
}

fn is_def_line(text: &str) -> bool {
    text.strip_prefix("def")
        .is_some_and(|rest| !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_'))
}

fn strip_return_keyword(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("return")?;
    if rest.starts_with(|c: char| c.is_alphanumeric() || c == '_') {
        return None;
    }
    Some(rest.trim())
}

fn starts_with_keyword(text: &str) -> bool {
    let word: String = text
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    KEYWORDS.contains(&word.as_str())
}

fn is_block_opener(text: &str) -> bool {
    starts_with_keyword(text) && text.ends_with(':')
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Byte index of the first `=` that is a plain assignment operator: outside
/// brackets, not part of `==`/`!=`/`<=`/`>=` or an augmented assignment
fn find_top_level_assign(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            b'=' if depth == 0 => {
                let prev = if i == 0 { 0 } else { bytes[i - 1] };
                let next = bytes.get(i + 1).copied().unwrap_or(0);
                let part_of_comparison = next == b'='
                    || matches!(prev, b'=' | b'!' | b'<' | b'>');
                let augmented = matches!(prev, b'+' | b'-' | b'*' | b'/' | b'%');
                if !part_of_comparison && !augmented {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
